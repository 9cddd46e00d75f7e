use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

use super::ContentSourceKind;

/// Command-line arguments for the folio binary.
#[derive(Debug, Parser)]
#[command(
    name = "folio",
    version,
    about = "Portfolio content and contact service"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "FOLIO_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP service.
    Serve(Box<ServeArgs>),
    /// Fetch content from the configured source and print it as JSON.
    Fetch(FetchArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ContentOverrides {
    /// Override the content source (remote|proxy|memory).
    #[arg(long = "content-source", value_name = "SOURCE")]
    pub source: Option<ContentSourceKind>,

    /// Override the TOML fixture used by the memory source.
    #[arg(
        long = "content-fixture-path",
        value_name = "PATH",
        value_hint = ValueHint::FilePath
    )]
    pub fixture_path: Option<PathBuf>,

    /// Override the base URL of the folio instance used by the proxy source.
    #[arg(long = "content-proxy-url", value_name = "URL")]
    pub proxy_url: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub content: ContentOverrides,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Toggle the query cache.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_enabled: Option<bool>,

    /// Override the public site URL used in the sitemap.
    #[arg(long = "site-public-url", value_name = "URL")]
    pub site_public_url: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    #[command(flatten)]
    pub content: ContentOverrides,

    #[command(subcommand)]
    pub target: FetchTarget,
}

#[derive(Debug, Subcommand, Clone)]
pub enum FetchTarget {
    /// List blog posts, newest first.
    Posts {
        #[arg(long, value_name = "COUNT", allow_negative_numbers = true)]
        limit: Option<i64>,
        #[arg(long, value_name = "CATEGORY")]
        category: Option<String>,
        /// List unpublished posts instead of published ones.
        #[arg(long, action = clap::ArgAction::SetTrue)]
        drafts: bool,
    },
    /// List projects, most recently completed first.
    Projects {
        #[arg(long, value_name = "COUNT", allow_negative_numbers = true)]
        limit: Option<i64>,
        #[arg(long, value_name = "CATEGORY")]
        category: Option<String>,
        /// Only featured projects.
        #[arg(long, action = clap::ArgAction::SetTrue)]
        featured: bool,
    },
    /// Look up one post by slug.
    Post {
        #[arg(value_name = "SLUG")]
        slug: String,
    },
}
