//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    fmt,
    net::SocketAddr,
    num::{NonZeroU64, NonZeroUsize},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use clap::{Parser, ValueEnum};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

mod cli;

pub use cli::{CliArgs, Command, ContentOverrides, FetchArgs, FetchTarget, ServeArgs, ServeOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "folio";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_CONTENT_ENVIRONMENT: &str = "master";
const DEFAULT_CONTENT_BASE_URL: &str = "https://cdn.contentful.com";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POST_CONTENT_TYPE: &str = "personalBlog";
const DEFAULT_PROJECT_CONTENT_TYPE: &str = "personalProjects";
const DEFAULT_EMAIL_FROM: &str = "onboarding@resend.dev";
const DEFAULT_EMAIL_BASE_URL: &str = "https://api.resend.com";
const DEFAULT_LIST_TTL_SECS: u64 = 60;
const DEFAULT_POST_TTL_SECS: u64 = 300;
const DEFAULT_CACHE_MAX_ENTRIES: usize = 512;
const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";

/// Where content is read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ContentSourceKind {
    /// The content delivery API.
    #[default]
    Remote,
    /// Another folio instance's `/api/content` routes.
    Proxy,
    /// Built-in demo data or a TOML fixture.
    Memory,
}

impl fmt::Display for ContentSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Remote => "remote",
            Self::Proxy => "proxy",
            Self::Memory => "memory",
        })
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub content: ContentSettings,
    pub email: EmailSettings,
    pub cache: CacheSettings,
    pub site: SiteSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub source: ContentSourceKind,
    /// Credentials stay optional here; the remote client rejects them when
    /// missing so other sources run without them.
    pub space_id: Option<String>,
    pub access_token: Option<String>,
    pub environment: String,
    pub base_url: Url,
    pub proxy_url: Option<Url>,
    pub fixture_path: Option<PathBuf>,
    pub request_timeout: Duration,
    pub post_content_type: String,
    pub project_content_type: String,
}

#[derive(Debug, Clone)]
pub struct EmailSettings {
    pub api_key: Option<String>,
    pub from: String,
    pub base_url: Url,
    pub contact_recipient: Option<String>,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub list_ttl_seconds: NonZeroU64,
    pub post_ttl_seconds: NonZeroU64,
    pub serve_stale: bool,
    /// Upper bound on cached keys per query kind.
    pub max_entries: NonZeroUsize,
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub public_url: Url,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("FOLIO").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Fetch(args)) => raw.apply_content_overrides(&args.content),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    content: RawContentSettings,
    email: RawEmailSettings,
    cache: RawCacheSettings,
    site: RawSiteSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(enabled) = overrides.cache_enabled {
            self.cache.enabled = Some(enabled);
        }
        if let Some(url) = overrides.site_public_url.as_ref() {
            self.site.public_url = Some(url.clone());
        }

        self.apply_content_overrides(&overrides.content);
    }

    fn apply_content_overrides(&mut self, overrides: &ContentOverrides) {
        if let Some(source) = overrides.source {
            self.content.source = Some(source);
        }
        if let Some(path) = overrides.fixture_path.as_ref() {
            self.content.fixture_path = Some(path.clone());
        }
        if let Some(url) = overrides.proxy_url.as_ref() {
            self.content.proxy_url = Some(url.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            content,
            email,
            cache,
            site,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            content: build_content_settings(content)?,
            email: build_email_settings(email)?,
            cache: build_cache_settings(cache)?,
            site: build_site_settings(site)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr =
        parse_socket_addr(&host, port).map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_content_settings(content: RawContentSettings) -> Result<ContentSettings, LoadError> {
    let source = content.source.unwrap_or_default();

    let base_url = parse_url(
        content.base_url.as_deref().unwrap_or(DEFAULT_CONTENT_BASE_URL),
        "content.base_url",
    )?;
    let proxy_url = non_blank(content.proxy_url)
        .map(|raw| parse_url(&raw, "content.proxy_url"))
        .transpose()?;
    if source == ContentSourceKind::Proxy && proxy_url.is_none() {
        return Err(LoadError::invalid(
            "content.proxy_url",
            "required when content.source = \"proxy\"",
        ));
    }

    let fixture_path = content
        .fixture_path
        .filter(|path| !path.as_os_str().is_empty());

    let timeout_secs = content
        .request_timeout_seconds
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
    let request_timeout = Duration::from_secs(
        non_zero_u64(timeout_secs, "content.request_timeout_seconds")?.get(),
    );

    let post_content_type = non_blank(content.post_content_type)
        .unwrap_or_else(|| DEFAULT_POST_CONTENT_TYPE.to_string());
    let project_content_type = non_blank(content.project_content_type)
        .unwrap_or_else(|| DEFAULT_PROJECT_CONTENT_TYPE.to_string());

    Ok(ContentSettings {
        source,
        space_id: non_blank(content.space_id),
        access_token: non_blank(content.access_token),
        environment: non_blank(content.environment)
            .unwrap_or_else(|| DEFAULT_CONTENT_ENVIRONMENT.to_string()),
        base_url,
        proxy_url,
        fixture_path,
        request_timeout,
        post_content_type,
        project_content_type,
    })
}

fn build_email_settings(email: RawEmailSettings) -> Result<EmailSettings, LoadError> {
    let base_url = parse_url(
        email.base_url.as_deref().unwrap_or(DEFAULT_EMAIL_BASE_URL),
        "email.base_url",
    )?;
    let from = non_blank(email.from).unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_string());
    let timeout_secs = email
        .request_timeout_seconds
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

    Ok(EmailSettings {
        api_key: non_blank(email.api_key),
        from,
        base_url,
        contact_recipient: non_blank(email.contact_recipient),
        request_timeout: Duration::from_secs(
            non_zero_u64(timeout_secs, "email.request_timeout_seconds")?.get(),
        ),
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    Ok(CacheSettings {
        enabled: cache.enabled.unwrap_or(true),
        list_ttl_seconds: non_zero_u64(
            cache.list_ttl_seconds.unwrap_or(DEFAULT_LIST_TTL_SECS),
            "cache.list_ttl_seconds",
        )?,
        post_ttl_seconds: non_zero_u64(
            cache.post_ttl_seconds.unwrap_or(DEFAULT_POST_TTL_SECS),
            "cache.post_ttl_seconds",
        )?,
        serve_stale: cache.serve_stale.unwrap_or(true),
        max_entries: NonZeroUsize::new(cache.max_entries.unwrap_or(DEFAULT_CACHE_MAX_ENTRIES))
            .ok_or_else(|| LoadError::invalid("cache.max_entries", "must be greater than zero"))?,
    })
}

fn build_site_settings(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    let public_url = parse_url(
        site.public_url.as_deref().unwrap_or(DEFAULT_PUBLIC_URL),
        "site.public_url",
    )?;
    if public_url.cannot_be_a_base() {
        return Err(LoadError::invalid(
            "site.public_url",
            "must be an absolute http(s) URL",
        ));
    }
    Ok(SiteSettings { public_url })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentSettings {
    source: Option<ContentSourceKind>,
    space_id: Option<String>,
    access_token: Option<String>,
    environment: Option<String>,
    base_url: Option<String>,
    proxy_url: Option<String>,
    fixture_path: Option<PathBuf>,
    request_timeout_seconds: Option<u64>,
    post_content_type: Option<String>,
    project_content_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawEmailSettings {
    api_key: Option<String>,
    from: Option<String>,
    base_url: Option<String>,
    contact_recipient: Option<String>,
    request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    list_ttl_seconds: Option<u64>,
    post_ttl_seconds: Option<u64>,
    serve_stale: Option<bool>,
    max_entries: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    public_url: Option<String>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn parse_url(raw: &str, key: &'static str) -> Result<Url, LoadError> {
    Url::parse(raw.trim()).map_err(|err| LoadError::invalid(key, format!("invalid URL: {err}")))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn non_zero_u64(value: u64, key: &'static str) -> Result<NonZeroU64, LoadError> {
    NonZeroU64::new(value).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

#[cfg(test)]
mod tests;
