use std::{process, sync::Arc};

use folio::{
    application::{
        contact::ContactService, error::AppError, queries::ContentQueries,
        sitemap::SitemapService,
    },
    cache::CacheConfig,
    config::{self, FetchTarget},
    domain::filter::{PostFilter, ProjectFilter},
    infra::{
        content::build_source,
        email::ResendClient,
        http::{self, HttpState},
        telemetry,
    },
};
use serde::Serialize;
use tracing::{Dispatch, Level, dispatcher, error, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Fetch(args) => run_fetch(settings, args.target).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let source = build_source(&settings.content)?;
    let queries = ContentQueries::new(source, CacheConfig::from(&settings.cache));

    let contact = match ResendClient::new(&settings.email) {
        Ok(client) => Some(ContactService::new(
            Arc::new(client),
            settings.email.contact_recipient.clone(),
        )),
        Err(err) => {
            warn!(error = %err, "email dispatch disabled");
            None
        }
    };

    let sitemap = Arc::new(SitemapService::new(
        queries.clone(),
        settings.site.public_url.clone(),
    ));

    let router = http::build_router(HttpState {
        queries,
        contact,
        sitemap,
    });
    http::serve(&settings.server, router).await
}

async fn run_fetch(settings: config::Settings, target: FetchTarget) -> Result<(), AppError> {
    let queries = ContentQueries::new(build_source(&settings.content)?, CacheConfig::disabled());

    let output = match target {
        FetchTarget::Posts {
            limit,
            category,
            drafts,
        } => {
            let mut filter = PostFilter::default().with_published(!drafts);
            if let Some(category) = category {
                filter = filter.with_category(category);
            }
            to_json(&queries.post_service().list(&filter, limit).await?)?
        }
        FetchTarget::Projects {
            limit,
            category,
            featured,
        } => {
            let mut filter = if featured {
                ProjectFilter::featured()
            } else {
                ProjectFilter::default()
            };
            if let Some(category) = category {
                filter = filter.with_category(category);
            }
            to_json(&queries.project_service().list(&filter, limit).await?)?
        }
        FetchTarget::Post { slug } => {
            match queries.post_service().get_by_slug(Some(&slug)).await? {
                Some(post) => to_json(&post)?,
                None => return Err(AppError::NotFound),
            }
        }
    };

    println!("{output}");
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(|err| AppError::unexpected(format!("failed to encode output: {err}")))
}
