mod content;
mod email;
mod error;
mod middleware;
mod site;

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tokio::{net::TcpListener, sync::Notify};
use tracing::{info, warn};

use crate::application::contact::ContactService;
use crate::application::error::AppError;
use crate::application::queries::ContentQueries;
use crate::application::sitemap::SitemapService;
use crate::config::ServerSettings;
use crate::infra::error::InfraError;

pub use error::{ApiError, codes};
pub use middleware::{REQUEST_ID_HEADER, RequestContext};

#[derive(Clone)]
pub struct HttpState {
    pub queries: ContentQueries,
    /// `None` when no email provider is configured; email routes then fail.
    pub contact: Option<ContactService>,
    pub sitemap: Arc<SitemapService>,
}

pub fn build_router(state: HttpState) -> Router {
    let content = Router::new()
        .route("/posts", get(content::list_posts))
        .route("/posts/categories", get(content::post_categories))
        .route("/posts/{slug}", get(content::post_by_slug))
        .route("/projects", get(content::list_projects))
        .route("/projects/categories", get(content::project_categories));

    Router::new()
        .nest("/api/content", content)
        .route("/api/email/send", post(email::send_email))
        .route("/api/contact", post(email::submit_contact))
        .route("/sitemap.xml", get(site::sitemap))
        .route("/robots.txt", get(site::robots_txt))
        .route("/_health", get(site::health))
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}

/// Serve `router` until a shutdown signal arrives, then give open connections
/// `graceful_shutdown` to finish.
pub async fn serve(settings: &ServerSettings, router: Router) -> Result<(), AppError> {
    let listener = TcpListener::bind(settings.addr)
        .await
        .map_err(|source| {
            AppError::from(InfraError::Bind {
                addr: settings.addr,
                source,
            })
        })?;
    info!(addr = %settings.addr, "listening");

    let stopping = Arc::new(Notify::new());
    let signal = {
        let stopping = Arc::clone(&stopping);
        async move {
            shutdown_signal().await;
            info!("shutdown signal received");
            stopping.notify_one();
        }
    };

    let server = axum::serve(listener, router.into_make_service()).with_graceful_shutdown(signal);
    let grace = settings.graceful_shutdown;

    tokio::select! {
        result = server => result.map_err(|err| AppError::unexpected(format!("server error: {err}"))),
        () = async {
            stopping.notified().await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(grace_seconds = grace.as_secs(), "graceful shutdown timed out");
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
