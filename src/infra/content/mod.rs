//! `ContentSource` implementations and their construction from settings.

pub mod memory;
pub mod proxy;
pub mod remote;

use std::sync::Arc;

use tracing::info;

use crate::application::content::ContentSource;
use crate::application::error::{AppError, ContentError};
use crate::config::{ContentSettings, ContentSourceKind};
use crate::infra::contentful::{ContentClient, ContentClientConfig};

pub use memory::InMemorySource;
pub use proxy::ProxySource;
pub use remote::RemoteSource;

/// Build the source selected by `content.source`.
pub fn build_source(settings: &ContentSettings) -> Result<Arc<dyn ContentSource>, AppError> {
    let source: Arc<dyn ContentSource> = match settings.source {
        ContentSourceKind::Remote => {
            let client = ContentClient::new(ContentClientConfig {
                space_id: settings.space_id.clone().unwrap_or_default(),
                access_token: settings.access_token.clone().unwrap_or_default(),
                environment: settings.environment.clone(),
                base_url: settings.base_url.clone(),
                timeout: settings.request_timeout,
            })?;
            Arc::new(RemoteSource::new(
                client,
                settings.post_content_type.clone(),
                settings.project_content_type.clone(),
            ))
        }
        ContentSourceKind::Proxy => {
            let base = settings.proxy_url.clone().ok_or_else(|| {
                ContentError::config("content.proxy_url is required for the proxy source")
            })?;
            Arc::new(ProxySource::new(base, settings.request_timeout)?)
        }
        ContentSourceKind::Memory => match settings.fixture_path.as_deref() {
            Some(path) => Arc::new(InMemorySource::from_fixture(path)?),
            None => Arc::new(InMemorySource::demo()),
        },
    };

    info!(
        source = source.name(),
        environment = %settings.environment,
        "content source ready"
    );
    Ok(source)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use url::Url;

    use super::*;

    fn settings(source: ContentSourceKind) -> ContentSettings {
        ContentSettings {
            source,
            space_id: None,
            access_token: None,
            environment: "master".into(),
            base_url: Url::parse("https://cdn.contentful.com").expect("url"),
            proxy_url: None,
            fixture_path: None,
            request_timeout: Duration::from_secs(30),
            post_content_type: "personalBlog".into(),
            project_content_type: "personalProjects".into(),
        }
    }

    #[test]
    fn remote_source_without_credentials_is_a_config_error() {
        let result = build_source(&settings(ContentSourceKind::Remote));
        assert!(matches!(
            result,
            Err(AppError::Content(ContentError::Config(_)))
        ));
    }

    #[test]
    fn memory_source_needs_no_credentials() {
        let source = build_source(&settings(ContentSourceKind::Memory)).expect("memory source");
        assert_eq!(source.name(), "memory");
    }

    #[test]
    fn missing_fixture_is_an_io_error() {
        let mut settings = settings(ContentSourceKind::Memory);
        settings.fixture_path = Some("/definitely/not/here.toml".into());
        assert!(matches!(build_source(&settings), Err(AppError::Infra(_))));
    }
}
