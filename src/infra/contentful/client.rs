use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::application::error::ContentError;
use crate::application::query::QueryParams;

use super::mapping::EntryCollection;

pub const DEFAULT_ENVIRONMENT: &str = "master";

#[derive(Debug, Clone)]
pub struct ContentClientConfig {
    pub space_id: String,
    pub access_token: String,
    pub environment: String,
    pub base_url: Url,
    pub timeout: Duration,
}

/// Thin client for the content delivery API's entries endpoint.
#[derive(Debug, Clone)]
pub struct ContentClient {
    http: Client,
    entries_url: Url,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: Option<String>,
}

impl ContentClient {
    pub fn new(config: ContentClientConfig) -> Result<Self, ContentError> {
        let space_id = config.space_id.trim();
        let access_token = config.access_token.trim();
        if space_id.is_empty() || access_token.is_empty() {
            return Err(ContentError::config(
                "content credentials missing: set content.space_id and content.access_token",
            ));
        }
        let environment = match config.environment.trim() {
            "" => DEFAULT_ENVIRONMENT,
            environment => environment,
        };

        let mut entries_url = config.base_url;
        entries_url
            .path_segments_mut()
            .map_err(|()| ContentError::config("content.base_url cannot be a base URL"))?
            .pop_if_empty()
            .extend(["spaces", space_id, "environments", environment, "entries"]);

        let http = Client::builder()
            .user_agent(user_agent())
            .timeout(config.timeout)
            .build()
            .map_err(|err| ContentError::config(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            entries_url,
            access_token: access_token.to_string(),
        })
    }

    pub fn entries_url(&self) -> &Url {
        &self.entries_url
    }

    pub async fn get_entries<F: DeserializeOwned>(
        &self,
        params: &QueryParams,
    ) -> Result<EntryCollection<F>, ContentError> {
        let mut url = self.entries_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(transport_error)?;
        handle(response).await
    }
}

pub(crate) fn user_agent() -> &'static str {
    concat!("folio/", env!("CARGO_PKG_VERSION"))
}

pub(crate) fn transport_error(err: reqwest::Error) -> ContentError {
    ContentError::fetch(err.status().map(|status| status.as_u16()), err.to_string())
}

async fn handle<T: DeserializeOwned>(response: Response) -> Result<T, ContentError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(transport_error)?;
    if !status.is_success() {
        let message = serde_json::from_slice::<ProviderError>(&bytes)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned());
        return Err(ContentError::fetch(Some(status.as_u16()), message));
    }
    serde_json::from_slice(&bytes).map_err(|err| {
        ContentError::fetch(
            Some(status.as_u16()),
            format!("failed to parse response body: {err}"),
        )
    })
}
