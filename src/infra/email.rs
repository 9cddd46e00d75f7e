//! Resend-compatible email provider client.

use async_trait::async_trait;
use folio_api_types::EmailRequest;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::application::contact::{EmailError, EmailSender};
use crate::config::EmailSettings;
use crate::infra::contentful::user_agent;

#[derive(Debug, Clone)]
pub struct ResendClient {
    http: Client,
    endpoint: Url,
    api_key: String,
    from: String,
}

#[derive(Debug, Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: Option<String>,
}

impl ResendClient {
    pub fn new(settings: &EmailSettings) -> Result<Self, EmailError> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| EmailError::Config("email.api_key is not set".to_string()))?;

        let mut endpoint = settings.base_url.clone();
        endpoint
            .path_segments_mut()
            .map_err(|()| EmailError::Config("email.base_url cannot be a base URL".to_string()))?
            .pop_if_empty()
            .push("emails");

        let http = Client::builder()
            .user_agent(user_agent())
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| EmailError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            endpoint,
            api_key,
            from: settings.from.clone(),
        })
    }
}

#[async_trait]
impl EmailSender for ResendClient {
    async fn send(&self, message: &EmailRequest) -> Result<(), EmailError> {
        let body = SendEmailBody {
            from: &self.from,
            to: [message.to.as_str()],
            subject: &message.subject,
            text: &message.body,
            reply_to: message.reply_to.as_deref(),
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| EmailError::Delivery {
                status: err.status().map(|status| status.as_u16()),
                message: err.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ProviderError>(&text)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or(text);
        Err(EmailError::Delivery {
            status: Some(status.as_u16()),
            message,
        })
    }
}
