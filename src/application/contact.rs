//! Email dispatch and the contact form built on top of it.

use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use thiserror::Error;
use tracing::{info, warn};

use folio_api_types::{ContactRequest, EmailRequest};

pub(crate) const METRIC_EMAIL_SENT: &str = "folio_email_sent_total";
pub(crate) const METRIC_EMAIL_FAILED: &str = "folio_email_failed_total";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email provider not configured: {0}")]
    Config(String),
    #[error("email provider rejected the message{}: {message}", status_suffix(.status))]
    Delivery {
        status: Option<u16>,
        message: String,
    },
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|status| format!(" with status {status}"))
        .unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("invalid contact submission: {0}")]
    Validation(String),
    #[error(transparent)]
    Email(#[from] EmailError),
}

/// Capability to hand one message to an email provider.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailRequest) -> Result<(), EmailError>;
}

#[derive(Clone)]
pub struct ContactService {
    sender: Arc<dyn EmailSender>,
    recipient: Option<String>,
}

impl ContactService {
    pub fn new(sender: Arc<dyn EmailSender>, recipient: Option<String>) -> Self {
        Self { sender, recipient }
    }

    /// Forward `request` to the provider exactly once.
    pub async fn dispatch(&self, request: &EmailRequest) -> Result<(), EmailError> {
        match self.sender.send(request).await {
            Ok(()) => {
                counter!(METRIC_EMAIL_SENT).increment(1);
                info!(subject = %request.subject, "email dispatched");
                Ok(())
            }
            Err(err) => {
                counter!(METRIC_EMAIL_FAILED).increment(1);
                warn!(error = %err, "email dispatch failed");
                Err(err)
            }
        }
    }

    /// Turn a contact form submission into a message for the site owner.
    pub async fn submit(&self, contact: &ContactRequest) -> Result<(), ContactError> {
        let request = self.compose(contact)?;
        self.dispatch(&request).await?;
        Ok(())
    }

    pub fn compose(&self, contact: &ContactRequest) -> Result<EmailRequest, ContactError> {
        let name = required(&contact.name, "name")?;
        let email = required(&contact.email, "email")?;
        let message = required(&contact.message, "message")?;
        if !email.contains('@') {
            return Err(ContactError::Validation(
                "email must be an email address".into(),
            ));
        }
        let recipient = self.recipient.clone().ok_or_else(|| {
            EmailError::Config("email.contact_recipient is not set".to_string())
        })?;

        Ok(EmailRequest {
            to: recipient,
            subject: format!("Portfolio Contact from {name}"),
            body: format!("Name: {name}\nEmail: {email}\n\nMessage:\n{message}"),
            reply_to: Some(email.to_string()),
        })
    }
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, ContactError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ContactError::Validation(format!("{field} is required")));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<EmailRequest>>,
    }

    #[async_trait]
    impl EmailSender for RecordingSender {
        async fn send(&self, message: &EmailRequest) -> Result<(), EmailError> {
            self.sent.lock().expect("lock").push(message.clone());
            Ok(())
        }
    }

    fn contact(name: &str, email: &str, message: &str) -> ContactRequest {
        ContactRequest {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    #[tokio::test]
    async fn submission_is_formatted_for_the_owner() {
        let sender = Arc::new(RecordingSender::default());
        let service = ContactService::new(sender.clone(), Some("owner@example.com".into()));

        service
            .submit(&contact("Ada", "ada@example.com", "Let's talk."))
            .await
            .expect("submitted");

        let sent = sender.sent.lock().expect("lock");
        assert_eq!(
            sent.as_slice(),
            [EmailRequest {
                to: "owner@example.com".into(),
                subject: "Portfolio Contact from Ada".into(),
                body: "Name: Ada\nEmail: ada@example.com\n\nMessage:\nLet's talk.".into(),
                reply_to: Some("ada@example.com".into()),
            }]
        );
    }

    #[tokio::test]
    async fn blank_fields_are_rejected_before_sending() {
        let sender = Arc::new(RecordingSender::default());
        let service = ContactService::new(sender.clone(), Some("owner@example.com".into()));

        let err = service
            .submit(&contact("Ada", "  ", "hi"))
            .await
            .expect_err("blank email");
        assert!(matches!(err, ContactError::Validation(_)));
        assert!(sender.sent.lock().expect("lock").is_empty());
    }

    #[test]
    fn missing_recipient_is_a_config_error() {
        let service = ContactService::new(Arc::new(RecordingSender::default()), None);
        let err = service
            .compose(&contact("Ada", "ada@example.com", "hi"))
            .expect_err("no recipient");
        assert!(matches!(err, ContactError::Email(EmailError::Config(_))));
    }

    #[test]
    fn delivery_error_mentions_status() {
        let err = EmailError::Delivery {
            status: Some(422),
            message: "invalid from".into(),
        };
        assert_eq!(
            err.to_string(),
            "email provider rejected the message with status 422: invalid from"
        );
    }
}
