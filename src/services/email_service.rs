use std::fs;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::sendgrid::{MailRequest, SendGridClient};
use crate::api::ApiError;
use crate::models::{Attachment, RenderedChart};

pub const SUBJECT: &str = "Daily Stock Market Update";
pub const BODY: &str = "Please find the daily stock market update attached.";

/// The digest email could not be delivered
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Email delivery failed: {0}")]
    Transport(#[from] ApiError),
}

/// Sends the single digest message
#[async_trait]
pub trait EmailDispatcher: Send + Sync {
    /// Send one message carrying `attachments`; returns the provider status code
    async fn send(&self, attachments: &[Attachment]) -> Result<u16, DeliveryError>;
}

/// Dispatcher that mails the digest through SendGrid
pub struct SendGridDispatcher {
    client: SendGridClient,
    sender: String,
    recipient: String,
}

impl SendGridDispatcher {
    pub fn new(client: SendGridClient, sender: String, recipient: String) -> Self {
        Self {
            client,
            sender,
            recipient,
        }
    }

    pub fn build_mail(&self, attachments: &[Attachment]) -> MailRequest {
        MailRequest::plain_text(&self.sender, &self.recipient, SUBJECT, BODY).with_attachments(attachments)
    }
}

#[async_trait]
impl EmailDispatcher for SendGridDispatcher {
    async fn send(&self, attachments: &[Attachment]) -> Result<u16, DeliveryError> {
        let mail = self.build_mail(attachments);
        let status = self.client.send_mail(&mail).await?;
        info!(
            "📧 Email sent to {} with {} attachment(s), status code: {}",
            self.recipient,
            attachments.len(),
            status
        );
        Ok(status)
    }
}

/// Read rendered charts back as PNG attachments.
///
/// A chart whose file is missing or unreadable is left out.
pub fn load_attachments(charts: &[RenderedChart]) -> Vec<Attachment> {
    charts
        .iter()
        .filter_map(|chart| match fs::read(&chart.path) {
            Ok(bytes) => Some(Attachment::png(chart.file_name(), bytes)),
            Err(e) => {
                warn!("Skipping attachment for {} ({}): {}", chart.symbol, chart.path.display(), e);
                None
            }
        })
        .collect()
}
