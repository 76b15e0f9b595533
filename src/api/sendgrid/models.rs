use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

use crate::models::Attachment;

/// Request body for POST /v3/mail/send
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailRequest {
    pub personalizations: Vec<Personalization>,
    pub from: EmailAddress,
    pub subject: String,
    pub content: Vec<Content>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Personalization {
    pub to: Vec<EmailAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(rename = "type")]
    pub content_type: String,
    pub value: String,
}

/// Attachment as SendGrid expects it, content base64-encoded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentPayload {
    pub content: String,
    pub filename: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub disposition: String,
}

impl From<&Attachment> for AttachmentPayload {
    fn from(attachment: &Attachment) -> Self {
        Self {
            content: BASE64.encode(&attachment.content),
            filename: attachment.filename.clone(),
            mime_type: attachment.mime_type.to_string(),
            disposition: "attachment".to_string(),
        }
    }
}

impl MailRequest {
    /// Plain-text message from one sender to one recipient
    pub fn plain_text(from: &str, to: &str, subject: &str, body: &str) -> Self {
        Self {
            personalizations: vec![Personalization {
                to: vec![EmailAddress {
                    email: to.to_string(),
                }],
            }],
            from: EmailAddress {
                email: from.to_string(),
            },
            subject: subject.to_string(),
            content: vec![Content {
                content_type: "text/plain".to_string(),
                value: body.to_string(),
            }],
            attachments: Vec::new(),
        }
    }

    pub fn with_attachments<'a, I>(mut self, attachments: I) -> Self
    where
        I: IntoIterator<Item = &'a Attachment>,
    {
        self.attachments
            .extend(attachments.into_iter().map(AttachmentPayload::from));
        self
    }
}
