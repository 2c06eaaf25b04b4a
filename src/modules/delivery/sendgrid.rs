// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::modules::delivery::MailSender;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::RelayResult;
use crate::modules::forward::{ForwardPayload, OutboundAttachment};
use crate::{base64_encode, raise_error, relay_version};

const MAIL_SEND_PATH: &str = "/v3/mail/send";

/// Client for the SendGrid v3 Mail Send API.
pub struct SendGridClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl SendGridClient {
    pub fn new(api_key: &str, base_url: &str) -> RelayResult<SendGridClient> {
        let client = reqwest::ClientBuilder::new()
            .user_agent(format!("inbound-relay/{}", relay_version!()))
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                raise_error!(
                    format!("Failed to build HTTP client: {:#?}", e),
                    ErrorCode::InternalError
                )
            })?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), MAIL_SEND_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl MailSender for SendGridClient {
    async fn send(&self, payload: &ForwardPayload) -> RelayResult<()> {
        let message = SendGridMessage::from(payload);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&message)
            .send()
            .await
            .map_err(|e| {
                raise_error!(
                    format!("SendGrid request failed: {:#?}", e),
                    ErrorCode::NetworkError
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(raise_error!(
                format!("SendGrid rejected the message ({}): {}", status, body),
                ErrorCode::HttpResponseError
            ));
        }

        info!(
            forward_to = %payload.destination,
            from = %payload.sender,
            subject = %payload.subject_line,
            attachments = payload.attachments.len(),
            "Email forwarded successfully"
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct SendGridMessage {
    pub personalizations: Vec<Personalization>,
    pub from: EmailAddress,
    pub subject: String,
    pub content: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<SendGridAttachment>,
}

#[derive(Debug, Serialize)]
pub struct Personalization {
    pub to: Vec<EmailAddress>,
}

#[derive(Debug, Serialize)]
pub struct EmailAddress {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct Content {
    #[serde(rename = "type")]
    pub content_type: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct SendGridAttachment {
    /// Base64 encoded file content.
    pub content: String,
    pub filename: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub disposition: String,
}

impl From<&OutboundAttachment> for SendGridAttachment {
    fn from(attachment: &OutboundAttachment) -> Self {
        Self {
            content: base64_encode!(&attachment.content),
            filename: attachment.filename.clone(),
            mime_type: attachment.mime_type.clone(),
            disposition: "attachment".to_string(),
        }
    }
}

impl From<&ForwardPayload> for SendGridMessage {
    fn from(payload: &ForwardPayload) -> Self {
        Self {
            personalizations: vec![Personalization {
                to: vec![EmailAddress {
                    email: payload.destination.clone(),
                }],
            }],
            from: EmailAddress {
                email: payload.sender.clone(),
            },
            subject: payload.subject_line.clone(),
            content: vec![Content {
                content_type: "text/html".to_string(),
                value: payload.html_body.clone(),
            }],
            attachments: payload
                .attachments
                .iter()
                .map(SendGridAttachment::from)
                .collect(),
        }
    }
}
