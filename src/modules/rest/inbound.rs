// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use chrono::Utc;
use poem::{
    http::StatusCode,
    web::{Field, Multipart},
    Endpoint, Error, FromRequest, IntoResponse, Request, Response, Result,
};
use tokio::io::AsyncReadExt;
use tracing::{debug, error, warn};

use crate::modules::common::create_api_error_response;
use crate::modules::context::AppState;
use crate::modules::delivery::MailSender;
use crate::modules::error::code::ErrorCode;
use crate::modules::inbound::{Attachment, InboundEmailPayload};

const DEFAULT_ATTACHMENT_MIME: &str = "application/octet-stream";

/// `POST /inbound`: parses the webhook form, runs the pipeline and forwards
/// the result. Answers `200 OK` whenever the form could be read.
pub struct InboundEndpoint<S> {
    state: Arc<AppState<S>>,
    max_body_size: u64,
}

impl<S: MailSender> InboundEndpoint<S> {
    pub fn new(state: Arc<AppState<S>>, max_body_size: u64) -> Self {
        Self {
            state,
            max_body_size,
        }
    }
}

impl<S: MailSender> Endpoint for InboundEndpoint<S> {
    type Output = Response;

    async fn call(&self, req: Request) -> Result<Self::Output> {
        let (req, mut body) = req.split();
        let multipart = Multipart::from_request(&req, &mut body).await?;
        let payload = read_payload(multipart, self.max_body_size).await?;

        let processed = self.state.processor.process(&payload);
        let forward = &processed.forward;
        match self.state.sender.send(forward).await {
            Ok(()) => debug!(
                category = %processed.classification.category,
                forward_to = %forward.destination,
                "Inbound email handled"
            ),
            Err(e) => error!(
                category = %processed.classification.category,
                forward_to = %forward.destination,
                error_code = e.code() as u32,
                "Error forwarding email: {}",
                e
            ),
        }

        Ok("OK".into_response())
    }
}

/// Text parts fill payload fields, parts carrying a filename become
/// attachments in arrival order. Every part is read against what is left of
/// `max_bytes`, so an oversized body is refused without buffering it.
async fn read_payload(mut multipart: Multipart, max_bytes: u64) -> Result<InboundEmailPayload> {
    let mut payload = InboundEmailPayload::new(Utc::now());
    let mut remaining = max_bytes;
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let mime_type = field
            .content_type()
            .unwrap_or(DEFAULT_ATTACHMENT_MIME)
            .to_string();

        let content = read_field(field, remaining, max_bytes).await?;
        remaining -= content.len() as u64;

        match file_name {
            Some(file_name) => {
                payload.add_attachment(Attachment::new(file_name, mime_type, content));
            }
            None => {
                let value = String::from_utf8_lossy(&content).into_owned();
                if !payload.set_field(&name, value) {
                    debug!(field = %name, "Ignoring unknown form field");
                }
            }
        }
    }
    Ok(payload)
}

/// Reads at most `remaining` bytes of one part; one more byte is an error.
async fn read_field(field: Field, remaining: u64, max_bytes: u64) -> Result<Vec<u8>> {
    let reader = field.into_async_read();
    tokio::pin!(reader);
    let mut content = Vec::new();
    reader
        .take(remaining.saturating_add(1))
        .read_to_end(&mut content)
        .await
        .map_err(|e| {
            Error::from_string(
                format!("failed to read form field: {e}"),
                StatusCode::BAD_REQUEST,
            )
        })?;

    if content.len() as u64 > remaining {
        warn!(max = max_bytes, "Rejecting oversized form data");
        return Err(create_api_error_response(
            &format!("Form data exceeds the limit of {} bytes", max_bytes),
            ErrorCode::PayloadTooLarge,
        ));
    }
    Ok(content)
}
