// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use http::header::CONTENT_LENGTH;
use poem::{Endpoint, Middleware, Request, Result};
use tracing::warn;

use crate::modules::error::code::ErrorCode;

use super::create_api_error_response;

/// Rejects requests whose declared `Content-Length` exceeds `max_bytes`.
/// Bodies without the header pass through; the endpoint enforces the
/// limit while streaming them.
pub struct BodyLimit {
    max_bytes: u64,
}

impl BodyLimit {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }
}

impl<E: Endpoint> Middleware<E> for BodyLimit {
    type Output = BodyLimitEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        BodyLimitEndpoint {
            ep,
            max_bytes: self.max_bytes,
        }
    }
}

pub struct BodyLimitEndpoint<E> {
    ep: E,
    max_bytes: u64,
}

#[inline]
fn declared_length(req: &Request) -> Option<u64> {
    req.headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

impl<E: Endpoint> Endpoint for BodyLimitEndpoint<E> {
    type Output = E::Output;

    async fn call(&self, req: Request) -> Result<Self::Output> {
        match declared_length(&req) {
            Some(length) if length > self.max_bytes => {
                warn!(length, max = self.max_bytes, "Rejecting oversized request body");
                Err(create_api_error_response(
                    &format!(
                        "Request body of {} bytes exceeds the limit of {} bytes",
                        length, self.max_bytes
                    ),
                    ErrorCode::PayloadTooLarge,
                ))
            }
            _ => self.ep.call(req).await,
        }
    }
}
