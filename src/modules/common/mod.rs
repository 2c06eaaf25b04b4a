// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use super::error::code::ErrorCode;
use super::error::RelayError;
use crate::raise_error;
use poem::error::ResponseError;
use poem::{http::StatusCode, Body, Error, Response};
use tracing::error;

pub mod error;
pub mod limit;
pub mod log;

#[inline]
pub fn create_api_error_response(message: &str, code: ErrorCode) -> Error {
    raise_error!(message.into(), code).into()
}

impl ResponseError for RelayError {
    fn status(&self) -> StatusCode {
        self.code().status()
    }

    fn as_response(&self) -> Response
    where
        Self: std::error::Error + Send + Sync + 'static,
    {
        match self {
            RelayError::Generic {
                message,
                location,
                code,
            } => {
                error!(
                    error_code = *code as u32,
                    error_message = %message,
                    error_location = ?location
                );

                let body = serde_json::json!({
                    "code": *code as u32,
                    "message": message,
                });

                Response::builder()
                    .status(self.status())
                    .content_type("application/json; charset=utf-8")
                    .body(Body::from_string(body.to_string()))
            }
        }
    }
}
