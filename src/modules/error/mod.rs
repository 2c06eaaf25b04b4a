// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use code::ErrorCode;
use serde::Serialize;
use snafu::{Location, Snafu};

pub mod code;
pub mod handler;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RelayError {
    #[snafu(display("{message}"))]
    Generic {
        message: String,
        #[snafu(implicit)]
        location: Location,
        code: ErrorCode,
    },
}

pub type RelayResult<T, E = RelayError> = std::result::Result<T, E>;

impl RelayError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RelayError::Generic { code, .. } => *code,
        }
    }
}

/// JSON body of every error response: `{"code": 30000, "message": "..."}`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub code: u32,
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl std::fmt::Display, code: ErrorCode) -> Self {
        Self {
            code: code as u32,
            message: format!("{:#}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raise_error;

    #[test]
    fn code_is_carried_by_generic_error() {
        let error = raise_error!("boom".into(), ErrorCode::NetworkError);
        assert_eq!(error.code(), ErrorCode::NetworkError);
        assert_eq!(error.to_string(), "boom");
    }

    #[test]
    fn api_error_serializes_numeric_code() {
        let json =
            serde_json::to_value(ApiError::new("missing", ErrorCode::ResourceNotFound)).unwrap();
        assert_eq!(json, serde_json::json!({ "code": 30000, "message": "missing" }));
    }
}
