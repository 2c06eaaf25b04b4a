// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::{code::ErrorCode, ApiError, RelayError};
use poem::error::{
    MethodNotAllowedError, NotFoundError, ParseFormError, ParseMultipartError, ParsePathError,
    ParseQueryError,
};
use poem::{web::Json, IntoResponse, Response};

/// Error code for the poem errors this service can produce.
fn poem_error_code(error: &poem::Error) -> Option<ErrorCode> {
    if error.is::<NotFoundError>() {
        Some(ErrorCode::ResourceNotFound)
    } else if error.is::<MethodNotAllowedError>() {
        Some(ErrorCode::MethodNotAllowed)
    } else if error.is::<ParseMultipartError>()
        || error.is::<ParseFormError>()
        || error.is::<ParsePathError>()
        || error.is::<ParseQueryError>()
    {
        Some(ErrorCode::InvalidParameter)
    } else if error.has_source() {
        Some(ErrorCode::UnhandledPoemError)
    } else {
        None
    }
}

/// Renders any endpoint error as `{code, message}` JSON, keeping the status
/// poem assigned. Bare status errors without a source are passed through.
pub async fn error_handler(error: poem::Error) -> Response {
    if error.is::<RelayError>() {
        return error.into_response();
    }
    match poem_error_code(&error) {
        Some(code) => {
            let status = error.status();
            let mut response = Json(ApiError::new(&error, code)).into_response();
            response.set_status(status);
            response
        }
        None => error.into_response(),
    }
}
