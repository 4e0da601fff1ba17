//! Application error types and Axum response conversion.

use agentbridge_core::BridgeError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::dto::ErrorResponse;

pub const MISSING_FIELDS: &str = "Message and sessionId are required.";
const GENERIC_FAILURE: &str = "An error occurred while processing your request.";
const ORIGIN_NOT_ALLOWED: &str = "Origin not allowed.";

/// Application-level errors with HTTP status code mapping.
///
/// `Internal` keeps the detail for logging only; clients always get the
/// generic message.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Forbidden,
    Internal(String),
}

impl From<BridgeError> for AppError {
    fn from(e: BridgeError) -> Self {
        match e {
            BridgeError::Validation(message) => AppError::BadRequest(message),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Forbidden => (StatusCode::FORBIDDEN, ORIGIN_NOT_ALLOWED.to_string()),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE.to_string()),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
