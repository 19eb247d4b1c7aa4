//! Error types for the HTTP API
//!
//! A PDP denial is not an error: it is answered by
//! [`crate::middleware::access_denied`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pep_core::PepError;
use serde::Serialize;
use std::fmt;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Payload too large (413)
    PayloadTooLarge(usize),

    /// Enforcement point error
    Pep(PepError),

    /// Serialization error
    SerializationError(serde_json::Error),
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::PayloadTooLarge(limit) => {
                write!(f, "Payload too large: limit is {} bytes", limit)
            }
            ApiError::Pep(e) => write!(f, "PEP error: {}", e),
            ApiError::SerializationError(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<PepError> for ApiError {
    fn from(err: PepError) -> Self {
        ApiError::Pep(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::SerializationError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::PayloadTooLarge(limit) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                format!("Request body exceeds {} bytes", limit),
            ),
            ApiError::Pep(e) if e.is_pdp_failure() => (
                StatusCode::SERVICE_UNAVAILABLE,
                "pdp_unavailable",
                format!("Authorization service error: {}", e),
            ),
            ApiError::Pep(PepError::InvalidQuery(msg)) => {
                (StatusCode::BAD_REQUEST, "invalid_query", msg)
            }
            ApiError::Pep(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                e.to_string(),
            ),
            ApiError::SerializationError(e) => {
                let msg = format!("Invalid JSON: {}", e);
                (StatusCode::BAD_REQUEST, "invalid_json", msg)
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}
