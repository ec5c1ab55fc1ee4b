//! Error types for the webhook API service.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Signature or envelope rejected; the message goes back to the sender
    #[error("Webhook error: {0}")]
    Verification(String),

    /// Dispatch failed; details stay in the logs
    #[error("Webhook handler failed.")]
    HandlerFailed,

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Verification(_) | Self::HandlerFailed => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            Self::Verification(_) => (status, self.to_string()).into_response(),
            Self::HandlerFailed => (
                status,
                Json(ErrorResponse {
                    error: "Webhook handler failed.",
                }),
            )
                .into_response(),
            Self::MethodNotAllowed => {
                (status, [(header::ALLOW, "POST")], self.to_string()).into_response()
            }
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
