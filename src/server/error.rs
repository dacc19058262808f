//! API errors and their HTTP status mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::storage::{BatchOutcome, InsertOutcome};
use crate::FailureKind;

#[derive(Debug)]
pub enum ApiError {
    /// Create failed validation or persistence (400)
    Rejected { message: String, failure: Option<FailureKind> },

    /// Nothing to return (404)
    NotFound { message: String },

    /// Internal error (500, logged)
    Internal { message: String },
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound { message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Rejected { message: message.into(), failure: Some(FailureKind::Validation) }
    }
}

impl From<InsertOutcome> for ApiError {
    fn from(outcome: InsertOutcome) -> Self {
        Self::Rejected { message: outcome.message, failure: outcome.failure }
    }
}

impl From<BatchOutcome> for ApiError {
    fn from(outcome: BatchOutcome) -> Self {
        Self::Rejected { message: outcome.message, failure: outcome.failure }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Rejected { message, failure } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": message, "kind": failure }),
            ),
            Self::NotFound { message } => (
                StatusCode::NOT_FOUND,
                json!({ "error": message, "kind": "not_found" }),
            ),
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "an internal error occurred", "kind": "internal" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
