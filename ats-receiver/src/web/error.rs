//! Terminal failure states of the webhook pipeline and their HTTP shape.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::event::{SinkError, ValidationError};

/// Every way a webhook request can be rejected.
#[derive(Debug, Error)]
pub enum ReceiverError {
    /// No usable secret; details go to the log, not the response.
    #[error("webhook secret is not configured")]
    NotConfigured,

    #[error("missing signature header")]
    MissingSignature,

    #[error("invalid signature")]
    InvalidSignature,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Downstream rejected an admitted event; details go to the log.
    #[error("status update delivery failed: {0}")]
    Delivery(#[from] SinkError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct ProblemBody {
    detail: &'static str,
}

impl IntoResponse for ReceiverError {
    fn into_response(self) -> Response {
        match self {
            ReceiverError::NotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProblemBody {
                    detail: "Receiver is not configured.",
                }),
            )
                .into_response(),
            ReceiverError::Delivery(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProblemBody {
                    detail: "Failed to process status update.",
                }),
            )
                .into_response(),
            // No body: do not tell the caller which check failed.
            ReceiverError::MissingSignature | ReceiverError::InvalidSignature => {
                StatusCode::UNAUTHORIZED.into_response()
            }
            ReceiverError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: e.to_string(),
                }),
            )
                .into_response(),
        }
    }
}
