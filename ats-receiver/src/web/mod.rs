//! Web server module for the ATS status webhook.
//!
//! This module provides the HTTP surface of the receiver:
//! - `GET /health` for liveness checks
//! - `POST /hooks/ats-status` for signed transfer status updates
//!
//! Each request is authenticated against the raw body, validated, and
//! admitted through the dedup store before it reaches the sink.

pub mod dedup;
pub mod error;
pub mod handlers;
pub mod signature;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use dedup::{EventDedupStore, DEFAULT_DEDUP_TTL};
pub use error::ReceiverError;
pub use handlers::{
    ats_status_webhook, health, AppState, HealthResponse, WebhookResponse, EVENT_ID_HEADER,
    SIGNATURE_HEADER,
};
pub use signature::{compute_signature, signature_header_value, verify_signature};

/// Build the receiver's router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/hooks/ats-status", post(ats_status_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
