//! Webhook endpoint handlers.
//!
//! The status webhook runs a fixed pipeline, each step a terminal exit on
//! failure:
//! 1. Resolve the shared secret
//! 2. Require the signature and event id headers
//! 3. Buffer the raw body and verify its signature
//! 4. Decode, validate, and cross-check the event id
//! 5. Admit the event id through the dedup store
//! 6. Deliver the event downstream, releasing the id if delivery fails

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{self, Body},
    extract::{Request, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::{
    Config, SecretSource, DEFAULT_MAX_BODY_BYTES, SECRET_CONFIG_KEY, SECRET_ENV_VAR,
};
use crate::event::{
    ensure_event_id_matches, parse_status_update, LogSink, StatusUpdateSink, ValidationError,
};
use crate::web::dedup::EventDedupStore;
use crate::web::error::ReceiverError;
use crate::web::signature::verify_signature;

/// Header carrying the `sha256=<hex>` body signature.
pub const SIGNATURE_HEADER: &str = "X-ATS-Signature";

/// Header carrying the sender's event id.
pub const EVENT_ID_HEADER: &str = "X-ATS-Event-Id";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub secret: SecretSource,
    pub dedup: Arc<EventDedupStore>,
    pub sink: Arc<dyn StatusUpdateSink>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            secret: SecretSource::from_config(config),
            dedup: Arc::new(EventDedupStore::new(Duration::from_secs(
                config.dedup_ttl_seconds,
            ))),
            sink: Arc::new(LogSink),
            max_body_bytes: config.max_body_bytes,
        }
    }

    /// State with a fixed secret and default TTL, log sink and body limit.
    pub fn with_secret(secret: SecretSource) -> Self {
        Self {
            secret,
            dedup: Arc::new(EventDedupStore::default()),
            sink: Arc::new(LogSink),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn StatusUpdateSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_dedup(mut self, dedup: Arc<EventDedupStore>) -> Self {
        self.dedup = dedup;
        self
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// ATS Status Webhook
// =============================================================================

/// Successful webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    #[serde(rename = "eventId")]
    pub event_id: String,
}

impl WebhookResponse {
    fn processed(event_id: String) -> Self {
        Self {
            status: "processed",
            event_id,
        }
    }

    fn duplicate_ignored(event_id: String) -> Self {
        Self {
            status: "duplicate_ignored",
            event_id,
        }
    }
}

/// ATS transfer status webhook endpoint.
///
/// Duplicates are a success: the hub delivers at least once and a replay
/// of an admitted event id is acknowledged without being processed again.
pub async fn ats_status_webhook(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<WebhookResponse>, ReceiverError> {
    let secret = match state.secret.resolve() {
        Some(secret) => secret,
        None => {
            error!(
                env_var = SECRET_ENV_VAR,
                config_key = SECRET_CONFIG_KEY,
                "webhook_secret_not_configured"
            );
            return Err(ReceiverError::NotConfigured);
        }
    };

    let (parts, body) = request.into_parts();

    let signature = header_str(&parts.headers, SIGNATURE_HEADER)
        .ok_or(ReceiverError::MissingSignature)?
        .to_string();

    let event_id = require_event_id(&parts.headers)?;

    let body_bytes = read_body(body, state.max_body_bytes, &event_id).await?;

    if !verify_signature(&signature, &body_bytes, &secret) {
        warn!(event_id = %event_id, "webhook_signature_invalid");
        return Err(ReceiverError::InvalidSignature);
    }

    let event = parse_status_update(&body_bytes).map_err(|e| {
        warn!(event_id = %event_id, reason = %e, "webhook_payload_rejected");
        e
    })?;

    ensure_event_id_matches(&event, &event_id).map_err(|e| {
        warn!(
            event_id = %event_id,
            payload_event_id = %event.event_id,
            "webhook_event_id_mismatch"
        );
        e
    })?;

    if !state.dedup.try_register(&event_id) {
        info!(event_id = %event_id, "webhook_duplicate_ignored");
        return Ok(Json(WebhookResponse::duplicate_ignored(event_id)));
    }

    if let Err(e) = state.sink.deliver(&event) {
        error!(
            event_id = %event_id,
            transfer_id = %event.data.transfer_id,
            error = %e,
            "webhook_delivery_failed"
        );
        state.dedup.release(&event_id);
        return Err(ReceiverError::Delivery(e));
    }

    Ok(Json(WebhookResponse::processed(event_id)))
}

/// First value of `name` as a string, if present and valid UTF-8.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
}

fn require_event_id(headers: &HeaderMap) -> Result<String, ValidationError> {
    if !headers.contains_key(EVENT_ID_HEADER) {
        return Err(ValidationError::MissingEventIdHeader);
    }

    match header_str(headers, EVENT_ID_HEADER) {
        Some(id) if !id.trim().is_empty() => Ok(id.to_string()),
        _ => Err(ValidationError::EmptyEventIdHeader),
    }
}

/// Buffer the whole body; the signature must cover exactly these bytes.
async fn read_body(
    body: Body,
    limit: usize,
    event_id: &str,
) -> Result<body::Bytes, ValidationError> {
    body::to_bytes(body, limit).await.map_err(|e| {
        debug!(event_id = %event_id, error = %e, "webhook_body_unreadable");
        ValidationError::UnreadableBody
    })
}
