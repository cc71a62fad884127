//! Hand-off point to downstream business logic.

use thiserror::Error;
use tracing::info;

use super::types::StatusUpdateEvent;

/// A downstream failure while applying an admitted status update.
///
/// The message is logged, never returned to the sender.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SinkError(pub String);

impl SinkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Receives each validated, de-duplicated status update.
///
/// The receiver calls [`StatusUpdateSink::deliver`] at most once per
/// admitted event id. On `Err` the id is released so the hub's next
/// redelivery is processed instead of being ignored as a duplicate.
pub trait StatusUpdateSink: Send + Sync {
    fn deliver(&self, event: &StatusUpdateEvent) -> Result<(), SinkError>;
}

/// Default sink: records the business fields as a structured log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl StatusUpdateSink for LogSink {
    fn deliver(&self, event: &StatusUpdateEvent) -> Result<(), SinkError> {
        info!(
            event_id = %event.event_id,
            transfer_id = %event.data.transfer_id,
            previous_state = ?event.data.previous_state,
            state = %event.data.state,
            npn = ?event.data.npn,
            reason_codes = ?event.data.reason_codes,
            occurred_at = %event.occurred_at,
            source = %event.source,
            "transfer_status_processed"
        );
        Ok(())
    }
}
