//! Wire types for ATS transfer status webhooks.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The only `eventType` this receiver accepts.
pub const STATUS_UPDATE_EVENT_TYPE: &str = "transfer.status.updated";

/// A transfer status change notification from the ATS hub.
///
/// Unknown fields are ignored so the hub can add to the envelope without
/// breaking older receivers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateEvent {
    /// Unique per logical event; must match the `X-ATS-Event-Id` header
    pub event_id: String,
    pub event_type: String,
    pub occurred_at: DateTime<Utc>,
    /// Name of the emitting system, e.g. `centralized-hub`
    pub source: String,
    pub data: StatusUpdateData,
}

/// Transfer-specific body of a status update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateData {
    pub transfer_id: String,
    pub state: String,
    #[serde(default)]
    pub previous_state: Option<String>,
    /// National Producer Number of the agent being transferred
    #[serde(default)]
    pub npn: Option<String>,
    #[serde(default)]
    pub reason_codes: Option<Vec<String>>,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
}
