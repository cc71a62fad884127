//! Status update events: wire types, validation, and the downstream sink.

pub mod sink;
pub mod types;
pub mod validate;

pub use sink::{LogSink, SinkError, StatusUpdateSink};
pub use types::{StatusUpdateData, StatusUpdateEvent, STATUS_UPDATE_EVENT_TYPE};
pub use validate::{
    ensure_event_id_matches, parse_status_update, validate_status_update, ValidationError,
};
