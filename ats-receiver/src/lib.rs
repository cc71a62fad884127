//! ATS webhook receiver - signed, de-duplicated transfer status updates.
//!
//! The ATS hub posts a JSON status event for every transfer state change,
//! signed with a shared secret and delivered at least once. This crate
//! authenticates each delivery against its exact bytes, validates it, and
//! forwards every event id downstream at most once.
//!
//! ## Architecture
//!
//! ```text
//! Hub → POST /hooks/ats-status → signature → validation → dedup → sink
//! ```

pub mod config;
pub mod event;
pub mod web;

// Re-export commonly used types
pub use config::{Config, SecretSource};
pub use event::{
    LogSink, SinkError, StatusUpdateData, StatusUpdateEvent, StatusUpdateSink,
};
pub use web::{router, AppState, EventDedupStore};
