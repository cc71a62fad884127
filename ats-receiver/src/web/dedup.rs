//! In-memory, time-bounded record of admitted event ids.
//!
//! State lives for the process lifetime only. A restart forgets every id,
//! and a replay after that is processed again.

use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, error, warn};

/// Default retention for admitted event ids.
pub const DEFAULT_DEDUP_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Longest retention the store accepts; larger values are clamped.
pub const MAX_DEDUP_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Concurrency-safe store of event ids and their expiry instants.
///
/// Admission holds the shard lock for the key across the check and the
/// insert, so two racing callers on the same unseen id cannot both win.
#[derive(Debug)]
pub struct EventDedupStore {
    seen_events: DashMap<String, Instant>,
    ttl: Duration,
}

impl EventDedupStore {
    /// Create a store retaining ids for `ttl`.
    ///
    /// A zero TTL would admit every replay, so it falls back to
    /// [`DEFAULT_DEDUP_TTL`]; anything above [`MAX_DEDUP_TTL`] is clamped.
    pub fn new(ttl: Duration) -> Self {
        let ttl = if ttl.is_zero() {
            warn!(
                default_seconds = DEFAULT_DEDUP_TTL.as_secs(),
                "dedup_ttl_zero_using_default"
            );
            DEFAULT_DEDUP_TTL
        } else if ttl > MAX_DEDUP_TTL {
            warn!(
                requested_seconds = ttl.as_secs(),
                max_seconds = MAX_DEDUP_TTL.as_secs(),
                "dedup_ttl_clamped"
            );
            MAX_DEDUP_TTL
        } else {
            ttl
        };

        Self {
            seen_events: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Admit `event_id` if no unexpired entry exists for it.
    ///
    /// Returns `true` on first (or post-expiry) admission and `false` for a
    /// duplicate. Duplicates do not extend the original expiry.
    pub fn try_register(&self, event_id: &str) -> bool {
        self.try_register_at(event_id, Instant::now())
    }

    pub(crate) fn try_register_at(&self, event_id: &str, now: Instant) -> bool {
        self.cleanup_expired(now);

        // Unrepresentable expiry: refuse admission rather than panic.
        let Some(expires_at) = now.checked_add(self.ttl) else {
            error!(
                event_id = %event_id,
                ttl_seconds = self.ttl.as_secs(),
                "dedup_expiry_overflow"
            );
            return false;
        };

        match self.seen_events.entry(event_id.to_string()) {
            Entry::Occupied(mut entry) => {
                if *entry.get() > now {
                    return false;
                }
                // Expired but not yet swept by this shard pass.
                entry.insert(expires_at);
                true
            }
            Entry::Vacant(entry) => {
                entry.insert(expires_at);
                true
            }
        }
    }

    /// Forget `event_id` so a redelivery is admitted again.
    ///
    /// Used when downstream delivery of an admitted event fails.
    pub fn release(&self, event_id: &str) {
        self.seen_events.remove(event_id);
    }

    /// Number of entries physically held, including any not yet swept.
    pub fn len(&self) -> usize {
        self.seen_events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen_events.is_empty()
    }

    // Full scan on every call; fine for the volumes the hub produces.
    fn cleanup_expired(&self, now: Instant) {
        let before = self.seen_events.len();
        self.seen_events.retain(|_, expires_at| *expires_at > now);
        let removed = before.saturating_sub(self.seen_events.len());

        if removed > 0 {
            debug!(removed = removed, "dedup_entries_expired");
        }
    }
}

impl Default for EventDedupStore {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUP_TTL)
    }
}
