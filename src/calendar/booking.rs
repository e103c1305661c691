//! Booking deduplication for the assistant path.
//!
//! The assistant may be invoked twice for one user utterance (a retry, or
//! a tool call echoed back through conversation history). The handler
//! fingerprints each create request and suppresses repeats arriving within
//! a short window, turning a wrong double-insert into a visible no-op.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::Timelike;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::store::EventStore;

use super::manager::CalendarManager;
use super::types::EventDraft;

/// Default time a fingerprint stays registered.
pub const DEFAULT_DEDUP_TTL: Duration = Duration::from_secs(600);

/// Result of a create request routed through the deduplicator.
///
/// A suppressed duplicate is a normal outcome, not an error: the caller
/// gets the id of the event the earlier request created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingOutcome {
    /// Id of the created (or previously created) event.
    pub event_id: String,
    /// True when this request was suppressed as a repeat.
    pub was_duplicate: bool,
}

struct CacheEntry {
    event_id: String,
    registered_at: Instant,
}

/// Fingerprint cache for recent bookings.
///
/// Keys are deliberately coarse: the start is truncated to the hour so
/// minute-level jitter between retried requests still collides. Entries
/// expire after `ttl` so the same slot can be legitimately re-booked
/// later. Constructor-injected into the handler; there is no ambient
/// state.
pub struct BookingCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl BookingCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fingerprint for a create request: session, hour-truncated start,
    /// and owner.
    fn fingerprint(session: &str, draft: &EventDraft) -> String {
        format!(
            "{session}:{}T{:02}|{}",
            draft.date,
            draft.time.hour(),
            draft.owner
        )
    }

    fn evict_expired(&self, entries: &mut HashMap<String, CacheEntry>) {
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.registered_at.elapsed() <= ttl);
    }

    /// Number of live entries, expired ones included until the next sweep.
    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

impl Default for BookingCache {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUP_TTL)
    }
}

/// Create-event handler sitting between the assistant tools and the store.
pub struct BookingHandler<S: EventStore> {
    manager: CalendarManager<S>,
    cache: BookingCache,
}

impl<S: EventStore> BookingHandler<S> {
    pub fn new(manager: CalendarManager<S>, cache: BookingCache) -> Self {
        Self { manager, cache }
    }

    /// Create an event unless an identical request was seen recently.
    ///
    /// The cache lock is held across the whole check-insert-register
    /// sequence, so two concurrent identical requests cannot both miss.
    /// The fingerprint is registered only after a successful insert; a
    /// failed insert leaves no trace and a retry can succeed.
    pub async fn create(&self, session: &str, draft: EventDraft) -> Result<BookingOutcome> {
        let fingerprint = BookingCache::fingerprint(session, &draft);

        let mut entries = self.cache.entries.lock().await;
        self.cache.evict_expired(&mut entries);

        if let Some(entry) = entries.get(&fingerprint) {
            debug!(
                fingerprint = %fingerprint,
                event_id = %entry.event_id,
                "Suppressed duplicate booking"
            );
            return Ok(BookingOutcome {
                event_id: entry.event_id.clone(),
                was_duplicate: true,
            });
        }

        let event = self.manager.create(draft).await?;
        entries.insert(
            fingerprint,
            CacheEntry {
                event_id: event.id.clone(),
                registered_at: Instant::now(),
            },
        );

        Ok(BookingOutcome {
            event_id: event.id,
            was_duplicate: false,
        })
    }

    /// The manager this handler writes through.
    pub fn manager(&self) -> &CalendarManager<S> {
        &self.manager
    }
}
