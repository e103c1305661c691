//! Event storage trait and embedded implementation.

mod memory;

pub use memory::EmbeddedEventStore;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::calendar::{Event, EventUpdate};
use crate::error::Result;

/// Trait for event storage backends.
///
/// All mutations are atomic per event. `mark_reminder_sent` is the
/// conditional write the reminder sweep relies on for at-most-once
/// delivery under concurrent sweeps.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Insert a new event.
    async fn insert(&self, event: Event) -> Result<()>;

    /// Get an event by id.
    async fn get(&self, id: &str) -> Result<Option<Event>>;

    /// Apply a partial update to an event and return the updated record.
    ///
    /// Returns `HearthError::NotFound` when the id is unknown.
    async fn update(&self, id: &str, update: EventUpdate) -> Result<Event>;

    /// Delete an event by id. Returns false when the id is unknown.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Base events that can appear in `[start, end]`: events dated inside
    /// the range, plus recurring events anchored on or before its end.
    /// Sorted by (date, time).
    async fn query_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Event>>;

    /// Base events anchored on `date`, sorted by time.
    async fn events_for_date(&self, date: NaiveDate) -> Result<Vec<Event>>;

    /// Conditionally flip `reminder_sent` from false to true.
    ///
    /// Returns true iff this call performed the transition; a false return
    /// means another sweep already claimed the event.
    async fn mark_reminder_sent(&self, id: &str) -> Result<bool>;

    /// Release a reminder claim after a failed delivery, so the next
    /// sweep retries.
    async fn clear_reminder_sent(&self, id: &str) -> Result<()>;

    /// Number of stored events.
    async fn count(&self) -> Result<usize>;
}
