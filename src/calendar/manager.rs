//! Calendar event management.
//!
//! The manager wraps an [`EventStore`] with validated CRUD, series
//! truncation, and the expanded week/month views the UI renders.

use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use tracing::debug;

use crate::error::{HearthError, Result, ValidationError};
use crate::roster::Roster;
use crate::store::EventStore;

use super::expand::expand;
use super::types::{Event, EventDraft, EventUpdate, Occurrence, Recurrence};

/// Outcome of truncating a recurring series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncateOutcome {
    /// The series now ends on the returned date.
    Truncated { until: NaiveDate },
    /// Truncation emptied the series (or hit a one-off); the event was
    /// deleted.
    Removed,
    /// The cut date was after everything the event could produce anyway.
    Unchanged,
}

/// Manager for calendar events, providing storage and view operations.
pub struct CalendarManager<S: EventStore> {
    store: Arc<S>,
    roster: Roster,
}

impl<S: EventStore> Clone for CalendarManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            roster: self.roster.clone(),
        }
    }
}

impl<S: EventStore> CalendarManager<S> {
    /// Create a new manager over the given store and household roster.
    pub fn new(store: Arc<S>, roster: Roster) -> Self {
        Self { store, roster }
    }

    /// The household roster bookings are validated against.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // ========================================================================
    // CRUD Operations
    // ========================================================================

    /// Validate a draft and insert it as a new event.
    pub async fn create(&self, draft: EventDraft) -> Result<Event> {
        draft.validate(&self.roster)?;
        let event = draft.into_event();
        self.store.insert(event.clone()).await?;
        debug!(id = %event.id, title = %event.title, owner = %event.owner, "Created event");
        Ok(event)
    }

    /// Get an event by id.
    pub async fn get(&self, id: &str) -> Result<Option<Event>> {
        self.store.get(id).await
    }

    /// Apply a partial update, re-checking invariants the edit could break.
    pub async fn update(&self, id: &str, update: EventUpdate) -> Result<Event> {
        let current = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| HearthError::NotFound(id.to_string()))?;

        let mut preview = current;
        update.apply_to(&mut preview);
        preview.check_invariants()?;

        let updated = self.store.update(id, update).await?;
        debug!(id = %updated.id, title = %updated.title, "Updated event");
        Ok(updated)
    }

    /// Delete an event, dropping the whole series for recurring events.
    pub async fn delete(&self, id: &str) -> Result<()> {
        if !self.store.delete(id).await? {
            return Err(HearthError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Remove occurrences from `date` onward, keeping earlier ones.
    ///
    /// For a recurring series this rewrites `until` to the day before the
    /// cut; the dropped tail is unrecoverable. A series truncated to
    /// nothing (cut on or before its anchor) is deleted outright, as is a
    /// one-off whose date is on or after the cut.
    pub async fn truncate_before(&self, id: &str, date: NaiveDate) -> Result<TruncateOutcome> {
        let event = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| HearthError::NotFound(id.to_string()))?;

        let Some(recurrence) = event.recurrence else {
            if event.date >= date {
                self.delete(id).await?;
                return Ok(TruncateOutcome::Removed);
            }
            return Ok(TruncateOutcome::Unchanged);
        };

        if let Some(until) = recurrence.until {
            if until < date {
                return Ok(TruncateOutcome::Unchanged);
            }
        }

        if date <= event.date {
            self.delete(id).await?;
            debug!(id = %id, "Series truncated to zero, deleted");
            return Ok(TruncateOutcome::Removed);
        }

        let new_until = date - Duration::days(1);
        let update = EventUpdate {
            recurrence: Some(Recurrence {
                weekday: recurrence.weekday,
                until: Some(new_until),
            }),
            ..Default::default()
        };
        self.store.update(id, update).await?;
        debug!(id = %id, until = %new_until, "Truncated series");
        Ok(TruncateOutcome::Truncated { until: new_until })
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// All occurrences in `[start, end]`, expanded and sorted.
    pub async fn occurrences(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Occurrence>> {
        let events = self.store.query_range(start, end).await?;
        Ok(expand(&events, start, end))
    }

    /// Occurrences for the seven days starting at `week_start`.
    pub async fn week_view(&self, week_start: NaiveDate) -> Result<Vec<Occurrence>> {
        self.occurrences(week_start, week_start + Duration::days(6))
            .await
    }

    /// Occurrences for a calendar month.
    pub async fn month_view(&self, year: i32, month: u32) -> Result<Vec<Occurrence>> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| ValidationError::new("month", format!("{year}-{month:02}")))?;
        let last = last_day_of_month(first);
        self.occurrences(first, last).await
    }
}

fn last_day_of_month(first: NaiveDate) -> NaiveDate {
    let (next_year, next_month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1).expect("valid month start")
        - Duration::days(1)
}
