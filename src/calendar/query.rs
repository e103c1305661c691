//! Calendar query engine.
//!
//! Read-side companion to the manager: occurrence queries anchored to the
//! household's fixed timezone ("today" must not drift with the host zone),
//! plus the plain-text schedule summary the assistant prompt is built from.

use chrono::{Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::Result;
use crate::store::EventStore;

use super::manager::CalendarManager;
use super::types::{Occurrence, RepeatDay};

/// Query engine for calendar occurrences, wrapping the manager.
pub struct CalendarQueryEngine<S: EventStore> {
    manager: CalendarManager<S>,
    tz: Tz,
}

impl<S: EventStore> CalendarQueryEngine<S> {
    /// Create a new query engine in the household timezone.
    pub fn new(manager: CalendarManager<S>, tz: Tz) -> Self {
        Self { manager, tz }
    }

    /// The underlying manager.
    pub fn manager(&self) -> &CalendarManager<S> {
        &self.manager
    }

    /// Today's date in the household timezone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }

    /// Occurrences for today.
    pub async fn query_today(&self) -> Result<Vec<Occurrence>> {
        let today = self.today();
        self.manager.occurrences(today, today).await
    }

    /// Occurrences for the next `days` days, today included.
    pub async fn query_upcoming(&self, days: i64) -> Result<Vec<Occurrence>> {
        let today = self.today();
        self.manager
            .occurrences(today, today + Duration::days(days.max(0)))
            .await
    }

    /// Occurrences in an explicit date range.
    pub async fn query_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Occurrence>> {
        self.manager.occurrences(start, end).await
    }

    /// Plain-text schedule for `[start, end]`, grouped by date, one line
    /// per occurrence. Fed verbatim into the assistant's context.
    pub async fn context_summary(&self, start: NaiveDate, end: NaiveDate) -> Result<String> {
        let occurrences = self.manager.occurrences(start, end).await?;
        Ok(render_summary(&occurrences))
    }
}

fn render_summary(occurrences: &[Occurrence]) -> String {
    use chrono::Datelike;

    if occurrences.is_empty() {
        return "Inga händelser i perioden.\n".to_string();
    }

    let mut out = String::new();
    let mut current_date: Option<NaiveDate> = None;
    for occurrence in occurrences {
        if current_date != Some(occurrence.date) {
            let label = RepeatDay::from_weekday(occurrence.date.weekday()).label();
            out.push_str(&format!("{label} {}:\n", occurrence.date));
            current_date = Some(occurrence.date);
        }
        out.push_str(&format!(
            "  {}–{} {} ({})\n",
            occurrence.start.format("%H:%M"),
            occurrence.end.format("%H:%M"),
            occurrence.title,
            occurrence.owner,
        ));
    }
    out
}
