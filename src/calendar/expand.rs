//! Weekly recurrence expansion.
//!
//! Expansion is pure computation over base events: it never touches
//! storage and is idempotent, so callers may re-run it freely over
//! overlapping windows. Windows are bounded to about a month, so the
//! day-by-day walk is cheap and needs no memoization.

use chrono::{Datelike, NaiveDate};

use super::types::{Event, Occurrence};

/// Expand base events into their occurrences within `[window_start, window_end]`
/// (both inclusive).
///
/// Non-recurring events contribute their single anchor occurrence when it
/// falls inside the window. Recurring events contribute one occurrence per
/// matching weekday between `max(window_start, event.date)` and
/// `min(recurrence.until, window_end)`; the candidate equal to the base
/// date is the anchor and is emitted exactly once, from this walk, so no
/// caller has to merge anchors with instances.
///
/// The result is sorted by (date, time) ascending; every consumer relies
/// on that ordering.
pub fn expand(events: &[Event], window_start: NaiveDate, window_end: NaiveDate) -> Vec<Occurrence> {
    let mut occurrences = Vec::new();
    for event in events {
        expand_event(event, window_start, window_end, &mut occurrences);
    }
    occurrences.sort_by(|a, b| a.start.cmp(&b.start));
    occurrences
}

fn expand_event(
    event: &Event,
    window_start: NaiveDate,
    window_end: NaiveDate,
    out: &mut Vec<Occurrence>,
) {
    let Some(recurrence) = &event.recurrence else {
        if window_start <= event.date && event.date <= window_end {
            out.push(Occurrence::of(event, event.date, false));
        }
        return;
    };

    let effective_until = recurrence
        .until
        .map_or(window_end, |until| until.min(window_end));
    let weekday = recurrence.weekday.to_weekday();

    let mut candidate = window_start.max(event.date);
    while candidate <= effective_until {
        if candidate.weekday() == weekday {
            out.push(Occurrence::of(event, candidate, candidate != event.date));
        }
        match candidate.succ_opt() {
            Some(next) => candidate = next,
            None => break,
        }
    }
}
