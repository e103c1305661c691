//! Store-backed recurrence expansion scenarios.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};

use hearth::{
    CalendarManager, EmbeddedEventStore, EventDraft, Recurrence, RepeatDay, Roster,
    TruncateOutcome,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn create_manager() -> CalendarManager<EmbeddedEventStore> {
    CalendarManager::new(Arc::new(EmbeddedEventStore::new()), Roster::default())
}

#[tokio::test]
async fn monday_series_through_september() {
    // Olle trains Mondays at 17:00 from 09-01 (a Monday) until 09-29.
    let manager = create_manager();
    manager
        .create(
            EventDraft::new("Olle", date(2025, 9, 1), time(17, 0), "Fotboll")
                .with_recurrence(Recurrence::weekly(RepeatDay::Mon).until(date(2025, 9, 29))),
        )
        .await
        .unwrap();

    let occurrences = manager
        .occurrences(date(2025, 9, 1), date(2025, 9, 30))
        .await
        .unwrap();

    let dates: Vec<NaiveDate> = occurrences.iter().map(|o| o.date).collect();
    assert_eq!(
        dates,
        vec![
            date(2025, 9, 1),
            date(2025, 9, 8),
            date(2025, 9, 15),
            date(2025, 9, 22),
            date(2025, 9, 29),
        ]
    );
    assert!(occurrences.iter().all(|o| o.date.weekday() == Weekday::Mon));
    assert!(occurrences
        .iter()
        .all(|o| o.start.time() == time(17, 0) && o.end.time() == time(18, 0)));
}

#[tokio::test]
async fn expansion_is_idempotent_across_calls() {
    let manager = create_manager();
    manager
        .create(
            EventDraft::new("Olle", date(2025, 9, 1), time(17, 0), "Fotboll")
                .with_recurrence(Recurrence::weekly(RepeatDay::Mon)),
        )
        .await
        .unwrap();
    manager
        .create(EventDraft::new(
            "Maria",
            date(2025, 9, 10),
            time(12, 0),
            "Lunch",
        ))
        .await
        .unwrap();

    let first = manager
        .occurrences(date(2025, 9, 1), date(2025, 9, 30))
        .await
        .unwrap();
    let second = manager
        .occurrences(date(2025, 9, 1), date(2025, 9, 30))
        .await
        .unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn series_anchored_before_window_projects_into_it() {
    let manager = create_manager();
    manager
        .create(
            EventDraft::new("Ellen", date(2025, 8, 6), time(18, 30), "Körsång")
                .with_recurrence(Recurrence::weekly(RepeatDay::Wed)),
        )
        .await
        .unwrap();

    let october = manager.month_view(2025, 10).await.unwrap();
    let dates: Vec<NaiveDate> = october.iter().map(|o| o.date).collect();
    assert_eq!(
        dates,
        vec![
            date(2025, 10, 1),
            date(2025, 10, 8),
            date(2025, 10, 15),
            date(2025, 10, 22),
            date(2025, 10, 29),
        ]
    );
    assert!(october.iter().all(|o| o.is_virtual));
}

#[tokio::test]
async fn truncating_one_occurrence_keeps_the_past() {
    // "Ta bort endast denna": cut the series at 09-15, keeping 09-01/09-08.
    let manager = create_manager();
    let event = manager
        .create(
            EventDraft::new("Olle", date(2025, 9, 1), time(17, 0), "Fotboll")
                .with_recurrence(Recurrence::weekly(RepeatDay::Mon).until(date(2025, 9, 29))),
        )
        .await
        .unwrap();

    let outcome = manager
        .truncate_before(&event.id, date(2025, 9, 15))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        TruncateOutcome::Truncated {
            until: date(2025, 9, 14)
        }
    );

    let occurrences = manager
        .occurrences(date(2025, 9, 1), date(2025, 9, 30))
        .await
        .unwrap();
    let dates: Vec<NaiveDate> = occurrences.iter().map(|o| o.date).collect();
    assert_eq!(dates, vec![date(2025, 9, 1), date(2025, 9, 8)]);

    // The old `until` is gone for good; re-extending is a new booking.
    let stored = manager.get(&event.id).await.unwrap().unwrap();
    assert_eq!(stored.recurrence.unwrap().until, Some(date(2025, 9, 14)));
}

#[tokio::test]
async fn mixed_week_is_sorted_by_start() {
    let manager = create_manager();
    manager
        .create(
            EventDraft::new("Olle", date(2025, 9, 1), time(17, 0), "Fotboll")
                .with_recurrence(Recurrence::weekly(RepeatDay::Mon)),
        )
        .await
        .unwrap();
    manager
        .create(EventDraft::new(
            "Maria",
            date(2025, 9, 8),
            time(9, 0),
            "Frukostmöte",
        ))
        .await
        .unwrap();

    let week = manager.week_view(date(2025, 9, 8)).await.unwrap();
    assert_eq!(week.len(), 2);
    assert_eq!(week[0].title, "Frukostmöte");
    assert_eq!(week[1].title, "Fotboll");
}
