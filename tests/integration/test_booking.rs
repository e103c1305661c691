//! Assistant-path booking scenarios: deduplication end to end.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use chrono_tz::Europe::Stockholm;

use hearth::{
    AssistantToolset, BookingCache, BookingHandler, CalendarManager, CalendarQueryEngine,
    CreateEventParams, EmbeddedEventStore, EventStore, GetEventsParams, Roster,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn create_toolset(ttl: Duration) -> (AssistantToolset<EmbeddedEventStore>, Arc<EmbeddedEventStore>) {
    let store = Arc::new(EmbeddedEventStore::new());
    let manager = CalendarManager::new(Arc::clone(&store), Roster::default());
    let query = CalendarQueryEngine::new(manager.clone(), Stockholm);
    let booking = BookingHandler::new(manager, BookingCache::new(ttl));
    (AssistantToolset::new(query, booking), store)
}

fn maria_lunch(time: &str) -> CreateEventParams {
    CreateEventParams {
        owner: "Maria".to_string(),
        date: date(2025, 10, 21),
        time: time.to_string(),
        title: "Lunch".to_string(),
        description: None,
        duration_hours: Some(1),
        repeat_weekday: None,
        repeat_until: None,
        reminder: false,
    }
}

#[tokio::test]
async fn double_create_within_a_minute_stores_one_event() {
    // The assistant is invoked twice for one utterance; the second call
    // must be a visible no-op.
    let (toolset, store) = create_toolset(Duration::from_secs(600));

    let first = toolset
        .create_event("conversation-1", maria_lunch("12:00"))
        .await
        .unwrap();
    let second = toolset
        .create_event("conversation-1", maria_lunch("12:00"))
        .await
        .unwrap();

    assert!(!first.was_duplicate);
    assert!(second.was_duplicate);
    assert_eq!(first.event_id, second.event_id);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn llm_timestamp_jitter_is_still_a_duplicate() {
    let (toolset, store) = create_toolset(Duration::from_secs(600));

    toolset
        .create_event("conversation-1", maria_lunch("12:00"))
        .await
        .unwrap();
    let retry = toolset
        .create_event("conversation-1", maria_lunch("12:15"))
        .await
        .unwrap();

    assert!(retry.was_duplicate);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn after_ttl_the_slot_can_be_rebooked() {
    let (toolset, store) = create_toolset(Duration::from_millis(20));

    let first = toolset
        .create_event("conversation-1", maria_lunch("12:00"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(40)).await;
    let second = toolset
        .create_event("conversation-1", maria_lunch("12:00"))
        .await
        .unwrap();

    assert!(!second.was_duplicate);
    assert_ne!(first.event_id, second.event_id);
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn validation_failure_leaves_no_trace() {
    let (toolset, store) = create_toolset(Duration::from_secs(600));

    let mut bad = maria_lunch("12:00");
    bad.owner = "Grannen".to_string();
    assert!(toolset.create_event("conversation-1", bad).await.is_err());
    assert_eq!(store.count().await.unwrap(), 0);

    // The failed attempt registered nothing, so the corrected booking is
    // fresh, not a duplicate.
    let ok = toolset
        .create_event("conversation-1", maria_lunch("12:00"))
        .await
        .unwrap();
    assert!(!ok.was_duplicate);
}

#[tokio::test]
async fn booked_event_shows_up_in_get_events() {
    let (toolset, _store) = create_toolset(Duration::from_secs(600));

    let mut params = maria_lunch("12:00");
    params.repeat_weekday = Some("tis".to_string());
    params.repeat_until = Some(date(2025, 11, 4));
    toolset
        .create_event("conversation-1", params)
        .await
        .unwrap();

    let events = toolset
        .get_events(GetEventsParams {
            start_date: Some(date(2025, 10, 20)),
            end_date: Some(date(2025, 11, 9)),
        })
        .await
        .unwrap();

    // 10-21 anchor plus tis 10-28 and 11-04.
    assert_eq!(events.count, 3);
    assert!(!events.events[0].is_recurring_instance);
    assert!(events.events[1].is_recurring_instance);
}

#[tokio::test]
async fn different_sessions_book_independently() {
    let (toolset, store) = create_toolset(Duration::from_secs(600));

    toolset
        .create_event("conversation-1", maria_lunch("12:00"))
        .await
        .unwrap();
    let other = toolset
        .create_event("conversation-2", maria_lunch("12:00"))
        .await
        .unwrap();

    assert!(!other.was_duplicate);
    assert_eq!(store.count().await.unwrap(), 2);
}
