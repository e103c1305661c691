//! Reminder sweep scenarios against a recording notifier.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Europe::Stockholm;
use chrono_tz::Tz;

use hearth::{
    CalendarManager, EmbeddedEventStore, EventDraft, EventStore, Member, Notifier,
    ReminderDispatcher, Result, Roster,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
    Stockholm.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// Notifier that records deliveries and can be told to fail.
#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, member: &Member, _title: &str, body: &str) -> Result<()> {
        // Yield so overlapping sweeps actually interleave.
        tokio::time::sleep(Duration::from_millis(5)).await;
        if self.fail.load(Ordering::SeqCst) {
            return Err(hearth::DeliveryError::Rejected {
                status: 503,
                body: "unavailable".to_string(),
            }
            .into());
        }
        self.sent
            .lock()
            .unwrap()
            .push((member.name.clone(), body.to_string()));
        Ok(())
    }
}

struct Fixture {
    store: Arc<EmbeddedEventStore>,
    manager: CalendarManager<EmbeddedEventStore>,
    notifier: Arc<RecordingNotifier>,
}

impl Fixture {
    fn new() -> Self {
        let store = Arc::new(EmbeddedEventStore::new());
        let manager = CalendarManager::new(Arc::clone(&store), Roster::default());
        Self {
            store,
            manager,
            notifier: Arc::new(RecordingNotifier::default()),
        }
    }

    fn dispatcher(&self) -> ReminderDispatcher<EmbeddedEventStore> {
        ReminderDispatcher::new(
            Arc::clone(&self.store),
            self.notifier.clone(),
            Roster::default(),
            Stockholm,
            15,
            1,
        )
    }

    /// An armed meeting today at 14:50.
    async fn armed_meeting(&self) -> String {
        let event = self
            .manager
            .create(
                EventDraft::new("Maria", date(2025, 10, 21), time(14, 50), "Möte")
                    .with_reminder(),
            )
            .await
            .unwrap();
        event.id
    }
}

#[tokio::test]
async fn fires_inside_the_window() {
    let fixture = Fixture::new();
    let id = fixture.armed_meeting().await;

    // 14:35 + 15min lead = 14:50, dead center of [14:49, 14:51].
    let stats = fixture
        .dispatcher()
        .sweep_at(at(2025, 10, 21, 14, 35))
        .await
        .unwrap();

    assert_eq!(stats.fired, 1);
    assert_eq!(fixture.notifier.sent_count(), 1);
    let (member, body) = fixture.notifier.sent.lock().unwrap()[0].clone();
    assert_eq!(member, "Maria");
    assert!(body.contains("Möte"));
    assert!(body.contains("14:50"));
    assert!(fixture.store.get(&id).await.unwrap().unwrap().reminder_sent);
}

#[tokio::test]
async fn does_not_fire_early() {
    let fixture = Fixture::new();
    let id = fixture.armed_meeting().await;

    let stats = fixture
        .dispatcher()
        .sweep_at(at(2025, 10, 21, 14, 20))
        .await
        .unwrap();

    assert_eq!(stats.fired, 0);
    assert_eq!(fixture.notifier.sent_count(), 0);
    assert!(!fixture.store.get(&id).await.unwrap().unwrap().reminder_sent);
}

#[tokio::test]
async fn does_not_refire_after_success() {
    let fixture = Fixture::new();
    fixture.armed_meeting().await;

    let dispatcher = fixture.dispatcher();
    dispatcher.sweep_at(at(2025, 10, 21, 14, 35)).await.unwrap();
    let again = dispatcher.sweep_at(at(2025, 10, 21, 14, 36)).await.unwrap();

    assert_eq!(again.fired, 0);
    assert_eq!(fixture.notifier.sent_count(), 1);
}

#[tokio::test]
async fn unarmed_events_are_ignored() {
    let fixture = Fixture::new();
    fixture
        .manager
        .create(EventDraft::new(
            "Maria",
            date(2025, 10, 21),
            time(14, 50),
            "Utan påminnelse",
        ))
        .await
        .unwrap();

    let stats = fixture
        .dispatcher()
        .sweep_at(at(2025, 10, 21, 14, 35))
        .await
        .unwrap();

    assert_eq!(stats.scanned, 0);
    assert_eq!(fixture.notifier.sent_count(), 0);
}

#[tokio::test]
async fn concurrent_sweeps_deliver_exactly_once() {
    let fixture = Fixture::new();
    let id = fixture.armed_meeting().await;

    let first = fixture.dispatcher();
    let second = fixture.dispatcher();
    let now = at(2025, 10, 21, 14, 35);

    let (a, b) = tokio::join!(first.sweep_at(now), second.sweep_at(now));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.fired + b.fired, 1);
    assert_eq!(fixture.notifier.sent_count(), 1);
    assert!(fixture.store.get(&id).await.unwrap().unwrap().reminder_sent);
}

#[tokio::test]
async fn failed_delivery_retries_next_tick() {
    let fixture = Fixture::new();
    let id = fixture.armed_meeting().await;
    let dispatcher = fixture.dispatcher();

    fixture.notifier.fail.store(true, Ordering::SeqCst);
    let failed = dispatcher.sweep_at(at(2025, 10, 21, 14, 35)).await.unwrap();
    assert_eq!(failed.fired, 0);
    assert_eq!(failed.failed, 1);
    // The claim was released so the next tick can retry.
    assert!(!fixture.store.get(&id).await.unwrap().unwrap().reminder_sent);

    fixture.notifier.fail.store(false, Ordering::SeqCst);
    let retried = dispatcher.sweep_at(at(2025, 10, 21, 14, 36)).await.unwrap();
    assert_eq!(retried.fired, 1);
    assert_eq!(fixture.notifier.sent_count(), 1);
    assert!(fixture.store.get(&id).await.unwrap().unwrap().reminder_sent);
}

#[tokio::test]
async fn only_todays_events_are_considered() {
    let fixture = Fixture::new();
    fixture
        .manager
        .create(
            EventDraft::new("Maria", date(2025, 10, 22), time(14, 50), "Imorgon")
                .with_reminder(),
        )
        .await
        .unwrap();

    let stats = fixture
        .dispatcher()
        .sweep_at(at(2025, 10, 21, 14, 35))
        .await
        .unwrap();

    assert_eq!(stats.scanned, 0);
    assert_eq!(fixture.notifier.sent_count(), 0);
}
