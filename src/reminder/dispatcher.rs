//! Periodic reminder sweep.
//!
//! An external scheduler (cron, a systemd timer, the `watch` subcommand)
//! triggers one sweep per tick. Each sweep looks for armed events whose
//! start falls inside a narrow window around the configured lead time and
//! fires each one at most once, even when sweeps overlap: the store's
//! conditional `mark_reminder_sent` write is the claim, and only the
//! claimant delivers. A failed delivery releases the claim so the next
//! tick retries.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use crate::calendar::Event;
use crate::error::{DeliveryError, Result};
use crate::roster::Roster;
use crate::store::EventStore;

use super::notify::Notifier;

/// Outcome counters for one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Armed events anchored today.
    pub scanned: usize,
    /// Reminders delivered.
    pub fired: usize,
    /// Claims released after failed delivery.
    pub failed: usize,
}

/// Reminder sweep over the event store.
pub struct ReminderDispatcher<S: EventStore> {
    store: Arc<S>,
    notifier: Arc<dyn Notifier>,
    roster: Roster,
    tz: Tz,
    lead: Duration,
    slack: Duration,
}

impl<S: EventStore> ReminderDispatcher<S> {
    pub fn new(
        store: Arc<S>,
        notifier: Arc<dyn Notifier>,
        roster: Roster,
        tz: Tz,
        lead_minutes: i64,
        slack_minutes: i64,
    ) -> Self {
        Self {
            store,
            notifier,
            roster,
            tz,
            lead: Duration::minutes(lead_minutes),
            slack: Duration::minutes(slack_minutes),
        }
    }

    /// Run one sweep at the current household time.
    pub async fn sweep(&self) -> Result<SweepStats> {
        self.sweep_at(Utc::now().with_timezone(&self.tz)).await
    }

    /// Run one sweep as if the household clock read `now`.
    ///
    /// Split out from [`sweep`](Self::sweep) so the window arithmetic is
    /// testable against a fixed clock.
    pub async fn sweep_at(&self, now: DateTime<Tz>) -> Result<SweepStats> {
        let today = now.date_naive();
        let window_start = now + self.lead - self.slack;
        let window_end = now + self.lead + self.slack;
        debug!(
            %today,
            window_start = %window_start.format("%H:%M:%S"),
            window_end = %window_end.format("%H:%M:%S"),
            "Reminder sweep"
        );

        let mut stats = SweepStats::default();
        for event in self.store.events_for_date(today).await? {
            if !event.is_armed() {
                continue;
            }
            stats.scanned += 1;

            // Local wall clock to absolute instant; starts inside a DST
            // gap or fold are skipped this tick.
            let Some(start) = self.tz.from_local_datetime(&event.start()).single() else {
                warn!(id = %event.id, start = %event.start(), "Ambiguous local start, skipping");
                continue;
            };
            if start < window_start || start > window_end {
                continue;
            }

            // Claim before delivering: a concurrent sweep loses this race
            // and never sends.
            if !self.store.mark_reminder_sent(&event.id).await? {
                debug!(id = %event.id, "Already claimed by another sweep");
                continue;
            }

            match self.deliver(&event).await {
                Ok(()) => {
                    info!(id = %event.id, title = %event.title, owner = %event.owner, "Reminder fired");
                    stats.fired += 1;
                }
                Err(err) => {
                    warn!(id = %event.id, error = %err, "Delivery failed, will retry next sweep");
                    self.store.clear_reminder_sent(&event.id).await?;
                    stats.failed += 1;
                }
            }
        }

        Ok(stats)
    }

    async fn deliver(&self, event: &Event) -> Result<()> {
        let member = self
            .roster
            .get(&event.owner)
            .ok_or_else(|| DeliveryError::NoRoute(event.owner.clone()))?;

        let title = format!("Påminnelse: {}", event.title);
        let body = reminder_message(event, self.lead.num_minutes());
        self.notifier.send(member, &title, &body).await
    }

    /// Sweep forever on a fixed interval. Errors are logged and the loop
    /// continues; a wedged tick must not stop future ones.
    pub async fn run(&self, interval: std::time::Duration) -> Result<()> {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            match self.sweep().await {
                Ok(stats) if stats.fired > 0 || stats.failed > 0 => {
                    info!(fired = stats.fired, failed = stats.failed, "Sweep done");
                }
                Ok(_) => {}
                Err(err) => warn!(error = %err, "Sweep failed"),
            }
        }
    }
}

/// The reminder text, matching what the household is used to reading.
fn reminder_message(event: &Event, lead_minutes: i64) -> String {
    format!(
        "📅 *Påminnelse: {}*\n\n🕐 Börjar om {} minuter ({})\n👤 {}\n📆 {}\n\nGod förberedelse! 🙂",
        event.title,
        lead_minutes,
        event.time.format("%H:%M"),
        event.owner,
        event.date,
    )
}
