//! Calendar types for household event management.
//!
//! This module defines the core domain types: persisted events, the
//! validated create-request shape, partial updates, weekly recurrence
//! rules, and the derived occurrence instances produced by expansion.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::roster::Roster;

/// Minimum event duration in hours.
pub const MIN_DURATION_HOURS: u8 = 1;
/// Maximum event duration in hours.
pub const MAX_DURATION_HOURS: u8 = 12;

// ============================================================================
// Weekday Handling
// ============================================================================

/// Weekday a weekly series repeats on.
///
/// The household UI and assistant speak in short Swedish labels
/// (`mån`..`sön`); those are mapped here, at the boundary, and rejected if
/// unknown. Everything past the boundary works with this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RepeatDay {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl RepeatDay {
    /// Parse a short Swedish weekday label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "mån" => Some(Self::Mon),
            "tis" => Some(Self::Tue),
            "ons" => Some(Self::Wed),
            "tor" => Some(Self::Thu),
            "fre" => Some(Self::Fri),
            "lör" => Some(Self::Sat),
            "sön" => Some(Self::Sun),
            _ => None,
        }
    }

    /// The short Swedish label for this weekday.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mon => "mån",
            Self::Tue => "tis",
            Self::Wed => "ons",
            Self::Thu => "tor",
            Self::Fri => "fre",
            Self::Sat => "lör",
            Self::Sun => "sön",
        }
    }

    /// Convert to the chrono weekday used for date arithmetic.
    pub fn to_weekday(self) -> Weekday {
        match self {
            Self::Mon => Weekday::Mon,
            Self::Tue => Weekday::Tue,
            Self::Wed => Weekday::Wed,
            Self::Thu => Weekday::Thu,
            Self::Fri => Weekday::Fri,
            Self::Sat => Weekday::Sat,
            Self::Sun => Weekday::Sun,
        }
    }

    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => Self::Mon,
            Weekday::Tue => Self::Tue,
            Weekday::Wed => Self::Wed,
            Weekday::Thu => Self::Thu,
            Weekday::Fri => Self::Fri,
            Weekday::Sat => Self::Sat,
            Weekday::Sun => Self::Sun,
        }
    }
}

// ============================================================================
// Recurrence
// ============================================================================

/// Weekly recurrence rule: the series occurs on `weekday`, every week,
/// until `until` (inclusive) when set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Recurrence {
    /// Weekday the series repeats on.
    pub weekday: RepeatDay,
    /// Last date the series may occur on, inclusive. `None` means open-ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<NaiveDate>,
}

impl Recurrence {
    /// Create an open-ended weekly recurrence.
    pub fn weekly(weekday: RepeatDay) -> Self {
        Self {
            weekday,
            until: None,
        }
    }

    /// Set the end date (inclusive).
    pub fn until(mut self, date: NaiveDate) -> Self {
        self.until = Some(date);
        self
    }
}

// ============================================================================
// Event
// ============================================================================

/// A persisted calendar event: a one-off booking, or the anchor booking of
/// a weekly series.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Event {
    /// Unique identifier for the event.
    pub id: String,
    /// Owning household member (roster name).
    pub owner: String,
    /// Date of the booking (household-local).
    pub date: NaiveDate,
    /// Wall-clock start time (household-local).
    pub time: NaiveTime,
    /// Duration in whole hours, 1..=12.
    pub duration_hours: u8,
    /// Event title.
    pub title: String,
    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Weekly recurrence rule; `None` means a single occurrence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    /// Whether the owner wants a reminder shortly before start.
    #[serde(default)]
    pub reminder: bool,
    /// Whether the reminder has been delivered. Monotonic: once set it
    /// stays set, except for the dispatcher's own failure compensation.
    #[serde(default)]
    pub reminder_sent: bool,
    /// When the event was created.
    pub created_at: DateTime<Utc>,
    /// When the event was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Create a new one-off event with a fresh id.
    pub fn new(
        owner: impl Into<String>,
        date: NaiveDate,
        time: NaiveTime,
        title: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner: owner.into(),
            date,
            time,
            duration_hours: 1,
            title: title.into(),
            description: None,
            recurrence: None,
            reminder: false,
            reminder_sent: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the duration in hours.
    pub fn with_duration(mut self, hours: u8) -> Self {
        self.duration_hours = hours;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach a weekly recurrence rule.
    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    /// Enable a reminder before start.
    pub fn with_reminder(mut self) -> Self {
        self.reminder = true;
        self
    }

    /// The event's own start, date and time combined.
    pub fn start(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// The event's own end.
    pub fn end(&self) -> NaiveDateTime {
        self.start() + Duration::hours(self.duration_hours as i64)
    }

    /// Whether this event is the anchor of a weekly series.
    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// Whether the event wants a reminder that has not yet fired.
    pub fn is_armed(&self) -> bool {
        self.reminder && !self.reminder_sent
    }

    /// Re-check the invariants that edits could break.
    pub fn check_invariants(&self) -> Result<(), ValidationError> {
        if !(MIN_DURATION_HOURS..=MAX_DURATION_HOURS).contains(&self.duration_hours) {
            return Err(ValidationError::new(
                "duration_hours",
                format!(
                    "must be between {MIN_DURATION_HOURS} and {MAX_DURATION_HOURS}, got {}",
                    self.duration_hours
                ),
            ));
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::new("title", "must not be empty"));
        }
        if let Some(recurrence) = &self.recurrence {
            if let Some(until) = recurrence.until {
                if until < self.date {
                    return Err(ValidationError::new(
                        "recurrence.until",
                        format!("{until} is before the event start date {}", self.date),
                    ));
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Event Draft (create request)
// ============================================================================

/// A create-event request, validated before it touches storage.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EventDraft {
    /// Owning household member (must be on the roster).
    pub owner: String,
    /// Booking date.
    pub date: NaiveDate,
    /// Wall-clock start time.
    pub time: NaiveTime,
    /// Event title.
    pub title: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Duration in whole hours, 1..=12.
    #[serde(default = "default_duration")]
    pub duration_hours: u8,
    /// Weekly recurrence rule, if the booking repeats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    /// Whether to send a reminder before start.
    #[serde(default)]
    pub reminder: bool,
}

fn default_duration() -> u8 {
    1
}

impl EventDraft {
    /// Create a draft with the default one-hour duration.
    pub fn new(
        owner: impl Into<String>,
        date: NaiveDate,
        time: NaiveTime,
        title: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            date,
            time,
            title: title.into(),
            description: None,
            duration_hours: 1,
            recurrence: None,
            reminder: false,
        }
    }

    pub fn with_duration(mut self, hours: u8) -> Self {
        self.duration_hours = hours;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    pub fn with_reminder(mut self) -> Self {
        self.reminder = true;
        self
    }

    /// Validate the draft against the household roster.
    ///
    /// Runs before any write; a failure here guarantees nothing was stored.
    pub fn validate(&self, roster: &Roster) -> Result<(), ValidationError> {
        if !roster.contains(&self.owner) {
            return Err(ValidationError::new(
                "owner",
                format!(
                    "unknown member '{}', expected one of: {}",
                    self.owner,
                    roster.names().join(", ")
                ),
            ));
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::new("title", "must not be empty"));
        }
        if !(MIN_DURATION_HOURS..=MAX_DURATION_HOURS).contains(&self.duration_hours) {
            return Err(ValidationError::new(
                "duration_hours",
                format!(
                    "must be between {MIN_DURATION_HOURS} and {MAX_DURATION_HOURS}, got {}",
                    self.duration_hours
                ),
            ));
        }
        if let Some(recurrence) = &self.recurrence {
            if let Some(until) = recurrence.until {
                if until < self.date {
                    return Err(ValidationError::new(
                        "recurrence.until",
                        format!("{until} is before the event start date {}", self.date),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Turn a validated draft into a persistable event.
    pub fn into_event(self) -> Event {
        let now = Utc::now();
        Event {
            id: uuid::Uuid::new_v4().to_string(),
            owner: self.owner,
            date: self.date,
            time: self.time,
            duration_hours: self.duration_hours,
            title: self.title,
            description: self.description,
            recurrence: self.recurrence,
            reminder: self.reminder,
            reminder_sent: false,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Event Update (partial edit)
// ============================================================================

/// A partial update to an existing event. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct EventUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    /// Drop the recurrence rule, turning the series into a one-off.
    #[serde(default)]
    pub clear_recurrence: bool,
}

impl EventUpdate {
    /// Apply this update to an event in place.
    pub fn apply_to(&self, event: &mut Event) {
        if let Some(title) = &self.title {
            event.title = title.clone();
        }
        if let Some(description) = &self.description {
            event.description = Some(description.clone());
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(time) = self.time {
            event.time = time;
        }
        if let Some(hours) = self.duration_hours {
            event.duration_hours = hours;
        }
        if let Some(reminder) = self.reminder {
            event.reminder = reminder;
        }
        if self.clear_recurrence {
            event.recurrence = None;
        } else if let Some(recurrence) = self.recurrence {
            event.recurrence = Some(recurrence);
        }
        event.updated_at = Utc::now();
    }
}

// ============================================================================
// Occurrence
// ============================================================================

/// One concrete calendar appearance of an event: the anchor itself, or a
/// virtual instance derived by recurrence expansion. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Occurrence {
    /// Id of the base event this occurrence belongs to.
    pub event_id: String,
    /// Owning household member.
    pub owner: String,
    /// Event title.
    pub title: String,
    /// Date this occurrence falls on.
    pub date: NaiveDate,
    /// Start, date and time combined.
    pub start: NaiveDateTime,
    /// End, start plus duration.
    pub end: NaiveDateTime,
    /// Duration in whole hours.
    pub duration_hours: u8,
    /// True for expanded instances, false for the persisted anchor.
    pub is_virtual: bool,
}

impl Occurrence {
    /// Build the occurrence of `event` on `date`, carrying the base
    /// event's time of day and duration unchanged.
    pub fn of(event: &Event, date: NaiveDate, is_virtual: bool) -> Self {
        let start = date.and_time(event.time);
        Self {
            event_id: event.id.clone(),
            owner: event.owner.clone(),
            title: event.title.clone(),
            date,
            start,
            end: start + Duration::hours(event.duration_hours as i64),
            duration_hours: event.duration_hours,
            is_virtual,
        }
    }
}
