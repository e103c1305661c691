//! Hearth: Household Calendar Core
//!
//! Family members book time-boxed events, some repeating weekly; the
//! crate expands them into calendar views, suppresses duplicate bookings
//! arriving through the assistant path, and dispatches reminders shortly
//! before events start.

pub mod calendar;
pub mod config;
pub mod error;
pub mod reminder;
pub mod roster;
pub mod store;
pub mod tools;

pub use calendar::{
    expand, BookingCache, BookingHandler, BookingOutcome, CalendarManager, CalendarQueryEngine,
    Event, EventDraft, EventUpdate, Occurrence, Recurrence, RepeatDay, TruncateOutcome,
    DEFAULT_DEDUP_TTL, MAX_DURATION_HOURS, MIN_DURATION_HOURS,
};
pub use config::Config;
pub use error::{
    ConfigError, DeliveryError, HearthError, Result, StoreError, ValidationError,
};
pub use reminder::{Notifier, NtfyNotifier, ReminderDispatcher, SweepStats, TelegramNotifier};
pub use roster::{Member, Roster};
pub use store::{EmbeddedEventStore, EventStore};
pub use tools::{tool_schemas, AssistantToolset, CreateEventParams, GetEventsParams};
