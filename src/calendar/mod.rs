//! Calendar module for household event management.
//!
//! This module provides the calendar core:
//!
//! - **Domain types**: events, drafts, partial updates, weekly recurrence
//! - **Recurrence Expansion**: pure projection of base events into
//!   occurrence instances for a query window
//! - **Event Management**: validated CRUD plus series truncation
//! - **Booking Deduplication**: suppression of repeated create requests
//!   from the assistant path
//! - **Query Engine**: occurrence views and the assistant context summary
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Calendar Layer                        │
//! │  ┌──────────────────┐    ┌─────────────────────────┐    │
//! │  │ BookingHandler   │    │ CalendarQueryEngine     │    │
//! │  │  - dedup cache   │    │  - today / upcoming     │    │
//! │  │  - fingerprints  │    │  - context summary      │    │
//! │  └────────┬─────────┘    └───────────┬─────────────┘    │
//! │           ▼                          ▼                  │
//! │  ┌───────────────────────────────────────────────────┐  │
//! │  │              CalendarManager                      │  │
//! │  │  - validated CRUD, truncation                     │  │
//! │  │  - week/month views via expand()                  │  │
//! │  └───────────────────────┬───────────────────────────┘  │
//! │                          ▼                              │
//! │  ┌───────────────────────────────────────────────────┐  │
//! │  │              EventStore                           │  │
//! │  └───────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod booking;
mod expand;
mod manager;
mod query;
mod types;

pub use booking::{BookingCache, BookingHandler, BookingOutcome, DEFAULT_DEDUP_TTL};
pub use expand::expand;
pub use manager::{CalendarManager, TruncateOutcome};
pub use query::CalendarQueryEngine;
pub use types::{
    Event, EventDraft, EventUpdate, Occurrence, Recurrence, RepeatDay, MAX_DURATION_HOURS,
    MIN_DURATION_HOURS,
};
