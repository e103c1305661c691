//! Assistant tool implementations.
//!
//! This module provides the typed tool surface an external LLM
//! orchestrator calls:
//! - `get_events`: occurrences for a date range
//! - `create_event`: book an event (routed through the deduplicator)
//! - `get_users`: the household roster
//!
//! Parameters and responses derive `JsonSchema` so the orchestrator can
//! hand the schemas straight to the model as tool definitions.

use chrono::{Duration, NaiveDate, NaiveTime};
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::calendar::{
    BookingHandler, CalendarQueryEngine, EventDraft, Occurrence, Recurrence, RepeatDay,
};
use crate::error::{Result, ValidationError};
use crate::roster::Roster;
use crate::store::EventStore;

// ============================================================================
// get_events
// ============================================================================

/// Parameters for the `get_events` tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetEventsParams {
    /// Start date (YYYY-MM-DD). Defaults to today.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// End date (YYYY-MM-DD), inclusive. Defaults to one week after start.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Response from the `get_events` tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsResponse {
    pub success: bool,
    pub count: usize,
    pub events: Vec<OccurrenceInfo>,
    pub message: String,
}

/// One occurrence, flattened for the assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccurrenceInfo {
    pub event_id: String,
    pub owner: String,
    pub title: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub is_recurring_instance: bool,
}

impl From<&Occurrence> for OccurrenceInfo {
    fn from(occurrence: &Occurrence) -> Self {
        Self {
            event_id: occurrence.event_id.clone(),
            owner: occurrence.owner.clone(),
            title: occurrence.title.clone(),
            date: occurrence.date,
            start_time: occurrence.start.format("%H:%M").to_string(),
            end_time: occurrence.end.format("%H:%M").to_string(),
            is_recurring_instance: occurrence.is_virtual,
        }
    }
}

// ============================================================================
// create_event
// ============================================================================

/// Parameters for the `create_event` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateEventParams {
    /// Owning household member. Must be one of the roster names.
    pub owner: String,
    /// Booking date (YYYY-MM-DD).
    pub date: NaiveDate,
    /// Start time (HH:MM, 24-hour).
    pub time: String,
    /// Event title.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Duration in whole hours, 1..=12. Defaults to 1.
    #[serde(default)]
    pub duration_hours: Option<u8>,
    /// Repeat weekly on this weekday (short Swedish label, `mån`..`sön`).
    #[serde(default)]
    pub repeat_weekday: Option<String>,
    /// Last date of the weekly repetition (YYYY-MM-DD), inclusive.
    #[serde(default)]
    pub repeat_until: Option<NaiveDate>,
    /// Send a reminder shortly before start.
    #[serde(default)]
    pub reminder: bool,
}

impl CreateEventParams {
    /// Convert tool-level input into a draft, mapping the label-typed
    /// fields at the boundary.
    fn into_draft(self) -> Result<EventDraft> {
        let time = NaiveTime::parse_from_str(&self.time, "%H:%M").map_err(|_| {
            ValidationError::new("time", format!("'{}' is not HH:MM", self.time))
        })?;

        let recurrence = match self.repeat_weekday {
            None => {
                if self.repeat_until.is_some() {
                    return Err(ValidationError::new(
                        "repeat_until",
                        "set without repeat_weekday",
                    )
                    .into());
                }
                None
            }
            Some(label) => {
                let weekday = RepeatDay::from_label(&label).ok_or_else(|| {
                    ValidationError::new(
                        "repeat_weekday",
                        format!("'{label}' is not one of mån, tis, ons, tor, fre, lör, sön"),
                    )
                })?;
                Some(Recurrence {
                    weekday,
                    until: self.repeat_until,
                })
            }
        };

        let mut draft = EventDraft::new(self.owner, self.date, time, self.title)
            .with_duration(self.duration_hours.unwrap_or(1));
        draft.description = self.description;
        draft.recurrence = recurrence;
        draft.reminder = self.reminder;
        Ok(draft)
    }
}

/// Response from the `create_event` tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventResponse {
    pub success: bool,
    pub event_id: String,
    /// True when this call was suppressed as a repeat of a recent booking.
    pub was_duplicate: bool,
    pub message: String,
}

// ============================================================================
// get_users
// ============================================================================

/// Parameters for the `get_users` tool. Takes nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetUsersParams {}

/// Response from the `get_users` tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersResponse {
    pub success: bool,
    pub users: Vec<UserInfo>,
}

/// Roster entry as exposed to the assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    pub color: String,
}

// ============================================================================
// Toolset
// ============================================================================

/// The assistant-facing toolset. The booking handler (and its dedup
/// cache) sits between `create_event` and the store.
pub struct AssistantToolset<S: EventStore> {
    query: CalendarQueryEngine<S>,
    booking: BookingHandler<S>,
}

impl<S: EventStore> AssistantToolset<S> {
    pub fn new(query: CalendarQueryEngine<S>, booking: BookingHandler<S>) -> Self {
        Self { query, booking }
    }

    /// The household roster.
    pub fn roster(&self) -> &Roster {
        self.booking.manager().roster()
    }

    /// `get_events`: occurrences in the requested range.
    pub async fn get_events(&self, params: GetEventsParams) -> Result<EventsResponse> {
        let start = params.start_date.unwrap_or_else(|| self.query.today());
        let end = params.end_date.unwrap_or(start + Duration::days(7));
        if end < start {
            return Err(
                ValidationError::new("end_date", format!("{end} is before {start}")).into(),
            );
        }

        let occurrences = self.query.query_range(start, end).await?;
        Ok(EventsResponse {
            success: true,
            count: occurrences.len(),
            events: occurrences.iter().map(OccurrenceInfo::from).collect(),
            message: format!("{} händelser {start} – {end}", occurrences.len()),
        })
    }

    /// `create_event`: book through the deduplicator.
    pub async fn create_event(
        &self,
        session: &str,
        params: CreateEventParams,
    ) -> Result<CreateEventResponse> {
        let summary = format!(
            "{} för {} den {} kl {}",
            params.title, params.owner, params.date, params.time
        );
        let draft = params.into_draft()?;
        let outcome = self.booking.create(session, draft).await?;

        let message = if outcome.was_duplicate {
            format!("Redan bokad: {summary}")
        } else {
            format!("Bokad: {summary}")
        };
        Ok(CreateEventResponse {
            success: true,
            event_id: outcome.event_id,
            was_duplicate: outcome.was_duplicate,
            message,
        })
    }

    /// `get_users`: the roster with display colors.
    pub fn get_users(&self) -> UsersResponse {
        UsersResponse {
            success: true,
            users: self
                .roster()
                .members()
                .iter()
                .map(|m| UserInfo {
                    name: m.name.clone(),
                    color: m.color.clone(),
                })
                .collect(),
        }
    }
}

/// Tool definitions (name, description, JSON schema) for the external
/// orchestrator to pass to the model.
pub fn tool_schemas() -> serde_json::Value {
    json!([
        {
            "name": "get_events",
            "description": "Hämta kalenderhändelser för en viss tidsperiod.",
            "parameters": schema_for!(GetEventsParams),
        },
        {
            "name": "create_event",
            "description": "Skapa en ny kalenderhändelse. Anropa endast EN gång per bokning.",
            "parameters": schema_for!(CreateEventParams),
        },
        {
            "name": "get_users",
            "description": "Hämta hushållets medlemmar.",
            "parameters": schema_for!(GetUsersParams),
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{BookingCache, CalendarManager, DEFAULT_DEDUP_TTL};
    use crate::store::EmbeddedEventStore;
    use chrono_tz::Europe::Stockholm;
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_toolset() -> AssistantToolset<EmbeddedEventStore> {
        let store = Arc::new(EmbeddedEventStore::new());
        let manager = CalendarManager::new(store, Roster::default());
        let query = CalendarQueryEngine::new(manager.clone(), Stockholm);
        let booking = BookingHandler::new(manager, BookingCache::new(DEFAULT_DEDUP_TTL));
        AssistantToolset::new(query, booking)
    }

    fn lunch_params() -> CreateEventParams {
        CreateEventParams {
            owner: "Maria".to_string(),
            date: date(2025, 10, 21),
            time: "12:00".to_string(),
            title: "Lunch".to_string(),
            description: None,
            duration_hours: None,
            repeat_weekday: None,
            repeat_until: None,
            reminder: false,
        }
    }

    #[tokio::test]
    async fn create_then_get_events_round_trip() {
        let toolset = create_toolset();
        let created = toolset.create_event("s1", lunch_params()).await.unwrap();
        assert!(!created.was_duplicate);

        let events = toolset
            .get_events(GetEventsParams {
                start_date: Some(date(2025, 10, 20)),
                end_date: Some(date(2025, 10, 26)),
            })
            .await
            .unwrap();
        assert_eq!(events.count, 1);
        assert_eq!(events.events[0].title, "Lunch");
        assert_eq!(events.events[0].start_time, "12:00");
        assert_eq!(events.events[0].end_time, "13:00");
    }

    #[tokio::test]
    async fn bad_time_format_is_a_validation_error() {
        let toolset = create_toolset();
        let mut params = lunch_params();
        params.time = "kl tolv".to_string();
        assert!(toolset.create_event("s1", params).await.is_err());
    }

    #[tokio::test]
    async fn bad_weekday_label_is_a_validation_error() {
        let toolset = create_toolset();
        let mut params = lunch_params();
        params.repeat_weekday = Some("monday".to_string());
        assert!(toolset.create_event("s1", params).await.is_err());
    }

    #[tokio::test]
    async fn repeat_until_without_weekday_is_rejected() {
        let toolset = create_toolset();
        let mut params = lunch_params();
        params.repeat_until = Some(date(2025, 12, 1));
        assert!(toolset.create_event("s1", params).await.is_err());
    }

    #[tokio::test]
    async fn reversed_range_is_rejected() {
        let toolset = create_toolset();
        let err = toolset
            .get_events(GetEventsParams {
                start_date: Some(date(2025, 10, 26)),
                end_date: Some(date(2025, 10, 20)),
            })
            .await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn get_users_lists_roster() {
        let toolset = create_toolset();
        let users = toolset.get_users();
        assert_eq!(users.users.len(), 5);
        assert!(users.users.iter().any(|u| u.name == "Maria"));
    }

    #[test]
    fn tool_schemas_cover_all_tools() {
        let schemas = tool_schemas();
        let names: Vec<&str> = schemas
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["get_events", "create_event", "get_users"]);
    }
}
