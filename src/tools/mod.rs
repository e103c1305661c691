//! Typed tool surface for the external assistant orchestrator.

mod calendar_tools;

pub use calendar_tools::{
    tool_schemas, AssistantToolset, CreateEventParams, CreateEventResponse, EventsResponse,
    GetEventsParams, GetUsersParams, OccurrenceInfo, UserInfo, UsersResponse,
};
