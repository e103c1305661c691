//! Household member roster.
//!
//! The calendar serves a fixed small set of household members. The roster
//! maps each member to display attributes and an optional reminder route;
//! booking validation rejects owners that are not on it.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A household member who can own calendar events.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Member {
    /// Display name, also the owner key on events.
    pub name: String,
    /// Display color (hex) used by calendar views.
    pub color: String,
    /// Telegram chat id for reminder delivery, if configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram_chat_id: Option<String>,
}

impl Member {
    /// Create a member with a display color.
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            telegram_chat_id: None,
        }
    }

    /// Set the Telegram chat id used for reminders.
    pub fn with_telegram_chat_id(mut self, chat_id: impl Into<String>) -> Self {
        self.telegram_chat_id = Some(chat_id.into());
        self
    }
}

/// The household roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    members: Vec<Member>,
}

impl Roster {
    /// Create a roster from a list of members.
    pub fn new(members: Vec<Member>) -> Self {
        Self { members }
    }

    /// Whether `name` is a member of the household.
    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|m| m.name == name)
    }

    /// Look up a member by name.
    pub fn get(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    /// All members, in roster order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Member names, in roster order.
    pub fn names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Default for Roster {
    /// The default household roster with its display colors.
    fn default() -> Self {
        Self::new(vec![
            Member::new("Albin", "#039BE5"),
            Member::new("Maria", "#D50000"),
            Member::new("Olle", "#F6BF26"),
            Member::new("Ellen", "#7986CB"),
            Member::new("Familj", "#33B679"),
        ])
    }
}
