//! In-memory event store with optional JSON file persistence.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::{debug, info};

use crate::calendar::{Event, EventUpdate};
use crate::error::{HearthError, Result, StoreError};

use super::EventStore;

/// Current on-disk calendar file version.
const CALENDAR_FILE_VERSION: u32 = 1;

/// Versioned on-disk record. Earlier deployments shipped three ad-hoc row
/// shapes; files that do not carry a known version are rejected instead of
/// shape-sniffed.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedCalendar {
    version: u32,
    events: Vec<Event>,
}

/// In-memory event store with optional persistence.
///
/// Events live in a `RwLock`'d map for fast access, with optional JSON
/// file persistence after every mutation (write to a temp file, then
/// rename, so a crash never leaves a half-written calendar).
#[derive(Debug)]
pub struct EmbeddedEventStore {
    events: RwLock<HashMap<String, Event>>,
    /// Optional persistence file path.
    persistence_path: Option<PathBuf>,
    /// Mutex for persistence operations.
    persist_lock: AsyncMutex<()>,
}

impl EmbeddedEventStore {
    /// Create a new in-memory store without persistence.
    pub fn new() -> Self {
        Self {
            events: RwLock::new(HashMap::new()),
            persistence_path: None,
            persist_lock: AsyncMutex::new(()),
        }
    }

    /// Create a store persisting to `<data_dir>/calendar.json`, loading
    /// the existing file when present.
    pub async fn with_persistence(data_dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let persistence_path = data_dir.join("calendar.json");

        let store = Self {
            events: RwLock::new(HashMap::new()),
            persistence_path: Some(persistence_path.clone()),
            persist_lock: AsyncMutex::new(()),
        };

        if persistence_path.exists() {
            store.load_from_file(&persistence_path).await?;
        }

        Ok(store)
    }

    /// Load events from a calendar file.
    async fn load_from_file(&self, path: &Path) -> Result<()> {
        let content = tokio::fs::read_to_string(path).await?;
        let persisted: PersistedCalendar = serde_json::from_str(&content)
            .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))?;

        if persisted.version != CALENDAR_FILE_VERSION {
            return Err(StoreError::UnsupportedVersion(persisted.version).into());
        }

        let mut events = self.events.write().await;
        for event in persisted.events {
            events.insert(event.id.clone(), event);
        }
        info!(
            count = events.len(),
            path = %path.display(),
            "Loaded calendar"
        );
        Ok(())
    }

    /// Persist events to file if persistence is enabled.
    async fn persist(&self) -> Result<()> {
        let Some(ref path) = self.persistence_path else {
            return Ok(());
        };

        let _lock = self.persist_lock.lock().await;

        let events = self.events.read().await;
        let mut snapshot: Vec<Event> = events.values().cloned().collect();
        drop(events);
        snapshot.sort_by(|a, b| (a.date, a.time).cmp(&(b.date, b.time)));

        let persisted = PersistedCalendar {
            version: CALENDAR_FILE_VERSION,
            events: snapshot,
        };
        let json = serde_json::to_string_pretty(&persisted).map_err(HearthError::Serialization)?;

        // Write to a temp file first, then rename for atomicity.
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json)
            .await
            .map_err(StoreError::Persist)?;
        tokio::fs::rename(&tmp_path, path)
            .await
            .map_err(StoreError::Persist)?;
        Ok(())
    }
}

impl Default for EmbeddedEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for EmbeddedEventStore {
    async fn insert(&self, event: Event) -> Result<()> {
        let mut events = self.events.write().await;
        debug!(id = %event.id, title = %event.title, "Inserting event");
        events.insert(event.id.clone(), event);
        drop(events);
        self.persist().await
    }

    async fn get(&self, id: &str) -> Result<Option<Event>> {
        let events = self.events.read().await;
        Ok(events.get(id).cloned())
    }

    async fn update(&self, id: &str, update: EventUpdate) -> Result<Event> {
        let mut events = self.events.write().await;
        let event = events
            .get_mut(id)
            .ok_or_else(|| HearthError::NotFound(id.to_string()))?;
        update.apply_to(event);
        let updated = event.clone();
        drop(events);
        self.persist().await?;
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut events = self.events.write().await;
        let removed = events.remove(id).is_some();
        drop(events);
        if removed {
            debug!(id = %id, "Deleted event");
            self.persist().await?;
        }
        Ok(removed)
    }

    async fn query_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Event>> {
        let events = self.events.read().await;
        let mut matches: Vec<Event> = events
            .values()
            .filter(|e| {
                (start <= e.date && e.date <= end) || (e.recurrence.is_some() && e.date <= end)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| (a.date, a.time).cmp(&(b.date, b.time)));
        Ok(matches)
    }

    async fn events_for_date(&self, date: NaiveDate) -> Result<Vec<Event>> {
        let events = self.events.read().await;
        let mut matches: Vec<Event> = events.values().filter(|e| e.date == date).cloned().collect();
        matches.sort_by_key(|e| e.time);
        Ok(matches)
    }

    async fn mark_reminder_sent(&self, id: &str) -> Result<bool> {
        let mut events = self.events.write().await;
        let event = events
            .get_mut(id)
            .ok_or_else(|| HearthError::NotFound(id.to_string()))?;
        if event.reminder_sent {
            return Ok(false);
        }
        event.reminder_sent = true;
        event.updated_at = Utc::now();
        drop(events);
        self.persist().await?;
        Ok(true)
    }

    async fn clear_reminder_sent(&self, id: &str) -> Result<()> {
        let mut events = self.events.write().await;
        let event = events
            .get_mut(id)
            .ok_or_else(|| HearthError::NotFound(id.to_string()))?;
        event.reminder_sent = false;
        event.updated_at = Utc::now();
        drop(events);
        self.persist().await
    }

    async fn count(&self) -> Result<usize> {
        let events = self.events.read().await;
        Ok(events.len())
    }
}
