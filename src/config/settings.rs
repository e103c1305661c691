//! Configuration settings for the hearth calendar.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::roster::{Member, Roster};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub household: HouseholdConfig,
    pub storage: StorageConfig,
    pub booking: BookingConfig,
    pub reminders: ReminderConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            PathBuf::from("hearth.toml"),
            PathBuf::from("config.toml"),
            dirs::config_dir()
                .map(|p| p.join("hearth/config.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".hearth/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.household.timezone()?;

        if self.household.members.is_empty() {
            return Err(ConfigError::Invalid("household.members must not be empty".into()).into());
        }
        let mut seen = std::collections::HashSet::new();
        for member in &self.household.members {
            if !seen.insert(member.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate household member: {}",
                    member.name
                ))
                .into());
            }
        }

        if self.booking.dedup_ttl_secs == 0 {
            return Err(ConfigError::Invalid("booking.dedup_ttl_secs must be > 0".into()).into());
        }

        let r = &self.reminders;
        if r.lead_minutes <= 0 {
            return Err(ConfigError::Invalid("reminders.lead_minutes must be > 0".into()).into());
        }
        if r.window_slack_minutes < 0 || r.window_slack_minutes >= r.lead_minutes {
            return Err(ConfigError::Invalid(
                "reminders.window_slack_minutes must be in [0, lead_minutes)".into(),
            )
            .into());
        }
        if r.backend == NotifierBackend::Telegram && r.telegram.bot_token.is_empty() {
            return Err(
                ConfigError::Invalid("reminders.telegram.bot_token is required".into()).into(),
            );
        }

        Ok(())
    }

    /// Expand the data directory path.
    pub fn data_dir(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.storage.data_dir);
        PathBuf::from(expanded.as_ref())
    }
}

/// Household identity: timezone and roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseholdConfig {
    /// IANA timezone name. All date arithmetic uses this fixed zone,
    /// never the host's.
    pub timezone: String,
    /// The household roster.
    pub members: Vec<Member>,
}

impl Default for HouseholdConfig {
    fn default() -> Self {
        Self {
            timezone: "Europe/Stockholm".to_string(),
            members: Roster::default().members().to_vec(),
        }
    }
}

impl HouseholdConfig {
    /// Parse the configured timezone.
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| ConfigError::UnknownTimezone(self.timezone.clone()).into())
    }

    /// The roster built from the configured members.
    pub fn roster(&self) -> Roster {
        Roster::new(self.members.clone())
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the calendar file.
    pub data_dir: String,
    /// Whether to persist the calendar to disk.
    pub persist: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.hearth".to_string(),
            persist: true,
        }
    }
}

/// Booking deduplication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    /// Seconds a booking fingerprint stays registered.
    pub dedup_ttl_secs: u64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            dedup_ttl_secs: 600,
        }
    }
}

/// Reminder sweep and delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// Nominal minutes before start to remind.
    pub lead_minutes: i64,
    /// Half-width of the firing window around the lead time, sized to
    /// tolerate sweep granularity and clock skew.
    pub window_slack_minutes: i64,
    /// Timeout for one outbound notification request, in seconds.
    pub send_timeout_secs: u64,
    /// Which delivery backend to use.
    pub backend: NotifierBackend,
    pub telegram: TelegramConfig,
    pub ntfy: NtfyConfig,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            lead_minutes: 15,
            window_slack_minutes: 1,
            send_timeout_secs: 10,
            backend: NotifierBackend::Ntfy,
            telegram: TelegramConfig::default(),
            ntfy: NtfyConfig::default(),
        }
    }
}

/// Delivery backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierBackend {
    Telegram,
    Ntfy,
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: String,
}

/// ntfy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NtfyConfig {
    pub base_url: String,
    pub topic: String,
}

impl Default for NtfyConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ntfy.sh".to_string(),
            topic: "familjekalender".to_string(),
        }
    }
}
