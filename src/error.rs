//! Error types for the hearth calendar core.

use thiserror::Error;

/// Main error type for hearth operations.
#[derive(Error, Debug)]
pub enum HearthError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// A booking request rejected before any write.
///
/// `field` names the offending input field so callers (and the assistant)
/// can report precisely what to fix.
#[derive(Error, Debug)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Storage-related errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Persistence failed: {0}")]
    Persist(#[source] std::io::Error),

    #[error("Corrupt calendar file: {0}")]
    Corrupt(String),

    #[error("Unsupported calendar file version: {0}")]
    UnsupportedVersion(u32),
}

/// Notification delivery errors. These stay inside the reminder sweep;
/// the booking path never sees them.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Notification request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Notification rejected: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("No notification route for member: {0}")]
    NoRoute(String),
}

/// Result type alias for hearth operations.
pub type Result<T> = std::result::Result<T, HearthError>;
