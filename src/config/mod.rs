//! Configuration loading and validation.

mod settings;

pub use settings::{
    BookingConfig, Config, HouseholdConfig, NotifierBackend, NtfyConfig, ReminderConfig,
    StorageConfig, TelegramConfig,
};
