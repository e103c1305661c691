//! Reminder dispatch: the periodic sweep and its delivery backends.

mod dispatcher;
mod notify;

pub use dispatcher::{ReminderDispatcher, SweepStats};
pub use notify::{Notifier, NtfyNotifier, TelegramNotifier};
