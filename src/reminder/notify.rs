//! Outbound reminder delivery.
//!
//! The notification channel is an external collaborator: the dispatcher
//! hands it `(member, title, body)` and expects either success or a
//! `DeliveryError` — never a silent failure. Backends carry their own
//! bounded request timeout so a hung send fails the single delivery, not
//! the sweep.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::error::{DeliveryError, Result};
use crate::roster::Member;

/// A best-effort notification channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message to one member.
    async fn send(&self, member: &Member, title: &str, body: &str) -> Result<()>;
}

// ============================================================================
// Telegram
// ============================================================================

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram Bot API notifier. Each member routes to their own chat id;
/// members without one are unroutable.
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    bot_token: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("Hearth/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_base: TELEGRAM_API_BASE.to_string(),
            bot_token: bot_token.into(),
        }
    }

    /// Point at a different API host. Used by tests.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, member: &Member, _title: &str, body: &str) -> Result<()> {
        let chat_id = member
            .telegram_chat_id
            .as_deref()
            .ok_or_else(|| DeliveryError::NoRoute(member.name.clone()))?;

        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);
        let response = self
            .client
            .post(&url)
            .json(&json!({
                "chat_id": chat_id,
                "text": body,
                "parse_mode": "Markdown",
            }))
            .send()
            .await
            .map_err(DeliveryError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        debug!(member = %member.name, "Telegram reminder delivered");
        Ok(())
    }
}

// ============================================================================
// ntfy
// ============================================================================

/// ntfy.sh notifier: one shared topic for the household.
pub struct NtfyNotifier {
    client: Client,
    base_url: String,
    topic: String,
}

impl NtfyNotifier {
    pub fn new(base_url: impl Into<String>, topic: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("Hearth/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
            topic: topic.into(),
        }
    }
}

#[async_trait]
impl Notifier for NtfyNotifier {
    async fn send(&self, member: &Member, title: &str, body: &str) -> Result<()> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), self.topic);
        let response = self
            .client
            .post(&url)
            .header("Title", title)
            .header("Priority", "high")
            .header("Tags", "calendar,alarm_clock")
            .body(body.to_string())
            .send()
            .await
            .map_err(DeliveryError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        debug!(member = %member.name, topic = %self.topic, "ntfy reminder delivered");
        Ok(())
    }
}
