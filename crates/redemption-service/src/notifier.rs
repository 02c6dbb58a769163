//! Best-effort redemption alerts
//!
//! The redemption path hands a message to [`NotificationSink::notify`], which
//! only enqueues it. A background task drains the queue and calls the
//! configured [`Notifier`]; delivery failures are logged and dropped.

use anyhow::{Context, Result};
use async_trait::async_trait;
use coupon_common::{ClaimsState, HistoryRecord};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Something that can deliver a text alert
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

/// Chat-bot alerts through the Telegram Bot API
pub struct TelegramNotifier {
    api_url: String,
    bot_token: String,
    chat_id: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

impl TelegramNotifier {
    pub fn new(api_url: impl Into<String>, bot_token: String, chat_id: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build Telegram HTTP client")?;

        let api_url: String = api_url.into();

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            bot_token,
            chat_id,
            client,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.bot_token);

        let response = self
            .client
            .post(&url)
            .json(&SendMessage {
                chat_id: &self.chat_id,
                text,
            })
            .send()
            .await
            .context("Failed to reach Telegram")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Telegram returned {}: {}", status, body);
        }

        debug!("Telegram notification delivered");
        Ok(())
    }
}

/// Fire-and-forget handle used by the redemption path
#[derive(Clone, Default)]
pub struct NotificationSink {
    tx: Option<mpsc::UnboundedSender<String>>,
}

impl NotificationSink {
    /// A sink that drops every message
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Start the delivery task. It exits once every sink clone is dropped.
    pub fn spawn(notifier: Arc<dyn Notifier>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let handle = tokio::spawn(async move {
            while let Some(text) = rx.recv().await {
                if let Err(e) = notifier.send(&text).await {
                    warn!("Failed to send redemption notification: {:#}", e);
                }
            }
            info!("Notification worker stopped");
        });

        (Self { tx: Some(tx) }, handle)
    }

    /// Queue a message. Never blocks and never fails.
    pub fn notify(&self, text: impl Into<String>) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(text.into()).is_err() {
            warn!("Notification worker is gone, dropping message");
        }
    }
}

/// Human-readable alert for a committed redemption
pub fn redemption_summary(record: &HistoryRecord, claims: &ClaimsState) -> String {
    let details = if record.details.trim().is_empty() {
        "No details"
    } else {
        record.details.as_str()
    };

    format!(
        "🎫 Coupon Redeemed!\n\nTitle: {}\nDetails: {}\nTime: {}\nClaims used: {}",
        record.title,
        details,
        record.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        claims.current_claims
    )
}
