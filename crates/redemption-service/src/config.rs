//! Configuration management for the coupon service
//!
//! Loads configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::sync::Arc;

use crate::notifier::{NotificationSink, TelegramNotifier};
use crate::store::{BlobStore, MemoryStore, RedisStore, SharedStore};

/// Which document store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Redis,
    Blob,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "redis" => Ok(StoreBackend::Redis),
            "blob" => Ok(StoreBackend::Blob),
            other => anyhow::bail!("Unknown STORE_BACKEND: {}", other),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server host
    pub host: String,

    /// API server port
    pub port: u16,

    pub backend: StoreBackend,

    pub redis_url: String,

    /// Prefix for document keys in Redis
    pub redis_key_prefix: String,

    /// Base URL of the hosted blob service
    pub blob_base_url: Option<String>,

    pub blob_token: Option<String>,

    pub telegram_api_url: String,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Config {
            host: var("COUPON_HOST", "0.0.0.0"),

            port: var("COUPON_PORT", "3001")
                .parse()
                .context("Invalid COUPON_PORT")?,

            backend: var("STORE_BACKEND", "memory").parse()?,

            redis_url: var("REDIS_URL", "redis://127.0.0.1:6379"),

            redis_key_prefix: var("REDIS_KEY_PREFIX", "coupons:"),

            blob_base_url: non_empty("BLOB_BASE_URL"),

            blob_token: non_empty("BLOB_READ_WRITE_TOKEN"),

            telegram_api_url: var("TELEGRAM_API_URL", "https://api.telegram.org"),
            telegram_bot_token: non_empty("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: non_empty("TELEGRAM_CHAT_ID"),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("COUPON_PORT must be greater than 0");
        }

        if self.backend == StoreBackend::Blob && self.blob_base_url.is_none() {
            anyhow::bail!("BLOB_BASE_URL is required when STORE_BACKEND=blob");
        }

        Ok(())
    }

    /// Get the API server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Open the configured document store
    pub async fn open_store(&self) -> Result<SharedStore> {
        let store: SharedStore = match self.backend {
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store, data will not survive a restart");
                Arc::new(MemoryStore::new())
            }
            StoreBackend::Redis => Arc::new(
                RedisStore::new(&self.redis_url, self.redis_key_prefix.clone())
                    .await
                    .context("Failed to initialize Redis store")?,
            ),
            StoreBackend::Blob => {
                let base_url = self
                    .blob_base_url
                    .clone()
                    .context("BLOB_BASE_URL is not set")?;
                Arc::new(BlobStore::new(base_url, self.blob_token.clone())?)
            }
        };

        Ok(store)
    }

    /// Telegram alerts, when both the bot token and chat id are set
    pub fn telegram_notifier(&self) -> Result<Option<TelegramNotifier>> {
        match (&self.telegram_bot_token, &self.telegram_chat_id) {
            (Some(token), Some(chat_id)) => Ok(Some(TelegramNotifier::new(
                self.telegram_api_url.clone(),
                token.clone(),
                chat_id.clone(),
            )?)),
            _ => Ok(None),
        }
    }

    /// Start the notification worker, or a disabled sink when alerts are
    /// not configured
    pub fn notification_sink(&self) -> Result<NotificationSink> {
        match self.telegram_notifier()? {
            Some(notifier) => {
                let (sink, _worker) = NotificationSink::spawn(Arc::new(notifier));
                Ok(sink)
            }
            None => {
                tracing::info!("Telegram credentials not configured, notifications disabled");
                Ok(NotificationSink::disabled())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_defaults() {
        let config = config_from(&[]).expect("Failed to load config");

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3001);
        assert_eq!(config.backend, StoreBackend::Memory);
        assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
        assert_eq!(config.redis_key_prefix, "coupons:");
        assert!(config.telegram_notifier().unwrap().is_none());
    }

    #[test]
    fn test_address() {
        let config = config_from(&[("COUPON_HOST", "127.0.0.1"), ("COUPON_PORT", "9000")]).unwrap();

        assert_eq!(config.address(), "127.0.0.1:9000");
    }

    #[test]
    fn test_validate_invalid_port() {
        let result = config_from(&[("COUPON_PORT", "0")]);

        assert!(result
            .unwrap_err()
            .to_string()
            .contains("COUPON_PORT must be greater than 0"));
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let result = config_from(&[("STORE_BACKEND", "sheets")]);

        assert!(result.unwrap_err().to_string().contains("Unknown STORE_BACKEND"));
    }

    #[test]
    fn test_blob_backend_requires_base_url() {
        assert!(config_from(&[("STORE_BACKEND", "blob")]).is_err());

        let config = config_from(&[
            ("STORE_BACKEND", "Blob"),
            ("BLOB_BASE_URL", "https://blob.example.com/store"),
            ("BLOB_READ_WRITE_TOKEN", "token"),
        ])
        .unwrap();
        assert_eq!(config.backend, StoreBackend::Blob);
        assert_eq!(config.blob_token.as_deref(), Some("token"));
    }

    #[test]
    fn test_telegram_needs_token_and_chat() {
        let only_token = config_from(&[("TELEGRAM_BOT_TOKEN", "abc")]).unwrap();
        assert!(only_token.telegram_notifier().unwrap().is_none());

        let both = config_from(&[("TELEGRAM_BOT_TOKEN", "abc"), ("TELEGRAM_CHAT_ID", "42")]).unwrap();
        assert!(both.telegram_notifier().unwrap().is_some());
    }
}
