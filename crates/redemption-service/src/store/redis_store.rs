//! Redis-backed document store
//!
//! Each document is a JSON string under `{key_prefix}{name}`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde_json::Value;
use tracing::{debug, info};

use super::{DocumentStore, StoreError};

pub struct RedisStore {
    conn: ConnectionManager,
    key_prefix: String,
}

impl RedisStore {
    /// Connect to Redis
    pub async fn new(redis_url: &str, key_prefix: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Failed to create Redis client")?;

        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        info!("Connected to Redis at {}", redis_url);

        Ok(Self {
            conn,
            key_prefix: key_prefix.into(),
        })
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.key_prefix, name)
    }
}

#[async_trait]
impl DocumentStore for RedisStore {
    async fn get(&self, name: &str) -> Result<Option<Value>, StoreError> {
        let key = self.key(name);
        let mut conn = self.conn.clone();

        let json: Option<String> = conn.get(&key).await?;
        debug!("redis get {} (present: {})", key, json.is_some());

        match json {
            Some(data) => serde_json::from_str(&data)
                .map(Some)
                .map_err(|source| StoreError::Codec {
                    name: name.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    async fn put(&self, name: &str, document: &Value) -> Result<(), StoreError> {
        let key = self.key(name);
        let mut conn = self.conn.clone();

        let json = serde_json::to_string(document).map_err(|source| StoreError::Codec {
            name: name.to_string(),
            source,
        })?;

        let _: () = conn.set(&key, json).await?;
        debug!("redis put {}", key);
        Ok(())
    }
}
