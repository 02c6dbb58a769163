//! Whole-document JSON storage
//!
//! Every backend speaks the same contract: `get` a named document (absent is
//! `Ok(None)`, never an error) and `put` a named document, fully replacing
//! whatever was there. There is no partial update, no versioning and no
//! retry at this layer.

mod blob;
mod memory;
mod redis_store;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

pub use self::blob::BlobStore;
pub use self::memory::MemoryStore;
pub use self::redis_store::RedisStore;

/// Store failures. A missing document is not one of them.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    #[error("Document `{name}` is malformed: {source}")]
    Codec {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Key to JSON-document persistence with get/put-whole-document semantics
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document, `None` if it does not exist
    async fn get(&self, name: &str) -> Result<Option<Value>, StoreError>;

    /// Overwrite a document
    async fn put(&self, name: &str, document: &Value) -> Result<(), StoreError>;
}

/// Store handle shared by the repositories
pub type SharedStore = Arc<dyn DocumentStore>;

/// Fetch and decode a typed document
pub async fn load<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    name: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(name).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| StoreError::Codec {
                name: name.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Encode and overwrite a typed document
pub async fn save<T: Serialize + ?Sized>(
    store: &dyn DocumentStore,
    name: &str,
    document: &T,
) -> Result<(), StoreError> {
    let value = serde_json::to_value(document).map_err(|source| StoreError::Codec {
        name: name.to_string(),
        source,
    })?;
    store.put(name, &value).await
}
