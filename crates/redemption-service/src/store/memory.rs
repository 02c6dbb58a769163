//! In-process document store

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::{DocumentStore, StoreError};

/// Documents held in memory. Used for local development and tests; nothing
/// survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a document
    pub fn with_document(mut self, name: &str, document: Value) -> Self {
        self.documents
            .get_mut()
            .insert(name.to_string(), document);
        self
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, name: &str) -> Result<Option<Value>, StoreError> {
        let documents = self.documents.read().await;
        debug!("memory get {} (present: {})", name, documents.contains_key(name));
        Ok(documents.get(name).cloned())
    }

    async fn put(&self, name: &str, document: &Value) -> Result<(), StoreError> {
        debug!("memory put {}", name);
        self.documents
            .write()
            .await
            .insert(name.to_string(), document.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_overwrites_whole_document() {
        let store = MemoryStore::new().with_document("doc.json", json!([1, 2, 3]));

        store.put("doc.json", &json!([4])).await.unwrap();

        assert_eq!(store.get("doc.json").await.unwrap(), Some(json!([4])));
        assert_eq!(store.get("other.json").await.unwrap(), None);
    }
}
