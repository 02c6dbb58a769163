//! Hosted blob service reached over HTTP
//!
//! Documents live at `{base_url}/{name}`. `GET` returns the JSON body or 404,
//! `PUT` replaces the blob with the request body. Requests carry the
//! read-write token as a bearer credential when one is configured.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{DocumentStore, StoreError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct BlobStore {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl BlobStore {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build blob store HTTP client")?;

        let base_url: String = base_url.into();

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    fn url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl DocumentStore for BlobStore {
    async fn get(&self, name: &str) -> Result<Option<Value>, StoreError> {
        let url = self.url(name);
        debug!("Fetching blob: {}", url);

        let response = self.authorize(self.client.get(&url)).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "GET {} returned {}",
                name,
                response.status()
            )));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|source| StoreError::Codec {
                name: name.to_string(),
                source,
            })
    }

    async fn put(&self, name: &str, document: &Value) -> Result<(), StoreError> {
        let url = self.url(name);
        debug!("Uploading blob: {}", url);

        let response = self
            .authorize(self.client.put(&url))
            .json(document)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "PUT {} returned {}",
                name,
                response.status()
            )));
        }

        Ok(())
    }
}
