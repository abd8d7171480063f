//! Cloud memory API client
//!
//! Every call is scoped to the single configured `user_id` and authenticated
//! with `Authorization: Token <key>`. Without a key the store is disabled:
//! searches and listings come back empty and writes fail with
//! [`MemoryError::Unavailable`], all without touching the network.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{json, Value};
use std::time::Duration;

use super::{MemoryError, MemoryRecord, MemoryStore, Result};
use crate::config::CloudMemoryConfig;
use crate::secrets::{SecretString, MEM0_API_KEY};

const STORE: &str = "cloud";

/// `source` metadata attached to every cloud memory
pub const SOURCE_TAG: &str = "relay";

/// Results the cloud search endpoint returns when the caller gives no limit
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

pub struct CloudMemoryStore {
    base_url: String,
    user_id: String,
    api_key: Option<SecretString>,
    timeout: Duration,
    client: Client,
}

impl CloudMemoryStore {
    pub fn new(config: &CloudMemoryConfig, api_key: Option<SecretString>, client: Client) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_id: config.user_id.clone(),
            api_key,
            timeout: config.timeout(),
            client,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn authorized(&self, builder: RequestBuilder, api_key: &SecretString) -> RequestBuilder {
        builder
            .timeout(self.timeout)
            .header("Authorization", format!("Token {}", api_key.unsecure()))
    }

    async fn read_results(response: Response) -> Result<Vec<Value>> {
        if !response.status().is_success() {
            return Err(MemoryError::Backend {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| MemoryError::Parse(e.to_string()))?;

        match body.get("results") {
            Some(Value::Array(results)) => Ok(results.clone()),
            Some(other) => Err(MemoryError::Parse(format!(
                "expected results array, got {}",
                other
            ))),
            None => Ok(Vec::new()),
        }
    }

    /// Raw search results as the cloud API returns them.
    pub async fn search_raw(&self, query: &str, limit: usize) -> Result<Vec<Value>> {
        let Some(api_key) = self.api_key.as_ref() else {
            return Ok(Vec::new());
        };

        let payload = json!({
            "query": query,
            "user_id": self.user_id,
            "limit": limit,
        });

        let response = self
            .authorized(
                self.client
                    .post(format!("{}/memories/search/", self.base_url)),
                api_key,
            )
            .json(&payload)
            .send()
            .await
            .map_err(|e| MemoryError::from_transport(STORE, e))?;

        Self::read_results(response).await
    }

    /// Every memory stored for the configured user.
    pub async fn list_all(&self) -> Result<Vec<Value>> {
        let Some(api_key) = self.api_key.as_ref() else {
            return Ok(Vec::new());
        };

        let response = self
            .authorized(
                self.client.get(format!("{}/memories/", self.base_url)),
                api_key,
            )
            .query(&[("user_id", self.user_id.as_str())])
            .send()
            .await
            .map_err(|e| MemoryError::from_transport(STORE, e))?;

        Self::read_results(response).await
    }
}

#[async_trait]
impl MemoryStore for CloudMemoryStore {
    fn name(&self) -> &str {
        STORE
    }

    async fn add(&self, record: &MemoryRecord) -> Result<()> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| MemoryError::Unavailable(format!("{} not configured", MEM0_API_KEY)))?;

        // Cloud memories are tagged with their origin; local ones are not
        let mut metadata = record.metadata.clone();
        metadata.insert("source".to_string(), SOURCE_TAG.to_string());
        let payload = json!({
            "messages": [{"role": "user", "content": record.text}],
            "user_id": self.user_id,
            "metadata": metadata,
        });

        let response = self
            .authorized(
                self.client.post(format!("{}/memories/", self.base_url)),
                api_key,
            )
            .json(&payload)
            .send()
            .await
            .map_err(|e| MemoryError::from_transport(STORE, e))?;

        if !response.status().is_success() {
            return Err(MemoryError::Backend {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let results = self.search_raw(query, limit).await?;
        Ok(results
            .iter()
            .map(|item| {
                item.get("memory")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            })
            .filter(|memory| !memory.is_empty())
            .take(limit)
            .collect())
    }

    async fn check_health(&self) -> bool {
        self.is_configured()
    }
}
