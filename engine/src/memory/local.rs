//! Local vector memory service client
//!
//! Speaks the service's small JSON protocol:
//! - `POST /store`  `{id, text, collection, metadata}`
//! - `POST /recall` `{query, n}` → `{documents: [...]}`
//! - `GET /health`

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use super::{MemoryError, MemoryRecord, MemoryStore, Result};
use crate::config::LocalMemoryConfig;

const STORE: &str = "local";

pub struct LocalMemoryStore {
    base_url: String,
    collection: String,
    timeout: Duration,
    client: Client,
}

impl LocalMemoryStore {
    pub fn new(config: &LocalMemoryConfig, client: Client) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
            timeout: config.timeout(),
            client,
        }
    }
}

#[derive(Serialize)]
struct StoreRequest<'a> {
    id: &'a str,
    text: &'a str,
    collection: &'a str,
    metadata: &'a BTreeMap<String, String>,
}

#[derive(Serialize)]
struct RecallRequest<'a> {
    query: &'a str,
    n: usize,
}

#[derive(Deserialize)]
struct RecallResponse {
    #[serde(default)]
    documents: Vec<serde_json::Value>,
}

#[async_trait]
impl MemoryStore for LocalMemoryStore {
    fn name(&self) -> &str {
        STORE
    }

    async fn add(&self, record: &MemoryRecord) -> Result<()> {
        let request = StoreRequest {
            id: &record.id,
            text: &record.text,
            collection: &self.collection,
            metadata: &record.metadata,
        };

        let response = self
            .client
            .post(format!("{}/store", self.base_url))
            .timeout(self.timeout)
            .json(&request)
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
        let response = self
            .client
            .post(format!("{}/recall", self.base_url))
            .timeout(self.timeout)
            .json(&RecallRequest { query, n: limit })
            .send()
            .await
            .map_err(|e| MemoryError::from_transport(STORE, e))?;

        if !response.status().is_success() {
            return Err(MemoryError::Backend {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body: RecallResponse = response
            .json()
            .await
            .map_err(|e| MemoryError::Parse(e.to_string()))?;

        // Non-string documents carry nothing we can put in a prompt
        Ok(body
            .documents
            .into_iter()
            .filter_map(|doc| match doc {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .take(limit)
            .collect())
    }

    async fn check_health(&self) -> bool {
        match self
            .client
            .get(format!("{}/health", self.base_url))
            .timeout(Duration::from_secs(2))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Local memory health probe failed: {}", e);
                false
            }
        }
    }
}
