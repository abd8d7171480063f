//! Dual-tier memory
//!
//! Two independent stores sit behind one [`MemoryStore`] contract:
//!
//! - **Local**: a low-latency vector memory service on this machine.
//! - **Cloud**: a hosted memory API scoped to one fixed account.
//!
//! [`DualMemory`] fans reads and writes out to both. Every failure is
//! contained per store: a slow or broken store contributes nothing, it
//! never delays or fails the other one, and nothing here ever surfaces to
//! the caller as an error.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

pub mod cloud;
pub mod local;

/// Length of a memory id in hex characters
pub const MEMORY_ID_LEN: usize = 16;

/// Result type for memory operations
pub type Result<T> = std::result::Result<T, MemoryError>;

/// Errors raised by a memory store adapter
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("Memory store unavailable: {0}")]
    Unavailable(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Backend error ({status}): {body}")]
    Backend { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl MemoryError {
    pub(crate) fn from_transport(store: &str, err: reqwest::Error) -> Self {
        if err.is_connect() {
            MemoryError::Unavailable(format!("cannot connect to {}: {}", store, err))
        } else {
            MemoryError::Network(format!("{}: {}", store, err))
        }
    }
}

/// One conversation turn as stored in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRecord {
    pub id: String,
    pub text: String,
    pub metadata: BTreeMap<String, String>,
}

impl MemoryRecord {
    /// Build the record for a finished turn.
    ///
    /// `speaker` is the label the assistant's reply is stored under.
    pub fn for_turn(
        user_message: &str,
        response_text: &str,
        speaker: &str,
        provider_used: &str,
    ) -> Self {
        let metadata = BTreeMap::from([("provider".to_string(), provider_used.to_string())]);
        Self {
            id: memory_id(user_message, response_text),
            text: format!("User: {}\n{}: {}", user_message, speaker, response_text),
            metadata,
        }
    }
}

/// Content-addressed id for a turn: the first 16 hex characters of
/// SHA-256 over the user message followed by the response.
pub fn memory_id(user_message: &str, response_text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_message.as_bytes());
    hasher.update(response_text.as_bytes());
    let mut id = hex::encode(hasher.finalize());
    id.truncate(MEMORY_ID_LEN);
    id
}

/// Snippets recalled for one turn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryContext {
    pub local: Vec<String>,
    pub cloud: Vec<String>,
}

impl MemoryContext {
    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.cloud.is_empty()
    }
}

/// Common contract of the local and cloud stores
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Short store name used in logs
    fn name(&self) -> &str;

    /// Persist one record.
    async fn add(&self, record: &MemoryRecord) -> Result<()>;

    /// Return at most `limit` snippets relevant to `query`, best first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>>;

    /// Whether the store is reachable (or, for hosted stores, configured).
    async fn check_health(&self) -> bool {
        true
    }
}

/// Fan-out over both stores with independent time budgets.
#[derive(Clone)]
pub struct DualMemory {
    local: Arc<dyn MemoryStore>,
    cloud: Arc<dyn MemoryStore>,
    local_timeout: Duration,
    cloud_timeout: Duration,
}

impl DualMemory {
    pub fn new(local: Arc<dyn MemoryStore>, cloud: Arc<dyn MemoryStore>) -> Self {
        Self {
            local,
            cloud,
            local_timeout: Duration::from_secs(5),
            cloud_timeout: Duration::from_secs(30),
        }
    }

    /// Override the per-store time budgets
    pub fn with_timeouts(mut self, local: Duration, cloud: Duration) -> Self {
        self.local_timeout = local;
        self.cloud_timeout = cloud;
        self
    }

    /// Search both stores concurrently. A store that fails or runs out of
    /// time contributes an empty list.
    pub async fn recall(&self, query: &str, limit: usize) -> MemoryContext {
        let (local, cloud) = tokio::join!(
            search_isolated(self.local.as_ref(), query, limit, self.local_timeout),
            search_isolated(self.cloud.as_ref(), query, limit, self.cloud_timeout),
        );
        MemoryContext { local, cloud }
    }

    /// Write `record` to both stores concurrently. Failures are logged and
    /// dropped; nothing is retried.
    pub async fn persist(&self, record: MemoryRecord) {
        tokio::join!(
            add_isolated(self.local.as_ref(), &record, self.local_timeout),
            add_isolated(self.cloud.as_ref(), &record, self.cloud_timeout),
        );
    }

    /// (local, cloud) health
    pub async fn check_health(&self) -> (bool, bool) {
        tokio::join!(self.local.check_health(), self.cloud.check_health())
    }
}

async fn search_isolated(
    store: &dyn MemoryStore,
    query: &str,
    limit: usize,
    budget: Duration,
) -> Vec<String> {
    match tokio::time::timeout(budget, store.search(query, limit)).await {
        Ok(Ok(mut snippets)) => {
            snippets.truncate(limit);
            snippets
        }
        Ok(Err(e)) => {
            tracing::warn!("{} memory recall failed: {}", store.name(), e);
            Vec::new()
        }
        Err(_) => {
            tracing::warn!("{} memory recall failed: {}", store.name(), MemoryError::Timeout(budget));
            Vec::new()
        }
    }
}

async fn add_isolated(store: &dyn MemoryStore, record: &MemoryRecord, budget: Duration) {
    match tokio::time::timeout(budget, store.add(record)).await {
        Ok(Ok(())) => tracing::debug!("Stored memory {} in {}", record.id, store.name()),
        Ok(Err(e)) => tracing::warn!("{} memory store failed: {}", store.name(), e),
        Err(_) => tracing::warn!(
            "{} memory store failed: {}",
            store.name(),
            MemoryError::Timeout(budget)
        ),
    }
}
