//! Integration tests for the memory stores
//!
//! The local service and the cloud API are mocked with wiremock; the
//! fan-out tests use in-process stores so failures and delays are exact.

use async_trait::async_trait;
use relay_engine::config::{CloudMemoryConfig, LocalMemoryConfig};
use relay_engine::memory::cloud::CloudMemoryStore;
use relay_engine::memory::local::LocalMemoryStore;
use relay_engine::memory::{
    memory_id, DualMemory, MemoryError, MemoryRecord, MemoryStore, Result,
};
use relay_engine::secrets::SecretString;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn local_store(uri: String) -> LocalMemoryStore {
    LocalMemoryStore::new(
        &LocalMemoryConfig {
            base_url: uri,
            ..LocalMemoryConfig::default()
        },
        reqwest::Client::new(),
    )
}

fn cloud_store(uri: String, key: Option<&str>) -> CloudMemoryStore {
    CloudMemoryStore::new(
        &CloudMemoryConfig {
            base_url: uri,
            user_id: "tester".to_string(),
            ..CloudMemoryConfig::default()
        },
        key.map(SecretString::new),
        reqwest::Client::new(),
    )
}

#[tokio::test]
async fn test_local_store_posts_record() {
    let server = MockServer::start().await;
    let record = MemoryRecord::for_turn("hi", "hello", "Assistant", "local");

    Mock::given(method("POST"))
        .and(path("/store"))
        .and(body_partial_json(json!({
            "id": record.id,
            "text": "User: hi\nAssistant: hello",
            "collection": "conversations",
            "metadata": {"provider": "local"},
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    local_store(server.uri()).add(&record).await.unwrap();

    // The origin tag is only sent to the cloud store
    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["metadata"], json!({"provider": "local"}));
}

#[tokio::test]
async fn test_local_recall_keeps_string_documents() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/recall"))
        .and(body_partial_json(json!({"query": "rust", "n": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": ["first", 42, "second", "third", "fourth"]
        })))
        .mount(&server)
        .await;

    let snippets = local_store(server.uri()).search("rust", 3).await.unwrap();
    assert_eq!(snippets, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn test_local_recall_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/recall"))
        .respond_with(ResponseTemplate::new(503).set_body_string("warming up"))
        .mount(&server)
        .await;

    let err = local_store(server.uri()).search("rust", 3).await.unwrap_err();
    assert!(matches!(err, MemoryError::Backend { status: 503, .. }));
}

#[tokio::test]
async fn test_cloud_search_sends_token_and_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/memories/search/"))
        .and(header("authorization", "Token m0-test"))
        .and(body_partial_json(json!({"query": "plans", "user_id": "tester", "limit": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": "a", "memory": "likes hiking"},
                {"id": "b", "memory": ""},
                {"id": "c", "memory": "lives in Lisbon"},
            ]
        })))
        .mount(&server)
        .await;

    let store = cloud_store(server.uri(), Some("m0-test"));
    let snippets = store.search("plans", 2).await.unwrap();
    assert_eq!(snippets, vec!["likes hiking", "lives in Lisbon"]);
}

#[tokio::test]
async fn test_cloud_add_wraps_text_as_user_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/memories/"))
        .and(body_partial_json(json!({
            "messages": [{"role": "user", "content": "User: a\nAssistant: b"}],
            "user_id": "tester",
            "metadata": {"provider": "claude", "source": "relay"},
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let store = cloud_store(server.uri(), Some("m0-test"));
    let record = MemoryRecord::for_turn("a", "b", "Assistant", "claude");
    store.add(&record).await.unwrap();
}

#[tokio::test]
async fn test_cloud_list_all_scoped_to_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/memories/"))
        .and(query_param("user_id", "tester"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": "a", "memory": "one"}]
        })))
        .mount(&server)
        .await;

    let store = cloud_store(server.uri(), Some("m0-test"));
    let all = store.list_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0]["memory"], "one");
}

#[tokio::test]
async fn test_cloud_without_key_never_calls_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = cloud_store(server.uri(), None);
    assert!(!store.is_configured());
    assert!(store.search("x", 3).await.unwrap().is_empty());
    assert!(store.search_raw("x", 5).await.unwrap().is_empty());
    assert!(store.list_all().await.unwrap().is_empty());

    let record = MemoryRecord::for_turn("a", "b", "Assistant", "local");
    let err = store.add(&record).await.unwrap_err();
    assert!(matches!(err, MemoryError::Unavailable(_)));
    assert!(!store.check_health().await);
}

/// In-process store with scripted behaviour
struct ScriptedStore {
    name: &'static str,
    snippets: Vec<String>,
    fail: bool,
    delay: Duration,
    added: Mutex<Vec<MemoryRecord>>,
}

impl ScriptedStore {
    fn ok(name: &'static str, snippets: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            name,
            snippets: snippets.iter().map(|s| s.to_string()).collect(),
            fail: false,
            delay: Duration::ZERO,
            added: Mutex::new(Vec::new()),
        })
    }

    fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            snippets: Vec::new(),
            fail: true,
            delay: Duration::ZERO,
            added: Mutex::new(Vec::new()),
        })
    }

    fn slow(name: &'static str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            name,
            snippets: vec!["too late".to_string()],
            fail: false,
            delay,
            added: Mutex::new(Vec::new()),
        })
    }

    fn added_ids(&self) -> Vec<String> {
        self.added
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.id.clone())
            .collect()
    }
}

#[async_trait]
impl MemoryStore for ScriptedStore {
    fn name(&self) -> &str {
        self.name
    }

    async fn add(&self, record: &MemoryRecord) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(MemoryError::Unavailable("scripted".to_string()));
        }
        self.added.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<String>> {
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(MemoryError::Unavailable("scripted".to_string()));
        }
        Ok(self.snippets.iter().take(limit).cloned().collect())
    }
}

#[tokio::test]
async fn test_recall_isolates_a_failing_store() {
    let local = ScriptedStore::failing("local");
    let cloud = ScriptedStore::ok("cloud", &["cloud fact"]);
    let memory = DualMemory::new(local, cloud);

    let context = memory.recall("anything", 3).await;
    assert!(context.local.is_empty());
    assert_eq!(context.cloud, vec!["cloud fact"]);
}

#[tokio::test]
async fn test_recall_respects_per_store_timeout() {
    let local = ScriptedStore::ok("local", &["local fact"]);
    let cloud = ScriptedStore::slow("cloud", Duration::from_secs(5));
    let memory = DualMemory::new(local, cloud)
        .with_timeouts(Duration::from_secs(1), Duration::from_millis(50));

    let started = std::time::Instant::now();
    let context = memory.recall("anything", 3).await;
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(context.local, vec!["local fact"]);
    assert!(context.cloud.is_empty());
}

#[tokio::test]
async fn test_persist_writes_same_id_to_both_stores() {
    let local = ScriptedStore::ok("local", &[]);
    let cloud = ScriptedStore::ok("cloud", &[]);
    let memory = DualMemory::new(
        Arc::clone(&local) as Arc<dyn MemoryStore>,
        Arc::clone(&cloud) as Arc<dyn MemoryStore>,
    );

    memory
        .persist(MemoryRecord::for_turn("q", "a", "Assistant", "local"))
        .await;

    let expected = memory_id("q", "a");
    assert_eq!(local.added_ids(), vec![expected.clone()]);
    assert_eq!(cloud.added_ids(), vec![expected]);
}

#[tokio::test]
async fn test_persist_survives_one_store_failing() {
    let local = ScriptedStore::ok("local", &[]);
    let cloud = ScriptedStore::failing("cloud");
    let memory = DualMemory::new(
        Arc::clone(&local) as Arc<dyn MemoryStore>,
        cloud as Arc<dyn MemoryStore>,
    );

    memory
        .persist(MemoryRecord::for_turn("q", "a", "Assistant", "local"))
        .await;
    assert_eq!(local.added_ids().len(), 1);
}
