//! HTTP surface
//!
//! # Endpoints
//!
//! - POST /chat - Run one chat turn
//! - GET /status - Backend reachability
//! - POST /memory/cloud/search - Raw cloud memory search
//! - GET /memory/cloud/all - Every cloud memory for the configured user
//! - POST /transcribe - Audio transcription passthrough

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sdk::{ChatRequest, ChatResponse, EngineError, RelayErrorExt, StatusReport};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::conductor::{Conductor, Persona};
use crate::config::Config;
use crate::llm::ProviderSet;
use crate::memory::cloud::{CloudMemoryStore, DEFAULT_SEARCH_LIMIT};
use crate::memory::local::LocalMemoryStore;
use crate::memory::{DualMemory, MemoryStore};
use crate::secrets::Credentials;
use crate::status;
use crate::transcription::{AudioUpload, Transcriber};

/// Largest accepted audio upload
const MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;

/// Shared state injected into each handler
#[derive(Clone)]
pub struct AppState {
    pub conductor: Arc<Conductor>,
    pub cloud: Arc<CloudMemoryStore>,
    pub transcriber: Arc<Transcriber>,
}

impl AppState {
    /// Wire every adapter from configuration. All outbound traffic shares
    /// one connection pool.
    pub fn from_config(config: &Config, credentials: &Credentials) -> Result<Self, EngineError> {
        let client = build_http_client()?;

        let providers = ProviderSet::from_config(&config.llm, credentials, client.clone());

        let local: Arc<dyn MemoryStore> =
            Arc::new(LocalMemoryStore::new(&config.memory.local, client.clone()));
        let cloud = Arc::new(CloudMemoryStore::new(
            &config.memory.cloud,
            credentials.mem0.clone(),
            client.clone(),
        ));
        let cloud_store = Arc::clone(&cloud) as Arc<dyn MemoryStore>;
        let memory = DualMemory::new(local, cloud_store).with_timeouts(
            config.memory.local.timeout(),
            config.memory.cloud.timeout(),
        );

        let persona = Persona::from_file(&config.core.persona_path, &config.core.persona_name);
        let conductor = Conductor::new(providers, Arc::new(memory), Arc::new(persona));

        Ok(Self {
            conductor: Arc::new(conductor),
            cloud,
            transcriber: Arc::new(Transcriber::new(&config.transcription, client)),
        })
    }
}

/// Build the process-wide HTTP client
pub fn build_http_client() -> Result<reqwest::Client, EngineError> {
    reqwest::Client::builder()
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(concat!("relay/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| EngineError::Network(format!("Failed to create HTTP client: {}", e)))
}

/// Build the router with all endpoints
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/status", get(status_handler))
        .route("/memory/cloud/search", post(cloud_search_handler))
        .route("/memory/cloud/all", get(cloud_all_handler))
        .route(
            "/transcribe",
            post(transcribe_handler).layer(DefaultBodyLimit::max(MAX_AUDIO_BYTES)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: &str, state: AppState) -> Result<(), EngineError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| EngineError::Network(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Relay listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| EngineError::Network(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// JSON error response wrapping an [`EngineError`]
#[derive(Debug)]
pub struct ApiError(pub EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            EngineError::Upstream(_) | EngineError::Network(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({
            "error": self.0.to_string(),
            "hint": self.0.user_hint(),
        });
        (status, Json(body)).into_response()
    }
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let response = state.conductor.handle_turn(request).await?;
    Ok(Json(response))
}

async fn status_handler(State(state): State<AppState>) -> Json<StatusReport> {
    let conductor = &state.conductor;
    Json(status::collect(conductor.providers(), conductor.memory()).await)
}

#[derive(Debug, Default, Deserialize)]
struct CloudSearchRequest {
    #[serde(default)]
    query: String,
    #[serde(default)]
    limit: Option<usize>,
}

async fn cloud_search_handler(
    State(state): State<AppState>,
    Json(request): Json<CloudSearchRequest>,
) -> Json<serde_json::Value> {
    let limit = request.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    let results = state
        .cloud
        .search_raw(&request.query, limit)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Cloud memory search failed: {}", e);
            Vec::new()
        });
    Json(json!({ "results": results }))
}

async fn cloud_all_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let results = state.cloud.list_all().await.unwrap_or_else(|e| {
        tracing::warn!("Cloud memory listing failed: {}", e);
        Vec::new()
    });
    Json(json!({ "results": results }))
}

async fn transcribe_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| EngineError::InvalidInput(format!("malformed upload: {}", e)))?
    {
        if field.name() != Some("audio") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| EngineError::InvalidInput(format!("malformed upload: {}", e)))?;
        upload = Some(AudioUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let upload = upload
        .ok_or_else(|| EngineError::InvalidInput("audio file is required".to_string()))?;
    let transcript = state.transcriber.transcribe(upload).await?;
    Ok(Json(transcript))
}
