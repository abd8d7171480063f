//! LLM Provider Abstraction Layer
//!
//! This module provides a common interface for the four chat backends
//! (local Ollama, Anthropic, xAI Grok, Google Gemini). Every backend has its
//! own request and response shape but honours the same `invoke` contract and
//! the same error type, so the conductor never has to know which one it is
//! talking to.
//!
//! Dispatch is closed: [`ProviderSet`] holds exactly one handler per
//! [`ProviderKind`] and selects it with an exhaustive `match`.

use async_trait::async_trait;
use sdk::ProviderKind;
use std::sync::Arc;

use crate::config::LLMConfig;
use crate::secrets::Credentials;

pub mod anthropic;
pub mod gemini;
pub mod grok;
pub mod ollama;
pub mod router;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
///
/// The `Display` text is what a caller sees as the answer when a provider
/// call fails, so every message names the backend it came from.
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl LLMError {
    /// Map a transport-level failure from `reqwest`.
    pub(crate) fn from_transport(backend: &str, err: reqwest::Error) -> Self {
        // The URL may carry a key in its query string
        let err = err.without_url();
        if err.is_timeout() {
            LLMError::Timeout(format!("{} did not respond in time", backend))
        } else if err.is_connect() {
            LLMError::ProviderUnavailable(format!("Cannot connect to {}: {}", backend, err))
        } else {
            LLMError::NetworkError(format!("{} request failed: {}", backend, err))
        }
    }

    /// Map a non-2xx status to the matching error variant.
    pub(crate) fn from_status(backend: &str, status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => LLMError::AuthenticationFailed(format!("{} ({}): {}", backend, status, body)),
            429 => LLMError::RateLimitExceeded(backend.to_string()),
            400 | 404 | 422 => {
                LLMError::InvalidRequest(format!("{} ({}): {}", backend, status, body))
            }
            _ => LLMError::ProviderUnavailable(format!(
                "{} API error ({}): {}",
                backend, status, body
            )),
        }
    }

    /// The backend answered 2xx but the payload is not what we expected.
    pub(crate) fn unexpected_shape(backend: &str, payload: &serde_json::Value) -> Self {
        LLMError::ParseError(format!("Unexpected {} response: {}", backend, payload))
    }

    /// The adapter has no credential, so nothing was sent.
    pub(crate) fn not_configured(env_var: &str) -> Self {
        LLMError::ProviderUnavailable(format!("{} not configured", env_var))
    }
}

/// LLM Provider trait that all backends implement
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Returns the name of the backend (e.g., "ollama", "anthropic")
    fn name(&self) -> &str;

    /// Send one prompt and return the answer text.
    ///
    /// # Arguments
    /// * `prompt` - The user-facing prompt
    /// * `system_prompt` - Persona and context, for backends that take them separately
    async fn invoke(&self, prompt: &str, system_prompt: Option<&str>) -> Result<String>;

    /// Check if the backend is currently reachable (or, for hosted APIs,
    /// whether it is configured). Default implementation returns true.
    async fn check_health(&self) -> bool {
        true
    }
}

/// One handler per provider kind.
#[derive(Clone)]
pub struct ProviderSet {
    local: Arc<dyn LLMProvider>,
    claude: Arc<dyn LLMProvider>,
    grok: Arc<dyn LLMProvider>,
    gemini: Arc<dyn LLMProvider>,
}

impl ProviderSet {
    pub fn new(
        local: Arc<dyn LLMProvider>,
        claude: Arc<dyn LLMProvider>,
        grok: Arc<dyn LLMProvider>,
        gemini: Arc<dyn LLMProvider>,
    ) -> Self {
        Self {
            local,
            claude,
            grok,
            gemini,
        }
    }

    /// Build the real adapters, all sharing one connection pool.
    pub fn from_config(
        config: &LLMConfig,
        credentials: &Credentials,
        client: reqwest::Client,
    ) -> Self {
        Self::new(
            Arc::new(ollama::OllamaProvider::with_client(
                config.ollama.clone(),
                client.clone(),
            )),
            Arc::new(anthropic::AnthropicProvider::new(
                config.anthropic.clone(),
                credentials.anthropic.clone(),
                client.clone(),
            )),
            Arc::new(grok::GrokProvider::new(
                config.grok.clone(),
                credentials.xai.clone(),
                client.clone(),
            )),
            Arc::new(gemini::GeminiProvider::new(
                config.gemini.clone(),
                credentials.google.clone(),
                client,
            )),
        )
    }

    /// Select the handler for `kind`.
    pub fn get(&self, kind: ProviderKind) -> &dyn LLMProvider {
        match kind {
            ProviderKind::Local => self.local.as_ref(),
            ProviderKind::Claude => self.claude.as_ref(),
            ProviderKind::Grok => self.grok.as_ref(),
            ProviderKind::Gemini => self.gemini.as_ref(),
        }
    }

    /// Check the health of every handler concurrently.
    pub async fn check_health(&self) -> [(ProviderKind, bool); 4] {
        let (local, claude, grok, gemini) = tokio::join!(
            self.local.check_health(),
            self.claude.check_health(),
            self.grok.check_health(),
            self.gemini.check_health(),
        );
        [
            (ProviderKind::Local, local),
            (ProviderKind::Claude, claude),
            (ProviderKind::Grok, grok),
            (ProviderKind::Gemini, gemini),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    #[async_trait]
    impl LLMProvider for Named {
        fn name(&self) -> &str {
            self.0
        }

        async fn invoke(&self, _prompt: &str, _system_prompt: Option<&str>) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn set() -> ProviderSet {
        ProviderSet::new(
            Arc::new(Named("local")),
            Arc::new(Named("claude")),
            Arc::new(Named("grok")),
            Arc::new(Named("gemini")),
        )
    }

    #[test]
    fn test_dispatch_selects_matching_handler() {
        let providers = set();
        for kind in ProviderKind::ALL {
            assert_eq!(providers.get(kind).name(), kind.as_str());
        }
    }

    #[tokio::test]
    async fn test_check_health_covers_all_kinds() {
        let health = set().check_health().await;
        assert_eq!(health.len(), 4);
        assert!(health.iter().all(|(_, ok)| *ok));
    }

    #[test]
    fn test_status_mapping() {
        let err = LLMError::from_status("Claude", reqwest::StatusCode::UNAUTHORIZED, "no".into());
        assert!(matches!(err, LLMError::AuthenticationFailed(_)));

        let err = LLMError::from_status("Grok", reqwest::StatusCode::TOO_MANY_REQUESTS, "".into());
        assert_eq!(err.to_string(), "Rate limit exceeded: Grok");

        let err = LLMError::from_status(
            "Gemini",
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            "boom".into(),
        );
        assert!(err.to_string().contains("Gemini API error (500 Internal Server Error): boom"));
    }

    #[test]
    fn test_unexpected_shape_names_backend_and_payload() {
        let payload = serde_json::json!({"oops": true});
        let err = LLMError::unexpected_shape("Claude", &payload);
        assert_eq!(
            err.to_string(),
            r#"Parse error: Unexpected Claude response: {"oops":true}"#
        );
    }
}
