//! Ollama LLM Provider
//!
//! Implements the LLMProvider trait for Ollama, the local model runtime,
//! typically at http://localhost:11434.
//!
//! Key features:
//! - Local execution (no API key required)
//! - Single-shot `/api/generate` with streaming disabled
//! - Health probe through `/api/tags`

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{LLMError, LLMProvider, Result};
use crate::config::OllamaConfig;

const BACKEND: &str = "Ollama";

/// Ollama provider
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    /// Base URL for Ollama API (typically http://localhost:11434)
    base_url: String,

    /// Model name to use (e.g., "dolphin-llama3:8b")
    model: String,

    /// Per-request timeout
    timeout: Duration,

    /// HTTP client for API requests
    client: Client,
}

impl OllamaProvider {
    /// Create a new Ollama provider with its own client
    ///
    /// # Arguments
    /// * `base_url` - Base URL for Ollama API (e.g., "http://localhost:11434")
    /// * `model` - Model name to use (e.g., "dolphin-llama3:8b")
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_client(
            OllamaConfig {
                base_url: base_url.into(),
                model: model.into(),
                ..OllamaConfig::default()
            },
            Client::new(),
        )
    }

    /// Create a provider that shares an existing connection pool
    pub fn with_client(config: OllamaConfig, client: Client) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model,
            timeout: Duration::from_secs(config.timeout_secs),
            client,
        }
    }
}

#[async_trait]
impl LLMProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn check_health(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(2))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Ollama health probe failed: {}", e);
                false
            }
        }
    }

    async fn invoke(&self, prompt: &str, system_prompt: Option<&str>) -> Result<String> {
        tracing::debug!(
            "Ollama request: model={}, prompt_chars={}",
            self.model,
            prompt.len()
        );

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            system: system_prompt.filter(|s| !s.is_empty()),
            stream: false,
        };

        let url = format!("{}/api/generate", self.base_url);
        let start = std::time::Instant::now();
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| LLMError::from_transport(BACKEND, e))?;

        tracing::info!(
            "Ollama response received in {:.1}s",
            start.elapsed().as_secs_f64()
        );

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LLMError::from_status(BACKEND, status, error_text));
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(format!("Failed to parse Ollama response: {}", e)))?;

        match serde_json::from_value::<GenerateResponse>(data.clone()) {
            Ok(parsed) => Ok(parsed.response),
            Err(_) => Err(LLMError::unexpected_shape(BACKEND, &data)),
        }
    }
}

/// Ollama generate request format
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
}

/// Ollama generate response format
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_provider_properties() {
        let provider = OllamaProvider::new("http://localhost:11434/", "dolphin-llama3:8b");

        assert_eq!(provider.name(), "ollama");
        assert_eq!(provider.base_url, "http://localhost:11434");
        assert_eq!(provider.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_generate_request_omits_empty_system() {
        let request = GenerateRequest {
            model: "m",
            prompt: "hi",
            system: None,
            stream: false,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"model": "m", "prompt": "hi", "stream": false})
        );
    }
}
