use super::{LLMError, LLMProvider, Result};
use crate::config::AnthropicConfig;
use crate::secrets::{SecretString, ANTHROPIC_API_KEY};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

const BACKEND: &str = "Claude";

/// Deep-reasoning backend over the Anthropic Messages API.
pub struct AnthropicProvider {
    config: AnthropicConfig,
    api_key: Option<SecretString>,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(
        config: AnthropicConfig,
        api_key: Option<SecretString>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            config,
            api_key,
            client,
        }
    }
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn check_health(&self) -> bool {
        self.api_key.is_some()
    }

    async fn invoke(&self, prompt: &str, system_prompt: Option<&str>) -> Result<String> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| LLMError::not_configured(ANTHROPIC_API_KEY))?;

        let url = format!("{}/messages", self.config.base_url.trim_end_matches('/'));

        let mut payload = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [{"role": "user", "content": prompt}],
        });
        if let Some(system) = system_prompt.filter(|s| !s.is_empty()) {
            payload["system"] = json!(system);
        }

        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .header("x-api-key", api_key.unsecure())
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| LLMError::from_transport(BACKEND, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(LLMError::from_status(BACKEND, status, text));
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(format!("{} returned invalid JSON: {}", BACKEND, e)))?;

        data.get("content")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .and_then(|item| item.get("text"))
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or_else(|| LLMError::unexpected_shape(BACKEND, &data))
    }
}
