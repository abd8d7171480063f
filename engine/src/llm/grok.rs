use super::{LLMError, LLMProvider, Result};
use crate::config::GrokConfig;
use crate::secrets::{SecretString, XAI_API_KEY};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

const BACKEND: &str = "Grok";

/// Real-time, web-capable backend over the xAI chat completions API.
///
/// The request shape is OpenAI-compatible: an optional system message
/// followed by the user message.
pub struct GrokProvider {
    config: GrokConfig,
    api_key: Option<SecretString>,
    client: reqwest::Client,
}

impl GrokProvider {
    pub fn new(config: GrokConfig, api_key: Option<SecretString>, client: reqwest::Client) -> Self {
        Self {
            config,
            api_key,
            client,
        }
    }
}

#[async_trait]
impl LLMProvider for GrokProvider {
    fn name(&self) -> &str {
        "grok"
    }

    async fn check_health(&self) -> bool {
        self.api_key.is_some()
    }

    async fn invoke(&self, prompt: &str, system_prompt: Option<&str>) -> Result<String> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| LLMError::not_configured(XAI_API_KEY))?;

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let mut api_messages = Vec::with_capacity(2);
        if let Some(system) = system_prompt.filter(|s| !s.is_empty()) {
            api_messages.push(json!({"role": "system", "content": system}));
        }
        api_messages.push(json!({"role": "user", "content": prompt}));

        let payload = json!({
            "model": self.config.model,
            "messages": api_messages,
            "max_tokens": self.config.max_tokens,
        });

        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .bearer_auth(api_key.unsecure())
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

        data.get("choices")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .map(str::to_string)
            .ok_or_else(|| LLMError::unexpected_shape(BACKEND, &data))
    }
}
