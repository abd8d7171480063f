use super::{LLMError, LLMProvider, Result};
use crate::config::GeminiConfig;
use crate::secrets::{SecretString, GOOGLE_AI_API_KEY};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

const BACKEND: &str = "Gemini";

/// Fast-lookup backend over the Gemini `generateContent` API.
///
/// The conductor sends Gemini the fully inlined prompt. A system prompt is
/// still honoured through `systemInstruction` when one is given.
pub struct GeminiProvider {
    config: GeminiConfig,
    api_key: Option<SecretString>,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(
        config: GeminiConfig,
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
impl LLMProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn check_health(&self) -> bool {
        self.api_key.is_some()
    }

    async fn invoke(&self, prompt: &str, system_prompt: Option<&str>) -> Result<String> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| LLMError::not_configured(GOOGLE_AI_API_KEY))?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
        );

        let mut payload = serde_json::Map::new();
        payload.insert(
            "contents".to_string(),
            json!([{"parts": [{"text": prompt}]}]),
        );
        if let Some(system) = system_prompt.filter(|s| !s.is_empty()) {
            payload.insert(
                "systemInstruction".to_string(),
                json!({"parts": [{"text": system}]}),
            );
        }

        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .query(&[("key", api_key.unsecure())])
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| LLMError::from_transport(BACKEND, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(LLMError::from_status(BACKEND, status, api_key.redact(&text)));
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(format!("{} returned invalid JSON: {}", BACKEND, e)))?;

        data.get("candidates")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(|parts| parts.as_array())
            .and_then(|parts| parts.first())
            .and_then(|part| part.get("text"))
            .and_then(|text| text.as_str())
            .map(str::to_string)
            .ok_or_else(|| LLMError::unexpected_shape(BACKEND, &data))
    }
}
