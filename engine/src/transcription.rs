//! Audio transcription passthrough
//!
//! Forwards an uploaded audio file unchanged to the transcription service
//! and hands its JSON answer back.

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use sdk::EngineError;
use std::time::Duration;

use crate::config::TranscriptionConfig;

/// An uploaded audio file
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

pub struct Transcriber {
    base_url: String,
    timeout: Duration,
    client: Client,
}

impl Transcriber {
    pub fn new(config: &TranscriptionConfig, client: Client) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
            client,
        }
    }

    pub async fn transcribe(&self, audio: AudioUpload) -> Result<serde_json::Value, EngineError> {
        let mut part = Part::bytes(audio.bytes)
            .file_name(audio.file_name.unwrap_or_else(|| "audio".to_string()));
        if let Some(content_type) = audio.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|e| EngineError::InvalidInput(format!("bad content type: {}", e)))?;
        }
        let form = Form::new().part("audio", part);

        let response = self
            .client
            .post(format!("{}/transcribe", self.base_url))
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| EngineError::Network(format!("transcription service: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Upstream(format!(
                "transcription service ({}): {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| EngineError::Upstream(format!("transcription service sent invalid JSON: {}", e)))
    }
}
