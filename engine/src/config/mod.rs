//! Configuration management
//!
//! This module handles loading, validation, and management of the Relay configuration.
//! Configuration is stored in TOML format at ~/.relay/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level, bind address, persona template
//! - **llm**: Base URL, model and timeout for each of the four backends
//! - **memory**: Local and cloud memory store endpoints and timeouts
//! - **transcription**: Audio transcription passthrough target
//!
//! API credentials are never read from or written to this file. They come
//! from the environment, see [`crate::secrets::Credentials`].
//!
//! # Examples
//!
//! ```no_run
//! use relay_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//! println!("Listening on {}", config.core.bind_addr);
//! println!("Local model: {}", config.llm.ollama.model);
//! # Ok(())
//! # }
//! ```

use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Core server settings
    #[serde(default)]
    pub core: CoreConfig,

    /// LLM backend configuration
    #[serde(default)]
    pub llm: LLMConfig,

    /// Memory store configuration
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Audio transcription passthrough
    #[serde(default)]
    pub transcription: TranscriptionConfig,
}

/// Core server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Address the HTTP server binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Persona template file (supports ~ expansion)
    #[serde(default = "default_persona_path")]
    pub persona_path: PathBuf,

    /// Speaker label used for the assistant in prompts and stored memories
    #[serde(default = "default_persona_name")]
    pub persona_name: String,
}

/// LLM backend configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Local model runtime
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Deep-reasoning backend
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Real-time web-capable backend
    #[serde(default)]
    pub grok: GrokConfig,

    /// Fast-lookup backend
    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// Ollama provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base URL for Ollama API
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_local_llm_timeout")]
    pub timeout_secs: u64,
}

/// Anthropic provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    /// Base URL for Anthropic API
    #[serde(default = "default_anthropic_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_anthropic_model")]
    pub model: String,

    /// Completion budget per request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_hosted_llm_timeout")]
    pub timeout_secs: u64,
    // Note: API key comes from ANTHROPIC_API_KEY, not from config
}

/// xAI Grok provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrokConfig {
    /// Base URL for the xAI API
    #[serde(default = "default_grok_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_grok_model")]
    pub model: String,

    /// Completion budget per request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_hosted_llm_timeout")]
    pub timeout_secs: u64,
    // Note: API key comes from XAI_API_KEY, not from config
}

/// Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Base URL for Gemini API
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_hosted_llm_timeout")]
    pub timeout_secs: u64,
    // Note: API key comes from GOOGLE_AI_API_KEY, not from config
}

/// Memory system configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Local vector memory service
    #[serde(default)]
    pub local: LocalMemoryConfig,

    /// Cloud memory service
    #[serde(default)]
    pub cloud: CloudMemoryConfig,
}

/// Local memory service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalMemoryConfig {
    /// Base URL of the local memory service
    #[serde(default = "default_local_memory_base_url")]
    pub base_url: String,

    /// Collection conversation turns are stored in
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_local_memory_timeout")]
    pub timeout_secs: u64,
}

/// Cloud memory service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudMemoryConfig {
    /// Base URL of the cloud memory API
    #[serde(default = "default_cloud_memory_base_url")]
    pub base_url: String,

    /// The single account identity every memory is scoped to
    #[serde(default = "default_cloud_user_id")]
    pub user_id: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_cloud_memory_timeout")]
    pub timeout_secs: u64,
    // Note: API key comes from MEM0_API_KEY, not from config
}

/// Transcription passthrough configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Base URL of the transcription service
    #[serde(default = "default_transcription_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_transcription_timeout")]
    pub timeout_secs: u64,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_persona_path() -> PathBuf {
    PathBuf::from("~/.relay/persona.txt")
}

fn default_persona_name() -> String {
    "Assistant".to_string()
}

fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com/v1".to_string()
}

fn default_grok_base_url() -> String {
    "https://api.x.ai/v1".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_ollama_model() -> String {
    "dolphin-llama3:8b".to_string()
}

fn default_anthropic_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_grok_model() -> String {
    "grok-beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_local_llm_timeout() -> u64 {
    120
}

fn default_hosted_llm_timeout() -> u64 {
    60
}

fn default_local_memory_base_url() -> String {
    "http://localhost:5001".to_string()
}

fn default_collection() -> String {
    "conversations".to_string()
}

fn default_local_memory_timeout() -> u64 {
    5
}

fn default_cloud_memory_base_url() -> String {
    "https://api.mem0.ai/v1".to_string()
}

fn default_cloud_user_id() -> String {
    "default".to_string()
}

fn default_cloud_memory_timeout() -> u64 {
    30
}

fn default_transcription_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_transcription_timeout() -> u64 {
    120
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            bind_addr: default_bind_addr(),
            persona_path: default_persona_path(),
            persona_name: default_persona_name(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_base_url(),
            model: default_ollama_model(),
            timeout_secs: default_local_llm_timeout(),
        }
    }
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            base_url: default_anthropic_base_url(),
            model: default_anthropic_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_hosted_llm_timeout(),
        }
    }
}

impl Default for GrokConfig {
    fn default() -> Self {
        Self {
            base_url: default_grok_base_url(),
            model: default_grok_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_hosted_llm_timeout(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
            model: default_gemini_model(),
            timeout_secs: default_hosted_llm_timeout(),
        }
    }
}

impl Default for LocalMemoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_local_memory_base_url(),
            collection: default_collection(),
            timeout_secs: default_local_memory_timeout(),
        }
    }
}

impl Default for CloudMemoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_cloud_memory_base_url(),
            user_id: default_cloud_user_id(),
            timeout_secs: default_cloud_memory_timeout(),
        }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            base_url: default_transcription_base_url(),
            timeout_secs: default_transcription_timeout(),
        }
    }
}

impl LocalMemoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl CloudMemoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from the default location (~/.relay/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails (invalid log level, malformed URLs)
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        let mut config: Config = toml::from_str(contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let config = Self::default();

        // Serialize before processing so `~` survives in the written file
        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        let mut config = config;
        config.validate_and_process()?;
        Ok(config)
    }

    /// Get the default configuration file path (~/.relay/config.toml)
    fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".relay").join("config.toml"))
    }

    /// Validate and process configuration
    ///
    /// Checks the log level and every service URL, and expands `~` in the
    /// persona path. The persona file itself is optional and is only read
    /// on first use.
    fn validate_and_process(&mut self) -> Result<(), EngineError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        if self.core.persona_name.trim().is_empty() {
            return Err(EngineError::Config(
                "persona_name must not be empty".to_string(),
            ));
        }

        let urls = [
            ("llm.ollama.base_url", &self.llm.ollama.base_url),
            ("llm.anthropic.base_url", &self.llm.anthropic.base_url),
            ("llm.grok.base_url", &self.llm.grok.base_url),
            ("llm.gemini.base_url", &self.llm.gemini.base_url),
            ("memory.local.base_url", &self.memory.local.base_url),
            ("memory.cloud.base_url", &self.memory.cloud.base_url),
            ("transcription.base_url", &self.transcription.base_url),
        ];
        for (field, url) in urls {
            validate_url(field, url)?;
        }

        self.core.persona_path = expand_path(&self.core.persona_path)?;

        Ok(())
    }
}

/// Reject anything that is not an absolute http(s) URL.
fn validate_url(field: &str, url: &str) -> Result<(), EngineError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(EngineError::Config(format!(
            "{} must be an http:// or https:// URL, got '{}'",
            field, url
        )))
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}
