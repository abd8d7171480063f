//! Configuration loading from disk

use relay_engine::config::Config;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_partial_file_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[core]
log_level = "debug"
persona_name = "Relay"

[llm.ollama]
model = "llama3.1:8b"

[memory.cloud]
user_id = "alice"
"#,
    )
    .unwrap();

    let config = Config::load_from_path(&path).unwrap();
    assert_eq!(config.core.log_level, "debug");
    assert_eq!(config.core.persona_name, "Relay");
    assert_eq!(config.core.bind_addr, "0.0.0.0:8000");
    assert_eq!(config.llm.ollama.model, "llama3.1:8b");
    assert_eq!(config.llm.anthropic.model, "claude-sonnet-4-20250514");
    assert_eq!(config.memory.cloud.user_id, "alice");
    assert_eq!(config.memory.local.timeout_secs, 5);
}

#[test]
fn test_persona_path_is_expanded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[core]\npersona_path = \"~/persona.txt\"\n").unwrap();

    let config = Config::load_from_path(&path).unwrap();
    assert!(!config.core.persona_path.starts_with("~"));
    assert!(config.core.persona_path.ends_with("persona.txt"));
}

#[test]
fn test_invalid_url_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[memory.local]\nbase_url = \"localhost:5001\"\n").unwrap();

    let err = Config::load_from_path(&path).unwrap_err();
    assert!(err.to_string().contains("memory.local.base_url"));
}

#[test]
fn test_missing_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let err = Config::load_from_path(&dir.path().join("nope.toml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_default_config_survives_toml_round_trip() {
    let text = toml::to_string_pretty(&Config::default()).unwrap();
    let config = Config::from_toml_str(&text).unwrap();
    assert_eq!(config.llm.grok.base_url, "https://api.x.ai/v1");
    assert_eq!(config.transcription.base_url, "http://localhost:5000");
}
