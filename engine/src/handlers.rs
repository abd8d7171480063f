//! Command handlers
//!
//! One handler per CLI command. Handlers own their output: plain text for
//! people, or pretty JSON when `--json` is given.

use anyhow::Result;
use serde_json::json;

use crate::config::Config;
use crate::llm::router;
use crate::secrets::Credentials;
use crate::server::{self, AppState};
use crate::status;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Run the HTTP server until interrupted
pub async fn handle_serve(config: &Config, bind: Option<String>) -> Result<()> {
    let credentials = Credentials::from_env();
    log_banner(&credentials);

    let state = AppState::from_config(config, &credentials)?;
    let addr = bind.unwrap_or_else(|| config.core.bind_addr.clone());
    server::serve(&addr, state).await?;
    Ok(())
}

/// Print the reachability of every backend
pub async fn handle_status(config: &Config, format: OutputFormat) -> Result<()> {
    let credentials = Credentials::from_env();
    let state = AppState::from_config(config, &credentials)?;
    let conductor = &state.conductor;
    let report = status::collect(conductor.providers(), conductor.memory()).await;

    match format {
        OutputFormat::Text => {
            let rows = [
                ("Ollama", report.local_ollama),
                ("Local memory", report.local_memory),
                ("Claude API", report.claude_api),
                ("Grok API", report.grok_api),
                ("Gemini API", report.gemini_api),
                ("Mem0 API", report.mem0_api),
            ];
            println!("Backends:");
            for (label, ok) in rows {
                println!(
                    "  {:<14}{}",
                    format!("{}:", label),
                    if ok { "available" } else { "unavailable" }
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

/// Print the routing decision for a message without calling any backend
pub fn handle_route(message: &str, provider: Option<&str>, format: OutputFormat) -> Result<()> {
    let decision = router::decide(message, provider);

    match format {
        OutputFormat::Text => {
            println!("Provider: {}", decision.provider);
            println!("Tier:     {}", decision.tier.as_u8());
            println!("Reason:   {}", decision.reason);
        }
        OutputFormat::Json => {
            let output = json!({ "message": message, "routing": decision });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn log_banner(credentials: &Credentials) {
    for (label, configured) in credentials.summary() {
        tracing::info!(
            "{:<12} {}",
            label,
            if configured { "configured" } else { "not configured" }
        );
    }
}
