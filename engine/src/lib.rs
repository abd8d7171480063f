//! Relay Engine Library
//!
//! Routes chat turns to one of four LLM backends, enriches them with
//! context from a local and a cloud memory store, and writes every
//! exchange back to both stores in the background.
//! It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// API credentials
pub mod secrets;

/// LLM provider abstraction layer and routing
pub mod llm;

/// Dual-tier memory stores
pub mod memory;

/// Chat turn orchestration
pub mod conductor;

/// Audio transcription passthrough
pub mod transcription;

/// Backend reachability report
pub mod status;

/// HTTP surface
pub mod server;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
