//! Relay SDK
//!
//! Shared types and errors for Relay components.
//! This crate is used by the engine and by anything that talks to its HTTP surface.

/// Error types and handling
pub mod errors;

/// Wire types for chat turns, routing and status
pub mod types;

// Re-export commonly used types
pub use errors::{EngineError, RelayErrorExt};
pub use types::{ChatRequest, ChatResponse, ProviderKind, RoutingDecision, StatusReport, Tier};
