//! Backend reachability report
//!
//! Local services are probed over HTTP with a short timeout; hosted
//! services report whether their credential is configured. Nothing is
//! written anywhere.

use sdk::{ProviderKind, StatusReport};

use crate::llm::ProviderSet;
use crate::memory::DualMemory;

/// Probe every backend concurrently.
pub async fn collect(providers: &ProviderSet, memory: &DualMemory) -> StatusReport {
    let (provider_health, (local_memory, cloud_memory)) =
        tokio::join!(providers.check_health(), memory.check_health());

    let mut report = StatusReport {
        local_memory,
        mem0_api: cloud_memory,
        ..StatusReport::default()
    };
    for (kind, healthy) in provider_health {
        match kind {
            ProviderKind::Local => report.local_ollama = healthy,
            ProviderKind::Claude => report.claude_api = healthy,
            ProviderKind::Grok => report.grok_api = healthy,
            ProviderKind::Gemini => report.gemini_api = healthy,
        }
    }
    report
}
