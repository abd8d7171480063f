//! Conductor System
//!
//! Runs one chat turn end to end:
//!
//! ```text
//! RECEIVED -> CONTEXT_FETCHED -> ROUTED -> PROMPT_BUILT -> INVOKED -> RESPONDED
//!                                                                      \-> PERSISTED (background)
//! ```
//!
//! Only a missing message aborts a turn. Memory failures shrink the context,
//! provider failures become the answer text, and write-back failures are
//! logged by a detached task the caller never waits for.

pub mod context;
pub mod persona;

pub use context::{AssembledPrompt, ContextAssembler};
pub use persona::Persona;

use sdk::{ChatRequest, ChatResponse, EngineError, ProviderKind};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::llm::{router, ProviderSet};
use crate::memory::{DualMemory, MemoryRecord};

/// Snippets requested from each store per turn
pub const RECALL_LIMIT: usize = 3;

/// A finished turn, as handed to the write-back task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub user_message: String,
    pub response_text: String,
    pub provider_used: ProviderKind,
}

pub struct Conductor {
    providers: ProviderSet,
    memory: Arc<DualMemory>,
    persona: Arc<Persona>,
}

impl Conductor {
    pub fn new(providers: ProviderSet, memory: Arc<DualMemory>, persona: Arc<Persona>) -> Self {
        Self {
            providers,
            memory,
            persona,
        }
    }

    pub fn providers(&self) -> &ProviderSet {
        &self.providers
    }

    pub fn memory(&self) -> &DualMemory {
        &self.memory
    }

    /// Run one turn and return as soon as the answer is known.
    pub async fn handle_turn(&self, request: ChatRequest) -> Result<ChatResponse, EngineError> {
        let (response, _write_back) = self.handle_turn_tracked(request).await?;
        Ok(response)
    }

    /// Like [`Conductor::handle_turn`], but also hands back the write-back
    /// task so the caller may observe it. Dropping the handle does not
    /// cancel the task.
    pub async fn handle_turn_tracked(
        &self,
        request: ChatRequest,
    ) -> Result<(ChatResponse, JoinHandle<()>), EngineError> {
        let message = request
            .message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| EngineError::InvalidInput("message is required".to_string()))?;

        let memory = self.memory.recall(message, RECALL_LIMIT).await;
        tracing::debug!(
            "Recalled {} local and {} cloud snippets",
            memory.local.len(),
            memory.cloud.len()
        );

        let routing = router::decide(message, request.provider.as_deref());
        tracing::info!(
            "Routing to {} (tier {}): {}",
            routing.provider,
            routing.tier.as_u8(),
            routing.reason
        );

        let prompt =
            ContextAssembler::new(self.persona.text(), self.persona.name()).assemble(&memory, message);

        let response_text = self.invoke(routing.provider, message, &prompt).await;

        let turn = ChatTurn {
            user_message: message.to_string(),
            response_text: response_text.clone(),
            provider_used: routing.provider,
        };
        let write_back = self.spawn_write_back(turn);

        Ok((
            ChatResponse {
                response: response_text,
                routing,
            },
            write_back,
        ))
    }

    /// Call the selected backend. Failures come back as the answer text.
    async fn invoke(&self, kind: ProviderKind, message: &str, prompt: &AssembledPrompt) -> String {
        let provider = self.providers.get(kind);
        let result = if kind.has_system_channel() {
            provider.invoke(message, Some(&prompt.system)).await
        } else {
            provider.invoke(&prompt.inline, None).await
        };

        match result {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Provider {} failed: {}", provider.name(), e);
                format!("Error: {}", e)
            }
        }
    }

    /// Persist `turn` to both stores on a detached task.
    fn spawn_write_back(&self, turn: ChatTurn) -> JoinHandle<()> {
        let memory = Arc::clone(&self.memory);
        let speaker = self.persona.name().to_string();

        tokio::spawn(async move {
            let record = MemoryRecord::for_turn(
                &turn.user_message,
                &turn.response_text,
                &speaker,
                turn.provider_used.as_str(),
            );
            memory.persist(record).await;
        })
    }
}
