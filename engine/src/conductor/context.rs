//! Context Assembler
//!
//! Packs the persona template, recalled memory snippets and the user
//! message into the text a backend receives. Each store contributes at most
//! [`SNIPPETS_PER_STORE`] snippets, each cut to [`SNIPPET_CHARS`] characters,
//! which bounds the prompt regardless of what the stores return.

use crate::memory::MemoryContext;

/// Snippets taken from each store
pub const SNIPPETS_PER_STORE: usize = 2;

/// Characters kept from each snippet
pub const SNIPPET_CHARS: usize = 200;

const CONTEXT_HEADER: &str = "\n\nRelevant context from memory:\n";

/// The two equivalent renderings of one turn's prompt.
///
/// Backends with a system channel get `system` plus the bare message;
/// the rest get `inline`. Both carry the same persona, context and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    /// Persona followed by the context block
    pub system: String,

    /// `system`, then the message framed as a dialogue turn
    pub inline: String,
}

pub struct ContextAssembler<'a> {
    persona: &'a str,
    speaker: &'a str,
}

impl<'a> ContextAssembler<'a> {
    pub fn new(persona: &'a str, speaker: &'a str) -> Self {
        Self { persona, speaker }
    }

    /// Assemble the prompt for `message`.
    pub fn assemble(&self, memory: &MemoryContext, message: &str) -> AssembledPrompt {
        let mut system = String::with_capacity(self.persona.len() + 512);
        system.push_str(self.persona);
        system.push_str(&context_block(memory));

        let inline = format!("{}\n\nUser: {}\n{}:", system, message, self.speaker);
        AssembledPrompt { system, inline }
    }
}

/// Render the memory block, or an empty string when there is nothing to show.
pub fn context_block(memory: &MemoryContext) -> String {
    if memory.is_empty() {
        return String::new();
    }

    let snippets = memory
        .local
        .iter()
        .take(SNIPPETS_PER_STORE)
        .chain(memory.cloud.iter().take(SNIPPETS_PER_STORE));

    let mut block = String::from(CONTEXT_HEADER);
    for snippet in snippets {
        block.push_str("- ");
        block.push_str(truncate_chars(snippet, SNIPPET_CHARS));
        block.push_str("...\n");
    }
    block
}

/// First `max` characters of `s`, never splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
