//! Persona template
//!
//! The template is read from disk on first use and kept for the life of the
//! process. Readers after the first never lock or touch the filesystem.

use std::path::PathBuf;
use std::sync::OnceLock;

/// Used when the template file is missing or unreadable
pub const DEFAULT_PERSONA: &str = "You are a helpful AI assistant.";

pub struct Persona {
    path: Option<PathBuf>,
    name: String,
    text: OnceLock<String>,
}

impl Persona {
    /// A persona loaded lazily from `path`.
    pub fn from_file(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            name: name.into(),
            text: OnceLock::new(),
        }
    }

    /// A persona with fixed text.
    pub fn from_text(text: impl Into<String>, name: impl Into<String>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(text.into());
        Self {
            path: None,
            name: name.into(),
            text: cell,
        }
    }

    /// Speaker label for the assistant
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The template text, loading it on first call.
    pub fn text(&self) -> &str {
        self.text.get_or_init(|| self.load())
    }

    fn load(&self) -> String {
        let Some(path) = self.path.as_ref() else {
            return DEFAULT_PERSONA.to_string();
        };
        match std::fs::read_to_string(path) {
            Ok(text) => {
                tracing::info!("Loaded persona template from {:?}", path);
                text
            }
            Err(e) => {
                tracing::warn!(
                    "Persona template {:?} not readable ({}), using default",
                    path,
                    e
                );
                DEFAULT_PERSONA.to_string()
            }
        }
    }
}
