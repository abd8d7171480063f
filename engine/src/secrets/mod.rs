//! API credentials
//!
//! Every hosted backend is optional. A credential that is absent (or set to
//! an empty string) disables its adapter: calls short-circuit with a labeled
//! error or an empty result and never reach the network.

pub mod string;

pub use string::SecretString;

/// Environment variable holding the deep-reasoning backend key
pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";

/// Environment variable holding the real-time backend key
pub const XAI_API_KEY: &str = "XAI_API_KEY";

/// Environment variable holding the fast-lookup backend key
pub const GOOGLE_AI_API_KEY: &str = "GOOGLE_AI_API_KEY";

/// Environment variable holding the cloud memory key
pub const MEM0_API_KEY: &str = "MEM0_API_KEY";

/// The set of credentials Relay knows about.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub anthropic: Option<SecretString>,
    pub xai: Option<SecretString>,
    pub google: Option<SecretString>,
    pub mem0: Option<SecretString>,
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).and_then(SecretString::non_empty);
        Self {
            anthropic: get(ANTHROPIC_API_KEY),
            xai: get(XAI_API_KEY),
            google: get(GOOGLE_AI_API_KEY),
            mem0: get(MEM0_API_KEY),
        }
    }

    /// (label, configured) pairs for the startup banner.
    pub fn summary(&self) -> [(&'static str, bool); 4] {
        [
            ("Claude API", self.anthropic.is_some()),
            ("Grok API", self.xai.is_some()),
            ("Gemini API", self.google.is_some()),
            ("Mem0 API", self.mem0.is_some()),
        ]
    }
}
