//! Wire types shared between the engine and its callers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One of the four backends a chat turn can be routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Local model runtime (Ollama)
    Local,

    /// Deep-reasoning hosted API
    Claude,

    /// Real-time, web-capable hosted API
    Grok,

    /// Fast-lookup hosted API
    Gemini,
}

impl ProviderKind {
    /// Every provider, in a stable order
    pub const ALL: [ProviderKind; 4] = [Self::Local, Self::Claude, Self::Grok, Self::Gemini];

    /// Directive name as accepted on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Claude => "claude",
            Self::Grok => "grok",
            Self::Gemini => "gemini",
        }
    }

    /// Whether the backend takes the persona and memory context through a
    /// separate system-prompt channel instead of inline in the prompt.
    pub fn has_system_channel(&self) -> bool {
        matches!(self, Self::Claude | Self::Grok)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    /// Exact, case-sensitive match against the directive names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown provider '{}'", s))
    }
}

/// Routing origin: inferred from the message, or explicitly requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Tier 1: keyword match or default
    Inferred,

    /// Tier 2: explicit caller directive
    Explicit,
}

impl Tier {
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Inferred => 1,
            Self::Explicit => 2,
        }
    }
}

impl Serialize for Tier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for Tier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            1 => Ok(Self::Inferred),
            2 => Ok(Self::Explicit),
            other => Err(serde::de::Error::custom(format!(
                "tier must be 1 or 2, got {}",
                other
            ))),
        }
    }
}

/// Where a turn goes, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub provider: ProviderKind,
    pub tier: Tier,
    pub reason: String,
}

impl RoutingDecision {
    pub fn new(provider: ProviderKind, tier: Tier, reason: impl Into<String>) -> Self {
        Self {
            provider,
            tier,
            reason: reason.into(),
        }
    }
}

/// Inbound chat turn
///
/// `message` is optional at the type level so that a missing field is
/// reported as a client input error by the engine rather than as a
/// deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,

    /// Explicit provider directive ("claude", "grok", "gemini", "local")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            provider: None,
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }
}

/// Outbound chat turn result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub routing: RoutingDecision,
}

/// Reachability of every backend. Local services are probed; hosted
/// services report whether a credential is configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub local_ollama: bool,
    pub local_memory: bool,
    pub claude_api: bool,
    pub grok_api: bool,
    pub gemini_api: bool,
    pub mem0_api: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_kind_parsing_is_exact() {
        assert_eq!("claude".parse::<ProviderKind>(), Ok(ProviderKind::Claude));
        assert_eq!("local".parse::<ProviderKind>(), Ok(ProviderKind::Local));
        assert!("Claude".parse::<ProviderKind>().is_err());
        assert!("gpt".parse::<ProviderKind>().is_err());
        assert!("".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_system_channel_shape() {
        assert!(ProviderKind::Claude.has_system_channel());
        assert!(ProviderKind::Grok.has_system_channel());
        assert!(!ProviderKind::Local.has_system_channel());
        assert!(!ProviderKind::Gemini.has_system_channel());
    }

    #[test]
    fn test_routing_decision_wire_format() {
        let decision = RoutingDecision::new(ProviderKind::Grok, Tier::Inferred, "research");
        let value = serde_json::to_value(&decision).unwrap();
        assert_eq!(
            value,
            json!({"provider": "grok", "tier": 1, "reason": "research"})
        );
    }

    #[test]
    fn test_tier_rejects_out_of_range() {
        let result: Result<Tier, _> = serde_json::from_value(json!(3));
        assert!(result.is_err());
        let tier: Tier = serde_json::from_value(json!(2)).unwrap();
        assert_eq!(tier, Tier::Explicit);
    }

    #[test]
    fn test_chat_request_missing_message_deserializes() {
        let req: ChatRequest = serde_json::from_value(json!({"provider": "grok"})).unwrap();
        assert!(req.message.is_none());
        assert_eq!(req.provider.as_deref(), Some("grok"));
    }

    proptest::proptest! {
        // Only the four lowercase names parse
        #[test]
        fn test_provider_kind_parse_accepts_only_known_names(name in "\\PC{0,12}") {
            let known = ProviderKind::ALL.iter().any(|k| k.as_str() == name);
            proptest::prop_assert_eq!(name.parse::<ProviderKind>().is_ok(), known);
        }
    }
}
