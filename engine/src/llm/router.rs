//! LLM Router
//!
//! Decides which backend answers a message. The decision is a pure function
//! of the message text and an optional explicit directive: no I/O, no state,
//! same input, same output.
//!
//! Order of evaluation:
//! 1. A recognised explicit directive wins outright (tier 2).
//! 2. Otherwise the lowercased message is checked against three keyword
//!    classes in priority order: research, complex reasoning, document
//!    lookup. The first class with any substring hit wins (tier 1).
//! 3. Otherwise the local model answers (tier 1).
//!
//! An unrecognised directive does not fall through to keyword matching; it
//! routes to the local default, exactly as if nothing had matched.

use sdk::{ProviderKind, RoutingDecision, Tier};

/// Research and current-events terms
pub const RESEARCH_KEYWORDS: &[&str] = &[
    "research",
    "look up",
    "find out",
    "what's happening",
    "current",
    "news",
    "latest",
    "search",
    "investigate",
    "dig into",
];

/// Complex reasoning and analysis terms
pub const COMPLEX_REASONING_KEYWORDS: &[&str] = &[
    "analyze",
    "strategy",
    "plan",
    "complex",
    "detailed",
    "comprehensive",
    "deep dive",
    "break down",
    "explain thoroughly",
    "compare",
    "evaluate",
    "business decision",
    "architecture",
    "design",
];

/// Document and quick-lookup terms
pub const DOCUMENT_KEYWORDS: &[&str] = &[
    "summarize",
    "document",
    "pdf",
    "file",
    "extract",
    "quick lookup",
    "definition",
    "what is",
    "explain briefly",
];

pub const DEFAULT_REASON: &str = "Standard task - using local model";

/// A keyword class and where it routes
#[derive(Debug, Clone, Copy)]
pub struct RouteClass {
    pub keywords: &'static [&'static str],
    pub provider: ProviderKind,
    pub reason: &'static str,
}

impl RouteClass {
    /// True if any keyword occurs in the already-lowercased message.
    fn matches(&self, message_lower: &str) -> bool {
        self.keywords.iter().any(|kw| message_lower.contains(kw))
    }
}

/// Keyword classes, highest priority first
pub const ROUTE_CLASSES: [RouteClass; 3] = [
    RouteClass {
        keywords: RESEARCH_KEYWORDS,
        provider: ProviderKind::Grok,
        reason: "Research task detected - using Grok for web access",
    },
    RouteClass {
        keywords: COMPLEX_REASONING_KEYWORDS,
        provider: ProviderKind::Claude,
        reason: "Complex reasoning detected - using Claude",
    },
    RouteClass {
        keywords: DOCUMENT_KEYWORDS,
        provider: ProviderKind::Gemini,
        reason: "Document/lookup task - using Gemini",
    },
];

/// Fixed reason for an explicit directive
fn explicit_reason(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::Claude => "User requested Claude",
        ProviderKind::Grok => "User requested Grok",
        ProviderKind::Gemini => "User requested Gemini",
        ProviderKind::Local => "User requested local processing",
    }
}

/// Route a message.
///
/// An empty directive string is treated as no directive at all.
pub fn decide(message: &str, explicit_directive: Option<&str>) -> RoutingDecision {
    if let Some(directive) = explicit_directive.filter(|d| !d.is_empty()) {
        return match directive.parse::<ProviderKind>() {
            Ok(provider) => {
                RoutingDecision::new(provider, Tier::Explicit, explicit_reason(provider))
            }
            Err(_) => {
                tracing::debug!("Ignoring unknown provider directive '{}'", directive);
                default_decision()
            }
        };
    }

    let message_lower = message.to_lowercase();

    ROUTE_CLASSES
        .iter()
        .find(|class| class.matches(&message_lower))
        .map(|class| RoutingDecision::new(class.provider, Tier::Inferred, class.reason))
        .unwrap_or_else(default_decision)
}

fn default_decision() -> RoutingDecision {
    RoutingDecision::new(ProviderKind::Local, Tier::Inferred, DEFAULT_REASON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_research_routes_to_grok() {
        let decision = decide("research the latest news", None);
        assert_eq!(decision.provider, ProviderKind::Grok);
        assert_eq!(decision.tier, Tier::Inferred);
        assert_eq!(
            decision.reason,
            "Research task detected - using Grok for web access"
        );
    }

    #[test]
    fn test_complex_reasoning_routes_to_claude() {
        let decision = decide("claude, analyze our Q3 strategy", None);
        assert_eq!(decision.provider, ProviderKind::Claude);
        assert_eq!(decision.tier, Tier::Inferred);
        assert!(decision.reason.contains("Complex reasoning"));
    }

    #[test]
    fn test_document_routes_to_gemini() {
        let decision = decide("Please SUMMARIZE this PDF", None);
        assert_eq!(decision.provider, ProviderKind::Gemini);
        assert_eq!(decision.tier, Tier::Inferred);
    }

    #[test]
    fn test_no_keyword_routes_local() {
        let decision = decide("hi there", None);
        assert_eq!(decision.provider, ProviderKind::Local);
        assert_eq!(decision.tier, Tier::Inferred);
        assert_eq!(decision.reason, DEFAULT_REASON);
    }

    #[test]
    fn test_research_outranks_reasoning() {
        let decision = decide("research and analyze the market", None);
        assert_eq!(decision.provider, ProviderKind::Grok);
    }

    #[test]
    fn test_reasoning_outranks_document() {
        let decision = decide("compare these two files", None);
        assert_eq!(decision.provider, ProviderKind::Claude);
    }

    #[test]
    fn test_explicit_directive_overrides_content() {
        let decision = decide("research the latest news", Some("gemini"));
        assert_eq!(decision.provider, ProviderKind::Gemini);
        assert_eq!(decision.tier, Tier::Explicit);
        assert_eq!(decision.reason, "User requested Gemini");
    }

    #[test]
    fn test_explicit_local() {
        let decision = decide("hi", Some("local"));
        assert_eq!(decision.provider, ProviderKind::Local);
        assert_eq!(decision.tier, Tier::Explicit);
        assert_eq!(decision.reason, "User requested local processing");
    }

    #[test]
    fn test_unknown_directive_falls_back_to_default() {
        // Keywords are not consulted once a directive is present
        let decision = decide("research the latest news", Some("gpt-4"));
        assert_eq!(decision.provider, ProviderKind::Local);
        assert_eq!(decision.tier, Tier::Inferred);
        assert_eq!(decision.reason, DEFAULT_REASON);
    }

    #[test]
    fn test_directive_is_case_sensitive() {
        let decision = decide("hello", Some("Claude"));
        assert_eq!(decision.provider, ProviderKind::Local);
        assert_eq!(decision.tier, Tier::Inferred);
    }

    #[test]
    fn test_empty_directive_is_absent() {
        let decision = decide("what is a monad", Some(""));
        assert_eq!(decision.provider, ProviderKind::Gemini);
        assert_eq!(decision.tier, Tier::Inferred);
    }

    #[test]
    fn test_substring_semantics_preserved() {
        // "plan" inside "planet" still counts as a reasoning hit
        let decision = decide("tell me about the planet mars", None);
        assert_eq!(decision.provider, ProviderKind::Claude);
    }

    #[test]
    fn test_keyword_classes_are_disjoint() {
        for (i, a) in ROUTE_CLASSES.iter().enumerate() {
            for b in ROUTE_CLASSES.iter().skip(i + 1) {
                for kw in a.keywords {
                    assert!(!b.keywords.contains(kw), "{} appears in two classes", kw);
                }
            }
        }
    }
}
