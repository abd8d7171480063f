use std::fmt;

/// A wrapper for credential strings that prevents accidental logging.
///
/// `Debug` and `Display` always print `[REDACTED]`.
/// To access the actual secret value, use the `unsecure()` method.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new SecretString
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Wrap `s` unless it is blank
    pub fn non_empty(s: String) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Access the raw underlying string
    pub fn unsecure(&self) -> &str {
        &self.0
    }

    /// Replace every occurrence of this secret inside `text`.
    pub fn redact(&self, text: &str) -> String {
        if self.0.is_empty() {
            return text.to_string();
        }
        text.replace(&self.0, "[REDACTED]")
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_and_display_are_redacted() {
        let secret = SecretString::new("hunter2");
        assert_eq!(format!("{:?}", secret), "SecretString([REDACTED])");
        assert_eq!(secret.to_string(), "[REDACTED]");
    }

    #[test]
    fn test_redact_in_text() {
        let secret = SecretString::new("AIzaKEY");
        let url = "https://example.test/models/x:generateContent?key=AIzaKEY";
        assert_eq!(
            secret.redact(url),
            "https://example.test/models/x:generateContent?key=[REDACTED]"
        );
    }

    #[test]
    fn test_non_empty_trims() {
        assert!(SecretString::non_empty("  ".to_string()).is_none());
        let s = SecretString::non_empty(" abc \n".to_string()).unwrap();
        assert_eq!(s.unsecure(), "abc");
    }
}
