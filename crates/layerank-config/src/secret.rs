//! Hosting-service access token.
//!
//! The token is injected at load time (configuration file or environment)
//! and only leaves this type in clear text through [`AccessToken::expose`],
//! which argument rendering calls when building the child's argv.
//! Serialising it writes the placeholder, never the token.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Placeholder printed wherever a secret would otherwise appear.
pub const REDACTED: &str = "***";

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The clear-text token.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Serialize for AccessToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken({REDACTED})")
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_and_display_are_redacted() {
        let token = AccessToken::new("hf_supersecret");
        assert_eq!(format!("{token}"), "***");
        assert!(!format!("{token:?}").contains("supersecret"));
    }

    #[test]
    fn expose_returns_clear_text() {
        assert_eq!(AccessToken::new("hf_abc").expose(), "hf_abc");
    }

    #[test]
    fn serialized_config_carries_placeholder() {
        let mut cfg = crate::RunConfig::default();
        cfg.storage.token = Some(AccessToken::new("hf_supersecret"));
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(!json.contains("supersecret"));
        assert!(json.contains(r#""token":"***""#));
    }

    #[test]
    fn deserializes_from_plain_string() {
        let token: AccessToken = serde_json::from_str("\"hf_abc\"").unwrap();
        assert_eq!(token.expose(), "hf_abc");
    }

    #[test]
    fn whitespace_token_counts_as_empty() {
        assert!(AccessToken::new("  ").is_empty());
        assert!(!AccessToken::new("x").is_empty());
    }
}
