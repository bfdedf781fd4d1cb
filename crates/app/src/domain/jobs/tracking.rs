//! Public tracking tokens.

use std::fmt;

use crate::tokens::{has_hex_shape, random_hex_token};

const PREFIX: &str = "trk_";
const TOKEN_BYTES: usize = 24;

/// Unguessable token that lets a customer follow a single job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackingToken(String);

impl TrackingToken {
    #[must_use]
    pub fn generate() -> Self {
        Self(random_hex_token::<TOKEN_BYTES>(PREFIX))
    }

    /// Accept a caller-supplied token if it has the shape of one we issue.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        has_hex_shape(value, PREFIX, TOKEN_BYTES * 2).then(|| Self(value.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn from_stored(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for TrackingToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_unique_and_parse() {
        let first = TrackingToken::generate();
        let second = TrackingToken::generate();

        assert_ne!(first, second);
        assert_eq!(TrackingToken::parse(first.as_str()), Some(first.clone()));
        assert_eq!(first.as_str().len(), PREFIX.len() + TOKEN_BYTES * 2);
    }

    #[test]
    fn parse_rejects_foreign_shapes() {
        assert_eq!(TrackingToken::parse(""), None);
        assert_eq!(TrackingToken::parse("trk_"), None);
        assert_eq!(TrackingToken::parse("trk_zz"), None);
        assert_eq!(TrackingToken::parse(&format!("abc_{}", "0".repeat(48))), None);
    }
}
