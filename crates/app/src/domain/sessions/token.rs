//! Bearer session tokens.

use std::fmt;

use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::tokens::{has_hex_shape, random_hex_token};

/// Prefix carried by every session token.
pub const SESSION_TOKEN_PREFIX: &str = "hs_";

const SESSION_TOKEN_BYTES: usize = 32;

/// Raw bearer token. Only its hash is ever stored.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    #[must_use]
    pub fn generate() -> Self {
        Self(random_hex_token::<SESSION_TOKEN_BYTES>(SESSION_TOKEN_PREFIX))
    }

    /// Accept a caller-supplied token if it has the shape of one we issue.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        has_hex_shape(value, SESSION_TOKEN_PREFIX, SESSION_TOKEN_BYTES * 2)
            .then(|| Self(value.to_string()))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Hex-encoded SHA-256 of the token, as stored.
    #[must_use]
    pub fn hash(&self) -> String {
        format!("{:x}", Sha256::digest(self.0.as_bytes()))
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(**redacted**)")
    }
}

impl Drop for SessionToken {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}
