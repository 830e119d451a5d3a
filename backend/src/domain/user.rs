//! User identity primitives.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque bearer token identifying a user.
///
/// Tokens are generated as UUID v4 text on signup, but any non-blank string
/// presented by a client is accepted for lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserToken(String);

impl UserToken {
    /// Wrap an existing token value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generate a fresh unique token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Whether the token is empty once trimmed.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Borrow the raw token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UserToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered user.
///
/// `password_hash` is an Argon2 PHC string; plaintext passwords never reach
/// the persistence gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub token: UserToken,
    pub name: String,
    pub password_hash: String,
}
