use serde::{Deserialize, Serialize};
use std::fmt;

const TOKEN_SCHEME: &str = "Token";

/// An API token passed explicitly with every call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    token: String,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("{} {}", TOKEN_SCHEME, self.token)
    }

    /// Parse `Token <key>` from an `Authorization` header.
    pub fn from_header_value(value: &str) -> Option<Self> {
        let (scheme, token) = value.trim().split_once(' ')?;
        let token = token.trim();
        if scheme != TOKEN_SCHEME || token.is_empty() {
            return None;
        }
        Some(Self::new(token))
    }
}

// Keep tokens out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential").field("token", &"***").finish()
    }
}
