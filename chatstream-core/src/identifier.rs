//! Identifier and timestamp helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Get the current UTC timestamp.
#[must_use]
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Identifier of a chat session.
///
/// Backends issue either numeric or string session ids, so both shapes are
/// accepted and written back unchanged.
///
/// # Example
///
/// ```rust
/// use chatstream_core::SessionId;
///
/// let id: SessionId = serde_json::from_str("42").unwrap();
/// assert_eq!(id, SessionId::Number(42));
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionId {
    /// Numeric session id.
    Number(i64),
    /// Opaque string session id.
    Text(String),
}

impl SessionId {
    /// Returns the id as a string slice when it is textual.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for SessionId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}
