use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the acting staff member. Always stored trimmed; an empty
/// value means "unauthenticated" and gates all network and stream work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaffId(String);

impl StaffId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stream fan-out filter: trimmed equality, and both sides must be
    /// non-empty for a match.
    pub fn matches(&self, other: &str) -> bool {
        let other = other.trim();
        !self.0.is_empty() && !other.is_empty() && self.0 == other
    }
}

impl fmt::Display for StaffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StaffId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
