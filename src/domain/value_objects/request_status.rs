use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-driven lifecycle state of a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Done,
}

impl RequestStatus {
    /// Normalizes whatever the backend sends. Unknown or missing values
    /// fall back to pending.
    pub fn parse(raw: Option<&str>) -> Self {
        let status = raw.unwrap_or_default().trim().to_lowercase();
        match status.as_str() {
            "approved" => Self::Approved,
            "done" | "completed" | "complete" => Self::Done,
            _ => Self::Pending,
        }
    }

    /// Terminal updates are parked until the user acknowledges them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_table() {
        assert_eq!(RequestStatus::parse(Some("approved")), RequestStatus::Approved);
        assert_eq!(RequestStatus::parse(Some(" APPROVED ")), RequestStatus::Approved);
        assert_eq!(RequestStatus::parse(Some("done")), RequestStatus::Done);
        assert_eq!(RequestStatus::parse(Some("Completed")), RequestStatus::Done);
        assert_eq!(RequestStatus::parse(Some("complete")), RequestStatus::Done);
        assert_eq!(RequestStatus::parse(Some("in progress")), RequestStatus::Pending);
        assert_eq!(RequestStatus::parse(Some("")), RequestStatus::Pending);
        assert_eq!(RequestStatus::parse(None), RequestStatus::Pending);
    }

    #[test]
    fn only_done_is_terminal() {
        assert!(RequestStatus::Done.is_terminal());
        assert!(!RequestStatus::Approved.is_terminal());
        assert!(!RequestStatus::Pending.is_terminal());
    }
}
