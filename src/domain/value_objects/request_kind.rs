use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a request; immutable once the record is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Fuel,
    Logistics,
}

impl RequestKind {
    /// Classifies a backend task record by its free-text activity field.
    /// Only logistics-type activities belong to the request view; anything
    /// else is a task-list record.
    pub fn from_activity(raw: Option<&str>) -> Option<Self> {
        let activity = raw.unwrap_or_default().trim().to_lowercase();
        if activity == "logistics request" || activity == "logistics" {
            Some(Self::Logistics)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Fuel => "fuel",
            Self::Logistics => "logistics",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_classification_is_case_insensitive_and_trimmed() {
        assert_eq!(
            RequestKind::from_activity(Some(" Logistics Request ")),
            Some(RequestKind::Logistics)
        );
        assert_eq!(
            RequestKind::from_activity(Some("LOGISTICS")),
            Some(RequestKind::Logistics)
        );
        assert_eq!(RequestKind::from_activity(Some("Ploughing")), None);
        assert_eq!(RequestKind::from_activity(None), None);
    }
}
