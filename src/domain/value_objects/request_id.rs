use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity key of a request. Derived from the backend plan id when
/// one exists, otherwise synthesized from the vehicle/date/location triple
/// so repeated fetches of the same logical request keep the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn from_plan_id(plan_id: Option<&str>) -> Option<Self> {
        let plan_id = plan_id?.trim();
        if plan_id.is_empty() {
            None
        } else {
            Some(Self(plan_id.to_string()))
        }
    }

    /// Fallback key when no plan id is present; missing parts collapse to
    /// empty segments.
    pub fn synthesize(vehicle_id: &str, date: &str, location: &str) -> Self {
        Self(format!(
            "{}_{}_{}",
            vehicle_id.trim(),
            date.trim(),
            location.trim()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
