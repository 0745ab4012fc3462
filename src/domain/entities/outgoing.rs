use crate::domain::value_objects::RequestKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User-supplied fields for a new request, captured before any network
/// round-trip happens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDraft {
    pub kind: RequestKind,
    pub note: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
}

/// Fields submitted to the backend for a queued request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingPayload {
    pub staff_id: String,
    pub kind: RequestKind,
    pub note: Option<String>,
    pub request_location: Option<String>,
    pub date: Option<String>,
}

/// A locally created request persisted for offline submission. Entries are
/// append-only; only a flush pass removes them, and only after the backend
/// has confirmed delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingEntry {
    pub local_id: String,
    pub payload: OutgoingPayload,
    /// Server-assigned id, set once the backend accepts the request.
    pub created_req_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OutgoingEntry {
    pub fn new(payload: OutgoingPayload) -> Self {
        Self {
            local_id: Uuid::new_v4().to_string(),
            payload,
            created_req_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.created_req_id.is_some()
    }
}
