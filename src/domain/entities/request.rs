use crate::domain::value_objects::{RequestId, RequestKind, RequestStatus};
use serde::{Deserialize, Serialize};

/// A fuel or logistics request as shown in the driver's request list.
///
/// Records with the same id describe the same logical request regardless of
/// which source produced them (snapshot fetch, stream event, local create).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub kind: RequestKind,
    pub status: RequestStatus,
    pub title: String,
    /// Backend plan id; required for status mutations.
    pub request_ref: Option<String>,
    /// Server-assigned numeric request id, distinct from the plan id.
    pub server_request_id: Option<String>,
    /// Raw backend activity string, echoed back on status mutations.
    pub activity: Option<String>,
    pub amount: Option<String>,
    pub note: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

impl Request {
    pub fn new(id: RequestId, kind: RequestKind, title: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            status: RequestStatus::Pending,
            title: title.into(),
            request_ref: None,
            server_request_id: None,
            activity: None,
            amount: None,
            note: None,
            location: None,
            date: None,
            time: None,
        }
    }

    /// Field-wise merge: every present field of `incoming` overwrites, an
    /// absent field keeps the existing value. Identity and kind never
    /// change once a record exists.
    pub fn merged_with(&self, incoming: &Request) -> Request {
        Request {
            id: self.id.clone(),
            kind: self.kind,
            status: incoming.status,
            title: if incoming.title.is_empty() {
                self.title.clone()
            } else {
                incoming.title.clone()
            },
            request_ref: incoming.request_ref.clone().or_else(|| self.request_ref.clone()),
            server_request_id: incoming
                .server_request_id
                .clone()
                .or_else(|| self.server_request_id.clone()),
            activity: incoming.activity.clone().or_else(|| self.activity.clone()),
            amount: incoming.amount.clone().or_else(|| self.amount.clone()),
            note: incoming.note.clone().or_else(|| self.note.clone()),
            location: incoming.location.clone().or_else(|| self.location.clone()),
            date: incoming.date.clone().or_else(|| self.date.clone()),
            time: incoming.time.clone().or_else(|| self.time.clone()),
        }
    }

    /// Applies a partial update; absent patch fields keep existing values.
    pub fn patched(&self, patch: &RequestPatch) -> Request {
        let mut next = self.clone();
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(request_ref) = &patch.request_ref {
            next.request_ref = Some(request_ref.clone());
        }
        if let Some(server_request_id) = &patch.server_request_id {
            next.server_request_id = Some(server_request_id.clone());
        }
        if let Some(note) = &patch.note {
            next.note = Some(note.clone());
        }
        if let Some(location) = &patch.location {
            next.location = Some(location.clone());
        }
        if let Some(date) = &patch.date {
            next.date = Some(date.clone());
        }
        if let Some(amount) = &patch.amount {
            next.amount = Some(amount.clone());
        }
        next
    }
}

/// Partial update keyed by request id; used for stream status events and
/// for the locally confirmed "mark delivered" transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestPatch {
    pub id: RequestId,
    pub status: Option<RequestStatus>,
    pub request_ref: Option<String>,
    pub server_request_id: Option<String>,
    pub note: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub amount: Option<String>,
}

impl RequestPatch {
    pub fn new(id: RequestId) -> Self {
        Self {
            id,
            status: None,
            request_ref: None,
            server_request_id: None,
            note: None,
            location: None,
            date: None,
            amount: None,
        }
    }

    pub fn with_status(mut self, status: RequestStatus) -> Self {
        self.status = Some(status);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logistics(id: &str) -> Request {
        Request::new(
            RequestId::new(id),
            RequestKind::Logistics,
            "LOGISTICS REQUEST",
        )
    }

    #[test]
    fn merge_preserves_fields_the_incoming_record_lacks() {
        let mut existing = logistics("P1");
        existing.note = Some("oil filter".to_string());
        existing.location = Some("East Field B".to_string());

        let mut incoming = logistics("P1");
        incoming.status = RequestStatus::Approved;

        let merged = existing.merged_with(&incoming);
        assert_eq!(merged.status, RequestStatus::Approved);
        assert_eq!(merged.note.as_deref(), Some("oil filter"));
        assert_eq!(merged.location.as_deref(), Some("East Field B"));
    }

    #[test]
    fn merge_lets_present_fields_win() {
        let mut existing = logistics("P1");
        existing.note = Some("old note".to_string());

        let mut incoming = logistics("P1");
        incoming.note = Some("new note".to_string());

        assert_eq!(
            existing.merged_with(&incoming).note.as_deref(),
            Some("new note")
        );
    }

    #[test]
    fn merge_never_changes_kind() {
        let existing = logistics("P1");
        let mut incoming = existing.clone();
        incoming.kind = RequestKind::Fuel;

        assert_eq!(existing.merged_with(&incoming).kind, RequestKind::Logistics);
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut existing = logistics("P1");
        existing.note = Some("keep me".to_string());

        let patch = RequestPatch::new(RequestId::new("P1")).with_status(RequestStatus::Done);
        let patched = existing.patched(&patch);

        assert_eq!(patched.status, RequestStatus::Done);
        assert_eq!(patched.note.as_deref(), Some("keep me"));
    }
}
