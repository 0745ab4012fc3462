use crate::domain::entities::request::{Request, RequestPatch};
use crate::domain::value_objects::{RequestId, RequestStatus};
use serde::{Deserialize, Serialize};

/// Deduplicated, most-recent-first view of all known requests.
///
/// Every transition is a pure `(collection, incoming) -> collection`
/// function; the owner serializes them behind a single mutable reference.
/// Invariant: no two entries ever share an id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestCollection {
    entries: Vec<Request>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub approved: usize,
    pub done: usize,
}

impl RequestCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Request] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &RequestId) -> Option<&Request> {
        self.entries.iter().find(|r| &r.id == id)
    }

    pub fn contains(&self, id: &RequestId) -> bool {
        self.get(id).is_some()
    }

    /// Inserts a new record at the front, or field-wise merges into the
    /// existing record with the same id. Idempotent: applying the same
    /// incoming record twice equals applying it once.
    pub fn upsert(&self, incoming: Request) -> Self {
        let mut entries = self.entries.clone();
        match entries.iter().position(|r| r.id == incoming.id) {
            Some(index) => {
                entries[index] = entries[index].merged_with(&incoming);
            }
            None => {
                entries.insert(0, incoming);
            }
        }
        Self { entries }
    }

    /// Applies a partial update to an existing record. A patch for an
    /// unknown id leaves the collection unchanged (a patch alone cannot
    /// fabricate a renderable record).
    pub fn apply(&self, patch: &RequestPatch) -> (Self, bool) {
        let mut entries = self.entries.clone();
        match entries.iter().position(|r| r.id == patch.id) {
            Some(index) => {
                entries[index] = entries[index].patched(patch);
                (Self { entries }, true)
            }
            None => (Self { entries }, false),
        }
    }

    /// Merges a fetched snapshot into the collection. Known ids are merged
    /// in place, unseen records are added to the front in fetch order.
    /// Entries absent from the snapshot are kept: a snapshot supplements,
    /// it does not replace.
    pub fn reconcile(&self, fetched: Vec<Request>) -> Self {
        let mut merged = self.entries.clone();
        let mut fresh: Vec<Request> = Vec::new();
        for incoming in fetched {
            if let Some(index) = merged.iter().position(|r| r.id == incoming.id) {
                merged[index] = merged[index].merged_with(&incoming);
            } else if let Some(index) = fresh.iter().position(|r| r.id == incoming.id) {
                fresh[index] = fresh[index].merged_with(&incoming);
            } else {
                fresh.push(incoming);
            }
        }
        fresh.extend(merged);
        Self { entries: fresh }
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for request in &self.entries {
            match request.status {
                RequestStatus::Pending => counts.pending += 1,
                RequestStatus::Approved => counts.approved += 1,
                RequestStatus::Done => counts.done += 1,
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::RequestKind;

    fn request(id: &str, status: RequestStatus) -> Request {
        let mut r = Request::new(RequestId::new(id), RequestKind::Logistics, "LOGISTICS REQUEST");
        r.status = status;
        r
    }

    #[test]
    fn upsert_prepends_unseen_records() {
        let collection = RequestCollection::new()
            .upsert(request("P1", RequestStatus::Pending))
            .upsert(request("P2", RequestStatus::Pending));

        let ids: Vec<&str> = collection.entries().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["P2", "P1"]);
    }

    #[test]
    fn upsert_is_idempotent() {
        let mut incoming = request("P1", RequestStatus::Approved);
        incoming.note = Some("oil filter".to_string());

        let once = RequestCollection::new().upsert(incoming.clone());
        let twice = once.upsert(incoming);
        assert_eq!(once, twice);
    }

    #[test]
    fn no_two_entries_share_an_id() {
        let collection = RequestCollection::new()
            .upsert(request("P1", RequestStatus::Pending))
            .upsert(request("P1", RequestStatus::Approved))
            .upsert(request("P1", RequestStatus::Done));

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get(&RequestId::new("P1")).unwrap().status, RequestStatus::Done);
    }

    #[test]
    fn snapshot_then_stream_event_keeps_earlier_fields() {
        let mut snapshot_record = request("P1", RequestStatus::Pending);
        snapshot_record.note = Some("oil filter".to_string());
        let collection = RequestCollection::new().reconcile(vec![snapshot_record]);

        let stream_record = request("P1", RequestStatus::Approved);
        let merged = collection.upsert(stream_record);

        let entry = merged.get(&RequestId::new("P1")).unwrap();
        assert_eq!(entry.status, RequestStatus::Approved);
        assert_eq!(entry.note.as_deref(), Some("oil filter"));
    }

    #[test]
    fn reconcile_keeps_entries_missing_from_the_snapshot() {
        let collection = RequestCollection::new().upsert(request("LOCAL", RequestStatus::Pending));
        let merged = collection.reconcile(vec![request("P1", RequestStatus::Pending)]);

        assert!(merged.contains(&RequestId::new("LOCAL")));
        assert!(merged.contains(&RequestId::new("P1")));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn reconcile_adds_new_records_in_fetch_order_at_the_front() {
        let collection = RequestCollection::new().upsert(request("OLD", RequestStatus::Pending));
        let merged = collection.reconcile(vec![
            request("P1", RequestStatus::Pending),
            request("P2", RequestStatus::Pending),
        ]);

        let ids: Vec<&str> = merged.entries().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P2", "OLD"]);
    }

    #[test]
    fn reconcile_dedupes_within_a_single_batch() {
        let merged = RequestCollection::new().reconcile(vec![
            request("P1", RequestStatus::Pending),
            request("P1", RequestStatus::Approved),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged.entries()[0].status, RequestStatus::Approved);
    }

    #[test]
    fn apply_to_unknown_id_is_a_no_op() {
        let collection = RequestCollection::new().upsert(request("P1", RequestStatus::Pending));
        let patch = RequestPatch::new(RequestId::new("GHOST")).with_status(RequestStatus::Done);

        let (next, applied) = collection.apply(&patch);
        assert!(!applied);
        assert_eq!(next, collection);
    }

    #[test]
    fn counts_by_status() {
        let collection = RequestCollection::new()
            .upsert(request("P1", RequestStatus::Pending))
            .upsert(request("P2", RequestStatus::Approved))
            .upsert(request("P3", RequestStatus::Done))
            .upsert(request("P4", RequestStatus::Pending));

        assert_eq!(
            collection.counts(),
            StatusCounts { pending: 2, approved: 1, done: 1 }
        );
    }
}
