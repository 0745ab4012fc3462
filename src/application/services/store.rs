use crate::domain::entities::{Request, RequestCollection, RequestPatch, StatusCounts};
use crate::domain::value_objects::RequestId;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Owner of the shared request collection.
///
/// All transitions go through the collection's pure merge functions under
/// one write lock, so concurrent snapshot fetches, stream events, and user
/// mutations serialize cleanly. Terminal status updates from the stream
/// are parked here until the user acknowledges them.
#[derive(Default)]
pub struct RequestStore {
    collection: RwLock<RequestCollection>,
    pending_ack: RwLock<HashMap<RequestId, RequestPatch>>,
}

impl RequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> RequestCollection {
        self.collection.read().await.clone()
    }

    pub async fn get(&self, id: &RequestId) -> Option<Request> {
        self.collection.read().await.get(id).cloned()
    }

    pub async fn counts(&self) -> StatusCounts {
        self.collection.read().await.counts()
    }

    pub async fn upsert(&self, incoming: Request) {
        let mut collection = self.collection.write().await;
        *collection = collection.upsert(incoming);
    }

    /// Returns false when the patch addressed an unknown id.
    pub async fn apply(&self, patch: &RequestPatch) -> bool {
        let mut collection = self.collection.write().await;
        let (next, applied) = collection.apply(patch);
        *collection = next;
        applied
    }

    pub async fn reconcile(&self, fetched: Vec<Request>) {
        let mut collection = self.collection.write().await;
        *collection = collection.reconcile(fetched);
    }

    /// Parks a terminal transition until the user confirms it. The visible
    /// record keeps its current status in the meantime.
    pub async fn park_terminal(&self, patch: RequestPatch) {
        self.pending_ack.write().await.insert(patch.id.clone(), patch);
    }

    pub async fn has_pending_ack(&self, id: &RequestId) -> bool {
        self.pending_ack.read().await.contains_key(id)
    }

    /// Commits a parked transition. Returns the updated record, or `None`
    /// when nothing was parked for the id or the record is unknown.
    pub async fn acknowledge(&self, id: &RequestId) -> Option<Request> {
        let patch = self.pending_ack.write().await.remove(id)?;
        if self.apply(&patch).await {
            self.get(id).await
        } else {
            None
        }
    }
}
