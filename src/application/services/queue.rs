use crate::application::ports::store::OutgoingStore;
use crate::application::ports::task_api::{MakeRequestBody, TaskApiGateway};
use crate::application::services::identity::IdentityService;
use crate::domain::entities::{OutgoingEntry, OutgoingPayload, RequestDraft};
use crate::shared::error::AppError;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushOutcome {
    pub submitted: u32,
    pub removed: u32,
    pub remaining: u32,
}

/// Locally created requests: persisted first, submitted when the backend
/// is reachable. Queued entries are a side channel; they never appear in
/// the merged request collection.
pub struct QueueService {
    api: Arc<dyn TaskApiGateway>,
    store: Arc<dyn OutgoingStore>,
    identity: Arc<IdentityService>,
}

impl QueueService {
    pub fn new(
        api: Arc<dyn TaskApiGateway>,
        store: Arc<dyn OutgoingStore>,
        identity: Arc<IdentityService>,
    ) -> Self {
        Self { api, store, identity }
    }

    /// Persists the draft, then attempts immediate submission. Transport
    /// failures leave the entry queued for a later flush; a persistence
    /// failure is logged and never blocks the submission attempt.
    pub async fn create_request(&self, draft: RequestDraft) -> Result<OutgoingEntry, AppError> {
        let staff_id = self.identity.resolve().await;
        if staff_id.is_empty() {
            return Err(AppError::InvalidInput(
                "cannot create a request without a staff identity".to_string(),
            ));
        }

        let payload = OutgoingPayload {
            staff_id: staff_id.as_str().to_string(),
            kind: draft.kind,
            note: draft.note,
            request_location: draft.location,
            date: draft.date,
        };
        let mut entry = OutgoingEntry::new(payload);

        if let Err(err) = self.store.append(&entry).await {
            warn!("outgoing queue append failed: {err}");
        }

        match self.api.make_request(&Self::body_for(&entry)).await {
            Ok(response) if response.success => match response.created_id() {
                Some(created_id) => {
                    if let Err(err) = self.store.confirm(&entry.local_id, &created_id).await {
                        warn!("failed to record confirmation for {}: {err}", entry.local_id);
                    }
                    entry.created_req_id = Some(created_id);
                }
                None => {
                    warn!("backend accepted request {} without an id", entry.local_id);
                }
            },
            Ok(_) => {
                debug!("backend rejected request {}; left queued", entry.local_id);
            }
            Err(err) => {
                debug!("request {} submission failed, left queued: {err}", entry.local_id);
            }
        }

        Ok(entry)
    }

    /// The queue as persisted, oldest first, unmodified.
    pub async fn peek_all(&self) -> Result<Vec<OutgoingEntry>, AppError> {
        self.store.list().await
    }

    /// Drains the queue: already confirmed entries are removed, unconfirmed
    /// ones are re-posted and removed only on confirmed success. Anything
    /// else stays queued for the next pass.
    pub async fn flush(&self) -> Result<FlushOutcome, AppError> {
        let mut outcome = FlushOutcome::default();
        for entry in self.store.list().await? {
            if entry.is_confirmed() {
                self.store.remove(&entry.local_id).await?;
                outcome.removed += 1;
                continue;
            }
            match self.api.make_request(&Self::body_for(&entry)).await {
                Ok(response) if response.success => {
                    self.store.remove(&entry.local_id).await?;
                    outcome.submitted += 1;
                    outcome.removed += 1;
                }
                Ok(_) => {
                    debug!("flush: backend rejected {}; keeping it", entry.local_id);
                    outcome.remaining += 1;
                }
                Err(err) => {
                    debug!("flush: submission of {} failed: {err}", entry.local_id);
                    outcome.remaining += 1;
                }
            }
        }
        Ok(outcome)
    }

    fn body_for(entry: &OutgoingEntry) -> MakeRequestBody {
        MakeRequestBody {
            staff_id: entry.payload.staff_id.clone(),
            date: entry.payload.date.clone(),
            note: entry.payload.note.clone(),
            request_location: entry.payload.request_location.clone(),
        }
    }
}
