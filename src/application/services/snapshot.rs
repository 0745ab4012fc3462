use crate::application::ports::task_api::TaskApiGateway;
use crate::application::services::mapping::{map_outgoing_record, map_pending_task};
use crate::domain::entities::Request;
use crate::domain::value_objects::StaffId;
use crate::shared::error::AppError;
use std::sync::Arc;
use tracing::warn;

/// Result of one snapshot pull. Failures degrade to an empty list with the
/// error carried alongside for user-facing reporting; nothing is thrown
/// into the merge path.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub requests: Vec<Request>,
    pub error: Option<AppError>,
}

impl Snapshot {
    fn failed(error: AppError) -> Self {
        Self { requests: Vec::new(), error: Some(error) }
    }
}

/// Pulls the authoritative request list from the backend task API and
/// normalizes its records.
pub struct SnapshotService {
    api: Arc<dyn TaskApiGateway>,
}

impl SnapshotService {
    pub fn new(api: Arc<dyn TaskApiGateway>) -> Self {
        Self { api }
    }

    /// Pending logistics-type requests for the given staff member. An
    /// empty identity skips the network call entirely.
    pub async fn fetch_pending(&self, staff_id: &StaffId) -> Snapshot {
        if staff_id.is_empty() {
            return Snapshot::default();
        }
        match self.api.get_all_tasks(staff_id).await {
            Ok(response) => Snapshot {
                requests: response
                    .pending_tasks
                    .iter()
                    .filter_map(map_pending_task)
                    .collect(),
                error: None,
            },
            Err(err) => {
                warn!("pending-task snapshot failed: {err}");
                Snapshot::failed(err)
            }
        }
    }

    /// Previously submitted outgoing requests, as the backend knows them.
    pub async fn fetch_outgoing(&self, staff_id: &StaffId) -> Snapshot {
        if staff_id.is_empty() {
            return Snapshot::default();
        }
        match self.api.get_outgoing_requests(staff_id).await {
            Ok(response) => {
                let mut requests: Vec<(String, Request)> = response
                    .outgoing_requests
                    .iter()
                    .map(|(key, record)| (key.clone(), map_outgoing_record(key, record)))
                    .collect();
                // HashMap iteration order is arbitrary; keep output stable.
                requests.sort_by(|a, b| a.0.cmp(&b.0));
                Snapshot {
                    requests: requests.into_iter().map(|(_, r)| r).collect(),
                    error: None,
                }
            }
            Err(err) => {
                warn!("outgoing-request snapshot failed: {err}");
                Snapshot::failed(err)
            }
        }
    }
}
