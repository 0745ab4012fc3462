use crate::domain::value_objects::StaffId;
use crate::shared::error::AppError;
use crate::shared::json::json_text;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Raw pending-task record from `get_all_task`. The backend is loosely
/// typed, so id-like fields are kept as JSON values until normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PendingTaskRecord {
    #[serde(default)]
    pub plan_id: Option<Value>,
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default)]
    pub activity: Option<String>,
    #[serde(default)]
    pub farm_id: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub vehicle_number: Option<Value>,
    #[serde(default)]
    pub request_id: Option<Value>,
    #[serde(default)]
    pub vehicle_id: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetAllTasksResponse {
    #[serde(default)]
    pub pending_tasks: Vec<PendingTaskRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MakeRequestBody {
    pub staff_id: String,
    pub date: Option<String>,
    pub note: Option<String>,
    pub request_location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MakeRequestResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub plan_id: Option<Value>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, rename = "reqId")]
    pub req_id: Option<Value>,
}

impl MakeRequestResponse {
    /// Whichever id field the backend chose to populate.
    pub fn created_id(&self) -> Option<String> {
        json_text(self.plan_id.as_ref())
            .or_else(|| json_text(self.id.as_ref()))
            .or_else(|| json_text(self.req_id.as_ref()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutgoingRequestRecord {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub request: Option<Value>,
    #[serde(default)]
    pub request_location: Option<Value>,
    #[serde(default)]
    pub date: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetOutgoingRequestsResponse {
    #[serde(default)]
    pub outgoing_requests: HashMap<String, OutgoingRequestRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateRequestStatusBody {
    pub plan_id: String,
    pub date: String,
    pub activity: String,
    pub request_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRequestStatusResponse {
    #[serde(default)]
    pub success: bool,
}

/// REST gateway to the farm backend.
#[async_trait]
pub trait TaskApiGateway: Send + Sync {
    async fn get_all_tasks(&self, staff_id: &StaffId) -> Result<GetAllTasksResponse, AppError>;
    async fn make_request(&self, body: &MakeRequestBody) -> Result<MakeRequestResponse, AppError>;
    async fn get_outgoing_requests(
        &self,
        staff_id: &StaffId,
    ) -> Result<GetOutgoingRequestsResponse, AppError>;
    async fn update_request_status(
        &self,
        body: &UpdateRequestStatusBody,
    ) -> Result<UpdateRequestStatusResponse, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn created_id_prefers_plan_id() {
        let response: MakeRequestResponse = serde_json::from_value(json!({
            "success": true,
            "plan_id": "PLAN-9",
            "reqId": 41,
        }))
        .unwrap();
        assert_eq!(response.created_id(), Some("PLAN-9".to_string()));
    }

    #[test]
    fn created_id_falls_back_through_id_and_req_id() {
        let response: MakeRequestResponse =
            serde_json::from_value(json!({ "success": true, "reqId": 41 })).unwrap();
        assert_eq!(response.created_id(), Some("41".to_string()));
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let response: GetAllTasksResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.pending_tasks.is_empty());

        let record: PendingTaskRecord =
            serde_json::from_value(json!({ "plan_id": 12, "activity": "Logistics Request" }))
                .unwrap();
        assert_eq!(record.activity.as_deref(), Some("Logistics Request"));
        assert!(record.status.is_none());
    }
}
