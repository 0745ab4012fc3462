use crate::application::ports::task_api::{TaskApiGateway, UpdateRequestStatusBody};
use crate::domain::entities::Request;
use crate::shared::error::AppError;
use std::sync::Arc;

/// Sends status-transition commands to the backend. The local transition
/// is the caller's job and only happens after confirmed success.
pub struct StatusService {
    api: Arc<dyn TaskApiGateway>,
}

impl StatusService {
    pub fn new(api: Arc<dyn TaskApiGateway>) -> Self {
        Self { api }
    }

    /// Marks a request delivered on the backend. Both the plan reference
    /// and the server-assigned request id must be present; a violation
    /// fails synchronously without touching the network. Success requires
    /// an HTTP 2xx *and* an explicit success flag in the body.
    pub async fn mark_delivered(&self, request: &Request) -> Result<(), AppError> {
        let plan_id = non_empty(request.request_ref.as_deref()).ok_or_else(|| {
            AppError::InvalidInput("request has no plan reference; cannot mark delivered".to_string())
        })?;
        let request_id = non_empty(request.server_request_id.as_deref()).ok_or_else(|| {
            AppError::InvalidInput(
                "request has no server-assigned id; cannot mark delivered".to_string(),
            )
        })?;

        let body = UpdateRequestStatusBody {
            plan_id: plan_id.to_string(),
            date: request.date.clone().unwrap_or_default(),
            activity: request.activity.clone().unwrap_or_default(),
            request_id: request_id.to_string(),
        };
        let response = self.api.update_request_status(&body).await?;
        if response.success {
            Ok(())
        } else {
            Err(AppError::Backend("status update rejected".to_string()))
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
