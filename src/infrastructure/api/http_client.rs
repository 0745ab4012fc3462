use crate::application::ports::task_api::{
    GetAllTasksResponse, GetOutgoingRequestsResponse, MakeRequestBody, MakeRequestResponse,
    TaskApiGateway, UpdateRequestStatusBody, UpdateRequestStatusResponse,
};
use crate::domain::value_objects::StaffId;
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// reqwest-backed implementation of the backend REST gateway.
pub struct HttpTaskApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTaskApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| AppError::Network(err.to_string()))?
            .error_for_status()
            .map_err(|err| AppError::Network(err.to_string()))?;
        response
            .json::<T>()
            .await
            .map_err(|err| AppError::DeserializationError(err.to_string()))
    }

    async fn post_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| AppError::Network(err.to_string()))?
            .error_for_status()
            .map_err(|err| AppError::Network(err.to_string()))?;
        response
            .json::<T>()
            .await
            .map_err(|err| AppError::DeserializationError(err.to_string()))
    }
}

#[async_trait]
impl TaskApiGateway for HttpTaskApi {
    async fn get_all_tasks(&self, staff_id: &StaffId) -> Result<GetAllTasksResponse, AppError> {
        self.get_json(&format!("/admin_vehicles/get_all_task/{}", staff_id))
            .await
    }

    async fn make_request(&self, body: &MakeRequestBody) -> Result<MakeRequestResponse, AppError> {
        self.post_json("/admin_ops_requests/make_request", body).await
    }

    async fn get_outgoing_requests(
        &self,
        staff_id: &StaffId,
    ) -> Result<GetOutgoingRequestsResponse, AppError> {
        self.get_json(&format!(
            "/admin_ops_requests/get_outgoing_requests/{}",
            staff_id
        ))
        .await
    }

    async fn update_request_status(
        &self,
        body: &UpdateRequestStatusBody,
    ) -> Result<UpdateRequestStatusResponse, AppError> {
        self.post_json("/admin_vehicles/update_request_status", body)
            .await
    }
}
