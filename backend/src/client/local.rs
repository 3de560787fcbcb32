//! [`DonationApi`] that calls the services of an [`AppState`] directly.
//!
//! Errors carry the same status, code and message the HTTP handlers
//! would send.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::{ClientError, DonationApi};
use crate::api::errors::describe;
use crate::db::ProjectRecord;
use crate::models::{
    DonationListResponse, DonationReceipt, DonationRequest, ProjectPayload, ProjectQuery,
    StatsResponse, UploadResponse,
};
use crate::services::{PaymentDirectory, ServiceError, UploadError};
use crate::AppState;

#[derive(Clone)]
pub struct LocalClient {
    state: Arc<AppState>,
}

impl LocalClient {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

fn api_error(err: ServiceError, fallback: &str) -> ClientError {
    let (status, code, message) = describe(&err, fallback);
    ClientError::Api {
        status: status.as_u16(),
        code: code.to_string(),
        message,
    }
}

fn upload_error(err: UploadError) -> ClientError {
    let (status, code) = match err {
        UploadError::Io(_) => (500, "UPLOAD_FAILED"),
        UploadError::NotFound(_) => (404, "NOT_FOUND"),
        UploadError::TooLarge { .. } => (400, "UPLOAD_TOO_LARGE"),
        _ => (400, "INVALID_UPLOAD"),
    };
    ClientError::Api {
        status,
        code: code.to_string(),
        message: err.to_string(),
    }
}

#[async_trait]
impl DonationApi for LocalClient {
    async fn list_projects(&self, query: &ProjectQuery) -> Result<Vec<ProjectRecord>, ClientError> {
        self.state
            .projects
            .list(query)
            .await
            .map_err(|e| api_error(e, "Failed to load projects"))
    }

    async fn create_project(&self, payload: ProjectPayload) -> Result<ProjectRecord, ClientError> {
        self.state
            .projects
            .create(payload)
            .await
            .map_err(|e| api_error(e, "Failed to save project"))
    }

    async fn update_project(&self, id: Uuid, payload: ProjectPayload) -> Result<ProjectRecord, ClientError> {
        self.state
            .projects
            .update(id, payload)
            .await
            .map_err(|e| api_error(e, "Failed to save project"))
    }

    async fn delete_project(&self, id: Uuid) -> Result<(), ClientError> {
        self.state
            .projects
            .delete(id)
            .await
            .map_err(|e| api_error(e, "Failed to delete project"))
    }

    async fn list_donations(&self, project_id: Uuid) -> Result<DonationListResponse, ClientError> {
        let donations = self
            .state
            .donations
            .list_for_project(project_id)
            .await
            .map_err(|e| api_error(e, "Failed to load donations"))?;
        Ok(DonationListResponse::new(project_id, donations))
    }

    async fn create_donation(&self, request: DonationRequest) -> Result<DonationReceipt, ClientError> {
        let receipt = self
            .state
            .donations
            .create(request)
            .await
            .map_err(|e| api_error(e, "Failed to record donation"))?;
        self.state.announce_donation(&receipt.donation).await;
        Ok(receipt)
    }

    async fn upload_image(&self, content_type: &str, bytes: Vec<u8>) -> Result<UploadResponse, ClientError> {
        self.state
            .uploads
            .store(content_type, &bytes)
            .await
            .map_err(upload_error)
    }

    async fn payment_directory(&self) -> Result<PaymentDirectory, ClientError> {
        self.state
            .payment_details
            .directory()
            .await
            .map_err(|e| api_error(e, "Failed to load payment details"))
    }

    async fn stats(&self) -> Result<StatsResponse, ClientError> {
        self.state
            .donations
            .stats()
            .await
            .map_err(|e| api_error(e, "Failed to load stats"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::AppConfig;
    use crate::db::{DocumentStore, MemoryStore};
    use crate::utils::Money;
    use crate::websocket::{WsEventType, ALL_CHANNEL};

    fn client(dir: &tempfile::TempDir) -> LocalClient {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        LocalClient::new(Arc::new(AppState::new(store, AppConfig::in_memory(dir.path()))))
    }

    fn event_of(message: &str) -> WsEventType {
        let value: serde_json::Value = serde_json::from_str(message).unwrap();
        serde_json::from_value(value["event"].clone()).unwrap()
    }

    #[tokio::test]
    async fn test_donation_pushes_event_and_total() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(&dir);
        let mut rx = client.state.ws_registry.register(ALL_CHANNEL.to_string()).await;

        client
            .create_donation(DonationRequest {
                name: Some("Jane Doe".into()),
                email: Some("jane@example.org".into()),
                amount: Some(Money::from_units(40)),
                payment_method: Some("card".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(event_of(&rx.recv().await.unwrap()), WsEventType::DonationReceived);
        let total = rx.recv().await.unwrap();
        assert_eq!(event_of(&total), WsEventType::TotalCollected);
        assert!(total.contains("\"$40\""));
    }

    #[tokio::test]
    async fn test_errors_carry_http_status() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(&dir);

        let err = client.delete_project(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 404, .. }));

        let err = client.upload_image("text/plain", b"x".to_vec()).await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 400, .. }));
    }
}
