//! [`DonationApi`] over HTTP with `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use super::{ClientError, DonationApi};
use crate::db::ProjectRecord;
use crate::models::{
    ApiResponse, DeletedResponse, DonationListResponse, DonationReceipt, DonationRequest,
    PaymentDetailsListResponse, ProjectListResponse, ProjectPayload, ProjectQuery, ProjectResponse,
    StatsResponse, UploadResponse,
};
use crate::services::PaymentDirectory;

/// Client for a running backend, e.g. `http://127.0.0.1:8080`.
#[derive(Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ClientError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    /// Send and unwrap the `{success, data, error}` envelope.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        let envelope: ApiResponse<T> = serde_json::from_str(&text)
            .map_err(|e| ClientError::Decode(format!("HTTP {}: {}", status, e)))?;

        match (envelope.success, envelope.data, envelope.error) {
            (true, Some(data), _) => Ok(data),
            (_, _, Some(error)) => Err(ClientError::Api {
                status,
                code: error.code,
                message: error.message,
            }),
            _ => Err(ClientError::Decode(format!("HTTP {}: empty envelope", status))),
        }
    }
}

#[async_trait]
impl DonationApi for HttpClient {
    async fn list_projects(&self, query: &ProjectQuery) -> Result<Vec<ProjectRecord>, ClientError> {
        let list: ProjectListResponse = self
            .send(self.request(Method::GET, "/api/projects").query(query))
            .await?;
        Ok(list.projects.into_iter().map(|p| p.project).collect())
    }

    async fn create_project(&self, payload: ProjectPayload) -> Result<ProjectRecord, ClientError> {
        let created: ProjectResponse = self
            .send(self.request(Method::POST, "/api/projects").json(&payload))
            .await?;
        Ok(created.project)
    }

    async fn update_project(&self, id: Uuid, payload: ProjectPayload) -> Result<ProjectRecord, ClientError> {
        let updated: ProjectResponse = self
            .send(
                self.request(Method::PUT, &format!("/api/projects/{}", id))
                    .json(&payload),
            )
            .await?;
        Ok(updated.project)
    }

    async fn delete_project(&self, id: Uuid) -> Result<(), ClientError> {
        let _: DeletedResponse = self
            .send(self.request(Method::DELETE, &format!("/api/projects/{}", id)))
            .await?;
        Ok(())
    }

    async fn list_donations(&self, project_id: Uuid) -> Result<DonationListResponse, ClientError> {
        self.send(self.request(Method::GET, &format!("/api/projects/{}/donations", project_id)))
            .await
    }

    async fn create_donation(&self, request: DonationRequest) -> Result<DonationReceipt, ClientError> {
        self.send(self.request(Method::POST, "/api/donations").json(&request))
            .await
    }

    async fn upload_image(&self, content_type: &str, bytes: Vec<u8>) -> Result<UploadResponse, ClientError> {
        self.send(
            self.request(Method::POST, "/api/upload")
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(bytes),
        )
        .await
    }

    async fn payment_directory(&self) -> Result<PaymentDirectory, ClientError> {
        let list: PaymentDetailsListResponse = self
            .send(
                self.request(Method::GET, "/api/payment-details")
                    .query(&[("active", "true")]),
            )
            .await?;
        Ok(PaymentDirectory::from_records(&list.payment_details))
    }

    async fn stats(&self) -> Result<StatsResponse, ClientError> {
        self.send(self.request(Method::GET, "/api/stats")).await
    }
}
