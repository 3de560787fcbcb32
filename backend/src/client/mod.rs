//! # API Client
//!
//! The admin panel and the donation flow talk to the backend only
//! through [`DonationApi`]. Two implementations:
//!
//! | Client | Transport |
//! |--------|-----------|
//! | [`HttpClient`] | `reqwest` against a running server |
//! | [`LocalClient`] | direct calls into an [`AppState`](crate::AppState) |

pub mod http;
pub mod local;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::db::ProjectRecord;
use crate::models::{
    DonationListResponse, DonationReceipt, DonationRequest, ProjectPayload, ProjectQuery,
    StatsResponse, UploadResponse,
};
use crate::services::PaymentDirectory;

pub use http::HttpClient;
pub use local::LocalClient;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with an error envelope.
    #[error("{code} ({status}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// The request never got a response.
    #[error("Request failed: {0}")]
    Transport(String),

    /// The response was not the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Message the server wants shown to the user, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

/// Operations the site's front ends need from the backend.
#[async_trait]
pub trait DonationApi: Send + Sync {
    async fn list_projects(&self, query: &ProjectQuery) -> Result<Vec<ProjectRecord>, ClientError>;

    async fn create_project(&self, payload: ProjectPayload) -> Result<ProjectRecord, ClientError>;

    async fn update_project(&self, id: Uuid, payload: ProjectPayload) -> Result<ProjectRecord, ClientError>;

    async fn delete_project(&self, id: Uuid) -> Result<(), ClientError>;

    async fn list_donations(&self, project_id: Uuid) -> Result<DonationListResponse, ClientError>;

    async fn create_donation(&self, request: DonationRequest) -> Result<DonationReceipt, ClientError>;

    async fn upload_image(&self, content_type: &str, bytes: Vec<u8>) -> Result<UploadResponse, ClientError>;

    /// Receiving accounts for the bank and crypto views.
    async fn payment_directory(&self) -> Result<PaymentDirectory, ClientError>;

    async fn stats(&self) -> Result<StatsResponse, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message() {
        let err = ClientError::Api {
            status: 400,
            code: "VALIDATION_ERROR".into(),
            message: "Title is required".into(),
        };
        assert_eq!(err.server_message(), Some("Title is required"));
        assert_eq!(ClientError::Transport("refused".into()).server_message(), None);
    }
}
