//! # Services Module
//!
//! This module contains the business logic of the donation site.
//! Each service handles a specific domain and only talks to the
//! store through the [`DocumentStore`](crate::db::DocumentStore) trait.
//!
//! ## Services Overview
//!
//! | Service | Responsibility |
//! |---------|---------------|
//! | `ProjectService` | Project CRUD, validation, numeric coercion |
//! | `DonationService` | Donation intake, per-project listings, totals |
//! | `PaymentDetailsService` | Receiving bank accounts / crypto wallets |
//! | `UploadService` | Project image storage |
//! | `PaymentGateway` | External payment processing seam |
//! | `StatsBroadcaster` | Periodic "total collected" pushes |
//!
//! ## Service Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        SERVICES LAYER                            │
//! │                                                                  │
//! │  ┌──────────────┐  ┌───────────────┐  ┌──────────────────────┐  │
//! │  │ProjectService│  │DonationService│──│ PaymentGateway       │  │
//! │  └──────────────┘  └───────────────┘  │ (OfflineGateway)     │  │
//! │         │                 │           └──────────────────────┘  │
//! │         └────────┬────────┘                      │               │
//! │                  ▼                               ▼               │
//! │          Arc<dyn DocumentStore>  ◄───── PaymentDirectory        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod donations;
pub mod payment_details;
pub mod payment_directory;
pub mod payment_gateway;
pub mod projects;
pub mod stats_broadcaster;
pub mod uploads;

use thiserror::Error;

use crate::db::DatabaseError;

pub use donations::DonationService;
pub use payment_details::PaymentDetailsService;
pub use payment_directory::{BankAccount, CryptoWallet, PaymentDirectory};
pub use payment_gateway::{OfflineGateway, PaymentGateway, PaymentInstructions};
pub use projects::ProjectService;
pub use stats_broadcaster::StatsBroadcaster;
pub use uploads::{UploadError, UploadService};

/// Errors shared by all services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was understood but a field is missing or invalid.
    /// The message is safe to show to the user.
    #[error("{0}")]
    Validation(String),

    /// The addressed document does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The store failed. Details are logged, not shown.
    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),

    /// The payment gateway failed.
    #[error("Payment gateway error: {0}")]
    Gateway(String),

    /// A live update could not be published.
    #[error("Broadcast error: {0}")]
    Broadcast(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ServiceError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Trimmed, non-empty value of a required text field.
pub(crate) fn required_text(value: Option<String>, label: &str) -> Result<String, ServiceError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ServiceError::validation(format!("{} is required", label)))
}

/// Trimmed value of an optional text field, empty when absent.
pub(crate) fn optional_text(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert_eq!(required_text(Some("  Title ".into()), "Title").unwrap(), "Title");
        let err = required_text(Some("   ".into()), "Title").unwrap_err();
        assert_eq!(err.to_string(), "Title is required");
        assert!(required_text(None, "Email").is_err());
    }

    #[test]
    fn test_not_found_message() {
        let err = ServiceError::not_found("Project", "abc");
        assert_eq!(err.to_string(), "Project not found: abc");
    }
}
