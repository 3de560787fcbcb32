//! # API Response Models
//!
//! Structures for outgoing API response bodies.
//! All responses are wrapped in a standard format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{DonationRecord, PaymentDetailsRecord, ProjectRecord};
use crate::services::PaymentInstructions;
use crate::utils::{format_usd, Money};

/// Standard API response wrapper.
///
/// ## Success Response
///
/// ```json
/// {
///     "success": true,
///     "data": { ... },
///     "error": null
/// }
/// ```
///
/// ## Error Response
///
/// ```json
/// {
///     "success": false,
///     "data": null,
///     "error": {
///         "code": "VALIDATION_ERROR",
///         "message": "Title is required"
///     }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the request was successful.
    pub success: bool,

    /// Response data (null on error).
    pub data: Option<T>,

    /// Error information (null on success).
    pub error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response with data.
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(code: &str, message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.to_string(),
                message: message.to_string(),
            }),
        }
    }
}

/// API error information.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Error code (e.g., "VALIDATION_ERROR").
    pub code: String,

    /// Human-readable error message.
    pub message: String,
}

/// A project as returned by the API, with its progress precomputed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    #[serde(flatten)]
    pub project: ProjectRecord,

    /// `min(current / target, 1) * 100`.
    pub progress_percent: f64,

    /// e.g. "$423,000".
    pub formatted_current: String,

    /// e.g. "$600,000".
    pub formatted_target: String,
}

impl From<ProjectRecord> for ProjectResponse {
    fn from(project: ProjectRecord) -> Self {
        Self {
            progress_percent: project.progress_percent(),
            formatted_current: format_usd(project.current_amount),
            formatted_target: format_usd(project.target_amount),
            project,
        }
    }
}

/// `GET /api/projects`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListResponse {
    pub projects: Vec<ProjectResponse>,
    pub total: usize,
}

/// `GET /api/projects/{id}/donations`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationListResponse {
    pub project_id: Uuid,
    pub donations: Vec<DonationRecord>,

    /// Sum of all listed donations.
    pub total_amount: Money,

    /// Number of listed donations.
    pub total_donors: usize,
}

impl DonationListResponse {
    pub fn new(project_id: Uuid, donations: Vec<DonationRecord>) -> Self {
        let total_amount = donations
            .iter()
            .fold(Money::ZERO, |acc, d| acc.saturating_add(d.amount));
        Self {
            project_id,
            total_donors: donations.len(),
            total_amount,
            donations,
        }
    }
}

/// `POST /api/donations`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DonationReceipt {
    pub donation: DonationRecord,

    /// What the donor has to do next to complete the payment.
    pub instructions: PaymentInstructions,

    pub message: String,
}

/// `GET /api/payment-details`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetailsListResponse {
    pub payment_details: Vec<PaymentDetailsRecord>,
}

/// `POST /api/upload`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Reference to store in a project's `imageUrl`.
    pub url: String,
    pub size: usize,
    pub content_type: String,
}

/// `GET /api/stats`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_collected: Money,

    /// e.g. "$2,908,323,356".
    pub formatted_total: String,

    pub donation_count: i64,
    pub project_count: i64,
    pub timestamp: DateTime<Utc>,
}

/// `DELETE` endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    pub id: Uuid,
    pub deleted: bool,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// "healthy" or "unhealthy".
    pub status: String,

    /// Store reachable.
    pub database: bool,

    /// Active WebSocket connections.
    pub ws_connections: usize,

    pub version: String,
    pub timestamp: DateTime<Utc>,
}
