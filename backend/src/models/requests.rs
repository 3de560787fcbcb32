//! # API Request Models
//!
//! Structures for incoming API request bodies.
//! Each struct represents the expected JSON body for an endpoint.
//!
//! Request bodies are deliberately loose: required fields are `Option`s
//! and enums arrive as strings, so the services can answer with a
//! readable validation message instead of a serde error.

use serde::{Deserialize, Serialize};

use crate::utils::Money;

/// Body of `POST /api/projects` and `PUT /api/projects/{id}`.
///
/// ## Example JSON
///
/// ```json
/// {
///     "title": "Clean Water Access Program",
///     "category": "Community Development",
///     "description": "Installing clean water systems...",
///     "imageUrl": "/uploads/4f1c...e2.jpg",
///     "targetAmount": "600000",
///     "currentAmount": 423000,
///     "status": "active"
/// }
/// ```
///
/// Amounts may be numbers or numeric strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPayload {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub target_amount: Option<Money>,

    /// Defaults to 0.
    pub current_amount: Option<Money>,

    /// `active` (default) or `completed`.
    pub status: Option<String>,
}

/// Body of `POST /api/donations`.
///
/// ## Example JSON
///
/// ```json
/// {
///     "projectId": "6f9619ff-8b86-d011-b42d-00cf4fc964ff",
///     "name": "Jane Doe",
///     "email": "jane@example.org",
///     "amount": "50",
///     "paymentMethod": "bank",
///     "message": "Keep going!"
/// }
/// ```
///
/// `projectId` may be omitted, `null` or `"general"` for the general fund.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DonationRequest {
    pub project_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub amount: Option<Money>,
    pub payment_method: Option<String>,
    pub message: Option<String>,
}

/// Body of `POST /api/payment-details` and `PUT /api/payment-details/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetailsPayload {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub currency: Option<String>,
    pub account_name: Option<String>,
    pub account_number: Option<String>,
    pub routing_number: Option<String>,
    pub bank_name: Option<String>,
    pub swift: Option<String>,
    pub iban: Option<String>,
    pub wallet_address: Option<String>,
    pub network: Option<String>,
    pub is_active: Option<bool>,
}

/// Query parameters for `GET /api/projects`.
///
/// ```text
/// GET /api/projects?status=active&category=Medical%20Aid
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectQuery {
    pub status: Option<String>,
    pub category: Option<String>,
}

/// Query parameters for `GET /api/payment-details`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetailsQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,

    /// Only active records. Default: false.
    #[serde(default)]
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_payload_coerces_amounts() {
        let payload: ProjectPayload = serde_json::from_str(
            r#"{"title":"Clean Water","targetAmount":"600000","currentAmount":423000}"#,
        )
        .unwrap();
        assert_eq!(payload.target_amount, Some(Money::from_units(600_000)));
        assert_eq!(payload.current_amount, Some(Money::from_units(423_000)));
        assert!(payload.category.is_none());
    }

    #[test]
    fn test_payment_details_query_defaults() {
        let query: PaymentDetailsQuery = serde_json::from_str(r#"{"type":"bank"}"#).unwrap();
        assert_eq!(query.kind.as_deref(), Some("bank"));
        assert!(!query.active);
    }
}
