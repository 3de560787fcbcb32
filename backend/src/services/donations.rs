//! # Donation Service
//!
//! Accepts public donation submissions and serves the admin panel's
//! per-project donor lists.
//!
//! ## Flow: Submit Donation
//!
//! ```text
//! 1. Public donation form posts a DonationRequest
//!                ↓
//! 2. validate (name, email, amount > 0, payment method, project id)
//!                ↓
//! 3. ask the PaymentGateway for payment instructions (may fail → 502)
//!                ↓
//! 4. insert donation record
//!                ↓
//! 5. linked project? → add amount to its current_amount
//!                ↓
//! 6. return DonationReceipt
//! ```
//!
//! A gateway failure records nothing. Steps 4 and 5 are not transactional.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use super::payment_gateway::PaymentGateway;
use super::{optional_text, required_text, ServiceError};
use crate::db::{DocumentStore, DonationRecord, DonationTotals, PaymentMethod};
use crate::models::{DonationReceipt, DonationRequest, StatsResponse};
use crate::utils::{format_usd, Money};

/// Donation fields after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidDonation {
    pub project_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub amount: Money,
    pub payment_method: PaymentMethod,
    pub message: String,
}

/// Validate a public donation submission.
///
/// Does not check that the project exists; see [`DonationService::create`].
pub fn validate_donation(request: DonationRequest) -> Result<ValidDonation, ServiceError> {
    let name = required_text(request.name, "Full name")?;

    let email = required_text(request.email, "Email address")?;
    if !is_plausible_email(&email) {
        return Err(ServiceError::validation("Email address is invalid"));
    }

    let amount = request
        .amount
        .ok_or_else(|| ServiceError::validation("Amount is required"))?;
    if !amount.is_positive() {
        return Err(ServiceError::validation("Amount must be greater than 0"));
    }

    let payment_method = required_text(request.payment_method, "Payment method")
        .map_err(|_| ServiceError::validation("Please select a payment method"))?
        .parse::<PaymentMethod>()
        .map_err(ServiceError::Validation)?;

    let project_id = match request.project_id.as_deref().map(str::trim) {
        None | Some("") | Some("general") => None,
        Some(raw) => Some(
            Uuid::parse_str(raw)
                .map_err(|_| ServiceError::validation(format!("Invalid project id: {}", raw)))?,
        ),
    };

    Ok(ValidDonation {
        project_id,
        name,
        email,
        phone: optional_text(request.phone),
        amount,
        payment_method,
        message: optional_text(request.message),
    })
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Service for recording and reading donations.
#[derive(Clone)]
pub struct DonationService {
    store: Arc<dyn DocumentStore>,
    gateway: Arc<dyn PaymentGateway>,
}

impl DonationService {
    pub fn new(store: Arc<dyn DocumentStore>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { store, gateway }
    }

    /// Record a donation and return what the donor must do next.
    pub async fn create(&self, request: DonationRequest) -> Result<DonationReceipt, ServiceError> {
        let valid = validate_donation(request)?;

        if let Some(project_id) = valid.project_id {
            if self.store.get_project(project_id).await?.is_none() {
                return Err(ServiceError::not_found("Project", project_id));
            }
        }

        let donation = DonationRecord {
            id: Uuid::new_v4(),
            project_id: valid.project_id,
            name: valid.name,
            email: valid.email,
            phone: valid.phone,
            amount: valid.amount,
            payment_method: valid.payment_method,
            message: valid.message,
            created_at: Utc::now(),
        };

        let instructions = self.gateway.instructions(&donation).await?;

        self.store.insert_donation(&donation).await?;

        if let Some(project_id) = donation.project_id {
            if !self.store.add_to_project_amount(project_id, donation.amount).await? {
                warn!("Project {} disappeared before its total was updated", project_id);
            }
        }

        info!(
            "💝 Donation {} recorded: {} via {} ({})",
            donation.id,
            format_usd(donation.amount),
            donation.payment_method,
            donation
                .project_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "general fund".to_string()),
        );

        Ok(DonationReceipt {
            message: "Thank you for your donation!".to_string(),
            donation,
            instructions,
        })
    }

    /// Donations for a project, newest first. Unknown projects yield an
    /// empty list.
    pub async fn list_for_project(&self, project_id: Uuid) -> Result<Vec<DonationRecord>, ServiceError> {
        Ok(self.store.list_project_donations(project_id).await?)
    }

    pub async fn totals(&self) -> Result<DonationTotals, ServiceError> {
        Ok(self.store.donation_totals().await?)
    }

    /// Site-wide numbers for `/api/stats` and the live counter.
    pub async fn stats(&self) -> Result<StatsResponse, ServiceError> {
        let totals = self.totals().await?;
        let project_count = self.store.count_projects().await?;
        Ok(StatsResponse {
            total_collected: totals.total_amount,
            formatted_total: format_usd(totals.total_amount),
            donation_count: totals.donation_count,
            project_count,
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{ProjectPayload, ProjectQuery};
    use crate::services::{OfflineGateway, PaymentInstructions, ProjectService};
    use async_trait::async_trait;

    struct DownGateway;

    #[async_trait]
    impl PaymentGateway for DownGateway {
        async fn instructions(&self, _: &DonationRecord) -> Result<PaymentInstructions, ServiceError> {
            Err(ServiceError::Gateway("processor unavailable".to_string()))
        }
    }

    fn services() -> (ProjectService, DonationService) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let gateway = Arc::new(OfflineGateway::new(store.clone()));
        (
            ProjectService::new(store.clone()),
            DonationService::new(store, gateway),
        )
    }

    fn request(project_id: Option<String>) -> DonationRequest {
        DonationRequest {
            project_id,
            name: Some("Jane Doe".to_string()),
            email: Some("jane@example.org".to_string()),
            phone: None,
            amount: Some(Money::from_units(100)),
            payment_method: Some("bank".to_string()),
            message: Some("Keep going".to_string()),
        }
    }

    #[test]
    fn test_validate_donation() {
        let valid = validate_donation(request(Some("general".to_string()))).unwrap();
        assert_eq!(valid.project_id, None);
        assert_eq!(valid.payment_method, PaymentMethod::Bank);
        assert_eq!(valid.phone, "");

        let err = validate_donation(DonationRequest {
            payment_method: None,
            ..request(None)
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Please select a payment method");

        let err = validate_donation(DonationRequest {
            amount: Some(Money::ZERO),
            ..request(None)
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Amount must be greater than 0");

        let err = validate_donation(DonationRequest {
            email: Some("not-an-email".to_string()),
            ..request(None)
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Email address is invalid");
    }

    #[tokio::test]
    async fn test_donation_accumulates_into_project() {
        let (projects, donations) = services();
        let project = projects
            .create(ProjectPayload {
                title: Some("Clean Water".to_string()),
                category: Some("Community Development".to_string()),
                description: Some("Wells".to_string()),
                image_url: Some("/uploads/water.jpg".to_string()),
                target_amount: Some(Money::from_units(600_000)),
                current_amount: Some(Money::from_units(423_000)),
                status: None,
            })
            .await
            .unwrap();

        let receipt = donations
            .create(request(Some(project.id.to_string())))
            .await
            .unwrap();
        assert!(matches!(receipt.instructions, PaymentInstructions::BankTransfer { .. }));

        let updated = projects.get(project.id).await.unwrap();
        assert_eq!(updated.current_amount, Money::from_units(423_100));

        let listed = donations.list_for_project(project.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, receipt.donation.id);
    }

    #[tokio::test]
    async fn test_general_fund_and_totals() {
        let (projects, donations) = services();
        donations.create(request(None)).await.unwrap();
        donations.create(request(Some("general".to_string()))).await.unwrap();

        let totals = donations.totals().await.unwrap();
        assert_eq!(totals.donation_count, 2);
        assert_eq!(totals.total_amount, Money::from_units(200));
        assert!(projects.list(&ProjectQuery::default()).await.unwrap().is_empty());

        let stats = donations.stats().await.unwrap();
        assert_eq!(stats.formatted_total, "$200");
        assert_eq!(stats.project_count, 0);
    }

    #[tokio::test]
    async fn test_unknown_project_rejected() {
        let (_, donations) = services();
        let result = donations
            .create(request(Some(Uuid::new_v4().to_string())))
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound { .. })));
        assert_eq!(donations.totals().await.unwrap().donation_count, 0);
    }

    #[tokio::test]
    async fn test_gateway_failure_records_nothing() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let projects = ProjectService::new(store.clone());
        let donations = DonationService::new(store.clone(), Arc::new(DownGateway));
        let project = projects
            .create(ProjectPayload {
                title: Some("Clean Water".to_string()),
                category: Some("Community Development".to_string()),
                description: Some("Wells".to_string()),
                image_url: Some("/uploads/water.jpg".to_string()),
                target_amount: Some(Money::from_units(600_000)),
                current_amount: Some(Money::from_units(423_000)),
                status: None,
            })
            .await
            .unwrap();

        let err = donations
            .create(request(Some(project.id.to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Gateway(_)));

        assert_eq!(donations.totals().await.unwrap().donation_count, 0);
        assert!(donations.list_for_project(project.id).await.unwrap().is_empty());
        assert_eq!(
            projects.get(project.id).await.unwrap().current_amount,
            Money::from_units(423_000)
        );
    }
}
