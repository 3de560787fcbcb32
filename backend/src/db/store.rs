//! # Document Store Trait
//!
//! The services never talk to PostgreSQL directly; they hold an
//! `Arc<dyn DocumentStore>`. Two backends implement it:
//!
//! | Backend | Type | Used for |
//! |---------|------|----------|
//! | PostgreSQL | [`Database`](super::Database) | production |
//! | In-memory | [`MemoryStore`](super::MemoryStore) | tests, local demo |
//!
//! Missing documents are reported as `Ok(None)` / `Ok(false)`, never as
//! errors. Callers decide whether "not found" matters.

use async_trait::async_trait;
use uuid::Uuid;

use super::models::*;
use super::DatabaseError;
use crate::utils::Money;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Cheap connectivity check used by `/health`.
    async fn ping(&self) -> Result<(), DatabaseError>;

    // ---- projects ----

    /// Projects matching `filter`, newest first.
    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<ProjectRecord>, DatabaseError>;

    async fn get_project(&self, id: Uuid) -> Result<Option<ProjectRecord>, DatabaseError>;

    async fn insert_project(&self, project: &ProjectRecord) -> Result<(), DatabaseError>;

    /// Replace the editable fields of an existing project.
    /// `created_at` is never changed. Returns `false` if the id is unknown.
    async fn update_project(&self, project: &ProjectRecord) -> Result<bool, DatabaseError>;

    async fn delete_project(&self, id: Uuid) -> Result<bool, DatabaseError>;

    /// Add `amount` to a project's `current_amount`.
    async fn add_to_project_amount(&self, id: Uuid, amount: Money) -> Result<bool, DatabaseError>;

    async fn count_projects(&self) -> Result<i64, DatabaseError>;

    // ---- donations ----

    async fn insert_donation(&self, donation: &DonationRecord) -> Result<(), DatabaseError>;

    /// Donations for one project, newest first.
    async fn list_project_donations(&self, project_id: Uuid) -> Result<Vec<DonationRecord>, DatabaseError>;

    async fn donation_totals(&self) -> Result<DonationTotals, DatabaseError>;

    // ---- payment details ----

    async fn list_payment_details(
        &self,
        filter: &PaymentDetailsFilter,
    ) -> Result<Vec<PaymentDetailsRecord>, DatabaseError>;

    async fn get_payment_details(&self, id: Uuid) -> Result<Option<PaymentDetailsRecord>, DatabaseError>;

    async fn insert_payment_details(&self, details: &PaymentDetailsRecord) -> Result<(), DatabaseError>;

    async fn update_payment_details(&self, details: &PaymentDetailsRecord) -> Result<bool, DatabaseError>;

    async fn delete_payment_details(&self, id: Uuid) -> Result<bool, DatabaseError>;
}
