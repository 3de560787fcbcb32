//! In-memory [`DocumentStore`] backend.
//!
//! Keeps every collection in a `tokio::sync::RwLock`. Used by the test
//! suites and by `STORE_BACKEND=memory` for running the site without
//! PostgreSQL. Nothing is persisted across restarts.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::*;
use super::store::DocumentStore;
use super::DatabaseError;
use crate::utils::Money;

#[derive(Default)]
pub struct MemoryStore {
    projects: RwLock<HashMap<Uuid, ProjectRecord>>,
    donations: RwLock<Vec<DonationRecord>>,
    payment_details: RwLock<HashMap<Uuid, PaymentDetailsRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<ProjectRecord>, DatabaseError> {
        let projects = self.projects.read().await;
        let mut out: Vec<ProjectRecord> = projects
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn get_project(&self, id: Uuid) -> Result<Option<ProjectRecord>, DatabaseError> {
        Ok(self.projects.read().await.get(&id).cloned())
    }

    async fn insert_project(&self, project: &ProjectRecord) -> Result<(), DatabaseError> {
        self.projects.write().await.insert(project.id, project.clone());
        Ok(())
    }

    async fn update_project(&self, project: &ProjectRecord) -> Result<bool, DatabaseError> {
        let mut projects = self.projects.write().await;
        match projects.get_mut(&project.id) {
            Some(existing) => {
                let created_at = existing.created_at;
                *existing = project.clone();
                existing.created_at = created_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.projects.write().await.remove(&id).is_some())
    }

    async fn add_to_project_amount(&self, id: Uuid, amount: Money) -> Result<bool, DatabaseError> {
        let mut projects = self.projects.write().await;
        match projects.get_mut(&id) {
            Some(project) => {
                project.current_amount = project.current_amount.saturating_add(amount);
                project.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_projects(&self) -> Result<i64, DatabaseError> {
        Ok(self.projects.read().await.len() as i64)
    }

    async fn insert_donation(&self, donation: &DonationRecord) -> Result<(), DatabaseError> {
        self.donations.write().await.push(donation.clone());
        Ok(())
    }

    async fn list_project_donations(&self, project_id: Uuid) -> Result<Vec<DonationRecord>, DatabaseError> {
        let donations = self.donations.read().await;
        let mut out: Vec<DonationRecord> = donations
            .iter()
            .filter(|d| d.project_id == Some(project_id))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn donation_totals(&self) -> Result<DonationTotals, DatabaseError> {
        let donations = self.donations.read().await;
        let total_amount = donations
            .iter()
            .fold(Money::ZERO, |acc, d| acc.saturating_add(d.amount));
        Ok(DonationTotals {
            total_amount,
            donation_count: donations.len() as i64,
        })
    }

    async fn list_payment_details(
        &self,
        filter: &PaymentDetailsFilter,
    ) -> Result<Vec<PaymentDetailsRecord>, DatabaseError> {
        let details = self.payment_details.read().await;
        let mut out: Vec<PaymentDetailsRecord> = details
            .values()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(out)
    }

    async fn get_payment_details(&self, id: Uuid) -> Result<Option<PaymentDetailsRecord>, DatabaseError> {
        Ok(self.payment_details.read().await.get(&id).cloned())
    }

    async fn insert_payment_details(&self, details: &PaymentDetailsRecord) -> Result<(), DatabaseError> {
        self.payment_details
            .write()
            .await
            .insert(details.id, details.clone());
        Ok(())
    }

    async fn update_payment_details(&self, details: &PaymentDetailsRecord) -> Result<bool, DatabaseError> {
        let mut all = self.payment_details.write().await;
        match all.get_mut(&details.id) {
            Some(existing) => {
                let created_at = existing.created_at;
                *existing = details.clone();
                existing.created_at = created_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_payment_details(&self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.payment_details.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn project(title: &str, age_minutes: i64) -> ProjectRecord {
        let created = Utc::now() - Duration::minutes(age_minutes);
        ProjectRecord {
            id: Uuid::new_v4(),
            title: title.to_string(),
            category: Category::MedicalAid,
            description: "desc".to_string(),
            image_url: "/uploads/a.png".to_string(),
            target_amount: Money::from_units(1_000),
            current_amount: Money::ZERO,
            status: ProjectStatus::Active,
            created_at: created,
            updated_at: created,
        }
    }

    #[tokio::test]
    async fn test_projects_listed_newest_first() {
        let store = MemoryStore::new();
        store.insert_project(&project("old", 10)).await.unwrap();
        store.insert_project(&project("new", 1)).await.unwrap();

        let titles: Vec<String> = store
            .list_projects(&ProjectFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_update_keeps_created_at() {
        let store = MemoryStore::new();
        let original = project("a", 30);
        store.insert_project(&original).await.unwrap();

        let mut edited = original.clone();
        edited.title = "b".to_string();
        edited.created_at = Utc::now();
        assert!(store.update_project(&edited).await.unwrap());

        let stored = store.get_project(original.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "b");
        assert_eq!(stored.created_at, original.created_at);
    }

    #[tokio::test]
    async fn test_missing_documents_are_not_errors() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        assert!(store.get_project(id).await.unwrap().is_none());
        assert!(!store.delete_project(id).await.unwrap());
        assert!(!store.add_to_project_amount(id, Money::from_units(5)).await.unwrap());
        assert!(store.list_project_donations(id).await.unwrap().is_empty());
    }
}
