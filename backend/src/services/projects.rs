//! # Project Service
//!
//! CRUD over fundraising projects, used by the admin panel.
//!
//! ## Validation
//!
//! Create and update take the same [`ProjectPayload`]. Required:
//!
//! | Field | Rule |
//! |-------|------|
//! | `title` | non-empty |
//! | `category` | one of the five site categories |
//! | `description` | non-empty |
//! | `imageUrl` | non-empty |
//! | `targetAmount` | present, not negative |
//!
//! `currentAmount` defaults to 0 and `status` to `active`. Numeric
//! fields are coerced from strings by [`Money`]'s deserializer.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::{required_text, ServiceError};
use crate::db::{Category, DocumentStore, ProjectFilter, ProjectRecord, ProjectStatus};
use crate::models::{ProjectPayload, ProjectQuery};
use crate::utils::Money;

/// Project fields after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidProject {
    pub title: String,
    pub category: Category,
    pub description: String,
    pub image_url: String,
    pub target_amount: Money,
    pub current_amount: Money,
    pub status: ProjectStatus,
}

/// Validate an admin form submission.
pub fn validate_project(payload: ProjectPayload) -> Result<ValidProject, ServiceError> {
    let title = required_text(payload.title, "Title")?;
    let category = required_text(payload.category, "Category")?
        .parse::<Category>()
        .map_err(ServiceError::Validation)?;
    let description = required_text(payload.description, "Description")?;
    let image_url = required_text(payload.image_url, "Image URL")?;

    let target_amount = payload
        .target_amount
        .ok_or_else(|| ServiceError::validation("Target amount is required"))?;
    if target_amount.is_negative() {
        return Err(ServiceError::validation("Target amount cannot be negative"));
    }

    let current_amount = payload.current_amount.unwrap_or(Money::ZERO);
    if current_amount.is_negative() {
        return Err(ServiceError::validation("Current amount cannot be negative"));
    }

    let status = match payload.status.as_deref().map(str::trim) {
        None | Some("") => ProjectStatus::default(),
        Some(s) => s.parse().map_err(ServiceError::Validation)?,
    };

    Ok(ValidProject {
        title,
        category,
        description,
        image_url,
        target_amount,
        current_amount,
        status,
    })
}

/// Turn list query parameters into a store filter.
pub fn parse_filter(query: &ProjectQuery) -> Result<ProjectFilter, ServiceError> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<ProjectStatus>)
        .transpose()
        .map_err(ServiceError::Validation)?;
    let category = query
        .category
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<Category>)
        .transpose()
        .map_err(ServiceError::Validation)?;
    Ok(ProjectFilter { status, category })
}

/// Service for managing projects.
#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn DocumentStore>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// All projects matching the query, newest first.
    pub async fn list(&self, query: &ProjectQuery) -> Result<Vec<ProjectRecord>, ServiceError> {
        let filter = parse_filter(query)?;
        Ok(self.store.list_projects(&filter).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<ProjectRecord, ServiceError> {
        self.store
            .get_project(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project", id))
    }

    /// Create a project from an admin form submission.
    pub async fn create(&self, payload: ProjectPayload) -> Result<ProjectRecord, ServiceError> {
        let valid = validate_project(payload)?;
        let now = Utc::now();

        let project = ProjectRecord {
            id: Uuid::new_v4(),
            title: valid.title,
            category: valid.category,
            description: valid.description,
            image_url: valid.image_url,
            target_amount: valid.target_amount,
            current_amount: valid.current_amount,
            status: valid.status,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_project(&project).await?;
        info!("📁 Project created: {} ({})", project.title, project.id);
        Ok(project)
    }

    /// Replace a project's editable fields.
    pub async fn update(&self, id: Uuid, payload: ProjectPayload) -> Result<ProjectRecord, ServiceError> {
        let valid = validate_project(payload)?;
        let existing = self.get(id).await?;

        let project = ProjectRecord {
            title: valid.title,
            category: valid.category,
            description: valid.description,
            image_url: valid.image_url,
            target_amount: valid.target_amount,
            current_amount: valid.current_amount,
            status: valid.status,
            updated_at: Utc::now(),
            ..existing
        };

        if !self.store.update_project(&project).await? {
            // deleted between the read and the write
            return Err(ServiceError::not_found("Project", id));
        }

        info!("✏️  Project updated: {} ({})", project.title, project.id);
        Ok(project)
    }

    /// Delete a project. Donations referencing it are kept.
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        if !self.store.delete_project(id).await? {
            return Err(ServiceError::not_found("Project", id));
        }
        info!("🗑️  Project deleted: {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn clean_water() -> ProjectPayload {
        ProjectPayload {
            title: Some("Clean Water".to_string()),
            category: Some("Community Development".to_string()),
            description: Some("Installing clean water systems".to_string()),
            image_url: Some("https://images.example.org/water.jpg".to_string()),
            target_amount: Some(Money::from_units(600_000)),
            current_amount: Some(Money::from_units(423_000)),
            status: None,
        }
    }

    fn service() -> ProjectService {
        ProjectService::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_validate_requires_fields() {
        for (payload, expected) in [
            (ProjectPayload { title: None, ..clean_water() }, "Title is required"),
            (ProjectPayload { category: None, ..clean_water() }, "Category is required"),
            (ProjectPayload { description: Some(" ".into()), ..clean_water() }, "Description is required"),
            (ProjectPayload { image_url: None, ..clean_water() }, "Image URL is required"),
            (ProjectPayload { target_amount: None, ..clean_water() }, "Target amount is required"),
        ] {
            let err = validate_project(payload).unwrap_err();
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn test_validate_rejects_unknown_category_and_negative_amounts() {
        let err = validate_project(ProjectPayload {
            category: Some("Sports".into()),
            ..clean_water()
        })
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = validate_project(ProjectPayload {
            current_amount: Some(Money::from_units(-1)),
            ..clean_water()
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Current amount cannot be negative");
    }

    #[test]
    fn test_validate_defaults() {
        let valid = validate_project(ProjectPayload {
            current_amount: None,
            ..clean_water()
        })
        .unwrap();
        assert_eq!(valid.current_amount, Money::ZERO);
        assert_eq!(valid.status, ProjectStatus::Active);
    }

    #[tokio::test]
    async fn test_create_adds_exactly_one_project() {
        let service = service();
        let created = service.create(clean_water()).await.unwrap();

        let all = service.list(&ProjectQuery::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, created.id);
        assert_eq!(created.progress_label(), 70);
    }

    #[tokio::test]
    async fn test_update_keeps_identity() {
        let service = service();
        let created = service.create(clean_water()).await.unwrap();

        let updated = service
            .update(
                created.id,
                ProjectPayload {
                    status: Some("completed".into()),
                    current_amount: Some(Money::from_units(600_000)),
                    ..clean_water()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.status, ProjectStatus::Completed);
        assert_eq!(updated.progress_label(), 100);
    }

    #[tokio::test]
    async fn test_delete_removes_from_list() {
        let service = service();
        let keep = service.create(clean_water()).await.unwrap();
        let gone = service.create(clean_water()).await.unwrap();

        service.delete(gone.id).await.unwrap();

        let ids: Vec<Uuid> = service
            .list(&ProjectQuery::default())
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![keep.id]);
        assert!(matches!(
            service.delete(gone.id).await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let service = service();
        service.create(clean_water()).await.unwrap();
        service
            .create(ProjectPayload {
                status: Some("completed".into()),
                ..clean_water()
            })
            .await
            .unwrap();

        let query = ProjectQuery {
            status: Some("completed".into()),
            category: None,
        };
        let completed = service.list(&query).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].status, ProjectStatus::Completed);

        let bad = ProjectQuery {
            status: Some("archived".into()),
            category: None,
        };
        assert!(matches!(service.list(&bad).await, Err(ServiceError::Validation(_))));
    }
}
