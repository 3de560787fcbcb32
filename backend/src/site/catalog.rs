//! Projects shown on the donate page.
//!
//! The built-in catalog holds the site's six launch projects under fixed
//! ids (`00000000-0000-0000-0000-000000000001` … `…0006`), so links like
//! `/donate?project=<id>` stay stable. A live catalog is loaded from the
//! API with [`Catalog::load`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::client::{ClientError, DonationApi};
use crate::db::{Category, DocumentStore, DatabaseError, ProjectRecord, ProjectStatus};
use crate::models::ProjectQuery;
use crate::utils::{format_usd, Money};

/// What a project card displays.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCard {
    pub id: Uuid,
    pub title: String,
    pub category: Category,
    pub description: String,
    pub image_url: String,
    pub status: ProjectStatus,
    /// Bar width, clamped to 100.
    pub progress_percent: f64,
    /// e.g. "70% funded".
    pub progress_label: String,
    /// e.g. "$423,000".
    pub raised: String,
    /// e.g. "$600,000".
    pub goal: String,
}

impl From<&ProjectRecord> for ProjectCard {
    fn from(project: &ProjectRecord) -> Self {
        Self {
            id: project.id,
            title: project.title.clone(),
            category: project.category,
            description: project.description.clone(),
            image_url: project.image_url.clone(),
            status: project.status,
            progress_percent: project.progress_percent(),
            progress_label: format!("{}% funded", project.progress_label()),
            raised: format_usd(project.current_amount),
            goal: format_usd(project.target_amount),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    projects: Vec<ProjectRecord>,
}

impl Catalog {
    pub fn new(projects: Vec<ProjectRecord>) -> Self {
        Self { projects }
    }

    /// Fetch the current project list from the backend.
    pub async fn load<C: DonationApi + ?Sized>(client: &C) -> Result<Self, ClientError> {
        let projects = client.list_projects(&ProjectQuery::default()).await?;
        Ok(Self::new(projects))
    }

    /// The six launch projects.
    pub fn builtin() -> Self {
        let launched: DateTime<Utc> = DateTime::from_timestamp(1_735_689_600, 0).unwrap_or_default();
        let entry = |n: u128,
                     title: &str,
                     category: Category,
                     description: &str,
                     image: &str,
                     target: i64,
                     current: i64,
                     status: ProjectStatus| ProjectRecord {
            id: Uuid::from_u128(n),
            title: title.to_string(),
            category,
            description: description.to_string(),
            image_url: format!("https://images.unsplash.com/{}?w=800&q=80", image),
            target_amount: Money::from_units(target),
            current_amount: Money::from_units(current),
            status,
            created_at: launched,
            updated_at: launched,
        };

        Self::new(vec![
            entry(
                1,
                "Emergency Housing Support",
                Category::EmergencyRelief,
                "Providing immediate housing assistance to families displaced by crisis situations. This project helps secure temporary and permanent housing solutions.",
                "photo-1521737604893-d14cc237f11d",
                500_000,
                342_000,
                ProjectStatus::Active,
            ),
            entry(
                2,
                "Medical Equipment for Rural Clinics",
                Category::MedicalAid,
                "Supplying essential medical equipment to rural healthcare facilities to improve access to quality medical care in underserved communities.",
                "photo-1559027615-cd4628902d4a",
                750_000,
                589_000,
                ProjectStatus::Active,
            ),
            entry(
                3,
                "Community Center Construction",
                Category::CommunityDevelopment,
                "Building a new community center to serve as a hub for social services, educational programs, and community gatherings.",
                "photo-1469571486292-0ba58a3f068b",
                1_200_000,
                950_000,
                ProjectStatus::Active,
            ),
            entry(
                4,
                "Scholarship Program for Students",
                Category::EducationTraining,
                "Funding scholarships for students from underserved backgrounds to pursue higher education and vocational training.",
                "photo-1488521787991-ed7bbaae773c",
                300_000,
                300_000,
                ProjectStatus::Completed,
            ),
            entry(
                5,
                "Infrastructure Repair Initiative",
                Category::InfrastructureRebuild,
                "Repairing and upgrading essential infrastructure including roads, bridges, and public utilities to improve community access and safety.",
                "photo-1559027615-cd4628902d4a",
                2_000_000,
                1_250_000,
                ProjectStatus::Active,
            ),
            entry(
                6,
                "Clean Water Access Program",
                Category::CommunityDevelopment,
                "Installing clean water systems in communities without access to safe drinking water, improving health and quality of life.",
                "photo-1469571486292-0ba58a3f068b",
                600_000,
                423_000,
                ProjectStatus::Active,
            ),
        ])
    }

    pub fn projects(&self) -> &[ProjectRecord] {
        &self.projects
    }

    /// Look up a project by its id as it appears in a link.
    pub fn find(&self, raw_id: &str) -> Option<&ProjectRecord> {
        let id = Uuid::parse_str(raw_id.trim()).ok()?;
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn cards(&self) -> Vec<ProjectCard> {
        self.projects.iter().map(ProjectCard::from).collect()
    }

    /// Insert every catalog project the store does not have yet.
    /// Returns how many were added.
    pub async fn seed(&self, store: &dyn DocumentStore) -> Result<usize, DatabaseError> {
        let mut added = 0;
        for project in &self.projects {
            if store.get_project(project.id).await?.is_none() {
                store.insert_project(project).await?;
                added += 1;
            }
        }
        if added > 0 {
            info!("🌱 Seeded {} catalog projects", added);
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.projects().len(), 6);

        let water = catalog
            .find("00000000-0000-0000-0000-000000000006")
            .unwrap();
        assert_eq!(water.title, "Clean Water Access Program");

        let card = ProjectCard::from(water);
        assert_eq!(card.progress_label, "70% funded");
        assert_eq!(card.raised, "$423,000");
        assert_eq!(card.goal, "$600,000");

        assert!(catalog.find("6").is_none());
        assert!(catalog.find(&Uuid::new_v4().to_string()).is_none());
    }

    #[test]
    fn test_completed_project_card_is_full() {
        let catalog = Catalog::builtin();
        let cards = catalog.cards();
        let scholarship = cards.iter().find(|c| c.status == ProjectStatus::Completed).unwrap();
        assert_eq!(scholarship.progress_percent, 100.0);
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = MemoryStore::new();
        let catalog = Catalog::builtin();
        assert_eq!(catalog.seed(&store).await.unwrap(), 6);
        assert_eq!(catalog.seed(&store).await.unwrap(), 0);
        assert_eq!(store.count_projects().await.unwrap(), 6);
    }
}
