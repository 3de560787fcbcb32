//! # Admin Panel
//!
//! State of the project admin page, driven entirely by the operator.
//!
//! ## Views
//!
//! ```text
//!                open_create / open_edit
//!        ┌──────────────────────────────────► Form { editing }
//!        │                                      │
//!      Grid ◄──────── submit ok / cancel ───────┘
//!        │
//!        │ view_donations
//!        ▼
//!   Donations { project } ──── back_to_grid ───► Grid
//! ```
//!
//! ## Notices
//!
//! Outcomes the page would show as toasts are recorded as [`Notice`]s.
//!
//! | Operation | Success | Failure |
//! |-----------|---------|---------|
//! | submit (create) | Project created successfully! | server message or "Failed to save project" |
//! | submit (update) | Project updated successfully! | server message or "Failed to save project" |
//! | upload_image | Image uploaded successfully! | Failed to upload image |
//! | delete | Project deleted successfully! | Failed to delete project |
//! | view_donations | | Failed to fetch donations |

use std::str::FromStr;

use tracing::{error, info};
use uuid::Uuid;

use crate::client::{ClientError, DonationApi};
use crate::db::{Category, DonationRecord, ProjectRecord, ProjectStatus};
use crate::models::{DonationListResponse, ProjectPayload, ProjectQuery};
use crate::site::{FlowError, ProjectCard};
use crate::utils::{format_usd, Money};

#[derive(Debug, Clone, PartialEq)]
pub enum AdminView {
    Grid,
    Form { editing: Option<Uuid> },
    Donations { project: ProjectRecord },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Fields of the project form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Category,
    Description,
    ImageUrl,
    TargetAmount,
    CurrentAmount,
    Status,
}

/// The project form, values as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectForm {
    pub title: String,
    pub category: String,
    pub description: String,
    pub image_url: String,
    pub target_amount: String,
    pub current_amount: String,
    pub status: String,
}

impl Default for ProjectForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            category: String::new(),
            description: String::new(),
            image_url: String::new(),
            target_amount: String::new(),
            current_amount: String::new(),
            status: ProjectStatus::Active.as_str().to_string(),
        }
    }
}

impl ProjectForm {
    pub fn from_project(project: &ProjectRecord) -> Self {
        Self {
            title: project.title.clone(),
            category: project.category.as_str().to_string(),
            description: project.description.clone(),
            image_url: project.image_url.clone(),
            target_amount: project.target_amount.to_decimal_string(),
            current_amount: project.current_amount.to_decimal_string(),
            status: project.status.as_str().to_string(),
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Title => self.title = value,
            FormField::Category => self.category = value,
            FormField::Description => self.description = value,
            FormField::ImageUrl => self.image_url = value,
            FormField::TargetAmount => self.target_amount = value,
            FormField::CurrentAmount => self.current_amount = value,
            FormField::Status => self.status = value,
        }
    }

    /// Payload for create/update. An empty current amount counts as 0;
    /// presence of the other fields is checked by the server.
    pub fn to_payload(&self) -> Result<ProjectPayload, FlowError> {
        let amount = |text: &str, label: &str| -> Result<Option<Money>, FlowError> {
            if text.trim().is_empty() {
                return Ok(None);
            }
            Money::parse(text)
                .map(Some)
                .map_err(|_| FlowError::Invalid(format!("{} must be a number", label)))
        };
        let text = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());

        Ok(ProjectPayload {
            title: text(&self.title),
            category: text(&self.category),
            description: text(&self.description),
            image_url: text(&self.image_url),
            target_amount: amount(&self.target_amount, "Target amount")?,
            current_amount: Some(amount(&self.current_amount, "Current amount")?.unwrap_or(Money::ZERO)),
            status: text(&self.status),
        })
    }
}

/// The donation table of one project.
#[derive(Debug, Clone, PartialEq)]
pub struct DonationSummary {
    pub donations: Vec<DonationRecord>,
    pub total_amount: Money,
    /// e.g. "$1,250".
    pub formatted_total: String,
    pub donor_count: usize,
}

impl From<DonationListResponse> for DonationSummary {
    fn from(list: DonationListResponse) -> Self {
        Self {
            formatted_total: format_usd(list.total_amount),
            total_amount: list.total_amount,
            donor_count: list.total_donors,
            donations: list.donations,
        }
    }
}

pub struct AdminPanel<C> {
    client: C,
    projects: Vec<ProjectRecord>,
    loading: bool,
    view: AdminView,
    form: ProjectForm,
    uploading: bool,
    donations: Option<DonationSummary>,
    notices: Vec<Notice>,
}

impl<C: DonationApi> AdminPanel<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            projects: Vec::new(),
            loading: true,
            view: AdminView::Grid,
            form: ProjectForm::default(),
            uploading: false,
            donations: None,
            notices: Vec::new(),
        }
    }

    pub fn view(&self) -> &AdminView {
        &self.view
    }

    pub fn projects(&self) -> &[ProjectRecord] {
        &self.projects
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn form(&self) -> &ProjectForm {
        &self.form
    }

    /// Categories offered by the form's select.
    pub fn categories(&self) -> [Category; 5] {
        Category::ALL
    }

    /// Grid cards with progress and formatted amounts.
    pub fn cards(&self) -> Vec<ProjectCard> {
        self.projects.iter().map(ProjectCard::from).collect()
    }

    /// Donation table of the project in the donations view.
    pub fn donation_summary(&self) -> Option<&DonationSummary> {
        self.donations.as_ref()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
    }

    /// Fetch the project list.
    pub async fn load(&mut self) -> Result<(), FlowError> {
        let result = self.client.list_projects(&ProjectQuery::default()).await;
        self.loading = false;
        match result {
            Ok(projects) => {
                self.projects = projects;
                Ok(())
            }
            Err(e) => {
                error!("Error fetching projects: {}", e);
                Err(e.into())
            }
        }
    }

    pub fn open_create(&mut self) {
        self.form = ProjectForm::default();
        self.view = AdminView::Form { editing: None };
    }

    /// Open the form pre-filled from a listed project.
    pub fn open_edit(&mut self, id: Uuid) -> Result<(), FlowError> {
        let project = self
            .projects
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| FlowError::UnknownProject(id.to_string()))?;
        self.form = ProjectForm::from_project(project);
        self.view = AdminView::Form { editing: Some(id) };
        Ok(())
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) -> Result<(), FlowError> {
        if !matches!(self.view, AdminView::Form { .. }) {
            return Err(FlowError::WrongState("the project form is not open"));
        }
        self.form.set(field, value);
        Ok(())
    }

    /// Upload an image and put its URL into the form.
    pub async fn upload_image(&mut self, content_type: &str, bytes: Vec<u8>) -> Result<(), FlowError> {
        if !matches!(self.view, AdminView::Form { .. }) {
            return Err(FlowError::WrongState("the project form is not open"));
        }
        self.uploading = true;
        let result = self.client.upload_image(content_type, bytes).await;
        self.uploading = false;

        match result {
            Ok(upload) => {
                self.form.image_url = upload.url;
                self.notify(NoticeLevel::Success, "Image uploaded successfully!");
                Ok(())
            }
            Err(e) => {
                error!("Error uploading image: {}", e);
                self.notify(NoticeLevel::Error, "Failed to upload image");
                Err(e.into())
            }
        }
    }

    /// Create or update from the form.
    ///
    /// On success the list is refreshed, the form reset and the grid
    /// shown. On failure the form stays open.
    pub async fn submit(&mut self) -> Result<ProjectRecord, FlowError> {
        let AdminView::Form { editing } = self.view else {
            return Err(FlowError::WrongState("the project form is not open"));
        };

        let payload = match self.form.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                self.notify(NoticeLevel::Error, e.to_string());
                return Err(e);
            }
        };

        let result = match editing {
            Some(id) => self.client.update_project(id, payload).await,
            None => self.client.create_project(payload).await,
        };

        match result {
            Ok(project) => {
                if let Err(e) = self.load().await {
                    error!("Error refreshing projects after save: {}", e);
                }
                self.reset_form();
                self.notify(
                    NoticeLevel::Success,
                    if editing.is_some() {
                        "Project updated successfully!"
                    } else {
                        "Project created successfully!"
                    },
                );
                info!("Saved project {}", project.id);
                Ok(project)
            }
            Err(e) => {
                error!("Error saving project: {}", e);
                let message = save_failure_message(&e);
                self.notify(NoticeLevel::Error, message);
                Err(e.into())
            }
        }
    }

    /// Reset the form and go back to the grid.
    pub fn cancel(&mut self) {
        self.reset_form();
    }

    fn reset_form(&mut self) {
        self.form = ProjectForm::default();
        self.view = AdminView::Grid;
    }

    /// Delete a project. `confirmed` is the answer to "Are you sure you
    /// want to delete this project?".
    pub async fn delete(&mut self, id: Uuid, confirmed: bool) -> Result<(), FlowError> {
        if !confirmed {
            return Err(FlowError::ConfirmationRequired);
        }

        match self.client.delete_project(id).await {
            Ok(()) => {
                if let Err(e) = self.load().await {
                    error!("Error refreshing projects after delete: {}", e);
                }
                self.notify(NoticeLevel::Success, "Project deleted successfully!");
                Ok(())
            }
            Err(e) => {
                error!("Error deleting project: {}", e);
                self.notify(NoticeLevel::Error, "Failed to delete project");
                Err(e.into())
            }
        }
    }

    /// Show the donations of a listed project.
    pub async fn view_donations(&mut self, id: Uuid) -> Result<(), FlowError> {
        let project = self
            .projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| FlowError::UnknownProject(id.to_string()))?;

        match self.client.list_donations(id).await {
            Ok(list) => {
                self.donations = Some(DonationSummary::from(list));
                self.view = AdminView::Donations { project };
                Ok(())
            }
            Err(e) => {
                error!("Error fetching donations: {}", e);
                self.notify(NoticeLevel::Error, "Failed to fetch donations");
                Err(e.into())
            }
        }
    }

    pub fn back_to_grid(&mut self) {
        self.donations = None;
        self.view = AdminView::Grid;
    }
}

fn save_failure_message(err: &ClientError) -> String {
    err.server_message()
        .map(str::to_string)
        .unwrap_or_else(|| "Failed to save project".to_string())
}

impl FromStr for FormField {
    type Err = String;

    /// Parse the form's input names (`title`, `imageUrl`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "title" => FormField::Title,
            "category" => FormField::Category,
            "description" => FormField::Description,
            "imageUrl" => FormField::ImageUrl,
            "targetAmount" => FormField::TargetAmount,
            "currentAmount" => FormField::CurrentAmount,
            "status" => FormField::Status,
            other => return Err(format!("Unknown form field: {}", other)),
        })
    }
}
