//! # Database Models
//!
//! This module defines the documents held by the store.
//! Each struct represents a row in a table.
//!
//! ## Table Overview
//!
//! | Table | Description |
//! |-------|-------------|
//! | `projects` | Fundraising campaigns shown on the site |
//! | `donations` | Individual contributions, optionally linked to a project |
//! | `payment_details` | Bank accounts and crypto wallets donors pay into |
//!
//! ## Relationship Diagram
//!
//! ```text
//! ┌─────────────┐       ┌──────────────────┐
//! │  projects   │──────<│    donations     │
//! │             │       │                  │
//! │ id (PK)     │       │ project_id       │
//! │ target      │       │ (nullable, no FK)│
//! │ current     │       │ amount           │
//! └─────────────┘       └──────────────────┘
//!
//! ┌──────────────────┐
//! │ payment_details  │   (standalone)
//! └──────────────────┘
//! ```
//!
//! There is no referential integrity between donations and projects:
//! deleting a project leaves its donations in place.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::{funding_percent, funding_percent_label, Money};

/// Project categories offered by the admin form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    #[serde(rename = "Emergency Relief")]
    EmergencyRelief,
    #[serde(rename = "Medical Aid")]
    MedicalAid,
    #[serde(rename = "Community Development")]
    CommunityDevelopment,
    #[serde(rename = "Education & Training")]
    EducationTraining,
    #[serde(rename = "Infrastructure Rebuild")]
    InfrastructureRebuild,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::EmergencyRelief,
        Category::MedicalAid,
        Category::CommunityDevelopment,
        Category::EducationTraining,
        Category::InfrastructureRebuild,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::EmergencyRelief => "Emergency Relief",
            Category::MedicalAid => "Medical Aid",
            Category::CommunityDevelopment => "Community Development",
            Category::EducationTraining => "Education & Training",
            Category::InfrastructureRebuild => "Infrastructure Rebuild",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(ProjectStatus::Active),
            "completed" => Ok(ProjectStatus::Completed),
            other => Err(format!("Unknown status: {}", other)),
        }
    }
}

/// How a donor intends to pay.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Bank,
    Crypto,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Bank => "bank",
            PaymentMethod::Crypto => "crypto",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "card" => Ok(PaymentMethod::Card),
            "bank" => Ok(PaymentMethod::Bank),
            "crypto" => Ok(PaymentMethod::Crypto),
            other => Err(format!("Unknown payment method: {}", other)),
        }
    }
}

/// Kind of receiving account stored in `payment_details`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
    Bank,
    Crypto,
}

impl PaymentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentKind::Bank => "bank",
            PaymentKind::Crypto => "crypto",
        }
    }
}

impl FromStr for PaymentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bank" => Ok(PaymentKind::Bank),
            "crypto" => Ok(PaymentKind::Crypto),
            other => Err(format!("Unknown payment details type: {}", other)),
        }
    }
}

/// A fundraising project.
///
/// ## Example
///
/// ```text
/// ProjectRecord {
///     title: "Clean Water Access Program",
///     category: CommunityDevelopment,
///     target_amount: $600,000,
///     current_amount: $423,000,   // 70% funded
///     status: Active,
///     ...
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    /// Server-assigned identifier (UUID v4).
    pub id: Uuid,

    pub title: String,

    pub category: Category,

    pub description: String,

    /// Absolute URL or an `/uploads/...` reference returned by the upload endpoint.
    pub image_url: String,

    /// Fundraising goal.
    pub target_amount: Money,

    /// Raised so far. May exceed the target; display clamps at 100%.
    pub current_amount: Money,

    pub status: ProjectStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl ProjectRecord {
    /// Funding progress, `min(current / target, 1) * 100`.
    pub fn progress_percent(&self) -> f64 {
        funding_percent(self.current_amount, self.target_amount)
    }

    /// Whole-number progress shown as "NN% funded".
    pub fn progress_label(&self) -> u32 {
        funding_percent_label(self.current_amount, self.target_amount)
    }
}

/// A single contribution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DonationRecord {
    pub id: Uuid,

    /// `None` means the general fund.
    pub project_id: Option<Uuid>,

    /// Donor name.
    pub name: String,

    pub email: String,

    pub phone: String,

    pub amount: Money,

    pub payment_method: PaymentMethod,

    pub message: String,

    pub created_at: DateTime<Utc>,
}

/// A receiving account donors can pay into.
///
/// Bank records use the `account_*`, `routing_number`, `bank_name`, `swift`
/// and `iban` fields; crypto records use `wallet_address` and `network`.
/// Unused fields are empty strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetailsRecord {
    pub id: Uuid,

    #[serde(rename = "type")]
    pub kind: PaymentKind,

    /// Bank: `usd`, `eur`, ... Crypto: `bitcoin`, `ethereum`, ...
    pub currency: String,

    pub account_name: String,
    pub account_number: String,
    pub routing_number: String,
    pub bank_name: String,
    pub swift: String,
    pub iban: String,

    pub wallet_address: String,

    /// e.g. `BTC`, `ETH`, `ERC20`.
    pub network: String,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Filter for listing projects.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    pub category: Option<Category>,
}

impl ProjectFilter {
    pub fn matches(&self, project: &ProjectRecord) -> bool {
        self.status.map_or(true, |s| project.status == s)
            && self.category.map_or(true, |c| project.category == c)
    }
}

/// Filter for listing payment details.
#[derive(Debug, Clone, Default)]
pub struct PaymentDetailsFilter {
    pub kind: Option<PaymentKind>,
    pub active_only: bool,
}

impl PaymentDetailsFilter {
    pub fn matches(&self, details: &PaymentDetailsRecord) -> bool {
        self.kind.map_or(true, |k| details.kind == k) && (!self.active_only || details.is_active)
    }
}

/// Aggregate donation figures across the whole site.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DonationTotals {
    pub total_amount: Money,
    pub donation_count: i64,
}
