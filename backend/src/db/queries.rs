//! # Database Queries
//!
//! This module contains all the SQL queries for interacting with the database.
//! Each function performs a specific database operation.
//!
//! ## Query Organization
//!
//! Queries are grouped by the table they operate on:
//! - `project_*` / `*_project*` - Project table operations
//! - `*_donation*` - Donation table operations
//! - `*_payment_details` - Payment details table operations
//!
//! ## Money Columns
//!
//! All amounts are stored as `BIGINT` cents. `SUM` over a `BIGINT`
//! yields `NUMERIC` in PostgreSQL, so aggregates are cast back.

use deadpool_postgres::Pool;
use tokio_postgres::Row;
use tracing::{debug, info};
use uuid::Uuid;

use super::models::*;
use super::DatabaseError;
use crate::utils::Money;

// ============================================
// HELPER FUNCTIONS
// ============================================

async fn client(pool: &Pool) -> Result<deadpool_postgres::Object, DatabaseError> {
    pool.get()
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))
}

fn parse_column<T: std::str::FromStr<Err = String>>(row: &Row, column: &str) -> Result<T, DatabaseError> {
    let raw: String = row.get(column);
    raw.parse()
        .map_err(|e: String| DatabaseError::InvalidData(format!("{}: {}", column, e)))
}

/// Helper to convert a database row to ProjectRecord
fn row_to_project(row: &Row) -> Result<ProjectRecord, DatabaseError> {
    Ok(ProjectRecord {
        id: row.get("id"),
        title: row.get("title"),
        category: parse_column(row, "category")?,
        description: row.get("description"),
        image_url: row.get("image_url"),
        target_amount: Money::from_cents(row.get("target_amount")),
        current_amount: Money::from_cents(row.get("current_amount")),
        status: parse_column(row, "status")?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Helper to convert a database row to DonationRecord
fn row_to_donation(row: &Row) -> Result<DonationRecord, DatabaseError> {
    Ok(DonationRecord {
        id: row.get("id"),
        project_id: row.get("project_id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        amount: Money::from_cents(row.get("amount")),
        payment_method: parse_column(row, "payment_method")?,
        message: row.get("message"),
        created_at: row.get("created_at"),
    })
}

/// Helper to convert a database row to PaymentDetailsRecord
fn row_to_payment_details(row: &Row) -> Result<PaymentDetailsRecord, DatabaseError> {
    Ok(PaymentDetailsRecord {
        id: row.get("id"),
        kind: parse_column(row, "kind")?,
        currency: row.get("currency"),
        account_name: row.get("account_name"),
        account_number: row.get("account_number"),
        routing_number: row.get("routing_number"),
        bank_name: row.get("bank_name"),
        swift: row.get("swift"),
        iban: row.get("iban"),
        wallet_address: row.get("wallet_address"),
        network: row.get("network"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

const PROJECT_COLUMNS: &str = "id, title, category, description, image_url, \
     target_amount, current_amount, status, created_at, updated_at";

const DONATION_COLUMNS: &str = "id, project_id, name, email, phone, amount, \
     payment_method, message, created_at";

const PAYMENT_DETAILS_COLUMNS: &str = "id, kind, currency, account_name, account_number, \
     routing_number, bank_name, swift, iban, wallet_address, network, is_active, \
     created_at, updated_at";

// ============================================
// PROJECT QUERIES
// ============================================

/// List projects, newest first.
pub async fn list_projects(
    pool: &Pool,
    filter: &ProjectFilter,
) -> Result<Vec<ProjectRecord>, DatabaseError> {
    debug!("Fetching projects (filter: {:?})", filter);

    let client = client(pool).await?;
    let status = filter.status.map(|s| s.as_str());
    let category = filter.category.map(|c| c.as_str());

    let rows = client.query(
        &format!(
            r#"
            SELECT {PROJECT_COLUMNS}
            FROM projects
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::TEXT IS NULL OR category = $2)
            ORDER BY created_at DESC
            "#
        ),
        &[&status, &category],
    ).await?;

    rows.iter().map(row_to_project).collect()
}

/// Get a project by id.
pub async fn get_project(pool: &Pool, id: Uuid) -> Result<Option<ProjectRecord>, DatabaseError> {
    debug!("Fetching project: {}", id);

    let client = client(pool).await?;
    let rows = client.query(
        &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"),
        &[&id],
    ).await?;

    rows.first().map(row_to_project).transpose()
}

/// Insert a new project.
pub async fn insert_project(pool: &Pool, project: &ProjectRecord) -> Result<(), DatabaseError> {
    let client = client(pool).await?;

    client.execute(
        r#"
        INSERT INTO projects (
            id, title, category, description, image_url,
            target_amount, current_amount, status, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
        &[
            &project.id,
            &project.title,
            &project.category.as_str(),
            &project.description,
            &project.image_url,
            &project.target_amount.cents(),
            &project.current_amount.cents(),
            &project.status.as_str(),
            &project.created_at,
            &project.updated_at,
        ],
    ).await?;

    info!("Project created: {} ({})", project.id, project.title);
    Ok(())
}

/// Replace the editable fields of a project.
pub async fn update_project(pool: &Pool, project: &ProjectRecord) -> Result<bool, DatabaseError> {
    let client = client(pool).await?;

    let rows_affected = client.execute(
        r#"
        UPDATE projects
        SET
            title = $2,
            category = $3,
            description = $4,
            image_url = $5,
            target_amount = $6,
            current_amount = $7,
            status = $8,
            updated_at = $9
        WHERE id = $1
        "#,
        &[
            &project.id,
            &project.title,
            &project.category.as_str(),
            &project.description,
            &project.image_url,
            &project.target_amount.cents(),
            &project.current_amount.cents(),
            &project.status.as_str(),
            &project.updated_at,
        ],
    ).await?;

    Ok(rows_affected > 0)
}

/// Delete a project. Its donations are left untouched.
pub async fn delete_project(pool: &Pool, id: Uuid) -> Result<bool, DatabaseError> {
    let client = client(pool).await?;
    let rows_affected = client
        .execute("DELETE FROM projects WHERE id = $1", &[&id])
        .await?;

    if rows_affected > 0 {
        info!("Project deleted: {}", id);
    }
    Ok(rows_affected > 0)
}

/// Add a donation amount to a project's raised total.
pub async fn add_to_project_amount(pool: &Pool, id: Uuid, amount: Money) -> Result<bool, DatabaseError> {
    let client = client(pool).await?;
    let rows_affected = client.execute(
        r#"
        UPDATE projects
        SET current_amount = current_amount + $2, updated_at = NOW()
        WHERE id = $1
        "#,
        &[&id, &amount.cents()],
    ).await?;

    Ok(rows_affected > 0)
}

/// Count all projects.
pub async fn count_projects(pool: &Pool) -> Result<i64, DatabaseError> {
    let client = client(pool).await?;
    let row = client
        .query_one("SELECT COUNT(*) AS count FROM projects", &[])
        .await?;
    Ok(row.get("count"))
}

// ============================================
// DONATION QUERIES
// ============================================

/// Record a new donation.
pub async fn insert_donation(pool: &Pool, donation: &DonationRecord) -> Result<(), DatabaseError> {
    debug!("Creating donation {} (project: {:?})", donation.id, donation.project_id);

    let client = client(pool).await?;
    client.execute(
        r#"
        INSERT INTO donations (
            id, project_id, name, email, phone, amount,
            payment_method, message, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
        &[
            &donation.id,
            &donation.project_id,
            &donation.name,
            &donation.email,
            &donation.phone,
            &donation.amount.cents(),
            &donation.payment_method.as_str(),
            &donation.message,
            &donation.created_at,
        ],
    ).await?;

    Ok(())
}

/// Donations for a project, newest first.
pub async fn list_project_donations(pool: &Pool, project_id: Uuid) -> Result<Vec<DonationRecord>, DatabaseError> {
    debug!("Fetching donations for project: {}", project_id);

    let client = client(pool).await?;
    let rows = client.query(
        &format!(
            "SELECT {DONATION_COLUMNS} FROM donations WHERE project_id = $1 ORDER BY created_at DESC"
        ),
        &[&project_id],
    ).await?;

    rows.iter().map(row_to_donation).collect()
}

/// Site-wide donation total and count.
pub async fn donation_totals(pool: &Pool) -> Result<DonationTotals, DatabaseError> {
    let client = client(pool).await?;
    let row = client.query_one(
        r#"
        SELECT
            COALESCE(SUM(amount), 0)::BIGINT AS total_amount,
            COUNT(*) AS donation_count
        FROM donations
        "#,
        &[],
    ).await?;

    Ok(DonationTotals {
        total_amount: Money::from_cents(row.get("total_amount")),
        donation_count: row.get("donation_count"),
    })
}

// ============================================
// PAYMENT DETAILS QUERIES
// ============================================

/// List payment details in creation order.
pub async fn list_payment_details(
    pool: &Pool,
    filter: &PaymentDetailsFilter,
) -> Result<Vec<PaymentDetailsRecord>, DatabaseError> {
    let client = client(pool).await?;
    let kind = filter.kind.map(|k| k.as_str());

    let rows = client.query(
        &format!(
            r#"
            SELECT {PAYMENT_DETAILS_COLUMNS}
            FROM payment_details
            WHERE ($1::TEXT IS NULL OR kind = $1)
              AND (NOT $2 OR is_active)
            ORDER BY created_at ASC
            "#
        ),
        &[&kind, &filter.active_only],
    ).await?;

    rows.iter().map(row_to_payment_details).collect()
}

pub async fn get_payment_details(pool: &Pool, id: Uuid) -> Result<Option<PaymentDetailsRecord>, DatabaseError> {
    let client = client(pool).await?;
    let rows = client.query(
        &format!("SELECT {PAYMENT_DETAILS_COLUMNS} FROM payment_details WHERE id = $1"),
        &[&id],
    ).await?;

    rows.first().map(row_to_payment_details).transpose()
}

pub async fn insert_payment_details(pool: &Pool, details: &PaymentDetailsRecord) -> Result<(), DatabaseError> {
    let client = client(pool).await?;
    client.execute(
        r#"
        INSERT INTO payment_details (
            id, kind, currency, account_name, account_number, routing_number,
            bank_name, swift, iban, wallet_address, network, is_active,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
        &[
            &details.id,
            &details.kind.as_str(),
            &details.currency,
            &details.account_name,
            &details.account_number,
            &details.routing_number,
            &details.bank_name,
            &details.swift,
            &details.iban,
            &details.wallet_address,
            &details.network,
            &details.is_active,
            &details.created_at,
            &details.updated_at,
        ],
    ).await?;

    info!("Payment details created: {} ({})", details.id, details.kind.as_str());
    Ok(())
}

pub async fn update_payment_details(pool: &Pool, details: &PaymentDetailsRecord) -> Result<bool, DatabaseError> {
    let client = client(pool).await?;
    let rows_affected = client.execute(
        r#"
        UPDATE payment_details
        SET
            kind = $2,
            currency = $3,
            account_name = $4,
            account_number = $5,
            routing_number = $6,
            bank_name = $7,
            swift = $8,
            iban = $9,
            wallet_address = $10,
            network = $11,
            is_active = $12,
            updated_at = $13
        WHERE id = $1
        "#,
        &[
            &details.id,
            &details.kind.as_str(),
            &details.currency,
            &details.account_name,
            &details.account_number,
            &details.routing_number,
            &details.bank_name,
            &details.swift,
            &details.iban,
            &details.wallet_address,
            &details.network,
            &details.is_active,
            &details.updated_at,
        ],
    ).await?;

    Ok(rows_affected > 0)
}

pub async fn delete_payment_details(pool: &Pool, id: Uuid) -> Result<bool, DatabaseError> {
    let client = client(pool).await?;
    let rows_affected = client
        .execute("DELETE FROM payment_details WHERE id = $1", &[&id])
        .await?;
    Ok(rows_affected > 0)
}
