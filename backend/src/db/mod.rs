//! # Database Module
//!
//! This module handles all persistence for the donation site.
//! Three document kinds are stored:
//!
//! - Projects (fundraising campaigns managed from the admin panel)
//! - Donations (public submissions, optionally linked to a project)
//! - Payment details (bank accounts and crypto wallets shown to donors)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      STORAGE LAYER                               │
//! │                                                                  │
//! │               Arc<dyn DocumentStore>                             │
//! │                         │                                        │
//! │         ┌───────────────┴────────────────┐                       │
//! │         ▼                                ▼                       │
//! │  ┌──────────────────┐           ┌──────────────────┐             │
//! │  │    Database      │           │   MemoryStore    │             │
//! │  │ (deadpool-pg)    │           │  (RwLock maps)   │             │
//! │  └──────────────────┘           └──────────────────┘             │
//! │         │                                                        │
//! │  ┌──────┴─────┬──────────────┬─────────────────┐                 │
//! │  │  projects  │  donations   │ payment_details │                 │
//! │  └────────────┴──────────────┴─────────────────┘                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod memory;
pub mod models;
pub mod queries;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use deadpool_postgres::{Config, Pool, Runtime};
use thiserror::Error;
use tokio_postgres::{Config as TokioConfig, NoTls};
use tracing::{error, info};
use uuid::Uuid;

use crate::config::StoreBackend;
use crate::utils::Money;

/// Schema applied at startup. Every statement is `IF NOT EXISTS`,
/// so running it against an existing database is a no-op.
const INITIAL_SCHEMA: &str = include_str!("../../migrations/001_initial_schema.sql");

/// Database-related errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to connect to the database
    #[error("Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryError(#[from] tokio_postgres::Error),

    /// Migration failed
    #[error("Migration failed: {0}")]
    MigrationError(String),

    /// A stored value could not be mapped back to its Rust type
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

/// PostgreSQL-backed document store.
///
/// Wraps a deadpool connection pool (max 10 connections).
///
/// ## Usage
///
/// ```rust,ignore
/// let db = Database::connect("postgres://...").await?;
/// db.run_migrations().await?;
/// let store: Arc<dyn DocumentStore> = Arc::new(db);
/// ```
#[derive(Clone)]
pub struct Database {
    pool: Pool,
}

impl Database {
    /// Connect to the PostgreSQL database and verify the connection.
    pub async fn connect(database_url: &str) -> Result<Self, DatabaseError> {
        info!("Connecting to database...");

        let tokio_config = database_url
            .parse::<TokioConfig>()
            .map_err(|e| DatabaseError::ConfigError(format!("Invalid database URL: {}", e)))?;

        let mut config = Config::new();
        config.dbname = tokio_config.get_dbname().map(str::to_string);
        config.user = tokio_config.get_user().map(str::to_string);
        config.password = tokio_config
            .get_password()
            .map(|p| String::from_utf8_lossy(p).to_string());
        if let Some(tokio_postgres::config::Host::Tcp(host)) = tokio_config.get_hosts().first() {
            config.host = Some(host.clone());
        }
        config.port = tokio_config.get_ports().first().copied();
        config.pool = Some(deadpool_postgres::PoolConfig {
            max_size: 10,
            ..Default::default()
        });

        let pool = config
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        let db = Self { pool };
        db.check().await?;

        info!("Database connection established");
        Ok(db)
    }

    /// Apply the bundled schema.
    pub async fn run_migrations(&self) -> Result<(), DatabaseError> {
        info!("Running database migrations...");

        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        if let Err(e) = client.batch_execute(INITIAL_SCHEMA).await {
            let detail = e
                .as_db_error()
                .and_then(|db_err| db_err.detail())
                .unwrap_or("No detail available")
                .to_string();
            error!("Migration execution error: {} ({})", e, detail);
            return Err(DatabaseError::MigrationError(format!("{}: {}", e, detail)));
        }

        info!("Migrations completed successfully");
        Ok(())
    }

    async fn check(&self) -> Result<(), DatabaseError> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        client
            .query("SELECT 1", &[])
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for Database {
    async fn ping(&self) -> Result<(), DatabaseError> {
        self.check().await
    }

    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<ProjectRecord>, DatabaseError> {
        queries::list_projects(&self.pool, filter).await
    }

    async fn get_project(&self, id: Uuid) -> Result<Option<ProjectRecord>, DatabaseError> {
        queries::get_project(&self.pool, id).await
    }

    async fn insert_project(&self, project: &ProjectRecord) -> Result<(), DatabaseError> {
        queries::insert_project(&self.pool, project).await
    }

    async fn update_project(&self, project: &ProjectRecord) -> Result<bool, DatabaseError> {
        queries::update_project(&self.pool, project).await
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, DatabaseError> {
        queries::delete_project(&self.pool, id).await
    }

    async fn add_to_project_amount(&self, id: Uuid, amount: Money) -> Result<bool, DatabaseError> {
        queries::add_to_project_amount(&self.pool, id, amount).await
    }

    async fn count_projects(&self) -> Result<i64, DatabaseError> {
        queries::count_projects(&self.pool).await
    }

    async fn insert_donation(&self, donation: &DonationRecord) -> Result<(), DatabaseError> {
        queries::insert_donation(&self.pool, donation).await
    }

    async fn list_project_donations(&self, project_id: Uuid) -> Result<Vec<DonationRecord>, DatabaseError> {
        queries::list_project_donations(&self.pool, project_id).await
    }

    async fn donation_totals(&self) -> Result<DonationTotals, DatabaseError> {
        queries::donation_totals(&self.pool).await
    }

    async fn list_payment_details(
        &self,
        filter: &PaymentDetailsFilter,
    ) -> Result<Vec<PaymentDetailsRecord>, DatabaseError> {
        queries::list_payment_details(&self.pool, filter).await
    }

    async fn get_payment_details(&self, id: Uuid) -> Result<Option<PaymentDetailsRecord>, DatabaseError> {
        queries::get_payment_details(&self.pool, id).await
    }

    async fn insert_payment_details(&self, details: &PaymentDetailsRecord) -> Result<(), DatabaseError> {
        queries::insert_payment_details(&self.pool, details).await
    }

    async fn update_payment_details(&self, details: &PaymentDetailsRecord) -> Result<bool, DatabaseError> {
        queries::update_payment_details(&self.pool, details).await
    }

    async fn delete_payment_details(&self, id: Uuid) -> Result<bool, DatabaseError> {
        queries::delete_payment_details(&self.pool, id).await
    }
}

/// Open the configured backend. Postgres is migrated before use.
pub async fn open_store(backend: &StoreBackend) -> Result<Arc<dyn DocumentStore>, DatabaseError> {
    match backend {
        StoreBackend::Postgres { database_url } => {
            let db = Database::connect(database_url).await?;
            db.run_migrations().await?;
            Ok(Arc::new(db))
        }
        StoreBackend::Memory => {
            info!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

// Re-export commonly used items
pub use memory::MemoryStore;
pub use models::*;
pub use store::DocumentStore;
