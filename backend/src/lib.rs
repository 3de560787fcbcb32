//! # Donation Site Backend
//!
//! Backend for a donation-collection website. It provides:
//!
//! - REST API over projects, donations and payment details
//! - Image uploads for project cards
//! - WebSocket feed with live donation events and the total collected
//! - The admin panel and public donation flow as client-side state
//!   machines that talk to the API through [`client::DonationApi`]
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        BACKEND SERVICE                           │
//! │                                                                  │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  REST API   │  │  WebSocket  │  │   Background Services   │  │
//! │  │  (Actix)    │  │  /ws/:chan  │  │  • Stats Broadcaster    │  │
//! │  │ /api/...    │  │             │  │                         │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! │         │                │                     │                 │
//! │         └────────────────┴─────────────────────┘                 │
//! │                          │                                       │
//! │  ┌───────────────────────┴───────────────────────────────────┐  │
//! │  │                    SERVICE LAYER                           │  │
//! │  │  Projects · Donations · PaymentDetails · Uploads          │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │                          │                                       │
//! │               Arc<dyn DocumentStore>                             │
//! │            (PostgreSQL or in-memory)                             │
//! └─────────────────────────────────────────────────────────────────┘
//!
//!     admin::AdminPanel ──┐
//!                         ├── client::DonationApi ── HTTP / in-process
//!  site::DonationFlow ────┘
//! ```

use std::sync::Arc;

use tracing::warn;

pub mod admin;
pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod site;
pub mod utils;
pub mod websocket;

use config::AppConfig;
use db::{DatabaseError, DocumentStore, DonationRecord};
use services::{
    DonationService, OfflineGateway, PaymentDetailsService, PaymentGateway, ProjectService,
    StatsBroadcaster, UploadService,
};
use site::Catalog;
use websocket::WsRegistry;

/// Application state shared across all handlers.
///
/// Handlers receive it as `web::Data<Arc<AppState>>`.
pub struct AppState {
    /// Backing store, shared by every service
    pub store: Arc<dyn DocumentStore>,

    pub projects: ProjectService,

    pub donations: DonationService,

    pub payment_details: PaymentDetailsService,

    /// Project image storage
    pub uploads: UploadService,

    pub config: AppConfig,

    /// WebSocket connection registry for live updates
    pub ws_registry: WsRegistry,
}

impl AppState {
    /// Wire the services over `store` with the offline payment gateway.
    pub fn new(store: Arc<dyn DocumentStore>, config: AppConfig) -> Self {
        let gateway: Arc<dyn PaymentGateway> = Arc::new(OfflineGateway::new(store.clone()));
        Self::with_gateway(store, gateway, config)
    }

    /// Wire the services with a custom payment gateway.
    pub fn with_gateway(
        store: Arc<dyn DocumentStore>,
        gateway: Arc<dyn PaymentGateway>,
        config: AppConfig,
    ) -> Self {
        let uploads = UploadService::new(
            config.upload_dir.clone(),
            config.upload_url_prefix.clone(),
            config.max_upload_bytes,
        );

        Self {
            projects: ProjectService::new(store.clone()),
            donations: DonationService::new(store.clone(), gateway),
            payment_details: PaymentDetailsService::new(store.clone()),
            uploads,
            store,
            config,
            ws_registry: WsRegistry::new(),
        }
    }

    /// Insert the launch projects the store is missing. Safe to call on
    /// every start.
    pub async fn seed_catalog(&self) -> Result<usize, DatabaseError> {
        Catalog::builtin().seed(self.store.as_ref()).await
    }

    /// Push `donation_received` and the new `total_collected` after a
    /// donation is recorded. Failures are logged, never returned.
    pub async fn announce_donation(&self, donation: &DonationRecord) {
        if let Err(e) = self.ws_registry.publish_donation(donation).await {
            warn!("Failed to publish donation {}: {}", donation.id, e);
        }
        match self.donations.stats().await {
            Ok(stats) => {
                if let Err(e) = self.ws_registry.publish_total(&stats).await {
                    warn!("Failed to publish total: {}", e);
                }
            }
            Err(e) => warn!("Failed to read totals after donation: {}", e),
        }
    }

    /// Background task pushing `total_collected` to `/ws/all`.
    pub fn stats_broadcaster(&self) -> StatsBroadcaster {
        StatsBroadcaster::new(
            self.donations.clone(),
            self.ws_registry.clone(),
            self.config.stats_broadcast_interval,
        )
    }
}
