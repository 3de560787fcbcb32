//! # Donation Site Backend Service
//!
//! Entry point: loads configuration, opens the store, starts the stats
//! broadcaster and serves the REST API, uploads and the live feed.
//!
//! ## Quick Start
//!
//! 1. Copy `.env.example` to `.env` and configure
//! 2. For PostgreSQL, create the database (the schema is applied at startup);
//!    or set `STORE_BACKEND=memory`
//! 3. Start the server: `cargo run --bin donation-backend`

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use donation_site::config::{AppConfig, StoreBackend};
use donation_site::{api, db, websocket, AppState};

/// Main entry point for the backend service.
///
/// This function:
/// 1. Initializes logging
/// 2. Loads configuration from environment
/// 3. Opens the document store
/// 4. Prepares the upload directory
/// 5. Starts the stats broadcaster
/// 6. Launches the HTTP server
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // =========================================
    // STEP 1: Initialize Logging
    // =========================================
    dotenvy::dotenv().ok(); // It's okay if .env doesn't exist

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_line_number(true)
        .init();

    info!("🚀 Starting Donation Site Backend Service");

    // =========================================
    // STEP 2: Load Configuration
    // =========================================
    let config = AppConfig::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    info!("📋 Configuration loaded");
    info!(
        "   Store: {}",
        match &config.store {
            StoreBackend::Postgres { .. } => "postgres",
            StoreBackend::Memory => "memory",
        }
    );
    info!("   Uploads: {}", config.upload_dir.display());

    // =========================================
    // STEP 3: Open Document Store
    // =========================================
    let store = db::open_store(&config.store).await.map_err(|e| {
        error!("Failed to open store: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    info!("🗄️  Store ready");

    // =========================================
    // STEP 4: Create Application State
    // =========================================
    let app_state = Arc::new(AppState::new(store, config.clone()));

    // Launch projects must exist for the donate page's links to work
    app_state.seed_catalog().await.map_err(|e| {
        error!("Failed to seed catalog: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    app_state.uploads.ensure_dir().await.map_err(|e| {
        error!("Failed to create upload directory: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    info!("🔧 Services initialized");

    // =========================================
    // STEP 5: Start Background Services
    // =========================================
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let broadcaster = app_state.stats_broadcaster();
    let broadcaster_handle = tokio::spawn(async move {
        broadcaster.start(shutdown_rx).await;
    });

    info!("📡 Stats broadcaster started");

    // =========================================
    // STEP 6: Start HTTP Server
    // =========================================
    let server_host = config.server_host.clone();
    let server_port = config.server_port;
    let cors_origin = config.cors_allowed_origin.clone();

    info!("🌐 Starting HTTP server on {}:{}", server_host, server_port);

    let result = HttpServer::new(move || {
        let cors = if cors_origin == "*" {
            Cors::permissive()
        } else {
            Cors::default()
                .allowed_origin(&cors_origin)
                .allow_any_method()
                .allow_any_header()
                .max_age(3600)
        };

        App::new()
            // Attach shared application state
            .app_data(web::Data::new(app_state.clone()))
            .app_data(api::json_config())
            .app_data(api::query_config())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(api::configure_routes)
            .configure(websocket::configure_routes)
    })
    .bind(format!("{}:{}", server_host, server_port))?
    .run()
    .await;

    let _ = shutdown_tx.send(true);
    let _ = broadcaster_handle.await;
    info!("👋 Server stopped");

    result
}
