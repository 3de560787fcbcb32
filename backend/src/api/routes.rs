//! # API Route Configuration
//!
//! This module sets up all the HTTP routes for the API.

use actix_web::web;

use super::handlers;

/// Configure all API routes.
///
/// ## Route Structure
///
/// ```text
/// /
/// ├── /health                       GET
/// ├── /uploads/:file                GET - Serve uploaded image
/// └── /api
///     ├── /projects                 GET, POST
///     │   ├── /:id                  GET, PUT, DELETE
///     │   └── /:id/donations        GET
///     ├── /donations                POST
///     ├── /stats                    GET
///     ├── /upload                   POST - raw image body
///     └── /payment-details          GET, POST
///         └── /:id                  PUT, DELETE
/// ```
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Root endpoint - API information
        .route("/", web::get().to(handlers::api_info))
        .route("/health", web::get().to(handlers::health_check))
        .route("/uploads/{file}", web::get().to(handlers::serve_upload))
        .service(
            web::scope("/api")
                .route("/projects", web::get().to(handlers::list_projects))
                .route("/projects", web::post().to(handlers::create_project))
                .route("/projects/{id}", web::get().to(handlers::get_project))
                .route("/projects/{id}", web::put().to(handlers::update_project))
                .route("/projects/{id}", web::delete().to(handlers::delete_project))
                .route(
                    "/projects/{id}/donations",
                    web::get().to(handlers::list_project_donations),
                )
                .route("/donations", web::post().to(handlers::create_donation))
                .route("/stats", web::get().to(handlers::get_stats))
                .route("/upload", web::post().to(handlers::upload_image))
                .route("/payment-details", web::get().to(handlers::list_payment_details))
                .route("/payment-details", web::post().to(handlers::create_payment_details))
                .route(
                    "/payment-details/{id}",
                    web::put().to(handlers::update_payment_details),
                )
                .route(
                    "/payment-details/{id}",
                    web::delete().to(handlers::delete_payment_details),
                ),
        );
}
