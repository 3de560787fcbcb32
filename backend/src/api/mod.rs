//! # REST API Module
//!
//! This module defines all HTTP endpoints of the donation site.
//!
//! ## Endpoint Overview
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | API information |
//! | GET | `/health` | Health check |
//! | GET/POST | `/api/projects` | List / create projects |
//! | GET/PUT/DELETE | `/api/projects/:id` | Read / replace / delete a project |
//! | GET | `/api/projects/:id/donations` | Donations for a project |
//! | POST | `/api/donations` | Submit a donation |
//! | GET | `/api/stats` | Total collected |
//! | POST | `/api/upload` | Upload a project image |
//! | GET | `/uploads/:file` | Serve an uploaded image |
//! | GET/POST | `/api/payment-details` | List / create receiving accounts |
//! | PUT/DELETE | `/api/payment-details/:id` | Replace / delete a receiving account |
//!
//! ## Request/Response Format
//!
//! All responses use JSON:
//!
//! ```json
//! // Success response
//! {
//!     "success": true,
//!     "data": { ... }
//! }
//!
//! // Error response
//! {
//!     "success": false,
//!     "error": {
//!         "code": "ERROR_CODE",
//!         "message": "Human readable message"
//!     }
//! }
//! ```

pub mod errors;
pub mod handlers;
pub mod routes;

use actix_web::error::InternalError;
use actix_web::{web, HttpResponse};

use crate::models::ApiResponse;

pub use routes::configure_routes;

/// JSON extractor config: malformed bodies answer with the envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = format!("Invalid request body: {}", err);
        let response =
            HttpResponse::BadRequest().json(ApiResponse::<()>::error("VALIDATION_ERROR", &message));
        InternalError::from_response(err, response).into()
    })
}

/// Query string extractor config with the same envelope as [`json_config`].
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let message = format!("Invalid query string: {}", err);
        let response =
            HttpResponse::BadRequest().json(ApiResponse::<()>::error("VALIDATION_ERROR", &message));
        InternalError::from_response(err, response).into()
    })
}
