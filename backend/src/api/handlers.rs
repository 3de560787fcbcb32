//! # API Request Handlers
//!
//! This module contains the handler functions for each API endpoint.
//! Each handler:
//! 1. Extracts request data
//! 2. Calls the appropriate service
//! 3. Returns a formatted response
//!
//! ## Error Handling
//!
//! All errors are caught and returned as JSON:
//!
//! ```json
//! {
//!     "success": false,
//!     "error": {
//!         "code": "VALIDATION_ERROR",
//!         "message": "Title is required"
//!     }
//! }
//! ```
//!
//! Path ids that are not UUIDs answer `404 NOT_FOUND`, the same as an
//! unknown id.

use std::sync::Arc;

use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use futures::StreamExt;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::errors::{not_found_response, service_error_response, upload_error_response};
use crate::models::{
    ApiResponse, DeletedResponse, DonationListResponse, DonationRequest, HealthResponse,
    PaymentDetailsListResponse, PaymentDetailsPayload, PaymentDetailsQuery, ProjectListResponse,
    ProjectPayload, ProjectQuery, ProjectResponse,
};
use crate::services::uploads::extension_for;
use crate::services::UploadError;
use crate::AppState;

fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

/// API information endpoint (root).
///
/// ## Endpoint
///
/// `GET /`
pub async fn api_info() -> HttpResponse {
    let info = json!({
        "name": "Donation Site API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Projects, donations and payment details for the donation site",
        "endpoints": {
            "health": { "method": "GET", "path": "/health" },
            "projects": {
                "list": { "method": "GET", "path": "/api/projects", "query": ["status", "category"] },
                "create": { "method": "POST", "path": "/api/projects" },
                "get": { "method": "GET", "path": "/api/projects/{id}" },
                "update": { "method": "PUT", "path": "/api/projects/{id}" },
                "delete": { "method": "DELETE", "path": "/api/projects/{id}" },
                "donations": { "method": "GET", "path": "/api/projects/{id}/donations" }
            },
            "donations": { "method": "POST", "path": "/api/donations" },
            "stats": { "method": "GET", "path": "/api/stats" },
            "upload": { "method": "POST", "path": "/api/upload" },
            "paymentDetails": {
                "list": { "method": "GET", "path": "/api/payment-details", "query": ["type", "active"] },
                "create": { "method": "POST", "path": "/api/payment-details" },
                "update": { "method": "PUT", "path": "/api/payment-details/{id}" },
                "delete": { "method": "DELETE", "path": "/api/payment-details/{id}" }
            },
            "websocket": { "path": "/ws/{channel}", "channels": ["all", "<project id>"] }
        }
    });

    HttpResponse::Ok().json(ApiResponse::success(info))
}

/// Health check endpoint.
///
/// ## Endpoint
///
/// `GET /health`
///
/// ## Response
///
/// ```json
/// {
///     "success": true,
///     "data": {
///         "status": "healthy",
///         "database": true,
///         "wsConnections": 3,
///         "version": "0.1.0",
///         "timestamp": "2025-12-08T12:00:00Z"
///     }
/// }
/// ```
pub async fn health_check(state: web::Data<Arc<AppState>>) -> HttpResponse {
    let db_healthy = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Health check: store unreachable: {}", e);
            false
        }
    };

    let response = HealthResponse {
        status: if db_healthy { "healthy" } else { "unhealthy" }.to_string(),
        database: db_healthy,
        ws_connections: state.ws_registry.total_connections().await,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    };

    let status_code = if db_healthy {
        actix_web::http::StatusCode::OK
    } else {
        actix_web::http::StatusCode::SERVICE_UNAVAILABLE
    };

    HttpResponse::build(status_code).json(ApiResponse::success(response))
}

// ==========================================
// PROJECTS
// ==========================================

/// List projects, newest first.
///
/// ## Endpoint
///
/// `GET /api/projects?status=active&category=Medical%20Aid`
pub async fn list_projects(
    state: web::Data<Arc<AppState>>,
    query: web::Query<ProjectQuery>,
) -> HttpResponse {
    match state.projects.list(&query).await {
        Ok(projects) => {
            let projects: Vec<ProjectResponse> = projects.into_iter().map(ProjectResponse::from).collect();
            HttpResponse::Ok().json(ApiResponse::success(ProjectListResponse {
                total: projects.len(),
                projects,
            }))
        }
        Err(e) => service_error_response(&e, "Failed to load projects"),
    }
}

/// Create a project from the admin form.
///
/// ## Endpoint
///
/// `POST /api/projects`
///
/// ## Example
///
/// ```bash
/// curl -X POST http://127.0.0.1:8080/api/projects \
///   -H "Content-Type: application/json" \
///   -d '{
///     "title": "Clean Water Access Program",
///     "category": "Community Development",
///     "description": "Installing clean water systems",
///     "imageUrl": "/uploads/water.jpg",
///     "targetAmount": "600000",
///     "currentAmount": 423000
///   }'
/// ```
pub async fn create_project(
    state: web::Data<Arc<AppState>>,
    body: web::Json<ProjectPayload>,
) -> HttpResponse {
    match state.projects.create(body.into_inner()).await {
        Ok(project) => HttpResponse::Created().json(ApiResponse::success(ProjectResponse::from(project))),
        Err(e) => service_error_response(&e, "Failed to save project"),
    }
}

/// `GET /api/projects/{id}`
pub async fn get_project(state: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    let raw = path.into_inner();
    let Some(id) = parse_id(&raw) else {
        return not_found_response("Project", &raw);
    };

    match state.projects.get(id).await {
        Ok(project) => HttpResponse::Ok().json(ApiResponse::success(ProjectResponse::from(project))),
        Err(e) => service_error_response(&e, "Failed to load project"),
    }
}

/// Replace a project's editable fields.
///
/// ## Endpoint
///
/// `PUT /api/projects/{id}` with the same body as create.
pub async fn update_project(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    body: web::Json<ProjectPayload>,
) -> HttpResponse {
    let raw = path.into_inner();
    let Some(id) = parse_id(&raw) else {
        return not_found_response("Project", &raw);
    };

    match state.projects.update(id, body.into_inner()).await {
        Ok(project) => HttpResponse::Ok().json(ApiResponse::success(ProjectResponse::from(project))),
        Err(e) => service_error_response(&e, "Failed to save project"),
    }
}

/// `DELETE /api/projects/{id}`
pub async fn delete_project(state: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    let raw = path.into_inner();
    let Some(id) = parse_id(&raw) else {
        return not_found_response("Project", &raw);
    };

    match state.projects.delete(id).await {
        Ok(()) => HttpResponse::Ok().json(ApiResponse::success(DeletedResponse { id, deleted: true })),
        Err(e) => service_error_response(&e, "Failed to delete project"),
    }
}

/// Donations for one project, newest first, with totals.
///
/// ## Endpoint
///
/// `GET /api/projects/{id}/donations`
///
/// A project without donations (or an unknown one) yields an empty list.
pub async fn list_project_donations(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> HttpResponse {
    let raw = path.into_inner();
    let Some(id) = parse_id(&raw) else {
        return not_found_response("Project", &raw);
    };

    match state.donations.list_for_project(id).await {
        Ok(donations) => HttpResponse::Ok().json(ApiResponse::success(DonationListResponse::new(id, donations))),
        Err(e) => service_error_response(&e, "Failed to load donations"),
    }
}

// ==========================================
// DONATIONS
// ==========================================

/// Submit a donation.
///
/// ## Endpoint
///
/// `POST /api/donations`
///
/// ## Flow
///
/// 1. Validate and record the donation
/// 2. Add it to the project's current amount (if linked)
/// 3. Push `donation_received` and `total_collected` over WebSocket
/// 4. Return the donation with payment instructions
pub async fn create_donation(
    state: web::Data<Arc<AppState>>,
    body: web::Json<DonationRequest>,
) -> HttpResponse {
    let receipt = match state.donations.create(body.into_inner()).await {
        Ok(receipt) => receipt,
        Err(e) => return service_error_response(&e, "Failed to record donation"),
    };

    state.announce_donation(&receipt.donation).await;

    HttpResponse::Created().json(ApiResponse::success(receipt))
}

/// Site-wide totals.
///
/// ## Endpoint
///
/// `GET /api/stats`
pub async fn get_stats(state: web::Data<Arc<AppState>>) -> HttpResponse {
    match state.donations.stats().await {
        Ok(stats) => HttpResponse::Ok().json(ApiResponse::success(stats)),
        Err(e) => service_error_response(&e, "Failed to load stats"),
    }
}

// ==========================================
// UPLOADS
// ==========================================

/// Upload a project image.
///
/// ## Endpoint
///
/// `POST /api/upload`
///
/// The body is the raw image; `Content-Type` must be `image/png`,
/// `image/jpeg`, `image/gif` or `image/webp`.
///
/// ```bash
/// curl -X POST http://127.0.0.1:8080/api/upload \
///   -H "Content-Type: image/jpeg" --data-binary @water.jpg
/// ```
pub async fn upload_image(
    state: web::Data<Arc<AppState>>,
    req: HttpRequest,
    mut payload: web::Payload,
) -> HttpResponse {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if extension_for(&content_type).is_none() {
        return upload_error_response(&UploadError::UnsupportedType(content_type));
    }

    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!("Upload body read failed: {}", e);
                return HttpResponse::BadRequest()
                    .json(ApiResponse::<()>::error("INVALID_UPLOAD", "Failed to read upload body"));
            }
        };
        if let Err(e) = state.uploads.check_size(body.len() + chunk.len()) {
            return upload_error_response(&e);
        }
        body.extend_from_slice(&chunk);
    }

    match state.uploads.store(&content_type, &body).await {
        Ok(stored) => {
            info!("Upload stored at {}", stored.url);
            HttpResponse::Created().json(ApiResponse::success(stored))
        }
        Err(e) => upload_error_response(&e),
    }
}

/// `GET /uploads/{file}`
pub async fn serve_upload(state: web::Data<Arc<AppState>>, path: web::Path<String>) -> HttpResponse {
    let file = path.into_inner();
    debug!("Upload requested: {}", file);

    match state.uploads.read(&file).await {
        Ok((bytes, content_type)) => HttpResponse::Ok()
            .content_type(content_type)
            .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
            .body(bytes),
        Err(e) => upload_error_response(&e),
    }
}

// ==========================================
// PAYMENT DETAILS
// ==========================================

/// `GET /api/payment-details?type=bank&active=true`
pub async fn list_payment_details(
    state: web::Data<Arc<AppState>>,
    query: web::Query<PaymentDetailsQuery>,
) -> HttpResponse {
    match state.payment_details.list(&query).await {
        Ok(payment_details) => {
            HttpResponse::Ok().json(ApiResponse::success(PaymentDetailsListResponse { payment_details }))
        }
        Err(e) => service_error_response(&e, "Failed to load payment details"),
    }
}

/// `POST /api/payment-details`
pub async fn create_payment_details(
    state: web::Data<Arc<AppState>>,
    body: web::Json<PaymentDetailsPayload>,
) -> HttpResponse {
    match state.payment_details.create(body.into_inner()).await {
        Ok(record) => HttpResponse::Created().json(ApiResponse::success(record)),
        Err(e) => service_error_response(&e, "Failed to save payment details"),
    }
}

/// `PUT /api/payment-details/{id}`
pub async fn update_payment_details(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    body: web::Json<PaymentDetailsPayload>,
) -> HttpResponse {
    let raw = path.into_inner();
    let Some(id) = parse_id(&raw) else {
        return not_found_response("Payment details", &raw);
    };

    match state.payment_details.update(id, body.into_inner()).await {
        Ok(record) => HttpResponse::Ok().json(ApiResponse::success(record)),
        Err(e) => service_error_response(&e, "Failed to save payment details"),
    }
}

/// `DELETE /api/payment-details/{id}`
pub async fn delete_payment_details(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> HttpResponse {
    let raw = path.into_inner();
    let Some(id) = parse_id(&raw) else {
        return not_found_response("Payment details", &raw);
    };

    match state.payment_details.delete(id).await {
        Ok(()) => HttpResponse::Ok().json(ApiResponse::success(DeletedResponse { id, deleted: true })),
        Err(e) => service_error_response(&e, "Failed to delete payment details"),
    }
}
