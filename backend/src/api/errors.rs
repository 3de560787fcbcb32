//! Mapping from service errors to HTTP responses.
//!
//! | Error | Status | Code |
//! |-------|--------|------|
//! | `Validation` | 400 | `VALIDATION_ERROR` |
//! | `NotFound` | 404 | `NOT_FOUND` |
//! | `Storage` | 500 | `STORAGE_ERROR` |
//! | `Gateway` | 502 | `PAYMENT_GATEWAY_ERROR` |
//! | `Broadcast` | 500 | `INTERNAL_ERROR` |
//!
//! Server-side failures answer with the caller's fallback message; the
//! detail only goes to the log.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use tracing::{error, warn};

use crate::models::ApiResponse;
use crate::services::{ServiceError, UploadError};

/// Status, error code and client-visible message for a service error.
pub fn describe(err: &ServiceError, fallback: &str) -> (StatusCode, &'static str, String) {
    match err {
        ServiceError::Validation(message) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message.clone())
        }
        ServiceError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        ServiceError::Storage(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "STORAGE_ERROR",
            fallback.to_string(),
        ),
        ServiceError::Gateway(_) => (
            StatusCode::BAD_GATEWAY,
            "PAYMENT_GATEWAY_ERROR",
            fallback.to_string(),
        ),
        ServiceError::Broadcast(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            fallback.to_string(),
        ),
    }
}

/// Log a service error and build its envelope response.
pub fn service_error_response(err: &ServiceError, fallback: &str) -> HttpResponse {
    let (status, code, message) = describe(err, fallback);
    if status.is_server_error() {
        error!("{}: {}", fallback, err);
    } else {
        warn!("{}: {}", fallback, err);
    }
    HttpResponse::build(status).json(ApiResponse::<()>::error(code, &message))
}

/// Envelope response for upload failures.
pub fn upload_error_response(err: &UploadError) -> HttpResponse {
    let (status, code, message) = match err {
        UploadError::UnsupportedType(_) | UploadError::Empty | UploadError::InvalidName(_) => {
            (StatusCode::BAD_REQUEST, "INVALID_UPLOAD", err.to_string())
        }
        UploadError::TooLarge { .. } => (StatusCode::BAD_REQUEST, "UPLOAD_TOO_LARGE", err.to_string()),
        UploadError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        UploadError::Io(e) => {
            error!("Upload storage failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UPLOAD_FAILED",
                "Failed to store upload".to_string(),
            )
        }
    };
    HttpResponse::build(status).json(ApiResponse::<()>::error(code, &message))
}

/// 404 for a path id that is not a UUID.
pub fn not_found_response(entity: &str, raw_id: &str) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<()>::error(
        "NOT_FOUND",
        &format!("{} not found: {}", entity, raw_id),
    ))
}
