//! HTTP-level tests over the in-memory store.

use std::sync::Arc;

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use serde_json::{json, Value};

use donation_site::config::AppConfig;
use donation_site::db::{DocumentStore, MemoryStore};
use donation_site::{api, AppState};

fn state(dir: &tempfile::TempDir) -> Arc<AppState> {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    Arc::new(AppState::new(store, AppConfig::in_memory(dir.path())))
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .app_data(api::json_config())
                .app_data(api::query_config())
                .configure(api::configure_routes),
        )
        .await
    };
}

fn clean_water() -> Value {
    json!({
        "title": "Clean Water Access Program",
        "category": "Community Development",
        "description": "Installing clean water systems",
        "imageUrl": "https://images.example.org/water.jpg",
        "targetAmount": 600000,
        "currentAmount": "423000"
    })
}

#[actix_web::test]
async fn project_crud() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(&dir);
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/projects")
        .set_json(clean_water())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["currentAmount"], 423000);
    assert_eq!(body["data"]["status"], "active");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get().uri("/api/projects").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["total"], 1);

    let mut update = clean_water();
    update["status"] = json!("completed");
    let req = test::TestRequest::put()
        .uri(&format!("/api/projects/{}", id))
        .set_json(update)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["id"], id.as_str());
    assert_eq!(body["data"]["status"], "completed");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/projects/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/projects/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[actix_web::test]
async fn malformed_and_unknown_ids_are_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(&dir);
    let app = app!(state);

    for uri in ["/api/projects/42", "/api/projects/00000000-0000-0000-0000-000000000099"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[actix_web::test]
async fn validation_errors_use_the_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(&dir);
    let app = app!(state);

    let mut missing_title = clean_water();
    missing_title["title"] = json!("");
    let req = test::TestRequest::post()
        .uri("/api/projects")
        .set_json(missing_title)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "Title is required");

    let req = test::TestRequest::post()
        .uri("/api/projects")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn donations_accumulate_into_project_and_stats() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(&dir);
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/projects")
        .set_json(clean_water())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/donations")
        .set_json(json!({
            "projectId": id,
            "name": "Jane Doe",
            "email": "jane@example.org",
            "amount": 1000,
            "paymentMethod": "card"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["message"], "Thank you for your donation!");

    let req = test::TestRequest::post()
        .uri("/api/donations")
        .set_json(json!({
            "projectId": "general",
            "name": "Sam",
            "email": "sam@example.org",
            "amount": "250",
            "paymentMethod": "bank"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri(&format!("/api/projects/{}", id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["currentAmount"], 424000);

    let req = test::TestRequest::get()
        .uri(&format!("/api/projects/{}/donations", id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["totalDonors"], 1);
    assert_eq!(body["data"]["totalAmount"], 1000);

    let req = test::TestRequest::get().uri("/api/stats").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["totalCollected"], 1250);
    assert_eq!(body["data"]["formattedTotal"], "$1,250");
    assert_eq!(body["data"]["donationCount"], 2);
}

#[actix_web::test]
async fn donation_without_payment_method_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(&dir);
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/donations")
        .set_json(json!({
            "name": "Jane Doe",
            "email": "jane@example.org",
            "amount": 100
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["message"], "Please select a payment method");
}

#[actix_web::test]
async fn upload_then_serve() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(&dir);
    let app = app!(state);

    let image = vec![0x89, b'P', b'N', b'G', 1, 2, 3];
    let req = test::TestRequest::post()
        .uri("/api/upload")
        .insert_header((header::CONTENT_TYPE, "image/png"))
        .set_payload(image.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let url = body["data"]["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/") && url.ends_with(".png"));

    let req = test::TestRequest::get().uri(&url).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
    let served = test::read_body(resp).await;
    assert_eq!(served.as_ref(), image.as_slice());

    let req = test::TestRequest::post()
        .uri("/api/upload")
        .insert_header((header::CONTENT_TYPE, "text/plain"))
        .set_payload("hello")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn payment_details_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(&dir);
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/payment-details")
        .set_json(json!({
            "type": "crypto",
            "currency": "Bitcoin",
            "walletAddress": "bc1qexample",
            "network": "BTC"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["currency"], "bitcoin");
    assert_eq!(body["data"]["isActive"], true);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/payment-details/{}", id))
        .set_json(json!({
            "type": "crypto",
            "currency": "bitcoin",
            "walletAddress": "bc1qexample",
            "network": "BTC",
            "isActive": false
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/payment-details?active=true")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["paymentDetails"].as_array().unwrap().len(), 0);

    let req = test::TestRequest::get().uri("/api/payment-details").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["paymentDetails"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/payment-details/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/payment-details")
        .set_json(json!({ "type": "bank", "currency": "usd" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn health_reports_store() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(&dir);
    let app = app!(state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["database"], true);
}

#[actix_web::test]
async fn malformed_query_uses_the_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(&dir);
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/api/payment-details?active=yes")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}
