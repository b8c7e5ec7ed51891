//! HTTP tests for report compilation.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn report_is_compiled_stored_and_deleted(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app_with_reports(pool, dir.path());

    let response = post_json(
        app.clone(),
        "/api/v1/scans/quick",
        json!({ "keywords": "banque" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let today = chrono::Utc::now().date_naive();
    let response = post_json(
        app.clone(),
        "/api/v1/reports",
        json!({
            "name": "Weekly summary",
            "report_start_date": today,
            "report_end_date": today,
            "recipients": "soc@bank.example, ciso@bank.example",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let id = json["data"]["id"].as_i64().unwrap();
    let file_path = json["data"]["file_path"].as_str().unwrap().to_string();
    assert!(std::path::Path::new(&file_path).exists());

    let json = body_json(get(app.clone(), &format!("/api/v1/reports/{id}")).await).await;
    assert_eq!(json["data"]["scan_ids"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"]["recipients"].as_array().unwrap().len(), 2);
    assert_eq!(json["data"]["recipients"][0]["email"], "soc@bank.example");

    let response = delete(app.clone(), &format!("/api/v1/reports/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(!std::path::Path::new(&file_path).exists());

    let response = delete(app, &format!("/api/v1/reports/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn inverted_report_range_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/reports",
        json!({
            "report_start_date": "2024-03-10",
            "report_end_date": "2024-03-01",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let json = body_json(get(app, "/api/v1/reports").await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}
