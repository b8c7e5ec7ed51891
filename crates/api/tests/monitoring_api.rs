//! HTTP tests for sites, schedules and scans.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{body_json, delete, get, post_json};
use serde_json::json;
use sqlx::PgPool;

async fn create_site(app: axum::Router, name: &str) -> i64 {
    let response = post_json(
        app,
        "/api/v1/sites",
        json!({ "name": name, "url": format!("https://{name}.example") }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Sites
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn site_create_list_delete(pool: PgPool) {
    let app = common::build_test_app(pool);
    let id = create_site(app.clone(), "lemonde").await;

    let json = body_json(get(app.clone(), "/api/v1/sites").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["name"], "lemonde");

    let response = delete(app.clone(), &format!("/api/v1/sites/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete(app, &format!("/api/v1/sites/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn blank_site_name_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/sites", json!({ "name": "   " })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn schedule_create_registers_both_jobs(pool: PgPool) {
    let app = common::build_test_app(pool);
    let site = create_site(app.clone(), "cameroon-tribune").await;
    let schedule_time = Utc::now() + Duration::days(1);

    let response = post_json(
        app.clone(),
        "/api/v1/schedules",
        json!({
            "name": "Morning sweep",
            "site_ids": [site],
            "schedule_time": schedule_time,
            "frequency": "Weekly",
            "keywords": "banque fraude",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let id = json["data"]["id"].as_i64().unwrap();
    assert_eq!(json["data"]["frequency"], "weekly");
    assert_eq!(json["data"]["site_ids"], json!([site]));
    assert_eq!(
        json["data"]["jobs"],
        json!([
            format!("schedule-{id}-once"),
            format!("schedule-{id}-recurring")
        ])
    );

    let json = body_json(get(app.clone(), &format!("/api/v1/schedules/{id}")).await).await;
    assert_eq!(json["data"]["jobs"].as_array().unwrap().len(), 2);

    let json = body_json(get(app, "/health").await).await;
    assert_eq!(json["scheduled_jobs"], 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn schedule_with_unknown_frequency_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app.clone(),
        "/api/v1/schedules",
        json!({
            "schedule_time": Utc::now() + Duration::days(1),
            "frequency": "fortnightly",
            "keywords": "banque",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(get(app, "/api/v1/schedules").await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn schedule_with_blank_keywords_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/schedules",
        json!({
            "schedule_time": Utc::now() + Duration::days(1),
            "frequency": "daily",
            "keywords": "  ",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_schedule_twice_returns_404_second_time(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app.clone(),
        "/api/v1/schedules",
        json!({
            "schedule_time": Utc::now() + Duration::hours(2),
            "frequency": "hourly",
            "keywords": "piratage",
        }),
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = delete(app.clone(), &format!("/api/v1/schedules/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json = body_json(get(app.clone(), "/health").await).await;
    assert_eq!(json["scheduled_jobs"], 0);

    let response = delete(app.clone(), &format!("/api/v1/schedules/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(app, &format!("/api/v1/schedules/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_schedule_delete_keeps_its_jobs(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app.clone(),
        "/api/v1/schedules",
        json!({
            "schedule_time": Utc::now() + Duration::days(1),
            "frequency": "daily",
            "keywords": "banque",
        }),
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    pool.close().await;

    let response = delete(app.clone(), &format!("/api/v1/schedules/{id}")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(get(app, "/health").await).await;
    assert_eq!(json["db_healthy"], false);
    assert_eq!(json["scheduled_jobs"], 2);
}

// ---------------------------------------------------------------------------
// Scans
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn quick_scan_is_named_after_keywords(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app.clone(),
        "/api/v1/scans/quick",
        json!({ "keywords": " fuite de données " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let id = json["data"]["id"].as_i64().unwrap();
    assert_eq!(json["data"]["name"], "Quick Scan: fuite de données");
    assert_eq!(json["data"]["status"], "pending");

    let json = body_json(get(app, &format!("/api/v1/scans/{id}")).await).await;
    assert_eq!(json["data"]["keywords"], "fuite de données");
    assert!(json["data"]["results"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn quick_scan_without_keywords_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app.clone(), "/api/v1/scans/quick", json!({ "keywords": "" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(get(app, "/api/v1/scans").await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn adhoc_scan_lists_sites_and_deletes(pool: PgPool) {
    let app = common::build_test_app(pool);
    let site = create_site(app.clone(), "actu-cameroun").await;

    let response = post_json(
        app.clone(),
        "/api/v1/scans",
        json!({ "name": "Manual", "site_ids": [site], "keywords": "banque" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let json = body_json(get(app.clone(), &format!("/api/v1/scans/{id}")).await).await;
    assert_eq!(json["data"]["site_ids"], json!([site]));

    let response = delete(app.clone(), &format!("/api/v1/scans/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app, &format!("/api/v1/scans/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn scan_with_unknown_site_is_a_bad_request(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/scans",
        json!({ "site_ids": [4242], "keywords": "banque" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
