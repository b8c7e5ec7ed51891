//! HTTP tests for alerts, false-alert markers and the dashboard.

mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{body_json, delete, get, post_empty, post_json};
use serde_json::json;
use sqlx::PgPool;
use veille_core::severity::Severity;
use veille_core::types::DbId;
use veille_db::models::alert::NewAlert;
use veille_db::models::scan::CreateScan;
use veille_db::models::scan_result::{CreateScanResult, ResultDetail};
use veille_db::repositories::{AlertRepo, FalseAlertRepo, ScanRepo, ScanResultRepo};

/// Seed one scan with one article result and an alert of `severity`.
async fn seed_alert(pool: &PgPool, severity: Severity) -> DbId {
    let scan = ScanRepo::create(
        pool,
        &CreateScan {
            name: Some("Manual".to_string()),
            site_ids: vec![],
            schedule_id: None,
            keywords: Some("banque".to_string()),
        },
    )
    .await
    .unwrap();

    let result = ScanResultRepo::create(
        pool,
        &CreateScanResult {
            scan_id: scan.id,
            date_posted: Utc::now(),
            source: "https://news.example/leak".to_string(),
            details: "Customer records leaked".to_string(),
            detail: ResultDetail::Article {
                title: "Data leak at bank".to_string(),
                author: "Reporter".to_string(),
            },
        },
    )
    .await
    .unwrap();

    AlertRepo::create_if_absent(
        pool,
        &NewAlert {
            scan_result_id: result.id,
            severity,
            message: "Data leak at bank".to_string(),
            recommendations: "Notify customers, Rotate credentials".to_string(),
        },
    )
    .await
    .unwrap()
    .unwrap()
    .id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn alert_detail_includes_source(pool: PgPool) {
    let id = seed_alert(&pool, Severity::High).await;
    let app = common::build_test_app(pool);

    let response = get(app, &format!("/api/v1/alerts/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["severity"], "high");
    assert_eq!(json["data"]["source"], "https://news.example/leak");
    assert_eq!(
        json["data"]["recommendations"],
        "Notify customers, Rotate credentials"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn marking_false_alert_is_idempotent(pool: PgPool) {
    let id = seed_alert(&pool, Severity::Medium).await;
    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/alerts/{id}/false");

    let response = post_json(app.clone(), &uri, json!({ "reason": "Satire site" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let first = body_json(response).await;
    assert_eq!(first["data"]["reason"], "Satire site");

    let response = post_json(app.clone(), &uri, json!({ "reason": "Again" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let second = body_json(response).await;
    assert_eq!(second["data"]["id"], first["data"]["id"]);
    assert_eq!(second["data"]["reason"], "Satire site");

    assert_eq!(FalseAlertRepo::count_for_alert(&pool, id).await.unwrap(), 1);

    let json = body_json(get(app, "/api/v1/alerts").await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn marking_false_alert_without_body_uses_empty_reason(pool: PgPool) {
    let id = seed_alert(&pool, Severity::Low).await;
    let app = common::build_test_app(pool);

    let response = post_empty(app, &format!("/api/v1/alerts/{id}/false")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["reason"], "");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn marking_missing_alert_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_empty(app, "/api/v1/alerts/999/false").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn resolved_alert_leaves_active_list(pool: PgPool) {
    let id = seed_alert(&pool, Severity::High).await;
    let app = common::build_test_app(pool);

    let json = body_json(get(app.clone(), "/api/v1/alerts").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let response = post_empty(app.clone(), &format!("/api/v1/alerts/{id}/resolve")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["resolved"], true);

    let json = body_json(get(app.clone(), "/api/v1/alerts").await).await;
    assert!(json["data"].as_array().unwrap().is_empty());

    let response = delete(app.clone(), &format!("/api/v1/alerts/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = get(app, &format!("/api/v1/alerts/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn dashboard_counts_unresolved_and_false_alerts(pool: PgPool) {
    let kept = seed_alert(&pool, Severity::High).await;
    let flagged = seed_alert(&pool, Severity::Low).await;
    let app = common::build_test_app(pool);

    let response = post_empty(app.clone(), &format!("/api/v1/alerts/{flagged}/false")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(get(app.clone(), "/api/v1/dashboard").await).await;
    assert_eq!(json["data"]["scans_count"], 2);
    assert_eq!(json["data"]["unresolved_alerts_count"], 2);
    assert_eq!(json["data"]["false_alerts_count"], 1);

    let json = body_json(get(app, "/api/v1/alerts").await).await;
    assert_eq!(json["data"][0]["id"], kept);
}
