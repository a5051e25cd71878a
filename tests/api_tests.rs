use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use angkot_ledger::cache::MemorySessionStore;
use angkot_ledger::config::EnvironmentConfig;
use angkot_ledger::database::create_memory_pool;
use angkot_ledger::repositories::SqliteTripRepository;
use angkot_ledger::routes::create_router;
use angkot_ledger::state::AppState;
use angkot_ledger::utils::clock::FixedClock;

const TENANT: i64 = -1001;
const API_TOKEN: &str = "report-token";

async fn create_test_app(webhook_secret: Option<&str>) -> (Router, AppState) {
    let pool = create_memory_pool().await.expect("memory pool");
    let config = EnvironmentConfig {
        telegram_webhook_secret: webhook_secret.map(str::to_string),
        api_token: Some(API_TOKEN.to_string()),
        ..EnvironmentConfig::default()
    };
    let state = AppState::new(
        config,
        Arc::new(SqliteTripRepository::new(pool)),
        Arc::new(MemorySessionStore::new(Duration::from_secs(60))),
        Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2024, 12, 5).unwrap())),
        None,
        "sqlite",
        "memory",
    );
    (create_router(state.clone()), state)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    get_json_with_token(app, uri, Some(API_TOKEN)).await
}

async fn get_json_with_token(app: Router, uri: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
    let mut request = Request::builder().uri(uri);
    if let Some(token) = token {
        request = request.header("authorization", format!("Bearer {}", token));
    }
    let response = app.oneshot(request.body(Body::empty()).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = create_test_app(None).await;
    let (status, body) = get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "sqlite");
    assert_eq!(body["sessions"], "memory");
}

#[tokio::test]
async fn test_daily_report_json() {
    let (app, state) = create_test_app(None).await;
    let controller = &state.controller;
    controller.handle(TENANT, None, "/add_driver Ahmad").await;
    controller.handle(TENANT, None, "antar\nDriver: Ahmad\n1. Ali\n2. Umar").await;
    controller.handle(TENANT, None, "jemput\nDriver: Ahmad\n1. Ali").await;

    let (status, body) = get_json(app, &format!("/api/tenants/{}/reports/2024-12-05", TENANT)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 25000);
    assert_eq!(body["day"], "2024-12-05");
    let lines = body["drivers"][0]["passengers"].as_array().unwrap();
    assert_eq!(lines[0]["passenger_name"], "Ali");
    assert_eq!(lines[0]["fare"], 15000);
    assert_eq!(lines[0]["kind"], "round-trip");
    assert_eq!(lines[0]["return"], true);
    assert_eq!(lines[1]["kind"], "one-way");
}

#[tokio::test]
async fn test_daily_report_rejects_bad_date() {
    let (app, _) = create_test_app(None).await;
    let (status, body) = get_json(app, "/api/tenants/1/reports/05-12-2024").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_daily_report_requires_token() {
    let (app, _) = create_test_app(None).await;
    let uri = format!("/api/tenants/{}/reports/2024-12-05", TENANT);

    let (status, _) = get_json_with_token(app.clone(), &uri, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get_json_with_token(app, &uri, Some("guess")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_daily_report_disabled_without_token_config() {
    let pool = create_memory_pool().await.expect("memory pool");
    let state = AppState::new(
        EnvironmentConfig::default(),
        Arc::new(SqliteTripRepository::new(pool)),
        Arc::new(MemorySessionStore::new(Duration::from_secs(60))),
        Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2024, 12, 5).unwrap())),
        None,
        "sqlite",
        "memory",
    );

    let (status, _) = get_json(create_router(state), "/api/tenants/1/reports/2024-12-05").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_webhook_requires_secret() {
    let (app, _) = create_test_app(Some("s3cret")).await;
    let update = r#"{"update_id": 1, "message": {"message_id": 1, "chat": {"id": 5}, "text": "/ping"}}"#;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/telegram/webhook")
                .header("content-type", "application/json")
                .header("x-telegram-bot-api-secret-token", "wrong")
                .body(Body::from(update))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_webhook_without_telegram_client_is_unavailable() {
    let (app, _) = create_test_app(None).await;
    let update = r#"{"update_id": 1, "message": {"message_id": 1, "chat": {"id": 5}, "text": "/ping"}}"#;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/telegram/webhook")
                .header("content-type", "application/json")
                .body(Body::from(update))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
