pub mod report_routes;
pub mod telegram_routes;

use axum::{extract::State, routing::get, Json, Router};
use tower_http::trace::TraceLayer;

use crate::dto::HealthResponse;
use crate::state::AppState;

/// Router completo de la API
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/telegram", telegram_routes::create_telegram_router())
        .nest("/api/tenants", report_routes::create_report_router(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.storage_label.to_string(),
        sessions: state.sessions_label.to_string(),
    })
}
