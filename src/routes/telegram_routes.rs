use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
use serde_json::{json, Value};
use tracing::warn;

use crate::dto::Update;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

pub fn create_telegram_router() -> Router<AppState> {
    Router::new().route("/webhook", post(webhook))
}

async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(update): Json<Update>,
) -> AppResult<Json<Value>> {
    if let Some(secret) = &state.config.telegram_webhook_secret {
        let provided = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if provided != Some(secret.as_str()) {
            warn!("⛔ Webhook con secret inválido");
            return Err(AppError::Unauthorized("invalid webhook secret".to_string()));
        }
    }

    let dispatcher = state
        .dispatcher
        .as_ref()
        .ok_or_else(|| AppError::ServiceUnavailable("Telegram is not configured".to_string()))?;

    // se responde de inmediato; las respuestas salen por sendMessage
    dispatcher.dispatch(update).await;
    Ok(Json(json!({ "ok": true })))
}
