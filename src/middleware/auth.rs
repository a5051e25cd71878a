use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::state::AppState;
use crate::utils::errors::AppError;

/// Exige `Authorization: Bearer <API_TOKEN>` en la API de reportes
pub async fn require_api_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let expected = state
        .config
        .api_token
        .as_deref()
        .ok_or_else(|| AppError::ServiceUnavailable("report API is disabled".to_string()))?;

    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("bearer token required".to_string()))?;

    if provided != expected {
        warn!("⛔ Token inválido en la API de reportes");
        return Err(AppError::Unauthorized("invalid token".to_string()));
    }

    Ok(next.run(request).await)
}
