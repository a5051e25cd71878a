use axum::{
    extract::{Path, State},
    middleware,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use tracing::info;

use crate::middleware::require_api_token;
use crate::models::DailyReport;
use crate::state::AppState;
use crate::utils::errors::{bad_request_error, AppResult};
use crate::utils::format::ISO_DATE_FORMAT;

pub fn create_report_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/:tenant_id/reports/:date", get(get_daily_report))
        .route_layer(middleware::from_fn_with_state(state, require_api_token))
}

async fn get_daily_report(
    State(state): State<AppState>,
    Path((tenant_id, date)): Path<(i64, String)>,
) -> AppResult<Json<DailyReport>> {
    let day = NaiveDate::parse_from_str(&date, ISO_DATE_FORMAT)
        .map_err(|_| bad_request_error("date must be YYYY-MM-DD"))?;

    info!("📊 Reporte solicitado por HTTP: tenant {} día {}", tenant_id, day);
    let report = state.controller.reports().build_report(tenant_id, day).await?;
    Ok(Json(report))
}
