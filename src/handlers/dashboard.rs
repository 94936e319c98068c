// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::dashboard::{DashboardFilter, DashboardSummary},
};

// GET /api/dashboard?year=&month=
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    params(DashboardFilter),
    responses(
        (status = 200, description = "Contadores, somas e documentos recentes", body = DashboardSummary)
    )
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    Query(filter): Query<DashboardFilter>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.dashboard_service.summary(&filter).await?;
    Ok((StatusCode::OK, Json(summary)))
}
