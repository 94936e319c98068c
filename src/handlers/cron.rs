// src/handlers/cron.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;

use crate::{common::error::AppError, config::AppState, models::recurring::RecurringRunReport};

// GET|POST /api/cron/process-recurring
#[utoipa::path(
    get,
    path = "/api/cron/process-recurring",
    tag = "Cron",
    responses(
        (status = 200, description = "Documentos recorrentes gerados e vencidos marcados", body = RecurringRunReport),
        (status = 401, description = "CRON_SECRET configurado e token ausente ou inválido")
    ),
    security(("cron_secret" = []))
)]
pub async fn process_recurring(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let today = Utc::now().date_naive();

    let report = app_state.recurring_service
        .process_due(&app_state.db_pool, today)
        .await?;

    Ok((StatusCode::OK, Json(report)))
}
