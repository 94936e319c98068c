// src/handlers/settings.rs

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::organization::{Organization, UpdateOrganizationRequest},
    services::{
        document_service::TemplateInfo,
        settings_service::{CleanupReport, SeedReport, SeedRequest},
    },
};

// GET /api/settings
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses(
        (status = 200, description = "Organização (null se ainda não configurada)", body = Organization)
    )
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let org = app_state.settings_service.get(&app_state.db_pool).await?;
    Ok((StatusCode::OK, Json(org)))
}

// PUT /api/settings
#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Settings",
    request_body = UpdateOrganizationRequest,
    responses(
        (status = 200, description = "Organização criada ou atualizada", body = Organization),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    Json(payload): Json<UpdateOrganizationRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let org = app_state.settings_service
        .upsert(&app_state.db_pool, &payload)
        .await?;

    Ok((StatusCode::OK, Json(org)))
}

// POST /api/settings/logo  (corpo: bytes do PNG)
#[utoipa::path(
    post,
    path = "/api/settings/logo",
    tag = "Settings",
    request_body(content = Vec<u8>, content_type = "image/png"),
    responses(
        (status = 200, body = Organization),
        (status = 400, description = "Arquivo não é PNG"),
        (status = 404, description = "Organização ainda não configurada")
    )
)]
pub async fn upload_logo(
    State(app_state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let org = app_state.settings_service.upload_logo(&body).await?;
    Ok((StatusCode::OK, Json(org)))
}

// GET /api/settings/templates
#[utoipa::path(
    get,
    path = "/api/settings/templates",
    tag = "Settings",
    responses(
        (status = 200, body = Vec<TemplateInfo>)
    )
)]
pub async fn list_templates(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok((StatusCode::OK, Json(app_state.settings_service.templates())))
}

// =============================================================================
//  DADOS DE TESTE
// =============================================================================

// POST /api/dev/seed
#[utoipa::path(
    post,
    path = "/api/dev/seed",
    tag = "Dev",
    request_body = SeedRequest,
    responses(
        (status = 201, body = SeedReport),
        (status = 400, description = "count fora de 1..=100")
    )
)]
pub async fn seed_demo_data(
    State(app_state): State<AppState>,
    Json(payload): Json<SeedRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let report = app_state.settings_service
        .seed_demo_data(&app_state.db_pool, payload.count)
        .await?;

    Ok((StatusCode::CREATED, Json(report)))
}

// DELETE /api/dev/test-data
#[utoipa::path(
    delete,
    path = "/api/dev/test-data",
    tag = "Dev",
    responses(
        (status = 200, description = "Clientes client%@example.com removidos com seus documentos", body = CleanupReport)
    )
)]
pub async fn delete_test_data(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state.settings_service
        .delete_test_data(&app_state.db_pool)
        .await?;

    Ok((StatusCode::OK, Json(report)))
}
