// src/handlers/clients.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        client::{Client, ClientDetails, ClientOption, ClientPayload},
        document::SearchQuery,
    },
};

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clients",
    request_body = ClientPayload,
    responses(
        (status = 201, description = "Cliente criado", body = Client),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    Json(mut payload): Json<ClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.normalize();
    payload.validate()?;

    let client = app_state.client_service
        .create(&app_state.db_pool, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(client)))
}

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clients",
    responses(
        (status = 200, description = "Clientes, mais recentes primeiro", body = Vec<Client>)
    )
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let clients = app_state.client_service.list().await?;
    Ok((StatusCode::OK, Json(clients)))
}

// GET /api/clients/search?q=
#[utoipa::path(
    get,
    path = "/api/clients/search",
    tag = "Clients",
    params(SearchQuery),
    responses(
        (status = 200, description = "Até 15 clientes cujo nome contém o texto", body = Vec<ClientOption>)
    )
)]
pub async fn search_clients(
    State(app_state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let options = app_state.client_service.search(&query.q).await?;
    Ok((StatusCode::OK, Json(options)))
}

// GET /api/clients/{id}
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do Cliente")),
    responses(
        (status = 200, body = Client),
        (status = 404, description = "Cliente não encontrado")
    )
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let client = app_state.client_service.get(&app_state.db_pool, id).await?;
    Ok((StatusCode::OK, Json(client)))
}

// GET /api/clients/{id}/details
#[utoipa::path(
    get,
    path = "/api/clients/{id}/details",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do Cliente")),
    responses(
        (status = 200, description = "Cliente com seus orçamentos, faturas e contas", body = ClientDetails),
        (status = 404, description = "Cliente não encontrado")
    )
)]
pub async fn get_client_details(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let details = app_state.client_service.details(&app_state.db_pool, id).await?;
    Ok((StatusCode::OK, Json(details)))
}

// PUT /api/clients/{id}
#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "Clients",
    request_body = ClientPayload,
    params(("id" = Uuid, Path, description = "ID do Cliente")),
    responses(
        (status = 200, body = Client),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    )
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(mut payload): Json<ClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.normalize();
    payload.validate()?;

    let client = app_state.client_service
        .update(&app_state.db_pool, id, &payload)
        .await?;

    Ok((StatusCode::OK, Json(client)))
}

// DELETE /api/clients/{id}
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do Cliente")),
    responses(
        (status = 204, description = "Cliente removido"),
        (status = 404, description = "Cliente não encontrado"),
        (status = 409, description = "Cliente possui documentos")
    )
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.client_service.delete(&app_state.db_pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
