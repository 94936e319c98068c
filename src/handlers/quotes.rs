// src/handlers/quotes.rs

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
        document::{SearchQuery, StatusFilter, UpdateStatusPayload},
        quote::{Quote, QuoteDetail, QuoteOption, QuotePayload, QuoteSummary},
    },
    services::{
        delivery_service::{DeliveryReceipt, SignatureReceipt},
        document_service::DocumentKind,
    },
};

// POST /api/quotes
#[utoipa::path(
    post,
    path = "/api/quotes",
    tag = "Quotes",
    request_body = QuotePayload,
    responses(
        (status = 201, description = "Orçamento criado com número Q-<millis>", body = QuoteDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    )
)]
pub async fn create_quote(
    State(app_state): State<AppState>,
    Json(payload): Json<QuotePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let quote = app_state.quote_service
        .create(&app_state.db_pool, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(quote)))
}

// GET /api/quotes?status=
#[utoipa::path(
    get,
    path = "/api/quotes",
    tag = "Quotes",
    params(StatusFilter),
    responses(
        (status = 200, body = Vec<QuoteSummary>),
        (status = 400, description = "Status desconhecido")
    )
)]
pub async fn list_quotes(
    State(app_state): State<AppState>,
    Query(filter): Query<StatusFilter>,
) -> Result<impl IntoResponse, AppError> {
    let quotes = app_state.quote_service.list(filter.status.as_deref()).await?;
    Ok((StatusCode::OK, Json(quotes)))
}

// GET /api/quotes/search?q=
#[utoipa::path(
    get,
    path = "/api/quotes/search",
    tag = "Quotes",
    params(SearchQuery),
    responses(
        (status = 200, description = "Busca por número (mínimo 4 caracteres)", body = Vec<QuoteOption>)
    )
)]
pub async fn search_quotes(
    State(app_state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let options = app_state.quote_service.search(&query.q).await?;
    Ok((StatusCode::OK, Json(options)))
}

// GET /api/quotes/{id}
#[utoipa::path(
    get,
    path = "/api/quotes/{id}",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "ID do Orçamento")),
    responses(
        (status = 200, body = QuoteDetail),
        (status = 404, description = "Orçamento não encontrado")
    )
)]
pub async fn get_quote(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let quote = app_state.quote_service.get(&app_state.db_pool, id).await?;
    Ok((StatusCode::OK, Json(quote)))
}

// PUT /api/quotes/{id}
#[utoipa::path(
    put,
    path = "/api/quotes/{id}",
    tag = "Quotes",
    request_body = QuotePayload,
    params(("id" = Uuid, Path, description = "ID do Orçamento")),
    responses(
        (status = 200, description = "Itens substituídos e total recalculado", body = QuoteDetail),
        (status = 404, description = "Orçamento não encontrado")
    )
)]
pub async fn update_quote(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuotePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let quote = app_state.quote_service
        .update(&app_state.db_pool, id, &payload)
        .await?;

    Ok((StatusCode::OK, Json(quote)))
}

// DELETE /api/quotes/{id}
#[utoipa::path(
    delete,
    path = "/api/quotes/{id}",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "ID do Orçamento")),
    responses(
        (status = 204, description = "Orçamento removido"),
        (status = 404, description = "Orçamento não encontrado")
    )
)]
pub async fn delete_quote(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.quote_service.delete(&app_state.db_pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// PATCH /api/quotes/{id}/status
#[utoipa::path(
    patch,
    path = "/api/quotes/{id}/status",
    tag = "Quotes",
    request_body = UpdateStatusPayload,
    params(("id" = Uuid, Path, description = "ID do Orçamento")),
    responses(
        (status = 200, body = Quote),
        (status = 400, description = "Status inválido"),
        (status = 404, description = "Orçamento não encontrado")
    )
)]
pub async fn update_quote_status(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let quote = app_state.quote_service
        .set_status(&app_state.db_pool, id, &payload.status)
        .await?;

    Ok((StatusCode::OK, Json(quote)))
}

// POST /api/quotes/{id}/send
#[utoipa::path(
    post,
    path = "/api/quotes/{id}/send",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "ID do Orçamento")),
    responses(
        (status = 200, description = "PDF enviado por e-mail; status SENT", body = DeliveryReceipt),
        (status = 422, description = "Cliente sem e-mail"),
        (status = 502, description = "Falha no provedor de e-mail")
    )
)]
pub async fn send_quote(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let receipt = app_state.delivery_service
        .send(&app_state.db_pool, DocumentKind::Quote, id)
        .await?;

    Ok((StatusCode::OK, Json(receipt)))
}

// POST /api/quotes/{id}/sign
#[utoipa::path(
    post,
    path = "/api/quotes/{id}/sign",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "ID do Orçamento")),
    responses(
        (status = 200, description = "Submissão criada; status SENT_FOR_SIGNATURE", body = SignatureReceipt),
        (status = 422, description = "Cliente sem e-mail"),
        (status = 502, description = "Falha no provedor de assinatura")
    )
)]
pub async fn send_quote_for_signature(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let receipt = app_state.delivery_service
        .send_for_signature(&app_state.db_pool, id)
        .await?;

    Ok((StatusCode::OK, Json(receipt)))
}
