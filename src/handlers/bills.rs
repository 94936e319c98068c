// src/handlers/bills.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        bill::{Bill, BillDetail, BillPayload, BillSummary},
        document::{StatusFilter, UpdateStatusPayload},
    },
    services::{delivery_service::DeliveryReceipt, document_service::DocumentKind},
};

// POST /api/bills
#[utoipa::path(
    post,
    path = "/api/bills",
    tag = "Bills",
    request_body = BillPayload,
    responses(
        (status = 201, description = "Conta criada com número B-<millis>", body = BillDetail),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_bill(
    State(app_state): State<AppState>,
    Json(payload): Json<BillPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let bill = app_state.bill_service
        .create(&app_state.db_pool, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(bill)))
}

// GET /api/bills?status=
#[utoipa::path(
    get,
    path = "/api/bills",
    tag = "Bills",
    params(StatusFilter),
    responses(
        (status = 200, body = Vec<BillSummary>),
        (status = 400, description = "Status desconhecido")
    )
)]
pub async fn list_bills(
    State(app_state): State<AppState>,
    Query(filter): Query<StatusFilter>,
) -> Result<impl IntoResponse, AppError> {
    let bills = app_state.bill_service.list(filter.status.as_deref()).await?;
    Ok((StatusCode::OK, Json(bills)))
}

// GET /api/bills/{id}
#[utoipa::path(
    get,
    path = "/api/bills/{id}",
    tag = "Bills",
    params(("id" = Uuid, Path, description = "ID da Conta")),
    responses(
        (status = 200, body = BillDetail),
        (status = 404, description = "Conta não encontrada")
    )
)]
pub async fn get_bill(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let bill = app_state.bill_service.get(&app_state.db_pool, id).await?;
    Ok((StatusCode::OK, Json(bill)))
}

// PUT /api/bills/{id}
#[utoipa::path(
    put,
    path = "/api/bills/{id}",
    tag = "Bills",
    request_body = BillPayload,
    params(("id" = Uuid, Path, description = "ID da Conta")),
    responses(
        (status = 200, body = BillDetail),
        (status = 404, description = "Conta não encontrada")
    )
)]
pub async fn update_bill(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BillPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let bill = app_state.bill_service
        .update(&app_state.db_pool, id, &payload)
        .await?;

    Ok((StatusCode::OK, Json(bill)))
}

// DELETE /api/bills/{id}
#[utoipa::path(
    delete,
    path = "/api/bills/{id}",
    tag = "Bills",
    params(("id" = Uuid, Path, description = "ID da Conta")),
    responses(
        (status = 204, description = "Conta removida"),
        (status = 404, description = "Conta não encontrada")
    )
)]
pub async fn delete_bill(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.bill_service.delete(&app_state.db_pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// PATCH /api/bills/{id}/status
#[utoipa::path(
    patch,
    path = "/api/bills/{id}/status",
    tag = "Bills",
    request_body = UpdateStatusPayload,
    params(("id" = Uuid, Path, description = "ID da Conta")),
    responses(
        (status = 200, body = Bill),
        (status = 400, description = "Status inválido"),
        (status = 404, description = "Conta não encontrada")
    )
)]
pub async fn update_bill_status(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let bill = app_state.bill_service
        .set_status(&app_state.db_pool, id, &payload.status)
        .await?;

    Ok((StatusCode::OK, Json(bill)))
}

// POST /api/bills/from-quote/{quote_id}
#[utoipa::path(
    post,
    path = "/api/bills/from-quote/{quote_id}",
    tag = "Bills",
    params(("quote_id" = Uuid, Path, description = "ID do Orçamento")),
    responses(
        (status = 201, description = "Conta com os itens do orçamento, vencimento em 30 dias", body = BillDetail),
        (status = 404, description = "Orçamento não encontrado")
    )
)]
pub async fn create_bill_from_quote(
    State(app_state): State<AppState>,
    Path(quote_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let today = Utc::now().date_naive();

    let bill = app_state.bill_service
        .create_from_quote(&app_state.db_pool, quote_id, today)
        .await?;

    Ok((StatusCode::CREATED, Json(bill)))
}

// POST /api/bills/{id}/send
#[utoipa::path(
    post,
    path = "/api/bills/{id}/send",
    tag = "Bills",
    params(("id" = Uuid, Path, description = "ID da Conta")),
    responses(
        (status = 200, description = "PDF enviado por e-mail; status SENT", body = DeliveryReceipt),
        (status = 422, description = "Cliente sem e-mail"),
        (status = 502, description = "Falha no provedor de e-mail")
    )
)]
pub async fn send_bill(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let receipt = app_state.delivery_service
        .send(&app_state.db_pool, DocumentKind::Bill, id)
        .await?;

    Ok((StatusCode::OK, Json(receipt)))
}
