// src/handlers/invoices.rs

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
        document::{ListQuery, UpdateStatusPayload},
        invoice::{Invoice, InvoiceDetail, InvoicePage, InvoicePayload, RetainerPayload},
    },
    services::{delivery_service::DeliveryReceipt, document_service::DocumentKind},
};

// POST /api/invoices
#[utoipa::path(
    post,
    path = "/api/invoices",
    tag = "Invoices",
    request_body = InvoicePayload,
    responses(
        (status = 201, description = "Fatura criada com número sequencial", body = InvoiceDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Número duplicado")
    )
)]
pub async fn create_invoice(
    State(app_state): State<AppState>,
    Json(payload): Json<InvoicePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let invoice = app_state.invoice_service
        .create(&app_state.db_pool, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(invoice)))
}

// GET /api/invoices?page=&status=
#[utoipa::path(
    get,
    path = "/api/invoices",
    tag = "Invoices",
    params(ListQuery),
    responses(
        (status = 200, description = "Página de 20 faturas", body = InvoicePage),
        (status = 400, description = "Status desconhecido")
    )
)]
pub async fn list_invoices(
    State(app_state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.invoice_service.list(&query).await?;
    Ok((StatusCode::OK, Json(page)))
}

// GET /api/invoices/{id}
#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "ID da Fatura")),
    responses(
        (status = 200, body = InvoiceDetail),
        (status = 404, description = "Fatura não encontrada")
    )
)]
pub async fn get_invoice(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = app_state.invoice_service.get(&app_state.db_pool, id).await?;
    Ok((StatusCode::OK, Json(invoice)))
}

// PUT /api/invoices/{id}
#[utoipa::path(
    put,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    request_body = InvoicePayload,
    params(("id" = Uuid, Path, description = "ID da Fatura")),
    responses(
        (status = 200, description = "Itens substituídos; número mantido", body = InvoiceDetail),
        (status = 404, description = "Fatura não encontrada")
    )
)]
pub async fn update_invoice(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<InvoicePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let invoice = app_state.invoice_service
        .update(&app_state.db_pool, id, &payload)
        .await?;

    Ok((StatusCode::OK, Json(invoice)))
}

// DELETE /api/invoices/{id}
#[utoipa::path(
    delete,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "ID da Fatura")),
    responses(
        (status = 204, description = "Fatura removida"),
        (status = 404, description = "Fatura não encontrada")
    )
)]
pub async fn delete_invoice(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.invoice_service.delete(&app_state.db_pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// PATCH /api/invoices/{id}/status
#[utoipa::path(
    patch,
    path = "/api/invoices/{id}/status",
    tag = "Invoices",
    request_body = UpdateStatusPayload,
    params(("id" = Uuid, Path, description = "ID da Fatura")),
    responses(
        (status = 200, body = Invoice),
        (status = 400, description = "Status inválido"),
        (status = 404, description = "Fatura não encontrada")
    )
)]
pub async fn update_invoice_status(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = app_state.invoice_service
        .set_status(&app_state.db_pool, id, &payload.status)
        .await?;

    Ok((StatusCode::OK, Json(invoice)))
}

// =============================================================================
//  CONVERSÕES
// =============================================================================

// POST /api/invoices/from-quote/{quote_id}
#[utoipa::path(
    post,
    path = "/api/invoices/from-quote/{quote_id}",
    tag = "Invoices",
    params(("quote_id" = Uuid, Path, description = "ID do Orçamento")),
    responses(
        (status = 201, description = "Fatura com os itens do orçamento, vencimento em 30 dias", body = InvoiceDetail),
        (status = 404, description = "Orçamento não encontrado")
    )
)]
pub async fn create_invoice_from_quote(
    State(app_state): State<AppState>,
    Path(quote_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let today = Utc::now().date_naive();

    let invoice = app_state.invoice_service
        .create_from_quote(&app_state.db_pool, quote_id, today)
        .await?;

    Ok((StatusCode::CREATED, Json(invoice)))
}

// POST /api/invoices/retainer
#[utoipa::path(
    post,
    path = "/api/invoices/retainer",
    tag = "Invoices",
    request_body = RetainerPayload,
    responses(
        (status = 201, description = "Fatura de adiantamento (percentual do orçamento)", body = InvoiceDetail),
        (status = 400, description = "Percentual fora de (0, 100]"),
        (status = 404, description = "Orçamento não encontrado")
    )
)]
pub async fn create_retainer_invoice(
    State(app_state): State<AppState>,
    Json(payload): Json<RetainerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let today = Utc::now().date_naive();

    let invoice = app_state.invoice_service
        .create_retainer(&app_state.db_pool, &payload, today)
        .await?;

    Ok((StatusCode::CREATED, Json(invoice)))
}

// POST /api/invoices/{id}/balance
#[utoipa::path(
    post,
    path = "/api/invoices/{id}/balance",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "ID da fatura de adiantamento")),
    responses(
        (status = 201, description = "Fatura de saldo com o adiantamento deduzido", body = InvoiceDetail),
        (status = 400, description = "A fatura não é de adiantamento"),
        (status = 404, description = "Fatura não encontrada")
    )
)]
pub async fn create_balance_invoice(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let today = Utc::now().date_naive();

    let invoice = app_state.invoice_service
        .create_balance(&app_state.db_pool, id, today)
        .await?;

    Ok((StatusCode::CREATED, Json(invoice)))
}

// POST /api/invoices/{id}/send
#[utoipa::path(
    post,
    path = "/api/invoices/{id}/send",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "ID da Fatura")),
    responses(
        (status = 200, description = "PDF enviado por e-mail; status SENT", body = DeliveryReceipt),
        (status = 422, description = "Cliente sem e-mail"),
        (status = 502, description = "Falha no provedor de e-mail")
    )
)]
pub async fn send_invoice(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let receipt = app_state.delivery_service
        .send(&app_state.db_pool, DocumentKind::Invoice, id)
        .await?;

    Ok((StatusCode::OK, Json(receipt)))
}
