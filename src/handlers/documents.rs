// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, services::document_service::DocumentKind};

// GET /api/pdf/{kind}/{id}
#[utoipa::path(
    get,
    path = "/api/pdf/{kind}/{id}",
    tag = "Documents",
    params(
        ("kind" = String, Path, description = "quote | invoice | bill"),
        ("id" = Uuid, Path, description = "ID do documento")
    ),
    responses(
        (status = 200, description = "PDF do documento", content_type = "application/pdf", body = Vec<u8>),
        (status = 400, description = "Tipo de documento desconhecido"),
        (status = 404, description = "Documento não encontrado")
    )
)]
pub async fn download_pdf(
    State(app_state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<Response, AppError> {
    let kind: DocumentKind = kind.parse()?;

    let document = app_state.document_service
        .render(&app_state.db_pool, kind, id)
        .await?;

    // Configura os Headers para o navegador baixar o PDF
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", document.filename)),
    ];

    Ok((headers, document.bytes).into_response())
}
