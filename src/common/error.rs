// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Requisição inválida: {0}")]
    BadRequest(String),

    #[error("Status inválido: {0}")]
    InvalidStatus(String),

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    // Violação da constraint UNIQUE em `number` (faturas, contas, orçamentos)
    #[error("Número de documento duplicado")]
    DuplicateNumber,

    #[error("Conflito: {0}")]
    Conflict(String),

    #[error("O cliente não possui e-mail")]
    ClientHasNoEmail,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Falha ao gerar PDF: {0}")]
    PdfError(String),

    #[error("Falha no serviço externo: {0}")]
    ExternalService(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Converte erros do sqlx olhando para constraints conhecidas.
    /// UNIQUE em `number` vira DuplicateNumber, FK vira Conflict.
    pub fn from_write(e: sqlx::Error, conflict_message: &str) -> Self {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() {
                return AppError::DuplicateNumber;
            }
            if db_err.is_foreign_key_violation() {
                return AppError::Conflict(conflict_message.to_string());
            }
        }
        AppError::DatabaseError(e)
    }

    pub fn not_found(what: &str, id: impl std::fmt::Display) -> Self {
        AppError::ResourceNotFound(format!("{} {}", what, id))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .map(|e| e.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "One or more fields are invalid.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidStatus(status) => (StatusCode::BAD_REQUEST, format!("Invalid status: {}", status)),
            AppError::ResourceNotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
            AppError::DuplicateNumber => (StatusCode::CONFLICT, "DUPLICATE_NUMBER".to_string()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::ClientHasNoEmail => (StatusCode::UNPROCESSABLE_ENTITY, "Client has no email address".to_string()),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or missing token.".to_string()),
            AppError::ExternalService(ref msg) => {
                tracing::error!("Falha em serviço externo: {}", msg);
                (StatusCode::BAD_GATEWAY, "An external service failed.".to_string())
            }

            // Todo o resto (banco, fontes, PDF, anyhow) vira 500.
            // O `tracing` loga a mensagem detalhada do `thiserror`.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "An unexpected error occurred.".to_string())
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn duplicate_number_is_a_conflict() {
        let response = AppError::DuplicateNumber.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["error"], "DUPLICATE_NUMBER");
    }

    #[tokio::test]
    async fn not_found_names_the_resource() {
        let response = AppError::not_found("Invoice", "abc").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Invoice abc not found");
    }

    #[tokio::test]
    async fn internal_details_are_not_leaked() {
        let response = AppError::PdfError("layout overflow".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(!body["error"].as_str().unwrap().contains("layout"));
    }

    #[tokio::test]
    async fn external_failures_map_to_bad_gateway() {
        let response = AppError::ExternalService("brevo 500".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn row_not_found_stays_a_database_error() {
        let err = AppError::from_write(sqlx::Error::RowNotFound, "x");
        assert!(matches!(err, AppError::DatabaseError(sqlx::Error::RowNotFound)));
    }
}
