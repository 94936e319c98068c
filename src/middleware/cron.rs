// src/middleware/cron.rs

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{common::error::AppError, config::AppState};

/// Protege as rotas de cron com `Authorization: Bearer <CRON_SECRET>`.
/// Sem `CRON_SECRET` configurado a rota fica aberta.
pub async fn cron_guard(
    State(app_state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(secret) = app_state.config.cron_secret.as_deref() else {
        return Ok(next.run(request).await);
    };

    match bearer {
        Some(TypedHeader(Authorization(token))) if token.token() == secret => Ok(next.run(request).await),
        _ => {
            tracing::warn!("Chamada ao cron rejeitada: token ausente ou inválido");
            Err(AppError::InvalidToken)
        }
    }
}
