// src/services/quote_service.rs

use chrono::Utc;
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        items_repo::{self, ItemTable},
        quote_repo::QuoteHeader,
        ClientRepository, OrganizationRepository, QuoteRepository,
    },
    models::{
        document::{items_total, price_items},
        quote::{Quote, QuoteDetail, QuoteOption, QuotePayload, QuoteStatus, QuoteSummary},
    },
    services::{client_service::SEARCH_LIMIT, numbering},
};

pub const QUOTE_SEARCH_MIN_CHARS: usize = 4;

pub fn parse_quote_status(raw: &str) -> Result<QuoteStatus, AppError> {
    raw.parse::<QuoteStatus>().map_err(AppError::InvalidStatus)
}

#[derive(Clone)]
pub struct QuoteService {
    repo: QuoteRepository,
    client_repo: ClientRepository,
    org_repo: OrganizationRepository,
}

impl QuoteService {
    pub fn new(repo: QuoteRepository, client_repo: ClientRepository, org_repo: OrganizationRepository) -> Self {
        Self { repo, client_repo, org_repo }
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &QuotePayload) -> Result<QuoteDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let default_vat = self.org_repo.default_vat(&mut *tx).await?;
        let items = price_items(&payload.items, default_vat)?;
        let header = QuoteHeader {
            client_id: payload.client_id,
            date: payload.date,
            due_date: payload.due_date,
            notes: payload.notes.clone(),
            total: items_total(&items),
        };

        let number = numbering::quote_number(Utc::now());
        let quote = self.repo.insert(&mut *tx, &number, &header).await?;
        items_repo::insert_items(&mut *tx, ItemTable::Quote, quote.id, &items).await?;

        let detail = self.detail(&mut *tx, quote).await?;
        tx.commit().await?;

        tracing::info!("Orçamento {} criado", detail.header.number);
        Ok(detail)
    }

    /// Substitui cabeçalho e itens numa única transação.
    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &QuotePayload) -> Result<QuoteDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let default_vat = self.org_repo.default_vat(&mut *tx).await?;
        let items = price_items(&payload.items, default_vat)?;
        let header = QuoteHeader {
            client_id: payload.client_id,
            date: payload.date,
            due_date: payload.due_date,
            notes: payload.notes.clone(),
            total: items_total(&items),
        };

        let quote = self
            .repo
            .update(&mut *tx, id, &header)
            .await?
            .ok_or_else(|| AppError::not_found("Quote", id))?;

        items_repo::delete_items(&mut *tx, ItemTable::Quote, id).await?;
        items_repo::insert_items(&mut *tx, ItemTable::Quote, id, &items).await?;

        let detail = self.detail(&mut *tx, quote).await?;
        tx.commit().await?;

        Ok(detail)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        match self.repo.delete(executor, id).await? {
            0 => Err(AppError::not_found("Quote", id)),
            _ => Ok(()),
        }
    }

    pub async fn get<'e, E>(&self, executor: E, id: Uuid) -> Result<QuoteDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let quote = self
            .repo
            .find_by_id(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::not_found("Quote", id))?;

        self.detail(&mut *conn, quote).await
    }

    pub async fn list(&self, status: Option<&str>) -> Result<Vec<QuoteSummary>, AppError> {
        let status = status.map(parse_quote_status).transpose()?;
        self.repo.list(status).await
    }

    pub async fn set_status<'e, E>(&self, executor: E, id: Uuid, status: &str) -> Result<Quote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let status = parse_quote_status(status)?;
        self.repo
            .set_status(executor, id, status)
            .await?
            .ok_or_else(|| AppError::not_found("Quote", id))
    }

    pub async fn search(&self, query: &str) -> Result<Vec<QuoteOption>, AppError> {
        let query = query.trim();
        if query.chars().count() < QUOTE_SEARCH_MIN_CHARS {
            return Ok(Vec::new());
        }
        self.repo.search_by_number(query, SEARCH_LIMIT).await
    }

    async fn detail(&self, conn: &mut PgConnection, quote: Quote) -> Result<QuoteDetail, AppError> {
        let client = self
            .client_repo
            .find_by_id(&mut *conn, quote.client_id)
            .await?
            .ok_or_else(|| AppError::not_found("Client", quote.client_id))?;
        let items = items_repo::list_items(&mut *conn, ItemTable::Quote, quote.id).await?;

        Ok(QuoteDetail { header: quote, client, items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing_maps_to_invalid_status() {
        assert_eq!(parse_quote_status("ACCEPTED").unwrap(), QuoteStatus::Accepted);
        assert!(matches!(parse_quote_status("PAID"), Err(AppError::InvalidStatus(s)) if s == "PAID"));
    }
}
