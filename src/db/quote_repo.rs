// src/db/quote_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::client_repo::escape_like,
    models::quote::{Quote, QuoteOption, QuoteStatus, QuoteSummary},
};

const SUMMARY_SELECT: &str = r#"
    SELECT q.id, q.number, q.client_id, c.name AS client_name,
           q.date, q.status, q.total, q.created_at
    FROM quotes q
    JOIN clients c ON c.id = q.client_id
"#;

/// Cabeçalho do orçamento como gravado (sem número nem status).
#[derive(Debug, Clone)]
pub struct QuoteHeader {
    pub client_id: Uuid,
    pub date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub total: Decimal,
}

#[derive(Clone)]
pub struct QuoteRepository {
    pool: PgPool,
}

impl QuoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(&self, executor: E, number: &str, header: &QuoteHeader) -> Result<Quote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quote = sqlx::query_as::<_, Quote>(
            r#"
            INSERT INTO quotes (number, client_id, date, due_date, notes, total)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(number)
        .bind(header.client_id)
        .bind(header.date)
        .bind(header.due_date)
        .bind(&header.notes)
        .bind(header.total)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_write(e, "Client not found"))?;

        Ok(quote)
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, header: &QuoteHeader) -> Result<Option<Quote>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quote = sqlx::query_as::<_, Quote>(
            r#"
            UPDATE quotes SET
                client_id = $2, date = $3, due_date = $4, notes = $5, total = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(header.client_id)
        .bind(header.date)
        .bind(header.due_date)
        .bind(&header.notes)
        .bind(header.total)
        .fetch_optional(executor)
        .await
        .map_err(|e| AppError::from_write(e, "Client not found"))?;

        Ok(quote)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM quotes WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Quote>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quote = sqlx::query_as::<_, Quote>("SELECT * FROM quotes WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(quote)
    }

    pub async fn set_status<'e, E>(&self, executor: E, id: Uuid, status: QuoteStatus) -> Result<Option<Quote>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quote = sqlx::query_as::<_, Quote>(
            "UPDATE quotes SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?;

        Ok(quote)
    }

    pub async fn set_signature_submission<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        submission_id: &str,
    ) -> Result<Option<Quote>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quote = sqlx::query_as::<_, Quote>(
            r#"
            UPDATE quotes
            SET status = 'SENT_FOR_SIGNATURE', signature_submission_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(submission_id)
        .fetch_optional(executor)
        .await?;

        Ok(quote)
    }

    // =========================================================================
    //  LEITURAS
    // =========================================================================

    pub async fn list(&self, status: Option<QuoteStatus>) -> Result<Vec<QuoteSummary>, AppError> {
        let sql = format!(
            "{} WHERE ($1::quote_status IS NULL OR q.status = $1) ORDER BY q.created_at DESC",
            SUMMARY_SELECT
        );
        let quotes = sqlx::query_as::<_, QuoteSummary>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        Ok(quotes)
    }

    pub async fn list_by_client(&self, client_id: Uuid) -> Result<Vec<QuoteSummary>, AppError> {
        let sql = format!("{} WHERE q.client_id = $1 ORDER BY q.date DESC", SUMMARY_SELECT);
        let quotes = sqlx::query_as::<_, QuoteSummary>(&sql)
            .bind(client_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(quotes)
    }

    pub async fn search_by_number(&self, query: &str, limit: i64) -> Result<Vec<QuoteOption>, AppError> {
        let quotes = sqlx::query_as::<_, QuoteOption>(
            r#"
            SELECT id, number FROM quotes
            WHERE number ILIKE '%' || $1 || '%'
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(escape_like(query))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(quotes)
    }

    /// Mais recentes, opcionalmente filtrados por ano/mês da data do documento.
    pub async fn recent(&self, year: Option<i32>, month: Option<i32>, limit: i64) -> Result<Vec<QuoteSummary>, AppError> {
        let sql = format!(
            r#"{}
            WHERE ($1::int IS NULL OR EXTRACT(YEAR FROM q.date)::int = $1)
              AND ($2::int IS NULL OR EXTRACT(MONTH FROM q.date)::int = $2)
            ORDER BY q.created_at DESC
            LIMIT $3"#,
            SUMMARY_SELECT
        );
        let quotes = sqlx::query_as::<_, QuoteSummary>(&sql)
            .bind(year)
            .bind(month)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(quotes)
    }
}
