// src/db/bill_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        bill::{Bill, BillSummary},
        document::{InvoiceStatus, RecurringInterval},
    },
};

const SUMMARY_SELECT: &str = r#"
    SELECT b.id, b.number, b.client_id, c.name AS client_name, b.date, b.due_date,
           b.status, b.total, b.is_recurring, b.created_at
    FROM bills b
    JOIN clients c ON c.id = b.client_id
"#;

#[derive(Debug, Clone)]
pub struct BillRecord {
    pub client_id: Uuid,
    pub quote_id: Option<Uuid>,
    pub date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub total: Decimal,
    pub recurring_interval: Option<RecurringInterval>,
    pub next_recurring_date: Option<NaiveDate>,
}

impl BillRecord {
    fn is_recurring(&self) -> bool {
        self.recurring_interval.is_some()
    }
}

#[derive(Clone)]
pub struct BillRepository {
    pool: PgPool,
}

impl BillRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(&self, executor: E, number: &str, record: &BillRecord) -> Result<Bill, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bill = sqlx::query_as::<_, Bill>(
            r#"
            INSERT INTO bills (
                number, client_id, quote_id, date, due_date, notes, total,
                is_recurring, recurring_interval, next_recurring_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(number)
        .bind(record.client_id)
        .bind(record.quote_id)
        .bind(record.date)
        .bind(record.due_date)
        .bind(&record.notes)
        .bind(record.total)
        .bind(record.is_recurring())
        .bind(record.recurring_interval)
        .bind(record.next_recurring_date)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_write(e, "Client or quote not found"))?;

        Ok(bill)
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, record: &BillRecord) -> Result<Option<Bill>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bill = sqlx::query_as::<_, Bill>(
            r#"
            UPDATE bills SET
                client_id = $2, quote_id = $3, date = $4, due_date = $5, notes = $6, total = $7,
                is_recurring = $8, recurring_interval = $9, next_recurring_date = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(record.client_id)
        .bind(record.quote_id)
        .bind(record.date)
        .bind(record.due_date)
        .bind(&record.notes)
        .bind(record.total)
        .bind(record.is_recurring())
        .bind(record.recurring_interval)
        .bind(record.next_recurring_date)
        .fetch_optional(executor)
        .await
        .map_err(|e| AppError::from_write(e, "Client or quote not found"))?;

        Ok(bill)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM bills WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Bill>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bill = sqlx::query_as::<_, Bill>("SELECT * FROM bills WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(bill)
    }

    pub async fn set_status<'e, E>(&self, executor: E, id: Uuid, status: InvoiceStatus) -> Result<Option<Bill>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bill = sqlx::query_as::<_, Bill>(
            "UPDATE bills SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?;

        Ok(bill)
    }

    // --- Recorrência ---

    pub async fn due_recurring_ids<'e, E>(&self, executor: E, today: NaiveDate) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM bills
            WHERE is_recurring AND next_recurring_date <= $1
            ORDER BY next_recurring_date, created_at
            "#,
        )
        .bind(today)
        .fetch_all(executor)
        .await?;

        Ok(ids)
    }

    pub async fn lock_if_due<'e, E>(&self, executor: E, id: Uuid, today: NaiveDate) -> Result<Option<Bill>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bill = sqlx::query_as::<_, Bill>(
            r#"
            SELECT * FROM bills
            WHERE id = $1 AND is_recurring AND next_recurring_date <= $2
            FOR UPDATE
            "#,
        )
        .bind(id)
        .bind(today)
        .fetch_optional(executor)
        .await?;

        Ok(bill)
    }

    pub async fn set_next_recurring_date<'e, E>(&self, executor: E, id: Uuid, next: NaiveDate) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE bills SET next_recurring_date = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(next)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn mark_overdue<'e, E>(&self, executor: E, today: NaiveDate) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE bills SET status = 'OVERDUE', updated_at = NOW() WHERE status = 'SENT' AND due_date < $1",
        )
        .bind(today)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    // --- Leituras ---

    pub async fn list(&self, status: Option<InvoiceStatus>) -> Result<Vec<BillSummary>, AppError> {
        let sql = format!(
            "{} WHERE ($1::invoice_status IS NULL OR b.status = $1) ORDER BY b.created_at DESC",
            SUMMARY_SELECT
        );
        let bills = sqlx::query_as::<_, BillSummary>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        Ok(bills)
    }

    pub async fn list_by_client(&self, client_id: Uuid) -> Result<Vec<BillSummary>, AppError> {
        let sql = format!("{} WHERE b.client_id = $1 ORDER BY b.date DESC", SUMMARY_SELECT);
        let bills = sqlx::query_as::<_, BillSummary>(&sql)
            .bind(client_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(bills)
    }

    pub async fn recent(&self, year: Option<i32>, month: Option<i32>, limit: i64) -> Result<Vec<BillSummary>, AppError> {
        let sql = format!(
            r#"{}
            WHERE ($1::int IS NULL OR EXTRACT(YEAR FROM b.date)::int = $1)
              AND ($2::int IS NULL OR EXTRACT(MONTH FROM b.date)::int = $2)
            ORDER BY b.created_at DESC
            LIMIT $3"#,
            SUMMARY_SELECT
        );
        let bills = sqlx::query_as::<_, BillSummary>(&sql)
            .bind(year)
            .bind(month)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(bills)
    }
}
