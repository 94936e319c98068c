// src/db/invoice_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        document::InvoiceStatus,
        invoice::{Invoice, InvoiceFlags, InvoiceSummary},
    },
};

const SUMMARY_SELECT: &str = r#"
    SELECT i.id, i.number, i.client_id, c.name AS client_name, i.date, i.due_date,
           i.status, i.total, i.is_recurring, i.is_retainer, i.is_balance, i.created_at
    FROM invoices i
    JOIN clients c ON c.id = i.client_id
"#;

/// Tudo que é gravado numa fatura além do número e do status.
#[derive(Debug, Clone)]
pub struct InvoiceRecord {
    pub client_id: Uuid,
    pub quote_id: Option<Uuid>,
    pub date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub total: Decimal,
    pub flags: InvoiceFlags,
}

#[derive(Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(&self, executor: E, number: &str, record: &InvoiceRecord) -> Result<Invoice, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let f = &record.flags;
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            INSERT INTO invoices (
                number, client_id, quote_id, date, due_date, notes, total,
                is_recurring, recurring_interval, next_recurring_date,
                is_retainer, retainer_percentage,
                is_balance, retainer_invoice_id, retainer_deduction_amount
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
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
        .bind(f.is_recurring)
        .bind(f.recurring_interval)
        .bind(f.next_recurring_date)
        .bind(f.is_retainer)
        .bind(f.retainer_percentage)
        .bind(f.is_balance)
        .bind(f.retainer_invoice_id)
        .bind(f.retainer_deduction_amount)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_write(e, "Client, quote or retainer invoice not found"))?;

        Ok(invoice)
    }

    /// Atualiza o cabeçalho; o número nunca muda.
    pub async fn update<'e, E>(&self, executor: E, id: Uuid, record: &InvoiceRecord) -> Result<Option<Invoice>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let f = &record.flags;
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            UPDATE invoices SET
                client_id = $2, quote_id = $3, date = $4, due_date = $5, notes = $6, total = $7,
                is_recurring = $8, recurring_interval = $9, next_recurring_date = $10,
                is_retainer = $11, retainer_percentage = $12,
                is_balance = $13, retainer_invoice_id = $14, retainer_deduction_amount = $15,
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
        .bind(f.is_recurring)
        .bind(f.recurring_interval)
        .bind(f.next_recurring_date)
        .bind(f.is_retainer)
        .bind(f.retainer_percentage)
        .bind(f.is_balance)
        .bind(f.retainer_invoice_id)
        .bind(f.retainer_deduction_amount)
        .fetch_optional(executor)
        .await
        .map_err(|e| AppError::from_write(e, "Client, quote or retainer invoice not found"))?;

        Ok(invoice)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Invoice>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invoice = sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(invoice)
    }

    pub async fn find_number<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let number = sqlx::query_scalar::<_, String>("SELECT number FROM invoices WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(number)
    }

    pub async fn set_status<'e, E>(&self, executor: E, id: Uuid, status: InvoiceStatus) -> Result<Option<Invoice>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invoice = sqlx::query_as::<_, Invoice>(
            "UPDATE invoices SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?;

        Ok(invoice)
    }

    // =========================================================================
    //  RECORRÊNCIA
    // =========================================================================

    pub async fn due_recurring_ids<'e, E>(&self, executor: E, today: NaiveDate) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM invoices
            WHERE is_recurring AND next_recurring_date <= $1
            ORDER BY next_recurring_date, created_at
            "#,
        )
        .bind(today)
        .fetch_all(executor)
        .await?;

        Ok(ids)
    }

    /// Relê o modelo com lock. `None` se outra execução já o processou.
    pub async fn lock_if_due<'e, E>(&self, executor: E, id: Uuid, today: NaiveDate) -> Result<Option<Invoice>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT * FROM invoices
            WHERE id = $1 AND is_recurring AND next_recurring_date <= $2
            FOR UPDATE
            "#,
        )
        .bind(id)
        .bind(today)
        .fetch_optional(executor)
        .await?;

        Ok(invoice)
    }

    pub async fn set_next_recurring_date<'e, E>(&self, executor: E, id: Uuid, next: NaiveDate) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE invoices SET next_recurring_date = $2, updated_at = NOW() WHERE id = $1")
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
            r#"
            UPDATE invoices SET status = 'OVERDUE', updated_at = NOW()
            WHERE status = 'SENT' AND due_date < $1
            "#,
        )
        .bind(today)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  LEITURAS
    // =========================================================================

    pub async fn list_page(
        &self,
        status: Option<InvoiceStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<InvoiceSummary>, AppError> {
        let sql = format!(
            r#"{}
            WHERE ($1::invoice_status IS NULL OR i.status = $1)
            ORDER BY i.created_at DESC
            LIMIT $2 OFFSET $3"#,
            SUMMARY_SELECT
        );
        let invoices = sqlx::query_as::<_, InvoiceSummary>(&sql)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(invoices)
    }

    pub async fn count(&self, status: Option<InvoiceStatus>) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM invoices WHERE ($1::invoice_status IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn list_by_client(&self, client_id: Uuid) -> Result<Vec<InvoiceSummary>, AppError> {
        let sql = format!("{} WHERE i.client_id = $1 ORDER BY i.date DESC", SUMMARY_SELECT);
        let invoices = sqlx::query_as::<_, InvoiceSummary>(&sql)
            .bind(client_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(invoices)
    }

    pub async fn recent(&self, year: Option<i32>, month: Option<i32>, limit: i64) -> Result<Vec<InvoiceSummary>, AppError> {
        let sql = format!(
            r#"{}
            WHERE ($1::int IS NULL OR EXTRACT(YEAR FROM i.date)::int = $1)
              AND ($2::int IS NULL OR EXTRACT(MONTH FROM i.date)::int = $2)
            ORDER BY i.created_at DESC
            LIMIT $3"#,
            SUMMARY_SELECT
        );
        let invoices = sqlx::query_as::<_, InvoiceSummary>(&sql)
            .bind(year)
            .bind(month)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(invoices)
    }
}
