// src/db/dashboard_repo.rs

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::common::error::AppError;

/// Contadores e somas do painel (sem as listas de recentes).
#[derive(Debug, Clone, Default)]
pub struct DashboardTotals {
    pub client_count: i64,
    pub quote_count: i64,
    pub invoice_count: i64,
    pub bill_count: i64,
    pub invoiced_total: Decimal,
    pub paid_total: Decimal,
}

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clientes são filtrados pela data de cadastro; documentos pela data do documento.
    pub async fn get_totals(&self, year: Option<i32>, month: Option<i32>) -> Result<DashboardTotals, AppError> {
        // Uma única conexão para todas as contagens
        let mut tx = self.pool.begin().await?;

        let client_count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM clients
            WHERE ($1::int IS NULL OR EXTRACT(YEAR FROM created_at)::int = $1)
              AND ($2::int IS NULL OR EXTRACT(MONTH FROM created_at)::int = $2)
            "#,
        )
        .bind(year)
        .bind(month)
        .fetch_one(&mut *tx)
        .await?;

        let mut counts = [0i64; 3];
        for (slot, table) in counts.iter_mut().zip(["quotes", "invoices", "bills"]) {
            let sql = format!(
                r#"
                SELECT COUNT(*) FROM {}
                WHERE ($1::int IS NULL OR EXTRACT(YEAR FROM date)::int = $1)
                  AND ($2::int IS NULL OR EXTRACT(MONTH FROM date)::int = $2)
                "#,
                table
            );
            *slot = sqlx::query_scalar::<_, i64>(&sql)
                .bind(year)
                .bind(month)
                .fetch_one(&mut *tx)
                .await?;
        }

        // Canceladas não entram no faturado
        let (invoiced_total, paid_total) = sqlx::query_as::<_, (Decimal, Decimal)>(
            r#"
            SELECT
                COALESCE(SUM(total) FILTER (WHERE status <> 'CANCELLED'), 0),
                COALESCE(SUM(total) FILTER (WHERE status = 'PAID'), 0)
            FROM invoices
            WHERE ($1::int IS NULL OR EXTRACT(YEAR FROM date)::int = $1)
              AND ($2::int IS NULL OR EXTRACT(MONTH FROM date)::int = $2)
            "#,
        )
        .bind(year)
        .bind(month)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardTotals {
            client_count,
            quote_count: counts[0],
            invoice_count: counts[1],
            bill_count: counts[2],
            invoiced_total,
            paid_total,
        })
    }
}
