// src/services/numbering.rs
//
// Numeração de documentos. Faturas usam a sequência da organização
// (travada com FOR UPDATE na transação do chamador); orçamentos e contas
// usam o timestamp.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::OrganizationRepository,
    models::organization::NumberingConfig,
};

/// [prefixo][AAAA][MM][sequência com zeros à esquerda]
pub fn compose_invoice_number(config: &NumberingConfig, today: NaiveDate) -> String {
    let mut number = String::new();

    if config.invoice_include_prefix {
        number.push_str(&config.invoice_prefix);
    }
    if config.invoice_include_year {
        number.push_str(&format!("{:04}", today.year()));
    }
    if config.invoice_include_month {
        number.push_str(&format!("{:02}", today.month()));
    }

    let digits = config.invoice_digits.max(0) as usize;
    number.push_str(&format!("{:0width$}", config.invoice_sequence, width = digits));
    number
}

pub fn fallback_invoice_number(now: DateTime<Utc>) -> String {
    format!("INV-{}", now.timestamp_millis())
}

/// Fallback para clones gerados em lote, que podem sair no mesmo milissegundo.
pub fn batch_fallback_invoice_number(now: DateTime<Utc>) -> String {
    format!("{}-{}", fallback_invoice_number(now), random_suffix())
}

pub fn quote_number(now: DateTime<Utc>) -> String {
    format!("Q-{}", now.timestamp_millis())
}

pub fn bill_number(now: DateTime<Utc>) -> String {
    format!("B-{}", now.timestamp_millis())
}

/// Clones de contas recorrentes saem no mesmo milissegundo; o sufixo evita colisão.
pub fn recurring_bill_number(now: DateTime<Utc>) -> String {
    format!("{}-{}", bill_number(now), random_suffix())
}

fn random_suffix() -> u128 {
    Uuid::new_v4().as_u128() % 1000
}

#[derive(Clone)]
pub struct NumberingService {
    org_repo: OrganizationRepository,
}

impl NumberingService {
    pub fn new(org_repo: OrganizationRepository) -> Self {
        Self { org_repo }
    }

    /// Próximo número sequencial, ou `None` sem organização cadastrada.
    /// `conn` precisa ser a conexão de uma transação aberta: o lock da
    /// organização só é liberado no commit/rollback.
    pub async fn sequential_invoice_number(&self, conn: &mut PgConnection) -> Result<Option<String>, AppError> {
        let Some(config) = self.org_repo.lock_numbering(&mut *conn).await? else {
            return Ok(None);
        };

        let number = compose_invoice_number(&config, Utc::now().date_naive());
        self.org_repo.increment_sequence(&mut *conn, config.id).await?;

        tracing::debug!("Número de fatura reservado: {}", number);
        Ok(Some(number))
    }

    pub async fn next_invoice_number(&self, conn: &mut PgConnection) -> Result<String, AppError> {
        self.next_invoice_number_or(conn, fallback_invoice_number).await
    }

    /// Igual a `next_invoice_number`, mas o fallback leva sufixo aleatório.
    pub async fn next_batch_invoice_number(&self, conn: &mut PgConnection) -> Result<String, AppError> {
        self.next_invoice_number_or(conn, batch_fallback_invoice_number).await
    }

    async fn next_invoice_number_or(
        &self,
        conn: &mut PgConnection,
        fallback: fn(DateTime<Utc>) -> String,
    ) -> Result<String, AppError> {
        match self.sequential_invoice_number(conn).await? {
            Some(number) => Ok(number),
            None => {
                let number = fallback(Utc::now());
                tracing::warn!("Organização não configurada; usando número provisório {}", number);
                Ok(number)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config() -> NumberingConfig {
        NumberingConfig {
            id: Uuid::nil(),
            invoice_prefix: "INV-".into(),
            invoice_include_prefix: true,
            invoice_include_year: true,
            invoice_include_month: false,
            invoice_sequence: 42,
            invoice_digits: 4,
        }
    }

    fn oct_16() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn default_layout_is_prefix_year_and_padded_sequence() {
        assert_eq!(compose_invoice_number(&config(), oct_16()), "INV-20260042");
    }

    #[test]
    fn month_is_zero_padded() {
        let mut c = config();
        c.invoice_include_month = true;
        let march = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(compose_invoice_number(&c, march), "INV-2026030042");
    }

    #[test]
    fn prefix_can_be_switched_off() {
        let mut c = config();
        c.invoice_include_prefix = false;
        c.invoice_include_year = false;
        c.invoice_digits = 0;
        assert_eq!(compose_invoice_number(&c, oct_16()), "42");
    }

    #[test]
    fn sequence_longer_than_digits_is_not_truncated() {
        let mut c = config();
        c.invoice_sequence = 123456;
        assert_eq!(compose_invoice_number(&c, oct_16()), "INV-2026123456");
    }

    #[test]
    fn timestamp_numbers() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(fallback_invoice_number(now), "INV-1767225600000");
        assert_eq!(quote_number(now), "Q-1767225600000");
        assert_eq!(bill_number(now), "B-1767225600000");

        let recurring = recurring_bill_number(now);
        let suffix = recurring.strip_prefix("B-1767225600000-").unwrap();
        assert!(suffix.parse::<u32>().unwrap() < 1000);
    }

    #[test]
    fn batch_fallback_numbers_carry_a_suffix() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let number = batch_fallback_invoice_number(now);
        let suffix = number.strip_prefix("INV-1767225600000-").unwrap();
        assert!(suffix.parse::<u32>().unwrap() < 1000);

        // Mesmo milissegundo, números distintos na grande maioria das vezes
        let numbers: std::collections::HashSet<String> =
            (0..20).map(|_| batch_fallback_invoice_number(now)).collect();
        assert!(numbers.len() > 1);
    }
}

#[cfg(all(test, feature = "db-tests"))]
mod db_tests {
    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn sequence_advances_only_when_the_transaction_commits() {
        let db = testing::start().await;
        let pool = &db.state.db_pool;
        testing::organization(&db.state, "F", 7).await;
        let numbering = NumberingService::new(OrganizationRepository::new(pool.clone()));

        let mut tx = pool.begin().await.unwrap();
        assert_eq!(numbering.next_invoice_number(&mut *tx).await.unwrap(), "F007");
        assert_eq!(numbering.next_invoice_number(&mut *tx).await.unwrap(), "F008");
        tx.rollback().await.unwrap();

        let org = db.state.settings_service.get(pool).await.unwrap().unwrap();
        assert_eq!(org.invoice_sequence, 7);

        let mut tx = pool.begin().await.unwrap();
        assert_eq!(numbering.next_invoice_number(&mut *tx).await.unwrap(), "F007");
        tx.commit().await.unwrap();

        let org = db.state.settings_service.get(pool).await.unwrap().unwrap();
        assert_eq!(org.invoice_sequence, 8);
    }

    #[tokio::test]
    async fn without_organization_the_number_is_provisional() {
        let db = testing::start().await;
        let numbering = NumberingService::new(OrganizationRepository::new(db.state.db_pool.clone()));
        let mut conn = db.state.db_pool.acquire().await.unwrap();

        assert_eq!(numbering.sequential_invoice_number(&mut *conn).await.unwrap(), None);

        let number = numbering.next_invoice_number(&mut *conn).await.unwrap();
        let millis = number.strip_prefix("INV-").unwrap();
        assert!(millis.parse::<i64>().is_ok());

        let batch = numbering.next_batch_invoice_number(&mut *conn).await.unwrap();
        assert_eq!(batch.matches('-').count(), 2);
    }
}
