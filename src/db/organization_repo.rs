// src/db/organization_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::organization::{blank_to_none, NumberingConfig, Organization, UpdateOrganizationRequest},
};

#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get<'e, E>(&self, executor: E) -> Result<Option<Organization>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let org = sqlx::query_as::<_, Organization>("SELECT * FROM organizations LIMIT 1")
            .fetch_optional(executor)
            .await?;

        Ok(org)
    }

    /// IVA padrão para itens sem IVA explícito (0 sem organização).
    pub async fn default_vat<'e, E>(&self, executor: E) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let vat = sqlx::query_scalar::<_, Decimal>("SELECT default_vat FROM organizations LIMIT 1")
            .fetch_optional(executor)
            .await?;

        Ok(vat.unwrap_or_default())
    }

    /// Trava a linha da organização até o fim da transação.
    /// Tem que ser chamado com a conexão da transação.
    pub async fn lock_numbering<'e, E>(&self, executor: E) -> Result<Option<NumberingConfig>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let config = sqlx::query_as::<_, NumberingConfig>(
            r#"
            SELECT id, invoice_prefix, invoice_include_prefix, invoice_include_year,
                   invoice_include_month, invoice_sequence, invoice_digits
            FROM organizations
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .fetch_optional(executor)
        .await?;

        Ok(config)
    }

    pub async fn increment_sequence<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE organizations SET invoice_sequence = invoice_sequence + 1, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// UPSERT na linha única (coluna `singleton`).
    pub async fn upsert<'e, E>(&self, executor: E, input: &UpdateOrganizationRequest) -> Result<Organization, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let values = input.resolved();

        let org = sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO organizations (
                name, company_id, vat_number, default_vat, address, city, zip_code, country,
                email, phone, website, language, currency, decimal_separator,
                bank_name, bank_beneficiary, iban, bic, invoice_template, quote_template,
                invoice_prefix, invoice_include_prefix, invoice_include_year, invoice_include_month,
                invoice_sequence, invoice_digits
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26
            )
            ON CONFLICT (singleton) DO UPDATE SET
                name = EXCLUDED.name,
                company_id = EXCLUDED.company_id,
                vat_number = EXCLUDED.vat_number,
                default_vat = EXCLUDED.default_vat,
                address = EXCLUDED.address,
                city = EXCLUDED.city,
                zip_code = EXCLUDED.zip_code,
                country = EXCLUDED.country,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                website = EXCLUDED.website,
                language = EXCLUDED.language,
                currency = EXCLUDED.currency,
                decimal_separator = EXCLUDED.decimal_separator,
                bank_name = EXCLUDED.bank_name,
                bank_beneficiary = EXCLUDED.bank_beneficiary,
                iban = EXCLUDED.iban,
                bic = EXCLUDED.bic,
                invoice_template = EXCLUDED.invoice_template,
                quote_template = EXCLUDED.quote_template,
                invoice_prefix = EXCLUDED.invoice_prefix,
                invoice_include_prefix = EXCLUDED.invoice_include_prefix,
                invoice_include_year = EXCLUDED.invoice_include_year,
                invoice_include_month = EXCLUDED.invoice_include_month,
                invoice_sequence = EXCLUDED.invoice_sequence,
                invoice_digits = EXCLUDED.invoice_digits,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(&values.name)
        .bind(blank_to_none(&input.company_id))
        .bind(blank_to_none(&input.vat_number))
        .bind(values.default_vat)
        .bind(blank_to_none(&input.address))
        .bind(blank_to_none(&input.city))
        .bind(blank_to_none(&input.zip_code))
        .bind(blank_to_none(&input.country))
        .bind(blank_to_none(&input.email))
        .bind(blank_to_none(&input.phone))
        .bind(blank_to_none(&input.website))
        .bind(&values.language)
        .bind(&values.currency)
        .bind(&values.decimal_separator)
        .bind(blank_to_none(&input.bank_name))
        .bind(blank_to_none(&input.bank_beneficiary))
        .bind(blank_to_none(&input.iban).map(|i| i.replace(' ', "").to_uppercase()))
        .bind(blank_to_none(&input.bic).map(|b| b.to_uppercase()))
        .bind(blank_to_none(&input.invoice_template))
        .bind(blank_to_none(&input.quote_template))
        .bind(&values.invoice_prefix)
        .bind(input.invoice_include_prefix)
        .bind(input.invoice_include_year)
        .bind(input.invoice_include_month)
        .bind(values.invoice_sequence)
        .bind(values.invoice_digits)
        .fetch_one(executor)
        .await?;

        Ok(org)
    }

    pub async fn set_logo_url(&self, logo_url: &str) -> Result<Option<Organization>, AppError> {
        let org = sqlx::query_as::<_, Organization>(
            "UPDATE organizations SET logo_url = $1, updated_at = NOW() RETURNING *",
        )
        .bind(logo_url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(org)
    }
}
