// src/services/settings_service.rs

use std::path::PathBuf;

use chrono::{Days, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Acquire, Executor, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{
        client_repo::SEED_EMAIL_PATTERN,
        invoice_repo::InvoiceRecord,
        items_repo::{self, ItemTable},
        quote_repo::QuoteHeader,
        ClientRepository, InvoiceRepository, OrganizationRepository, QuoteRepository,
    },
    models::{
        client::ClientPayload,
        document::{items_total, NewLineItem},
        invoice::InvoiceFlags,
        organization::{Organization, UpdateOrganizationRequest},
    },
    services::{
        document_service::{available_templates, TemplateInfo},
        invoice_service::default_due_date,
        numbering::{self, NumberingService},
    },
};

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
pub const MAX_SEED_CLIENTS: u32 = 100;

const DEMO_COMPANIES: &[&str] = &[
    "Northwind Traders",
    "Blue Harbor Studio",
    "Atlas Consulting",
    "Greenleaf Bakery",
    "Pixel Forge",
    "Summit Logistics",
];

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SeedRequest {
    #[validate(range(min = 1, max = 100))]
    #[schema(example = 5)]
    pub count: u32,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub clients: u32,
    pub quotes: u32,
    pub invoices: u32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub deleted_clients: u64,
}

pub fn is_png(bytes: &[u8]) -> bool {
    bytes.starts_with(PNG_SIGNATURE)
}

/// Cliente de demonstração `n`; o e-mail segue o padrão apagado pela limpeza.
pub fn demo_client(n: u32) -> ClientPayload {
    let company = DEMO_COMPANIES[n as usize % DEMO_COMPANIES.len()];
    ClientPayload {
        name: format!("{} {}", company, n),
        email: Some(format!("client{}@example.com", n)),
        phone: None,
        address: Some(format!("{} Main Street", 10 + n)),
        city: Some("Brussels".into()),
        zip_code: Some("1000".into()),
        country: Some("Belgium".into()),
        vat_number: None,
        company_id: None,
    }
}

pub fn demo_items(n: u32, vat: Decimal) -> Result<Vec<NewLineItem>, AppError> {
    Ok(vec![
        NewLineItem::priced(
            0,
            Some("Design".into()),
            "Mockups and style guide".into(),
            Decimal::from(1 + n % 3),
            Decimal::new(45000, 2),
            vat,
        )?,
        NewLineItem::priced(
            1,
            Some("Development".into()),
            "Implementation hours".into(),
            Decimal::from(8 + n % 5),
            Decimal::new(6500, 2),
            vat,
        )?,
    ])
}

#[derive(Clone)]
pub struct SettingsService {
    org_repo: OrganizationRepository,
    client_repo: ClientRepository,
    quote_repo: QuoteRepository,
    invoice_repo: InvoiceRepository,
    numbering: NumberingService,
    upload_dir: PathBuf,
}

impl SettingsService {
    pub fn new(
        org_repo: OrganizationRepository,
        client_repo: ClientRepository,
        quote_repo: QuoteRepository,
        invoice_repo: InvoiceRepository,
        numbering: NumberingService,
        upload_dir: PathBuf,
    ) -> Self {
        Self { org_repo, client_repo, quote_repo, invoice_repo, numbering, upload_dir }
    }

    pub async fn get<'e, E>(&self, executor: E) -> Result<Option<Organization>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.org_repo.get(executor).await
    }

    pub async fn upsert<'e, E>(&self, executor: E, input: &UpdateOrganizationRequest) -> Result<Organization, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let org = self.org_repo.upsert(executor, input).await?;
        tracing::info!("Configurações da organização salvas ({})", org.name);
        Ok(org)
    }

    pub fn templates(&self) -> Vec<TemplateInfo> {
        available_templates()
    }

    /// Grava o PNG em `<upload_dir>/logo.png` e aponta `logo_url` para ele.
    pub async fn upload_logo(&self, bytes: &[u8]) -> Result<Organization, AppError> {
        if !is_png(bytes) {
            return Err(AppError::BadRequest("Logo must be a PNG image".into()));
        }

        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|e| AppError::InternalServerError(e.into()))?;
        let path = self.upload_dir.join("logo.png");
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::InternalServerError(e.into()))?;

        let logo_url = path.to_string_lossy().to_string();
        self.org_repo
            .set_logo_url(&logo_url)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Organization".into()))
    }

    // =========================================================================
    //  DADOS DE DEMONSTRAÇÃO
    // =========================================================================

    /// Cria `count` clientes, cada um com um orçamento e uma fatura.
    pub async fn seed_demo_data<'e, E>(&self, executor: E, count: u32) -> Result<SeedReport, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let count = count.min(MAX_SEED_CLIENTS);
        let mut tx = executor.begin().await?;

        let vat = self.org_repo.default_vat(&mut *tx).await?;
        let today = Utc::now().date_naive();
        let base = (Utc::now().timestamp_millis() % 100_000) as u32 * 1000;
        let mut report = SeedReport::default();

        for i in 0..count {
            let n = base + i;
            let client = self.client_repo.create(&mut *tx, &demo_client(n)).await?;
            report.clients += 1;

            let items = demo_items(n, vat)?;
            let total = items_total(&items);

            let header = QuoteHeader {
                client_id: client.id,
                date: today,
                due_date: today.checked_add_days(Days::new(15)),
                notes: Some("Demo data".into()),
                total,
            };
            let quote_number = format!("{}-{}", numbering::quote_number(Utc::now()), i);
            let quote = self.quote_repo.insert(&mut *tx, &quote_number, &header).await?;
            items_repo::insert_items(&mut *tx, ItemTable::Quote, quote.id, &items).await?;
            report.quotes += 1;

            // Sem organização o número provisório repetiria dentro do laço
            let invoice_number = match self.numbering.sequential_invoice_number(&mut *tx).await? {
                Some(number) => number,
                None => format!("{}-{}", numbering::fallback_invoice_number(Utc::now()), i),
            };
            let record = InvoiceRecord {
                client_id: client.id,
                quote_id: Some(quote.id),
                date: today,
                due_date: default_due_date(today),
                notes: Some("Demo data".into()),
                total,
                flags: InvoiceFlags::none(),
            };
            let invoice = self.invoice_repo.insert(&mut *tx, &invoice_number, &record).await?;
            items_repo::insert_items(&mut *tx, ItemTable::Invoice, invoice.id, &items).await?;
            report.invoices += 1;
        }

        tx.commit().await?;
        tracing::info!("Dados de demonstração criados: {:?}", report);
        Ok(report)
    }

    /// Remove clientes `client%@example.com` e tudo ligado a eles.
    pub async fn delete_test_data<'e, E>(&self, executor: E) -> Result<CleanupReport, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let ids = self.client_repo.seeded_client_ids(&mut *tx).await?;
        let deleted_clients = if ids.is_empty() {
            0
        } else {
            self.client_repo.delete_with_documents(&mut *tx, &ids).await?
        };

        tx.commit().await?;
        tracing::info!("Dados de teste removidos ({} clientes, padrão {})", deleted_clients, SEED_EMAIL_PATTERN);
        Ok(CleanupReport { deleted_clients })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_signature_check() {
        assert!(is_png(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0]));
        assert!(!is_png(b"GIF89a"));
        assert!(!is_png(&[]));
    }

    #[test]
    fn demo_clients_match_cleanup_pattern() {
        let client = demo_client(7);
        assert_eq!(client.email.as_deref(), Some("client7@example.com"));
        assert!(client.validate().is_ok());
    }

    #[test]
    fn demo_items_are_priced() {
        let items = demo_items(0, Decimal::from(21)).unwrap();
        // 1 × 450 × 1.21 + 8 × 65 × 1.21
        assert_eq!(items[0].total, Decimal::new(54450, 2));
        assert_eq!(items[1].total, Decimal::new(62920, 2));
        assert_eq!(items_total(&items), Decimal::new(117370, 2));
    }

    #[test]
    fn seed_request_bounds() {
        assert!(SeedRequest { count: 0 }.validate().is_err());
        assert!(SeedRequest { count: 101 }.validate().is_err());
        assert!(SeedRequest { count: 10 }.validate().is_ok());
    }
}
