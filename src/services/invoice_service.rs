// src/services/invoice_service.rs

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, money::round_cents},
    db::{
        invoice_repo::InvoiceRecord,
        items_repo::{self, ItemTable},
        ClientRepository, InvoiceRepository, OrganizationRepository, QuoteRepository,
    },
    models::{
        document::{items_total, price_items, total_pages, InvoiceStatus, ListQuery, NewLineItem, PAGE_SIZE},
        invoice::{Invoice, InvoiceDetail, InvoiceFlags, InvoicePage, InvoicePayload, RetainerPayload},
    },
    services::numbering::NumberingService,
};

/// Prazo padrão de documentos gerados a partir de outro documento.
pub const DEFAULT_PAYMENT_TERM_DAYS: u64 = 30;

pub fn parse_invoice_status(raw: &str) -> Result<InvoiceStatus, AppError> {
    raw.parse::<InvoiceStatus>().map_err(AppError::InvalidStatus)
}

pub fn default_due_date(today: NaiveDate) -> Option<NaiveDate> {
    today.checked_add_days(Days::new(DEFAULT_PAYMENT_TERM_DAYS))
}

/// Linha única da fatura de adiantamento: percentual sobre o total do orçamento, sem IVA.
pub fn retainer_line(quote_number: &str, quote_total: Decimal, percentage: Decimal) -> Result<NewLineItem, AppError> {
    if percentage <= Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
        return Err(AppError::BadRequest("Retainer percentage must be greater than 0 and at most 100".into()));
    }

    let amount = round_cents(quote_total * percentage / Decimal::ONE_HUNDRED);
    let title = format!("Retainer {}% – Quote {}", percentage.normalize(), quote_number);

    NewLineItem::priced(0, Some(title), String::new(), Decimal::ONE, amount, Decimal::ZERO)
}

#[derive(Clone)]
pub struct InvoiceService {
    repo: InvoiceRepository,
    quote_repo: QuoteRepository,
    client_repo: ClientRepository,
    org_repo: OrganizationRepository,
    numbering: NumberingService,
}

impl InvoiceService {
    pub fn new(
        repo: InvoiceRepository,
        quote_repo: QuoteRepository,
        client_repo: ClientRepository,
        org_repo: OrganizationRepository,
        numbering: NumberingService,
    ) -> Self {
        Self { repo, quote_repo, client_repo, org_repo, numbering }
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &InvoicePayload) -> Result<InvoiceDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let flags = payload.flags()?;
        let mut tx = executor.begin().await?;

        let default_vat = self.org_repo.default_vat(&mut *tx).await?;
        let items = price_items(&payload.items, default_vat)?;
        let record = InvoiceRecord {
            client_id: payload.client_id,
            quote_id: payload.quote_id,
            date: payload.date,
            due_date: payload.due_date,
            notes: payload.notes.clone(),
            total: items_total(&items),
            flags,
        };

        let invoice = self.insert_with_items(&mut *tx, &record, &items).await?;
        let detail = self.detail(&mut *tx, invoice).await?;
        tx.commit().await?;

        tracing::info!("Fatura {} criada", detail.header.number);
        Ok(detail)
    }

    /// O número da fatura nunca muda na edição.
    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &InvoicePayload) -> Result<InvoiceDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let flags = payload.flags()?;
        let mut tx = executor.begin().await?;

        let default_vat = self.org_repo.default_vat(&mut *tx).await?;
        let items = price_items(&payload.items, default_vat)?;
        let record = InvoiceRecord {
            client_id: payload.client_id,
            quote_id: payload.quote_id,
            date: payload.date,
            due_date: payload.due_date,
            notes: payload.notes.clone(),
            total: items_total(&items),
            flags,
        };

        let invoice = self
            .repo
            .update(&mut *tx, id, &record)
            .await?
            .ok_or_else(|| AppError::not_found("Invoice", id))?;

        items_repo::delete_items(&mut *tx, ItemTable::Invoice, id).await?;
        items_repo::insert_items(&mut *tx, ItemTable::Invoice, id, &items).await?;

        let detail = self.detail(&mut *tx, invoice).await?;
        tx.commit().await?;

        Ok(detail)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        match self.repo.delete(executor, id).await? {
            0 => Err(AppError::not_found("Invoice", id)),
            _ => Ok(()),
        }
    }

    pub async fn get<'e, E>(&self, executor: E, id: Uuid) -> Result<InvoiceDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let invoice = self
            .repo
            .find_by_id(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::not_found("Invoice", id))?;

        self.detail(&mut *conn, invoice).await
    }

    pub async fn list(&self, query: &ListQuery) -> Result<InvoicePage, AppError> {
        let status = query.status.as_deref().map(parse_invoice_status).transpose()?;

        let (items, total_count) = tokio::try_join!(
            self.repo.list_page(status, PAGE_SIZE, query.offset()),
            self.repo.count(status),
        )?;

        Ok(InvoicePage {
            items,
            page: query.page(),
            page_size: PAGE_SIZE,
            total_count,
            total_pages: total_pages(total_count),
        })
    }

    pub async fn set_status<'e, E>(&self, executor: E, id: Uuid, status: &str) -> Result<Invoice, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let status = parse_invoice_status(status)?;
        self.repo
            .set_status(executor, id, status)
            .await?
            .ok_or_else(|| AppError::not_found("Invoice", id))
    }

    // =========================================================================
    //  CONVERSÕES
    // =========================================================================

    /// Copia itens, notas e total do orçamento; vence em 30 dias.
    pub async fn create_from_quote<'e, E>(&self, executor: E, quote_id: Uuid, today: NaiveDate) -> Result<InvoiceDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let quote = self
            .quote_repo
            .find_by_id(&mut *tx, quote_id)
            .await?
            .ok_or_else(|| AppError::not_found("Quote", quote_id))?;
        let items: Vec<NewLineItem> = items_repo::list_items(&mut *tx, ItemTable::Quote, quote.id)
            .await?
            .iter()
            .map(NewLineItem::from)
            .collect();

        let record = InvoiceRecord {
            client_id: quote.client_id,
            quote_id: Some(quote.id),
            date: today,
            due_date: default_due_date(today),
            notes: quote.notes.clone(),
            total: quote.total,
            flags: InvoiceFlags::none(),
        };

        let invoice = self.insert_with_items(&mut *tx, &record, &items).await?;
        let detail = self.detail(&mut *tx, invoice).await?;
        tx.commit().await?;

        tracing::info!("Orçamento {} convertido na fatura {}", quote.number, detail.header.number);
        Ok(detail)
    }

    pub async fn create_retainer<'e, E>(&self, executor: E, payload: &RetainerPayload, today: NaiveDate) -> Result<InvoiceDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let quote = self
            .quote_repo
            .find_by_id(&mut *tx, payload.quote_id)
            .await?
            .ok_or_else(|| AppError::not_found("Quote", payload.quote_id))?;

        let line = retainer_line(&quote.number, quote.total, payload.percentage)?;
        let record = InvoiceRecord {
            client_id: quote.client_id,
            quote_id: Some(quote.id),
            date: today,
            due_date: default_due_date(today),
            notes: quote.notes.clone(),
            total: line.total,
            flags: InvoiceFlags {
                is_retainer: true,
                retainer_percentage: Some(payload.percentage),
                ..InvoiceFlags::none()
            },
        };

        let invoice = self.insert_with_items(&mut *tx, &record, &[line]).await?;
        let detail = self.detail(&mut *tx, invoice).await?;
        tx.commit().await?;

        Ok(detail)
    }

    /// Fatura de saldo: itens do orçamento original menos o adiantamento.
    pub async fn create_balance<'e, E>(&self, executor: E, retainer_id: Uuid, today: NaiveDate) -> Result<InvoiceDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let retainer = self
            .repo
            .find_by_id(&mut *tx, retainer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Invoice", retainer_id))?;

        if !retainer.is_retainer {
            return Err(AppError::BadRequest("Invoice is not a retainer invoice".into()));
        }
        let quote_id = retainer
            .quote_id
            .ok_or_else(|| AppError::BadRequest("Retainer invoice has no quote".into()))?;

        let quote = self
            .quote_repo
            .find_by_id(&mut *tx, quote_id)
            .await?
            .ok_or_else(|| AppError::not_found("Quote", quote_id))?;
        let items: Vec<NewLineItem> = items_repo::list_items(&mut *tx, ItemTable::Quote, quote.id)
            .await?
            .iter()
            .map(NewLineItem::from)
            .collect();

        let record = InvoiceRecord {
            client_id: retainer.client_id,
            quote_id: Some(quote.id),
            date: today,
            due_date: default_due_date(today),
            notes: quote.notes.clone(),
            total: items_total(&items),
            flags: InvoiceFlags {
                is_balance: true,
                retainer_invoice_id: Some(retainer.id),
                retainer_deduction_amount: Some(retainer.total),
                ..InvoiceFlags::none()
            },
        };

        let invoice = self.insert_with_items(&mut *tx, &record, &items).await?;
        let detail = self.detail(&mut *tx, invoice).await?;
        tx.commit().await?;

        Ok(detail)
    }

    // =========================================================================
    //  AUXILIARES
    // =========================================================================

    /// Reserva o número e grava cabeçalho + itens na transação do chamador.
    pub async fn insert_with_items(
        &self,
        conn: &mut PgConnection,
        record: &InvoiceRecord,
        items: &[NewLineItem],
    ) -> Result<Invoice, AppError> {
        let number = self.numbering.next_invoice_number(&mut *conn).await?;
        self.insert_numbered(conn, &number, record, items).await
    }

    /// Clones recorrentes: sem organização, o número provisório leva sufixo aleatório.
    pub async fn insert_batch_clone(
        &self,
        conn: &mut PgConnection,
        record: &InvoiceRecord,
        items: &[NewLineItem],
    ) -> Result<Invoice, AppError> {
        let number = self.numbering.next_batch_invoice_number(&mut *conn).await?;
        self.insert_numbered(conn, &number, record, items).await
    }

    async fn insert_numbered(
        &self,
        conn: &mut PgConnection,
        number: &str,
        record: &InvoiceRecord,
        items: &[NewLineItem],
    ) -> Result<Invoice, AppError> {
        let invoice = self.repo.insert(&mut *conn, number, record).await?;
        items_repo::insert_items(&mut *conn, ItemTable::Invoice, invoice.id, items).await?;
        Ok(invoice)
    }

    async fn detail(&self, conn: &mut PgConnection, invoice: Invoice) -> Result<InvoiceDetail, AppError> {
        let client = self
            .client_repo
            .find_by_id(&mut *conn, invoice.client_id)
            .await?
            .ok_or_else(|| AppError::not_found("Client", invoice.client_id))?;
        let items = items_repo::list_items(&mut *conn, ItemTable::Invoice, invoice.id).await?;

        let quote_number = match invoice.quote_id {
            Some(id) => self.quote_repo.find_by_id(&mut *conn, id).await?.map(|q| q.number),
            None => None,
        };
        let retainer_invoice_number = match invoice.retainer_invoice_id {
            Some(id) => self.repo.find_number(&mut *conn, id).await?,
            None => None,
        };

        Ok(InvoiceDetail {
            amount_due: invoice.amount_due(),
            header: invoice,
            client,
            items,
            quote_number,
            retainer_invoice_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn retainer_line_takes_percentage_of_quote_total() {
        let line = retainer_line("Q-1767225600000", d("1210.00"), d("30")).unwrap();
        assert_eq!(line.price, d("363.00"));
        assert_eq!(line.total, d("363.00"));
        assert_eq!(line.vat, Decimal::ZERO);
        assert_eq!(line.title.as_deref(), Some("Retainer 30% – Quote Q-1767225600000"));
    }

    #[test]
    fn retainer_amount_is_rounded_to_cents() {
        let line = retainer_line("Q-1", d("100.01"), d("33.3")).unwrap();
        // 100.01 × 0.333 = 33.30333
        assert_eq!(line.total, d("33.30"));
    }

    #[test]
    fn retainer_percentage_bounds() {
        assert!(retainer_line("Q-1", d("100"), Decimal::ZERO).is_err());
        assert!(retainer_line("Q-1", d("100"), d("100.01")).is_err());
        assert_eq!(retainer_line("Q-1", d("100"), d("100")).unwrap().total, d("100"));
    }

    #[test]
    fn converted_documents_are_due_in_thirty_days() {
        let today = NaiveDate::from_ymd_opt(2026, 12, 15).unwrap();
        assert_eq!(default_due_date(today), NaiveDate::from_ymd_opt(2027, 1, 14));
    }

    #[test]
    fn invoice_status_errors_are_invalid_status() {
        assert!(matches!(parse_invoice_status("SIGNED"), Err(AppError::InvalidStatus(_))));
        assert_eq!(parse_invoice_status("OVERDUE").unwrap(), InvoiceStatus::Overdue);
    }
}
