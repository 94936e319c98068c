// src/services/bill_service.rs

use chrono::{NaiveDate, Utc};
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        bill_repo::BillRecord,
        items_repo::{self, ItemTable},
        BillRepository, ClientRepository, OrganizationRepository, QuoteRepository,
    },
    models::{
        bill::{Bill, BillDetail, BillPayload, BillSummary},
        document::{items_total, price_items, NewLineItem},
    },
    services::{
        invoice_service::{default_due_date, parse_invoice_status},
        numbering,
    },
};

#[derive(Clone)]
pub struct BillService {
    repo: BillRepository,
    quote_repo: QuoteRepository,
    client_repo: ClientRepository,
    org_repo: OrganizationRepository,
}

impl BillService {
    pub fn new(
        repo: BillRepository,
        quote_repo: QuoteRepository,
        client_repo: ClientRepository,
        org_repo: OrganizationRepository,
    ) -> Self {
        Self { repo, quote_repo, client_repo, org_repo }
    }

    fn record(payload: &BillPayload, items: &[NewLineItem]) -> Result<BillRecord, AppError> {
        let (recurring_interval, next_recurring_date) = payload.recurrence()?;
        Ok(BillRecord {
            client_id: payload.client_id,
            quote_id: None,
            date: payload.date,
            due_date: payload.due_date,
            notes: payload.notes.clone(),
            total: items_total(items),
            recurring_interval,
            next_recurring_date,
        })
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &BillPayload) -> Result<BillDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let default_vat = self.org_repo.default_vat(&mut *tx).await?;
        let items = price_items(&payload.items, default_vat)?;
        let record = Self::record(payload, &items)?;

        let number = numbering::bill_number(Utc::now());
        let bill = self.repo.insert(&mut *tx, &number, &record).await?;
        items_repo::insert_items(&mut *tx, ItemTable::Bill, bill.id, &items).await?;

        let detail = self.detail(&mut *tx, bill).await?;
        tx.commit().await?;

        tracing::info!("Conta {} criada", detail.header.number);
        Ok(detail)
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &BillPayload) -> Result<BillDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let existing = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Bill", id))?;

        let default_vat = self.org_repo.default_vat(&mut *tx).await?;
        let items = price_items(&payload.items, default_vat)?;
        let mut record = Self::record(payload, &items)?;
        // A ligação com o orçamento de origem não vem do formulário
        record.quote_id = existing.quote_id;

        let bill = self
            .repo
            .update(&mut *tx, id, &record)
            .await?
            .ok_or_else(|| AppError::not_found("Bill", id))?;

        items_repo::delete_items(&mut *tx, ItemTable::Bill, id).await?;
        items_repo::insert_items(&mut *tx, ItemTable::Bill, id, &items).await?;

        let detail = self.detail(&mut *tx, bill).await?;
        tx.commit().await?;

        Ok(detail)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        match self.repo.delete(executor, id).await? {
            0 => Err(AppError::not_found("Bill", id)),
            _ => Ok(()),
        }
    }

    pub async fn get<'e, E>(&self, executor: E, id: Uuid) -> Result<BillDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let bill = self
            .repo
            .find_by_id(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::not_found("Bill", id))?;

        self.detail(&mut *conn, bill).await
    }

    pub async fn list(&self, status: Option<&str>) -> Result<Vec<BillSummary>, AppError> {
        let status = status.map(parse_invoice_status).transpose()?;
        self.repo.list(status).await
    }

    pub async fn set_status<'e, E>(&self, executor: E, id: Uuid, status: &str) -> Result<Bill, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let status = parse_invoice_status(status)?;
        self.repo
            .set_status(executor, id, status)
            .await?
            .ok_or_else(|| AppError::not_found("Bill", id))
    }

    pub async fn create_from_quote<'e, E>(&self, executor: E, quote_id: Uuid, today: NaiveDate) -> Result<BillDetail, AppError>
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

        let record = BillRecord {
            client_id: quote.client_id,
            quote_id: Some(quote.id),
            date: today,
            due_date: default_due_date(today),
            notes: quote.notes.clone(),
            total: quote.total,
            recurring_interval: None,
            next_recurring_date: None,
        };

        let number = numbering::bill_number(Utc::now());
        let bill = self.insert_with_items(&mut *tx, &number, &record, &items).await?;
        let detail = self.detail(&mut *tx, bill).await?;
        tx.commit().await?;

        tracing::info!("Orçamento {} convertido na conta {}", quote.number, detail.header.number);
        Ok(detail)
    }

    pub async fn insert_with_items(
        &self,
        conn: &mut PgConnection,
        number: &str,
        record: &BillRecord,
        items: &[NewLineItem],
    ) -> Result<Bill, AppError> {
        let bill = self.repo.insert(&mut *conn, number, record).await?;
        items_repo::insert_items(&mut *conn, ItemTable::Bill, bill.id, items).await?;
        Ok(bill)
    }

    async fn detail(&self, conn: &mut PgConnection, bill: Bill) -> Result<BillDetail, AppError> {
        let client = self
            .client_repo
            .find_by_id(&mut *conn, bill.client_id)
            .await?
            .ok_or_else(|| AppError::not_found("Client", bill.client_id))?;
        let items = items_repo::list_items(&mut *conn, ItemTable::Bill, bill.id).await?;

        Ok(BillDetail { header: bill, client, items })
    }
}
