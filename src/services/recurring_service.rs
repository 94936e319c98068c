// src/services/recurring_service.rs
//
// Execução em lote dos documentos recorrentes. Cada modelo é processado na
// sua própria transação; a falha de um não interrompe os outros.

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        bill_repo::BillRecord,
        invoice_repo::InvoiceRecord,
        items_repo::{self, ItemTable},
        BillRepository, InvoiceRepository,
    },
    models::{
        document::{NewLineItem, RecurringInterval},
        invoice::InvoiceFlags,
        recurring::{RecurringFailure, RecurringKind, RecurringResult, RecurringRunReport},
    },
    services::{
        bill_service::BillService,
        invoice_service::{default_due_date, InvoiceService},
        numbering,
    },
};

/// Próxima data do modelo: um intervalo a partir da data agendada (não de hoje).
pub fn following_date(
    scheduled: Option<NaiveDate>,
    interval: Option<RecurringInterval>,
    today: NaiveDate,
) -> Result<NaiveDate, AppError> {
    RecurringInterval::or_default(interval)
        .advance(scheduled.unwrap_or(today))
        .ok_or_else(|| AppError::BadRequest("Recurring date out of range".into()))
}

#[derive(Clone)]
pub struct RecurringService {
    invoice_repo: InvoiceRepository,
    bill_repo: BillRepository,
    invoice_service: InvoiceService,
    bill_service: BillService,
}

impl RecurringService {
    pub fn new(
        invoice_repo: InvoiceRepository,
        bill_repo: BillRepository,
        invoice_service: InvoiceService,
        bill_service: BillService,
    ) -> Self {
        Self { invoice_repo, bill_repo, invoice_service, bill_service }
    }

    pub async fn process_due(&self, pool: &PgPool, today: NaiveDate) -> Result<RecurringRunReport, AppError> {
        let mut report = RecurringRunReport::default();

        let bill_ids = self.bill_repo.due_recurring_ids(pool, today).await?;
        let invoice_ids = self.invoice_repo.due_recurring_ids(pool, today).await?;
        tracing::info!(
            "Recorrência {}: {} conta(s) e {} fatura(s) a gerar",
            today,
            bill_ids.len(),
            invoice_ids.len()
        );

        for id in bill_ids {
            let outcome = self.clone_bill(pool, id, today).await;
            Self::collect(&mut report, RecurringKind::Bill, id, outcome);
        }
        for id in invoice_ids {
            let outcome = self.clone_invoice(pool, id, today).await;
            Self::collect(&mut report, RecurringKind::Invoice, id, outcome);
        }

        let overdue = self.mark_overdue(pool, today).await;
        Self::collect_overdue(&mut report, overdue);

        report.success = report.failures.is_empty() && report.overdue_error.is_none();
        tracing::info!(
            "Recorrência concluída: {} gerado(s), {} falha(s), {} vencido(s)",
            report.processed,
            report.failures.len(),
            report.overdue_marked
        );

        Ok(report)
    }

    async fn mark_overdue(&self, pool: &PgPool, today: NaiveDate) -> Result<u64, AppError> {
        let invoices = self.invoice_repo.mark_overdue(pool, today).await?;
        let bills = self.bill_repo.mark_overdue(pool, today).await?;
        Ok(invoices + bills)
    }

    fn collect_overdue(report: &mut RecurringRunReport, outcome: Result<u64, AppError>) {
        match outcome {
            Ok(marked) => report.overdue_marked = marked,
            Err(e) => {
                tracing::error!("🔥 Falha ao marcar documentos vencidos: {:?}", e);
                report.overdue_error = Some(e.to_string());
            }
        }
    }

    fn collect(
        report: &mut RecurringRunReport,
        kind: RecurringKind,
        parent_id: Uuid,
        outcome: Result<Option<RecurringResult>, AppError>,
    ) {
        match outcome {
            Ok(Some(result)) => {
                report.processed += 1;
                report.results.push(result);
            }
            // Já processado por outra execução concorrente
            Ok(None) => {}
            Err(e) => {
                tracing::error!("Falha ao gerar recorrência {:?} {}: {}", kind, parent_id, e);
                report.failures.push(RecurringFailure { kind, parent_id, error: e.to_string() });
            }
        }
    }

    async fn clone_invoice(&self, pool: &PgPool, id: Uuid, today: NaiveDate) -> Result<Option<RecurringResult>, AppError> {
        let mut tx = pool.begin().await?;

        let Some(template) = self.invoice_repo.lock_if_due(&mut *tx, id, today).await? else {
            return Ok(None);
        };

        let items: Vec<NewLineItem> = items_repo::list_items(&mut *tx, ItemTable::Invoice, template.id)
            .await?
            .iter()
            .map(NewLineItem::from)
            .collect();

        let record = InvoiceRecord {
            client_id: template.client_id,
            quote_id: template.quote_id,
            date: today,
            due_date: default_due_date(today),
            notes: template.notes.clone(),
            total: template.total,
            flags: InvoiceFlags::none(),
        };

        let clone = self.invoice_service.insert_batch_clone(&mut *tx, &record, &items).await?;

        let next = following_date(template.next_recurring_date, template.recurring_interval, today)?;
        self.invoice_repo.set_next_recurring_date(&mut *tx, template.id, next).await?;

        tx.commit().await?;

        Ok(Some(RecurringResult {
            kind: RecurringKind::Invoice,
            parent_id: template.id,
            new_id: clone.id,
            new_number: clone.number,
            next_date: next,
        }))
    }

    async fn clone_bill(&self, pool: &PgPool, id: Uuid, today: NaiveDate) -> Result<Option<RecurringResult>, AppError> {
        let mut tx = pool.begin().await?;

        let Some(template) = self.bill_repo.lock_if_due(&mut *tx, id, today).await? else {
            return Ok(None);
        };

        let items: Vec<NewLineItem> = items_repo::list_items(&mut *tx, ItemTable::Bill, template.id)
            .await?
            .iter()
            .map(NewLineItem::from)
            .collect();

        let record = BillRecord {
            client_id: template.client_id,
            quote_id: template.quote_id,
            date: today,
            due_date: default_due_date(today),
            notes: template.notes.clone(),
            total: template.total,
            recurring_interval: None,
            next_recurring_date: None,
        };

        let number = numbering::recurring_bill_number(Utc::now());
        let clone = self.bill_service.insert_with_items(&mut *tx, &number, &record, &items).await?;

        let next = following_date(template.next_recurring_date, template.recurring_interval, today)?;
        self.bill_repo.set_next_recurring_date(&mut *tx, template.id, next).await?;

        tx.commit().await?;

        Ok(Some(RecurringResult {
            kind: RecurringKind::Bill,
            parent_id: template.id,
            new_id: clone.id,
            new_number: clone.number,
            next_date: next,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn advances_from_the_scheduled_date() {
        let today = date(2026, 10, 16);
        let next = following_date(Some(date(2026, 9, 30)), Some(RecurringInterval::Monthly), today).unwrap();
        assert_eq!(next, date(2026, 10, 30));
    }

    #[test]
    fn missing_date_and_interval_fall_back_to_today_monthly() {
        let today = date(2026, 1, 31);
        assert_eq!(following_date(None, None, today).unwrap(), date(2026, 2, 28));
    }

    #[test]
    fn weekly_schedule() {
        let today = date(2026, 10, 16);
        let next = following_date(Some(date(2026, 10, 16)), Some(RecurringInterval::Weekly), today).unwrap();
        assert_eq!(next, date(2026, 10, 23));
    }

    #[test]
    fn collect_keeps_going_after_failures() {
        let mut report = RecurringRunReport::default();
        let ok = RecurringResult {
            kind: RecurringKind::Bill,
            parent_id: Uuid::new_v4(),
            new_id: Uuid::new_v4(),
            new_number: "B-1-1".into(),
            next_date: date(2026, 11, 16),
        };

        RecurringService::collect(&mut report, RecurringKind::Bill, ok.parent_id, Ok(Some(ok.clone())));
        RecurringService::collect(&mut report, RecurringKind::Invoice, Uuid::new_v4(), Err(AppError::DuplicateNumber));
        RecurringService::collect(&mut report, RecurringKind::Invoice, Uuid::new_v4(), Ok(None));

        assert_eq!(report.processed, 1);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].error, "Número de documento duplicado");
    }

    #[test]
    fn overdue_failure_keeps_the_report() {
        let mut report = RecurringRunReport::default();
        report.processed = 2;

        RecurringService::collect_overdue(&mut report, Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut)));

        assert_eq!(report.processed, 2);
        assert_eq!(report.overdue_marked, 0);
        assert_eq!(report.overdue_error.as_deref(), Some("Erro de banco de dados"));

        let mut report = RecurringRunReport::default();
        RecurringService::collect_overdue(&mut report, Ok(3));
        assert_eq!(report.overdue_marked, 3);
        assert!(report.overdue_error.is_none());
    }
}

#[cfg(all(test, feature = "db-tests"))]
mod db_tests {
    use super::*;
    use crate::{
        models::{bill::BillPayload, document::InvoiceStatus},
        testing::{self, date, item},
    };

    #[tokio::test]
    async fn due_templates_are_cloned_once_and_advanced() {
        let db = testing::start().await;
        let (state, pool) = (&db.state, &db.state.db_pool);
        let client = testing::client(state, "Retainer").await;
        let today = date(2026, 10, 16);

        let mut payload = testing::invoice_payload(client.id, date(2026, 9, 16), vec![item("Hosting", "1", "50", "21")]);
        payload.is_recurring = true;
        payload.recurring_interval = Some(RecurringInterval::Monthly);
        payload.next_recurring_date = Some(today);
        let template = state.invoice_service.create(pool, &payload).await.unwrap();

        let bill = state
            .bill_service
            .create(
                pool,
                &BillPayload {
                    client_id: client.id,
                    date: date(2026, 7, 1),
                    due_date: None,
                    notes: None,
                    items: vec![item("Support", "2", "40", "0")],
                    is_recurring: true,
                    recurring_interval: Some(RecurringInterval::Quarterly),
                    next_recurring_date: Some(date(2026, 10, 1)),
                },
            )
            .await
            .unwrap();

        let report = state.recurring_service.process_due(pool, today).await.unwrap();
        assert!(report.success);
        assert_eq!(report.processed, 2);
        assert!(report.failures.is_empty());

        let invoice_run = report.results.iter().find(|r| r.kind == RecurringKind::Invoice).unwrap();
        assert_eq!(invoice_run.parent_id, template.header.id);
        assert_eq!(invoice_run.next_date, date(2026, 11, 16));
        // Sem organização: número provisório com sufixo
        assert!(invoice_run.new_number.starts_with("INV-"));
        assert_eq!(invoice_run.new_number.matches('-').count(), 2);

        let clone = state.invoice_service.get(pool, invoice_run.new_id).await.unwrap();
        assert!(!clone.header.is_recurring);
        assert_eq!(clone.header.date, today);
        assert_eq!(clone.header.total, template.header.total);
        assert_eq!(clone.items.len(), 1);

        let advanced = state.invoice_service.get(pool, template.header.id).await.unwrap();
        assert_eq!(advanced.header.next_recurring_date, Some(date(2026, 11, 16)));

        let bill_run = report.results.iter().find(|r| r.kind == RecurringKind::Bill).unwrap();
        assert_eq!(bill_run.parent_id, bill.header.id);
        assert_eq!(bill_run.next_date, date(2027, 1, 1));
        let advanced = state.bill_service.get(pool, bill.header.id).await.unwrap();
        assert_eq!(advanced.header.next_recurring_date, Some(date(2027, 1, 1)));

        let again = state.recurring_service.process_due(pool, today).await.unwrap();
        assert!(again.success);
        assert_eq!(again.processed, 0);
        assert!(again.results.is_empty());
    }

    #[tokio::test]
    async fn sent_documents_past_due_become_overdue() {
        let db = testing::start().await;
        let (state, pool) = (&db.state, &db.state.db_pool);
        testing::organization(state, "F", 1).await;
        let client = testing::client(state, "Late").await;
        let today = date(2026, 10, 16);

        let mut late = testing::invoice_payload(client.id, date(2026, 9, 1), vec![item("Audit", "1", "100", "0")]);
        late.due_date = Some(date(2026, 10, 1));
        let late = state.invoice_service.create(pool, &late).await.unwrap();
        state.invoice_service.set_status(pool, late.header.id, "SENT").await.unwrap();

        let mut on_time = testing::invoice_payload(client.id, date(2026, 10, 1), vec![item("Audit", "1", "100", "0")]);
        on_time.due_date = Some(date(2026, 10, 31));
        let on_time = state.invoice_service.create(pool, &on_time).await.unwrap();
        state.invoice_service.set_status(pool, on_time.header.id, "SENT").await.unwrap();

        // Rascunho vencido continua rascunho
        let mut draft = testing::invoice_payload(client.id, date(2026, 9, 1), vec![item("Audit", "1", "100", "0")]);
        draft.due_date = Some(date(2026, 9, 15));
        let draft = state.invoice_service.create(pool, &draft).await.unwrap();

        let bill = state
            .bill_service
            .create(
                pool,
                &BillPayload {
                    client_id: client.id,
                    date: date(2026, 9, 1),
                    due_date: Some(date(2026, 9, 30)),
                    notes: None,
                    items: vec![item("Rent", "1", "900", "0")],
                    is_recurring: false,
                    recurring_interval: None,
                    next_recurring_date: None,
                },
            )
            .await
            .unwrap();
        state.bill_service.set_status(pool, bill.header.id, "SENT").await.unwrap();

        let report = state.recurring_service.process_due(pool, today).await.unwrap();
        assert!(report.success);
        assert_eq!(report.processed, 0);
        assert_eq!(report.overdue_marked, 2);
        assert!(report.overdue_error.is_none());

        for (id, expected) in [
            (late.header.id, InvoiceStatus::Overdue),
            (on_time.header.id, InvoiceStatus::Sent),
            (draft.header.id, InvoiceStatus::Draft),
        ] {
            let stored = state.invoice_service.get(pool, id).await.unwrap();
            assert_eq!(stored.header.status, expected, "fatura {}", stored.header.number);
        }
        assert_eq!(
            state.bill_service.get(pool, bill.header.id).await.unwrap().header.status,
            InvoiceStatus::Overdue
        );
    }
}
