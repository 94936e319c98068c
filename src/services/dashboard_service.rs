// src/services/dashboard_service.rs

use crate::{
    common::error::AppError,
    db::{BillRepository, DashboardRepository, InvoiceRepository, QuoteRepository},
    models::dashboard::{DashboardFilter, DashboardSummary},
};

pub const RECENT_LIMIT: i64 = 5;

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    quote_repo: QuoteRepository,
    invoice_repo: InvoiceRepository,
    bill_repo: BillRepository,
}

impl DashboardService {
    pub fn new(
        repo: DashboardRepository,
        quote_repo: QuoteRepository,
        invoice_repo: InvoiceRepository,
        bill_repo: BillRepository,
    ) -> Self {
        Self { repo, quote_repo, invoice_repo, bill_repo }
    }

    pub async fn summary(&self, filter: &DashboardFilter) -> Result<DashboardSummary, AppError> {
        let year = filter.year;
        let month = filter.effective_month();

        let (totals, recent_quotes, recent_invoices, recent_bills) = tokio::try_join!(
            self.repo.get_totals(year, month),
            self.quote_repo.recent(year, month, RECENT_LIMIT),
            self.invoice_repo.recent(year, month, RECENT_LIMIT),
            self.bill_repo.recent(year, month, RECENT_LIMIT),
        )?;

        Ok(DashboardSummary {
            client_count: totals.client_count,
            quote_count: totals.quote_count,
            invoice_count: totals.invoice_count,
            bill_count: totals.bill_count,
            invoiced_total: totals.invoiced_total,
            paid_total: totals.paid_total,
            recent_quotes,
            recent_invoices,
            recent_bills,
        })
    }
}
