// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{bill::BillSummary, invoice::InvoiceSummary, quote::QuoteSummary};

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DashboardFilter {
    /// Ano da data do documento
    pub year: Option<i32>,
    /// Mês (1-12); ignorado sem `year`
    pub month: Option<u32>,
}

impl DashboardFilter {
    /// Mês só vale junto com o ano (igual ao filtro da tela).
    pub fn effective_month(&self) -> Option<i32> {
        match (self.year, self.month) {
            (Some(_), Some(m)) if (1..=12).contains(&m) => Some(m as i32),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub client_count: i64,
    pub quote_count: i64,
    pub invoice_count: i64,
    pub bill_count: i64,
    #[schema(example = "15400.00")]
    pub invoiced_total: Decimal,
    #[schema(example = "9800.00")]
    pub paid_total: Decimal,
    pub recent_quotes: Vec<QuoteSummary>,
    pub recent_invoices: Vec<InvoiceSummary>,
    pub recent_bills: Vec<BillSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_requires_year() {
        let f = DashboardFilter { year: None, month: Some(3) };
        assert_eq!(f.effective_month(), None);
        let f = DashboardFilter { year: Some(2026), month: Some(3) };
        assert_eq!(f.effective_month(), Some(3));
        let f = DashboardFilter { year: Some(2026), month: Some(13) };
        assert_eq!(f.effective_month(), None);
    }
}
