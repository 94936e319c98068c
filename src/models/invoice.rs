// src/models/invoice.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    models::{
        client::Client,
        document::{InvoiceStatus, LineItem, LineItemInput, RecurringInterval},
    },
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    #[schema(example = "INV-2026100042")]
    pub number: String,
    pub client_id: Uuid,
    pub quote_id: Option<Uuid>,
    #[schema(value_type = String, format = Date, example = "2026-10-01")]
    pub date: NaiveDate,
    #[schema(value_type = Option<String>, format = Date, example = "2026-10-31")]
    pub due_date: Option<NaiveDate>,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
    #[schema(example = "1210.00")]
    pub total: Decimal,

    // Recorrência
    pub is_recurring: bool,
    pub recurring_interval: Option<RecurringInterval>,
    #[schema(value_type = Option<String>, format = Date)]
    pub next_recurring_date: Option<NaiveDate>,

    // Adiantamento (retainer) e saldo (balance)
    pub is_retainer: bool,
    #[schema(example = "30.0")]
    pub retainer_percentage: Option<Decimal>,
    pub is_balance: bool,
    pub retainer_invoice_id: Option<Uuid>,
    pub retainer_deduction_amount: Option<Decimal>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn amount_due(&self) -> Decimal {
        amount_due(self.total, self.is_balance, self.retainer_deduction_amount)
    }
}

/// Fatura de saldo: total menos o adiantamento já faturado.
pub fn amount_due(total: Decimal, is_balance: bool, deduction: Option<Decimal>) -> Decimal {
    match (is_balance, deduction) {
        (true, Some(d)) => total - d,
        _ => total,
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
    pub id: Uuid,
    pub number: String,
    pub client_id: Uuid,
    pub client_name: String,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,
    pub status: InvoiceStatus,
    pub total: Decimal,
    pub is_recurring: bool,
    pub is_retainer: bool,
    pub is_balance: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePage {
    pub items: Vec<InvoiceSummary>,
    pub page: i64,
    pub page_size: i64,
    pub total_count: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub header: Invoice,
    pub client: Client,
    pub items: Vec<LineItem>,
    pub quote_number: Option<String>,
    pub retainer_invoice_number: Option<String>,
    #[schema(example = "847.00")]
    pub amount_due: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayload {
    pub client_id: Uuid,
    pub quote_id: Option<Uuid>,
    #[schema(value_type = String, format = Date, example = "2026-10-01")]
    pub date: NaiveDate,
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[validate(nested)]
    pub items: Vec<LineItemInput>,

    #[serde(default)]
    pub is_recurring: bool,
    pub recurring_interval: Option<RecurringInterval>,
    #[schema(value_type = Option<String>, format = Date)]
    pub next_recurring_date: Option<NaiveDate>,

    #[serde(default)]
    pub is_retainer: bool,
    #[schema(example = "30.0")]
    pub retainer_percentage: Option<Decimal>,

    #[serde(default)]
    pub is_balance: bool,
    pub retainer_invoice_id: Option<Uuid>,
    pub retainer_deduction_amount: Option<Decimal>,
}

/// Campos condicionais já resolvidos: só são gravados quando a flag
/// correspondente está ligada.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceFlags {
    pub is_recurring: bool,
    pub recurring_interval: Option<RecurringInterval>,
    pub next_recurring_date: Option<NaiveDate>,
    pub is_retainer: bool,
    pub retainer_percentage: Option<Decimal>,
    pub is_balance: bool,
    pub retainer_invoice_id: Option<Uuid>,
    pub retainer_deduction_amount: Option<Decimal>,
}

impl InvoicePayload {
    pub fn flags(&self) -> Result<InvoiceFlags, AppError> {
        if self.is_retainer && self.quote_id.is_none() {
            return Err(AppError::BadRequest("Quote is required for retainer invoices".into()));
        }
        if self.is_balance && self.retainer_invoice_id.is_none() {
            return Err(AppError::BadRequest("Retainer invoice is required for balance invoices".into()));
        }
        if self.is_retainer && self.is_balance {
            return Err(AppError::BadRequest("An invoice cannot be both retainer and balance".into()));
        }

        let (recurring_interval, next_recurring_date) = if self.is_recurring {
            let interval = RecurringInterval::or_default(self.recurring_interval);
            let next = match self.next_recurring_date {
                Some(d) => Some(d),
                None => Some(interval.advance(self.date).ok_or_else(|| {
                    AppError::BadRequest("Recurring date out of range".into())
                })?),
            };
            (Some(interval), next)
        } else {
            (None, None)
        };

        Ok(InvoiceFlags {
            is_recurring: self.is_recurring,
            recurring_interval,
            next_recurring_date,
            is_retainer: self.is_retainer,
            retainer_percentage: if self.is_retainer {
                Some(self.retainer_percentage.unwrap_or_default())
            } else {
                None
            },
            is_balance: self.is_balance,
            retainer_invoice_id: if self.is_balance { self.retainer_invoice_id } else { None },
            retainer_deduction_amount: if self.is_balance {
                Some(self.retainer_deduction_amount.unwrap_or_default())
            } else {
                None
            },
        })
    }
}

impl InvoiceFlags {
    pub fn none() -> Self {
        Self {
            is_recurring: false,
            recurring_interval: None,
            next_recurring_date: None,
            is_retainer: false,
            retainer_percentage: None,
            is_balance: false,
            retainer_invoice_id: None,
            retainer_deduction_amount: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RetainerPayload {
    pub quote_id: Uuid,
    #[schema(example = "30.0")]
    pub percentage: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn payload() -> InvoicePayload {
        InvoicePayload {
            client_id: Uuid::new_v4(),
            quote_id: None,
            date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            due_date: None,
            notes: None,
            items: vec![],
            is_recurring: false,
            recurring_interval: Some(RecurringInterval::Weekly),
            next_recurring_date: None,
            is_retainer: false,
            retainer_percentage: Some(Decimal::from(30)),
            is_balance: false,
            retainer_invoice_id: Some(Uuid::new_v4()),
            retainer_deduction_amount: Some(Decimal::from(100)),
        }
    }

    #[test]
    fn unset_flags_drop_their_fields() {
        let flags = payload().flags().unwrap();
        assert_eq!(flags, InvoiceFlags::none());
    }

    #[test]
    fn recurring_without_next_date_starts_one_interval_later() {
        let mut p = payload();
        p.is_recurring = true;
        p.recurring_interval = None;
        let flags = p.flags().unwrap();
        assert_eq!(flags.recurring_interval, Some(RecurringInterval::Monthly));
        assert_eq!(flags.next_recurring_date, NaiveDate::from_ymd_opt(2026, 2, 28));
    }

    #[test]
    fn explicit_next_date_is_kept() {
        let mut p = payload();
        p.is_recurring = true;
        p.next_recurring_date = NaiveDate::from_ymd_opt(2026, 3, 1);
        let flags = p.flags().unwrap();
        assert_eq!(flags.recurring_interval, Some(RecurringInterval::Weekly));
        assert_eq!(flags.next_recurring_date, NaiveDate::from_ymd_opt(2026, 3, 1));
    }

    #[test]
    fn retainer_requires_quote() {
        let mut p = payload();
        p.is_retainer = true;
        assert!(matches!(p.flags(), Err(AppError::BadRequest(_))));
        p.quote_id = Some(Uuid::new_v4());
        assert_eq!(p.flags().unwrap().retainer_percentage, Some(Decimal::from(30)));
    }

    #[test]
    fn balance_requires_retainer_invoice() {
        let mut p = payload();
        p.is_balance = true;
        p.retainer_invoice_id = None;
        assert!(matches!(p.flags(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn amount_due_deducts_retainer_only_for_balance() {
        let total = Decimal::from_str("1210.00").unwrap();
        let deduction = Some(Decimal::from_str("363.00").unwrap());
        assert_eq!(amount_due(total, true, deduction), Decimal::from_str("847.00").unwrap());
        assert_eq!(amount_due(total, false, deduction), total);
        assert_eq!(amount_due(total, true, None), total);
    }
}
