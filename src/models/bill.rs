// src/models/bill.rs

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
pub struct Bill {
    pub id: Uuid,
    #[schema(example = "B-1767225600000")]
    pub number: String,
    pub client_id: Uuid,
    pub quote_id: Option<Uuid>,
    #[schema(value_type = String, format = Date, example = "2026-10-01")]
    pub date: NaiveDate,
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
    pub total: Decimal,
    pub is_recurring: bool,
    pub recurring_interval: Option<RecurringInterval>,
    #[schema(value_type = Option<String>, format = Date)]
    pub next_recurring_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillSummary {
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
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillDetail {
    #[serde(flatten)]
    pub header: Bill,
    pub client: Client,
    pub items: Vec<LineItem>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillPayload {
    pub client_id: Uuid,
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
}

/// (intervalo, próxima data) gravados para a conta.
pub type Recurrence = (Option<RecurringInterval>, Option<NaiveDate>);

impl BillPayload {
    pub fn recurrence(&self) -> Result<Recurrence, AppError> {
        if !self.is_recurring {
            return Ok((None, None));
        }
        let interval = RecurringInterval::or_default(self.recurring_interval);
        let next = match self.next_recurring_date {
            Some(d) => d,
            None => interval
                .advance(self.date)
                .ok_or_else(|| AppError::BadRequest("Recurring date out of range".into()))?,
        };
        Ok((Some(interval), Some(next)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(is_recurring: bool) -> BillPayload {
        BillPayload {
            client_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            due_date: None,
            notes: None,
            items: vec![],
            is_recurring,
            recurring_interval: Some(RecurringInterval::Quarterly),
            next_recurring_date: None,
        }
    }

    #[test]
    fn non_recurring_bill_has_no_schedule() {
        assert_eq!(payload(false).recurrence().unwrap(), (None, None));
    }

    #[test]
    fn recurring_bill_schedules_from_its_date() {
        let (interval, next) = payload(true).recurrence().unwrap();
        assert_eq!(interval, Some(RecurringInterval::Quarterly));
        assert_eq!(next, NaiveDate::from_ymd_opt(2027, 1, 16));
    }
}
