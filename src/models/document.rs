// src/models/document.rs
//
// Tipos compartilhados por orçamentos, faturas e contas.

use std::str::FromStr;

use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::{
    error::AppError,
    money::{document_total, line_total, max_amount, max_quantity, round_cents, round_quantity},
};

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "invoice_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(Self::Draft),
            "SENT" => Ok(Self::Sent),
            "PAID" => Ok(Self::Paid),
            "OVERDUE" => Ok(Self::Overdue),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "recurring_interval", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurringInterval {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl RecurringInterval {
    /// Próxima data do agendamento. Meses "grudam" no último dia válido
    /// (31/01 + 1 mês = 28 ou 29/02). `None` só em overflow de calendário.
    pub fn advance(self, from: NaiveDate) -> Option<NaiveDate> {
        match self {
            RecurringInterval::Weekly => from.checked_add_days(Days::new(7)),
            RecurringInterval::Monthly => from.checked_add_months(Months::new(1)),
            RecurringInterval::Quarterly => from.checked_add_months(Months::new(3)),
            RecurringInterval::Yearly => from.checked_add_months(Months::new(12)),
        }
    }

    /// Documento recorrente sem intervalo salvo é tratado como mensal.
    pub fn or_default(interval: Option<RecurringInterval>) -> RecurringInterval {
        interval.unwrap_or(RecurringInterval::Monthly)
    }
}

// --- Itens ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: Uuid,
    #[schema(example = 0)]
    pub position: i32,
    #[schema(example = "Website redesign")]
    pub title: Option<String>,
    #[schema(example = "Landing page and two inner pages")]
    pub description: String,
    #[schema(example = "2.0")]
    pub quantity: Decimal,
    #[schema(example = "450.00")]
    pub price: Decimal,
    #[schema(example = "21.0")]
    pub vat: Decimal,
    #[schema(example = "1089.00")]
    pub total: Decimal,
}

fn is_negative(value: &Decimal) -> bool {
    value.is_sign_negative() && !value.is_zero()
}

fn quantity_range(value: &Decimal) -> Result<(), ValidationError> {
    if is_negative(value) || *value > max_quantity() {
        return Err(ValidationError::new("quantity_range"));
    }
    Ok(())
}

fn amount_range(value: &Decimal) -> Result<(), ValidationError> {
    if is_negative(value) || *value > max_amount() {
        return Err(ValidationError::new("amount_range"));
    }
    Ok(())
}

fn vat_range(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::new("vat_range"));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    #[schema(example = "Website redesign")]
    pub title: Option<String>,

    #[serde(default)]
    #[schema(example = "Landing page and two inner pages")]
    pub description: String,

    #[validate(custom(function = "quantity_range", message = "must be between 0 and 999999999.999"))]
    #[schema(example = "2.0")]
    pub quantity: Decimal,

    #[validate(custom(function = "amount_range", message = "must be between 0 and 999999999999.99"))]
    #[schema(example = "450.00")]
    pub price: Decimal,

    // Ausente => IVA padrão da organização
    #[validate(custom(function = "vat_range", message = "must be between 0 and 100"))]
    #[schema(example = "21.0")]
    pub vat: Option<Decimal>,
}

/// Item já precificado, pronto para INSERT.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLineItem {
    pub position: i32,
    pub title: Option<String>,
    pub description: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub vat: Decimal,
    pub total: Decimal,
}

impl NewLineItem {
    /// Arredonda quantidade, preço e IVA para a escala das colunas antes de
    /// calcular o total, assim o total gravado bate com os valores gravados.
    pub fn priced(
        position: i32,
        title: Option<String>,
        description: String,
        quantity: Decimal,
        price: Decimal,
        vat: Decimal,
    ) -> Result<Self, AppError> {
        let quantity = round_quantity(quantity);
        let price = round_cents(price);
        let vat = round_cents(vat);

        let total = line_total(quantity, price, vat)
            .filter(|t| *t <= max_amount())
            .ok_or_else(|| AppError::BadRequest("Line total is out of range".into()))?;

        Ok(Self { position, title, description, quantity, price, vat, total })
    }
}

impl From<&LineItem> for NewLineItem {
    fn from(item: &LineItem) -> Self {
        Self {
            position: item.position,
            title: item.title.clone(),
            description: item.description.clone(),
            quantity: item.quantity,
            price: item.price,
            vat: item.vat,
            total: item.total,
        }
    }
}

/// Precifica os itens do formulário. Linhas sem título e sem descrição são
/// descartadas; as posições seguem a ordem recebida.
pub fn price_items(inputs: &[LineItemInput], default_vat: Decimal) -> Result<Vec<NewLineItem>, AppError> {
    let items = inputs
        .iter()
        .filter(|i| {
            let has_title = i.title.as_deref().is_some_and(|t| !t.trim().is_empty());
            has_title || !i.description.trim().is_empty()
        })
        .enumerate()
        .map(|(idx, i)| {
            NewLineItem::priced(
                idx as i32,
                i.title.clone().filter(|t| !t.trim().is_empty()),
                i.description.clone(),
                i.quantity,
                i.price,
                i.vat.unwrap_or(default_vat),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    if items_total(&items) > max_amount() {
        return Err(AppError::BadRequest("Document total is out of range".into()));
    }
    Ok(items)
}

pub fn items_total(items: &[NewLineItem]) -> Decimal {
    document_total(items.iter().map(|i| i.total))
}

// --- Paginação / filtros ---

#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Página (1-based)
    pub page: Option<i64>,
    pub status: Option<String>,
}

pub const PAGE_SIZE: i64 = 20;

impl ListQuery {
    pub fn page(&self) -> i64 {
        self.page.filter(|p| *p >= 1).unwrap_or(1)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(PAGE_SIZE)
    }
}

pub fn total_pages(total_count: i64) -> i64 {
    (total_count + PAGE_SIZE - 1) / PAGE_SIZE
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatusFilter {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Texto digitado no autocomplete
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusPayload {
    #[schema(example = "SENT")]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn input(title: Option<&str>, description: &str, qty: &str, price: &str, vat: Option<&str>) -> LineItemInput {
        LineItemInput {
            title: title.map(str::to_string),
            description: description.to_string(),
            quantity: d(qty),
            price: d(price),
            vat: vat.map(d),
        }
    }

    #[test]
    fn weekly_adds_seven_days() {
        assert_eq!(RecurringInterval::Weekly.advance(date(2026, 12, 28)), Some(date(2027, 1, 4)));
    }

    #[test]
    fn monthly_clamps_to_month_end() {
        assert_eq!(RecurringInterval::Monthly.advance(date(2026, 1, 31)), Some(date(2026, 2, 28)));
        assert_eq!(RecurringInterval::Monthly.advance(date(2028, 1, 31)), Some(date(2028, 2, 29)));
    }

    #[test]
    fn quarterly_and_yearly() {
        assert_eq!(RecurringInterval::Quarterly.advance(date(2026, 11, 15)), Some(date(2027, 2, 15)));
        assert_eq!(RecurringInterval::Yearly.advance(date(2028, 2, 29)), Some(date(2029, 2, 28)));
    }

    #[test]
    fn missing_interval_is_monthly() {
        assert_eq!(RecurringInterval::or_default(None), RecurringInterval::Monthly);
        assert_eq!(RecurringInterval::or_default(Some(RecurringInterval::Yearly)), RecurringInterval::Yearly);
    }

    #[test]
    fn invoice_status_parses_known_values_only() {
        assert_eq!("PAID".parse::<InvoiceStatus>(), Ok(InvoiceStatus::Paid));
        assert_eq!("paid".parse::<InvoiceStatus>(), Err("paid".to_string()));
        assert!("ARCHIVED".parse::<InvoiceStatus>().is_err());
    }

    #[test]
    fn price_items_uses_default_vat_and_skips_blank_lines() {
        let items = price_items(
            &[
                input(Some("Design"), "", "2", "100", None),
                input(None, "   ", "1", "999", None),
                input(None, "Hosting", "1", "10", Some("0")),
            ],
            d("21"),
        )
        .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].vat, d("21"));
        assert_eq!(items[0].total, d("242"));
        assert_eq!(items[1].position, 1);
        assert_eq!(items[1].title, None);
        assert_eq!(items[1].total, d("10"));
        assert_eq!(items_total(&items), d("252"));
    }

    #[test]
    fn negative_quantities_fail_validation() {
        let bad = input(Some("x"), "", "-1", "10", None);
        assert!(bad.validate().is_err());
        let vat = input(Some("x"), "", "1", "10", Some("150"));
        assert!(vat.validate().is_err());
        assert!(input(Some("x"), "", "0", "0", Some("0")).validate().is_ok());
    }

    #[test]
    fn stored_values_reproduce_the_total() {
        let items = price_items(&[input(Some("Pens"), "", "3.0004", "0.333", Some("20.004"))], d("21")).unwrap();
        let item = &items[0];

        // Mesma escala das colunas NUMERIC(12,3) / NUMERIC(14,2)
        assert_eq!(item.quantity, d("3.000"));
        assert_eq!(item.price, d("0.33"));
        assert_eq!(item.vat, d("20.00"));
        assert_eq!(item.total, d("1.19"));
        assert_eq!(line_total(item.quantity, item.price, item.vat), Some(item.total));
    }

    #[test]
    fn huge_amounts_fail_validation() {
        let huge = "100000000000000000000";
        assert!(input(Some("x"), "", huge, "1", None).validate().is_err());
        assert!(input(Some("x"), "", "1", huge, None).validate().is_err());
        assert!(input(Some("x"), "", huge, huge, None).validate().is_err());
        assert!(input(Some("x"), "", "999999999.999", "999999999999.99", None).validate().is_ok());
    }

    #[test]
    fn totals_beyond_the_column_are_rejected() {
        // Campos dentro dos limites, mas o produto não cabe em NUMERIC(14,2)
        let err = price_items(&[input(Some("x"), "", "999999999.999", "999999999999.99", None)], d("0")).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Line total is out of range"));

        let half = input(Some("x"), "", "1", "600000000000", Some("0"));
        let err = price_items(&[half.clone(), half], d("0")).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Document total is out of range"));
    }

    #[test]
    fn list_query_paging() {
        let q = ListQuery { page: Some(3), status: None };
        assert_eq!(q.offset(), 40);
        let q = ListQuery { page: Some(0), status: None };
        assert_eq!(q.page(), 1);
        let q = ListQuery { page: Some(i64::MAX), status: None };
        assert_eq!(q.offset(), i64::MAX);
        assert_eq!(total_pages(41), 3);
        assert_eq!(total_pages(40), 2);
        assert_eq!(total_pages(0), 0);
    }
}
