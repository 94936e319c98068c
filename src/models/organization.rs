// src/models/organization.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,

    #[schema(example = "Freelance Hub SRL")]
    pub name: String,
    pub company_id: Option<String>,
    #[schema(example = "BE0123456789")]
    pub vat_number: Option<String>,
    #[schema(example = "21.0")]
    pub default_vat: Decimal,

    pub address: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,

    #[schema(example = "en")]
    pub language: String,
    #[schema(example = "EUR")]
    pub currency: String,
    #[schema(example = ",")]
    pub decimal_separator: String,

    // Dados bancários (bloco de pagamento + QR EPC no PDF)
    pub bank_name: Option<String>,
    pub bank_beneficiary: Option<String>,
    #[schema(example = "BE71096123456769")]
    pub iban: Option<String>,
    #[schema(example = "GKCCBEBB")]
    pub bic: Option<String>,

    pub logo_url: Option<String>,
    #[schema(example = "classic")]
    pub invoice_template: Option<String>,
    #[schema(example = "classic")]
    pub quote_template: Option<String>,

    // Numeração de faturas
    #[schema(example = "INV-")]
    pub invoice_prefix: String,
    pub invoice_include_prefix: bool,
    pub invoice_include_year: bool,
    pub invoice_include_month: bool,
    #[schema(example = 42)]
    pub invoice_sequence: i32,
    #[schema(example = 4)]
    pub invoice_digits: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Apenas a parte de numeração, lida com FOR UPDATE dentro da transação.
#[derive(Debug, Clone, FromRow)]
pub struct NumberingConfig {
    pub id: Uuid,
    pub invoice_prefix: String,
    pub invoice_include_prefix: bool,
    pub invoice_include_year: bool,
    pub invoice_include_month: bool,
    pub invoice_sequence: i32,
    pub invoice_digits: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationRequest {
    #[schema(example = "Freelance Hub SRL")]
    pub name: Option<String>,
    pub company_id: Option<String>,
    pub vat_number: Option<String>,
    #[schema(example = "21.0")]
    pub default_vat: Option<Decimal>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    #[validate(email(message = "invalid email"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    #[validate(length(min = 2, max = 5))]
    pub language: Option<String>,
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    #[schema(example = ",")]
    pub decimal_separator: Option<String>,
    pub bank_name: Option<String>,
    pub bank_beneficiary: Option<String>,
    pub iban: Option<String>,
    pub bic: Option<String>,
    pub invoice_template: Option<String>,
    pub quote_template: Option<String>,
    #[schema(example = "INV-")]
    pub invoice_prefix: Option<String>,
    #[serde(default)]
    pub invoice_include_prefix: bool,
    #[serde(default)]
    pub invoice_include_year: bool,
    #[serde(default)]
    pub invoice_include_month: bool,
    #[schema(example = 1)]
    pub invoice_sequence: Option<i32>,
    #[schema(example = 4)]
    pub invoice_digits: Option<i32>,
}

/// Valores efetivamente gravados no UPSERT, já com os defaults aplicados.
#[derive(Debug, Clone, PartialEq)]
pub struct OrganizationValues {
    pub name: String,
    pub default_vat: Decimal,
    pub language: String,
    pub currency: String,
    pub decimal_separator: String,
    pub invoice_prefix: String,
    pub invoice_sequence: i32,
    pub invoice_digits: i32,
}

pub fn blank_to_none(value: &Option<String>) -> Option<String> {
    value.as_ref().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl UpdateOrganizationRequest {
    /// Sequência inválida/ausente volta para 1; dígitos para 0.
    pub fn resolved(&self) -> OrganizationValues {
        OrganizationValues {
            name: blank_to_none(&self.name).unwrap_or_else(|| "My Organization".to_string()),
            default_vat: self.default_vat.filter(|v| !v.is_sign_negative()).unwrap_or_default(),
            language: blank_to_none(&self.language).unwrap_or_else(|| "en".to_string()),
            currency: blank_to_none(&self.currency)
                .map(|c| c.to_uppercase())
                .unwrap_or_else(|| "EUR".to_string()),
            decimal_separator: match self.decimal_separator.as_deref() {
                Some(".") => ".".to_string(),
                _ => ",".to_string(),
            },
            invoice_prefix: self.invoice_prefix.clone().unwrap_or_default(),
            invoice_sequence: self.invoice_sequence.filter(|s| *s >= 1).unwrap_or(1),
            invoice_digits: self.invoice_digits.filter(|d| (0..=12).contains(d)).unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_request_gets_defaults() {
        let values = UpdateOrganizationRequest::default().resolved();
        assert_eq!(values.name, "My Organization");
        assert_eq!(values.language, "en");
        assert_eq!(values.currency, "EUR");
        assert_eq!(values.decimal_separator, ",");
        assert_eq!(values.invoice_sequence, 1);
        assert_eq!(values.invoice_digits, 0);
        assert_eq!(values.default_vat, Decimal::ZERO);
    }

    #[test]
    fn invalid_numbering_values_fall_back() {
        let req = UpdateOrganizationRequest {
            invoice_sequence: Some(0),
            invoice_digits: Some(40),
            decimal_separator: Some(";".into()),
            currency: Some("usd".into()),
            name: Some("   ".into()),
            ..Default::default()
        };
        let values = req.resolved();
        assert_eq!(values.invoice_sequence, 1);
        assert_eq!(values.invoice_digits, 0);
        assert_eq!(values.decimal_separator, ",");
        assert_eq!(values.currency, "USD");
        assert_eq!(values.name, "My Organization");
    }

    #[test]
    fn explicit_values_are_kept() {
        let req = UpdateOrganizationRequest {
            name: Some("Acme".into()),
            invoice_prefix: Some("F".into()),
            invoice_sequence: Some(120),
            invoice_digits: Some(5),
            decimal_separator: Some(".".into()),
            ..Default::default()
        };
        let values = req.resolved();
        assert_eq!(values.name, "Acme");
        assert_eq!(values.invoice_prefix, "F");
        assert_eq!(values.invoice_sequence, 120);
        assert_eq!(values.invoice_digits, 5);
        assert_eq!(values.decimal_separator, ".");
    }
}
