// src/models/client.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    bill::BillSummary, invoice::InvoiceSummary, organization::blank_to_none, quote::QuoteSummary,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "Acme Corp")]
    pub name: String,
    #[schema(example = "billing@acme.test")]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub vat_number: Option<String>,
    pub company_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Acme Corp")]
    pub name: String,
    #[validate(email(message = "invalid email"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub vat_number: Option<String>,
    pub company_id: Option<String>,
}

impl ClientPayload {
    /// Campos vazios do formulário viram NULL.
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        for field in [
            &mut self.email,
            &mut self.phone,
            &mut self.address,
            &mut self.city,
            &mut self.zip_code,
            &mut self.country,
            &mut self.vat_number,
            &mut self.company_id,
        ] {
            *field = blank_to_none(field);
        }
    }
}

/// Resultado enxuto para o autocomplete.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientOption {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientDetails {
    #[serde(flatten)]
    pub client: Client,
    pub quotes: Vec<QuoteSummary>,
    pub invoices: Vec<InvoiceSummary>,
    pub bills: Vec<BillSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_turns_blank_fields_into_none() {
        let mut payload = ClientPayload {
            name: "  Acme  ".into(),
            email: Some("".into()),
            phone: Some(" 0470 ".into()),
            address: None,
            city: Some("   ".into()),
            zip_code: None,
            country: None,
            vat_number: None,
            company_id: None,
        };
        payload.normalize();

        assert_eq!(payload.name, "Acme");
        assert_eq!(payload.email, None);
        assert_eq!(payload.phone.as_deref(), Some("0470"));
        assert_eq!(payload.city, None);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut payload = ClientPayload {
            name: " ".into(),
            email: Some("not-an-email".into()),
            phone: None,
            address: None,
            city: None,
            zip_code: None,
            country: None,
            vat_number: None,
            company_id: None,
        };
        payload.normalize();
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
    }
}
