// src/testing.rs
//
// Postgres descartável (testcontainers) para os testes que precisam do banco.
// Cada teste sobe o seu próprio container, com as migrações aplicadas.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::postgres::Postgres;
use uuid::Uuid;

use crate::{
    config::{AppState, Config},
    models::{
        client::{Client, ClientPayload},
        document::LineItemInput,
        invoice::InvoicePayload,
        organization::{Organization, UpdateOrganizationRequest},
    },
};

pub struct TestDb {
    pub state: AppState,
    // O container para quando este handle é descartado
    _container: ContainerAsync<Postgres>,
}

pub async fn start() -> TestDb {
    let container = Postgres::default()
        .start()
        .await
        .expect("Falha ao subir o Postgres (o Docker está rodando?)");

    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();
    let url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

    let pool = PgPoolOptions::new().max_connections(5).connect(&url).await.unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();

    let config = Config::from_lookup(|key| (key == "DATABASE_URL").then(|| url.clone())).unwrap();

    TestDb { state: AppState::with_pool(pool, config), _container: container }
}

pub fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub fn date(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn item(title: &str, quantity: &str, price: &str, vat: &str) -> LineItemInput {
    LineItemInput {
        title: Some(title.to_string()),
        description: String::new(),
        quantity: d(quantity),
        price: d(price),
        vat: Some(d(vat)),
    }
}

pub fn invoice_payload(client_id: Uuid, on: NaiveDate, items: Vec<LineItemInput>) -> InvoicePayload {
    InvoicePayload {
        client_id,
        quote_id: None,
        date: on,
        due_date: None,
        notes: None,
        items,
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

pub async fn client(state: &AppState, name: &str) -> Client {
    let payload = ClientPayload {
        name: name.to_string(),
        email: Some(format!("{}@acme.test", name.to_lowercase())),
        phone: None,
        address: None,
        city: None,
        zip_code: None,
        country: None,
        vat_number: None,
        company_id: None,
    };
    state.client_service.create(&state.db_pool, &payload).await.unwrap()
}

/// Organização com numeração `<prefixo><sequência com 3 dígitos>`.
pub async fn organization(state: &AppState, prefix: &str, sequence: i32) -> Organization {
    let request = UpdateOrganizationRequest {
        name: Some("Acme Studio".into()),
        invoice_prefix: Some(prefix.to_string()),
        invoice_include_prefix: true,
        invoice_sequence: Some(sequence),
        invoice_digits: Some(3),
        ..Default::default()
    };
    state.settings_service.upsert(&state.db_pool, &request).await.unwrap()
}
