// src/services/client_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BillRepository, ClientRepository, InvoiceRepository, QuoteRepository},
    models::client::{Client, ClientDetails, ClientOption, ClientPayload},
};

pub const CLIENT_SEARCH_MIN_CHARS: usize = 2;
pub const SEARCH_LIMIT: i64 = 15;

#[derive(Clone)]
pub struct ClientService {
    repo: ClientRepository,
    quote_repo: QuoteRepository,
    invoice_repo: InvoiceRepository,
    bill_repo: BillRepository,
}

impl ClientService {
    pub fn new(
        repo: ClientRepository,
        quote_repo: QuoteRepository,
        invoice_repo: InvoiceRepository,
        bill_repo: BillRepository,
    ) -> Self {
        Self { repo, quote_repo, invoice_repo, bill_repo }
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &ClientPayload) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = self.repo.create(executor, payload).await?;
        tracing::info!("Cliente criado: {} ({})", client.name, client.id);
        Ok(client)
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &ClientPayload) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update(executor, id, payload)
            .await?
            .ok_or_else(|| AppError::not_found("Client", id))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        match self.repo.delete(executor, id).await? {
            0 => Err(AppError::not_found("Client", id)),
            _ => Ok(()),
        }
    }

    pub async fn get<'e, E>(&self, executor: E, id: Uuid) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_by_id(executor, id)
            .await?
            .ok_or_else(|| AppError::not_found("Client", id))
    }

    pub async fn list(&self) -> Result<Vec<Client>, AppError> {
        self.repo.list().await
    }

    /// Cliente com todos os seus documentos.
    pub async fn details<'e, E>(&self, executor: E, id: Uuid) -> Result<ClientDetails, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = self.get(executor, id).await?;

        let (quotes, invoices, bills) = tokio::try_join!(
            self.quote_repo.list_by_client(id),
            self.invoice_repo.list_by_client(id),
            self.bill_repo.list_by_client(id),
        )?;

        Ok(ClientDetails { client, quotes, invoices, bills })
    }

    pub async fn search(&self, query: &str) -> Result<Vec<ClientOption>, AppError> {
        let query = query.trim();
        if query.chars().count() < CLIENT_SEARCH_MIN_CHARS {
            return Ok(Vec::new());
        }
        self.repo.search(query, SEARCH_LIMIT).await
    }
}

#[cfg(all(test, feature = "db-tests"))]
mod db_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{
        common::error::AppError,
        testing::{self, date, item},
    };

    #[tokio::test]
    async fn client_with_documents_cannot_be_deleted() {
        let db = testing::start().await;
        let (state, pool) = (&db.state, &db.state.db_pool);
        let client = testing::client(state, "Busy").await;

        let payload = testing::invoice_payload(client.id, date(2026, 10, 16), vec![item("Work", "1", "10", "0")]);
        let invoice = state.invoice_service.create(pool, &payload).await.unwrap();

        let err = state.client_service.delete(pool, client.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref msg) if msg == "Client still has quotes, invoices or bills"));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);

        // Sem documentos o cliente sai normalmente
        state.invoice_service.delete(pool, invoice.header.id).await.unwrap();
        state.client_service.delete(pool, client.id).await.unwrap();
        assert!(matches!(
            state.client_service.get(pool, client.id).await,
            Err(AppError::ResourceNotFound(_))
        ));
    }
}
