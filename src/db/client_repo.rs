// src/db/client_repo.rs

use sqlx::{Executor, PgConnection, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::client::{Client, ClientOption, ClientPayload},
};

// Padrão dos clientes gerados pelo seed (client1234@example.com)
pub const SEED_EMAIL_PATTERN: &str = "client%@example.com";

#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(&self, executor: E, input: &ClientPayload) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (
                name, email, phone, address, city, zip_code, country, vat_number, company_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.zip_code)
        .bind(&input.country)
        .bind(&input.vat_number)
        .bind(&input.company_id)
        .fetch_one(executor)
        .await?;

        Ok(client)
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, input: &ClientPayload) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients SET
                name = $2, email = $3, phone = $4, address = $5, city = $6,
                zip_code = $7, country = $8, vat_number = $9, company_id = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.zip_code)
        .bind(&input.country)
        .bind(&input.vat_number)
        .bind(&input.company_id)
        .fetch_optional(executor)
        .await?;

        Ok(client)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| AppError::from_write(e, "Client still has quotes, invoices or bills"))?;

        Ok(result.rows_affected())
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(client)
    }

    // =========================================================================
    //  LEITURAS (direto na pool)
    // =========================================================================

    pub async fn list(&self) -> Result<Vec<Client>, AppError> {
        let clients = sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(clients)
    }

    /// Busca por nome (case-insensitive), mais recentes primeiro.
    pub async fn search(&self, query: &str, limit: i64) -> Result<Vec<ClientOption>, AppError> {
        let clients = sqlx::query_as::<_, ClientOption>(
            r#"
            SELECT id, name FROM clients
            WHERE name ILIKE '%' || $1 || '%'
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(escape_like(query))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    // =========================================================================
    //  DADOS DE TESTE
    // =========================================================================

    pub async fn seeded_client_ids<'e, E>(&self, executor: E) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM clients WHERE email LIKE $1")
            .bind(SEED_EMAIL_PATTERN)
            .fetch_all(executor)
            .await?;

        Ok(ids)
    }

    /// Remove os clientes e todos os documentos ligados a eles (itens saem
    /// por cascata). Deve rodar dentro de uma transação.
    pub async fn delete_with_documents(&self, conn: &mut PgConnection, ids: &[Uuid]) -> Result<u64, AppError> {
        for table in ["invoices", "bills", "quotes"] {
            let sql = format!("DELETE FROM {} WHERE client_id = ANY($1)", table);
            sqlx::query(&sql).bind(ids).execute(&mut *conn).await?;
        }

        let result = sqlx::query("DELETE FROM clients WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Escapa curingas do LIKE digitados pelo usuário.
pub fn escape_like(input: &str) -> String {
    input.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("acme"), "acme");
    }
}
