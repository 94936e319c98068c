// src/db/items_repo.rs
//
// Os três tipos de documento têm itens com o mesmo formato; só mudam a
// tabela e a coluna do documento pai.

use sqlx::{Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::document::{LineItem, NewLineItem},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemTable {
    Quote,
    Invoice,
    Bill,
}

impl ItemTable {
    pub fn table(self) -> &'static str {
        match self {
            ItemTable::Quote => "quote_items",
            ItemTable::Invoice => "invoice_items",
            ItemTable::Bill => "bill_items",
        }
    }

    pub fn parent_column(self) -> &'static str {
        match self {
            ItemTable::Quote => "quote_id",
            ItemTable::Invoice => "invoice_id",
            ItemTable::Bill => "bill_id",
        }
    }
}

pub async fn insert_items<'e, E>(
    executor: E,
    table: ItemTable,
    parent_id: Uuid,
    items: &[NewLineItem],
) -> Result<(), AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    if items.is_empty() {
        return Ok(());
    }

    // INSERT em lote: uma única ida ao banco para todos os itens
    let mut builder = QueryBuilder::<Postgres>::new(format!(
        "INSERT INTO {} ({}, position, title, description, quantity, price, vat, total) ",
        table.table(),
        table.parent_column()
    ));

    builder.push_values(items, |mut row, item| {
        row.push_bind(parent_id)
            .push_bind(item.position)
            .push_bind(item.title.clone())
            .push_bind(item.description.clone())
            .push_bind(item.quantity)
            .push_bind(item.price)
            .push_bind(item.vat)
            .push_bind(item.total);
    });

    builder.build().execute(executor).await?;
    Ok(())
}

pub async fn delete_items<'e, E>(executor: E, table: ItemTable, parent_id: Uuid) -> Result<u64, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!("DELETE FROM {} WHERE {} = $1", table.table(), table.parent_column());
    let result = sqlx::query(&sql).bind(parent_id).execute(executor).await?;
    Ok(result.rows_affected())
}

pub async fn list_items<'e, E>(executor: E, table: ItemTable, parent_id: Uuid) -> Result<Vec<LineItem>, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!(
        "SELECT id, position, title, description, quantity, price, vat, total
         FROM {} WHERE {} = $1 ORDER BY position ASC, id ASC",
        table.table(),
        table.parent_column()
    );
    let items = sqlx::query_as::<_, LineItem>(&sql)
        .bind(parent_id)
        .fetch_all(executor)
        .await?;
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_document_has_its_own_item_table() {
        assert_eq!(ItemTable::Quote.table(), "quote_items");
        assert_eq!(ItemTable::Invoice.parent_column(), "invoice_id");
        assert_eq!(ItemTable::Bill.table(), "bill_items");
        assert_eq!(ItemTable::Bill.parent_column(), "bill_id");
    }
}
