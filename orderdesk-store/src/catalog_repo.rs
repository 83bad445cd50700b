use async_trait::async_trait;
use orderdesk_catalog::{Product, QuantityUpdate};
use orderdesk_core::{ProductCatalog, StoreError, StoreResult};
use rust_decimal::Decimal;
use sqlx::PgConnection;
use tracing::debug;
use uuid::Uuid;

use crate::transaction::PgOrderTransaction;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    price: Decimal,
    available_quantity: i32,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let available_quantity = u32::try_from(row.available_quantity).map_err(|_| {
            StoreError::Corrupt(format!(
                "product {} has negative quantity {}",
                row.id, row.available_quantity
            ))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            price: row.price,
            available_quantity,
            updated_at: row.updated_at,
        })
    }
}

fn to_column(product_id: Uuid, quantity: u32) -> StoreResult<i32> {
    i32::try_from(quantity).map_err(|_| {
        StoreError::Corrupt(format!("quantity {} for product {} exceeds column range", quantity, product_id))
    })
}

/// Reads and row-locks the requested products until the transaction ends.
pub(crate) async fn lock_products(conn: &mut PgConnection, ids: &[Uuid]) -> StoreResult<Vec<Product>> {
    // Fixed lock order keeps concurrent order transactions from deadlocking
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT id, name, price, available_quantity, updated_at FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE",
    )
    .bind(ids.to_vec())
    .fetch_all(&mut *conn)
    .await
    .map_err(StoreError::backend)?;

    rows.into_iter().map(Product::try_from).collect()
}

pub(crate) async fn apply_quantity_updates(
    conn: &mut PgConnection,
    updates: &[QuantityUpdate],
) -> StoreResult<()> {
    for update in updates {
        let new_quantity = to_column(update.product_id, update.new_quantity)?;
        let expected_quantity = to_column(update.product_id, update.expected_quantity)?;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET available_quantity = $1, updated_at = NOW()
            WHERE id = $2 AND available_quantity = $3
            "#,
        )
        .bind(new_quantity)
        .bind(update.product_id)
        .bind(expected_quantity)
        .execute(&mut *conn)
        .await
        .map_err(StoreError::backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict { product_id: update.product_id });
        }

        debug!(
            product_id = %update.product_id,
            from = update.expected_quantity,
            to = update.new_quantity,
            "Stock updated"
        );
    }

    Ok(())
}

#[async_trait]
impl ProductCatalog for PgOrderTransaction {
    async fn find_all_by_id(&mut self, ids: &[Uuid]) -> StoreResult<Vec<Product>> {
        let conn = self.conn()?;
        lock_products(conn, ids).await
    }

    async fn update_quantity(&mut self, updates: &[QuantityUpdate]) -> StoreResult<()> {
        let conn = self.conn()?;
        apply_quantity_updates(conn, updates).await
    }
}
