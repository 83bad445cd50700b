use async_trait::async_trait;
use chrono::{DateTime, Utc};
use orderdesk_core::{Customer, Order, OrderLineItem, OrderStore, StoreError, StoreResult};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::transaction::PgOrderTransaction;

pub(crate) async fn insert_order(
    conn: &mut PgConnection,
    customer: &Customer,
    items: Vec<OrderLineItem>,
) -> StoreResult<Order> {
    let order_id = Uuid::new_v4();

    let ordered_at: DateTime<Utc> = sqlx::query_scalar(
        "INSERT INTO orders (id, customer_id) VALUES ($1, $2) RETURNING ordered_at",
    )
    .bind(order_id)
    .bind(customer.id)
    .fetch_one(&mut *conn)
    .await
    .map_err(StoreError::backend)?;

    for item in &items {
        let quantity = i32::try_from(item.quantity).map_err(|_| {
            StoreError::Corrupt(format!("line quantity {} exceeds column range", item.quantity))
        })?;

        sqlx::query(
            r#"
            INSERT INTO order_items (id, order_id, product_id, unit_price, quantity)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(item.product_id)
        .bind(item.unit_price)
        .bind(quantity)
        .execute(&mut *conn)
        .await
        .map_err(StoreError::backend)?;
    }

    Ok(Order {
        id: order_id,
        customer_id: customer.id,
        ordered_at,
        items,
    })
}

#[async_trait]
impl OrderStore for PgOrderTransaction {
    async fn create(&mut self, customer: &Customer, items: Vec<OrderLineItem>) -> StoreResult<Order> {
        let conn = self.conn()?;
        insert_order(conn, customer, items).await
    }
}
