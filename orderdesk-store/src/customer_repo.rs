use async_trait::async_trait;
use orderdesk_core::{Customer, CustomerDirectory, StoreError, StoreResult};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::transaction::PgOrderTransaction;

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: Uuid,
    name: String,
    email: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

pub(crate) async fn fetch_customer(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<Customer>, sqlx::Error> {
    let row = sqlx::query_as::<_, CustomerRow>(
        "SELECT id, name, email, created_at FROM customers WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(Customer::from))
}

#[async_trait]
impl CustomerDirectory for PgOrderTransaction {
    async fn find_by_id(&mut self, id: Uuid) -> StoreResult<Option<Customer>> {
        let conn = self.conn()?;
        fetch_customer(conn, id).await.map_err(StoreError::backend)
    }
}
