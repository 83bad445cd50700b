use async_trait::async_trait;
use orderdesk_core::{OrderTransaction, StoreError, StoreResult};
use sqlx::{PgConnection, Postgres, Transaction};

/// A Postgres transaction acting as customer directory, product catalog and
/// order store at once. Dropped without `commit`, sqlx rolls it back.
pub struct PgOrderTransaction {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgOrderTransaction {
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self { tx: Some(tx) }
    }

    pub(crate) fn conn(&mut self) -> StoreResult<&mut PgConnection> {
        self.tx.as_deref_mut().ok_or(StoreError::TransactionClosed)
    }
}

#[async_trait]
impl OrderTransaction for PgOrderTransaction {
    async fn commit(&mut self) -> StoreResult<()> {
        let tx = self.tx.take().ok_or(StoreError::TransactionClosed)?;
        tx.commit().await.map_err(StoreError::backend)
    }

    async fn rollback(&mut self) -> StoreResult<()> {
        let tx = self.tx.take().ok_or(StoreError::TransactionClosed)?;
        tx.rollback().await.map_err(StoreError::backend)
    }
}
