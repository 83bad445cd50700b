use async_trait::async_trait;
use orderdesk_catalog::{Product, QuantityUpdate};
use uuid::Uuid;

use crate::customer::Customer;
use crate::models::{Order, OrderLineItem};
use crate::StoreResult;

/// Customer lookup.
#[async_trait]
pub trait CustomerDirectory: Send {
    async fn find_by_id(&mut self, id: Uuid) -> StoreResult<Option<Customer>>;
}

/// Product catalog access.
#[async_trait]
pub trait ProductCatalog: Send {
    /// Returns only the products that exist. A partial miss is not an error.
    async fn find_all_by_id(&mut self, ids: &[Uuid]) -> StoreResult<Vec<Product>>;

    /// Applies every update or none. Fails with `StoreError::Conflict` when a
    /// stored quantity no longer matches `expected_quantity`.
    async fn update_quantity(&mut self, updates: &[QuantityUpdate]) -> StoreResult<()>;
}

/// Order persistence.
#[async_trait]
pub trait OrderStore: Send {
    /// Assigns id and timestamp and returns the stored order.
    async fn create(&mut self, customer: &Customer, items: Vec<OrderLineItem>) -> StoreResult<Order>;
}

/// One unit of work spanning all three collaborators.
///
/// Nothing written through it is visible to other transactions until
/// `commit` succeeds. Dropping it without committing discards every write.
#[async_trait]
pub trait OrderTransaction: CustomerDirectory + ProductCatalog + OrderStore {
    async fn commit(&mut self) -> StoreResult<()>;
    async fn rollback(&mut self) -> StoreResult<()>;
}

/// Opens order transactions against a backend.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn OrderTransaction>>;
}
