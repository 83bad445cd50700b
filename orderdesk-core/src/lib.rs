pub mod customer;
pub mod models;
pub mod repository;

pub use customer::Customer;
pub use models::{Order, OrderLineItem, OrderRequest, RequestedItem};
pub use repository::{CustomerDirectory, OrderStore, OrderTransaction, ProductCatalog, TransactionSource};

use uuid::Uuid;

/// Failures raised by storage adapters. None of these are user errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A conditional stock write found a quantity other than the one it read.
    #[error("Concurrent stock update detected for product {product_id}")]
    Conflict { product_id: Uuid },
    #[error("Transaction already finished")]
    TransactionClosed,
    #[error("Stored data is invalid: {0}")]
    Corrupt(String),
    #[error("Storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
