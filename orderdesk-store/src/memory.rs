use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use orderdesk_catalog::{Product, QuantityUpdate};
use orderdesk_core::{
    Customer, CustomerDirectory, Order, OrderLineItem, OrderStore, OrderTransaction, ProductCatalog,
    StoreError, StoreResult, TransactionSource,
};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct MemoryState {
    customers: HashMap<Uuid, Customer>,
    products: HashMap<Uuid, Product>,
    orders: Vec<Order>,
}

impl MemoryState {
    fn check(&self, update: &QuantityUpdate) -> StoreResult<()> {
        match self.products.get(&update.product_id) {
            Some(product) if product.available_quantity == update.expected_quantity => Ok(()),
            _ => Err(StoreError::Conflict { product_id: update.product_id }),
        }
    }
}

/// Process-local backend with optimistic concurrency.
///
/// Transactions read committed state and stage their writes. `commit` takes
/// the write lock, re-checks every staged stock update against the current
/// quantity and applies all of them or none.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
    fail_order_writes: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_customer(&self, customer: Customer) {
        self.state.write().await.customers.insert(customer.id, customer);
    }

    pub async fn insert_product(&self, product: Product) {
        self.state.write().await.products.insert(product.id, product);
    }

    pub async fn product(&self, id: Uuid) -> Option<Product> {
        self.state.read().await.products.get(&id).cloned()
    }

    /// Changes a catalog price outside of any order transaction.
    pub async fn set_price(&self, id: Uuid, price: Decimal) -> bool {
        let mut state = self.state.write().await;
        match state.products.get_mut(&id) {
            Some(product) => {
                product.price = price;
                product.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.state.read().await.orders.clone()
    }

    /// Makes every subsequent `OrderStore::create` fail until reset.
    pub fn fail_order_writes(&self, fail: bool) {
        self.fail_order_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl TransactionSource for InMemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn OrderTransaction>> {
        Ok(Box::new(InMemoryTransaction {
            state: self.state.clone(),
            fail_order_writes: self.fail_order_writes.clone(),
            staged_updates: Vec::new(),
            staged_orders: Vec::new(),
            finished: false,
        }))
    }
}

pub struct InMemoryTransaction {
    state: Arc<RwLock<MemoryState>>,
    fail_order_writes: Arc<AtomicBool>,
    staged_updates: Vec<QuantityUpdate>,
    staged_orders: Vec<Order>,
    finished: bool,
}

impl InMemoryTransaction {
    fn ensure_open(&self) -> StoreResult<()> {
        if self.finished {
            return Err(StoreError::TransactionClosed);
        }
        Ok(())
    }
}

#[async_trait]
impl CustomerDirectory for InMemoryTransaction {
    async fn find_by_id(&mut self, id: Uuid) -> StoreResult<Option<Customer>> {
        self.ensure_open()?;
        Ok(self.state.read().await.customers.get(&id).cloned())
    }
}

#[async_trait]
impl ProductCatalog for InMemoryTransaction {
    async fn find_all_by_id(&mut self, ids: &[Uuid]) -> StoreResult<Vec<Product>> {
        self.ensure_open()?;
        let state = self.state.read().await;
        Ok(ids.iter().filter_map(|id| state.products.get(id).cloned()).collect())
    }

    async fn update_quantity(&mut self, updates: &[QuantityUpdate]) -> StoreResult<()> {
        self.ensure_open()?;
        {
            // Fail early on writes that would lose at commit anyway
            let state = self.state.read().await;
            for update in updates {
                state.check(update)?;
            }
        }
        self.staged_updates.extend_from_slice(updates);
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryTransaction {
    async fn create(&mut self, customer: &Customer, items: Vec<OrderLineItem>) -> StoreResult<Order> {
        self.ensure_open()?;
        if self.fail_order_writes.load(Ordering::SeqCst) {
            return Err(StoreError::backend(std::io::Error::other("order store unavailable")));
        }

        let order = Order {
            id: Uuid::new_v4(),
            customer_id: customer.id,
            ordered_at: Utc::now(),
            items,
        };
        self.staged_orders.push(order.clone());
        Ok(order)
    }
}

#[async_trait]
impl OrderTransaction for InMemoryTransaction {
    async fn commit(&mut self) -> StoreResult<()> {
        self.ensure_open()?;
        self.finished = true;

        let mut state = self.state.write().await;
        for update in &self.staged_updates {
            state.check(update)?;
        }

        let now = Utc::now();
        for update in self.staged_updates.drain(..) {
            if let Some(product) = state.products.get_mut(&update.product_id) {
                product.available_quantity = update.new_quantity;
                product.updated_at = now;
            }
        }
        state.orders.append(&mut self.staged_orders);
        Ok(())
    }

    async fn rollback(&mut self) -> StoreResult<()> {
        self.ensure_open()?;
        self.finished = true;
        self.staged_updates.clear();
        self.staged_orders.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    async fn seeded() -> (InMemoryStore, Customer, Product) {
        let store = InMemoryStore::new();
        let customer = Customer::new("Ada", None);
        let product = Product::new("Lamp", dec!(10.00), 5);
        store.insert_customer(customer.clone()).await;
        store.insert_product(product.clone()).await;
        (store, customer, product)
    }

    fn take(product: &Product, quantity: u32) -> QuantityUpdate {
        QuantityUpdate {
            product_id: product.id,
            expected_quantity: product.available_quantity,
            new_quantity: product.available_quantity - quantity,
        }
    }

    #[tokio::test]
    async fn test_writes_invisible_until_commit() {
        let (store, customer, product) = seeded().await;
        let mut tx = store.begin().await.unwrap();

        tx.update_quantity(&[take(&product, 2)]).await.unwrap();
        tx.create(&customer, vec![]).await.unwrap();
        assert_eq!(store.product(product.id).await.unwrap().available_quantity, 5);
        assert!(store.orders().await.is_empty());

        tx.commit().await.unwrap();
        assert_eq!(store.product(product.id).await.unwrap().available_quantity, 3);
        assert_eq!(store.orders().await.len(), 1);
    }

    #[tokio::test]
    async fn test_rollback_discards_staged_writes() {
        let (store, customer, product) = seeded().await;
        let mut tx = store.begin().await.unwrap();

        tx.update_quantity(&[take(&product, 2)]).await.unwrap();
        tx.create(&customer, vec![]).await.unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(store.product(product.id).await.unwrap().available_quantity, 5);
        assert!(store.orders().await.is_empty());
        assert!(matches!(tx.commit().await, Err(StoreError::TransactionClosed)));
    }

    #[tokio::test]
    async fn test_second_commit_on_same_stock_conflicts() {
        let (store, customer, product) = seeded().await;
        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();

        first.update_quantity(&[take(&product, 3)]).await.unwrap();
        second.update_quantity(&[take(&product, 3)]).await.unwrap();
        first.create(&customer, vec![]).await.unwrap();
        second.create(&customer, vec![]).await.unwrap();

        first.commit().await.unwrap();
        let err = second.commit().await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { product_id } if product_id == product.id));

        assert_eq!(store.product(product.id).await.unwrap().available_quantity, 2);
        assert_eq!(store.orders().await.len(), 1);
    }

    #[tokio::test]
    async fn test_stale_update_rejected_before_commit() {
        let (store, _, product) = seeded().await;
        let mut tx = store.begin().await.unwrap();
        let stale = QuantityUpdate {
            product_id: product.id,
            expected_quantity: 4,
            new_quantity: 1,
        };

        assert!(tx.update_quantity(&[stale]).await.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_partial_lookup_returns_only_found_products() {
        let (store, _, product) = seeded().await;
        let mut tx = store.begin().await.unwrap();

        let found = tx.find_all_by_id(&[product.id, Uuid::new_v4()]).await.unwrap();
        assert_eq!(found, vec![product]);
    }
}
