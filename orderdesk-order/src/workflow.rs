use std::sync::Arc;

use orderdesk_catalog::StockSnapshot;
use orderdesk_core::{
    CustomerDirectory, Order, OrderLineItem, OrderRequest, OrderStore, OrderTransaction,
    ProductCatalog, TransactionSource,
};
use tracing::{error, info, instrument, warn};

use crate::error::OrderError;
use crate::retry::RetryConfig;

/// Creates orders: customer lookup, product lookup, stock check, stock
/// decrement and order persistence, all inside one storage transaction.
///
/// Either the stock decrement and the order both land, or neither does.
pub struct CreateOrderWorkflow {
    source: Arc<dyn TransactionSource>,
    retry: RetryConfig,
}

impl CreateOrderWorkflow {
    pub fn new(source: Arc<dyn TransactionSource>) -> Self {
        Self {
            source,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    #[instrument(
        name = "create_order",
        skip_all,
        fields(customer_id = %request.customer_id, items = request.items.len())
    )]
    pub async fn execute(&self, request: &OrderRequest) -> Result<Order, OrderError> {
        if let Err(err) = validate(request) {
            info!(error = %err, "Order request rejected");
            return Err(err);
        }

        let mut attempt = 1;
        loop {
            match self.attempt(request).await {
                Ok(order) => {
                    info!(order_id = %order.id, attempt, "Order created");
                    return Ok(order);
                }
                Err(OrderError::Store(err)) if err.is_conflict() && self.retry.allows_retry_after(attempt) => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        attempt,
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "Stock changed concurrently, retrying order"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) if err.is_domain() => {
                    info!(error = %err, "Order request rejected");
                    return Err(err);
                }
                Err(err) => {
                    error!(error = %err, attempt, "Order creation failed");
                    return Err(err);
                }
            }
        }
    }

    async fn attempt(&self, request: &OrderRequest) -> Result<Order, OrderError> {
        let mut tx = self.source.begin().await?;

        match place_order(tx.as_mut(), request).await {
            Ok(order) => {
                tx.commit().await?;
                Ok(order)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    error!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}

fn validate(request: &OrderRequest) -> Result<(), OrderError> {
    if request.items.is_empty() {
        return Err(OrderError::EmptyOrder);
    }
    if let Some(item) = request.items.iter().find(|item| item.quantity == 0) {
        return Err(OrderError::InvalidQuantity { product_id: item.product_id });
    }
    Ok(())
}

async fn place_order(tx: &mut dyn OrderTransaction, request: &OrderRequest) -> Result<Order, OrderError> {
    let customer = tx
        .find_by_id(request.customer_id)
        .await?
        .ok_or(OrderError::InvalidCustomer(request.customer_id))?;

    let product_ids = request.distinct_product_ids();
    let products = tx.find_all_by_id(&product_ids).await?;

    let mut snapshot = StockSnapshot::new(products);
    let missing = snapshot.missing(&product_ids);
    if !missing.is_empty() {
        return Err(OrderError::InvalidProduct { missing });
    }

    // Duplicate entries stay separate lines but draw from the same remaining stock
    let mut items = Vec::with_capacity(request.items.len());
    for item in &request.items {
        let line = snapshot.reserve(&item.product_id, item.quantity)?;
        items.push(OrderLineItem::from(line));
    }

    tx.update_quantity(&snapshot.into_updates()).await?;

    let order = tx.create(&customer, items).await?;
    Ok(order)
}
