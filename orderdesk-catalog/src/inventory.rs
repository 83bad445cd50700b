use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::product::{Product, QuantityUpdate};

/// A price-snapshotted reservation against one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservedLine {
    pub product_id: Uuid,
    pub unit_price: Decimal,
    pub quantity: u32,
}

#[derive(Debug, Clone)]
struct SnapshotEntry {
    product: Product,
    remaining: u32,
}

/// Stock as read from the catalog at the start of a unit of work.
///
/// Reservations only touch the snapshot. Nothing reaches the catalog until
/// the caller turns the snapshot into [`QuantityUpdate`]s, so dropping it after
/// a failed reservation leaves stock exactly as it was.
#[derive(Debug, Clone, Default)]
pub struct StockSnapshot {
    entries: HashMap<Uuid, SnapshotEntry>,
}

impl StockSnapshot {
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        let entries = products
            .into_iter()
            .map(|product| {
                let remaining = product.available_quantity;
                (product.id, SnapshotEntry { product, remaining })
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids from `requested` that the snapshot has no product for.
    pub fn missing<'a>(&self, requested: impl IntoIterator<Item = &'a Uuid>) -> Vec<Uuid> {
        requested
            .into_iter()
            .filter(|id| !self.entries.contains_key(id))
            .copied()
            .collect()
    }

    /// Quantity still available after the reservations made so far.
    pub fn remaining(&self, product_id: &Uuid) -> Option<u32> {
        self.entries.get(product_id).map(|entry| entry.remaining)
    }

    /// Reserve `quantity` units of a product at its snapshot price.
    pub fn reserve(&mut self, product_id: &Uuid, quantity: u32) -> Result<ReservedLine, StockError> {
        let entry = self
            .entries
            .get_mut(product_id)
            .ok_or(StockError::NotFound(*product_id))?;

        if quantity > entry.remaining {
            return Err(StockError::Insufficient {
                product_id: *product_id,
                product_name: entry.product.name.clone(),
                requested: quantity,
                available: entry.remaining,
            });
        }

        entry.remaining -= quantity;

        Ok(ReservedLine {
            product_id: *product_id,
            unit_price: entry.product.price,
            quantity,
        })
    }

    /// One conditional update per product with at least one reservation.
    ///
    /// Sorted by product id so concurrent writers touch rows in the same order.
    pub fn into_updates(self) -> Vec<QuantityUpdate> {
        let mut updates: Vec<QuantityUpdate> = self
            .entries
            .into_values()
            .filter(|entry| entry.remaining != entry.product.available_quantity)
            .map(|entry| QuantityUpdate {
                product_id: entry.product.id,
                expected_quantity: entry.product.available_quantity,
                new_quantity: entry.remaining,
            })
            .collect();
        updates.sort_by_key(|update| update.product_id);
        updates
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StockError {
    #[error("Product not found: {0}")]
    NotFound(Uuid),

    #[error("Insufficient stock for {product_name}: requested {requested}, available {available}")]
    Insufficient {
        product_id: Uuid,
        product_name: String,
        requested: u32,
        available: u32,
    },
}
