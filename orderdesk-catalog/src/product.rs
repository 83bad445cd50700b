use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sellable catalog entry.
///
/// The catalog owns products; order creation only ever reads a snapshot of
/// one and writes back a new `available_quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub available_quantity: u32,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(name: impl Into<String>, price: Decimal, available_quantity: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            price,
            available_quantity,
            updated_at: Utc::now(),
        }
    }
}

/// Conditional stock write: applies only while the stored quantity still
/// equals `expected_quantity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityUpdate {
    pub product_id: Uuid,
    pub expected_quantity: u32,
    pub new_quantity: u32,
}

impl QuantityUpdate {
    pub fn decrement(&self) -> u32 {
        self.expected_quantity - self.new_quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_product_gets_fresh_id() {
        let a = Product::new("Keyboard", dec!(49.90), 3);
        let b = Product::new("Keyboard", dec!(49.90), 3);
        assert_ne!(a.id, b.id);
        assert_eq!(a.available_quantity, 3);
    }

    #[test]
    fn test_quantity_update_decrement() {
        let update = QuantityUpdate {
            product_id: Uuid::new_v4(),
            expected_quantity: 5,
            new_quantity: 2,
        };
        assert_eq!(update.decrement(), 3);
    }
}
