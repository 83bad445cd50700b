use std::collections::HashSet;

use chrono::{DateTime, Utc};
use orderdesk_catalog::ReservedLine;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One requested (product, quantity) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedItem {
    pub product_id: Uuid,
    pub quantity: u32,
}

/// Transient input to order creation; never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub customer_id: Uuid,
    pub items: Vec<RequestedItem>,
}

impl OrderRequest {
    pub fn new(customer_id: Uuid, items: Vec<RequestedItem>) -> Self {
        Self { customer_id, items }
    }

    /// Requested product ids without repeats, in first-seen order.
    pub fn distinct_product_ids(&self) -> Vec<Uuid> {
        let mut seen = HashSet::with_capacity(self.items.len());
        self.items
            .iter()
            .map(|item| item.product_id)
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

/// A product line frozen at purchase time. Later catalog price changes
/// never reach it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub product_id: Uuid,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl From<ReservedLine> for OrderLineItem {
    fn from(line: ReservedLine) -> Self {
        Self {
            product_id: line.product_id,
            unit_price: line.unit_price,
            quantity: line.quantity,
        }
    }
}

/// A persisted order. Id and timestamp are assigned by the order store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub ordered_at: DateTime<Utc>,
    pub items: Vec<OrderLineItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_distinct_product_ids_keeps_first_seen_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let request = OrderRequest::new(
            Uuid::new_v4(),
            vec![
                RequestedItem { product_id: b, quantity: 1 },
                RequestedItem { product_id: a, quantity: 2 },
                RequestedItem { product_id: b, quantity: 3 },
            ],
        );

        assert_eq!(request.distinct_product_ids(), vec![b, a]);
    }

    #[test]
    fn test_request_deserializes_from_json() {
        let customer_id = Uuid::new_v4();
        let product_id = Uuid::new_v4();
        let json = serde_json::json!({
            "customer_id": customer_id,
            "items": [{ "product_id": product_id, "quantity": 3 }]
        });

        let request: OrderRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.customer_id, customer_id);
        assert_eq!(request.items, vec![RequestedItem { product_id, quantity: 3 }]);
    }

    #[test]
    fn test_line_item_from_reservation() {
        let product_id = Uuid::new_v4();
        let line = OrderLineItem::from(ReservedLine {
            product_id,
            unit_price: dec!(10.00),
            quantity: 3,
        });
        assert_eq!(line.product_id, product_id);
        assert_eq!(line.unit_price, dec!(10.00));
        assert_eq!(line.quantity, 3);
    }
}
