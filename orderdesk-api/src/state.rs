use std::sync::Arc;
use std::time::Duration;

use orderdesk_order::{CreateOrderWorkflow, RetryConfig};
use orderdesk_store::app_config::OrdersConfig;

#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<CreateOrderWorkflow>,
}

impl AppState {
    pub fn new(orders: CreateOrderWorkflow) -> Self {
        Self { orders: Arc::new(orders) }
    }
}

pub fn retry_config(orders: &OrdersConfig) -> RetryConfig {
    RetryConfig {
        max_attempts: orders.max_attempts,
        base_delay: Duration::from_millis(orders.base_delay_ms),
        max_delay: Duration::from_millis(orders.max_delay_ms),
        ..RetryConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_config_from_orders_section() {
        let retry = retry_config(&OrdersConfig {
            max_attempts: 5,
            base_delay_ms: 20,
            max_delay_ms: 400,
        });

        assert_eq!(retry.max_attempts, 5);
        assert_eq!(retry.base_delay, Duration::from_millis(20));
        assert_eq!(retry.max_delay, Duration::from_millis(400));
        assert_eq!(retry.backoff_multiplier, 2.0);
    }
}
