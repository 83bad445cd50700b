use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use orderdesk_core::{Order, OrderRequest, RequestedItem};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: Uuid,
    pub products: Vec<OrderedProduct>,
}

#[derive(Debug, Deserialize)]
pub struct OrderedProduct {
    pub id: Uuid,
    pub quantity: u32,
}

impl From<CreateOrderRequest> for OrderRequest {
    fn from(req: CreateOrderRequest) -> Self {
        OrderRequest::new(
            req.customer_id,
            req.products
                .into_iter()
                .map(|p| RequestedItem { product_id: p.id, quantity: p.quantity })
                .collect(),
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub ordered_at: DateTime<Utc>,
    pub products: Vec<OrderItemResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderItemResponse {
    pub product_id: Uuid,
    pub price: Decimal,
    pub quantity: u32,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            customer_id: order.customer_id,
            ordered_at: order.ordered_at,
            products: order
                .items
                .into_iter()
                .map(|item| OrderItemResponse {
                    product_id: item.product_id,
                    price: item.unit_price,
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/orders
pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    let request = OrderRequest::from(req);
    let order = state.orders.execute(&request).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/orders", post(create_order))
}
