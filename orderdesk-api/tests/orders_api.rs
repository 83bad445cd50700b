use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use orderdesk_api::{app, AppState};
use orderdesk_catalog::Product;
use orderdesk_core::Customer;
use orderdesk_order::{CreateOrderWorkflow, RetryConfig};
use orderdesk_store::InMemoryStore;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

async fn setup() -> (Router, InMemoryStore, Customer, Product) {
    let store = InMemoryStore::new();
    let customer = Customer::new("C1", None);
    let product = Product::new("P1", dec!(10.00), 5);
    store.insert_customer(customer.clone()).await;
    store.insert_product(product.clone()).await;

    let workflow = CreateOrderWorkflow::new(Arc::new(store.clone()))
        .with_retry_config(RetryConfig::immediate(3));
    (app(AppState::new(workflow)), store, customer, product)
}

async fn post_order(app: &Router, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/v1/orders")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_create_order_returns_created_order() {
    let (app, store, customer, product) = setup().await;

    let (status, body) = post_order(
        &app,
        json!({ "customer_id": customer.id, "products": [{ "id": product.id, "quantity": 3 }] }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["customer_id"], json!(customer.id));
    assert_eq!(body["products"][0]["product_id"], json!(product.id));
    assert_eq!(body["products"][0]["price"], json!("10.00"));
    assert_eq!(body["products"][0]["quantity"], json!(3));
    assert_eq!(store.product(product.id).await.unwrap().available_quantity, 2);
}

#[tokio::test]
async fn test_insufficient_stock_is_a_conflict() {
    let (app, store, customer, product) = setup().await;
    let payload = json!({ "customer_id": customer.id, "products": [{ "id": product.id, "quantity": 3 }] });

    let (first, _) = post_order(&app, payload.clone()).await;
    let (second, body) = post_order(&app, payload).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(
        body["error"],
        json!("Sorry, we don't have enough P1 in stock. Requested 3. Available 2.")
    );
    assert_eq!(store.orders().await.len(), 1);
}

#[tokio::test]
async fn test_unknown_customer_and_product_are_bad_requests() {
    let (app, _, customer, product) = setup().await;

    let (status, body) = post_order(
        &app,
        json!({ "customer_id": Uuid::new_v4(), "products": [{ "id": product.id, "quantity": 1 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Invalid customer id"));

    let (status, body) = post_order(
        &app,
        json!({ "customer_id": customer.id, "products": [{ "id": Uuid::new_v4(), "quantity": 1 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("You can't buy an invalid product"));
}

#[tokio::test]
async fn test_storage_failure_hides_details() {
    let (app, store, customer, product) = setup().await;
    store.fail_order_writes(true);

    let (status, body) = post_order(
        &app,
        json!({ "customer_id": customer.id, "products": [{ "id": product.id, "quantity": 1 }] }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("Internal Server Error"));
    assert_eq!(store.product(product.id).await.unwrap().available_quantity, 5);
}

#[tokio::test]
async fn test_health() {
    let (app, _, _, _) = setup().await;
    let resp = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
