//! HTTP surface tests for both service routers, run against real sockets
//! with in-memory stores and stubbed broker/catalog seams.

use async_trait::async_trait;
use axum::Router;
use canteen_core::broker::{BrokerError, EventPublisher};
use canteen_core::events::Event;
use canteen_core::lifecycle::{Catalog, OrderLifecycle, PaymentLifecycle, settlement_channel};
use canteen_core::store::{MemoryOrderStore, MemoryPaymentStore};
use canteen_sdk::client::{ClientError, OrderServiceClient};
use canteen_sdk::objects::MenuItem;
use canteen_server::api::orders::{self, OrderAppState};
use canteen_server::api::payments::{self, PaymentAppState};
use reqwest::StatusCode;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Publisher that accepts everything and records nothing.
struct NullPublisher;

#[async_trait]
impl EventPublisher for NullPublisher {
    async fn publish(&self, _routing_key: &str, _event: &Event) -> Result<(), BrokerError> {
        Ok(())
    }
}

/// Catalog with a fixed two-item menu.
struct StubCatalog;

#[async_trait]
impl Catalog for StubCatalog {
    async fn item(&self, menu_item_id: &str) -> Result<Option<MenuItem>, ClientError> {
        Ok(match menu_item_id {
            "latte" => Some(MenuItem {
                id: "latte".to_string(),
                name: "Latte".to_string(),
                price: dec!(10.00),
            }),
            "bun" => Some(MenuItem {
                id: "bun".to_string(),
                name: "Cinnamon Bun".to_string(),
                price: dec!(2.50),
            }),
            _ => None,
        })
    }
}

async fn serve(app: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Url::parse(&format!("http://{addr}/")).unwrap()
}

async fn spawn_order_service() -> Url {
    let lifecycle = Arc::new(OrderLifecycle::new(
        Arc::new(MemoryOrderStore::new()),
        Arc::new(StubCatalog),
        Arc::new(NullPublisher),
    ));
    serve(orders::router(OrderAppState { lifecycle })).await
}

async fn spawn_payment_service() -> Url {
    let (settlement_tx, _settlement_rx) = settlement_channel();
    let lifecycle = Arc::new(
        PaymentLifecycle::new(
            Arc::new(MemoryPaymentStore::new()),
            Arc::new(NullPublisher),
            OrderServiceClient::new(Url::parse("http://127.0.0.1:9/").unwrap()),
            settlement_tx,
        )
        .with_settlement_delay(Duration::ZERO),
    );
    serve(payments::router(PaymentAppState { lifecycle })).await
}

#[tokio::test]
async fn create_and_fetch_order() {
    let base = spawn_order_service().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(base.join("api/orders").unwrap())
        .json(&json!({
            "user_id": 7,
            "items": [
                {"menu_item_id": "latte", "quantity": 1},
                {"menu_item_id": "bun", "quantity": 3}
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["total_amount"], "17.50");
    assert_eq!(created["status"], "placed");
    assert_eq!(created["items"].as_array().unwrap().len(), 2);

    let order_id = created["id"].as_str().unwrap();
    let resp = client
        .get(base.join(&format!("api/orders/{order_id}")).unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = resp.json().await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn unknown_menu_item_is_a_bad_request() {
    let base = spawn_order_service().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(base.join("api/orders").unwrap())
        .json(&json!({
            "user_id": 7,
            "items": [{"menu_item_id": "ghost", "quantity": 1}]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_order_is_a_bad_request() {
    let base = spawn_order_service().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(base.join("api/orders").unwrap())
        .json(&json!({"user_id": 7, "items": []}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_update_round_trips() {
    let base = spawn_order_service().await;
    let client = reqwest::Client::new();

    let created: Value = client
        .post(base.join("api/orders").unwrap())
        .json(&json!({
            "user_id": 7,
            "items": [{"menu_item_id": "latte", "quantity": 1}]
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let order_id = created["id"].as_str().unwrap();

    let resp = client
        .put(base.join(&format!("api/orders/{order_id}/status")).unwrap())
        .json(&json!({"status": "ready"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["status"], "ready");
}

#[tokio::test]
async fn missing_order_is_not_found() {
    let base = spawn_order_service().await;
    let client = reqwest::Client::new();
    let id = uuid::Uuid::new_v4();

    let resp = client
        .get(base.join(&format!("api/orders/{id}")).unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .put(base.join(&format!("api/orders/{id}/status")).unwrap())
        .json(&json!({"status": "confirmed"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn initiate_and_look_up_payment() {
    let base = spawn_payment_service().await;
    let client = reqwest::Client::new();
    let order_id = uuid::Uuid::new_v4();

    let resp = client
        .post(base.join("api/payments").unwrap())
        .json(&json!({"order_id": order_id, "user_id": 7, "amount": "17.50"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let payment: Value = resp.json().await.unwrap();
    assert_eq!(payment["status"], "pending");
    assert_eq!(payment["amount"], "17.50");
    assert_eq!(payment["payment_method"], "mock");
    let payment_id = payment["payment_id"].as_str().unwrap();
    assert!(payment_id.starts_with("pay_"));

    let resp = client
        .get(base.join(&format!("api/payments/{payment_id}")).unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(base.join(&format!("api/payments/order/{order_id}")).unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let by_order: Value = resp.json().await.unwrap();
    assert_eq!(by_order["payment_id"].as_str().unwrap(), payment_id);
}

#[tokio::test]
async fn payment_status_update_round_trips() {
    let base = spawn_payment_service().await;
    let client = reqwest::Client::new();
    let order_id = uuid::Uuid::new_v4();

    let payment: Value = client
        .post(base.join("api/payments").unwrap())
        .json(&json!({"order_id": order_id, "user_id": 7, "amount": "10.00"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let payment_id = payment["payment_id"].as_str().unwrap();

    let resp = client
        .put(base.join(&format!("api/payments/{payment_id}/status")).unwrap())
        .json(&json!({"status": "failed"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["status"], "failed");

    let resp = client
        .put(base.join("api/payments/pay_000000000000/status").unwrap())
        .json(&json!({"status": "failed"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn processing_a_payment_settles_it() {
    let base = spawn_payment_service().await;
    let client = reqwest::Client::new();
    let order_id = uuid::Uuid::new_v4();

    let payment: Value = client
        .post(base.join("api/payments").unwrap())
        .json(&json!({"order_id": order_id, "user_id": 7, "amount": "10.00"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let payment_id = payment["payment_id"].as_str().unwrap();

    let resp = client
        .post(base.join(&format!("api/payments/{payment_id}/process")).unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let settled: Value = resp.json().await.unwrap();
    let status = settled["status"].as_str().unwrap();
    assert!(status == "success" || status == "failed", "still {status}");

    let resp = client
        .post(base.join("api/payments/pay_000000000000/process").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_payment_is_not_found() {
    let base = spawn_payment_service().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(base.join("api/payments/pay_000000000000").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let order_id = uuid::Uuid::new_v4();
    let resp = client
        .get(base.join(&format!("api/payments/order/{order_id}")).unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_endpoints_respond() {
    let orders_base = spawn_order_service().await;
    let payments_base = spawn_payment_service().await;
    let client = reqwest::Client::new();

    for base in [orders_base, payments_base] {
        let resp = client.get(base.join("health").unwrap()).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "healthy");
    }
}
