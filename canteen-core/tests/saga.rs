//! End-to-end saga: order placement, event-driven payment initiation, and
//! a forced success outcome reconciled back into order state over the HTTP
//! fallback path (the broker is "down" on the payment side throughout).

mod common;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::put;
use canteen_core::broker::EventHandler;
use canteen_core::entities::{Order, OrderStatus, PaymentStatus};
use canteen_core::events::Event;
use canteen_core::lifecycle::{
    OrderError, OrderLifecycle, PaymentEventHandler, PaymentLifecycle, settlement_channel,
};
use canteen_core::store::{MemoryOrderStore, MemoryPaymentStore, OrderStore};
use canteen_sdk::client::OrderServiceClient;
use canteen_sdk::objects::{OrderItemRequest, UpdateOrderStatusRequest};
use common::{FixedCatalog, RecordingPublisher};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

async fn put_status(
    State(lifecycle): State<Arc<OrderLifecycle>>,
    Path(order_id): Path<Uuid>,
    Json(body): Json<UpdateOrderStatusRequest>,
) -> Result<Json<Order>, StatusCode> {
    lifecycle
        .update_status(order_id, body.status)
        .await
        .map(Json)
        .map_err(|e| match e {
            OrderError::OrderNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        })
}

/// Serve the real order status endpoint over the given lifecycle.
async fn spawn_order_service(lifecycle: Arc<OrderLifecycle>) -> Url {
    let app = axum::Router::new()
        .route("/api/orders/{order_id}/status", put(put_status))
        .with_state(lifecycle);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Url::parse(&format!("http://{addr}/")).unwrap()
}

#[tokio::test]
async fn payment_success_confirms_the_order_via_the_fallback_path() {
    // Order side: working broker (recorded), real status endpoint.
    let order_store = Arc::new(MemoryOrderStore::new());
    let order_publisher = Arc::new(RecordingPublisher::new());
    let catalog = Arc::new(FixedCatalog::new(&[
        ("latte", "Latte", dec!(10.00)),
        ("bun", "Cinnamon Bun", dec!(2.50)),
    ]));
    let order_lifecycle = Arc::new(OrderLifecycle::new(
        order_store.clone(),
        catalog,
        order_publisher.clone(),
    ));
    let order_service_url = spawn_order_service(order_lifecycle.clone()).await;

    // Payment side: broker down for the whole test, HTTP fallback only.
    let payment_store = Arc::new(MemoryPaymentStore::new());
    let (settlement_tx, _settlement_rx) = settlement_channel();
    let payment_lifecycle = Arc::new(
        PaymentLifecycle::new(
            payment_store,
            Arc::new(RecordingPublisher::failing()),
            OrderServiceClient::new(order_service_url),
            settlement_tx,
        )
        .with_settlement_delay(Duration::ZERO),
    );
    let handler = PaymentEventHandler::new(payment_lifecycle.clone());

    // 1. Place the order: 1 x 10.00 + 3 x 2.50 = 17.50.
    let order = order_lifecycle
        .create(
            7,
            vec![
                OrderItemRequest {
                    menu_item_id: "latte".to_string(),
                    quantity: 1,
                    special_instructions: None,
                },
                OrderItemRequest {
                    menu_item_id: "bun".to_string(),
                    quantity: 3,
                    special_instructions: None,
                },
            ],
            None,
        )
        .await
        .unwrap();
    assert_eq!(order.total_amount, dec!(17.50));

    // 2. Deliver the emitted payment.initiated event to the payment side.
    let published = order_publisher.published();
    let initiated = published
        .iter()
        .find(|(key, _)| key == "payment.initiated")
        .map(|(_, event)| event.clone())
        .expect("create must emit payment.initiated");
    handler.handle(initiated).await.unwrap();

    let payment = payment_lifecycle
        .latest_for_order(order.id)
        .await
        .unwrap()
        .expect("consuming payment.initiated must create a payment");
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.amount, dec!(17.50));

    // 3. Force a success outcome; the broker is down, so the notification
    // must arrive over HTTP and confirm the order.
    payment_lifecycle
        .update_status(&payment.payment_id, PaymentStatus::Success)
        .await
        .unwrap();

    let confirmed = order_store.get(order.id).await.unwrap().unwrap();
    assert_eq!(confirmed.status, OrderStatus::Confirmed);

    // The confirmation itself went out on the order side's own key.
    let published = order_publisher.published();
    let (key, event) = published.last().unwrap();
    assert_eq!(key, "order.confirmed");
    match event {
        Event::OrderStatusChanged {
            old_status,
            new_status,
            ..
        } => {
            assert_eq!(*old_status, OrderStatus::Placed);
            assert_eq!(*new_status, OrderStatus::Confirmed);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}
