//! Shared fixtures for the lifecycle integration tests.

// Each test binary uses its own subset of these fixtures.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::put;
use canteen_core::broker::{BrokerError, EventPublisher};
use canteen_core::events::Event;
use canteen_core::lifecycle::Catalog;
use canteen_sdk::client::ClientError;
use canteen_sdk::objects::{MenuItem, OrderStatus, UpdateOrderStatusRequest};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;
use uuid::Uuid;

/// Catalog with a fixed set of items.
pub struct FixedCatalog {
    items: HashMap<String, MenuItem>,
}

impl FixedCatalog {
    pub fn new(items: &[(&str, &str, Decimal)]) -> Self {
        let items = items
            .iter()
            .map(|(id, name, price)| {
                (
                    id.to_string(),
                    MenuItem {
                        id: id.to_string(),
                        name: name.to_string(),
                        price: *price,
                    },
                )
            })
            .collect();
        Self { items }
    }
}

#[async_trait]
impl Catalog for FixedCatalog {
    async fn item(&self, menu_item_id: &str) -> Result<Option<MenuItem>, ClientError> {
        Ok(self.items.get(menu_item_id).cloned())
    }
}

/// Publisher that records every publish and can be switched to fail,
/// simulating a broker outage.
#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<(String, Event)>>,
    fail: AtomicBool,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let publisher = Self::default();
        publisher.fail.store(true, Ordering::SeqCst);
        publisher
    }

    pub fn published(&self) -> Vec<(String, Event)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, routing_key: &str, event: &Event) -> Result<(), BrokerError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(BrokerError::Connection(
                lapin::Error::InvalidConnectionState(lapin::ConnectionState::Closed),
            ));
        }
        self.published
            .lock()
            .unwrap()
            .push((routing_key.to_string(), event.clone()));
        Ok(())
    }
}

/// A stub order service that records status updates it receives.
pub struct StatusStub {
    pub base_url: Url,
    hits: Arc<Mutex<Vec<(Uuid, OrderStatus)>>>,
}

impl StatusStub {
    pub fn hits(&self) -> Vec<(Uuid, OrderStatus)> {
        self.hits.lock().unwrap().clone()
    }
}

async fn record_status(
    State(hits): State<Arc<Mutex<Vec<(Uuid, OrderStatus)>>>>,
    Path(order_id): Path<Uuid>,
    Json(body): Json<UpdateOrderStatusRequest>,
) -> StatusCode {
    hits.lock().unwrap().push((order_id, body.status));
    StatusCode::OK
}

/// Spawn a local order-service stub exposing only the status endpoint.
pub async fn spawn_status_stub() -> StatusStub {
    let hits: Arc<Mutex<Vec<(Uuid, OrderStatus)>>> = Arc::default();
    let app = axum::Router::new()
        .route("/api/orders/{order_id}/status", put(record_status))
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StatusStub {
        base_url: Url::parse(&format!("http://{addr}/")).unwrap(),
        hits,
    }
}

/// Base URL for tests that must not perform any HTTP call; connecting to
/// the discard port fails fast.
pub fn unreachable_order_service() -> Url {
    Url::parse("http://127.0.0.1:9/").unwrap()
}
