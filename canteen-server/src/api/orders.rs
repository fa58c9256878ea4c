//! Order service API handlers.
//!
//! # Endpoints
//!
//! - `POST /api/orders`                    – place a new order
//! - `GET  /api/orders/{order_id}`         – fetch an order
//! - `PUT  /api/orders/{order_id}/status`  – update order status
//! - `GET  /health`                        – liveness probe

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use canteen_core::entities::Order;
use canteen_core::lifecycle::{OrderError, OrderLifecycle};
use canteen_sdk::objects::{CreateOrderRequest, UpdateOrderStatusRequest};
use std::sync::Arc;
use uuid::Uuid;

/// Shared state for the order service router.
#[derive(Clone)]
pub struct OrderAppState {
    pub lifecycle: Arc<OrderLifecycle>,
}

/// Build the order service router.
pub fn router(state: OrderAppState) -> Router {
    Router::new()
        .route("/api/orders", post(create_order))
        .route("/api/orders/{order_id}", get(get_order))
        .route("/api/orders/{order_id}/status", put(update_order_status))
        .route("/health", get(super::health_check))
        .with_state(state)
}

/// `POST /api/orders` — place a new order.
///
/// Item names and prices are resolved against the menu service; any
/// unknown item rejects the whole order.
async fn create_order(
    State(state): State<OrderAppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, OrderApiError> {
    let order = state
        .lifecycle
        .create(body.user_id, body.items, body.special_instructions)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /api/orders/{order_id}` — fetch a single order.
async fn get_order(
    State(state): State<OrderAppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Order>, OrderApiError> {
    let order = state.lifecycle.get(order_id).await?;
    Ok(Json(order))
}

/// `PUT /api/orders/{order_id}/status` — update the order status.
///
/// Accepts any known status; there is no transition graph. This is also
/// the endpoint the payment service calls when the broker is down.
async fn update_order_status(
    State(state): State<OrderAppState>,
    Path(order_id): Path<Uuid>,
    Json(body): Json<UpdateOrderStatusRequest>,
) -> Result<Json<Order>, OrderApiError> {
    let order = state.lifecycle.update_status(order_id, body.status).await?;
    Ok(Json(order))
}

/// Wrapper mapping lifecycle errors onto HTTP status codes.
#[derive(Debug)]
struct OrderApiError(OrderError);

impl From<OrderError> for OrderApiError {
    fn from(e: OrderError) -> Self {
        Self(e)
    }
}

impl IntoResponse for OrderApiError {
    fn into_response(self) -> axum::response::Response {
        match self.0 {
            OrderError::Validation(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            OrderError::MenuItemNotFound(id) => (
                StatusCode::BAD_REQUEST,
                format!("unknown menu item: {id}"),
            )
                .into_response(),
            OrderError::OrderNotFound(_) => {
                (StatusCode::NOT_FOUND, "order not found").into_response()
            }
            OrderError::Catalog(e) => {
                tracing::error!(error = %e, "menu service lookup failed");
                (StatusCode::BAD_GATEWAY, "menu service unavailable").into_response()
            }
            OrderError::Store(e) => {
                tracing::error!(error = %e, "order storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
