//! Payment service API handlers.
//!
//! The HTTP surface is the synchronous entry point; the same initiation
//! flow also runs event-driven when a `payment.initiated` event is
//! consumed from the broker.
//!
//! # Endpoints
//!
//! - `POST /api/payments`                       – initiate a payment
//! - `GET  /api/payments/{payment_id}`          – fetch a payment
//! - `PUT  /api/payments/{payment_id}/status`   – set a payment status
//! - `POST /api/payments/{payment_id}/process`  – settle a payment now
//! - `GET  /api/payments/order/{order_id}`      – latest payment for an order
//! - `GET  /health`                             – liveness probe

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use canteen_core::entities::PaymentRecord;
use canteen_core::lifecycle::{PaymentError, PaymentLifecycle};
use canteen_sdk::objects::{InitiatePaymentRequest, UpdatePaymentStatusRequest};
use std::sync::Arc;
use uuid::Uuid;

/// Shared state for the payment service router.
#[derive(Clone)]
pub struct PaymentAppState {
    pub lifecycle: Arc<PaymentLifecycle>,
}

/// Build the payment service router.
pub fn router(state: PaymentAppState) -> Router {
    Router::new()
        .route("/api/payments", post(initiate_payment))
        .route("/api/payments/{payment_id}", get(get_payment))
        .route("/api/payments/{payment_id}/status", put(update_payment_status))
        .route("/api/payments/{payment_id}/process", post(process_payment))
        .route("/api/payments/order/{order_id}", get(get_order_payment))
        .route("/health", get(super::health_check))
        .with_state(state)
}

/// `POST /api/payments` — initiate a payment for an order.
///
/// Returns the pending record immediately; settlement resolves it in the
/// background.
async fn initiate_payment(
    State(state): State<PaymentAppState>,
    Json(body): Json<InitiatePaymentRequest>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let payment = state
        .lifecycle
        .initiate(body.order_id, body.user_id, body.amount, &body.payment_method)
        .await?;
    state.lifecycle.dispatch_settlement(&payment.payment_id).await;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// `GET /api/payments/{payment_id}` — fetch a payment by its opaque id.
async fn get_payment(
    State(state): State<PaymentAppState>,
    Path(payment_id): Path<String>,
) -> Result<Json<PaymentRecord>, PaymentApiError> {
    let payment = state.lifecycle.get(&payment_id).await?;
    Ok(Json(payment))
}

/// `PUT /api/payments/{payment_id}/status` — set a payment's status directly.
///
/// A successful transition runs the same downstream notification as a
/// settled payment would.
async fn update_payment_status(
    State(state): State<PaymentAppState>,
    Path(payment_id): Path<String>,
    Json(body): Json<UpdatePaymentStatusRequest>,
) -> Result<Json<PaymentRecord>, PaymentApiError> {
    let payment = state.lifecycle.update_status(&payment_id, body.status).await?;
    Ok(Json(payment))
}

/// `POST /api/payments/{payment_id}/process` — settle a payment immediately
/// instead of waiting for the background worker.
async fn process_payment(
    State(state): State<PaymentAppState>,
    Path(payment_id): Path<String>,
) -> Result<Json<PaymentRecord>, PaymentApiError> {
    let payment = state.lifecycle.process_mock_settlement(&payment_id).await?;
    Ok(Json(payment))
}

/// `GET /api/payments/order/{order_id}` — most recent payment for an order.
async fn get_order_payment(
    State(state): State<PaymentAppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<PaymentRecord>, PaymentApiError> {
    let payment = state
        .lifecycle
        .latest_for_order(order_id)
        .await?
        .ok_or(PaymentApiError::NoPaymentForOrder)?;
    Ok(Json(payment))
}

/// Errors that can occur in payment API handlers.
#[derive(Debug)]
enum PaymentApiError {
    Lifecycle(PaymentError),
    NoPaymentForOrder,
}

impl From<PaymentError> for PaymentApiError {
    fn from(e: PaymentError) -> Self {
        Self::Lifecycle(e)
    }
}

impl IntoResponse for PaymentApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            PaymentApiError::Lifecycle(PaymentError::PaymentNotFound(_)) => {
                (StatusCode::NOT_FOUND, "payment not found").into_response()
            }
            PaymentApiError::Lifecycle(PaymentError::Store(e)) => {
                tracing::error!(error = %e, "payment storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            PaymentApiError::NoPaymentForOrder => {
                (StatusCode::NOT_FOUND, "no payment for this order").into_response()
            }
        }
    }
}
