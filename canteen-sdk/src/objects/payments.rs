use super::PaymentStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_payment_method() -> String {
    "mock".to_string()
}

/// `POST /api/payments` request body — the synchronous entry point for
/// payment initiation. The event-driven entry point carries the same fields
/// inside the `payment_initiated` event instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiatePaymentRequest {
    pub order_id: Uuid,
    pub user_id: i64,
    pub amount: Decimal,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
}

/// `PUT /api/payments/{payment_id}/status` request body. A status outside
/// the closed set fails deserialization, so it never reaches a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePaymentStatusRequest {
    pub status: PaymentStatus,
}
