use canteen_sdk::objects::PaymentStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A payment attempt for an order.
///
/// `payment_id` is the opaque globally-unique identifier; it never changes
/// once assigned. Several records may exist for the same order (retries,
/// duplicated `payment.initiated` deliveries); lookup-by-order returns the
/// most recently created one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub payment_id: String,
    pub order_id: Uuid,
    pub user_id: i64,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub payment_method: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl PaymentRecord {
    /// Build a new `pending` record with a fresh payment identifier.
    pub fn new(order_id: Uuid, user_id: i64, amount: Decimal, payment_method: &str) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            payment_id: generate_payment_id(),
            order_id,
            user_id,
            amount,
            status: PaymentStatus::Pending,
            payment_method: payment_method.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Generate an opaque payment identifier: `pay_` plus the first 12 hex
/// characters of a v4 UUID.
pub fn generate_payment_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("pay_{}", &hex[..12])
}
