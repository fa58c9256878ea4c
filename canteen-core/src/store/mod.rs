//! Keyed persistence interfaces.
//!
//! The saga treats storage as a narrow keyed store: create, read by key,
//! and a single status-update write. There is no row locking and no
//! concurrency token; concurrent status updates to the same row are a
//! last-write-wins race, which the owning services accept.

pub mod memory;

#[cfg(feature = "storage-postgres")]
pub mod postgres;

pub use memory::{MemoryOrderStore, MemoryPaymentStore};
#[cfg(feature = "storage-postgres")]
pub use postgres::{PgOrderStore, PgPaymentStore};

use crate::entities::{Order, OrderStatus, PaymentRecord, PaymentStatus};
use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Storage backend failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

#[cfg(feature = "storage-postgres")]
impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// Orders keyed by id. `insert` persists the order and its line items as
/// one atomic unit.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: Order) -> Result<(), StoreError>;

    async fn get(&self, order_id: Uuid) -> Result<Option<Order>, StoreError>;

    /// Set the status and `updated_at`, returning the updated order, or
    /// `None` if no such order exists.
    async fn update_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
        updated_at: OffsetDateTime,
    ) -> Result<Option<Order>, StoreError>;
}

/// Payment records keyed by opaque payment id, with a secondary
/// most-recent-first lookup by order id.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert(&self, payment: PaymentRecord) -> Result<(), StoreError>;

    async fn get(&self, payment_id: &str) -> Result<Option<PaymentRecord>, StoreError>;

    /// Most recently created record for the order, if any. Uniqueness of
    /// "one payment per order" is convention, not enforced.
    async fn latest_for_order(&self, order_id: Uuid)
    -> Result<Option<PaymentRecord>, StoreError>;

    /// Set the status and `updated_at`, returning the updated record, or
    /// `None` if no such payment exists.
    async fn update_status(
        &self,
        payment_id: &str,
        status: PaymentStatus,
        updated_at: OffsetDateTime,
    ) -> Result<Option<PaymentRecord>, StoreError>;
}
