//! In-memory store implementations.
//!
//! The default backing for the service binaries and the test suites. A
//! `RwLock<HashMap>` per entity is enough because every operation is a
//! single read or a single write, matching the keyed-store contract.

use super::{OrderStore, PaymentStore, StoreError};
use crate::entities::{Order, OrderStatus, PaymentRecord, PaymentStatus};
use async_trait::async_trait;
use std::collections::HashMap;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted orders (test helper).
    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<(), StoreError> {
        self.orders.write().await.insert(order.id, order);
        Ok(())
    }

    async fn get(&self, order_id: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().await.get(&order_id).cloned())
    }

    async fn update_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
        updated_at: OffsetDateTime,
    ) -> Result<Option<Order>, StoreError> {
        let mut orders = self.orders.write().await;
        Ok(orders.get_mut(&order_id).map(|order| {
            order.status = status;
            order.updated_at = updated_at;
            order.clone()
        }))
    }
}

#[derive(Default)]
pub struct MemoryPaymentStore {
    payments: RwLock<HashMap<String, PaymentRecord>>,
}

impl MemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.payments.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.payments.read().await.is_empty()
    }
}

#[async_trait]
impl PaymentStore for MemoryPaymentStore {
    async fn insert(&self, payment: PaymentRecord) -> Result<(), StoreError> {
        self.payments
            .write()
            .await
            .insert(payment.payment_id.clone(), payment);
        Ok(())
    }

    async fn get(&self, payment_id: &str) -> Result<Option<PaymentRecord>, StoreError> {
        Ok(self.payments.read().await.get(payment_id).cloned())
    }

    async fn latest_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Option<PaymentRecord>, StoreError> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .filter(|p| p.order_id == order_id)
            .max_by_key(|p| p.created_at)
            .cloned())
    }

    async fn update_status(
        &self,
        payment_id: &str,
        status: PaymentStatus,
        updated_at: OffsetDateTime,
    ) -> Result<Option<PaymentRecord>, StoreError> {
        let mut payments = self.payments.write().await;
        Ok(payments.get_mut(payment_id).map(|payment| {
            payment.status = status;
            payment.updated_at = updated_at;
            payment.clone()
        }))
    }
}
