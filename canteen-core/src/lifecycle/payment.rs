//! Payment lifecycle: initiation, mock settlement, result notification.

use crate::broker::{EventHandler, EventPublisher};
use crate::entities::{OrderStatus, PaymentRecord, PaymentStatus};
use crate::events::{Event, routing};
use crate::lifecycle::settlement::{SettlementJob, SettlementSender};
use crate::store::{PaymentStore, StoreError};
use canteen_sdk::client::OrderServiceClient;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Probability that a mock settlement succeeds. Not configurable.
const MOCK_SUCCESS_RATE: f64 = 0.9;

/// Simulated processing latency before a settlement resolves.
const DEFAULT_SETTLEMENT_DELAY: Duration = Duration::from_secs(1);

/// Errors that can occur in the payment lifecycle.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// No payment with that identifier.
    #[error("payment {0} not found")]
    PaymentNotFound(String),

    /// Storage backend failure.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Payment initiation, settlement simulation and result notification.
///
/// The result notification is dual-path: the `payment.<status>` event is
/// preferred; when the broker cannot take it, exactly one synchronous HTTP
/// call to the order service's status endpoint is made instead. Never both,
/// and never more than one attempt per path.
pub struct PaymentLifecycle {
    store: Arc<dyn PaymentStore>,
    publisher: Arc<dyn EventPublisher>,
    orders: OrderServiceClient,
    settlement_tx: SettlementSender,
    settlement_delay: Duration,
}

impl PaymentLifecycle {
    pub fn new(
        store: Arc<dyn PaymentStore>,
        publisher: Arc<dyn EventPublisher>,
        orders: OrderServiceClient,
        settlement_tx: SettlementSender,
    ) -> Self {
        Self {
            store,
            publisher,
            orders,
            settlement_tx,
            settlement_delay: DEFAULT_SETTLEMENT_DELAY,
        }
    }

    /// Override the simulated settlement latency. The success rate is not
    /// configurable; only the delay is, so tests do not wait on it.
    pub fn with_settlement_delay(mut self, delay: Duration) -> Self {
        self.settlement_delay = delay;
        self
    }

    /// Create a pending payment record with a fresh opaque identifier.
    ///
    /// Settlement is not triggered here; callers dispatch it separately via
    /// [`dispatch_settlement`](Self::dispatch_settlement).
    pub async fn initiate(
        &self,
        order_id: Uuid,
        user_id: i64,
        amount: rust_decimal::Decimal,
        payment_method: &str,
    ) -> Result<PaymentRecord, PaymentError> {
        let payment = PaymentRecord::new(order_id, user_id, amount, payment_method);
        self.store.insert(payment.clone()).await?;

        info!(
            payment_id = %payment.payment_id,
            order_id = %order_id,
            amount = %amount,
            "payment initiated"
        );
        Ok(payment)
    }

    /// Queue a settlement for background processing and return immediately.
    ///
    /// Never waits on the backlog: a full channel drops the job with an
    /// error log, leaving the payment pending for external reconciliation.
    pub async fn dispatch_settlement(&self, payment_id: &str) {
        let job = SettlementJob {
            payment_id: payment_id.to_string(),
        };
        match self.settlement_tx.try_send(job) {
            Ok(()) => {}
            Err(TrySendError::Full(job)) => {
                error!(
                    payment_id = %job.payment_id,
                    "settlement backlog full, payment left pending"
                );
            }
            Err(TrySendError::Closed(job)) => {
                error!(
                    payment_id = %job.payment_id,
                    "settlement worker is gone, payment left pending"
                );
            }
        }
    }

    /// Simulate settlement: wait out the processing delay, then draw a 90/10
    /// success/failure outcome and apply it.
    ///
    /// If applying the drawn outcome fails, the payment is marked `failed`
    /// best-effort so it does not stay pending forever.
    pub async fn process_mock_settlement(
        &self,
        payment_id: &str,
    ) -> Result<PaymentRecord, PaymentError> {
        tokio::time::sleep(self.settlement_delay).await;

        let success = rand::rng().random::<f64>() < MOCK_SUCCESS_RATE;
        let status = if success {
            PaymentStatus::Success
        } else {
            PaymentStatus::Failed
        };
        match self.update_status(payment_id, status).await {
            Ok(payment) => Ok(payment),
            Err(e) => {
                warn!(
                    payment_id,
                    error = %e,
                    "settlement outcome could not be applied, marking payment failed"
                );
                self.update_status(payment_id, PaymentStatus::Failed).await
            }
        }
    }

    /// Load a payment by its opaque identifier.
    pub async fn get(&self, payment_id: &str) -> Result<PaymentRecord, PaymentError> {
        self.store
            .get(payment_id)
            .await?
            .ok_or_else(|| PaymentError::PaymentNotFound(payment_id.to_string()))
    }

    /// Most recently created payment for an order, if any.
    pub async fn latest_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Option<PaymentRecord>, PaymentError> {
        Ok(self.store.latest_for_order(order_id).await?)
    }

    /// Persist a new payment status.
    ///
    /// No transition graph is enforced. A transition to `success` notifies
    /// the order side that the order is confirmed, preferring the event
    /// path and falling back to HTTP when the broker is unavailable.
    pub async fn update_status(
        &self,
        payment_id: &str,
        new_status: PaymentStatus,
    ) -> Result<PaymentRecord, PaymentError> {
        let payment = self
            .store
            .update_status(payment_id, new_status, OffsetDateTime::now_utc())
            .await?
            .ok_or_else(|| PaymentError::PaymentNotFound(payment_id.to_string()))?;

        info!(
            payment_id = %payment.payment_id,
            status = %payment.status,
            "payment status updated"
        );

        if payment.status == PaymentStatus::Success {
            self.notify_order_service(&payment).await;
        }

        Ok(payment)
    }

    /// One notification attempt, exactly one path.
    ///
    /// A total failure of both paths leaves the order unconfirmed until
    /// externally reconciled; there is no retry queue in this core.
    async fn notify_order_service(&self, payment: &PaymentRecord) {
        let routing_key = routing::payment_result_routing_key(payment.status);
        let event = Event::payment_completed(payment);

        match self.publisher.publish(&routing_key, &event).await {
            Ok(()) => {
                info!(
                    order_id = %payment.order_id,
                    routing_key,
                    "payment result published"
                );
            }
            Err(e) => {
                warn!(
                    order_id = %payment.order_id,
                    error = %e,
                    "broker unavailable for payment result, falling back to HTTP"
                );
                match self
                    .orders
                    .update_status(payment.order_id, OrderStatus::Confirmed)
                    .await
                {
                    Ok(()) => {
                        info!(
                            order_id = %payment.order_id,
                            "order confirmed via HTTP fallback"
                        );
                    }
                    Err(e) => {
                        error!(
                            order_id = %payment.order_id,
                            error = %e,
                            "HTTP fallback failed, order left unreconciled"
                        );
                    }
                }
            }
        }
    }
}

/// Broker-side entry point of the payment service.
///
/// Matches the closed event set exhaustively; only `payment_initiated`
/// does work here. Duplicated deliveries create a second pending record,
/// which the most-recent-first order lookup tolerates.
pub struct PaymentEventHandler {
    lifecycle: Arc<PaymentLifecycle>,
}

impl PaymentEventHandler {
    pub fn new(lifecycle: Arc<PaymentLifecycle>) -> Self {
        Self { lifecycle }
    }
}

#[async_trait::async_trait]
impl EventHandler for PaymentEventHandler {
    async fn handle(&self, event: Event) -> anyhow::Result<()> {
        match event {
            Event::PaymentInitiated {
                order_id,
                user_id,
                amount,
                ..
            } => {
                let payment = self
                    .lifecycle
                    .initiate(order_id, user_id, amount, "mock")
                    .await?;
                self.lifecycle
                    .dispatch_settlement(&payment.payment_id)
                    .await;
                Ok(())
            }
            Event::OrderCreated { order_id, .. } => {
                debug!(%order_id, "ignoring order_created event");
                Ok(())
            }
            Event::OrderStatusChanged { order_id, .. } => {
                debug!(%order_id, "ignoring order_status_changed event");
                Ok(())
            }
            Event::PaymentCompleted { order_id, .. } => {
                debug!(%order_id, "ignoring payment_completed event");
                Ok(())
            }
        }
    }
}
