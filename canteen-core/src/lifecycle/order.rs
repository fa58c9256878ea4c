//! Order lifecycle: creation orchestration and status transitions.

use crate::broker::EventPublisher;
use crate::entities::{Order, OrderLineItem, OrderStatus};
use crate::events::{Event, routing};
use crate::lifecycle::Catalog;
use crate::store::{OrderStore, StoreError};
use canteen_sdk::client::ClientError;
use canteen_sdk::objects::OrderItemRequest;
use std::sync::Arc;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

/// Errors that can occur in the order lifecycle.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The request was rejected before any side effect.
    #[error("invalid order request: {0}")]
    Validation(String),

    /// No order with that id.
    #[error("order {0} not found")]
    OrderNotFound(Uuid),

    /// A requested catalog item does not exist; nothing was persisted.
    #[error("menu item {0} not found")]
    MenuItemNotFound(String),

    /// The catalog could not answer (transport or non-404 failure).
    #[error("catalog lookup failed: {0}")]
    Catalog(#[from] ClientError),

    /// Storage backend failure.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Order creation and status-transition orchestration.
pub struct OrderLifecycle {
    store: Arc<dyn OrderStore>,
    catalog: Arc<dyn Catalog>,
    publisher: Arc<dyn EventPublisher>,
}

impl OrderLifecycle {
    pub fn new(
        store: Arc<dyn OrderStore>,
        catalog: Arc<dyn Catalog>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            store,
            catalog,
            publisher,
        }
    }

    /// Create a new order.
    ///
    /// Resolves every requested item against the catalog (any miss aborts
    /// the whole operation with nothing persisted), computes the exact
    /// decimal total, persists order and items as one unit, then emits
    /// `order.created` and `payment.initiated` best-effort: a broker outage
    /// never fails the creation.
    ///
    /// Queue placement is deliberately not performed here; it belongs to
    /// the confirmed transition and is an unimplemented extension point.
    pub async fn create(
        &self,
        user_id: i64,
        item_requests: Vec<OrderItemRequest>,
        special_instructions: Option<String>,
    ) -> Result<Order, OrderError> {
        if item_requests.is_empty() {
            return Err(OrderError::Validation(
                "order must contain at least one item".to_string(),
            ));
        }

        let mut items = Vec::with_capacity(item_requests.len());
        for request in &item_requests {
            if request.quantity == 0 {
                return Err(OrderError::Validation(format!(
                    "quantity for menu item {} must be at least 1",
                    request.menu_item_id
                )));
            }
            let Some(menu_item) = self.catalog.item(&request.menu_item_id).await? else {
                return Err(OrderError::MenuItemNotFound(request.menu_item_id.clone()));
            };
            items.push(OrderLineItem {
                menu_item_id: request.menu_item_id.clone(),
                item_name: menu_item.name,
                quantity: request.quantity,
                price: menu_item.price,
                special_instructions: request.special_instructions.clone(),
            });
        }

        let order = Order::new(user_id, items, special_instructions);
        self.store.insert(order.clone()).await?;

        info!(
            order_id = %order.id,
            user_id,
            total_amount = %order.total_amount,
            items = order.items.len(),
            "order created"
        );

        self.publish_best_effort(routing::ORDER_CREATED, &Event::order_created(&order))
            .await;
        self.publish_best_effort(routing::PAYMENT_INITIATED, &Event::payment_initiated(&order))
            .await;

        Ok(order)
    }

    /// Load an order by id.
    pub async fn get(&self, order_id: Uuid) -> Result<Order, OrderError> {
        self.store
            .get(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))
    }

    /// Apply a status transition.
    ///
    /// Transitions are unchecked: any status may follow any other, and the
    /// write is last-write-wins. The status-change event is emitted
    /// best-effort on the per-status routing key.
    pub async fn update_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<Order, OrderError> {
        let current = self
            .store
            .get(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        let old_status = current.status;

        let order = self
            .store
            .update_status(order_id, new_status, OffsetDateTime::now_utc())
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;

        info!(
            order_id = %order.id,
            old_status = %old_status,
            new_status = %order.status,
            "order status updated"
        );

        let key = routing::order_status_routing_key(new_status);
        self.publish_best_effort(key, &Event::order_status_changed(&order, old_status))
            .await;

        Ok(order)
    }

    async fn publish_best_effort(&self, routing_key: &str, event: &Event) {
        if let Err(e) = self.publisher.publish(routing_key, event).await {
            warn!(
                routing_key,
                error = %e,
                "event publish failed, continuing without it"
            );
        }
    }
}
