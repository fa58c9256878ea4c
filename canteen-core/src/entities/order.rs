use canteen_sdk::objects::OrderStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// An order together with its line items.
///
/// The order and its items are persisted and returned as one unit; a line
/// item never exists without its order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: i64,
    /// Exact sum of `price * quantity` over `items`, captured at creation
    /// time. Immutable afterwards, even if catalog prices change.
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub queue_number: Option<i32>,
    pub special_instructions: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub items: Vec<OrderLineItem>,
}

/// One line of an order, with name and price snapshotted from the catalog
/// at order time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub menu_item_id: String,
    pub item_name: String,
    pub quantity: u32,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
}

impl OrderLineItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

impl Order {
    /// Build a new `placed` order. The total is computed here and nowhere
    /// else, so it always reconciles with the items.
    pub fn new(
        user_id: i64,
        items: Vec<OrderLineItem>,
        special_instructions: Option<String>,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        let total_amount = items.iter().map(OrderLineItem::line_total).sum();
        Self {
            id: Uuid::new_v4(),
            user_id,
            total_amount,
            status: OrderStatus::Placed,
            queue_number: None,
            special_instructions,
            created_at: now,
            updated_at: now,
            items,
        }
    }
}
