//! Event payload definitions.
//!
//! One closed enum covers every event the saga carries, so consumers match
//! exhaustively instead of dispatching on raw `event_type` strings. The
//! serde tag reproduces the wire discriminators (`order_created`,
//! `order_status_changed`, `payment_initiated`, `payment_completed`).

use crate::entities::{Order, OrderLineItem, PaymentRecord};
use canteen_sdk::objects::{OrderStatus, PaymentStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum Event {
    /// A new order was persisted. Carries a full snapshot of the order.
    OrderCreated {
        order_id: Uuid,
        user_id: i64,
        total_amount: Decimal,
        items: Vec<OrderLineItem>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        special_instructions: Option<String>,
        #[serde(with = "time::serde::rfc3339")]
        timestamp: OffsetDateTime,
    },

    /// An order moved from one status to another. The snapshot fields are
    /// optional on the wire; this core always fills them.
    OrderStatusChanged {
        order_id: Uuid,
        old_status: OrderStatus,
        new_status: OrderStatus,
        #[serde(default)]
        user_id: Option<i64>,
        #[serde(default)]
        total_amount: Option<Decimal>,
        #[serde(default)]
        queue_number: Option<i32>,
        #[serde(default, with = "time::serde::rfc3339::option")]
        timestamp: Option<OffsetDateTime>,
    },

    /// The order service requests a payment for a freshly placed order.
    /// `payment_id` is absent on this leg; the payment service assigns one.
    PaymentInitiated {
        order_id: Uuid,
        user_id: i64,
        amount: Decimal,
        #[serde(default)]
        payment_id: Option<String>,
        #[serde(default, with = "time::serde::rfc3339::option")]
        timestamp: Option<OffsetDateTime>,
    },

    /// A payment reached a terminal status.
    PaymentCompleted {
        order_id: Uuid,
        payment_status: PaymentStatus,
        #[serde(default)]
        payment_id: Option<String>,
    },
}

impl Event {
    pub fn order_created(order: &Order) -> Self {
        Event::OrderCreated {
            order_id: order.id,
            user_id: order.user_id,
            total_amount: order.total_amount,
            items: order.items.clone(),
            special_instructions: order.special_instructions.clone(),
            timestamp: order.created_at,
        }
    }

    pub fn order_status_changed(order: &Order, old_status: OrderStatus) -> Self {
        Event::OrderStatusChanged {
            order_id: order.id,
            old_status,
            new_status: order.status,
            user_id: Some(order.user_id),
            total_amount: Some(order.total_amount),
            queue_number: order.queue_number,
            timestamp: Some(order.updated_at),
        }
    }

    pub fn payment_initiated(order: &Order) -> Self {
        Event::PaymentInitiated {
            order_id: order.id,
            user_id: order.user_id,
            amount: order.total_amount,
            payment_id: None,
            timestamp: Some(OffsetDateTime::now_utc()),
        }
    }

    pub fn payment_completed(payment: &PaymentRecord) -> Self {
        Event::PaymentCompleted {
            order_id: payment.order_id,
            payment_status: payment.status,
            payment_id: Some(payment.payment_id.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn order_created_carries_the_wire_tag() {
        let order = Order::new(
            42,
            vec![OrderLineItem {
                menu_item_id: "m1".into(),
                item_name: "Coffee".into(),
                quantity: 2,
                price: dec!(3.25),
                special_instructions: None,
            }],
            Some("no sugar".into()),
        );
        let json = serde_json::to_value(Event::order_created(&order)).unwrap();
        assert_eq!(json["event_type"], "order_created");
        assert_eq!(json["items"][0]["item_name"], "Coffee");
        assert_eq!(json["total_amount"], "6.50");
        assert_eq!(json["special_instructions"], "no sugar");
    }

    #[test]
    fn payment_initiated_decodes_without_optional_fields() {
        // The minimal shape another producer might publish.
        let raw = r#"{
            "event_type": "payment_initiated",
            "order_id": "5f8b1c6e-2d9a-4f0b-8a3c-1b2d3e4f5a6b",
            "user_id": 7,
            "amount": "17.50"
        }"#;
        let event: Event = serde_json::from_str(raw).unwrap();
        match event {
            Event::PaymentInitiated {
                user_id,
                amount,
                payment_id,
                timestamp,
                ..
            } => {
                assert_eq!(user_id, 7);
                assert_eq!(amount, dec!(17.50));
                assert_eq!(payment_id, None);
                assert_eq!(timestamp, None);
            }
            other => panic!("decoded wrong variant: {other:?}"),
        }
    }

    #[test]
    fn payment_completed_uses_lowercase_status() {
        let mut record = PaymentRecord::new(Uuid::new_v4(), 7, dec!(17.50), "mock");
        record.status = PaymentStatus::Success;
        let json = serde_json::to_value(Event::payment_completed(&record)).unwrap();
        assert_eq!(json["event_type"], "payment_completed");
        assert_eq!(json["payment_status"], "success");
    }
}
