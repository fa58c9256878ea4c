//! Routing keys on the shared topic exchange.

use canteen_sdk::objects::{OrderStatus, PaymentStatus};

/// The durable topic exchange shared by both services.
pub const DEFAULT_EXCHANGE: &str = "canteen.orders";

/// Queue the payment service binds to `payment.initiated`.
pub const PAYMENT_SERVICE_QUEUE: &str = "payment.service.queue";

pub const ORDER_CREATED: &str = "order.created";
pub const ORDER_CONFIRMED: &str = "order.confirmed";
pub const ORDER_PREPARING: &str = "order.preparing";
pub const ORDER_READY: &str = "order.ready";
pub const ORDER_COMPLETED: &str = "order.completed";
pub const ORDER_CANCELLED: &str = "order.cancelled";
pub const PAYMENT_INITIATED: &str = "payment.initiated";

/// Routing key for an order status-change event.
///
/// Statuses without a key of their own (only `placed` today) fall back to
/// the `order.created` key. That fallback is inherited behavior the
/// external consumers rely on, so it stays.
pub fn order_status_routing_key(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Confirmed => ORDER_CONFIRMED,
        OrderStatus::Preparing => ORDER_PREPARING,
        OrderStatus::Ready => ORDER_READY,
        OrderStatus::Completed => ORDER_COMPLETED,
        OrderStatus::Cancelled => ORDER_CANCELLED,
        OrderStatus::Placed => ORDER_CREATED,
    }
}

/// Routing key for a payment result event: `payment.<status>`.
pub fn payment_result_routing_key(status: PaymentStatus) -> String {
    format!("payment.{status}")
}
