pub mod order;
pub mod payment;

pub use order::{Order, OrderLineItem};
pub use payment::PaymentRecord;

// Statuses live in canteen-sdk because they cross the wire in both events
// and HTTP bodies; the entities reuse them directly.
pub use canteen_sdk::objects::{OrderStatus, PaymentStatus};
