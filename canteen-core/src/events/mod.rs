//! Event types and routing for the order/payment saga.
//!
//! Events are transient: they are serialized onto the broker's topic
//! exchange and never persisted. Every payload is a flat, JSON-compatible
//! structure discriminated by an `event_type` tag.
//!
//! # Event flow
//!
//! 1. `OrderLifecycle::create` emits `order.created` and `payment.initiated`
//! 2. the payment service consumes `payment.initiated`, settles, and emits
//!    `payment.<status>` (or falls back to HTTP)
//! 3. `OrderLifecycle::update_status` emits `order.status_changed` on a
//!    per-status routing key

pub mod routing;
pub mod types;

pub use types::Event;
