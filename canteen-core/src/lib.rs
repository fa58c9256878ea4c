//! Core of the canteen ordering saga: entities, events, the broker
//! transport, persistence seams, and the order/payment lifecycles that tie
//! them together. The service binaries in `canteen-server` are thin
//! composition roots over this crate.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod broker;
pub mod entities;
pub mod events;
pub mod lifecycle;
pub mod store;
