//! Shared wiring for the canteen HTTP services.
//!
//! The two binaries (`order-service` and `payment-service`) assemble their
//! routers, configuration, and shutdown handling from here.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod shutdown;
