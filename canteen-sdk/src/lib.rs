//! Shared wire objects and HTTP clients for the canteen order and payment
//! services.
//!
//! The `objects` module holds the serde types that cross service boundaries
//! (statuses, request bodies, the catalog item shape). The `client` module
//! (behind the `client` feature) holds the typed reqwest clients used by the
//! services to talk to each other synchronously.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod objects;

#[cfg(feature = "client")]
pub mod client;
