//! Lifecycle components of the order/payment saga.
//!
//! - `OrderLifecycle`: order creation and status transitions; emits events
//! - `PaymentLifecycle`: payment initiation, mock settlement, result
//!   notification (event first, HTTP fallback); consumes events
//! - `SettlementWorker`: bounded background worker that resolves pending
//!   settlements off the request and consumer paths
//!
//! Both lifecycles are constructed by the service's composition root and
//! receive their collaborators (store, publisher, catalog, HTTP client)
//! explicitly; nothing is fetched from shared mutable state.

pub mod catalog;
pub mod order;
pub mod payment;
pub mod settlement;

pub use catalog::{Catalog, HttpCatalog};
pub use order::{OrderError, OrderLifecycle};
pub use payment::{PaymentError, PaymentEventHandler, PaymentLifecycle};
pub use settlement::{
    SETTLEMENT_CHANNEL_BUFFER, SettlementJob, SettlementReceiver, SettlementSender,
    SettlementWorker, settlement_channel,
};
