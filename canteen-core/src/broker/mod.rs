//! Message broker integration.
//!
//! [`BrokerClient`] is the AMQP-backed implementation; the lifecycle
//! components only depend on the [`EventPublisher`] seam so tests (and any
//! future transport) can substitute their own. Delivery is best-effort
//! at-least-once: consumers must tolerate duplicates, and a handler error
//! drops the message (nack without requeue) rather than retrying it.

pub mod client;

pub use client::BrokerClient;

use crate::events::Event;
use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by the broker client.
///
/// Every variant is returned to the caller as an explicit result; whether a
/// failure is swallowed (fan-out publishes) or triggers a fallback (payment
/// result notification) is decided at the call site.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// The broker is unreachable or the connection/channel setup failed.
    #[error("broker connection failed: {0}")]
    Connection(#[source] lapin::Error),

    /// An established channel rejected the publish.
    #[error("publish failed: {0}")]
    Publish(#[source] lapin::Error),

    /// The event payload could not be serialized.
    #[error("event serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Outbound seam: publish one typed event under a routing key.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, routing_key: &str, event: &Event) -> Result<(), BrokerError>;
}

/// Inbound seam: handle one decoded delivery.
///
/// Returning `Ok` acknowledges the message; returning `Err` drops it
/// (negative acknowledgment without requeue).
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: Event) -> anyhow::Result<()>;
}
