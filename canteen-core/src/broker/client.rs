//! AMQP broker client.
//!
//! One client per process, constructed by the composition root and shared
//! via `Arc`. All events travel through a single durable topic exchange;
//! durable queues are bound to it per routing-key pattern.

use super::{BrokerError, EventHandler, EventPublisher};
use crate::events::Event;
use async_trait::async_trait;
use futures_util::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicPublishOptions,
    ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};

/// Persistent delivery mode (survives broker restarts on durable queues).
const DELIVERY_MODE_PERSISTENT: u8 = 2;

struct ConnState {
    connection: Connection,
    channel: Channel,
}

/// Best-effort, durable, topic-routed event transport.
pub struct BrokerClient {
    url: String,
    exchange: String,
    state: Mutex<Option<ConnState>>,
}

impl BrokerClient {
    /// Create a client for `exchange` on the broker at `url`. No I/O happens
    /// until [`connect`](Self::connect) or the first publish.
    pub fn new(url: impl Into<String>, exchange: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            exchange: exchange.into(),
            state: Mutex::new(None),
        }
    }

    /// Establish the connection and declare the shared durable topic
    /// exchange. Idempotent: an already-connected client is left alone.
    pub async fn connect(&self) -> Result<(), BrokerError> {
        self.ensure_channel().await.map(drop)
    }

    async fn ensure_channel(&self) -> Result<Channel, BrokerError> {
        let mut state = self.state.lock().await;
        if let Some(conn) = state.as_ref() {
            if conn.connection.status().connected() && conn.channel.status().connected() {
                return Ok(conn.channel.clone());
            }
            debug!("broker connection is stale, reconnecting");
        }

        let connection = Connection::connect(&self.url, ConnectionProperties::default())
            .await
            .map_err(BrokerError::Connection)?;
        let channel = connection
            .create_channel()
            .await
            .map_err(BrokerError::Connection)?;
        channel
            .exchange_declare(
                &self.exchange,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(BrokerError::Connection)?;

        info!(exchange = %self.exchange, "connected to message broker");

        let handle = channel.clone();
        *state = Some(ConnState { connection, channel });
        Ok(handle)
    }

    async fn invalidate(&self) {
        *self.state.lock().await = None;
    }

    /// Publish `event` under `routing_key` as a persistent JSON message.
    ///
    /// Does not wait for any consumer. A stale connection is reconnected
    /// once, transparently; if the retry also fails the error is returned
    /// and the caller picks the policy (swallow, fall back, or propagate).
    pub async fn publish(&self, routing_key: &str, event: &Event) -> Result<(), BrokerError> {
        let body = serde_json::to_vec(event)?;

        let channel = self.ensure_channel().await?;
        match self.publish_on(&channel, routing_key, &body).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(
                    routing_key,
                    error = %e,
                    "publish failed on existing channel, reconnecting once"
                );
                self.invalidate().await;
                let channel = self.ensure_channel().await?;
                self.publish_on(&channel, routing_key, &body).await
            }
        }
    }

    async fn publish_on(
        &self,
        channel: &Channel,
        routing_key: &str,
        body: &[u8],
    ) -> Result<(), BrokerError> {
        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        let properties = BasicProperties::default()
            .with_content_type("application/json".into())
            .with_delivery_mode(DELIVERY_MODE_PERSISTENT)
            .with_timestamp(millis as u64);

        channel
            .basic_publish(
                &self.exchange,
                routing_key,
                BasicPublishOptions::default(),
                body,
                properties,
            )
            .await
            .map_err(BrokerError::Publish)?
            .await
            .map_err(BrokerError::Publish)?;

        debug!(routing_key, "published event");
        Ok(())
    }

    /// Idempotently declare a durable queue and bind it to the shared
    /// exchange under `routing_key_pattern`.
    pub async fn declare_queue(
        &self,
        name: &str,
        routing_key_pattern: &str,
    ) -> Result<(), BrokerError> {
        let channel = self.ensure_channel().await?;
        channel
            .queue_declare(
                name,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(BrokerError::Connection)?;
        channel
            .queue_bind(
                name,
                &self.exchange,
                routing_key_pattern,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(BrokerError::Connection)?;

        info!(queue = name, pattern = routing_key_pattern, "declared and bound queue");
        Ok(())
    }

    /// Consume `queue` until shutdown, dispatching each decoded delivery to
    /// `handler`.
    ///
    /// Blocks the calling task; run it on a dedicated task, never on a
    /// request-serving one. A handler error (or an undecodable payload)
    /// nacks the message without requeue, deliberately dropping it instead
    /// of risking a poison-message loop.
    pub async fn start_consuming(
        &self,
        queue: &str,
        handler: Arc<dyn EventHandler>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> Result<(), BrokerError> {
        let channel = self.ensure_channel().await?;
        let mut consumer = channel
            .basic_consume(
                queue,
                "",
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(BrokerError::Connection)?;

        info!(queue, "consumer started");

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!(queue, "consumer received shutdown signal");
                        break;
                    }
                }

                delivery = consumer.next() => {
                    let Some(delivery) = delivery else {
                        info!(queue, "consumer stream closed by broker");
                        break;
                    };
                    let delivery = match delivery {
                        Ok(d) => d,
                        Err(e) => {
                            error!(queue, error = %e, "failed to receive delivery");
                            continue;
                        }
                    };

                    match serde_json::from_slice::<Event>(&delivery.data) {
                        Ok(event) => match handler.handle(event).await {
                            Ok(()) => {
                                if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
                                    error!(queue, error = %e, "failed to ack delivery");
                                }
                            }
                            Err(e) => {
                                error!(queue, error = %e, "handler failed, dropping message");
                                Self::nack_no_requeue(&delivery, queue).await;
                            }
                        },
                        Err(e) => {
                            error!(queue, error = %e, "undecodable message, dropping");
                            Self::nack_no_requeue(&delivery, queue).await;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    async fn nack_no_requeue(delivery: &lapin::message::Delivery, queue: &str) {
        let options = BasicNackOptions {
            requeue: false,
            ..Default::default()
        };
        if let Err(e) = delivery.nack(options).await {
            error!(queue, error = %e, "failed to nack delivery");
        }
    }

    /// Release the connection. Idempotent; errors are logged and swallowed.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if let Some(conn) = state.take() {
            if let Err(e) = conn.connection.close(200, "shutdown").await {
                warn!(error = %e, "error closing broker connection");
            } else {
                info!("broker connection closed");
            }
        }
    }
}

#[async_trait]
impl EventPublisher for BrokerClient {
    async fn publish(&self, routing_key: &str, event: &Event) -> Result<(), BrokerError> {
        BrokerClient::publish(self, routing_key, event).await
    }
}
