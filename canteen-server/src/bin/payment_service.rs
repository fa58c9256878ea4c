//! Canteen payment service.
//!
//! Consumes `payment.initiated` events from the shared topic exchange,
//! settles payments with a mock processor, and reports results back as
//! `payment.<status>` events, with an HTTP fallback to the order service
//! when the broker is down. The same initiation flow is also exposed
//! synchronously over HTTP.

use canteen_core::broker::{BrokerClient, EventHandler};
use canteen_core::events::routing::{PAYMENT_INITIATED, PAYMENT_SERVICE_QUEUE};
use canteen_core::lifecycle::{PaymentEventHandler, PaymentLifecycle, SettlementWorker, settlement_channel};
use canteen_core::store::MemoryPaymentStore;
use canteen_sdk::client::OrderServiceClient;
use canteen_server::api::payments::{PaymentAppState, router};
use canteen_server::config::ConfigLoader;
use canteen_server::shutdown::shutdown_signal;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Canteen payment service
#[derive(Parser, Debug)]
#[command(name = "payment-service")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./canteen-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:8003)
    #[arg(short, long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();
    tracing::info!("Starting payment-service v{}", env!("CARGO_PKG_VERSION"));

    let config = ConfigLoader::new(&args.config, args.listen).load()?;
    let listen_addr = config.server.listen;

    let broker = Arc::new(BrokerClient::new(config.broker.url, config.broker.exchange));
    if let Err(e) = broker.connect().await {
        tracing::warn!(error = %e, "broker unavailable at startup, running HTTP-only");
    }

    let store = Arc::new(MemoryPaymentStore::new());
    let orders = OrderServiceClient::new(config.services.order_service_url);
    let (settlement_tx, settlement_rx) = settlement_channel();
    let lifecycle = Arc::new(PaymentLifecycle::new(
        store,
        broker.clone(),
        orders,
        settlement_tx,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker = SettlementWorker::new(lifecycle.clone(), settlement_rx, shutdown_rx.clone());
    let worker_handle = tokio::spawn(worker.run());

    // Event-driven intake: bind the service queue to payment.initiated and
    // consume it in the background. Any failure here leaves the service in
    // HTTP-only mode rather than refusing to start.
    let consumer_handle = match broker.declare_queue(PAYMENT_SERVICE_QUEUE, PAYMENT_INITIATED).await
    {
        Ok(()) => {
            let handler: Arc<dyn EventHandler> =
                Arc::new(PaymentEventHandler::new(lifecycle.clone()));
            let consumer_broker = broker.clone();
            let consumer_shutdown = shutdown_rx.clone();
            Some(tokio::spawn(async move {
                if let Err(e) = consumer_broker
                    .start_consuming(PAYMENT_SERVICE_QUEUE, handler, consumer_shutdown)
                    .await
                {
                    tracing::error!(error = %e, "event consumer stopped");
                }
            }))
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not bind service queue, running HTTP-only");
            None
        }
    };

    let app = router(PaymentAppState { lifecycle });

    let listener = TcpListener::bind(listen_addr).await?;
    tracing::info!("payment-service listening on {}", listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the background tasks, then close the broker connection.
    let _ = shutdown_tx.send(true);
    let _ = worker_handle.await;
    if let Some(handle) = consumer_handle {
        let _ = handle.await;
    }
    broker.close().await;
    tracing::info!("payment-service shutdown complete");
    Ok(())
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,lapin=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
