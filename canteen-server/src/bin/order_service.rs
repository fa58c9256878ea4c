//! Canteen order service.
//!
//! Accepts orders over HTTP, resolves items against the menu service, and
//! emits `order.created` / `payment.initiated` events onto the shared
//! topic exchange. Runs fine with the broker down; events are then dropped
//! and the payment service reaches back over HTTP.

use canteen_core::broker::BrokerClient;
use canteen_core::lifecycle::{HttpCatalog, OrderLifecycle};
use canteen_core::store::MemoryOrderStore;
use canteen_sdk::client::MenuClient;
use canteen_server::api::orders::{OrderAppState, router};
use canteen_server::config::ConfigLoader;
use canteen_server::shutdown::shutdown_signal;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Canteen order service
#[derive(Parser, Debug)]
#[command(name = "order-service")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./canteen-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:8002)
    #[arg(short, long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();
    tracing::info!("Starting order-service v{}", env!("CARGO_PKG_VERSION"));

    let config = ConfigLoader::new(&args.config, args.listen).load()?;
    let listen_addr = config.server.listen;

    let broker = Arc::new(BrokerClient::new(config.broker.url, config.broker.exchange));
    if let Err(e) = broker.connect().await {
        tracing::warn!(error = %e, "broker unavailable at startup, events will be dropped");
    }

    let store = Arc::new(MemoryOrderStore::new());
    let catalog = Arc::new(HttpCatalog::new(MenuClient::new(config.services.menu_url)));
    let lifecycle = Arc::new(OrderLifecycle::new(store, catalog, broker.clone()));

    let app = router(OrderAppState { lifecycle });

    let listener = TcpListener::bind(listen_addr).await?;
    tracing::info!("order-service listening on {}", listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    broker.close().await;
    tracing::info!("order-service shutdown complete");
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
