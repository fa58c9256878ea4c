//! Settlement worker and its job channel.
//!
//! Settlement is dispatched fire-and-forget: callers push a job onto a
//! bounded channel and return immediately; the worker resolves the payment
//! later. One worker per payment service, stopped cooperatively on
//! shutdown.

use crate::lifecycle::PaymentLifecycle;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{error, info};

/// Buffer for pending settlement jobs. Bounds concurrent backlog while
/// absorbing bursts of `payment.initiated` deliveries.
pub const SETTLEMENT_CHANNEL_BUFFER: usize = 256;

/// One settlement to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementJob {
    pub payment_id: String,
}

pub type SettlementSender = mpsc::Sender<SettlementJob>;
pub type SettlementReceiver = mpsc::Receiver<SettlementJob>;

/// Create the settlement job channel.
pub fn settlement_channel() -> (SettlementSender, SettlementReceiver) {
    mpsc::channel(SETTLEMENT_CHANNEL_BUFFER)
}

/// Background worker that drives mock settlements to completion.
pub struct SettlementWorker {
    lifecycle: Arc<PaymentLifecycle>,
    job_rx: SettlementReceiver,
    shutdown_rx: watch::Receiver<bool>,
}

impl SettlementWorker {
    pub fn new(
        lifecycle: Arc<PaymentLifecycle>,
        job_rx: SettlementReceiver,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            lifecycle,
            job_rx,
            shutdown_rx,
        }
    }

    /// Run until shutdown is signaled or the job channel closes.
    ///
    /// Each job resolves on its own task, so the simulated delay of one
    /// settlement never holds up the next; the channel keeps draining while
    /// settlements are in flight.
    pub async fn run(mut self) {
        info!("SettlementWorker started");
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("SettlementWorker received shutdown signal");
                        break;
                    }
                }

                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "settlement task aborted");
                    }
                }

                job = self.job_rx.recv() => {
                    let Some(job) = job else {
                        info!("settlement channel closed");
                        break;
                    };
                    let lifecycle = self.lifecycle.clone();
                    in_flight.spawn(async move {
                        Self::resolve(lifecycle, job).await;
                    });
                }
            }
        }

        // Let settlements already in flight finish before returning.
        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "settlement task aborted");
            }
        }

        info!("SettlementWorker shutdown complete");
    }

    async fn resolve(lifecycle: Arc<PaymentLifecycle>, job: SettlementJob) {
        match lifecycle.process_mock_settlement(&job.payment_id).await {
            Ok(payment) => {
                info!(
                    payment_id = %payment.payment_id,
                    status = %payment.status,
                    "settlement resolved"
                );
            }
            Err(e) => {
                error!(
                    payment_id = %job.payment_id,
                    error = %e,
                    "settlement failed"
                );
            }
        }
    }
}
