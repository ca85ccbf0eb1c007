//! # Ingress Dispatcher
//!
//! A single loop that pulls transactions from the transport and spreads them over the
//! worker inbound channels in strict round robin: worker `0, 1, …, N-1, 0, …` in arrival
//! order, with no load-aware balancing.
//!
//! Sends block while the chosen worker's channel is full. Because this is one sequential
//! loop, that backpressure reaches the transport: nothing else is received until the
//! pending transaction has been placed. Nothing is dropped or reordered.
//!
//! A transport error other than a clean close terminates the dispatcher.
//!
//! So does a worker whose inbound channel is gone. Ingress does not skip the dead worker:
//! it returns, which drops every inbound sender, so the surviving workers drain what is
//! queued and the pipeline winds down. A worker drops its inbound receiver only when it
//! exits, and outside a panic it exits only once egress has dropped its outbound channel.

use crate::error::{ChannelSide, TransportError, UnitError};
use crate::transaction::Transaction;
use crate::transport::TransportRx;
use crate::worker_pool::WorkerMetrics;
use crossbeam::channel::Sender;
use std::sync::Arc;
use tracing::{error, info, trace};

/// Cycles `0..n` in order.
#[derive(Debug, Clone)]
pub struct RoundRobin {
    next: usize,
    n: usize,
}

impl RoundRobin {
    /// # Panics
    ///
    /// Panics if `n` is zero.
    #[must_use]
    pub fn new(n: usize) -> Self {
        assert!(n > 0, "round robin over zero targets");
        Self { next: 0, n }
    }

    /// Return the current target and advance.
    pub fn next_target(&mut self) -> usize {
        let target = self.next;
        self.next = (self.next + 1) % self.n;
        target
    }
}

/// Pulls from the transport and feeds the worker pool.
pub struct IngressDispatcher<R> {
    transport: R,
    inbound: Vec<Sender<Transaction>>,
    metrics: Vec<Arc<WorkerMetrics>>,
}

impl<R: TransportRx> IngressDispatcher<R> {
    /// `inbound[i]` and `metrics[i]` belong to worker `i`.
    #[must_use]
    pub fn new(
        transport: R,
        inbound: Vec<Sender<Transaction>>,
        metrics: Vec<Arc<WorkerMetrics>>,
    ) -> Self {
        debug_assert_eq!(inbound.len(), metrics.len());
        Self {
            transport,
            inbound,
            metrics,
        }
    }

    /// Run until the transport closes or a fatal error occurs.
    ///
    /// Dropping the dispatcher on return closes every worker inbound channel, so workers
    /// drain what is queued and exit.
    pub fn run(mut self) -> Result<(), UnitError> {
        if self.inbound.is_empty() {
            return Ok(());
        }
        let mut targets = RoundRobin::new(self.inbound.len());
        info!(workers = self.inbound.len(), "Ingress dispatcher started");

        loop {
            let txn = match self.transport.receive() {
                Ok(txn) => txn,
                Err(TransportError::Closed) => {
                    info!("Transport closed - ingress dispatcher exiting");
                    return Ok(());
                }
                Err(e) => {
                    error!(error = %e, "Transport receive failed - ingress dispatcher terminating");
                    return Err(e.into());
                }
            };

            let worker = targets.next_target();
            trace!(
                txn_id = %txn.id,
                worker_id = worker,
                route_id = txn.route_id,
                operation = %txn.operation_name,
                "Dispatching to worker"
            );

            // Counted before the send: the worker may complete it before `send` returns.
            self.metrics[worker].record_dispatch();
            if let Err(e) = self.inbound[worker].send(txn) {
                self.metrics[worker].retract_dispatch();
                error!(
                    worker_id = worker,
                    txn_id = %e.0.id,
                    "Worker inbound channel closed - ingress dispatcher terminating"
                );
                return Err(UnitError::ChannelClosed {
                    worker,
                    channel: ChannelSide::Inbound,
                });
            }
        }
    }
}
