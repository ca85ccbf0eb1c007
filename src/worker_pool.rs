//! # Worker Pool Module
//!
//! N long-running workers, each owning a private inbound and outbound channel. A worker
//! takes one transaction at a time from its inbound channel, runs the handler named by the
//! transaction's `operation_name`, turns the transaction around for its next hop and pushes
//! it onto its outbound channel.
//!
//! ## Dispatch
//!
//! Handler lookup goes through the [`HandlerRegistry`]:
//! - a registered name runs its handler, logged at `debug`
//! - an unknown name runs the registry's fallback handler, logged at `warn`; the
//!   transaction still completes and is forwarded
//!
//! Handler panics are caught and logged at `error`; the transaction is forwarded as left
//! by the handler. A hung handler stalls only its own worker.
//!
//! ## Ordering
//!
//! A worker never reorders its own work: transactions leave its outbound channel in the
//! order they entered its inbound channel.
//!
//! ## Failure isolation
//!
//! When its outbound channel is closed a worker logs and terminates with
//! [`UnitError::ChannelClosed`]. Sibling workers are unaffected. A closed inbound channel
//! means ingress has finished; the worker exits cleanly after that.

use crate::config::RouteTable;
use crate::error::{ChannelSide, UnitError};
use crate::ids::NfId;
use crate::registry::{Dispatch, HandlerRegistry};
use crate::transaction::Transaction;
use crossbeam::channel::{Receiver, Sender};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Identity and read-only state shared by every unit of one network function.
#[derive(Debug, Clone)]
pub struct NfContext {
    nf_id: NfId,
    nf_name: String,
    registry: HandlerRegistry,
    routes: RouteTable,
}

/// How a transaction was served by a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The registered handler ran to completion
    Handled,
    /// No handler was registered; the fallback ran
    Fallback,
    /// The handler (registered or fallback) panicked
    Panicked,
}

impl NfContext {
    #[must_use]
    pub fn new(
        nf_id: NfId,
        nf_name: impl Into<String>,
        registry: HandlerRegistry,
        routes: RouteTable,
    ) -> Self {
        Self {
            nf_id,
            nf_name: nf_name.into(),
            registry,
            routes,
        }
    }

    #[must_use]
    pub fn nf_id(&self) -> NfId {
        self.nf_id
    }

    #[must_use]
    pub fn nf_name(&self) -> &str {
        &self.nf_name
    }

    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Serve one transaction on the calling thread and pivot it toward its next hop.
    ///
    /// After this returns, `txn.next_fn` holds the `caller_fn` it had on entry and
    /// `txn.caller_fn` is this NF's id, whatever the handler did.
    pub fn process(&self, worker_id: usize, txn: &mut Transaction) -> DispatchOutcome {
        let dispatch = self.registry.resolve(&txn.operation_name);
        let is_fallback = dispatch.is_fallback();
        let caller = txn.caller_fn;

        if is_fallback {
            warn!(
                txn_id = %txn.id,
                worker_id = worker_id,
                operation = %txn.operation_name,
                nf_name = %self.nf_name,
                "Operation not supported - running fallback handler"
            );
        } else {
            debug!(
                txn_id = %txn.id,
                worker_id = worker_id,
                operation = %txn.operation_name,
                "Dispatching to handler"
            );
        }

        let start = Instant::now();
        let outcome = match invoke(&dispatch, txn) {
            Ok(()) if is_fallback => DispatchOutcome::Fallback,
            Ok(()) => DispatchOutcome::Handled,
            Err(panic_message) => {
                error!(
                    txn_id = %txn.id,
                    worker_id = worker_id,
                    operation = %txn.operation_name,
                    panic_message = %panic_message,
                    "Handler panicked - forwarding transaction as left by the handler"
                );
                DispatchOutcome::Panicked
            }
        };

        txn.caller_fn = caller;
        txn.pivot(self.nf_id, &self.nf_name);

        debug!(
            txn_id = %txn.id,
            worker_id = worker_id,
            next_fn = %txn.next_fn,
            outcome = ?outcome,
            execution_time_us = start.elapsed().as_micros() as u64,
            "Handler execution complete"
        );
        outcome
    }
}

fn invoke(dispatch: &Dispatch<'_>, txn: &mut Transaction) -> Result<(), String> {
    let handler = dispatch.handler();
    catch_unwind(AssertUnwindSafe(|| handler(txn))).map_err(|panic| {
        if let Some(s) = panic.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        }
    })
}

/// Counters for one worker, shared between ingress (dispatch side) and the worker.
#[derive(Debug, Default)]
pub struct WorkerMetrics {
    /// Transactions placed on this worker's inbound channel
    pub dispatched_count: AtomicU64,
    /// Transactions this worker has finished processing
    pub completed_count: AtomicU64,
    /// Transactions served by the fallback handler
    pub fallback_count: AtomicU64,
    /// Handler panics caught by this worker
    pub panic_count: AtomicU64,
    /// Dispatched but not yet completed (approximate)
    pub queue_depth: AtomicUsize,
}

/// Point-in-time copy of [`WorkerMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkerMetricsSnapshot {
    pub dispatched: u64,
    pub completed: u64,
    pub fallback: u64,
    pub panicked: u64,
    pub queue_depth: usize,
}

impl WorkerMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_dispatch(&self) {
        self.dispatched_count.fetch_add(1, Ordering::Relaxed);
        self.queue_depth.fetch_add(1, Ordering::Relaxed);
    }

    /// Undo [`record_dispatch`](Self::record_dispatch) for a send that failed.
    pub fn retract_dispatch(&self) {
        self.dispatched_count.fetch_sub(1, Ordering::Relaxed);
        self.decrement_queue_depth();
    }

    pub fn record_completion(&self, outcome: DispatchOutcome) {
        self.completed_count.fetch_add(1, Ordering::Relaxed);
        self.decrement_queue_depth();
        match outcome {
            DispatchOutcome::Handled => {}
            DispatchOutcome::Fallback => {
                self.fallback_count.fetch_add(1, Ordering::Relaxed);
            }
            DispatchOutcome::Panicked => {
                self.panic_count.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn decrement_queue_depth(&self) {
        // Saturating: a worker fed directly, not through ingress, never recorded a dispatch.
        let _ = self
            .queue_depth
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |d| {
                Some(d.saturating_sub(1))
            });
    }

    #[must_use]
    pub fn snapshot(&self) -> WorkerMetricsSnapshot {
        WorkerMetricsSnapshot {
            dispatched: self.dispatched_count.load(Ordering::Relaxed),
            completed: self.completed_count.load(Ordering::Relaxed),
            fallback: self.fallback_count.load(Ordering::Relaxed),
            panicked: self.panic_count.load(Ordering::Relaxed),
            queue_depth: self.queue_depth.load(Ordering::Relaxed),
        }
    }
}

/// One of the N workers of a network function.
pub struct Worker {
    id: usize,
    context: Arc<NfContext>,
    inbound: Receiver<Transaction>,
    outbound: Sender<Transaction>,
    metrics: Arc<WorkerMetrics>,
}

impl Worker {
    #[must_use]
    pub fn new(
        id: usize,
        context: Arc<NfContext>,
        inbound: Receiver<Transaction>,
        outbound: Sender<Transaction>,
        metrics: Arc<WorkerMetrics>,
    ) -> Self {
        Self {
            id,
            context,
            inbound,
            outbound,
            metrics,
        }
    }

    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Process transactions until the inbound channel closes or the outbound one fails.
    pub fn run(self) -> Result<(), UnitError> {
        info!(
            worker_id = self.id,
            nf_id = %self.context.nf_id(),
            "Worker started"
        );

        for mut txn in self.inbound.iter() {
            let outcome = self.context.process(self.id, &mut txn);
            self.metrics.record_completion(outcome);

            if let Err(e) = self.outbound.send(txn) {
                error!(
                    worker_id = self.id,
                    txn_id = %e.0.id,
                    error = %e,
                    "Outbound channel closed - worker terminating"
                );
                return Err(UnitError::ChannelClosed {
                    worker: self.id,
                    channel: ChannelSide::Outbound,
                });
            }
        }

        info!(worker_id = self.id, "Inbound channel closed - worker exiting");
        Ok(())
    }
}
