//! # Runtime Module
//!
//! Process lifecycle of one network function: create the N worker channel pairs, start the
//! ingress dispatcher, the egress multiplexer and the N workers on their own threads, then
//! supervise them until they exit.
//!
//! ```text
//! transport ─► ingress ─► worker[i] inbound ─► worker[i] ─► worker[i] outbound ─► egress ─► transport
//! ```
//!
//! All units are started once and run for the lifetime of the process. Every unit reports
//! its exit (including a panic) to the supervisor in [`RunningNf::wait`], which applies the
//! configured [`FailurePolicy`].
//!
//! ## Shutdown
//!
//! When the transport closes, ingress exits and drops the worker inbound senders. Each
//! worker drains its queue and exits, dropping its outbound sender. Egress forwards what is
//! left and exits once every outbound channel is disconnected.

use crate::egress::EgressMultiplexer;
use crate::error::{NfError, Unit, UnitError};
use crate::ingress::IngressDispatcher;
use crate::runtime_config::{FailurePolicy, RuntimeConfig};
use crate::transaction::Transaction;
use crate::transport::{TransportRx, TransportTx};
use crate::worker_pool::{NfContext, Worker, WorkerMetrics, WorkerMetricsSnapshot};
use crossbeam::channel::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{error, info, warn};

/// Exit report of one unit.
#[derive(Debug)]
struct UnitExit {
    unit: Unit,
    outcome: Result<(), UnitError>,
}

/// Reports a unit's exit to the supervisor, or a panic if the unit unwound before reporting.
struct ExitReporter {
    unit: Unit,
    tx: Sender<UnitExit>,
    reported: bool,
}

impl ExitReporter {
    fn report(mut self, outcome: Result<(), UnitError>) {
        self.reported = true;
        // The supervisor may already have returned under `FailurePolicy::Shutdown`.
        let _ = self.tx.send(UnitExit {
            unit: self.unit,
            outcome,
        });
    }
}

impl Drop for ExitReporter {
    fn drop(&mut self) {
        if !self.reported {
            let _ = self.tx.send(UnitExit {
                unit: self.unit,
                outcome: Err(UnitError::Panicked),
            });
        }
    }
}

/// Entry point for starting a network function's dispatch engine.
pub struct NfRuntime;

impl NfRuntime {
    /// Start all units of a network function with `workers` workers.
    ///
    /// Returns once every thread has been spawned. A spawn failure is an initialization
    /// error; units already started are left to exit as their channels close.
    pub fn start<R, T>(
        context: Arc<NfContext>,
        workers: usize,
        config: RuntimeConfig,
        transport_rx: R,
        transport_tx: T,
    ) -> Result<RunningNf, NfError>
    where
        R: TransportRx + 'static,
        T: TransportTx + 'static,
    {
        if workers == 0 {
            return Err(NfError::NoWorkers);
        }

        info!(
            nf_id = %context.nf_id(),
            nf_name = %context.nf_name(),
            workers = workers,
            channel_capacity = config.channel_capacity,
            failure_policy = ?config.failure_policy,
            operations = ?context.registry().operations(),
            "Starting network function"
        );

        let (exit_tx, exit_rx) = channel::unbounded();

        let mut inbound_tx = Vec::with_capacity(workers);
        let mut inbound_rx = Vec::with_capacity(workers);
        let mut outbound_tx = Vec::with_capacity(workers);
        let mut outbound_rx = Vec::with_capacity(workers);
        for _ in 0..workers {
            let (tx, rx) = channel::bounded::<Transaction>(config.channel_capacity);
            inbound_tx.push(tx);
            inbound_rx.push(rx);
            let (tx, rx) = channel::bounded::<Transaction>(config.channel_capacity);
            outbound_tx.push(tx);
            outbound_rx.push(rx);
        }
        let metrics: Vec<Arc<WorkerMetrics>> =
            (0..workers).map(|_| Arc::new(WorkerMetrics::new())).collect();

        let mut handles = Vec::with_capacity(workers + 2);

        let egress = EgressMultiplexer::new(Arc::clone(&context), outbound_rx, transport_tx);
        handles.push(spawn_unit(Unit::Egress, &config, &exit_tx, move || egress.run())?);

        for (id, (inbound, outbound)) in inbound_rx.into_iter().zip(outbound_tx).enumerate() {
            let worker = Worker::new(
                id,
                Arc::clone(&context),
                inbound,
                outbound,
                Arc::clone(&metrics[id]),
            );
            handles.push(spawn_unit(Unit::Worker(id), &config, &exit_tx, move || {
                worker.run()
            })?);
        }

        let ingress = IngressDispatcher::new(transport_rx, inbound_tx, metrics.clone());
        handles.push(spawn_unit(Unit::Ingress, &config, &exit_tx, move || ingress.run())?);

        Ok(RunningNf {
            exits: exit_rx,
            handles,
            metrics,
            policy: config.failure_policy,
        })
    }
}

fn spawn_unit<F>(
    unit: Unit,
    config: &RuntimeConfig,
    exit_tx: &Sender<UnitExit>,
    body: F,
) -> Result<JoinHandle<()>, NfError>
where
    F: FnOnce() -> Result<(), UnitError> + Send + 'static,
{
    let reporter = ExitReporter {
        unit,
        tx: exit_tx.clone(),
        reported: false,
    };
    thread::Builder::new()
        .name(format!("nf-{unit}"))
        .stack_size(config.stack_size)
        .spawn(move || reporter.report(body()))
        .map_err(|source| {
            error!(unit = %unit, error = %source, "Failed to spawn unit thread");
            NfError::Spawn { unit, source }
        })
}

/// Handle on a started network function.
pub struct RunningNf {
    exits: Receiver<UnitExit>,
    handles: Vec<JoinHandle<()>>,
    metrics: Vec<Arc<WorkerMetrics>>,
    policy: FailurePolicy,
}

impl RunningNf {
    /// Per-worker metrics, indexed by worker id.
    #[must_use]
    pub fn metrics(&self) -> Vec<WorkerMetricsSnapshot> {
        self.metrics.iter().map(|m| m.snapshot()).collect()
    }

    #[must_use]
    pub fn failure_policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Supervise the units until they have all exited.
    ///
    /// Under [`FailurePolicy::Isolate`] a failed unit is logged and the others keep
    /// running; the first failure is returned once every unit has exited. Under
    /// [`FailurePolicy::Shutdown`] the first failure is returned immediately.
    pub fn wait(self) -> Result<(), NfError> {
        let RunningNf {
            exits,
            handles,
            policy,
            ..
        } = self;

        let mut remaining = handles.len();
        let mut first_failure: Option<NfError> = None;

        while remaining > 0 {
            let Ok(exit) = exits.recv() else {
                break;
            };
            remaining -= 1;

            match exit.outcome {
                Ok(()) => info!(unit = %exit.unit, remaining = remaining, "Unit exited"),
                Err(source) => {
                    error!(
                        unit = %exit.unit,
                        error = %source,
                        remaining = remaining,
                        failure_policy = ?policy,
                        "Unit failed"
                    );
                    let failure = NfError::UnitFailed {
                        unit: exit.unit,
                        source,
                    };
                    match policy {
                        FailurePolicy::Shutdown => return Err(failure),
                        FailurePolicy::Isolate => {
                            if remaining > 0 {
                                warn!(
                                    unit = %exit.unit,
                                    "Continuing in degraded mode without the failed unit"
                                );
                            }
                            first_failure.get_or_insert(failure);
                        }
                    }
                }
            }
        }

        for handle in handles {
            if handle.join().is_err() {
                // Already reported through the exit channel.
                warn!("Unit thread ended with a panic");
            }
        }

        match first_failure {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }
}
