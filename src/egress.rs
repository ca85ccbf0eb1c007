//! # Egress Multiplexer
//!
//! One unit that fans the N worker outbound channels back into the transport. Every
//! outbound channel is registered with a [`Select`] set; the multiplexer blocks until at
//! least one of them is ready, then reads exactly one transaction from each channel that
//! currently holds one and sends it to the transport, addressed to its `next_fn`.
//!
//! Each worker writes only to its own outbound channel and the multiplexer is the sole
//! reader of all of them, so no channel has more than one producer or consumer.
//!
//! ## Worker exits
//!
//! A disconnected outbound channel means its worker has terminated. The channel is
//! removed from the select set and the others keep being served. Once every channel is
//! disconnected the multiplexer exits cleanly.
//!
//! ## Failures
//!
//! A transport send failure terminates the multiplexer. Transactions still queued on the
//! outbound channels at that point are lost.

use crate::error::UnitError;
use crate::transaction::Transaction;
use crate::transport::TransportTx;
use crate::worker_pool::NfContext;
use crossbeam::channel::{Receiver, Select, TryRecvError};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Drains every worker outbound channel into the transport.
pub struct EgressMultiplexer<T> {
    context: Arc<NfContext>,
    outbound: Vec<Receiver<Transaction>>,
    transport: T,
}

impl<T: TransportTx> EgressMultiplexer<T> {
    /// `outbound[i]` is worker `i`'s outbound channel.
    #[must_use]
    pub fn new(context: Arc<NfContext>, outbound: Vec<Receiver<Transaction>>, transport: T) -> Self {
        Self {
            context,
            outbound,
            transport,
        }
    }

    /// Run until every outbound channel is disconnected or the transport fails.
    pub fn run(self) -> Result<(), UnitError> {
        let EgressMultiplexer {
            context,
            outbound,
            mut transport,
        } = self;

        let mut select = Select::new();
        for rx in &outbound {
            select.recv(rx);
        }
        let mut closed = vec![false; outbound.len()];
        let mut open = outbound.len();

        info!(channels = open, "Egress multiplexer started");

        while open > 0 {
            let ready = select.ready();

            // One transaction per ready channel, starting with the one select reported.
            for offset in 0..outbound.len() {
                let worker = (ready + offset) % outbound.len();
                if closed[worker] {
                    continue;
                }
                match outbound[worker].try_recv() {
                    Ok(txn) => forward(&context, &mut transport, worker, txn)?,
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        select.remove(worker);
                        closed[worker] = true;
                        open -= 1;
                        warn!(
                            worker_id = worker,
                            remaining = open,
                            "Worker outbound channel disconnected - removed from egress"
                        );
                    }
                }
            }
        }

        info!("All worker outbound channels closed - egress multiplexer exiting");
        Ok(())
    }
}

fn forward<T: TransportTx>(
    context: &NfContext,
    transport: &mut T,
    worker: usize,
    txn: Transaction,
) -> Result<(), UnitError> {
    let next_hop = context.routes().hop(txn.route_id, txn.hop_count);
    debug!(
        txn_id = %txn.id,
        worker_id = worker,
        route_id = txn.route_id,
        hop_count = txn.hop_count,
        next_hop = ?next_hop.map(|h| h.get()),
        next_fn = %txn.next_fn,
        caller_nf = %txn.caller_nf,
        caller_fn = %txn.caller_fn,
        operation = %txn.operation_name,
        "Forwarding transaction"
    );

    let destination = txn.next_fn;
    transport.send(txn, destination).map_err(|e| {
        error!(
            worker_id = worker,
            destination = %destination,
            error = %e,
            "Transport send failed - egress multiplexer terminating"
        );
        UnitError::from(e)
    })
}
