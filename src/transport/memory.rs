//! In-process transport backed by bounded crossbeam channels.
//!
//! ```rust
//! use nf_dispatch::ids::NfId;
//! use nf_dispatch::transaction::Transaction;
//! use nf_dispatch::transport::memory::MemoryLink;
//! use nf_dispatch::transport::{TransportRx, TransportTx};
//!
//! let (link, mut rx, mut tx) = MemoryLink::new(16);
//! link.inject(Transaction::new(0, NfId(1), "Ping")).unwrap();
//! let txn = rx.receive().unwrap();
//! tx.send(txn, NfId(1)).unwrap();
//! assert_eq!(link.next_delivery().unwrap().destination, NfId(1));
//! ```

use super::{TransportRx, TransportTx};
use crate::error::TransportError;
use crate::ids::NfId;
use crate::transaction::Transaction;
use crossbeam::channel::{self, Receiver, RecvError, RecvTimeoutError, Sender};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A transaction handed to the transport together with its destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub destination: NfId,
    pub transaction: Transaction,
}

/// Receiving half: yields injected transactions, `Closed` once every injector is dropped.
pub struct MemoryRx {
    rx: Receiver<Transaction>,
}

impl TransportRx for MemoryRx {
    fn receive(&mut self) -> Result<Transaction, TransportError> {
        self.rx.recv().map_err(|RecvError| TransportError::Closed)
    }
}

/// Sending half: records every delivery; fails once the [`MemoryLink`] is dropped.
pub struct MemoryTx {
    tx: Sender<Delivery>,
}

impl TransportTx for MemoryTx {
    fn send(&mut self, transaction: Transaction, destination: NfId) -> Result<(), TransportError> {
        self.tx
            .send(Delivery {
                destination,
                transaction,
            })
            .map_err(|_| TransportError::Disconnected)
    }
}

/// The far side of a memory transport: injects transactions and observes deliveries.
pub struct MemoryLink {
    inject: Sender<Transaction>,
    delivered: Receiver<Delivery>,
}

impl MemoryLink {
    /// Create a link whose queues hold up to `capacity` transactions in each direction.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, MemoryRx, MemoryTx) {
        let (inject, rx) = channel::bounded(capacity);
        let (tx, delivered) = channel::bounded(capacity);
        (
            Self { inject, delivered },
            MemoryRx { rx },
            MemoryTx { tx },
        )
    }

    /// Queue `txn` for the receiving half; blocks while the queue is full.
    pub fn inject(&self, txn: Transaction) -> Result<(), TransportError> {
        self.inject
            .send(txn)
            .map_err(|_| TransportError::Disconnected)
    }

    /// Block until the next delivery; `None` once the sending half is gone.
    #[must_use]
    pub fn next_delivery(&self) -> Option<Delivery> {
        self.delivered.recv().ok()
    }

    /// Wait at most `timeout` for the next delivery.
    #[must_use]
    pub fn next_delivery_timeout(&self, timeout: Duration) -> Option<Delivery> {
        match self.delivered.recv_timeout(timeout) {
            Ok(delivery) => Some(delivery),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Split into the injector and the delivery stream.
    ///
    /// Dropping the returned sender closes the receiving half, which ends ingress cleanly.
    #[must_use]
    pub fn split(self) -> (Sender<Transaction>, Receiver<Delivery>) {
        (self.inject, self.delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receive_reports_closed_after_injector_dropped() {
        let (link, mut rx, _tx) = MemoryLink::new(4);
        link.inject(Transaction::new(0, NfId(1), "Op")).unwrap();
        let (inject, _delivered) = link.split();
        drop(inject);

        assert!(rx.receive().is_ok());
        assert!(matches!(rx.receive(), Err(TransportError::Closed)));
    }

    #[test]
    fn test_send_fails_once_link_dropped() {
        let (link, _rx, mut tx) = MemoryLink::new(4);
        drop(link);
        let err = tx.send(Transaction::new(0, NfId(1), "Op"), NfId(2)).unwrap_err();
        assert!(matches!(err, TransportError::Disconnected));
    }
}
