//! # Transport Module
//!
//! The transport delivers serialized transactions to this NF and accepts the ones it
//! forwards. It is an external collaborator: the dispatch engine only depends on the two
//! traits below, one per direction, so the ingress and egress units each own their half.
//!
//! Two implementations ship with the crate:
//! - [`memory`]: an in-process loopback built on bounded channels, used by tests and by
//!   embedders that chain NFs inside one process
//! - [`json_lines`]: newline-delimited JSON over any reader/writer; the `currency-nf`
//!   binary runs it over stdin/stdout

pub mod json_lines;
pub mod memory;

pub use crate::error::TransportError;
use crate::ids::NfId;
use crate::transaction::Transaction;

/// Receiving half of a transport.
pub trait TransportRx: Send {
    /// Block until the next transaction arrives.
    ///
    /// Returns [`TransportError::Closed`] once the stream has ended.
    fn receive(&mut self) -> Result<Transaction, TransportError>;
}

/// Sending half of a transport.
pub trait TransportTx: Send {
    /// Hand `txn` to the transport, addressed to `destination`.
    fn send(&mut self, txn: Transaction, destination: NfId) -> Result<(), TransportError>;
}

impl<T: TransportRx + ?Sized> TransportRx for Box<T> {
    fn receive(&mut self) -> Result<Transaction, TransportError> {
        (**self).receive()
    }
}

impl<T: TransportTx + ?Sized> TransportTx for Box<T> {
    fn send(&mut self, txn: Transaction, destination: NfId) -> Result<(), TransportError> {
        (**self).send(txn, destination)
    }
}
