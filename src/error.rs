//! Error types for the dispatch engine.
//!
//! - [`TransportError`]: failures of the transport collaborator (receive/send)
//! - [`ConfigError`]: invalid or unreadable shared configuration (initialization)
//! - [`CurrencyDataError`]: invalid or unreadable currency rate file (initialization)
//! - [`UnitError`]: why a single unit (ingress, worker, egress) terminated
//! - [`NfError`]: process-level failures reported by the runtime

use crate::ids::NfId;
use std::path::PathBuf;
use thiserror::Error;

/// Error raised by a transport `receive` or `send`.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport has no more transactions to deliver (clean end of stream)
    #[error("transport closed")]
    Closed,
    /// The peer behind the transport went away
    #[error("transport disconnected")]
    Disconnected,
    #[error("transport i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode transaction: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode transaction: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Error loading the shared configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse shared configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("shared configuration lists no network functions")]
    NoNetworkFunctions,
    #[error("network function id {id} is reserved")]
    InvalidNfId { id: NfId },
    #[error("network function {id} is configured twice")]
    DuplicateNf { id: NfId },
    #[error("network function {id} has no worker threads")]
    NoWorkers { id: NfId },
    #[error("route {route_id} is configured twice")]
    DuplicateRoute { route_id: u8 },
    #[error("route {route_id} references unknown network function {hop}")]
    UnknownHop { route_id: u8, hop: NfId },
}

/// Error loading a currency rate table.
#[derive(Debug, Error)]
pub enum CurrencyDataError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse currency data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("currency data is empty")]
    Empty,
    #[error("currency {code} has invalid rate {rate}")]
    InvalidRate { code: String, rate: f64 },
}

/// Which unit of the pipeline an exit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Ingress,
    Worker(usize),
    Egress,
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unit::Ingress => write!(f, "ingress"),
            Unit::Worker(id) => write!(f, "worker-{id}"),
            Unit::Egress => write!(f, "egress"),
        }
    }
}

/// Reason a unit terminated abnormally.
#[derive(Debug, Error)]
pub enum UnitError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The peer end of an inter-unit channel is gone
    #[error("{channel} channel of worker {worker} is closed")]
    ChannelClosed {
        worker: usize,
        channel: ChannelSide,
    },
    #[error("unit panicked")]
    Panicked,
}

/// Direction of a worker channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSide {
    Inbound,
    Outbound,
}

impl std::fmt::Display for ChannelSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelSide::Inbound => write!(f, "inbound"),
            ChannelSide::Outbound => write!(f, "outbound"),
        }
    }
}

/// Process-level error of a network function.
#[derive(Debug, Error)]
pub enum NfError {
    #[error("failed to spawn {unit} thread: {source}")]
    Spawn {
        unit: Unit,
        #[source]
        source: std::io::Error,
    },
    #[error("{unit} terminated: {source}")]
    UnitFailed {
        unit: Unit,
        #[source]
        source: UnitError,
    },
    #[error("a network function needs at least one worker")]
    NoWorkers,
    #[error("network function {id} is not in the shared configuration")]
    UnknownNf { id: NfId },
}
