//! Identities carried by every transaction.
//!
//! [`NfId`] names a network function in the shared configuration and is what routes,
//! `caller_fn` and `next_fn` are made of. [`TxnId`] names one transaction for its whole
//! trip through the chain.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Numeric identity of a network function within the route table.
///
/// Identities are 1-based; `0` is reserved by the transport as "no destination".
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NfId(pub u8);

impl NfId {
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// `true` for the reserved "no destination" id.
    #[must_use]
    pub fn is_unset(self) -> bool {
        self.0 == 0
    }
}

impl Display for NfId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for NfId {
    fn from(id: u8) -> Self {
        Self(id)
    }
}

/// Transaction identifier, a ULID in its 26-character string form on the wire.
///
/// Assigned once when a transaction enters the chain and carried unchanged through every
/// hop so log lines from different NFs can be correlated.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxnId(pub ulid::Ulid);

impl TxnId {
    /// Fresh id stamped with the current time.
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Milliseconds since the Unix epoch at which the id was minted.
    #[must_use]
    pub fn minted_at_ms(self) -> u64 {
        self.0.timestamp_ms()
    }
}

/// A fresh id, so a transaction arriving without one still gets a distinct id.
impl Default for TxnId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ulid::Ulid> for TxnId {
    fn from(id: ulid::Ulid) -> Self {
        Self(id)
    }
}

impl Display for TxnId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for TxnId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ulid::Ulid::from_string(s).map(Self)
    }
}
