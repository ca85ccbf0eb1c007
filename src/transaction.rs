//! # Transaction Module
//!
//! The [`Transaction`] is the unit of work flowing through a chain of network functions.
//! It carries routing metadata (which route it follows, where it is on that route, who sent
//! it and who receives it next) and a [`Payload`] holding the business data.
//!
//! Ownership moves along the pipeline: the transport hands a transaction to the ingress
//! dispatcher, which moves it into exactly one worker's inbound channel; the worker moves it
//! into its outbound channel; the egress multiplexer moves it back into the transport. No
//! stage keeps a reference after the hand-off.

use crate::ids::{NfId, TxnId};
use serde::{Deserialize, Serialize};

/// An amount of money in a given currency.
///
/// `units` is the whole part and `nanos` the fractional part in units of 10^-9.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Money {
    pub currency_code: String,
    pub units: i64,
    pub nanos: i32,
}

impl Money {
    #[must_use]
    pub fn new(currency_code: impl Into<String>, units: i64, nanos: i32) -> Self {
        Self {
            currency_code: currency_code.into(),
            units,
            nanos,
        }
    }
}

/// Request to convert `from` into the currency identified by `to_code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyConversionRequest {
    pub from: Money,
    pub to_code: String,
}

/// Operation request carried by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Request {
    GetSupportedCurrencies,
    Convert(CurrencyConversionRequest),
}

/// Result written back by a handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Response {
    SupportedCurrencies(Vec<String>),
    Converted(Money),
    /// The handler ran but could not satisfy the request.
    Rejected { reason: String },
}

/// Business data of a transaction: either the request still to be served or the result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "body", rename_all = "snake_case")]
pub enum Payload {
    #[default]
    Empty,
    Request(Request),
    Response(Response),
}

/// In-flight request/response state routed through a chain of NFs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Correlation id, stable across hops
    #[serde(default)]
    pub id: TxnId,
    /// Route this transaction follows
    pub route_id: u8,
    /// Current position within the route
    pub hop_count: u8,
    /// Name of the NF that sent this transaction here
    #[serde(default)]
    pub caller_nf: String,
    /// Identity of the NF that sent this transaction here
    pub caller_fn: NfId,
    /// Identity of the NF that should receive this transaction next
    #[serde(default)]
    pub next_fn: NfId,
    /// Key selecting the handler that serves this transaction (exact, case-sensitive)
    pub operation_name: String,
    #[serde(default)]
    pub payload: Payload,
}

impl Transaction {
    /// Create a transaction for `operation_name` sent by `caller_fn` on `route_id`.
    #[must_use]
    pub fn new(route_id: u8, caller_fn: NfId, operation_name: impl Into<String>) -> Self {
        Self {
            id: TxnId::new(),
            route_id,
            hop_count: 0,
            caller_nf: String::new(),
            caller_fn,
            next_fn: NfId::default(),
            operation_name: operation_name.into(),
            payload: Payload::Empty,
        }
    }

    #[must_use]
    pub fn with_request(mut self, request: Request) -> Self {
        self.payload = Payload::Request(request);
        self
    }

    #[must_use]
    pub fn with_caller_nf(mut self, caller_nf: impl Into<String>) -> Self {
        self.caller_nf = caller_nf.into();
        self
    }

    /// The request carried by this transaction, if it has not been answered yet.
    #[must_use]
    pub fn request(&self) -> Option<&Request> {
        match &self.payload {
            Payload::Request(req) => Some(req),
            _ => None,
        }
    }

    /// The result written by a handler, if any.
    #[must_use]
    pub fn response(&self) -> Option<&Response> {
        match &self.payload {
            Payload::Response(resp) => Some(resp),
            _ => None,
        }
    }

    pub fn respond(&mut self, response: Response) {
        self.payload = Payload::Response(response);
    }

    /// Turn the transaction around at this hop.
    ///
    /// The hop that sent it here becomes the next destination and this NF becomes the
    /// caller.
    pub fn pivot(&mut self, own_id: NfId, own_name: &str) {
        self.next_fn = self.caller_fn;
        self.caller_fn = own_id;
        own_name.clone_into(&mut self.caller_nf);
    }
}
