//! # nf-dispatch
//!
//! **nf-dispatch** is the request-dispatch core of a network function (NF) in a chain of
//! cooperating NFs. Each NF runs as its own process: transactions arrive from a transport,
//! are served by a fixed pool of workers, and leave through the same transport addressed
//! to the hop that sent them.
//!
//! ## Architecture
//!
//! One NF is made of `N + 2` long-running units, each on its own named thread:
//!
//! - **[`ingress`]** - pulls transactions from the transport and deals them to the workers
//!   in strict round robin; blocks (and so stops pulling) when a worker's channel is full
//! - **[`worker_pool`]** - N workers, each with a private inbound and outbound channel;
//!   resolves the operation in the [`registry`], runs the handler, then turns the
//!   transaction around (`next_fn := caller_fn`, `caller_fn := own id`)
//! - **[`egress`]** - waits on all N outbound channels at once and forwards whatever is
//!   ready to the transport, addressed to `next_fn`
//!
//! [`runtime`] wires and supervises the units; [`transport`] defines the seam to the
//! outside world; [`currency`] is the business logic the `currency-nf` binary hosts.
//!
//! ```mermaid
//! sequenceDiagram
//!     participant T as Transport
//!     participant I as Ingress
//!     participant W as Worker[i]
//!     participant R as HandlerRegistry
//!     participant E as Egress
//!
//!     T->>I: receive()
//!     I->>W: inbound[i].send(txn)  (i = round robin)
//!     W->>R: resolve(operation_name)
//!     R-->>W: Registered(handler) | Fallback(handler)
//!     W->>W: handler(&mut txn)
//!     W->>W: pivot(own_id)
//!     W->>E: outbound[i].send(txn)
//!     E->>T: send(txn, next_fn)
//! ```
//!
//! ## Guarantees
//!
//! - Every transaction is processed by exactly one worker and forwarded exactly once
//! - A worker forwards its own transactions in the order it received them; there is no
//!   ordering between workers
//! - An unknown operation is not an error: the registry's fallback runs, logged at `warn`
//! - A failed worker terminates alone; the others keep being fed and drained
//!
//! ## Quick Start
//!
//! ```rust
//! use nf_dispatch::config::RouteTable;
//! use nf_dispatch::ids::NfId;
//! use nf_dispatch::registry::HandlerRegistry;
//! use nf_dispatch::runtime::NfRuntime;
//! use nf_dispatch::runtime_config::RuntimeConfig;
//! use nf_dispatch::transaction::Transaction;
//! use nf_dispatch::transport::memory::MemoryLink;
//! use nf_dispatch::worker_pool::NfContext;
//! use std::sync::Arc;
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register("Ping", |txn| txn.hop_count += 1);
//! let context = Arc::new(NfContext::new(NfId(2), "pinger", registry, RouteTable::default()));
//!
//! let (link, rx, tx) = MemoryLink::new(16);
//! let running = NfRuntime::start(context, 2, RuntimeConfig::default(), rx, tx).unwrap();
//!
//! link.inject(Transaction::new(0, NfId(1), "Ping")).unwrap();
//! let (injector, deliveries) = link.split();
//! drop(injector);
//!
//! let delivery = deliveries.recv().unwrap();
//! assert_eq!(delivery.destination, NfId(1));
//! assert_eq!(delivery.transaction.hop_count, 1);
//! running.wait().unwrap();
//! ```
//!
//! ## Configuration
//!
//! - [`config`] - shared YAML configuration (NFs, worker counts, routes)
//! - [`runtime_config`] - `NF_*` environment tuning (channel capacity, stack size,
//!   failure policy)
//! - [`logging`] - `NF_LOG_*` structured logging setup

pub mod cli;
pub mod config;
pub mod currency;
pub mod egress;
pub mod error;
pub mod ids;
pub mod ingress;
pub mod logging;
pub mod registry;
pub mod runtime;
pub mod runtime_config;
pub mod transaction;
pub mod transport;
pub mod worker_pool;

pub use error::{ConfigError, NfError, TransportError, UnitError};
pub use registry::{Dispatch, HandlerRegistry};
pub use runtime::{NfRuntime, RunningNf};
pub use transaction::Transaction;
