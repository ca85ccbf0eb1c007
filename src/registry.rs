//! # Handler Registry
//!
//! Maps an operation name to the handler that serves it. The registry is populated once at
//! startup, then moved into the shared [`NfContext`](crate::worker_pool::NfContext) and only
//! read from that point on, so workers look handlers up without synchronization.
//!
//! Lookup is an exact, case-sensitive string match. A name with no registered handler
//! resolves to the fallback handler instead of failing, so unknown or legacy operations
//! still complete and move on to their next hop.
//!
//! ```rust
//! use nf_dispatch::registry::{Dispatch, HandlerRegistry};
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register("Ping", |txn| txn.hop_count += 1);
//!
//! assert!(matches!(registry.resolve("Ping"), Dispatch::Registered(_)));
//! assert!(matches!(registry.resolve("ping"), Dispatch::Fallback(_)));
//! ```

use crate::transaction::Transaction;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// A handler reads the request payload of a transaction and writes its result in place.
pub type Handler = Arc<dyn Fn(&mut Transaction) + Send + Sync>;

/// Outcome of resolving an operation name.
pub enum Dispatch<'a> {
    /// A handler is registered under the requested name
    Registered(&'a Handler),
    /// No handler matched; run the diagnostic fallback
    Fallback(&'a Handler),
}

impl Dispatch<'_> {
    #[must_use]
    pub fn handler(&self) -> &Handler {
        match self {
            Dispatch::Registered(h) | Dispatch::Fallback(h) => h,
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Dispatch::Fallback(_))
    }
}

/// Operation name to handler table, plus the fallback for unknown names.
#[derive(Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Handler>,
    fallback: Handler,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("operations", &self.operations())
            .finish_non_exhaustive()
    }
}

impl HandlerRegistry {
    /// Create an empty registry whose fallback leaves transactions untouched.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            fallback: Arc::new(|_: &mut Transaction| {}),
        }
    }

    /// Register `handler` under `name`, replacing any handler already registered there.
    pub fn register<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&mut Transaction) + Send + Sync + 'static,
    {
        if self.handlers.insert(name.to_string(), Arc::new(handler)).is_some() {
            warn!(operation = %name, "Replaced existing handler");
        } else {
            info!(
                operation = %name,
                total_handlers = self.handlers.len(),
                "Handler registered"
            );
        }
    }

    /// Install the handler run for operation names that are not registered.
    pub fn set_fallback<F>(&mut self, handler: F)
    where
        F: Fn(&mut Transaction) + Send + Sync + 'static,
    {
        self.fallback = Arc::new(handler);
    }

    /// Look up the handler for `name`.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Dispatch<'_> {
        match self.handlers.get(name) {
            Some(handler) => Dispatch::Registered(handler),
            None => Dispatch::Fallback(&self.fallback),
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered operation names, sorted.
    #[must_use]
    pub fn operations(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
