//! # Currency Service
//!
//! Business logic hosted by the `currencyservice` network function: list the supported
//! currency codes and convert an amount between two of them using rates relative to EUR.
//!
//! ## Operations
//!
//! | Operation | Request | Response |
//! |---|---|---|
//! | `GetSupportedCurrencies` | any | [`Response::SupportedCurrencies`](crate::transaction::Response::SupportedCurrencies) |
//! | `Convert` | [`Request::Convert`](crate::transaction::Request::Convert) | [`Response::Converted`](crate::transaction::Response::Converted) or `Rejected` |
//!
//! Any other operation name runs the mock test in [`handlers::mock_test`] as the registry
//! fallback.
//!
//! Operation names are the ones the other services in the chain send, so there is no
//! `list_supported` style alias: a transaction naming `list_supported` is not recognised
//! and gets the mock test. A deployment that wants another name can register
//! [`handlers::get_supported_currencies`] under it on the same registry.
//!
//! ## Usage
//!
//! ```rust
//! use nf_dispatch::currency::{self, CurrencyTable};
//! use nf_dispatch::registry::HandlerRegistry;
//! use std::sync::Arc;
//!
//! let mut registry = HandlerRegistry::new();
//! currency::register_all(&mut registry, Arc::new(CurrencyTable::builtin()));
//! assert_eq!(registry.operations(), vec!["Convert", "GetSupportedCurrencies"]);
//! ```

pub mod handlers;
pub mod money;

use crate::error::CurrencyDataError;
use crate::registry::HandlerRegistry;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Name this business logic expects its network function to be configured under.
pub const SERVICE_NAME: &str = "currencyservice";

pub const GET_SUPPORTED_CURRENCIES: &str = "GetSupportedCurrencies";
pub const CONVERT: &str = "Convert";

const BUILTIN_RATES: [(&str, f64); 4] = [
    ("EUR", 1.0),
    ("USD", 1.1305),
    ("JPY", 126.40),
    ("CAD", 1.5128),
];

/// Supported currency codes and their rate against EUR.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyTable {
    codes: Vec<String>,
    rates: HashMap<String, f64>,
}

impl CurrencyTable {
    /// Build a table from `(code, rate)` pairs, keeping their order.
    ///
    /// A code listed twice keeps its first position and its last rate.
    pub fn new<I, S>(entries: I) -> Result<Self, CurrencyDataError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut codes = Vec::new();
        let mut rates = HashMap::new();
        for (code, rate) in entries {
            let code = code.into();
            if !rate.is_finite() || rate <= 0.0 {
                return Err(CurrencyDataError::InvalidRate { code, rate });
            }
            if rates.insert(code.clone(), rate).is_none() {
                codes.push(code);
            }
        }
        if codes.is_empty() {
            return Err(CurrencyDataError::Empty);
        }
        Ok(Self { codes, rates })
    }

    /// The four built-in currencies: EUR, USD, JPY, CAD.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            codes: BUILTIN_RATES.iter().map(|(c, _)| (*c).to_string()).collect(),
            rates: BUILTIN_RATES
                .iter()
                .map(|(c, r)| ((*c).to_string(), *r))
                .collect(),
        }
    }

    /// Load a `{"CODE": rate, ...}` JSON object. Codes come out sorted.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CurrencyDataError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CurrencyDataError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json(&content)?;
        info!(
            path = %path.display(),
            currencies = table.codes.len(),
            "Loaded currency data"
        );
        Ok(table)
    }

    pub fn from_json(content: &str) -> Result<Self, CurrencyDataError> {
        let rates: BTreeMap<String, f64> = serde_json::from_str(content)?;
        Self::new(rates)
    }

    /// Supported codes in table order.
    #[must_use]
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    #[must_use]
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Register `GetSupportedCurrencies` and `Convert`, and install the mock test fallback.
pub fn register_all(registry: &mut HandlerRegistry, table: Arc<CurrencyTable>) {
    let t = Arc::clone(&table);
    registry.register(GET_SUPPORTED_CURRENCIES, move |txn| {
        handlers::get_supported_currencies(&t, txn);
    });

    let t = Arc::clone(&table);
    registry.register(CONVERT, move |txn| handlers::convert(&t, txn));

    registry.set_fallback(move |txn| handlers::mock_test(&table, txn));
}
