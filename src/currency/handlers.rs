//! Handlers for the currency service operations.
//!
//! Each handler reads the request from the transaction payload and writes its response in
//! place. A request that cannot be served (unknown currency, out-of-range amount, missing
//! request) is answered with [`Response::Rejected`]; the transaction still completes.

use super::money;
use super::CurrencyTable;
use crate::transaction::{
    CurrencyConversionRequest, Money, Payload, Request, Response, Transaction,
};
use tracing::{info, warn};

/// Amount converted by the mock test.
const MOCK_UNITS: i64 = 300;
const MOCK_FROM: &str = "USD";
const MOCK_TO: &str = "EUR";

/// Answer with every supported currency code, in table order.
pub fn get_supported_currencies(table: &CurrencyTable, txn: &mut Transaction) {
    info!(txn_id = %txn.id, "[GetSupportedCurrencies] received request");
    txn.respond(Response::SupportedCurrencies(table.codes().to_vec()));
}

/// Convert the requested amount and answer with the converted money.
pub fn convert(table: &CurrencyTable, txn: &mut Transaction) {
    info!(txn_id = %txn.id, "[Convert] received request");

    let response = match txn.request() {
        Some(Request::Convert(req)) => match convert_request(table, req) {
            Ok(result) => Response::Converted(result),
            Err(reason) => {
                warn!(txn_id = %txn.id, reason = %reason, "[Convert] rejected request");
                Response::Rejected { reason }
            }
        },
        _ => {
            warn!(txn_id = %txn.id, "[Convert] no conversion request in payload");
            Response::Rejected {
                reason: "missing conversion request".to_string(),
            }
        }
    };

    txn.respond(response);
}

fn convert_request(table: &CurrencyTable, req: &CurrencyConversionRequest) -> Result<Money, String> {
    let rate_from = table
        .rate(&req.from.currency_code)
        .ok_or_else(|| format!("unsupported currency {}", req.from.currency_code))?;
    let rate_to = table
        .rate(&req.to_code)
        .ok_or_else(|| format!("unsupported currency {}", req.to_code))?;

    money::convert(&req.from, rate_from, rate_to, &req.to_code).ok_or_else(|| {
        format!(
            "converted amount out of range ({} {} to {})",
            req.from.units, req.from.currency_code, req.to_code
        )
    })
}

/// Diagnostic run for operations this service does not know.
///
/// Lists the supported currencies, then converts a fixed 300 USD into EUR, logging both
/// results. The conversion result is left in the payload.
pub fn mock_test(table: &CurrencyTable, txn: &mut Transaction) {
    warn!(
        txn_id = %txn.id,
        operation = %txn.operation_name,
        "Operation is not supported - running mock test"
    );

    get_supported_currencies(table, txn);
    if let Some(Response::SupportedCurrencies(codes)) = txn.response() {
        info!(txn_id = %txn.id, currencies = ?codes, "Mock test supported currencies");
    }

    txn.payload = Payload::Request(Request::Convert(
        CurrencyConversionRequest {
            from: Money::new(MOCK_FROM, MOCK_UNITS, 0),
            to_code: MOCK_TO.to_string(),
        },
    ));
    convert(table, txn);

    match txn.response() {
        Some(Response::Converted(result)) => info!(
            txn_id = %txn.id,
            currency_code = %result.currency_code,
            units = result.units,
            nanos = result.nanos,
            "Mock test conversion result"
        ),
        other => warn!(txn_id = %txn.id, response = ?other, "Mock test conversion failed"),
    }
}
