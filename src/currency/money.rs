//! Fixed-point money arithmetic for currency conversion.
//!
//! Amounts are `units` plus `nanos` (10^-9 of a unit). A conversion divides by the source
//! rate to reach EUR, carries, then multiplies by the target rate and carries again. Every
//! carry truncates toward zero; nothing is rounded. A result whose units do not fit in an
//! `i64` is refused rather than saturated.

use crate::transaction::Money;

/// Number of nanos in one unit.
pub const NANOS_PER_UNIT: i64 = 1_000_000_000;

/// Normalize a scaled `(units, nanos)` pair back into integer fixed point.
///
/// The fractional part of `units` is folded into `nanos`, `nanos` is truncated to an integer
/// and whole units that overflow `nanos` move into `units`.
///
/// Returns `None` when either part is not finite or the units leave the `i64` range.
#[must_use]
pub fn carry(units: f64, nanos: f64) -> Option<(i64, i32)> {
    let folded = nanos + units.fract() * NANOS_PER_UNIT as f64;
    let nanos = to_i64(folded)?;
    let units = to_i64(units)?.checked_add(nanos / NANOS_PER_UNIT)?;
    Some((units, (nanos % NANOS_PER_UNIT) as i32))
}

fn to_i64(value: f64) -> Option<i64> {
    let whole = value.trunc();
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
    (whole.is_finite() && whole >= i64::MIN as f64 && whole < i64::MAX as f64)
        .then(|| whole as i64)
}

/// Convert `from` (priced at `rate_from` per EUR) into `to_code` (priced at `rate_to`).
///
/// Returns `None` if the converted amount is out of range.
#[must_use]
pub fn convert(from: &Money, rate_from: f64, rate_to: f64, to_code: &str) -> Option<Money> {
    let (euro_units, euro_nanos) = carry(
        from.units as f64 / rate_from,
        f64::from(from.nanos) / rate_from,
    )?;

    let (units, nanos) = carry(
        euro_units as f64 * rate_to,
        f64::from(euro_nanos) * rate_to,
    )?;

    Some(Money::new(to_code, units, nanos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carry_folds_fraction_into_nanos() {
        assert_eq!(carry(8.5, 0.0), Some((8, 500_000_000)));
        assert_eq!(carry(2.0, 250.9), Some((2, 250)));
    }

    #[test]
    fn test_carry_moves_nanos_overflow_into_units() {
        assert_eq!(carry(1.0, 2_500_000_000.0), Some((3, 500_000_000)));
        assert_eq!(carry(0.75, 500_000_000.0), Some((1, 250_000_000)));
    }

    #[test]
    fn test_carry_refuses_out_of_range_units() {
        assert_eq!(carry(1.0e19, 0.0), None);
        assert_eq!(carry(f64::NAN, 0.0), None);
        assert_eq!(carry(0.0, f64::INFINITY), None);
    }

    #[test]
    fn test_convert_usd_to_eur_truncates() {
        let result = convert(&Money::new("USD", 10, 0), 1.1305, 1.0, "EUR");
        assert_eq!(result, Some(Money::new("EUR", 8, 845_643_520)));
    }

    #[test]
    fn test_convert_same_rate_is_identity() {
        let amount = Money::new("EUR", 42, 123_456_789);
        assert_eq!(convert(&amount, 1.0, 1.0, "EUR"), Some(amount));
    }

    #[test]
    fn test_convert_eur_to_jpy_multiplies() {
        let result = convert(&Money::new("EUR", 5, 0), 1.0, 126.40, "JPY");
        assert_eq!(result, Some(Money::new("JPY", 632, 0)));
    }

    #[test]
    fn test_convert_large_eur_to_jpy_is_refused() {
        let amount = Money::new("EUR", 100_000_000_000_000_000, 500_000_000);
        assert_eq!(convert(&amount, 1.0, 126.40, "JPY"), None);
    }
}
