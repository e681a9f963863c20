// src/utils/precision.rs
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;

/// Decimals assumed for a market the cache does not know.
pub const FALLBACK_DECIMALS: u32 = 4;

/// Largest precision we encode; 10^18 still fits in a u64 multiplier.
pub const MAX_DECIMALS: u32 = 18;

/// What to do when a symbol has no cached precision.
///
/// `Fallback` keeps trading with a guessed precision, which can misencode
/// sizes and prices by orders of magnitude on a market with different
/// decimals. `FailClosed` refuses instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PrecisionPolicy {
    Fallback { decimals: u32 },
    FailClosed,
}

impl Default for PrecisionPolicy {
    fn default() -> Self {
        PrecisionPolicy::Fallback {
            decimals: FALLBACK_DECIMALS,
        }
    }
}

fn scale_factor(decimals: u32) -> Option<Decimal> {
    if decimals > MAX_DECIMALS {
        return None;
    }
    Some(Decimal::from(10u64.pow(decimals)))
}

/// Scales `value` by 10^decimals and truncates toward zero.
/// Example: value=1.23456, decimals=4 -> 12345
pub fn to_raw(value: Decimal, decimals: u32) -> Option<i64> {
    let factor = scale_factor(decimals)?;
    value.checked_mul(factor)?.trunc().to_i64()
}

/// Inverse of `to_raw` on the decimal grid.
pub fn from_raw(raw: i64, decimals: u32) -> Option<Decimal> {
    let factor = scale_factor(decimals)?;
    Decimal::from(raw).checked_div(factor)
}

/// Cuts `value` down to `decimals` places without rounding up.
pub fn truncate(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::ToZero)
}

/// Truncated and zero-padded, e.g. 0.1 at 4 decimals -> "0.1000".
pub fn format_truncated(value: Decimal, decimals: u32) -> String {
    let mut cut = truncate(value, decimals);
    cut.rescale(decimals);
    cut.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn truncates_instead_of_rounding() {
        assert_eq!(to_raw(dec!(1.23456), 4), Some(12345));
        assert_eq!(to_raw(dec!(0.99999), 2), Some(99));
        assert_eq!(to_raw(dec!(3030), 2), Some(303000));
    }

    #[test]
    fn zero_decimals_keeps_integer_part() {
        assert_eq!(to_raw(dec!(42.9), 0), Some(42));
    }

    #[test]
    fn raw_values_survive_decode_encode() {
        for raw in [0i64, 1, 7, 12345, 99_999_999, 123_456_789_012] {
            for decimals in [0u32, 2, 4, 6] {
                let decoded = from_raw(raw, decimals).unwrap();
                assert_eq!(to_raw(decoded, decimals), Some(raw));
            }
        }
    }

    #[test]
    fn rejects_absurd_precision() {
        assert_eq!(to_raw(dec!(1), MAX_DECIMALS + 1), None);
        assert_eq!(from_raw(1, MAX_DECIMALS + 1), None);
    }

    #[test]
    fn overflow_is_none() {
        assert_eq!(to_raw(Decimal::MAX, 4), None);
    }

    #[test]
    fn formats_with_padding() {
        assert_eq!(format_truncated(dec!(0.1), 4), "0.1000");
        assert_eq!(format_truncated(dec!(1.23456), 4), "1.2345");
        assert_eq!(format_truncated(dec!(12.9), 0), "12");
    }
}
