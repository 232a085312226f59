//! Conversion between user-entered decimal amounts and token base units.
//!
//! Parsing is exact: no floating point is involved, so an amount typed by a
//! user, sent to the program, fetched back and formatted again reads the same.

use crate::constants::ESTIMATE_FRACTION_DIGITS;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("enter an amount")]
    Empty,
    #[error("'{0}' is not a valid amount")]
    Invalid(String),
    #[error("at most {max} decimal places are supported")]
    TooManyDecimals { max: u8 },
    #[error("amount is too large")]
    Overflow,
}

fn pow10(decimals: u8) -> Option<u128> {
    10u128.checked_pow(u32::from(decimals))
}

/// Parse `"12.5"` into base units for a mint with `decimals` decimals.
pub fn to_base_units(input: &str, decimals: u8) -> Result<u64, AmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }

    let invalid = || AmountError::Invalid(trimmed.to_string());
    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    // Extra zeros are harmless: "1.500" with 2 decimals is still 1.50.
    let significant = fraction.trim_end_matches('0');
    if significant.len() > usize::from(decimals) {
        return Err(AmountError::TooManyDecimals { max: decimals });
    }

    // Base units are the whole digits followed by the fraction padded to
    // `decimals` places.
    let mut digits = String::with_capacity(whole.len() + usize::from(decimals));
    digits.push_str(whole.trim_start_matches('0'));
    digits.push_str(significant);
    if digits.is_empty() {
        return Ok(0);
    }
    digits.extend(std::iter::repeat('0').take(usize::from(decimals) - significant.len()));
    digits.parse::<u64>().map_err(|_| AmountError::Overflow)
}

/// Exact decimal rendering with trailing fractional zeros removed.
pub fn format_amount(base: u64, decimals: u8) -> String {
    let digits = base.to_string();
    let decimals = usize::from(decimals);
    if decimals == 0 {
        return digits;
    }

    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    }
}

/// Rendering for client-side estimates: prefixed with `~` and truncated to a
/// fixed number of fraction digits.
pub fn format_estimate(base: u64, decimals: u8) -> String {
    let shown = decimals.min(ESTIMATE_FRACTION_DIGITS);
    let drop = decimals - shown;
    let truncated = pow10(drop).map_or(0, |scale| (u128::from(base) / scale) as u64);
    format!("~{}", format_amount(truncated, shown))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amounts() {
        assert_eq!(to_base_units("12.5", 9), Ok(12_500_000_000));
        assert_eq!(to_base_units(" 3 ", 6), Ok(3_000_000));
        assert_eq!(to_base_units(".25", 2), Ok(25));
        assert_eq!(to_base_units("7.", 2), Ok(700));
        assert_eq!(to_base_units("0", 9), Ok(0));
        assert_eq!(to_base_units("1.500", 2), Ok(150));
        assert_eq!(to_base_units(".0", 0), Ok(0));
        assert_eq!(to_base_units("5.000", 0), Ok(5));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(to_base_units("", 9), Err(AmountError::Empty));
        assert_eq!(to_base_units(".", 9), Err(AmountError::Invalid(".".into())));
        assert_eq!(to_base_units("-1", 9), Err(AmountError::Invalid("-1".into())));
        assert_eq!(to_base_units("1e3", 9), Err(AmountError::Invalid("1e3".into())));
        assert_eq!(to_base_units("1.2.3", 9), Err(AmountError::Invalid("1.2.3".into())));
        assert_eq!(
            to_base_units("0.001", 2),
            Err(AmountError::TooManyDecimals { max: 2 })
        );
        assert_eq!(to_base_units("18446744073709551616", 0), Err(AmountError::Overflow));
        assert_eq!(to_base_units("18446744074", 9), Err(AmountError::Overflow));
        assert_eq!(to_base_units("1", 20), Err(AmountError::Overflow));
    }

    #[test]
    fn test_errors_quote_what_was_typed() {
        assert_eq!(
            to_base_units("1a.500", 2),
            Err(AmountError::Invalid("1a.500".into()))
        );
        assert_eq!(
            to_base_units(" 2.5x0 ", 2),
            Err(AmountError::Invalid("2.5x0".into()))
        );
    }

    #[test]
    fn test_large_decimal_counts() {
        assert_eq!(to_base_units("0", 20), Ok(0));
        assert_eq!(to_base_units("0.00000000000000000005", 20), Ok(5));
        for base in [0u64, 5, 123_456_789, u64::MAX] {
            assert_eq!(to_base_units(&format_amount(base, 20), 20), Ok(base));
            assert_eq!(to_base_units(&format_amount(base, 255), 255), Ok(base));
        }
        assert_eq!(format_estimate(5, 20), "~0");
    }

    #[test]
    fn test_format_amounts() {
        assert_eq!(format_amount(12_500_000_000, 9), "12.5");
        assert_eq!(format_amount(1, 9), "0.000000001");
        assert_eq!(format_amount(0, 9), "0");
        assert_eq!(format_amount(42, 0), "42");
        assert_eq!(format_amount(100, 2), "1");
    }

    #[test]
    fn test_entered_amount_survives_fetch_and_display() {
        for (input, decimals) in [("12.5", 9u8), ("0.000001", 6), ("1000", 0), ("99.99", 2)] {
            let base = to_base_units(input, decimals).unwrap();
            assert_eq!(format_amount(base, decimals), input);
        }
    }

    #[test]
    fn test_format_estimate() {
        assert_eq!(format_estimate(1_234_567_891, 9), "~1.23456789");
        assert_eq!(format_estimate(150, 2), "~1.5");
        assert_eq!(format_estimate(0, 9), "~0");
    }
}
