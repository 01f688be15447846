use std::str::FromStr;

use alloy::primitives::U256;
use rust_decimal::Decimal;

use crate::error::StakingError;

/// Decimals of a pool's BPT (and of the gauge deposit token).
pub const BPT_DECIMALS: u8 = 18;

/// Decimals assumed for a token missing from a token list.
pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;

/// Parse a decimal string, accepting scientific notation (e.g. `"1.5e-7"`).
pub fn parse_decimal(value: &str) -> Result<Decimal, StakingError> {
    let trimmed = value.trim();
    let parsed = if trimmed.contains(['e', 'E']) {
        Decimal::from_scientific(trimmed)
    } else {
        Decimal::from_str(trimmed)
    };
    parsed.map_err(|_| StakingError::InvalidDecimal {
        value: value.to_string(),
    })
}

/// Render a raw integer token amount as a human-readable decimal string.
///
/// Trailing zeros of the fractional part are dropped but at least one
/// fractional digit is kept: `10^18 @ 18 -> "1.0"`, `0 -> "0.0"`.
pub fn format_units(raw: U256, decimals: u8) -> String {
    let digits = raw.to_string();
    let decimals = decimals as usize;

    let padded = if digits.len() <= decimals {
        format!("{}{digits}", "0".repeat(decimals + 1 - digits.len()))
    } else {
        digits
    };
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    let fraction = if fraction.is_empty() { "0" } else { fraction };

    format!("{whole}.{fraction}")
}

/// Convert a raw integer token amount into a `Decimal`.
pub fn units_to_decimal(raw: U256, decimals: u8) -> Result<Decimal, StakingError> {
    parse_decimal(&format_units(raw, decimals))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wei(s: &str) -> U256 {
        U256::from_str(s).unwrap()
    }

    #[test]
    fn test_format_units_whole_and_fraction() {
        assert_eq!(format_units(wei("1000000000000000000"), 18), "1.0");
        assert_eq!(format_units(wei("1500000000000000000"), 18), "1.5");
        assert_eq!(format_units(wei("123456789000000000000"), 18), "123.456789");
    }

    #[test]
    fn test_format_units_small_values() {
        assert_eq!(format_units(U256::ZERO, 18), "0.0");
        assert_eq!(format_units(wei("1"), 18), "0.000000000000000001");
        assert_eq!(format_units(wei("250000"), 6), "0.25");
    }

    #[test]
    fn test_format_units_zero_decimals() {
        assert_eq!(format_units(wei("42"), 0), "42.0");
    }

    #[test]
    fn test_units_to_decimal() {
        let d = units_to_decimal(wei("2500000000000000000"), 18).unwrap();
        assert_eq!(d, Decimal::from_str("2.5").unwrap());
    }

    #[test]
    fn test_parse_decimal_forms() {
        assert_eq!(parse_decimal(" 0.12 ").unwrap(), Decimal::from_str("0.12").unwrap());
        assert_eq!(
            parse_decimal("1.5e-7").unwrap(),
            Decimal::from_str("0.00000015").unwrap()
        );
        assert!(matches!(
            parse_decimal("twelve"),
            Err(StakingError::InvalidDecimal { .. })
        ));
    }
}
