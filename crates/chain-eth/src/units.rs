//! Integer smallest-unit arithmetic and its decimal presentation.
//!
//! Every amount is held as a [`U256`] number of wei. Decimal strings exist
//! only at the presentation boundary and are produced from, or parsed into,
//! the same integer.

use alloy_primitives::U256;
use serde::Serialize;

use crate::error::EthError;

/// Denominations understood by the converters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Wei,
    Gwei,
    Ether,
}

impl Unit {
    pub fn decimals(self) -> u8 {
        match self {
            Unit::Wei => 0,
            Unit::Gwei => 9,
            Unit::Ether => 18,
        }
    }
}

/// One amount expressed in all three denominations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitConversion {
    pub wei: String,
    pub gwei: String,
    pub ether: String,
}

/// `10^decimals` as a U256.
pub fn pow10(decimals: u8) -> U256 {
    U256::from(10u64).pow(U256::from(decimals))
}

/// Parses a non-negative decimal string into smallest units.
///
/// `"1.5"` with 18 decimals yields `1500000000000000000`. More fractional
/// digits than `decimals` is an error rather than a silent truncation.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, EthError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(EthError::InvalidAmount("amount is empty".into()));
    }

    let (whole, fraction) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(EthError::InvalidAmount(format!("not a number: {amount}")));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(EthError::InvalidAmount(format!("not a non-negative decimal: {amount}")));
    }
    if fraction.len() > decimals as usize {
        return Err(EthError::InvalidAmount(format!(
            "too many decimal places (max {decimals}): {amount}"
        )));
    }

    let whole_value = if whole.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(whole, 10)
            .map_err(|e| EthError::InvalidAmount(format!("{amount}: {e}")))?
    };

    let padded = format!("{fraction:0<width$}", width = decimals as usize);
    let fraction_value = if padded.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(&padded, 10)
            .map_err(|e| EthError::InvalidAmount(format!("{amount}: {e}")))?
    };

    whole_value
        .checked_mul(pow10(decimals))
        .and_then(|v| v.checked_add(fraction_value))
        .ok_or_else(|| EthError::InvalidAmount(format!("amount overflows 256 bits: {amount}")))
}

/// Renders smallest units as a decimal string with trailing zeros trimmed,
/// keeping at least one fractional digit (`1000000000000000000` → `"1.0"`).
pub fn format_units(value: U256, decimals: u8) -> String {
    let divisor = pow10(decimals);
    let whole = value / divisor;
    let remainder = value % divisor;

    let fraction = format!("{:0>width$}", remainder.to_string(), width = decimals as usize);
    let trimmed = fraction.trim_end_matches('0');
    if trimmed.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{trimmed}")
    }
}

/// Renders smallest units with exactly `places` fractional digits, rounding
/// half up (`format_fixed(1e18, 18, 6)` → `"1.000000"`).
pub fn format_fixed(value: U256, decimals: u8, places: u8) -> String {
    let divisor = pow10(decimals);
    let mut whole = value / divisor;
    let remainder = value % divisor;

    let scale = pow10(places);
    let mut fraction = (remainder * scale + divisor / U256::from(2u64)) / divisor;
    if fraction >= scale {
        whole += U256::from(1u64);
        fraction -= scale;
    }

    if places == 0 {
        return whole.to_string();
    }
    format!(
        "{whole}.{:0>width$}",
        fraction.to_string(),
        width = places as usize
    )
}

pub fn parse_ether(amount: &str) -> Result<U256, EthError> {
    parse_units(amount, Unit::Ether.decimals())
}

pub fn format_ether(wei: U256) -> String {
    format_units(wei, Unit::Ether.decimals())
}

pub fn parse_gwei(amount: &str) -> Result<U256, EthError> {
    parse_units(amount, Unit::Gwei.decimals())
}

pub fn format_gwei(wei: U256) -> String {
    format_units(wei, Unit::Gwei.decimals())
}

/// Converts an amount typed in one denomination into all three.
pub fn convert_units(amount: &str, from: Unit) -> Result<UnitConversion, EthError> {
    let wei = parse_units(amount, from.decimals())?;
    Ok(UnitConversion {
        wei: wei.to_string(),
        gwei: format_units(wei, Unit::Gwei.decimals()),
        ether: format_units(wei, Unit::Ether.decimals()),
    })
}

/// Returns `true` for a `0x`-prefixed string of one or more hex digits.
pub fn is_hex_string(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Parses a JSON-RPC hex quantity (`"0x1a"`). A bare `"0x"` reads as zero.
pub fn parse_quantity(quantity: &str) -> Result<U256, EthError> {
    let digits = quantity
        .strip_prefix("0x")
        .or_else(|| quantity.strip_prefix("0X"))
        .ok_or_else(|| EthError::DecodingError(format!("quantity must start with 0x: {quantity}")))?;
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| EthError::DecodingError(format!("invalid quantity {quantity}: {e}")))
}

/// Encodes a value as a minimal JSON-RPC hex quantity.
pub fn to_quantity(value: U256) -> String {
    format!("0x{value:x}")
}
