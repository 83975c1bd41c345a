//! Raw token amounts and decimal unit conversion.
//!
//! Amounts are fixed-point integers (u128) to avoid floating-point errors.
//! The smallest unit is 1 raw; one whole token is `10^DECIMALS` raw.

use primitive_types::U256;
use thiserror::Error;

/// Decimal places of a whole token.
pub const DECIMALS: u32 = 18;

/// One whole token in raw units.
pub const UNIT: u128 = 1_000_000_000_000_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount string is empty")]
    Empty,

    #[error("invalid digit in amount {0:?}")]
    InvalidDigit(String),

    #[error("amount has more than {decimals} decimal places")]
    TooManyDecimals { decimals: u32 },

    #[error("amount does not fit in 128 bits")]
    Overflow,
}

/// Parse a decimal string such as `"1000000"` or `"0.25"` into raw units.
pub fn parse_units(s: &str, decimals: u32) -> Result<u128, AmountError> {
    let s = s.trim();
    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(AmountError::Empty);
    }
    if frac.len() > decimals as usize {
        return Err(AmountError::TooManyDecimals { decimals });
    }
    let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if !all_digits(whole) || !all_digits(frac) {
        return Err(AmountError::InvalidDigit(s.to_string()));
    }

    let scale = 10u128.checked_pow(decimals).ok_or(AmountError::Overflow)?;
    let whole_raw = if whole.is_empty() {
        0
    } else {
        whole.parse::<u128>().map_err(|_| AmountError::Overflow)?
    };
    let frac_raw = if frac.is_empty() {
        0
    } else {
        format!("{:0<width$}", frac, width = decimals as usize)
            .parse::<u128>()
            .map_err(|_| AmountError::Overflow)?
    };
    whole_raw
        .checked_mul(scale)
        .and_then(|w| w.checked_add(frac_raw))
        .ok_or(AmountError::Overflow)
}

/// Parse whole tokens at the default 18 decimals.
pub fn parse_ether(s: &str) -> Result<u128, AmountError> {
    parse_units(s, DECIMALS)
}

/// Render raw units as a decimal string, trimming trailing zeros.
pub fn format_units(raw: u128, decimals: u32) -> String {
    let Some(scale) = 10u128.checked_pow(decimals) else {
        return raw.to_string();
    };
    let whole = raw / scale;
    let frac = raw % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0>width$}", frac, width = decimals as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// `value` as a `u128`, or `None` when it needs more than 128 bits.
pub fn narrow(value: U256) -> Option<u128> {
    (value.bits() <= 128).then(|| value.low_u128())
}

/// [`format_units`] for values that may exceed `u128`.
pub fn format_wide_units(raw: U256, decimals: u32) -> String {
    if let Some(raw) = narrow(raw) {
        return format_units(raw, decimals);
    }
    let digits = raw.to_string();
    let (whole, frac) = digits.split_at(digits.len().saturating_sub(decimals as usize));
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{frac}")
    }
}
