// src/utils.rs

use crate::blockchain::models::{SATS_PER_NEXA, WalletError};

/// Renders smallest units as NEXA with two fractional digits: `12350` -> `"123.50"`.
pub fn format_nexa(satoshis: u64) -> String {
    format!("{}.{:02}", satoshis / SATS_PER_NEXA, satoshis % SATS_PER_NEXA)
}

/// Parses a NEXA display amount into smallest units.
///
/// The decimal string is read digit by digit, never through a float. Digits
/// past the second fractional place are truncated.
pub fn parse_nexa(nexa: &str) -> Result<u64, WalletError> {
    let input = nexa.trim();
    let invalid = || WalletError::InvalidAmount(format!("'{}' is not a valid NEXA amount", nexa));

    let (whole, fraction) = match input.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (input, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let whole_units = if whole.is_empty() {
        0
    } else {
        whole.parse::<u64>().map_err(|_| invalid())?
    };
    let cents = fraction
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(2)
        .fold(0u64, |acc, b| acc * 10 + u64::from(b - b'0'));

    whole_units
        .checked_mul(SATS_PER_NEXA)
        .and_then(|sats| sats.checked_add(cents))
        .ok_or_else(invalid)
}
