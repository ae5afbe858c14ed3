//! Decimal formatting of base-unit amounts.
//!
//! Formatting always prints the exact value (integer part, then the
//! fraction with trailing zeros trimmed), and [`parse_fixed`] reconstructs
//! the original integer from the printed string.

use alloy_primitives::{I256, U256};
use eyre::{bail, eyre};

/// Decimals of the native token.
pub const WEI_DECIMALS: u32 = 18;

/// Format a wei amount as a decimal ether string.
pub fn format_wei(amount: U256) -> String {
    format_units(amount, WEI_DECIMALS)
}

/// Format an unsigned base-unit amount with the given number of decimals.
pub fn format_units(amount: U256, base_decimals: u32) -> String {
    let divisor = U256::from(10u8).pow(U256::from(base_decimals));
    let int_part = amount / divisor;
    let remainder = amount % divisor;

    let mut result = int_part.to_string();

    if !remainder.is_zero() {
        let remainder_str = remainder.to_string();
        let padded = format!(
            "{}{}",
            "0".repeat(base_decimals as usize - remainder_str.len()),
            remainder_str
        );
        let trimmed = padded.trim_end_matches('0');
        if !trimmed.is_empty() {
            result.push('.');
            result.push_str(trimmed);
        }
    }

    result
}

/// Format a signed base-unit amount with the given number of decimals.
pub fn format_fixed(amount: I256, base_decimals: u32) -> String {
    let formatted = format_units(amount.unsigned_abs(), base_decimals);
    if amount.is_negative() {
        format!("-{formatted}")
    } else {
        formatted
    }
}

/// Parse a decimal string back into a signed base-unit amount.
///
/// Inverse of [`format_fixed`]: any formatted amount round-trips exactly.
/// Rejects fractions with more digits than `base_decimals` can hold.
pub fn parse_fixed(input: &str, base_decimals: u32) -> eyre::Result<I256> {
    let trimmed = input.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (digits, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        bail!("empty amount: {input:?}");
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        bail!("malformed decimal amount: {input:?}");
    }
    if frac_part.len() > base_decimals as usize {
        bail!(
            "amount {input:?} has more than {base_decimals} decimal places"
        );
    }

    let scale = U256::from(10u8).pow(U256::from(base_decimals));
    let int_value = if int_part.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(int_part, 10).map_err(|e| eyre!("invalid integer part: {e}"))?
    };
    let frac_value = if frac_part.is_empty() {
        U256::ZERO
    } else {
        let raw =
            U256::from_str_radix(frac_part, 10).map_err(|e| eyre!("invalid fraction: {e}"))?;
        raw * U256::from(10u8).pow(U256::from(base_decimals as usize - frac_part.len()))
    };

    let magnitude = int_value
        .checked_mul(scale)
        .and_then(|scaled| scaled.checked_add(frac_value))
        .ok_or_else(|| eyre!("amount {input:?} overflows"))?;

    let signed = I256::try_from(magnitude).map_err(|_| eyre!("amount {input:?} overflows"))?;
    Ok(if negative { -signed } else { signed })
}
