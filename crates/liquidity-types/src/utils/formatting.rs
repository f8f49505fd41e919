//! Display helpers for on-chain amounts and hashes.

use alloy::primitives::{I256, U256};

/// Decimal places of ether.
pub const ETHER_DECIMALS: u8 = 18;

/// Formats a raw token amount with `decimals` fractional digits.
///
/// Trailing zeros are trimmed, so `1500000` with 6 decimals prints `1.5`
/// and whole amounts print without a fractional part.
pub fn format_token_amount(amount: U256, decimals: u8) -> String {
	let digits = amount.to_string();
	if decimals == 0 {
		return digits;
	}

	let decimal_places = decimals as usize;

	let (integer_part, decimal_part) = if digits.len() <= decimal_places {
		("0".to_string(), format!("{:0>width$}", digits, width = decimal_places))
	} else {
		let split_pos = digits.len() - decimal_places;
		(
			digits[..split_pos].to_string(),
			digits[split_pos..].to_string(),
		)
	};

	let decimal_trimmed = decimal_part.trim_end_matches('0');

	if decimal_trimmed.is_empty() {
		integer_part
	} else {
		format!("{}.{}", integer_part, decimal_trimmed)
	}
}

/// Formats a wei amount as ether.
pub fn format_ether(wei: U256) -> String {
	format_token_amount(wei, ETHER_DECIMALS)
}

/// Formats a signed balance change, e.g. `-0.0012` or `+3.5`.
pub fn format_signed_amount(delta: I256, decimals: u8) -> String {
	let (sign, magnitude) = delta.into_sign_and_abs();
	let body = format_token_amount(magnitude, decimals);
	if magnitude.is_zero() {
		body
	} else if sign.is_negative() {
		format!("-{}", body)
	} else {
		format!("+{}", body)
	}
}

/// Signed difference `after - before` of two balances.
pub fn balance_delta(before: U256, after: U256) -> I256 {
	if after >= before {
		I256::from_raw(after - before)
	} else {
		-I256::from_raw(before - after)
	}
}

/// Shortens a hex string for log lines: `0x12345678..`.
pub fn truncate_id(id: &str) -> String {
	if id.len() <= 10 {
		id.to_string()
	} else {
		format!("{}..", &id[..10])
	}
}

/// Removes a leading "0x" or "0X" if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}
