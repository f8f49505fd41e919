//! Minimum-amount and deadline arithmetic.
//!
//! All bounds truncate toward zero and are computed without intermediate
//! overflow for any `U256` input.

use alloy::primitives::U256;

/// Share of a quote accepted as the minimum, out of [`SLIPPAGE_DENOMINATOR`].
pub const SLIPPAGE_NUMERATOR: u64 = 95;
pub const SLIPPAGE_DENOMINATOR: u64 = 100;

/// Basis points in one whole.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Seconds a submitted router call stays valid.
pub const DEADLINE_WINDOW_SECS: u64 = 300;

/// `value * numerator / denominator`, truncating, without overflowing.
fn scale_down(value: U256, numerator: u64, denominator: u64) -> U256 {
	let numerator = U256::from(numerator);
	let denominator = U256::from(denominator);
	value / denominator * numerator + value % denominator * numerator / denominator
}

/// Minimum acceptable output for `quoted`: 95% of it, truncated.
pub fn min_with_slippage(quoted: U256) -> U256 {
	scale_down(quoted, SLIPPAGE_NUMERATOR, SLIPPAGE_DENOMINATOR)
}

/// `amount` reduced by `bps` basis points. `bps` above 10000 yields zero.
pub fn apply_slippage_bps(amount: U256, bps: u16) -> U256 {
	let kept = BPS_DENOMINATOR.saturating_sub(u64::from(bps));
	scale_down(amount, kept, BPS_DENOMINATOR)
}

/// Deadline for a transaction submitted at `now` (UNIX seconds).
pub fn deadline_at(now: u64) -> U256 {
	U256::from(now) + U256::from(DEADLINE_WINDOW_SECS)
}
