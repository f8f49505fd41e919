//! Common types for the liquidity runner.
//!
//! Shared value types used by the config, account, delivery and core crates,
//! kept in one place so every layer agrees on them.

/// Transaction delivery types for blockchain interactions.
pub mod delivery;
/// Redacted string type for key material.
pub mod secret_string;
/// Utility functions for formatting and timestamps.
pub mod utils;

pub use delivery::*;
pub use secret_string::SecretString;
pub use utils::{
	balance_delta, current_timestamp, format_ether, format_signed_amount, format_token_amount,
	truncate_id, without_0x_prefix, ETHER_DECIMALS,
};
