//! Formatting and time helpers shared by every crate in the workspace.

pub mod formatting;
pub mod helpers;

pub use formatting::{
	balance_delta, format_ether, format_signed_amount, format_token_amount, truncate_id,
	without_0x_prefix, ETHER_DECIMALS,
};
pub use helpers::current_timestamp;
