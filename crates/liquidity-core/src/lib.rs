//! Core orchestration for the liquidity runner.
//!
//! Sequences the on-chain calls that turn ETH into a Uniswap-V2 liquidity
//! position, either step by step against the router (swap, approve, add
//! liquidity) or through a single call to a deployed bundler contract.
//! Transaction construction is done here; signing, submission and receipt
//! polling are delegated to [`liquidity_delivery::DeliveryService`].

use alloy::primitives::U256;
use liquidity_account::AccountError;
use liquidity_delivery::DeliveryError;
use liquidity_types::{format_ether, TransactionHash};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub mod contracts;
pub mod engine;
pub mod report;
pub mod slippage;

#[cfg(test)]
mod test_support;

pub use engine::LiquidityEngine;
pub use report::{BundledReport, LiquidityAddedEvent, RunReport};

/// Source of the current UNIX time in seconds, used for deadlines.
pub type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

/// Returns a clock reading the system time.
pub fn system_clock() -> Clock {
	Arc::new(liquidity_types::current_timestamp)
}

/// On-chain step a transaction belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
	Swap,
	Approve,
	AddLiquidity,
	SwapAndAddLiquidity,
}

impl fmt::Display for Step {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Step::Swap => "swap",
			Step::Approve => "approve",
			Step::AddLiquidity => "add-liquidity",
			Step::SwapAndAddLiquidity => "swap-and-add-liquidity",
		};
		f.write_str(name)
	}
}

/// Errors that end a run. None of them are retried.
#[derive(Debug, Error)]
pub enum EngineError {
	/// The wallet cannot cover the run; detected before anything is sent.
	#[error(
		"Insufficient ETH balance. Required: {}, Available: {}",
		eth(.required),
		eth(.available)
	)]
	InsufficientFunds {
		required: U256,
		available: U256,
	},
	/// A submitted transaction was mined with a failed status.
	#[error("{step} transaction {hash} reverted in block {block_number}")]
	Reverted {
		step: Step,
		hash: TransactionHash,
		block_number: u64,
	},
	/// The swap was mined but left the wallet without tokens.
	#[error("No tokens received from swap")]
	NoTokensReceived,
	/// Return data of a read-only call could not be decoded.
	#[error("Failed to decode {call} result: {message}")]
	Decode { call: &'static str, message: String },
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Delivery error: {0}")]
	Delivery(#[from] DeliveryError),
	#[error("Account error: {0}")]
	Account(#[from] AccountError),
}

impl EngineError {
	pub(crate) fn decode(call: &'static str, err: impl fmt::Display) -> Self {
		EngineError::Decode {
			call,
			message: err.to_string(),
		}
	}

	/// Human hint for well-known failure causes, if one applies.
	pub fn diagnosis(&self) -> Option<&'static str> {
		match self {
			EngineError::InsufficientFunds { .. }
			| EngineError::Delivery(DeliveryError::InsufficientFunds(_)) => {
				Some("Insufficient ETH balance for transaction")
			}
			EngineError::NoTokensReceived => {
				Some("The swap returned nothing; check the pool has liquidity")
			}
			EngineError::Reverted { .. } => Some("Contract reverted the transaction"),
			EngineError::Delivery(
				DeliveryError::TransactionFailed(message) | DeliveryError::Network(message),
			) => diagnose_message(message),
			_ => None,
		}
	}
}

fn eth(wei: &U256) -> String {
	format_ether(*wei)
}

/// Maps router and node error strings to a hint.
fn diagnose_message(message: &str) -> Option<&'static str> {
	let upper = message.to_uppercase();
	if upper.contains("INSUFFICIENT_OUTPUT_AMOUNT")
		|| upper.contains("INSUFFICIENT_A_AMOUNT")
		|| upper.contains("INSUFFICIENT_B_AMOUNT")
	{
		Some("Slippage too high - try increasing slippage tolerance")
	} else if upper.contains("EXPIRED") {
		Some("Transaction deadline expired")
	} else if upper.contains("INSUFFICIENT FUNDS") {
		Some("Insufficient ETH balance for transaction")
	} else if upper.contains("GAS REQUIRED EXCEEDS")
		|| upper.contains("CANNOT ESTIMATE GAS")
		|| upper.contains("UNPREDICTABLE_GAS_LIMIT")
	{
		Some("Gas estimation failed - transaction would likely fail")
	} else if upper.contains("EXECUTION REVERTED") {
		Some("Contract reverted the call")
	} else {
		None
	}
}
