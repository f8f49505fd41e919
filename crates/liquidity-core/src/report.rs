//! Outcome of a completed run, printed by the binary.

use alloy::primitives::{Address, U256};
use liquidity_types::{
	balance_delta, format_ether, format_signed_amount, format_token_amount, TransactionHash,
};
use std::fmt;
use std::time::Duration;

/// Result of the sequential swap, approve and add-liquidity routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
	pub swap_hash: TransactionHash,
	/// Approval transaction, `None` when the allowance already covered the balance.
	pub approval_hash: Option<TransactionHash>,
	pub liquidity_hash: TransactionHash,
	pub tokens_received: U256,
	pub final_token_balance: U256,
	pub final_eth_balance: U256,
	pub token_decimals: u8,
}

impl fmt::Display for RunReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "Swap tx:           {}", self.swap_hash)?;
		match &self.approval_hash {
			Some(hash) => writeln!(f, "Approve tx:        {}", hash)?,
			None => writeln!(f, "Approve tx:        skipped (allowance sufficient)")?,
		}
		writeln!(f, "Add liquidity tx:  {}", self.liquidity_hash)?;
		writeln!(
			f,
			"Tokens received:   {}",
			format_token_amount(self.tokens_received, self.token_decimals)
		)?;
		writeln!(
			f,
			"Final token balance: {}",
			format_token_amount(self.final_token_balance, self.token_decimals)
		)?;
		write!(f, "Final ETH balance: {}", format_ether(self.final_eth_balance))
	}
}

/// Decoded `SwapAndLiquidityAdded` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityAddedEvent {
	pub user: Address,
	pub token: Address,
	pub eth_swapped: U256,
	pub tokens_received: U256,
	pub liquidity_tokens: U256,
	pub liquidity_eth: U256,
	pub liquidity_minted: U256,
}

/// Result of the single-transaction bundled routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundledReport {
	pub hash: TransactionHash,
	pub block_number: u64,
	pub gas_used: u64,
	/// Missing when the receipt carried no event from the bundler.
	pub event: Option<LiquidityAddedEvent>,
	pub initial_eth_balance: U256,
	pub final_eth_balance: U256,
	pub initial_token_balance: U256,
	pub final_token_balance: U256,
	pub token_symbol: Option<String>,
	pub token_decimals: u8,
	/// Time from submission to confirmation.
	pub elapsed: Duration,
}

impl BundledReport {
	pub fn eth_change(&self) -> String {
		format_signed_amount(
			balance_delta(self.initial_eth_balance, self.final_eth_balance),
			liquidity_types::ETHER_DECIMALS,
		)
	}

	pub fn token_change(&self) -> String {
		format_signed_amount(
			balance_delta(self.initial_token_balance, self.final_token_balance),
			self.token_decimals,
		)
	}
}

impl fmt::Display for BundledReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let symbol = self.token_symbol.as_deref().unwrap_or("tokens");
		writeln!(f, "Transaction:     {}", self.hash)?;
		writeln!(f, "Block:           {}", self.block_number)?;
		writeln!(f, "Gas used:        {}", self.gas_used)?;
		writeln!(f, "Confirmed in:    {} ms", self.elapsed.as_millis())?;
		if let Some(event) = &self.event {
			writeln!(f, "ETH swapped:     {}", format_ether(event.eth_swapped))?;
			writeln!(
				f,
				"Tokens received: {} {}",
				format_token_amount(event.tokens_received, self.token_decimals),
				symbol
			)?;
			writeln!(
				f,
				"Liquidity:       {} {} + {} ETH",
				format_token_amount(event.liquidity_tokens, self.token_decimals),
				symbol,
				format_ether(event.liquidity_eth)
			)?;
			writeln!(f, "LP minted:       {}", format_ether(event.liquidity_minted))?;
		}
		writeln!(f, "ETH change:      {}", self.eth_change())?;
		write!(f, "Token change:    {} {}", self.token_change(), symbol)
	}
}
