//! ERC20 operations for the single token a run provides liquidity for.
//!
//! The `TokenManager` reads balances and allowances through `eth_call` and
//! submits approvals from the runner's wallet.
//!
//! # Approvals
//!
//! An approval is only sent when the current allowance is strictly below the
//! amount about to be spent, and it approves exactly that amount. Unlimited
//! approvals are never issued.

use super::confirm_step;
use crate::contracts::IERC20;
use crate::{EngineError, Step};
use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use liquidity_delivery::DeliveryService;
use liquidity_types::{Transaction, TransactionHash};
use std::sync::Arc;

/// Display metadata of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
	pub symbol: String,
	pub decimals: u8,
}

/// Returns true when `current` allowance cannot cover `required`.
pub fn needs_approval(current: U256, required: U256) -> bool {
	current < required
}

/// Reads and approves one ERC20 token on behalf of the runner's wallet.
pub struct TokenManager {
	/// Token contract address.
	token: Address,
	/// Service used for calls and approval submission.
	delivery: Arc<DeliveryService>,
	/// Fixed gas limit for approvals; `None` lets the provider estimate.
	approve_gas_limit: Option<u64>,
}

impl TokenManager {
	pub fn new(token: Address, delivery: Arc<DeliveryService>, approve_gas_limit: Option<u64>) -> Self {
		Self {
			token,
			delivery,
			approve_gas_limit,
		}
	}

	pub fn address(&self) -> Address {
		self.token
	}

	/// Token balance of `owner` in raw units.
	pub async fn balance_of(&self, owner: Address) -> Result<U256, EngineError> {
		let call = IERC20::balanceOfCall { owner };
		let output = self
			.delivery
			.call(Transaction::call(self.token, call.abi_encode()))
			.await?;
		IERC20::balanceOfCall::abi_decode_returns(&output)
			.map_err(|e| EngineError::decode("balanceOf", e))
	}

	/// Amount `spender` may currently move from `owner`.
	pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, EngineError> {
		let call = IERC20::allowanceCall { owner, spender };
		let output = self
			.delivery
			.call(Transaction::call(self.token, call.abi_encode()))
			.await?;
		IERC20::allowanceCall::abi_decode_returns(&output)
			.map_err(|e| EngineError::decode("allowance", e))
	}

	/// Fetches symbol and decimals.
	pub async fn metadata(&self) -> Result<TokenMetadata, EngineError> {
		let output = self
			.delivery
			.call(Transaction::call(self.token, IERC20::symbolCall {}.abi_encode()))
			.await?;
		let symbol = IERC20::symbolCall::abi_decode_returns(&output)
			.map_err(|e| EngineError::decode("symbol", e))?;

		let output = self
			.delivery
			.call(Transaction::call(self.token, IERC20::decimalsCall {}.abi_encode()))
			.await?;
		let decimals = IERC20::decimalsCall::abi_decode_returns(&output)
			.map_err(|e| EngineError::decode("decimals", e))?;

		Ok(TokenMetadata { symbol, decimals })
	}

	/// Makes sure `spender` may move `amount` from `owner`.
	///
	/// Returns the hash of the confirmed approval, or `None` when the existing
	/// allowance was already sufficient and nothing was sent.
	pub async fn ensure_allowance(
		&self,
		owner: Address,
		spender: Address,
		amount: U256,
	) -> Result<Option<TransactionHash>, EngineError> {
		let current = self.allowance(owner, spender).await?;
		if !needs_approval(current, amount) {
			tracing::info!(
				allowance = %current,
				required = %amount,
				"Allowance sufficient, skipping approval"
			);
			return Ok(None);
		}

		tracing::info!(
			allowance = %current,
			required = %amount,
			spender = %spender,
			"Approving token spend"
		);
		let hash = self.submit_approval(spender, amount).await?;
		confirm_step(&self.delivery, Step::Approve, &hash).await?;
		Ok(Some(hash))
	}

	/// Submits `approve(spender, amount)` without waiting for it.
	async fn submit_approval(
		&self,
		spender: Address,
		amount: U256,
	) -> Result<TransactionHash, EngineError> {
		let call = IERC20::approveCall { spender, amount };
		let mut tx = Transaction::call(self.token, call.abi_encode());
		if let Some(gas_limit) = self.approve_gas_limit {
			tx = tx.with_gas_limit(gas_limit);
		}
		Ok(self.delivery.deliver(tx).await?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::{account, FakeChain, TOKEN};
	use alloy::primitives::address;

	const ROUTER: Address = address!("7a250d5630B4cF539739dF2C5dAcb4c659F2488D");

	fn manager(chain: &FakeChain) -> TokenManager {
		let delivery = Arc::new(DeliveryService::new(Box::new(chain.clone()), account(), 1));
		TokenManager::new(TOKEN, delivery, None)
	}

	#[test]
	fn test_needs_approval_only_when_strictly_less() {
		assert!(needs_approval(U256::ZERO, U256::from(1u64)));
		assert!(needs_approval(U256::from(99u64), U256::from(100u64)));
		assert!(!needs_approval(U256::from(100u64), U256::from(100u64)));
		assert!(!needs_approval(U256::from(101u64), U256::from(100u64)));
		assert!(!needs_approval(U256::ZERO, U256::ZERO));
	}

	#[tokio::test]
	async fn test_ensure_allowance_approves_exact_amount() {
		let chain = FakeChain::new();
		chain.set_allowance(U256::from(10u64));
		let tokens = manager(&chain);
		let owner = tokens.delivery.sender().await.unwrap();

		let hash = tokens
			.ensure_allowance(owner, ROUTER, U256::from(500u64))
			.await
			.unwrap();

		assert!(hash.is_some());
		let approvals = chain.submitted_approvals();
		assert_eq!(approvals.len(), 1);
		assert_eq!(approvals[0].spender, ROUTER);
		assert_eq!(approvals[0].amount, U256::from(500u64));
		assert_eq!(chain.allowance(), U256::from(500u64));
	}

	#[tokio::test]
	async fn test_ensure_allowance_skips_when_equal() {
		let chain = FakeChain::new();
		chain.set_allowance(U256::from(500u64));
		let tokens = manager(&chain);
		let owner = tokens.delivery.sender().await.unwrap();

		let hash = tokens
			.ensure_allowance(owner, ROUTER, U256::from(500u64))
			.await
			.unwrap();

		assert!(hash.is_none());
		assert!(chain.submitted().is_empty());
	}

	#[tokio::test]
	async fn test_approve_gas_limit_is_applied() {
		let chain = FakeChain::new();
		let delivery = Arc::new(DeliveryService::new(Box::new(chain.clone()), account(), 1));
		let tokens = TokenManager::new(TOKEN, delivery, Some(60_000));
		let owner = tokens.delivery.sender().await.unwrap();

		tokens
			.ensure_allowance(owner, ROUTER, U256::from(1u64))
			.await
			.unwrap();

		assert_eq!(chain.submitted()[0].tx.gas_limit, Some(60_000));
	}

	#[tokio::test]
	async fn test_metadata() {
		let chain = FakeChain::new();
		let metadata = manager(&chain).metadata().await.unwrap();
		assert_eq!(metadata.symbol, "LINK");
		assert_eq!(metadata.decimals, 18);
	}

	#[tokio::test]
	async fn test_balance_of() {
		let chain = FakeChain::new();
		chain.set_token_balance(U256::from(1234u64));
		let tokens = manager(&chain);
		let owner = tokens.delivery.sender().await.unwrap();
		assert_eq!(tokens.balance_of(owner).await.unwrap(), U256::from(1234u64));
	}
}
