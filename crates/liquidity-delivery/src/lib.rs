//! Transaction delivery for the liquidity runner.
//!
//! Handles submission of signed transactions, confirmation polling and the
//! read-only RPC calls the orchestration routines need (`eth_call`, native
//! balance, block number, chain id).

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use liquidity_account::{AccountError, AccountService};
use liquidity_types::{Transaction, TransactionHash, TransactionReceipt};
use std::sync::Arc;
use thiserror::Error;

pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

/// Errors that can occur during transaction delivery operations.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// Transport, RPC or provider setup failure.
	#[error("Network error: {0}")]
	Network(String),
	/// The node refused the transaction or an `eth_call` reverted.
	#[error("Transaction failed: {0}")]
	TransactionFailed(String),
	/// The node reported the sender cannot cover value plus gas.
	#[error("Insufficient funds: {0}")]
	InsufficientFunds(String),
}

/// Interface for transaction delivery providers.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DeliveryInterface: Send + Sync {
	/// Signs and submits a transaction, returning its hash.
	async fn submit(&self, tx: Transaction) -> Result<TransactionHash, DeliveryError>;

	/// Waits until the transaction has `confirmations` confirmations.
	///
	/// The transaction's own block counts as the first confirmation. There is
	/// no client-side timeout; a reverted transaction still yields a receipt,
	/// with `success == false`.
	async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
		confirmations: u64,
	) -> Result<TransactionReceipt, DeliveryError>;

	/// Executes a read-only call against the latest block.
	async fn call(&self, tx: Transaction) -> Result<Bytes, DeliveryError>;

	/// Native balance in wei.
	async fn get_balance(&self, address: Address) -> Result<U256, DeliveryError>;

	async fn get_block_number(&self) -> Result<u64, DeliveryError>;

	async fn get_chain_id(&self) -> Result<u64, DeliveryError>;
}

/// Service that routes delivery operations to a single provider.
///
/// Holds the account so callers can resolve the sending address, and the
/// default number of confirmations awaited after each submission.
pub struct DeliveryService {
	provider: Box<dyn DeliveryInterface>,
	account: Arc<AccountService>,
	min_confirmations: u64,
}

impl DeliveryService {
	pub fn new(
		provider: Box<dyn DeliveryInterface>,
		account: Arc<AccountService>,
		min_confirmations: u64,
	) -> Self {
		Self {
			provider,
			account,
			min_confirmations,
		}
	}

	/// Submits a transaction from the managed account.
	pub async fn deliver(&self, tx: Transaction) -> Result<TransactionHash, DeliveryError> {
		tracing::debug!(
			to = %tx.to,
			value = %tx.value,
			gas_limit = ?tx.gas_limit,
			"Delivering transaction"
		);
		self.provider.submit(tx).await
	}

	/// Waits for `confirmations` confirmations of `hash`.
	pub async fn confirm(
		&self,
		hash: &TransactionHash,
		confirmations: u64,
	) -> Result<TransactionReceipt, DeliveryError> {
		self.provider.wait_for_confirmation(hash, confirmations).await
	}

	/// Waits for the configured default number of confirmations.
	pub async fn confirm_with_default(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionReceipt, DeliveryError> {
		self.confirm(hash, self.min_confirmations).await
	}

	pub async fn call(&self, tx: Transaction) -> Result<Bytes, DeliveryError> {
		self.provider.call(tx).await
	}

	pub async fn get_balance(&self, address: Address) -> Result<U256, DeliveryError> {
		self.provider.get_balance(address).await
	}

	pub async fn get_block_number(&self) -> Result<u64, DeliveryError> {
		self.provider.get_block_number().await
	}

	pub async fn get_chain_id(&self) -> Result<u64, DeliveryError> {
		self.provider.get_chain_id().await
	}

	/// Address transactions are sent from.
	pub async fn sender(&self) -> Result<Address, AccountError> {
		self.account.get_address().await
	}

	pub fn min_confirmations(&self) -> u64 {
		self.min_confirmations
	}
}
