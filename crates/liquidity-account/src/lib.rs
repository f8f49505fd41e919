//! Account management for the liquidity runner.
//!
//! Wraps the signing identity behind [`AccountInterface`] so the rest of the
//! workspace only sees an address and, for the delivery layer, the key that
//! backs its wallet.

use alloy::primitives::Address;
use async_trait::async_trait;
use liquidity_types::SecretString;
use thiserror::Error;

pub mod implementations {
	pub mod local;
}

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// Error that occurs when a cryptographic key is invalid or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
}

/// Interface for account implementations.
#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// Address that signs and pays for every transaction.
	async fn address(&self) -> Result<Address, AccountError>;

	/// Private key with `0x` prefix, handed to the delivery layer's wallet.
	fn get_private_key(&self) -> SecretString;
}

/// High-level handle over an account implementation.
pub struct AccountService {
	implementation: Box<dyn AccountInterface>,
}

impl AccountService {
	pub fn new(implementation: Box<dyn AccountInterface>) -> Self {
		Self { implementation }
	}

	/// Retrieves the address associated with the managed account.
	pub async fn get_address(&self) -> Result<Address, AccountError> {
		self.implementation.address().await
	}

	/// Returns the private key for wallet construction.
	pub fn get_private_key(&self) -> SecretString {
		self.implementation.get_private_key()
	}
}
