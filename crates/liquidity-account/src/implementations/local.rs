//! Local private-key account.
//!
//! Holds a `PrivateKeySigner` parsed from a hex key, as read from
//! `PRIVATE_KEY` or the `[account]` section of the config file.

use crate::{AccountError, AccountInterface};
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use liquidity_types::{without_0x_prefix, SecretString};

/// Account backed by an in-process secp256k1 key.
#[derive(Debug)]
pub struct LocalAccount {
	signer: PrivateKeySigner,
	private_key: SecretString,
}

impl LocalAccount {
	/// Parses a hex private key, with or without `0x`.
	pub fn new(private_key: &SecretString) -> Result<Self, AccountError> {
		let normalized = private_key.with_exposed(|key| {
			SecretString::new(format!("0x{}", without_0x_prefix(key.trim())))
		});

		let signer = normalized.with_exposed(|key| {
			key.parse::<PrivateKeySigner>()
				.map_err(|_| AccountError::InvalidKey("not a 32-byte hex private key".into()))
		})?;

		Ok(Self {
			signer,
			private_key: normalized,
		})
	}
}

#[async_trait]
impl AccountInterface for LocalAccount {
	async fn address(&self) -> Result<Address, AccountError> {
		Ok(self.signer.address())
	}

	fn get_private_key(&self) -> SecretString {
		self.private_key.clone()
	}
}

/// Factory function to create a local account from a configured key.
pub fn create_account(
	private_key: &SecretString,
) -> Result<Box<dyn AccountInterface>, AccountError> {
	Ok(Box::new(LocalAccount::new(private_key)?))
}
