//! Alloy-based EVM delivery implementation.
//!
//! Uses a wallet-filling HTTP provider: nonce, chain id, gas price and
//! signature are filled in by alloy, so a [`Transaction`] only has to carry
//! target, calldata, value and an optional gas limit.

use crate::{DeliveryError, DeliveryInterface};
use alloy::network::EthereumWallet;
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt as RpcReceipt, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use liquidity_types::{SecretString, Transaction, TransactionHash, TransactionReceipt};
use std::time::Duration;

/// Delivery over a single HTTP JSON-RPC endpoint with a local signer.
pub struct AlloyDelivery {
	provider: DynProvider,
	/// Interval between receipt polls.
	poll_interval: Duration,
}

impl AlloyDelivery {
	/// Creates a provider for `rpc_url` that signs with `private_key`.
	///
	/// When `expected_chain_id` is set the endpoint is queried once and a
	/// mismatch is rejected, so a mainnet key is never pointed at the wrong
	/// network by accident.
	pub async fn new(
		rpc_url: &str,
		private_key: &SecretString,
		poll_interval: Duration,
		expected_chain_id: Option<u64>,
	) -> Result<Self, DeliveryError> {
		let url: Url = rpc_url
			.parse()
			.map_err(|e| DeliveryError::Network(format!("Invalid RPC URL: {}", e)))?;

		let signer: PrivateKeySigner = private_key.with_exposed(|key| {
			key.parse()
				.map_err(|_| DeliveryError::Network("Invalid private key format".to_string()))
		})?;
		let wallet = EthereumWallet::from(signer);

		let provider = ProviderBuilder::new()
			.wallet(wallet)
			.connect_http(url)
			.erased();

		let delivery = Self {
			provider,
			poll_interval,
		};

		if let Some(expected) = expected_chain_id {
			let actual = delivery.get_chain_id().await?;
			if actual != expected {
				return Err(DeliveryError::Network(format!(
					"RPC endpoint is on chain {} but chain {} was configured",
					actual, expected
				)));
			}
		}

		Ok(delivery)
	}
}

/// Converts an RPC receipt into the workspace receipt type.
fn convert_receipt(receipt: &RpcReceipt) -> TransactionReceipt {
	TransactionReceipt {
		hash: TransactionHash(receipt.transaction_hash),
		block_number: receipt.block_number.unwrap_or(0),
		gas_used: receipt.gas_used,
		success: receipt.status(),
		logs: receipt
			.inner
			.logs()
			.iter()
			.map(|log| log.inner.clone())
			.collect(),
	}
}

/// Maps a node rejection to a delivery error.
///
/// Nodes report an unfunded sender with a message containing
/// "insufficient funds"; that case gets its own variant.
fn classify_send_error(message: String) -> DeliveryError {
	if message.to_lowercase().contains("insufficient funds") {
		DeliveryError::InsufficientFunds(message)
	} else {
		DeliveryError::TransactionFailed(message)
	}
}

/// True once a transaction mined in `tx_block` has `confirmations`
/// confirmations at `current_block`.
fn is_confirmed(tx_block: u64, current_block: u64, confirmations: u64) -> bool {
	current_block.saturating_add(1).saturating_sub(tx_block) >= confirmations
}

#[async_trait]
impl DeliveryInterface for AlloyDelivery {
	async fn submit(&self, tx: Transaction) -> Result<TransactionHash, DeliveryError> {
		let request: TransactionRequest = tx.into();

		let pending_tx = self
			.provider
			.send_transaction(request)
			.await
			.map_err(|e| classify_send_error(format!("Failed to send transaction: {}", e)))?;

		let tx_hash = TransactionHash(*pending_tx.tx_hash());
		tracing::info!(tx_hash = %tx_hash, "Submitted transaction");

		Ok(tx_hash)
	}

	async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
		confirmations: u64,
	) -> Result<TransactionReceipt, DeliveryError> {
		tracing::info!(tx_hash = %hash, "Waiting for {} confirmation(s)", confirmations);

		loop {
			let receipt = match self.provider.get_transaction_receipt(hash.0).await {
				Ok(Some(receipt)) => receipt,
				Ok(None) => {
					// Not mined yet
					tokio::time::sleep(self.poll_interval).await;
					continue;
				}
				Err(e) => {
					return Err(DeliveryError::Network(format!(
						"Failed to get receipt: {}",
						e
					)));
				}
			};

			let current_block = self.get_block_number().await?;
			let tx_block = receipt.block_number.unwrap_or(current_block);

			if is_confirmed(tx_block, current_block, confirmations) {
				return Ok(convert_receipt(&receipt));
			}

			tracing::debug!(
				tx_hash = %hash,
				"Waiting for {} more confirmation(s)",
				confirmations.saturating_sub(current_block.saturating_add(1).saturating_sub(tx_block))
			);

			tokio::time::sleep(self.poll_interval).await;
		}
	}

	async fn call(&self, tx: Transaction) -> Result<Bytes, DeliveryError> {
		let request: TransactionRequest = tx.into();
		self.provider
			.call(request)
			.await
			.map_err(|e| DeliveryError::TransactionFailed(format!("Call failed: {}", e)))
	}

	async fn get_balance(&self, address: Address) -> Result<U256, DeliveryError> {
		self.provider
			.get_balance(address)
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to get balance: {}", e)))
	}

	async fn get_block_number(&self) -> Result<u64, DeliveryError> {
		self.provider
			.get_block_number()
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to get block number: {}", e)))
	}

	async fn get_chain_id(&self) -> Result<u64, DeliveryError> {
		self.provider
			.get_chain_id()
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to get chain id: {}", e)))
	}
}

/// Factory function to create an HTTP delivery provider.
pub async fn create_http_delivery(
	rpc_url: &str,
	private_key: &SecretString,
	poll_interval: Duration,
	expected_chain_id: Option<u64>,
) -> Result<Box<dyn DeliveryInterface>, DeliveryError> {
	let delivery = AlloyDelivery::new(rpc_url, private_key, poll_interval, expected_chain_id).await?;
	Ok(Box::new(delivery))
}
