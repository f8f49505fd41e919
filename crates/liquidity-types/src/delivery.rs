//! Transaction delivery types.
//!
//! These are the values exchanged between the orchestration routines and the
//! RPC layer: an unsigned call description going out, a hash and a receipt
//! coming back.

use alloy::primitives::{Address, Bytes, Log, TxKind, B256, U256};
use alloy::rpc::types::{TransactionInput, TransactionRequest};
use std::fmt;

/// Unsigned contract call submitted by the signing wallet.
///
/// Nonce, chain id and fee fields are left to the provider's fillers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
	/// Contract being called.
	pub to: Address,
	/// ABI-encoded calldata.
	pub data: Bytes,
	/// Wei attached to the call.
	pub value: U256,
	/// Fixed gas limit; `None` lets the provider estimate.
	pub gas_limit: Option<u64>,
}

impl Transaction {
	/// A call with no value and an estimated gas limit.
	pub fn call(to: Address, data: impl Into<Bytes>) -> Self {
		Self {
			to,
			data: data.into(),
			value: U256::ZERO,
			gas_limit: None,
		}
	}

	pub fn with_value(mut self, value: U256) -> Self {
		self.value = value;
		self
	}

	pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
		self.gas_limit = Some(gas_limit);
		self
	}
}

impl From<Transaction> for TransactionRequest {
	fn from(tx: Transaction) -> Self {
		TransactionRequest {
			to: Some(TxKind::Call(tx.to)),
			value: Some(tx.value),
			input: TransactionInput::new(tx.data),
			gas: tx.gas_limit,
			..Default::default()
		}
	}
}

/// Hash of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionHash(pub B256);

impl fmt::Display for TransactionHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<B256> for TransactionHash {
	fn from(hash: B256) -> Self {
		Self(hash)
	}
}

/// Outcome of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
	/// The hash of the transaction.
	pub hash: TransactionHash,
	/// Block the transaction was included in.
	pub block_number: u64,
	/// Gas consumed by execution.
	pub gas_used: u64,
	/// False when the transaction reverted.
	pub success: bool,
	/// Logs emitted during execution, in order.
	pub logs: Vec<Log>,
}
