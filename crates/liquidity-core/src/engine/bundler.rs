//! Calls against the swap-and-add-liquidity bundler contract.

use crate::contracts::ISwapAndAddLiquidity::{self, SwapAndLiquidityAdded};
use crate::report::LiquidityAddedEvent;
use crate::EngineError;
use alloy::primitives::{Address, U256};
use alloy::sol_types::{SolCall, SolEvent};
use liquidity_delivery::DeliveryService;
use liquidity_types::{Transaction, TransactionHash, TransactionReceipt};
use std::sync::Arc;

pub struct BundlerClient {
	address: Address,
	delivery: Arc<DeliveryService>,
}

impl BundlerClient {
	pub fn new(address: Address, delivery: Arc<DeliveryService>) -> Self {
		Self { address, delivery }
	}

	/// Tokens the bundler expects to receive for `eth_amount` wei.
	pub async fn expected_token_output(
		&self,
		token: Address,
		eth_amount: U256,
	) -> Result<U256, EngineError> {
		let call = ISwapAndAddLiquidity::getExpectedTokenOutputCall {
			token,
			ethAmount: eth_amount,
		};
		let output = self
			.delivery
			.call(Transaction::call(self.address, call.abi_encode()))
			.await?;
		ISwapAndAddLiquidity::getExpectedTokenOutputCall::abi_decode_returns(&output)
			.map_err(|e| EngineError::decode("getExpectedTokenOutput", e))
	}

	/// Sends `value` wei to be half swapped and fully provided as liquidity.
	pub async fn swap_and_add_liquidity(
		&self,
		token: Address,
		swap_slippage_bps: u16,
		liquidity_slippage_bps: u16,
		value: U256,
		gas_limit: u64,
	) -> Result<TransactionHash, EngineError> {
		let call = ISwapAndAddLiquidity::swapAndAddLiquidityCall {
			token,
			swapSlippageBps: U256::from(swap_slippage_bps),
			liquiditySlippageBps: U256::from(liquidity_slippage_bps),
		};
		let tx = Transaction::call(self.address, call.abi_encode())
			.with_value(value)
			.with_gas_limit(gas_limit);
		Ok(self.delivery.deliver(tx).await?)
	}

	/// First `SwapAndLiquidityAdded` event this contract emitted in `receipt`.
	///
	/// Logs from other addresses, and logs that fail to decode, are ignored.
	pub fn find_liquidity_event(&self, receipt: &TransactionReceipt) -> Option<LiquidityAddedEvent> {
		receipt
			.logs
			.iter()
			.filter(|log| log.address == self.address)
			.filter(|log| log.data.topics().first() == Some(&SwapAndLiquidityAdded::SIGNATURE_HASH))
			.find_map(|log| SwapAndLiquidityAdded::decode_log_data(&log.data).ok())
			.map(|event| LiquidityAddedEvent {
				user: event.user,
				token: event.token,
				eth_swapped: event.ethSwapped,
				tokens_received: event.tokensReceived,
				liquidity_tokens: event.liquidityTokens,
				liquidity_eth: event.liquidityETH,
				liquidity_minted: event.liquidityMinted,
			})
	}
}
