//! Calls against the Uniswap V2 router.

use crate::contracts::IUniswapV2Router02;
use crate::EngineError;
use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use liquidity_delivery::DeliveryService;
use liquidity_types::{Transaction, TransactionHash};
use std::sync::Arc;

/// Arguments of `swapExactETHForTokens`.
#[derive(Debug, Clone)]
pub struct SwapParams {
	pub amount_in: U256,
	pub amount_out_min: U256,
	pub path: Vec<Address>,
	pub to: Address,
	pub deadline: U256,
	pub gas_limit: u64,
}

/// Arguments of `addLiquidityETH`.
#[derive(Debug, Clone)]
pub struct AddLiquidityParams {
	pub token: Address,
	pub amount_token_desired: U256,
	pub amount_token_min: U256,
	pub amount_eth_min: U256,
	/// Wei attached to the call.
	pub eth_amount: U256,
	pub to: Address,
	pub deadline: U256,
	pub gas_limit: u64,
}

pub struct RouterClient {
	address: Address,
	delivery: Arc<DeliveryService>,
}

impl RouterClient {
	pub fn new(address: Address, delivery: Arc<DeliveryService>) -> Self {
		Self { address, delivery }
	}

	pub fn address(&self) -> Address {
		self.address
	}

	/// Output amounts along `path` for `amount_in` of its first asset.
	pub async fn get_amounts_out(
		&self,
		amount_in: U256,
		path: Vec<Address>,
	) -> Result<Vec<U256>, EngineError> {
		let call = IUniswapV2Router02::getAmountsOutCall {
			amountIn: amount_in,
			path,
		};
		let output = self
			.delivery
			.call(Transaction::call(self.address, call.abi_encode()))
			.await?;
		IUniswapV2Router02::getAmountsOutCall::abi_decode_returns(&output)
			.map_err(|e| EngineError::decode("getAmountsOut", e))
	}

	/// Quote for the last asset of `path`.
	pub async fn quote(&self, amount_in: U256, path: Vec<Address>) -> Result<U256, EngineError> {
		let amounts = self.get_amounts_out(amount_in, path).await?;
		amounts
			.last()
			.copied()
			.ok_or_else(|| EngineError::decode("getAmountsOut", "empty amounts array"))
	}

	pub async fn swap_exact_eth_for_tokens(
		&self,
		params: SwapParams,
	) -> Result<TransactionHash, EngineError> {
		let call = IUniswapV2Router02::swapExactETHForTokensCall {
			amountOutMin: params.amount_out_min,
			path: params.path,
			to: params.to,
			deadline: params.deadline,
		};
		let tx = Transaction::call(self.address, call.abi_encode())
			.with_value(params.amount_in)
			.with_gas_limit(params.gas_limit);
		Ok(self.delivery.deliver(tx).await?)
	}

	pub async fn add_liquidity_eth(
		&self,
		params: AddLiquidityParams,
	) -> Result<TransactionHash, EngineError> {
		let call = IUniswapV2Router02::addLiquidityETHCall {
			token: params.token,
			amountTokenDesired: params.amount_token_desired,
			amountTokenMin: params.amount_token_min,
			amountETHMin: params.amount_eth_min,
			to: params.to,
			deadline: params.deadline,
		};
		let tx = Transaction::call(self.address, call.abi_encode())
			.with_value(params.eth_amount)
			.with_gas_limit(params.gas_limit);
		Ok(self.delivery.deliver(tx).await?)
	}
}
