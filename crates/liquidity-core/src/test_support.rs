//! In-memory chain for exercising the engine end to end.
//!
//! Applies the state changes of the router, token and bundler calls the
//! engine makes, records every submission with the clock reading at that
//! moment, and advances the clock on each confirmation wait.

use crate::contracts::{IERC20, ISwapAndAddLiquidity, IUniswapV2Router02};
use alloy::primitives::utils::parse_ether;
use alloy::primitives::{address, Address, Bytes, Log, B256, U256};
use alloy::sol_types::{SolCall, SolEvent, SolValue};
use async_trait::async_trait;
use liquidity_account::implementations::local::create_account;
use liquidity_account::AccountService;
use liquidity_config::{Config, DEFAULT_ROUTER, DEFAULT_TOKEN, DEFAULT_WETH};
use liquidity_delivery::{DeliveryError, DeliveryInterface};
use liquidity_types::{SecretString, Transaction, TransactionHash, TransactionReceipt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub const ROUTER: Address = DEFAULT_ROUTER;
pub const TOKEN: Address = DEFAULT_TOKEN;
pub const WETH: Address = DEFAULT_WETH;
pub const BUNDLER: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
pub const WALLET: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Seconds the clock moves forward per confirmation wait.
const BLOCK_TIME: u64 = 12;

pub fn account() -> Arc<AccountService> {
	Arc::new(AccountService::new(
		create_account(&SecretString::from(KEY)).unwrap(),
	))
}

/// Environment-style config with default contracts and amounts.
pub fn config() -> Config {
	Config::from_lookup(|name| match name {
		"RPC_URL" => Some("http://127.0.0.1:8545".to_string()),
		"PRIVATE_KEY" => Some(KEY.to_string()),
		_ => None,
	})
	.unwrap()
}

pub fn ether(amount: &str) -> U256 {
	parse_ether(amount).unwrap()
}

/// `SwapAndLiquidityAdded` log for `TOKEN` emitted by `emitter`.
pub fn liquidity_event_log(emitter: Address, user: Address, tokens_received: U256) -> Log {
	let event = ISwapAndAddLiquidity::SwapAndLiquidityAdded {
		user,
		token: TOKEN,
		ethSwapped: U256::from(1u64),
		tokensReceived: tokens_received,
		liquidityTokens: tokens_received,
		liquidityETH: U256::from(1u64),
		liquidityMinted: U256::from(1u64),
	};
	Log {
		address: emitter,
		data: event.encode_log_data(),
	}
}

#[derive(Clone, Default)]
pub struct FakeClock(Arc<AtomicU64>);

impl FakeClock {
	pub fn now(&self) -> u64 {
		self.0.load(Ordering::SeqCst)
	}

	fn set(&self, now: u64) {
		self.0.store(now, Ordering::SeqCst);
	}

	fn advance(&self, secs: u64) {
		self.0.fetch_add(secs, Ordering::SeqCst);
	}
}

/// A submitted transaction and the clock reading when it was sent.
#[derive(Debug, Clone)]
pub struct SubmittedTx {
	pub tx: Transaction,
	pub submitted_at: u64,
}

impl SubmittedTx {
	pub fn selector(&self) -> [u8; 4] {
		selector(&self.tx.data)
	}
}

fn selector(data: &[u8]) -> [u8; 4] {
	let mut selector = [0u8; 4];
	if data.len() >= 4 {
		selector.copy_from_slice(&data[..4]);
	}
	selector
}

struct State {
	eth_balance: U256,
	token_balance: U256,
	allowance: U256,
	/// Last element returned by `getAmountsOut`.
	quote: U256,
	/// Tokens credited by a swap.
	swap_output: U256,
	block_number: u64,
	submitted: Vec<SubmittedTx>,
	receipts: HashMap<TransactionHash, TransactionReceipt>,
	revert_selectors: Vec<[u8; 4]>,
	emit_events: bool,
	metadata_fails: bool,
	expected_output_queries: Vec<Bytes>,
}

#[derive(Clone)]
pub struct FakeChain {
	state: Arc<Mutex<State>>,
	clock: FakeClock,
}

impl FakeChain {
	pub fn new() -> Self {
		Self {
			state: Arc::new(Mutex::new(State {
				eth_balance: U256::ZERO,
				token_balance: U256::ZERO,
				allowance: U256::ZERO,
				quote: U256::from(1_000u64),
				swap_output: U256::from(1_000u64),
				block_number: 100,
				submitted: Vec::new(),
				receipts: HashMap::new(),
				revert_selectors: Vec::new(),
				emit_events: true,
				metadata_fails: false,
				expected_output_queries: Vec::new(),
			})),
			clock: FakeClock::default(),
		}
	}

	pub fn clock(&self) -> FakeClock {
		self.clock.clone()
	}

	pub fn set_time(&self, now: u64) {
		self.clock.set(now);
	}

	pub fn set_eth_balance(&self, balance: U256) {
		self.state.lock().unwrap().eth_balance = balance;
	}

	pub fn set_token_balance(&self, balance: U256) {
		self.state.lock().unwrap().token_balance = balance;
	}

	pub fn set_allowance(&self, allowance: U256) {
		self.state.lock().unwrap().allowance = allowance;
	}

	pub fn allowance(&self) -> U256 {
		self.state.lock().unwrap().allowance
	}

	pub fn set_quote(&self, quote: U256) {
		self.state.lock().unwrap().quote = quote;
	}

	pub fn set_swap_output(&self, output: U256) {
		self.state.lock().unwrap().swap_output = output;
	}

	/// Transactions calling `selector` are mined with a failed status.
	pub fn revert_on(&self, selector: [u8; 4]) {
		self.state.lock().unwrap().revert_selectors.push(selector);
	}

	pub fn suppress_events(&self) {
		self.state.lock().unwrap().emit_events = false;
	}

	/// Makes `symbol()` revert.
	pub fn fail_metadata(&self) {
		self.state.lock().unwrap().metadata_fails = true;
	}

	pub fn submitted(&self) -> Vec<SubmittedTx> {
		self.state.lock().unwrap().submitted.clone()
	}

	fn decode_submitted<C: SolCall>(&self) -> Vec<(SubmittedTx, C)> {
		self.submitted()
			.into_iter()
			.filter(|s| s.selector() == C::SELECTOR)
			.filter_map(|s| C::abi_decode(&s.tx.data).ok().map(|call| (s, call)))
			.collect()
	}

	pub fn submitted_swaps(&self) -> Vec<(SubmittedTx, IUniswapV2Router02::swapExactETHForTokensCall)> {
		self.decode_submitted()
	}

	pub fn submitted_liquidity(&self) -> Vec<(SubmittedTx, IUniswapV2Router02::addLiquidityETHCall)> {
		self.decode_submitted()
	}

	pub fn submitted_approvals(&self) -> Vec<IERC20::approveCall> {
		self.decode_submitted()
			.into_iter()
			.map(|(_, call)| call)
			.collect()
	}

	pub fn submitted_bundled(
		&self,
	) -> Vec<(SubmittedTx, ISwapAndAddLiquidity::swapAndAddLiquidityCall)> {
		self.decode_submitted()
	}

	pub fn expected_output_queries(&self) -> Vec<ISwapAndAddLiquidity::getExpectedTokenOutputCall> {
		self.state
			.lock()
			.unwrap()
			.expected_output_queries
			.iter()
			.map(|data| ISwapAndAddLiquidity::getExpectedTokenOutputCall::abi_decode(data).unwrap())
			.collect()
	}
}

impl State {
	/// Applies a successful transaction; returns false if it would revert.
	fn apply(&mut self, tx: &Transaction, logs: &mut Vec<Log>) -> bool {
		if tx.value > self.eth_balance {
			return false;
		}
		match selector(&tx.data) {
			IUniswapV2Router02::swapExactETHForTokensCall::SELECTOR => {
				self.eth_balance -= tx.value;
				self.token_balance += self.swap_output;
			}
			IERC20::approveCall::SELECTOR => {
				let call = IERC20::approveCall::abi_decode(&tx.data).unwrap();
				self.allowance = call.amount;
			}
			IUniswapV2Router02::addLiquidityETHCall::SELECTOR => {
				let call = IUniswapV2Router02::addLiquidityETHCall::abi_decode(&tx.data).unwrap();
				if self.allowance < call.amountTokenDesired
					|| self.token_balance < call.amountTokenDesired
				{
					return false;
				}
				self.allowance -= call.amountTokenDesired;
				self.token_balance -= call.amountTokenDesired;
				self.eth_balance -= tx.value;
			}
			ISwapAndAddLiquidity::swapAndAddLiquidityCall::SELECTOR => {
				self.eth_balance -= tx.value;
				if self.emit_events {
					let swapped = tx.value / U256::from(2u64);
					let event = ISwapAndAddLiquidity::SwapAndLiquidityAdded {
						user: WALLET,
						token: TOKEN,
						ethSwapped: swapped,
						tokensReceived: self.swap_output,
						liquidityTokens: self.swap_output,
						liquidityETH: tx.value - swapped,
						liquidityMinted: U256::from(1_000u64),
					};
					logs.push(Log {
						address: tx.to,
						data: event.encode_log_data(),
					});
				}
			}
			_ => return false,
		}
		true
	}
}

#[async_trait]
impl DeliveryInterface for FakeChain {
	async fn submit(&self, tx: Transaction) -> Result<TransactionHash, DeliveryError> {
		let mut state = self.state.lock().unwrap();
		state.submitted.push(SubmittedTx {
			tx: tx.clone(),
			submitted_at: self.clock.now(),
		});
		state.block_number += 1;

		let hash = TransactionHash(B256::with_last_byte(state.submitted.len() as u8));
		let mut logs = Vec::new();
		let success =
			!state.revert_selectors.contains(&selector(&tx.data)) && state.apply(&tx, &mut logs);
		let receipt = TransactionReceipt {
			hash,
			block_number: state.block_number,
			gas_used: 100_000,
			success,
			logs,
		};
		state.receipts.insert(hash, receipt);
		Ok(hash)
	}

	async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
		_confirmations: u64,
	) -> Result<TransactionReceipt, DeliveryError> {
		self.clock.advance(BLOCK_TIME);
		self.state
			.lock()
			.unwrap()
			.receipts
			.get(hash)
			.cloned()
			.ok_or_else(|| DeliveryError::Network(format!("Unknown transaction {}", hash)))
	}

	async fn call(&self, tx: Transaction) -> Result<Bytes, DeliveryError> {
		let mut state = self.state.lock().unwrap();
		let output = match selector(&tx.data) {
			IUniswapV2Router02::getAmountsOutCall::SELECTOR => {
				let call = IUniswapV2Router02::getAmountsOutCall::abi_decode(&tx.data).unwrap();
				vec![call.amountIn, state.quote].abi_encode()
			}
			IERC20::balanceOfCall::SELECTOR => state.token_balance.abi_encode(),
			IERC20::allowanceCall::SELECTOR => state.allowance.abi_encode(),
			IERC20::symbolCall::SELECTOR => {
				if state.metadata_fails {
					return Err(DeliveryError::TransactionFailed(
						"Call failed: execution reverted".to_string(),
					));
				}
				"LINK".to_string().abi_encode()
			}
			IERC20::decimalsCall::SELECTOR => U256::from(18u8).abi_encode(),
			ISwapAndAddLiquidity::getExpectedTokenOutputCall::SELECTOR => {
				let call =
					ISwapAndAddLiquidity::getExpectedTokenOutputCall::abi_decode(&tx.data).unwrap();
				state.expected_output_queries.push(tx.data.clone());
				(call.ethAmount * U256::from(2u64)).abi_encode()
			}
			_ => {
				return Err(DeliveryError::TransactionFailed(
					"Call failed: unknown selector".to_string(),
				))
			}
		};
		Ok(output.into())
	}

	async fn get_balance(&self, _address: Address) -> Result<U256, DeliveryError> {
		Ok(self.state.lock().unwrap().eth_balance)
	}

	async fn get_block_number(&self) -> Result<u64, DeliveryError> {
		Ok(self.state.lock().unwrap().block_number)
	}

	async fn get_chain_id(&self) -> Result<u64, DeliveryError> {
		Ok(1)
	}
}
