//! Liquidity engine that runs the swap and add-liquidity routines.
//!
//! Every call is awaited before the next one is made and nothing is retried:
//! the first failure ends the run. Transactions that move funds are only sent
//! after the wallet's ETH balance has been checked against the configured
//! threshold.

pub mod bundler;
pub mod router;
pub mod token_manager;

use crate::report::{BundledReport, RunReport};
use crate::slippage::{apply_slippage_bps, deadline_at, min_with_slippage};
use crate::{system_clock, Clock, EngineError, Step};
use alloy::primitives::{Address, U256};
use bundler::BundlerClient;
use liquidity_config::Config;
use liquidity_delivery::DeliveryService;
use liquidity_types::{format_ether, format_token_amount, TransactionHash, TransactionReceipt};
use router::{AddLiquidityParams, RouterClient, SwapParams};
use std::sync::Arc;
use std::time::Instant;
use token_manager::TokenManager;

/// Wallet balances read before a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balances {
	pub eth: U256,
	pub token: U256,
}

/// Fails with [`EngineError::InsufficientFunds`] when `available < required`.
pub fn ensure_funded(available: U256, required: U256) -> Result<(), EngineError> {
	if available < required {
		return Err(EngineError::InsufficientFunds {
			required,
			available,
		});
	}
	Ok(())
}

/// Waits for the configured confirmations and turns a failed receipt into
/// [`EngineError::Reverted`].
pub(crate) async fn confirm_step(
	delivery: &DeliveryService,
	step: Step,
	hash: &TransactionHash,
) -> Result<TransactionReceipt, EngineError> {
	let receipt = delivery.confirm_with_default(hash).await?;
	if !receipt.success {
		tracing::error!(
			step = %step,
			tx_hash = %hash,
			block = receipt.block_number,
			"Transaction reverted"
		);
		return Err(EngineError::Reverted {
			step,
			hash: *hash,
			block_number: receipt.block_number,
		});
	}
	tracing::info!(
		step = %step,
		tx_hash = %hash,
		block = receipt.block_number,
		gas_used = receipt.gas_used,
		"Transaction confirmed"
	);
	Ok(receipt)
}

/// Runs the liquidity routines for one configured wallet, router and token.
pub struct LiquidityEngine {
	config: Config,
	delivery: Arc<DeliveryService>,
	router: RouterClient,
	tokens: TokenManager,
	/// Time source for transaction deadlines.
	clock: Clock,
}

impl LiquidityEngine {
	pub fn new(config: Config, delivery: Arc<DeliveryService>) -> Self {
		let router = RouterClient::new(config.contracts.router, delivery.clone());
		let tokens = TokenManager::new(
			config.contracts.token,
			delivery.clone(),
			config.run.approve_gas_limit,
		);
		Self {
			config,
			delivery,
			router,
			tokens,
			clock: system_clock(),
		}
	}

	/// Replaces the system clock used for deadlines.
	pub fn with_clock(mut self, clock: Clock) -> Self {
		self.clock = clock;
		self
	}

	/// Deadline for a transaction submitted now.
	fn fresh_deadline(&self) -> U256 {
		deadline_at((self.clock)())
	}

	/// Reads and logs the wallet balances, then checks ETH against `required`.
	pub async fn preflight(&self, wallet: Address, required: U256) -> Result<Balances, EngineError> {
		let eth = self.delivery.get_balance(wallet).await?;
		let token = self.tokens.balance_of(wallet).await?;

		tracing::info!(
			wallet = %wallet,
			eth = %format_ether(eth),
			token = %format_token_amount(token, self.config.run.token_decimals),
			required_eth = %format_ether(required),
			"Wallet balances"
		);

		ensure_funded(eth, required)?;
		Ok(Balances { eth, token })
	}

	/// Swaps ETH for the token, approves the router if needed and adds the
	/// received tokens plus ETH as liquidity.
	pub async fn run_sequential(&self) -> Result<RunReport, EngineError> {
		let run = &self.config.run;
		let contracts = &self.config.contracts;
		let wallet = self.delivery.sender().await?;
		let decimals = run.token_decimals;

		self.preflight(wallet, run.required_balance).await?;

		// Swap
		let path = vec![contracts.weth, contracts.token];
		let quoted = self.router.quote(run.swap_amount, path.clone()).await?;
		let amount_out_min = min_with_slippage(quoted);
		tracing::info!(
			amount_in = %format_ether(run.swap_amount),
			expected = %format_token_amount(quoted, decimals),
			minimum = %format_token_amount(amount_out_min, decimals),
			"Swapping ETH for tokens"
		);

		let swap_hash = self
			.router
			.swap_exact_eth_for_tokens(SwapParams {
				amount_in: run.swap_amount,
				amount_out_min,
				path,
				to: wallet,
				deadline: self.fresh_deadline(),
				gas_limit: run.swap_gas_limit,
			})
			.await?;
		confirm_step(&self.delivery, Step::Swap, &swap_hash).await?;

		let tokens_received = self.tokens.balance_of(wallet).await?;
		if tokens_received.is_zero() {
			return Err(EngineError::NoTokensReceived);
		}
		tracing::info!(
			balance = %format_token_amount(tokens_received, decimals),
			"Token balance after swap"
		);

		// Approve
		let approval_hash = self
			.tokens
			.ensure_allowance(wallet, self.router.address(), tokens_received)
			.await?;

		// Add liquidity
		let amount_token_min = min_with_slippage(tokens_received);
		let amount_eth_min = min_with_slippage(run.liquidity_amount);
		tracing::info!(
			tokens = %format_token_amount(tokens_received, decimals),
			eth = %format_ether(run.liquidity_amount),
			min_tokens = %format_token_amount(amount_token_min, decimals),
			min_eth = %format_ether(amount_eth_min),
			"Adding liquidity"
		);

		let liquidity_hash = self
			.router
			.add_liquidity_eth(AddLiquidityParams {
				token: contracts.token,
				amount_token_desired: tokens_received,
				amount_token_min,
				amount_eth_min,
				eth_amount: run.liquidity_amount,
				to: wallet,
				deadline: self.fresh_deadline(),
				gas_limit: run.liquidity_gas_limit,
			})
			.await?;
		confirm_step(&self.delivery, Step::AddLiquidity, &liquidity_hash).await?;

		let final_token_balance = self.tokens.balance_of(wallet).await?;
		let final_eth_balance = self.delivery.get_balance(wallet).await?;
		tracing::info!(
			token = %format_token_amount(final_token_balance, decimals),
			eth = %format_ether(final_eth_balance),
			"Final balances"
		);

		Ok(RunReport {
			swap_hash,
			approval_hash,
			liquidity_hash,
			tokens_received,
			final_token_balance,
			final_eth_balance,
			token_decimals: decimals,
		})
	}

	/// Sends the whole bundled amount to the bundler contract, which swaps
	/// half of it and adds liquidity in the same transaction.
	pub async fn run_bundled(&self) -> Result<BundledReport, EngineError> {
		let run = &self.config.run;
		let token = self.tokens.address();
		let bundler_address = self
			.config
			.bundler()
			.map_err(|e| EngineError::Config(e.to_string()))?;
		let bundler = BundlerClient::new(bundler_address, self.delivery.clone());
		let wallet = self.delivery.sender().await?;

		let metadata = match self.tokens.metadata().await {
			Ok(metadata) => {
				tracing::info!(
					token = %token,
					symbol = %metadata.symbol,
					decimals = metadata.decimals,
					"Token"
				);
				Some(metadata)
			}
			Err(e) => {
				tracing::warn!(token = %token, error = %e, "Could not fetch token metadata");
				None
			}
		};
		let decimals = metadata
			.as_ref()
			.map_or(run.token_decimals, |metadata| metadata.decimals);

		let swap_eth = run.bundled_amount / U256::from(2u64);
		let liquidity_eth = run.bundled_amount - swap_eth;
		tracing::info!(
			contract = %bundler_address,
			total = %format_ether(run.bundled_amount),
			swap = %format_ether(swap_eth),
			liquidity = %format_ether(liquidity_eth),
			swap_slippage_bps = run.swap_slippage_bps,
			liquidity_slippage_bps = run.liquidity_slippage_bps,
			"Bundled swap and add liquidity"
		);

		let expected = bundler.expected_token_output(token, swap_eth).await?;
		tracing::info!(
			expected = %format_token_amount(expected, decimals),
			minimum = %format_token_amount(apply_slippage_bps(expected, run.swap_slippage_bps), decimals),
			"Expected swap output"
		);

		let required = run.bundled_amount.saturating_add(run.bundled_gas_buffer);
		let initial = self.preflight(wallet, required).await?;

		let started = Instant::now();
		let hash = bundler
			.swap_and_add_liquidity(
				token,
				run.swap_slippage_bps,
				run.liquidity_slippage_bps,
				run.bundled_amount,
				run.bundled_gas_limit,
			)
			.await?;
		let receipt = confirm_step(&self.delivery, Step::SwapAndAddLiquidity, &hash).await?;
		let elapsed = started.elapsed();

		let event = bundler.find_liquidity_event(&receipt);
		match &event {
			Some(event) => tracing::info!(
				eth_swapped = %format_ether(event.eth_swapped),
				tokens_received = %format_token_amount(event.tokens_received, decimals),
				liquidity_tokens = %format_token_amount(event.liquidity_tokens, decimals),
				liquidity_eth = %format_ether(event.liquidity_eth),
				liquidity_minted = %format_ether(event.liquidity_minted),
				"Liquidity added"
			),
			None => tracing::warn!(tx_hash = %hash, "No SwapAndLiquidityAdded event in receipt"),
		}

		let final_eth_balance = self.delivery.get_balance(wallet).await?;
		let final_token_balance = self.tokens.balance_of(wallet).await?;

		let report = BundledReport {
			hash,
			block_number: receipt.block_number,
			gas_used: receipt.gas_used,
			event,
			initial_eth_balance: initial.eth,
			final_eth_balance,
			initial_token_balance: initial.token,
			final_token_balance,
			token_symbol: metadata.map(|metadata| metadata.symbol),
			token_decimals: decimals,
			elapsed,
		};
		tracing::info!(
			eth_change = %report.eth_change(),
			token_change = %report.token_change(),
			"Balance changes"
		);
		Ok(report)
	}
}
