//! Configuration module for the liquidity runner.
//!
//! A [`Config`] can be built in two ways:
//! - [`Config::from_env`] reads `RPC_URL`, `PRIVATE_KEY` and the optional
//!   contract overrides straight from the process environment.
//! - [`Config::from_file`] parses a TOML file after substituting `${VAR}` and
//!   `${VAR:-default}` references with environment values.
//!
//! Every field other than the RPC URL and private key has a default matching
//! the mainnet router, WETH and token the runner was written against.

use alloy::primitives::{address, utils::parse_ether, Address, U256};
use liquidity_types::SecretString;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Environment variable holding the JSON-RPC endpoint.
pub const ENV_RPC_URL: &str = "RPC_URL";
/// Environment variable holding the hex-encoded signing key.
pub const ENV_PRIVATE_KEY: &str = "PRIVATE_KEY";
/// Environment variable holding the deployed bundler contract address.
pub const ENV_CONTRACT_ADDRESS: &str = "CONTRACT_ADDRESS";
pub const ENV_TOKEN_ADDRESS: &str = "TOKEN_ADDRESS";
pub const ENV_ROUTER_ADDRESS: &str = "ROUTER_ADDRESS";
pub const ENV_WETH_ADDRESS: &str = "WETH_ADDRESS";
pub const ENV_CHAIN_ID: &str = "CHAIN_ID";

/// Uniswap V2 Router02 on Ethereum mainnet.
pub const DEFAULT_ROUTER: Address = address!("7a250d5630B4cF539739dF2C5dAcb4c659F2488D");
/// Wrapped ether on Ethereum mainnet.
pub const DEFAULT_WETH: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
pub const DEFAULT_TOKEN: Address = address!("22fa7fd918a4364de63be573d8982af47d9cb6ba");

const MAX_BPS: u16 = 10_000;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// A required environment variable is not set.
	#[error("Environment variable '{0}' not set")]
	MissingEnv(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message, drop the echoed input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub network: NetworkConfig,
	pub account: AccountConfig,
	#[serde(default)]
	pub contracts: ContractsConfig,
	#[serde(default)]
	pub run: RunConfig,
}

/// RPC endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
	/// HTTP(S) JSON-RPC endpoint.
	pub rpc_url: String,
	/// When set, setup fails if the endpoint reports a different chain.
	#[serde(default)]
	pub chain_id: Option<u64>,
	/// Interval between receipt polls while waiting for confirmations.
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
}

/// Signing identity.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
	/// Hex-encoded secp256k1 key, with or without `0x`.
	pub private_key: SecretString,
}

/// Addresses of the contracts the runner talks to.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfig {
	#[serde(default = "default_router", deserialize_with = "deserialize_address")]
	pub router: Address,
	#[serde(default = "default_token", deserialize_with = "deserialize_address")]
	pub token: Address,
	#[serde(default = "default_weth", deserialize_with = "deserialize_address")]
	pub weth: Address,
	/// Deployed swap-and-add-liquidity contract; required for bundled runs.
	#[serde(default, deserialize_with = "deserialize_optional_address")]
	pub bundler: Option<Address>,
}

impl Default for ContractsConfig {
	fn default() -> Self {
		Self {
			router: DEFAULT_ROUTER,
			token: DEFAULT_TOKEN,
			weth: DEFAULT_WETH,
			bundler: None,
		}
	}
}

/// Amounts, gas limits and tolerances for a run.
///
/// Ether amounts are written as decimal strings (`"0.0005"`) and held in wei.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
	/// ETH swapped for tokens in the sequential routine.
	#[serde(default = "default_swap_amount", deserialize_with = "deserialize_ether")]
	pub swap_amount: U256,
	/// ETH paired with the received tokens in the sequential routine.
	#[serde(default = "default_liquidity_amount", deserialize_with = "deserialize_ether")]
	pub liquidity_amount: U256,
	/// Minimum wallet balance before the sequential routine may start.
	#[serde(default = "default_required_balance", deserialize_with = "deserialize_ether")]
	pub required_balance: U256,
	/// Total ETH sent to the bundler; it splits the amount in half itself.
	#[serde(default = "default_bundled_amount", deserialize_with = "deserialize_ether")]
	pub bundled_amount: U256,
	/// Extra ETH the wallet must hold on top of `bundled_amount` for gas.
	#[serde(default = "default_bundled_gas_buffer", deserialize_with = "deserialize_ether")]
	pub bundled_gas_buffer: U256,
	#[serde(default = "default_swap_gas_limit")]
	pub swap_gas_limit: u64,
	#[serde(default = "default_liquidity_gas_limit")]
	pub liquidity_gas_limit: u64,
	#[serde(default = "default_bundled_gas_limit")]
	pub bundled_gas_limit: u64,
	/// Gas limit for `approve`; estimated by the node when unset.
	#[serde(default)]
	pub approve_gas_limit: Option<u64>,
	/// Confirmations awaited after each submitted transaction.
	#[serde(default = "default_confirmations")]
	pub confirmations: u64,
	#[serde(default = "default_slippage_bps")]
	pub swap_slippage_bps: u16,
	#[serde(default = "default_slippage_bps")]
	pub liquidity_slippage_bps: u16,
	/// Decimals used when printing token amounts.
	#[serde(default = "default_token_decimals")]
	pub token_decimals: u8,
}

impl Default for RunConfig {
	fn default() -> Self {
		Self {
			swap_amount: default_swap_amount(),
			liquidity_amount: default_liquidity_amount(),
			required_balance: default_required_balance(),
			bundled_amount: default_bundled_amount(),
			bundled_gas_buffer: default_bundled_gas_buffer(),
			swap_gas_limit: default_swap_gas_limit(),
			liquidity_gas_limit: default_liquidity_gas_limit(),
			bundled_gas_limit: default_bundled_gas_limit(),
			approve_gas_limit: None,
			confirmations: default_confirmations(),
			swap_slippage_bps: default_slippage_bps(),
			liquidity_slippage_bps: default_slippage_bps(),
			token_decimals: default_token_decimals(),
		}
	}
}

fn default_poll_interval_ms() -> u64 {
	4_000
}

fn default_router() -> Address {
	DEFAULT_ROUTER
}

fn default_token() -> Address {
	DEFAULT_TOKEN
}

fn default_weth() -> Address {
	DEFAULT_WETH
}

/// 0.0005 ETH
fn default_swap_amount() -> U256 {
	U256::from(500_000_000_000_000u64)
}

/// 0.0005 ETH
fn default_liquidity_amount() -> U256 {
	U256::from(500_000_000_000_000u64)
}

/// 0.002 ETH: swap, liquidity and gas for three transactions.
fn default_required_balance() -> U256 {
	U256::from(2_000_000_000_000_000u64)
}

/// 0.001 ETH
fn default_bundled_amount() -> U256 {
	U256::from(1_000_000_000_000_000u64)
}

/// 0.01 ETH
fn default_bundled_gas_buffer() -> U256 {
	U256::from(10_000_000_000_000_000u64)
}

fn default_swap_gas_limit() -> u64 {
	200_000
}

fn default_liquidity_gas_limit() -> u64 {
	250_000
}

fn default_bundled_gas_limit() -> u64 {
	500_000
}

fn default_confirmations() -> u64 {
	1
}

/// 5%
fn default_slippage_bps() -> u16 {
	500
}

fn default_token_decimals() -> u8 {
	18
}

fn deserialize_ether<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = String::deserialize(deserializer)?;
	let trimmed = raw.trim();
	// parse_ether wraps negative values around 2^256
	if trimmed.starts_with('-') {
		return Err(serde::de::Error::custom(format!(
			"Invalid ether amount '{}': must not be negative",
			raw
		)));
	}
	parse_ether(trimmed)
		.map_err(|e| serde::de::Error::custom(format!("Invalid ether amount '{}': {}", raw, e)))
}

fn deserialize_address<'de, D>(deserializer: D) -> Result<Address, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = String::deserialize(deserializer)?;
	parse_address(&raw).map_err(serde::de::Error::custom)
}

fn deserialize_optional_address<'de, D>(deserializer: D) -> Result<Option<Address>, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<String>::deserialize(deserializer)? {
		Some(raw) if raw.trim().is_empty() => Ok(None),
		Some(raw) => parse_address(&raw).map(Some).map_err(serde::de::Error::custom),
		None => Ok(None),
	}
}

/// Parses a hex address, accepting any checksum casing.
pub fn parse_address(raw: &str) -> Result<Address, String> {
	Address::from_str(raw.trim()).map_err(|e| format!("Invalid address '{}': {}", raw, e))
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of `VAR_NAME`, or with `default`
/// for `${VAR_NAME:-default}` when the variable is unset.
///
/// Input strings are limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => return Err(ConfigError::MissingEnv(var_name.as_str().to_string())),
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a TOML file, resolving `${VAR}` references first.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot read {}: {}", path.display(), e),
			))
		})?;
		content.parse()
	}

	/// Builds configuration from the process environment.
	///
	/// `RPC_URL` and `PRIVATE_KEY` are required; everything else falls back
	/// to the defaults.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Builds configuration from an arbitrary variable lookup.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let required = |name: &str| {
			lookup(name)
				.filter(|v| !v.trim().is_empty())
				.ok_or_else(|| ConfigError::MissingEnv(name.to_string()))
		};
		let optional_address = |name: &str| -> Result<Option<Address>, ConfigError> {
			match lookup(name).filter(|v| !v.trim().is_empty()) {
				Some(raw) => parse_address(&raw)
					.map(Some)
					.map_err(|e| ConfigError::Validation(format!("{}: {}", name, e))),
				None => Ok(None),
			}
		};

		let chain_id = match lookup(ENV_CHAIN_ID).filter(|v| !v.trim().is_empty()) {
			Some(raw) => Some(raw.trim().parse::<u64>().map_err(|e| {
				ConfigError::Validation(format!("{}: invalid chain id '{}': {}", ENV_CHAIN_ID, raw, e))
			})?),
			None => None,
		};

		let defaults = ContractsConfig::default();
		let config = Config {
			network: NetworkConfig {
				rpc_url: required(ENV_RPC_URL)?,
				chain_id,
				poll_interval_ms: default_poll_interval_ms(),
			},
			account: AccountConfig {
				private_key: SecretString::new(required(ENV_PRIVATE_KEY)?),
			},
			contracts: ContractsConfig {
				router: optional_address(ENV_ROUTER_ADDRESS)?.unwrap_or(defaults.router),
				token: optional_address(ENV_TOKEN_ADDRESS)?.unwrap_or(defaults.token),
				weth: optional_address(ENV_WETH_ADDRESS)?.unwrap_or(defaults.weth),
				bundler: optional_address(ENV_CONTRACT_ADDRESS)?,
			},
			run: RunConfig::default(),
		};

		config.validate()?;
		Ok(config)
	}

	/// Returns the bundler address or a validation error naming the variable to set.
	pub fn bundler(&self) -> Result<Address, ConfigError> {
		self.contracts.bundler.ok_or_else(|| {
			ConfigError::Validation(format!(
				"Bundled mode needs a contract address ({} or [contracts].bundler)",
				ENV_CONTRACT_ADDRESS
			))
		})
	}

	/// Validates the configuration.
	///
	/// - RPC URL is non-empty and an http(s) URL
	/// - private key is non-empty
	/// - ether amounts and gas limits are positive
	/// - confirmations are within 1..=100
	/// - slippage is at most 10000 bps
	fn validate(&self) -> Result<(), ConfigError> {
		let rpc_url = self.network.rpc_url.trim();
		if rpc_url.is_empty() {
			return Err(ConfigError::Validation("rpc_url cannot be empty".into()));
		}
		if !rpc_url.starts_with("http://") && !rpc_url.starts_with("https://") {
			return Err(ConfigError::Validation(format!(
				"rpc_url must be an http(s) URL, got '{}'",
				rpc_url
			)));
		}
		if self.network.poll_interval_ms == 0 {
			return Err(ConfigError::Validation(
				"poll_interval_ms must be greater than 0".into(),
			));
		}

		if self.account.private_key.is_blank() {
			return Err(ConfigError::Validation("private_key cannot be empty".into()));
		}

		let run = &self.run;
		for (name, amount) in [
			("swap_amount", run.swap_amount),
			("liquidity_amount", run.liquidity_amount),
			("bundled_amount", run.bundled_amount),
			("required_balance", run.required_balance),
		] {
			if amount.is_zero() {
				return Err(ConfigError::Validation(format!(
					"{} must be greater than 0",
					name
				)));
			}
		}

		for (name, limit) in [
			("swap_gas_limit", run.swap_gas_limit),
			("liquidity_gas_limit", run.liquidity_gas_limit),
			("bundled_gas_limit", run.bundled_gas_limit),
		] {
			if limit == 0 {
				return Err(ConfigError::Validation(format!(
					"{} must be greater than 0",
					name
				)));
			}
		}
		if run.approve_gas_limit == Some(0) {
			return Err(ConfigError::Validation(
				"approve_gas_limit must be greater than 0 when set".into(),
			));
		}

		if run.confirmations == 0 {
			return Err(ConfigError::Validation(
				"confirmations must be at least 1".into(),
			));
		}
		if run.confirmations > 100 {
			return Err(ConfigError::Validation(
				"confirmations cannot exceed 100".into(),
			));
		}

		if run.swap_slippage_bps > MAX_BPS || run.liquidity_slippage_bps > MAX_BPS {
			return Err(ConfigError::Validation(format!(
				"slippage cannot exceed {} bps",
				MAX_BPS
			)));
		}

		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
