//! Command-line entry point for the liquidity runner.
//!
//! Loads configuration from a TOML file or the environment, wires the
//! account, delivery and engine together, and runs one routine to
//! completion. Exits with status 1 when the run fails.

use clap::{Parser, ValueEnum};
use liquidity_account::implementations::local::create_account;
use liquidity_account::AccountService;
use liquidity_config::Config;
use liquidity_core::{EngineError, LiquidityEngine};
use liquidity_delivery::implementations::evm::alloy::create_http_delivery;
use liquidity_delivery::DeliveryService;
use liquidity_types::truncate_id;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Which routine to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
	/// Swap, approve and add liquidity as separate router transactions
	Sequential,
	/// One call to the swap-and-add-liquidity contract
	Bundled,
}

/// Command-line arguments for the liquidity runner.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file; without it configuration is read from the environment
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Routine to run
	#[arg(short, long, value_enum, default_value_t = Mode::Sequential)]
	mode: Mode,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() {
	// A missing .env file is fine
	dotenv::dotenv().ok();

	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt().with_env_filter(env_filter).with_target(false).init();

	let config = match load_config(args.config.as_deref()).await {
		Ok(config) => config,
		Err(e) => fail("Configuration", &e),
	};
	tracing::info!(
		rpc_url = %config.network.rpc_url,
		router = %config.contracts.router,
		token = %config.contracts.token,
		mode = ?args.mode,
		"Loaded configuration"
	);

	let engine = match build_engine(config).await {
		Ok(engine) => engine,
		Err(e) => fail("Setup", &e),
	};

	let started = Instant::now();
	let result = run(&engine, args.mode).await;
	let elapsed = started.elapsed();

	match result {
		Ok(summary) => {
			println!("{}", summary);
			println!("Execution time: {} ms", elapsed.as_millis());
			tracing::info!("Run completed");
		}
		Err(e) => {
			println!("Execution time: {} ms", elapsed.as_millis());
			fail("Run", &e);
		}
	}
}

/// Logs the error and its hint, then exits with status 1.
fn fail(stage: &str, e: &EngineError) -> ! {
	tracing::error!(error = %e, "{} failed", stage);
	if let Some(hint) = e.diagnosis() {
		tracing::error!("{}", hint);
	}
	std::process::exit(1);
}

/// Reads the TOML file when given, the environment otherwise.
async fn load_config(path: Option<&Path>) -> Result<Config, EngineError> {
	let config = match path {
		Some(path) => Config::from_file(path).await,
		None => Config::from_env(),
	};
	config.map_err(|e| EngineError::Config(e.to_string()))
}

/// Builds the account, delivery and engine from configuration.
async fn build_engine(config: Config) -> Result<LiquidityEngine, EngineError> {
	let account = Arc::new(AccountService::new(create_account(
		&config.account.private_key,
	)?));
	let wallet = account.get_address().await?;

	let provider = create_http_delivery(
		&config.network.rpc_url,
		&account.get_private_key(),
		Duration::from_millis(config.network.poll_interval_ms),
		config.network.chain_id,
	)
	.await?;
	let delivery = Arc::new(DeliveryService::new(
		provider,
		account,
		config.run.confirmations,
	));

	let chain_id = delivery.get_chain_id().await?;
	let block = delivery.get_block_number().await?;
	tracing::info!(
		wallet = %wallet,
		chain_id,
		block,
		"Connected as {}",
		truncate_id(&wallet.to_string())
	);

	Ok(LiquidityEngine::new(config, delivery))
}

/// Runs the selected routine and renders its summary.
async fn run(engine: &LiquidityEngine, mode: Mode) -> Result<String, EngineError> {
	match mode {
		Mode::Sequential => {
			let report = engine.run_sequential().await?;
			Ok(format!("Liquidity added\n{}", report))
		}
		Mode::Bundled => {
			let report = engine.run_bundled().await?;
			Ok(format!("Swap and liquidity bundled\n{}", report))
		}
	}
}
