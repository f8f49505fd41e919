//! Solidity bindings for the contracts the runner calls.
//!
//! Only the entry points actually used are declared. Calls are encoded with
//! `SolCall::abi_encode` and sent through the delivery service, so no
//! `#[sol(rpc)]` instances are generated.

use alloy::sol;

sol! {
	/// Uniswap V2 Router02.
	#[derive(Debug, PartialEq, Eq)]
	interface IUniswapV2Router02 {
		function swapExactETHForTokens(
			uint256 amountOutMin,
			address[] calldata path,
			address to,
			uint256 deadline
		) external payable returns (uint256[] memory amounts);

		function addLiquidityETH(
			address token,
			uint256 amountTokenDesired,
			uint256 amountTokenMin,
			uint256 amountETHMin,
			address to,
			uint256 deadline
		) external payable returns (uint256 amountToken, uint256 amountETH, uint256 liquidity);

		function getAmountsOut(uint256 amountIn, address[] calldata path)
			external view returns (uint256[] memory amounts);
	}

	/// ERC20 subset for balance, allowance, approval and display metadata.
	#[derive(Debug, PartialEq, Eq)]
	interface IERC20 {
		function approve(address spender, uint256 amount) external returns (bool);
		function balanceOf(address owner) external view returns (uint256);
		function allowance(address owner, address spender) external view returns (uint256);
		function symbol() external view returns (string memory);
		function decimals() external view returns (uint8);
	}

	/// Contract that swaps half of `msg.value` for `token` and adds the
	/// result plus the other half as liquidity, in one transaction.
	#[derive(Debug, PartialEq, Eq)]
	interface ISwapAndAddLiquidity {
		function swapAndAddLiquidity(
			address token,
			uint256 swapSlippageBps,
			uint256 liquiditySlippageBps
		) external payable;

		function getExpectedTokenOutput(address token, uint256 ethAmount)
			external view returns (uint256);

		event SwapAndLiquidityAdded(
			address indexed user,
			address indexed token,
			uint256 ethSwapped,
			uint256 tokensReceived,
			uint256 liquidityTokens,
			uint256 liquidityETH,
			uint256 liquidityMinted
		);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy::sol_types::{SolCall, SolEvent};

	#[test]
	fn test_selectors_match_deployed_abi() {
		assert_eq!(
			IUniswapV2Router02::swapExactETHForTokensCall::SELECTOR,
			[0x7f, 0xf3, 0x6a, 0xb5]
		);
		assert_eq!(
			IUniswapV2Router02::addLiquidityETHCall::SELECTOR,
			[0xf3, 0x05, 0xd7, 0x19]
		);
		assert_eq!(
			IUniswapV2Router02::getAmountsOutCall::SELECTOR,
			[0xd0, 0x6c, 0xa6, 0x1f]
		);
		assert_eq!(IERC20::approveCall::SELECTOR, [0x09, 0x5e, 0xa7, 0xb3]);
		assert_eq!(IERC20::balanceOfCall::SELECTOR, [0x70, 0xa0, 0x82, 0x31]);
		assert_eq!(IERC20::allowanceCall::SELECTOR, [0xdd, 0x62, 0xed, 0x3e]);
	}

	#[test]
	fn test_event_signature() {
		assert_eq!(
			ISwapAndAddLiquidity::SwapAndLiquidityAdded::SIGNATURE,
			"SwapAndLiquidityAdded(address,address,uint256,uint256,uint256,uint256,uint256)"
		);
	}
}
