//! Helpers for scripting ERC-20 metadata on a [`MockChain`].

use crate::IERC20Metadata;
use alloy::primitives::{Address, U256};
use alloy::sol_types::{SolCall, SolValue};
use quoter_chain::testing::MockChain;
use quoter_chain::ChainError;

/// Scripts `symbol()` and `decimals()` responses for `token`.
///
/// `None` makes the corresponding call revert. Decimals are returned as a
/// full ABI word, as a `uint8` return value is encoded.
pub fn script_token(chain: &MockChain, token: Address, symbol: Option<&str>, decimals: Option<u8>) {
	let reverted = || Err(ChainError::Call("execution reverted".to_string()));

	chain.respond(
		token,
		IERC20Metadata::symbolCall::SELECTOR,
		symbol.map_or_else(reverted, |s| Ok(s.to_string().abi_encode().into())),
	);
	chain.respond(
		token,
		IERC20Metadata::decimalsCall::SELECTOR,
		decimals.map_or_else(reverted, |d| Ok(U256::from(d).abi_encode().into())),
	);
}
