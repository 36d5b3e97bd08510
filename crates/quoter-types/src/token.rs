//! Token metadata and address canonicalization.

use alloy::primitives::{Address, AddressError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// On-chain metadata of an ERC-20 token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
	/// Display symbol, or a shortened address when the token has none
	pub symbol: String,
	/// Decimal precision of the token's base unit
	pub decimals: u8,
}

/// Parses a token address in any hex casing into its canonical form.
///
/// The resulting [`Address`] is the cache key for token metadata, so
/// `0xabc…` and `0xABC…` resolve to the same entry. All-lowercase and
/// all-uppercase input is accepted as is; mixed-case input must carry a
/// valid EIP-55 checksum.
pub fn canonical_address(value: &str) -> Result<Address, AddressError> {
	let value = value.trim();
	let body = value.strip_prefix("0x").unwrap_or(value);
	let has_lower = body.bytes().any(|b| b.is_ascii_lowercase());
	let has_upper = body.bytes().any(|b| b.is_ascii_uppercase());

	if has_lower && has_upper {
		Address::parse_checksummed(value, None)
	} else {
		Ok(Address::from_str(value)?)
	}
}

/// Display string for tokens without a `symbol()` method.
///
/// Built from the checksummed address: its first four characters and last
/// two, e.g. `0xA0..48`.
pub fn fallback_symbol(token: &Address) -> String {
	let checksummed = token.to_checksum(None);
	format!("{}..{}", &checksummed[..4], &checksummed[40..])
}
