//! Swap route types returned by the routing engine.

use alloy::primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

/// A single pool interaction within a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapHop {
	/// Identifier of the pool used by this hop
	#[serde(rename = "poolId")]
	pub pool_id: B256,
	/// Index into `tokenAddresses` of the token sent to the pool
	#[serde(rename = "assetInIndex")]
	pub asset_in_index: usize,
	/// Index into `tokenAddresses` of the token received from the pool
	#[serde(rename = "assetOutIndex")]
	pub asset_out_index: usize,
	/// Amount swapped in this hop, in base units
	pub amount: String,
	/// Pool-specific call data
	#[serde(rename = "userData", default)]
	pub user_data: Bytes,
}

/// Route proposed by the routing engine.
///
/// The engine's response is decoded into this type at the boundary and
/// returned to the caller without modification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRoute {
	/// Ordered hops of the route
	pub swaps: Vec<SwapHop>,
	/// Tokens referenced by the hops
	#[serde(rename = "tokenAddresses")]
	pub token_addresses: Vec<Address>,
	/// Expected output (exact-in) or required input (exact-out), in base units
	#[serde(rename = "returnAmount")]
	pub return_amount: String,
	/// Amount the route was computed for, in base units
	#[serde(rename = "swapAmount", default, skip_serializing_if = "Option::is_none")]
	pub swap_amount: Option<String>,
	/// Return amount net of the estimated gas cost
	#[serde(
		rename = "returnAmountConsideringFees",
		default,
		skip_serializing_if = "Option::is_none"
	)]
	pub return_amount_considering_fees: Option<String>,
	#[serde(rename = "tokenIn", default, skip_serializing_if = "Option::is_none")]
	pub token_in: Option<Address>,
	#[serde(rename = "tokenOut", default, skip_serializing_if = "Option::is_none")]
	pub token_out: Option<Address>,
	/// Spot price of the route
	#[serde(rename = "marketSp", default, skip_serializing_if = "Option::is_none")]
	pub market_sp: Option<String>,
}

impl SwapRoute {
	/// Whether the engine found no route at all.
	pub fn is_empty(&self) -> bool {
		self.swaps.is_empty()
	}
}
