//! API types for the quoter HTTP API.
//!
//! The request body is kept as raw strings so that malformed fields surface
//! as invalid-order errors from validation rather than as body rejections.

use serde::{Deserialize, Serialize};

/// Request body of `POST /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
	/// Token given up by the trader
	#[serde(rename = "sellToken")]
	pub sell_token: String,
	/// Token received by the trader
	#[serde(rename = "buyToken")]
	pub buy_token: String,
	/// Either "sell" (exact input) or "buy" (exact output)
	#[serde(rename = "orderKind")]
	pub order_kind: String,
	/// Amount in token base units as an integer string
	pub amount: String,
	/// Gas price in wei as an integer string; the configured default applies when absent
	#[serde(rename = "gasPrice", default, skip_serializing_if = "Option::is_none")]
	pub gas_price: Option<String>,
}

/// API error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code
	pub error: String,
	/// Human-readable description
	pub message: String,
}

/// Serde module for U256 serialization/deserialization as decimal strings.
pub mod u256_serde {
	use alloy::primitives::U256;
	use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

	pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		value.to_string().serialize(serializer)
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		U256::from_str_radix(&s, 10).map_err(D::Error::custom)
	}
}
