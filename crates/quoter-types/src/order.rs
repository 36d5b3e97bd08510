//! Order types and request validation.
//!
//! A [`QuoteRequest`] is turned into a typed [`Order`] before any network
//! call is made, so every malformed field is reported as an [`OrderError`].

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::QuoteRequest;

/// Errors produced while validating an incoming order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
	#[error("invalid order kind {0}")]
	UnknownKind(String),
	#[error("invalid address for {field}: {value}")]
	InvalidAddress { field: &'static str, value: String },
	#[error("invalid amount {0}: expected a non-negative integer in base units")]
	InvalidAmount(String),
	#[error("invalid gas price {0}: expected a non-negative integer in wei")]
	InvalidGasPrice(String),
}

/// Side of an order as expressed by the trader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
	Sell,
	Buy,
}

impl FromStr for OrderKind {
	type Err = OrderError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"sell" => Ok(OrderKind::Sell),
			"buy" => Ok(OrderKind::Buy),
			other => Err(OrderError::UnknownKind(other.to_string())),
		}
	}
}

impl fmt::Display for OrderKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderKind::Sell => f.write_str("sell"),
			OrderKind::Buy => f.write_str("buy"),
		}
	}
}

/// Swap type understood by the routing engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapKind {
	/// The amount denominates the token given up.
	#[serde(rename = "swapExactIn")]
	ExactIn,
	/// The amount denominates the token received.
	#[serde(rename = "swapExactOut")]
	ExactOut,
}

impl SwapKind {
	/// Returns the token whose unit price expresses the gas cost of a route.
	///
	/// Exact-in swaps are priced in the output token, exact-out swaps in the
	/// input token.
	pub fn cost_token(&self, token_in: Address, token_out: Address) -> Address {
		match self {
			SwapKind::ExactIn => token_out,
			SwapKind::ExactOut => token_in,
		}
	}
}

impl From<OrderKind> for SwapKind {
	fn from(kind: OrderKind) -> Self {
		match kind {
			OrderKind::Sell => SwapKind::ExactIn,
			OrderKind::Buy => SwapKind::ExactOut,
		}
	}
}

/// A validated quote order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
	pub sell_token: Address,
	pub buy_token: Address,
	pub kind: OrderKind,
	/// Amount in base units of the sell token for sell orders, of the buy token for buy orders.
	pub amount: U256,
	pub gas_price: U256,
}

impl Order {
	pub fn swap_kind(&self) -> SwapKind {
		self.kind.into()
	}

	/// The token the order amount is denominated in.
	pub fn amount_token(&self) -> Address {
		match self.kind {
			OrderKind::Sell => self.sell_token,
			OrderKind::Buy => self.buy_token,
		}
	}
}

impl QuoteRequest {
	/// Validates the request and converts it into an [`Order`].
	///
	/// The order kind is checked first. `default_gas_price` is used when the
	/// request carries no gas price.
	pub fn into_order(self, default_gas_price: U256) -> Result<Order, OrderError> {
		let kind = self.order_kind.parse::<OrderKind>()?;
		let sell_token = parse_address("sellToken", &self.sell_token)?;
		let buy_token = parse_address("buyToken", &self.buy_token)?;
		let amount =
			parse_integer(&self.amount).ok_or(OrderError::InvalidAmount(self.amount.clone()))?;
		let gas_price = match &self.gas_price {
			Some(value) => {
				parse_integer(value).ok_or_else(|| OrderError::InvalidGasPrice(value.clone()))?
			}
			None => default_gas_price,
		};

		Ok(Order {
			sell_token,
			buy_token,
			kind,
			amount,
			gas_price,
		})
	}
}

fn parse_address(field: &'static str, value: &str) -> Result<Address, OrderError> {
	crate::canonical_address(value).map_err(|_| OrderError::InvalidAddress {
		field,
		value: value.to_string(),
	})
}

/// Parses a base-10 unsigned integer, rejecting signs, fractions and blanks.
pub fn parse_integer(value: &str) -> Option<U256> {
	let value = value.trim();
	if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
		return None;
	}
	U256::from_str_radix(value, 10).ok()
}
