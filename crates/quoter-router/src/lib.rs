//! Routing engine access for the quoter.
//!
//! Route optimization is delegated to an external smart order router. This
//! crate defines the [`RouterInterface`] backends implement, and
//! [`RouterService`], which wraps a backend together with the cost
//! calibration state the engine prices routes with.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use quoter_types::{SwapKind, SwapRoute, TokenAmount};
use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Re-export implementations
pub mod implementations {
	pub mod sor;
}

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Errors that can occur while talking to the routing engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
	#[error("Network error: {0}")]
	Network(String),
	#[error("Routing engine error: {0}")]
	Engine(String),
	#[error("Invalid response from routing engine: {0}")]
	InvalidResponse(String),
	#[error("Invalid configuration: {0}")]
	Config(String),
}

/// A fully parameterized route request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapQuery {
	pub token_in: Address,
	pub token_out: Address,
	pub kind: SwapKind,
	/// Decimal-normalized amount of the token the swap kind fixes
	pub amount: TokenAmount,
	/// Gas price in wei
	pub gas_price: U256,
	/// Gas cost of a swap expressed in the cost token, zero when unknown
	pub cost_output_token: Decimal,
}

/// Trait defining the interface for routing engine backends.
#[async_trait]
pub trait RouterInterface: Send + Sync {
	/// Reloads the engine's pool snapshot.
	///
	/// With `use_onchain_overrides` the engine refreshes pool balances from
	/// chain state instead of relying on the indexed snapshot alone.
	async fn refresh_pools(&self, use_onchain_overrides: bool) -> Result<(), RouterError>;

	/// Computes the gas cost of a swap denominated in `token`.
	async fn calibrate_cost(
		&self,
		token: Address,
		decimals: u8,
		gas_price: U256,
	) -> Result<Decimal, RouterError>;

	/// Computes the best route for `query`.
	async fn quote(&self, query: &SwapQuery) -> Result<SwapRoute, RouterError>;
}

/// Parameters the engine prices routes with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalibrationState {
	/// Gas price the token costs were computed for
	pub gas_price: U256,
	/// Gas cost of a swap in units of each token
	pub token_cost: HashMap<Address, Decimal>,
}

/// Routing engine facade owning the calibration state.
///
/// Concurrent writers race on the state with last-writer-wins semantics; a
/// stale cost entry only makes a route slightly less gas-efficient.
pub struct RouterService {
	backend: Box<dyn RouterInterface>,
	state: RwLock<CalibrationState>,
}

impl RouterService {
	/// Creates a service whose calibration starts at `gas_price` with no token costs.
	pub fn new(backend: Box<dyn RouterInterface>, gas_price: U256) -> Self {
		Self {
			backend,
			state: RwLock::new(CalibrationState {
				gas_price,
				token_cost: HashMap::new(),
			}),
		}
	}

	pub async fn gas_price(&self) -> U256 {
		self.state.read().await.gas_price
	}

	pub async fn set_gas_price(&self, gas_price: U256) {
		self.state.write().await.gas_price = gas_price;
	}

	pub async fn token_cost(&self, token: &Address) -> Option<Decimal> {
		self.state.read().await.token_cost.get(token).copied()
	}

	/// Snapshot of the current calibration state.
	pub async fn calibration(&self) -> CalibrationState {
		self.state.read().await.clone()
	}

	/// Recomputes the swap cost in `token` at the stored gas price and stores it.
	pub async fn set_cost_token(&self, token: Address, decimals: u8) -> Result<Decimal, RouterError> {
		let gas_price = self.gas_price().await;
		let cost = self
			.backend
			.calibrate_cost(token, decimals, gas_price)
			.await?;

		self.state.write().await.token_cost.insert(token, cost);
		info!(%token, %gas_price, %cost, "Updated token cost");
		Ok(cost)
	}

	pub async fn refresh_pools(&self, use_onchain_overrides: bool) -> Result<(), RouterError> {
		self.backend.refresh_pools(use_onchain_overrides).await
	}

	/// Asks the engine for a route using the current calibration.
	pub async fn quote(
		&self,
		token_in: Address,
		token_out: Address,
		kind: SwapKind,
		amount: TokenAmount,
	) -> Result<SwapRoute, RouterError> {
		let query = {
			let state = self.state.read().await;
			SwapQuery {
				token_in,
				token_out,
				kind,
				amount,
				gas_price: state.gas_price,
				cost_output_token: state
					.token_cost
					.get(&kind.cost_token(token_in, token_out))
					.copied()
					.unwrap_or_default(),
			}
		};

		debug!(?query, "Requesting route");
		self.backend.quote(&query).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::MockRouter;
	use std::str::FromStr;

	fn tokens() -> (Address, Address) {
		(Address::repeat_byte(1), Address::repeat_byte(2))
	}

	#[tokio::test]
	async fn test_initial_state() {
		let service = RouterService::new(Box::new(MockRouter::new()), U256::from(30u64));

		assert_eq!(service.gas_price().await, U256::from(30u64));
		assert_eq!(service.token_cost(&Address::ZERO).await, None);
		assert!(service.calibration().await.token_cost.is_empty());
	}

	#[tokio::test]
	async fn test_set_cost_token_uses_stored_gas_price() {
		let (_, weth) = tokens();
		let router = MockRouter::new();
		router.set_cost(Decimal::from_str("0.0021").unwrap());
		let service = RouterService::new(Box::new(router.clone()), U256::from(30u64));

		service.set_gas_price(U256::from(50u64)).await;
		let cost = service.set_cost_token(weth, 18).await.unwrap();

		assert_eq!(cost, Decimal::from_str("0.0021").unwrap());
		assert_eq!(service.token_cost(&weth).await, Some(cost));
		assert_eq!(router.cost_calls(), vec![(weth, 18, U256::from(50u64))]);
	}

	#[tokio::test]
	async fn test_failed_calibration_leaves_state_untouched() {
		let (_, weth) = tokens();
		let router = MockRouter::new();
		router.fail_cost(RouterError::Engine("no price".to_string()));
		let service = RouterService::new(Box::new(router), U256::from(30u64));

		assert!(service.set_cost_token(weth, 18).await.is_err());
		assert_eq!(service.token_cost(&weth).await, None);
	}

	#[tokio::test]
	async fn test_quote_passes_cost_of_cost_token() {
		let (usdc, weth) = tokens();
		let router = MockRouter::new();
		router.set_cost(Decimal::from_str("0.5").unwrap());
		let service = RouterService::new(Box::new(router.clone()), U256::from(30u64));
		service.set_cost_token(weth, 18).await.unwrap();

		let amount = TokenAmount::new(U256::from(2_000_000u64), 6);
		service
			.quote(usdc, weth, SwapKind::ExactIn, amount)
			.await
			.unwrap();
		// Exact-out swaps are priced in the input token, which has no cost yet.
		service
			.quote(usdc, weth, SwapKind::ExactOut, amount)
			.await
			.unwrap();

		let queries = router.quotes();
		assert_eq!(queries.len(), 2);
		assert_eq!(queries[0].cost_output_token, Decimal::from_str("0.5").unwrap());
		assert_eq!(queries[0].gas_price, U256::from(30u64));
		assert_eq!(queries[0].amount.to_string(), "2");
		assert_eq!(queries[1].cost_output_token, Decimal::ZERO);
	}
}
