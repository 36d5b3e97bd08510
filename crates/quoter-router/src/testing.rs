//! In-memory routing engine for tests.

use crate::{RouterError, RouterInterface, SwapQuery};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use quoter_types::SwapRoute;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct State {
	cost: Result<Decimal, RouterError>,
	route: Result<SwapRoute, RouterError>,
	refresh: Result<(), RouterError>,
	latency: Option<Duration>,
	refresh_calls: Vec<bool>,
	cost_calls: Vec<(Address, u8, U256)>,
	quotes: Vec<SwapQuery>,
}

impl Default for State {
	fn default() -> Self {
		Self {
			cost: Ok(Decimal::ZERO),
			route: Ok(empty_route()),
			refresh: Ok(()),
			latency: None,
			refresh_calls: Vec::new(),
			cost_calls: Vec::new(),
			quotes: Vec::new(),
		}
	}
}

/// A route with no hops, as returned by the engine when no path exists.
pub fn empty_route() -> SwapRoute {
	SwapRoute {
		swaps: Vec::new(),
		token_addresses: Vec::new(),
		return_amount: "0".to_string(),
		swap_amount: None,
		return_amount_considering_fees: None,
		token_in: None,
		token_out: None,
		market_sp: None,
	}
}

/// Scripted [`RouterInterface`] that records every call it receives.
///
/// Clones share state.
#[derive(Clone, Default)]
pub struct MockRouter {
	state: Arc<Mutex<State>>,
}

impl MockRouter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set_cost(&self, cost: Decimal) {
		self.state.lock().unwrap().cost = Ok(cost);
	}

	pub fn fail_cost(&self, error: RouterError) {
		self.state.lock().unwrap().cost = Err(error);
	}

	pub fn set_route(&self, route: SwapRoute) {
		self.state.lock().unwrap().route = Ok(route);
	}

	pub fn fail_quote(&self, error: RouterError) {
		self.state.lock().unwrap().route = Err(error);
	}

	pub fn fail_refresh(&self, error: RouterError) {
		self.state.lock().unwrap().refresh = Err(error);
	}

	pub fn set_latency(&self, latency: Duration) {
		self.state.lock().unwrap().latency = Some(latency);
	}

	/// The `use_onchain_overrides` flag of every pool refresh, in order.
	pub fn refresh_calls(&self) -> Vec<bool> {
		self.state.lock().unwrap().refresh_calls.clone()
	}

	pub fn cost_calls(&self) -> Vec<(Address, u8, U256)> {
		self.state.lock().unwrap().cost_calls.clone()
	}

	pub fn quotes(&self) -> Vec<SwapQuery> {
		self.state.lock().unwrap().quotes.clone()
	}

	async fn delay(&self) {
		let latency = self.state.lock().unwrap().latency;
		if let Some(latency) = latency {
			tokio::time::sleep(latency).await;
		}
	}
}

#[async_trait]
impl RouterInterface for MockRouter {
	async fn refresh_pools(&self, use_onchain_overrides: bool) -> Result<(), RouterError> {
		self.delay().await;
		let mut state = self.state.lock().unwrap();
		state.refresh_calls.push(use_onchain_overrides);
		state.refresh.clone()
	}

	async fn calibrate_cost(
		&self,
		token: Address,
		decimals: u8,
		gas_price: U256,
	) -> Result<Decimal, RouterError> {
		self.delay().await;
		let mut state = self.state.lock().unwrap();
		state.cost_calls.push((token, decimals, gas_price));
		state.cost.clone()
	}

	async fn quote(&self, query: &SwapQuery) -> Result<SwapRoute, RouterError> {
		self.delay().await;
		let mut state = self.state.lock().unwrap();
		state.quotes.push(query.clone());
		state.route.clone()
	}
}
