//! Quote orchestration.
//!
//! [`QuoteEngine`] turns a validated order into a routing engine request: it
//! keeps the engine's pool snapshot and gas cost calibration current, resolves
//! token decimals through the metadata cache and hands the decimal-normalized
//! amount to the engine. [`QuoterBuilder`] wires an engine together from
//! configuration.

use quoter_chain::{ChainError, ChainInterface, ChainService};
use quoter_config::Config;
use quoter_router::{RouterError, RouterInterface, RouterService};
use quoter_tokens::TokenService;
use quoter_types::{
	fallback_symbol, Address, Order, OrderKind, QuoteRequest, SwapRoute, TokenAmount, U256,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

pub mod calibration;
pub mod error;
pub mod pools;

pub use calibration::CostCalibrator;
pub use error::{BuildError, QuoteError};
pub use pools::PoolRefresher;

/// Computes swap routes for orders.
pub struct QuoteEngine {
	tokens: Arc<TokenService>,
	router: Arc<RouterService>,
	pools: PoolRefresher,
	calibrator: CostCalibrator,
	default_gas_price: U256,
}

impl QuoteEngine {
	/// Creates an engine with an empty metadata cache and no pool refresh yet.
	pub fn new(chain: Arc<ChainService>, router: Arc<RouterService>, default_gas_price: U256) -> Self {
		let tokens = Arc::new(TokenService::new(chain.clone()));

		Self {
			pools: PoolRefresher::new(chain, router.clone()),
			calibrator: CostCalibrator::new(tokens.clone(), router.clone()),
			tokens,
			router,
			default_gas_price,
		}
	}

	pub fn tokens(&self) -> &TokenService {
		&self.tokens
	}

	pub fn router(&self) -> &RouterService {
		&self.router
	}

	pub fn pools(&self) -> &PoolRefresher {
		&self.pools
	}

	/// Gas price applied to requests that do not carry one.
	pub fn default_gas_price(&self) -> U256 {
		self.default_gas_price
	}

	/// Validates a raw request and computes its route.
	///
	/// Malformed requests are rejected before any chain or engine call.
	pub async fn process(&self, request: QuoteRequest) -> Result<SwapRoute, QuoteError> {
		debug!(?request, "Getting swap");
		let order = request.into_order(self.default_gas_price)?;
		self.compute_quote(order).await
	}

	/// Computes the route for a validated order.
	///
	/// Every step must succeed; nothing is retried. The engine's route is
	/// returned as is, including a route without hops when no path exists.
	#[instrument(skip_all, fields(kind = %order.kind))]
	pub async fn compute_quote(&self, order: Order) -> Result<SwapRoute, QuoteError> {
		let swap_kind = order.swap_kind();

		self.pools.ensure_fresh().await?;

		if self
			.calibrator
			.ensure_calibrated(swap_kind, order.sell_token, order.buy_token, order.gas_price)
			.await?
		{
			debug!("Updated token cost");
		}

		let decimals = self.tokens.decimals(order.amount_token()).await?;
		let amount = TokenAmount::new(order.amount, decimals);
		self.log_pair(&order, &amount).await;

		let route = self
			.router
			.quote(order.sell_token, order.buy_token, swap_kind, amount)
			.await?;

		info!(
			return_amount = %route.return_amount,
			hops = route.swaps.len(),
			"Computed route"
		);
		Ok(route)
	}

	async fn log_pair(&self, order: &Order, amount: &TokenAmount) {
		let (sell, buy) = tokio::join!(
			self.display_symbol(order.sell_token),
			self.display_symbol(order.buy_token),
		);
		match order.kind {
			OrderKind::Sell => info!("selling {} {} for {}", amount, sell, buy),
			OrderKind::Buy => info!("buying {} {} with {}", amount, buy, sell),
		}
	}

	async fn display_symbol(&self, token: Address) -> String {
		self.tokens
			.symbol(token)
			.await
			.unwrap_or_else(|_| fallback_symbol(&token))
	}
}

type ChainFactory =
	Box<dyn Fn(&toml::Value) -> Result<Box<dyn ChainInterface>, ChainError> + Send>;
type RouterFactory =
	Box<dyn Fn(&toml::Value) -> Result<Box<dyn RouterInterface>, RouterError> + Send>;

/// Builds a [`QuoteEngine`] from configuration.
///
/// Implementations are selected by the `provider` name of their
/// configuration section among the registered factories.
pub struct QuoterBuilder {
	config: Config,
	chain_factories: HashMap<String, ChainFactory>,
	router_factories: HashMap<String, RouterFactory>,
}

impl QuoterBuilder {
	pub fn new(config: Config) -> Self {
		Self {
			config,
			chain_factories: HashMap::new(),
			router_factories: HashMap::new(),
		}
	}

	pub fn with_chain_factory<F>(mut self, name: &str, factory: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<Box<dyn ChainInterface>, ChainError> + Send + 'static,
	{
		self.chain_factories
			.insert(name.to_string(), Box::new(factory));
		self
	}

	pub fn with_router_factory<F>(mut self, name: &str, factory: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<Box<dyn RouterInterface>, RouterError> + Send + 'static,
	{
		self.router_factories
			.insert(name.to_string(), Box::new(factory));
		self
	}

	pub fn build(self) -> Result<QuoteEngine, BuildError> {
		let settings = &self.config.quoter;

		let chain_factory = self
			.chain_factories
			.get(&self.config.chain.provider)
			.ok_or_else(|| BuildError::UnknownProvider {
				component: "chain",
				name: self.config.chain.provider.clone(),
			})?;
		let chain = Arc::new(ChainService::new(
			chain_factory(&self.config.chain.config)?,
			Duration::from_secs(settings.request_timeout_secs),
		));

		let router_factory = self
			.router_factories
			.get(&self.config.router.provider)
			.ok_or_else(|| BuildError::UnknownProvider {
				component: "router",
				name: self.config.router.provider.clone(),
			})?;
		let router = Arc::new(RouterService::new(
			router_factory(&self.config.router.config)?,
			settings.default_gas_price,
		));

		info!(
			chain = %self.config.chain.provider,
			router = %self.config.router.provider,
			"Quoter components initialized"
		);
		Ok(QuoteEngine::new(chain, router, settings.default_gas_price))
	}
}
