//! SOR quoter service.
//!
//! Wires the built-in chain and router implementations into a
//! [`QuoteEngine`](quoter_core::QuoteEngine) and serves it over HTTP.

use quoter_chain::implementations::alloy::create_alloy_chain;
use quoter_config::Config;
use quoter_core::QuoterBuilder;
use quoter_router::implementations::sor::create_sor_router;

pub mod apis;
pub mod server;

/// Returns a builder with every built-in implementation registered.
///
/// | Section  | Provider   | Implementation  |
/// |----------|------------|-----------------|
/// | `chain`  | `alloy`    | `AlloyChain`    |
/// | `router` | `sor_http` | `SorHttpRouter` |
pub fn builder(config: Config) -> QuoterBuilder {
	QuoterBuilder::new(config)
		.with_chain_factory("alloy", create_alloy_chain)
		.with_router_factory("sor_http", create_sor_router)
}
