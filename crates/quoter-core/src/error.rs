use quoter_chain::ChainError;
use quoter_router::RouterError;
use quoter_tokens::TokenError;
use quoter_types::OrderError;
use thiserror::Error;

/// Reasons a quote request can fail.
#[derive(Error, Debug)]
pub enum QuoteError {
	/// The request could not be normalized into an order.
	#[error("{0}")]
	InvalidOrder(#[from] OrderError),

	/// Decimals of a token could not be read from the chain.
	#[error("Failed to fetch token metadata: {0}")]
	MetadataFetch(#[from] TokenError),

	/// The block number or the routing engine's pool refresh failed.
	#[error("Failed to refresh pool state: {0}")]
	PoolRefresh(String),

	/// The cost token's decimals or its price in the native asset could not be set.
	#[error("Failed to calibrate swap cost: {0}")]
	Calibration(String),

	/// The routing engine rejected or failed the quote.
	#[error("Failed to compute quote: {0}")]
	QuoteComputation(#[from] RouterError),
}

impl QuoteError {
	/// Stable identifier of the error category, used as the `error` field of API responses.
	pub fn code(&self) -> &'static str {
		match self {
			QuoteError::InvalidOrder(_) => "INVALID_ORDER",
			QuoteError::MetadataFetch(_) => "METADATA_FETCH_FAILED",
			QuoteError::PoolRefresh(_) => "POOL_REFRESH_FAILED",
			QuoteError::Calibration(_) => "CALIBRATION_FAILED",
			QuoteError::QuoteComputation(_) => "QUOTE_COMPUTATION_FAILED",
		}
	}
}

/// Errors raised while wiring the quoter together from configuration.
#[derive(Error, Debug)]
pub enum BuildError {
	/// No factory is registered under the configured provider name.
	#[error("Unknown {component} provider: {name}")]
	UnknownProvider {
		component: &'static str,
		name: String,
	},

	/// The chain implementation rejected its configuration.
	#[error("Chain provider error: {0}")]
	Chain(#[from] ChainError),

	/// The router implementation rejected its configuration.
	#[error("Router provider error: {0}")]
	Router(#[from] RouterError),
}
