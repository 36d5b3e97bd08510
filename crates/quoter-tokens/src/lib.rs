//! On-chain token metadata cache.
//!
//! Symbols and decimals of ERC-20 tokens are read from the chain the first
//! time a token is seen and kept for the lifetime of the process. Entries are
//! keyed by [`Address`], so every hex casing of an address shares one entry.

use alloy::primitives::Address;
use alloy::sol;
use dashmap::DashMap;
use quoter_chain::{ChainError, ChainService};
use quoter_types::{fallback_symbol, TokenMetadata};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

#[cfg(any(test, feature = "testing"))]
pub mod testing;

sol! {
	/// Read-only subset of the ERC-20 metadata extension.
	interface IERC20Metadata {
		function symbol() external view returns (string);
		function decimals() external view returns (uint8);
	}
}

/// Errors that can occur while fetching token metadata.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
	#[error("Failed to fetch decimals of {token}: {source}")]
	Decimals { token: Address, source: ChainError },
}

/// Process-wide cache of token metadata.
///
/// Concurrent lookups of the same uncached token share a single in-flight
/// fetch. A failed fetch leaves nothing behind, so the next lookup retries.
pub struct TokenService {
	chain: Arc<ChainService>,
	cache: DashMap<Address, Arc<OnceCell<TokenMetadata>>>,
}

impl TokenService {
	pub fn new(chain: Arc<ChainService>) -> Self {
		Self {
			chain,
			cache: DashMap::new(),
		}
	}

	/// Returns the metadata of `token`, fetching it on first use.
	pub async fn metadata(&self, token: Address) -> Result<TokenMetadata, TokenError> {
		// The map guard must not be held across the fetch.
		let cell = self.cache.entry(token).or_default().clone();
		let metadata = cell.get_or_try_init(|| self.fetch(token)).await?;
		Ok(metadata.clone())
	}

	pub async fn symbol(&self, token: Address) -> Result<String, TokenError> {
		Ok(self.metadata(token).await?.symbol)
	}

	pub async fn decimals(&self, token: Address) -> Result<u8, TokenError> {
		Ok(self.metadata(token).await?.decimals)
	}

	/// Returns the metadata of `token` if it has already been fetched.
	pub fn cached(&self, token: &Address) -> Option<TokenMetadata> {
		self.cache
			.get(token)
			.and_then(|cell| cell.value().get().cloned())
	}

	/// Number of tokens with cached metadata.
	pub fn len(&self) -> usize {
		self.cache
			.iter()
			.filter(|entry| entry.value().initialized())
			.count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	#[instrument(skip(self))]
	async fn fetch(&self, token: Address) -> Result<TokenMetadata, TokenError> {
		let (symbol, decimals) = tokio::join!(
			self.chain
				.call_contract(token, &IERC20Metadata::symbolCall {}),
			self.chain
				.call_contract(token, &IERC20Metadata::decimalsCall {}),
		);

		let decimals = decimals.map_err(|source| TokenError::Decimals { token, source })?;
		let symbol = symbol.unwrap_or_else(|e| {
			debug!("Token has no readable symbol, using shortened address: {}", e);
			fallback_symbol(&token)
		});

		debug!(%symbol, decimals, "Fetched token metadata");
		Ok(TokenMetadata { symbol, decimals })
	}
}
