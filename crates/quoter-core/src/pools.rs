//! Block-driven pool state refresh.

use crate::QuoteError;
use quoter_chain::ChainService;
use quoter_router::RouterService;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Reloads the routing engine's pools whenever the chain has advanced.
///
/// No block has been seen before the first request, so it always triggers a
/// refresh, even on a chain still at block 0.
pub struct PoolRefresher {
	chain: Arc<ChainService>,
	router: Arc<RouterService>,
	last_block: Mutex<Option<u64>>,
}

impl PoolRefresher {
	pub fn new(chain: Arc<ChainService>, router: Arc<RouterService>) -> Self {
		Self {
			chain,
			router,
			last_block: Mutex::new(None),
		}
	}

	/// Block number of the last successful refresh, 0 before the first.
	pub async fn last_block(&self) -> u64 {
		self.last_block.lock().await.unwrap_or(0)
	}

	/// Refreshes the pools if the current block differs from the last refresh.
	///
	/// Returns whether a refresh happened. Requests that observe the same new
	/// block are serialized on the cursor, so only the first one refreshes.
	/// On failure the cursor is left untouched and the next call retries.
	pub async fn ensure_fresh(&self) -> Result<bool, QuoteError> {
		let block = self
			.chain
			.block_number()
			.await
			.map_err(|e| QuoteError::PoolRefresh(e.to_string()))?;

		let mut last_block = self.last_block.lock().await;
		if *last_block == Some(block) {
			return Ok(false);
		}

		let previous = *last_block;
		info!(from = ?previous, to = block, "Fetching on-chain pool info");
		self.router
			.refresh_pools(true)
			.await
			.map_err(|e| QuoteError::PoolRefresh(e.to_string()))?;
		*last_block = Some(block);

		Ok(true)
	}
}
