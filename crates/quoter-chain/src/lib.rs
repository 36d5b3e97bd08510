//! Blockchain access for the quoter.
//!
//! The quoter needs two things from a chain: the current block number and
//! read-only contract calls. [`ChainInterface`] is the seam implementations
//! plug into; [`ChainService`] wraps one with a per-call timeout and typed
//! Solidity call encoding.

use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Re-export implementations
pub mod implementations {
	pub mod alloy;
}

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Errors that can occur while talking to the chain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
	#[error("Network error: {0}")]
	Network(String),
	#[error("Call reverted or failed: {0}")]
	Call(String),
	#[error("Failed to decode return data of {0}")]
	Decode(String),
	#[error("Timed out after {0}s")]
	Timeout(u64),
	#[error("Invalid configuration: {0}")]
	Config(String),
}

/// Trait defining the blockchain provider used by the quoter.
#[async_trait]
pub trait ChainInterface: Send + Sync {
	/// Returns the latest block number.
	async fn block_number(&self) -> Result<u64, ChainError>;

	/// Executes a read-only call of `data` against the contract at `to`.
	async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainError>;
}

/// Chain access with timeouts and typed contract calls.
pub struct ChainService {
	provider: Box<dyn ChainInterface>,
	timeout: Duration,
}

impl ChainService {
	pub fn new(provider: Box<dyn ChainInterface>, timeout: Duration) -> Self {
		Self { provider, timeout }
	}

	pub async fn block_number(&self) -> Result<u64, ChainError> {
		self.with_timeout(self.provider.block_number()).await
	}

	pub async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainError> {
		self.with_timeout(self.provider.call(to, data)).await
	}

	/// Encodes `call`, executes it against `to` and decodes the return value.
	pub async fn call_contract<C>(&self, to: Address, call: &C) -> Result<C::Return, ChainError>
	where
		C: SolCall + Sync,
	{
		debug!(contract = %to, method = C::SIGNATURE, "eth_call");
		let output = self.call(to, call.abi_encode().into()).await?;
		C::abi_decode_returns(&output)
			.map_err(|e| ChainError::Decode(format!("{}: {}", C::SIGNATURE, e)))
	}

	async fn with_timeout<T>(
		&self,
		fut: impl Future<Output = Result<T, ChainError>>,
	) -> Result<T, ChainError> {
		tokio::time::timeout(self.timeout, fut)
			.await
			.map_err(|_| ChainError::Timeout(self.timeout.as_secs()))?
	}
}
