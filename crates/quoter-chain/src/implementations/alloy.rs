//! Chain access over JSON-RPC using the Alloy library.

use crate::{ChainError, ChainInterface};
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes};
use alloy::providers::{Provider, RootProvider};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use quoter_types::{ConfigSchema, Field, Schema, ValidationError};

/// Alloy-based EVM chain access.
///
/// Uses a plain HTTP provider; no signer or fillers are needed since the
/// quoter only reads chain state.
pub struct AlloyChain {
	provider: RootProvider,
}

impl AlloyChain {
	pub fn new(rpc_url: &str) -> Result<Self, ChainError> {
		let url = rpc_url
			.parse()
			.map_err(|e| ChainError::Config(format!("Invalid RPC URL: {}", e)))?;

		Ok(Self {
			provider: RootProvider::new_http(url),
		})
	}
}

/// Configuration schema for the Alloy chain provider.
pub struct AlloyChainSchema;

impl ConfigSchema for AlloyChainSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![Field::url("rpc_url")], vec![]).validate(config)
	}
}

#[async_trait]
impl ChainInterface for AlloyChain {
	async fn block_number(&self) -> Result<u64, ChainError> {
		self.provider
			.get_block_number()
			.await
			.map_err(|e| ChainError::Network(format!("Failed to get block number: {}", e)))
	}

	async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainError> {
		let request = TransactionRequest::default().with_to(to).with_input(data);

		self.provider
			.call(request)
			.await
			.map_err(|e| ChainError::Call(format!("eth_call to {} failed: {}", to, e)))
	}
}

/// Factory function to create an Alloy chain provider from configuration.
///
/// Required configuration parameters:
/// - `rpc_url`: The HTTP RPC endpoint URL
pub fn create_alloy_chain(config: &toml::Value) -> Result<Box<dyn ChainInterface>, ChainError> {
	AlloyChainSchema
		.validate(config)
		.map_err(|e| ChainError::Config(e.to_string()))?;

	let rpc_url = config
		.get("rpc_url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| ChainError::Config("rpc_url is required".to_string()))?;

	Ok(Box::new(AlloyChain::new(rpc_url)?))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_schema_requires_http_url() {
		let config: toml::Value = toml::from_str(r#"rpc_url = "ws://localhost:8546""#).unwrap();
		assert!(AlloyChainSchema.validate(&config).is_err());

		let config: toml::Value = toml::from_str("").unwrap();
		assert!(matches!(
			create_alloy_chain(&config),
			Err(ChainError::Config(_))
		));
	}

	#[test]
	fn test_create_from_config() {
		let config: toml::Value =
			toml::from_str(r#"rpc_url = "http://localhost:8545""#).unwrap();
		assert!(create_alloy_chain(&config).is_ok());
	}
}
