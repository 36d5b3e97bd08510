//! HTTP client for a smart order router sidecar.
//!
//! The sidecar hosts the routing engine and exposes three JSON endpoints:
//! `POST /pools/refresh`, `POST /cost` and `POST /swaps`.

use crate::{RouterError, RouterInterface, SwapQuery};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use quoter_types::{
	ConfigSchema, Field, FieldType, Schema, SwapKind, SwapRoute, TokenAmount, ValidationError,
};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const DEFAULT_CHAIN_ID: u64 = 1;
const DEFAULT_MAX_POOLS: u32 = 4;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshPoolsRequest<'a> {
	use_onchain_overrides: bool,
	chain_id: u64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pools_source: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CostRequest {
	token: Address,
	decimals: u8,
	#[serde(with = "quoter_types::u256_serde")]
	gas_price: U256,
	chain_id: u64,
}

#[derive(Deserialize)]
struct CostResponse {
	cost: Decimal,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SwapsRequest {
	token_in: Address,
	token_out: Address,
	swap_type: SwapKind,
	amount: TokenAmount,
	#[serde(with = "quoter_types::u256_serde")]
	gas_price: U256,
	cost_output_token: Decimal,
	max_pools: u32,
	chain_id: u64,
}

/// Routing engine reached over HTTP.
pub struct SorHttpRouter {
	client: Client,
	base_url: String,
	pools_source: Option<String>,
	chain_id: u64,
	max_pools: u32,
}

impl SorHttpRouter {
	pub fn new(
		base_url: &str,
		pools_source: Option<String>,
		chain_id: u64,
		max_pools: u32,
		timeout: Duration,
	) -> Result<Self, RouterError> {
		let client = Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| RouterError::Config(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self {
			client,
			base_url: base_url.trim_end_matches('/').to_string(),
			pools_source,
			chain_id,
			max_pools,
		})
	}

	async fn send<B: Serialize + Sync>(
		&self,
		path: &str,
		body: &B,
	) -> Result<reqwest::Response, RouterError> {
		let url = format!("{}{}", self.base_url, path);
		debug!("POST {}", url);

		let response = self
			.client
			.post(&url)
			.json(body)
			.send()
			.await
			.map_err(|e| RouterError::Network(format!("POST {} failed: {}", url, e)))?;

		let status = response.status();
		if !status.is_success() {
			let message = response.text().await.unwrap_or_default();
			return Err(RouterError::Engine(format!(
				"{} returned {}: {}",
				path, status, message
			)));
		}

		Ok(response)
	}

	async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, RouterError>
	where
		B: Serialize + Sync,
		R: DeserializeOwned,
	{
		self.send(path, body)
			.await?
			.json()
			.await
			.map_err(|e| RouterError::InvalidResponse(format!("{}: {}", path, e)))
	}
}

#[async_trait]
impl RouterInterface for SorHttpRouter {
	async fn refresh_pools(&self, use_onchain_overrides: bool) -> Result<(), RouterError> {
		let request = RefreshPoolsRequest {
			use_onchain_overrides,
			chain_id: self.chain_id,
			pools_source: self.pools_source.as_deref(),
		};
		self.send("/pools/refresh", &request).await?;
		Ok(())
	}

	async fn calibrate_cost(
		&self,
		token: Address,
		decimals: u8,
		gas_price: U256,
	) -> Result<Decimal, RouterError> {
		let request = CostRequest {
			token,
			decimals,
			gas_price,
			chain_id: self.chain_id,
		};
		let response: CostResponse = self.post("/cost", &request).await?;
		Ok(response.cost)
	}

	async fn quote(&self, query: &SwapQuery) -> Result<SwapRoute, RouterError> {
		let request = SwapsRequest {
			token_in: query.token_in,
			token_out: query.token_out,
			swap_type: query.kind,
			amount: query.amount,
			gas_price: query.gas_price,
			cost_output_token: query.cost_output_token,
			max_pools: self.max_pools,
			chain_id: self.chain_id,
		};
		self.post("/swaps", &request).await
	}
}

/// Configuration schema for the SOR HTTP router.
pub struct SorHttpRouterSchema;

impl ConfigSchema for SorHttpRouterSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::url("url")],
			vec![
				Field::url("pools_source"),
				Field::positive_integer("chain_id"),
				Field::new(
					"max_pools",
					FieldType::Integer {
						min: Some(1),
						max: Some(u32::MAX as i64),
					},
				),
				Field::positive_integer("timeout_secs"),
			],
		);
		schema.validate(config)
	}
}

/// Factory function to create the SOR HTTP router from configuration.
///
/// Configuration parameters:
/// - `url`: Base URL of the router sidecar (required)
/// - `pools_source`: Pool snapshot source the sidecar should index
/// - `chain_id`: Chain the pools live on (default 1)
/// - `max_pools`: Maximum number of pools per route (default 4)
/// - `timeout_secs`: Per-request timeout (default 30)
pub fn create_sor_router(config: &toml::Value) -> Result<Box<dyn RouterInterface>, RouterError> {
	SorHttpRouterSchema
		.validate(config)
		.map_err(|e| RouterError::Config(e.to_string()))?;

	let url = config
		.get("url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| RouterError::Config("url is required".to_string()))?;
	let pools_source = config
		.get("pools_source")
		.and_then(|v| v.as_str())
		.map(str::to_string);
	let chain_id = config
		.get("chain_id")
		.and_then(|v| v.as_integer())
		.map_or(DEFAULT_CHAIN_ID, |v| v as u64);
	let max_pools = config
		.get("max_pools")
		.and_then(|v| v.as_integer())
		.map_or(DEFAULT_MAX_POOLS, |v| v as u32);
	let timeout_secs = config
		.get("timeout_secs")
		.and_then(|v| v.as_integer())
		.map_or(DEFAULT_TIMEOUT_SECS, |v| v as u64);

	Ok(Box::new(SorHttpRouter::new(
		url,
		pools_source,
		chain_id,
		max_pools,
		Duration::from_secs(timeout_secs),
	)?))
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use std::str::FromStr;
	use wiremock::matchers::{body_json, body_partial_json, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
	const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";

	fn router(server: &MockServer) -> SorHttpRouter {
		SorHttpRouter::new(&server.uri(), None, 1, 4, Duration::from_secs(5)).unwrap()
	}

	#[tokio::test]
	async fn test_refresh_pools() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/pools/refresh"))
			.and(body_json(json!({ "useOnchainOverrides": true, "chainId": 1 })))
			.respond_with(ResponseTemplate::new(204))
			.expect(1)
			.mount(&server)
			.await;

		router(&server).refresh_pools(true).await.unwrap();
	}

	#[tokio::test]
	async fn test_calibrate_cost() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/cost"))
			.and(body_partial_json(json!({
				"decimals": 18,
				"gasPrice": "30000000000"
			})))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "cost": "0.0042" })))
			.mount(&server)
			.await;

		let cost = router(&server)
			.calibrate_cost(
				Address::from_str(WETH).unwrap(),
				18,
				U256::from(30_000_000_000u64),
			)
			.await
			.unwrap();
		assert_eq!(cost, Decimal::from_str("0.0042").unwrap());
	}

	#[tokio::test]
	async fn test_quote_sends_normalized_amount() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/swaps"))
			.and(body_partial_json(json!({
				"swapType": "swapExactIn",
				"amount": "2",
				"maxPools": 4
			})))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"swaps": [],
				"tokenAddresses": [],
				"returnAmount": "0"
			})))
			.mount(&server)
			.await;

		let query = SwapQuery {
			token_in: Address::from_str(USDC).unwrap(),
			token_out: Address::from_str(WETH).unwrap(),
			kind: SwapKind::ExactIn,
			amount: TokenAmount::new(U256::from(2_000_000u64), 6),
			gas_price: U256::from(30_000_000_000u64),
			cost_output_token: Decimal::ZERO,
		};
		let route = router(&server).quote(&query).await.unwrap();
		assert!(route.is_empty());
		assert_eq!(route.return_amount, "0");
	}

	#[tokio::test]
	async fn test_engine_error_status() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/pools/refresh"))
			.respond_with(ResponseTemplate::new(500).set_body_string("subgraph unavailable"))
			.mount(&server)
			.await;

		let err = router(&server).refresh_pools(true).await.unwrap_err();
		assert!(matches!(err, RouterError::Engine(message) if message.contains("subgraph unavailable")));
	}

	#[tokio::test]
	async fn test_malformed_response() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/cost"))
			.respond_with(ResponseTemplate::new(200).set_body_string("not json"))
			.mount(&server)
			.await;

		let err = router(&server)
			.calibrate_cost(Address::ZERO, 18, U256::from(1u64))
			.await
			.unwrap_err();
		assert!(matches!(err, RouterError::InvalidResponse(_)));
	}

	#[tokio::test]
	async fn test_unreachable_engine() {
		let router =
			SorHttpRouter::new("http://127.0.0.1:1", None, 1, 4, Duration::from_secs(1)).unwrap();
		let err = router.refresh_pools(true).await.unwrap_err();
		assert!(matches!(err, RouterError::Network(_)));
	}

	#[test]
	fn test_create_from_config() {
		let config: toml::Value = toml::from_str(
			r#"
url = "http://127.0.0.1:8090/"
chain_id = 1
max_pools = 6
"#,
		)
		.unwrap();
		assert!(create_sor_router(&config).is_ok());

		let config: toml::Value = toml::from_str("max_pools = 4").unwrap();
		assert!(matches!(
			create_sor_router(&config),
			Err(RouterError::Config(_))
		));

		let config: toml::Value =
			toml::from_str(r#"url = "http://127.0.0.1:8090""#).unwrap();
		let mut table = config.as_table().unwrap().clone();
		table.insert("max_pools".to_string(), toml::Value::Integer(0));
		assert!(SorHttpRouterSchema
			.validate(&toml::Value::Table(table))
			.is_err());
	}
}
