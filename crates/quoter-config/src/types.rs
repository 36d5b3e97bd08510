//! Configuration types for the quoter.

use quoter_types::{u256_serde, U256};
use serde::{Deserialize, Serialize};

/// Complete quoter configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Service settings
	#[serde(default)]
	pub quoter: QuoterSettings,
	/// Blockchain provider used for block numbers and token metadata
	pub chain: ImplementationConfig,
	/// Routing engine used for pool refreshes, cost calibration and quotes
	pub router: ImplementationConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuoterSettings {
	/// Service name used in logs
	#[serde(default = "default_name")]
	pub name: String,
	/// Port of the HTTP API
	#[serde(default = "default_http_port")]
	pub http_port: u16,
	/// Gas price in wei seeding the routing engine and used for requests without one
	#[serde(default = "default_gas_price", with = "u256_serde")]
	pub default_gas_price: U256,
	/// Timeout applied to every blockchain call
	#[serde(default = "default_request_timeout_secs")]
	pub request_timeout_secs: u64,
}

impl Default for QuoterSettings {
	fn default() -> Self {
		Self {
			name: default_name(),
			http_port: default_http_port(),
			default_gas_price: default_gas_price(),
			request_timeout_secs: default_request_timeout_secs(),
		}
	}
}

/// Selects an implementation by name and carries its own settings table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImplementationConfig {
	/// Name of the implementation, e.g. "alloy" or "sor_http"
	pub provider: String,
	/// Implementation-specific settings, validated by the implementation's schema
	#[serde(default = "empty_table")]
	pub config: toml::Value,
}

fn default_name() -> String {
	"sor-quoter".to_string()
}

fn default_http_port() -> u16 {
	3000
}

fn default_gas_price() -> U256 {
	U256::from(30_000_000_000u64)
}

fn default_request_timeout_secs() -> u64 {
	10
}

fn empty_table() -> toml::Value {
	toml::Value::Table(toml::Table::new())
}
