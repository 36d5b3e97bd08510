//! Configuration loading from files and environment.

use crate::{Config, ConfigError};
use regex::{Captures, Regex};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};

static ENV_VAR_PATTERN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern is valid"));

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
	file_path: Option<PathBuf>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "QUOTER_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_path_buf());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	/// Reads, substitutes, parses, overrides and validates the configuration.
	pub async fn load(&self) -> Result<Config, ConfigError> {
		let path = self.file_path.as_ref().ok_or_else(|| {
			ConfigError::FileNotFound("No configuration file specified".to_string())
		})?;
		info!("Loading configuration from {:?}", path);

		let content = match tokio::fs::read_to_string(path).await {
			Ok(content) => content,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				return Err(ConfigError::FileNotFound(path.display().to_string()))
			}
			Err(e) => return Err(e.into()),
		};

		let lookup = |name: &str| env::var(name).ok();
		let content = substitute_env_vars(&content, lookup)?;
		let mut config = parse(path, &content)?;
		self.apply_env_overrides(&mut config, lookup)?;
		validate(&config)?;

		Ok(config)
	}

	/// Applies `<prefix>HTTP_PORT`, `<prefix>MAX_POOLS` and
	/// `<prefix>DEFAULT_GAS_PRICE` overrides.
	pub fn apply_env_overrides<F>(&self, config: &mut Config, lookup: F) -> Result<(), ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let var = |name: &str| lookup(&format!("{}{}", self.env_prefix, name));

		if let Some(http_port) = var("HTTP_PORT") {
			debug!("Overriding HTTP port from environment");
			config.quoter.http_port = http_port
				.parse()
				.map_err(|e| ConfigError::ValidationError(format!("Invalid HTTP port: {}", e)))?;
		}

		if let Some(gas_price) = var("DEFAULT_GAS_PRICE") {
			debug!("Overriding default gas price from environment");
			config.quoter.default_gas_price = quoter_types::parse_integer(&gas_price)
				.ok_or_else(|| {
					ConfigError::ValidationError(format!("Invalid default gas price: {}", gas_price))
				})?;
		}

		if let Some(max_pools) = var("MAX_POOLS") {
			debug!("Overriding max pools from environment");
			let max_pools: i64 = max_pools
				.parse()
				.map_err(|e| ConfigError::ValidationError(format!("Invalid max pools: {}", e)))?;
			let table = config.router.config.as_table_mut().ok_or_else(|| {
				ConfigError::ValidationError("router.config must be a table".to_string())
			})?;
			table.insert("max_pools".to_string(), toml::Value::Integer(max_pools));
		}

		Ok(())
	}
}

/// Replaces `${VAR_NAME}` patterns using `lookup`.
pub fn substitute_env_vars<F>(content: &str, lookup: F) -> Result<String, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	let mut missing = None;
	let substituted = ENV_VAR_PATTERN.replace_all(content, |caps: &Captures| {
		lookup(&caps[1]).unwrap_or_else(|| {
			missing.get_or_insert_with(|| caps[1].to_string());
			String::new()
		})
	});

	match missing {
		Some(var_name) => Err(ConfigError::EnvVarNotFound(var_name)),
		None => Ok(substituted.into_owned()),
	}
}

/// Parses configuration content according to the file extension.
pub fn parse(path: &Path, content: &str) -> Result<Config, ConfigError> {
	match path.extension().and_then(|s| s.to_str()) {
		Some("toml") => {
			toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
		}
		Some("json") => {
			serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
		}
		Some("yaml") | Some("yml") => {
			serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
		}
		_ => Err(ConfigError::ParseError(format!(
			"Unsupported config format: {:?}",
			path
		))),
	}
}

/// Checks cross-field constraints that deserialization cannot express.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
	if config.quoter.http_port == 0 {
		return Err(ConfigError::ValidationError(
			"HTTP port must be non-zero".to_string(),
		));
	}

	if config.quoter.request_timeout_secs == 0 {
		return Err(ConfigError::ValidationError(
			"Request timeout must be at least one second".to_string(),
		));
	}

	for (section, implementation) in [("chain", &config.chain), ("router", &config.router)] {
		if implementation.provider.trim().is_empty() {
			return Err(ConfigError::ValidationError(format!(
				"{}.provider must not be empty",
				section
			)));
		}
		if !implementation.config.is_table() {
			return Err(ConfigError::ValidationError(format!(
				"{}.config must be a table",
				section
			)));
		}
	}

	if let Some(max_pools) = config.router.config.get("max_pools") {
		if max_pools.as_integer().is_none_or(|n| n < 1) {
			return Err(ConfigError::ValidationError(
				"router.config.max_pools must be a positive integer".to_string(),
			));
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use quoter_types::U256;
	use std::collections::HashMap;
	use std::io::Write;

	const EXAMPLE: &str = r#"
[quoter]
name = "test-quoter"
http_port = 3001
default_gas_price = "25000000000"

[chain]
provider = "alloy"
[chain.config]
rpc_url = "https://mainnet.infura.io/v3/${TEST_PROJECT_ID}"

[router]
provider = "sor_http"
[router.config]
url = "http://127.0.0.1:8090"
chain_id = 1
max_pools = 4
"#;

	fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars: HashMap<String, String> = vars
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |name| vars.get(name).cloned()
	}

	#[test]
	fn test_toml_parsing() {
		let content = substitute_env_vars(EXAMPLE, env(&[("TEST_PROJECT_ID", "abc")])).unwrap();
		let config = parse(Path::new("quoter.toml"), &content).unwrap();

		assert_eq!(config.quoter.name, "test-quoter");
		assert_eq!(config.quoter.http_port, 3001);
		assert_eq!(config.quoter.default_gas_price, U256::from(25_000_000_000u64));
		assert_eq!(config.quoter.request_timeout_secs, 10);
		assert_eq!(config.chain.provider, "alloy");
		assert_eq!(
			config.chain.config.get("rpc_url").and_then(|v| v.as_str()),
			Some("https://mainnet.infura.io/v3/abc")
		);
		assert!(validate(&config).is_ok());
	}

	#[test]
	fn test_missing_env_var() {
		let err = substitute_env_vars(EXAMPLE, env(&[])).unwrap_err();
		assert!(matches!(err, ConfigError::EnvVarNotFound(name) if name == "TEST_PROJECT_ID"));
	}

	#[test]
	fn test_defaults() {
		let content = r#"
[chain]
provider = "alloy"

[router]
provider = "sor_http"
"#;
		let config = parse(Path::new("quoter.toml"), content).unwrap();
		assert_eq!(config.quoter.http_port, 3000);
		assert_eq!(config.quoter.default_gas_price, U256::from(30_000_000_000u64));
		assert!(config.router.config.as_table().unwrap().is_empty());
	}

	#[test]
	fn test_json_parsing() {
		let content = r#"{
			"chain": { "provider": "alloy", "config": { "rpc_url": "http://localhost:8545" } },
			"router": { "provider": "sor_http", "config": { "url": "http://localhost:8090" } }
		}"#;
		let config = parse(Path::new("quoter.json"), content).unwrap();
		assert_eq!(config.router.provider, "sor_http");
	}

	#[test]
	fn test_unsupported_extension() {
		assert!(matches!(
			parse(Path::new("quoter.ini"), ""),
			Err(ConfigError::ParseError(_))
		));
	}

	#[test]
	fn test_env_overrides() {
		let content = substitute_env_vars(EXAMPLE, env(&[("TEST_PROJECT_ID", "abc")])).unwrap();
		let mut config = parse(Path::new("quoter.toml"), &content).unwrap();

		ConfigLoader::new()
			.apply_env_overrides(
				&mut config,
				env(&[
					("QUOTER_HTTP_PORT", "8080"),
					("QUOTER_MAX_POOLS", "6"),
					("QUOTER_DEFAULT_GAS_PRICE", "1000"),
				]),
			)
			.unwrap();

		assert_eq!(config.quoter.http_port, 8080);
		assert_eq!(config.quoter.default_gas_price, U256::from(1000u64));
		assert_eq!(
			config.router.config.get("max_pools").and_then(|v| v.as_integer()),
			Some(6)
		);
	}

	#[test]
	fn test_invalid_override() {
		let content = substitute_env_vars(EXAMPLE, env(&[("TEST_PROJECT_ID", "abc")])).unwrap();
		let mut config = parse(Path::new("quoter.toml"), &content).unwrap();

		let err = ConfigLoader::new()
			.apply_env_overrides(&mut config, env(&[("QUOTER_HTTP_PORT", "not-a-port")]))
			.unwrap_err();
		assert!(matches!(err, ConfigError::ValidationError(_)));
	}

	#[test]
	fn test_validation_rejects_bad_max_pools() {
		let content = r#"
[chain]
provider = "alloy"

[router]
provider = "sor_http"
[router.config]
max_pools = 0
"#;
		let config = parse(Path::new("quoter.toml"), content).unwrap();
		assert!(matches!(
			validate(&config),
			Err(ConfigError::ValidationError(_))
		));
	}

	#[tokio::test]
	async fn test_load_from_file() {
		let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
		write!(
			file,
			r#"
[chain]
provider = "alloy"
[chain.config]
rpc_url = "http://localhost:8545"

[router]
provider = "sor_http"
"#
		)
		.unwrap();

		let config = ConfigLoader::new()
			.with_env_prefix("QUOTER_TEST_LOADER_UNSET_")
			.with_file(file.path())
			.load()
			.await
			.unwrap();
		assert_eq!(config.chain.provider, "alloy");
	}

	#[tokio::test]
	async fn test_load_missing_file() {
		let err = ConfigLoader::new()
			.with_file("/nonexistent/quoter.toml")
			.load()
			.await
			.unwrap_err();
		assert!(matches!(err, ConfigError::FileNotFound(_)));
	}
}
