//! Configuration for the SOR quoter.
//!
//! Configuration is read once at startup from a TOML, JSON or YAML file.
//! `${VAR}` references are substituted from the environment before parsing,
//! and a small set of `QUOTER_*` variables override individual settings.

use thiserror::Error;

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::*;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}
