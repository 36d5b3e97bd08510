//! Schema validation for implementation-specific configuration tables.
//!
//! Chain and router implementations receive their settings as a raw
//! `toml::Value`; each exposes a [`ConfigSchema`] so configuration errors are
//! reported before the implementation is constructed.

use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
	/// A required key is absent from the table.
	#[error("Missing required field: {0}")]
	MissingField(String),
	/// The key has the right type but fails a range or format check.
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	/// The key holds a TOML value of the wrong type.
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: &'static str,
		actual: String,
	},
}

/// Type of a configuration field.
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
	String,
	Integer { min: Option<i64>, max: Option<i64> },
	Boolean,
}

/// Type alias for field validator functions.
pub type FieldValidator = Box<dyn Fn(&toml::Value) -> Result<(), String> + Send + Sync>;

/// A field definition with name, type and optional custom check.
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
	pub validator: Option<FieldValidator>,
}

impl std::fmt::Debug for Field {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Field")
			.field("name", &self.name)
			.field("field_type", &self.field_type)
			.field("validator", &self.validator.is_some())
			.finish()
	}
}

impl Field {
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
			validator: None,
		}
	}

	/// A string field that must hold an http(s) URL.
	pub fn url(name: impl Into<String>) -> Self {
		Self::new(name, FieldType::String).with_validator(|value| {
			let url = value.as_str().unwrap_or_default();
			if url.starts_with("http://") || url.starts_with("https://") {
				Ok(())
			} else {
				Err("URL must start with http:// or https://".to_string())
			}
		})
	}

	/// An integer field that must be at least one.
	pub fn positive_integer(name: impl Into<String>) -> Self {
		Self::new(
			name,
			FieldType::Integer {
				min: Some(1),
				max: None,
			},
		)
	}

	pub fn with_validator<F>(mut self, validator: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<(), String> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(validator));
		self
	}

	fn check(&self, value: &toml::Value) -> Result<(), ValidationError> {
		let mismatch = |expected| ValidationError::TypeMismatch {
			field: self.name.clone(),
			expected,
			actual: value.type_str().to_string(),
		};

		match self.field_type {
			FieldType::String if !value.is_str() => return Err(mismatch("string")),
			FieldType::Boolean if !value.is_bool() => return Err(mismatch("boolean")),
			FieldType::Integer { min, max } => {
				let int_val = value.as_integer().ok_or_else(|| mismatch("integer"))?;
				if let Some(min_val) = min.filter(|m| int_val < *m) {
					return Err(self.invalid(format!(
						"Value {} is less than minimum {}",
						int_val, min_val
					)));
				}
				if let Some(max_val) = max.filter(|m| int_val > *m) {
					return Err(self.invalid(format!(
						"Value {} is greater than maximum {}",
						int_val, max_val
					)));
				}
			}
			_ => {}
		}

		match &self.validator {
			Some(validator) => validator(value).map_err(|message| self.invalid(message)),
			None => Ok(()),
		}
	}

	fn invalid(&self, message: String) -> ValidationError {
		ValidationError::InvalidValue {
			field: self.name.clone(),
			message,
		}
	}
}

/// Schema definition with required and optional fields.
#[derive(Debug)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Validates a TOML table against this schema.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| ValidationError::TypeMismatch {
				field: "root".to_string(),
				expected: "table",
				actual: config.type_str().to_string(),
			})?;

		for field in &self.required {
			let value = table
				.get(&field.name)
				.ok_or_else(|| ValidationError::MissingField(field.name.clone()))?;
			field.check(value)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				field.check(value)?;
			}
		}

		Ok(())
	}
}

/// Trait defining a configuration schema that can validate TOML values.
pub trait ConfigSchema: Send + Sync {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}
