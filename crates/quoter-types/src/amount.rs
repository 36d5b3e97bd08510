//! Decimal-normalized token amounts.

use alloy::primitives::U256;
use serde::{Serialize, Serializer};
use std::fmt;

/// A base-unit token amount together with the token's decimal precision.
///
/// The amount is kept as the exact integer the caller supplied; its decimal
/// form (`raw / 10^decimals`) is produced on display so no precision is lost
/// for any `U256` value or decimal count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAmount {
	raw: U256,
	decimals: u8,
}

impl TokenAmount {
	pub fn new(raw: U256, decimals: u8) -> Self {
		Self { raw, decimals }
	}

	/// The amount in token base units.
	pub fn raw(&self) -> U256 {
		self.raw
	}

	pub fn decimals(&self) -> u8 {
		self.decimals
	}

	pub fn is_zero(&self) -> bool {
		self.raw.is_zero()
	}
}

impl fmt::Display for TokenAmount {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let digits = self.raw.to_string();
		let scale = self.decimals as usize;

		if scale == 0 {
			return f.write_str(&digits);
		}

		let (integer, fraction) = if digits.len() > scale {
			let split = digits.len() - scale;
			(digits[..split].to_string(), digits[split..].to_string())
		} else {
			("0".to_string(), format!("{:0>width$}", digits, width = scale))
		};

		let fraction = fraction.trim_end_matches('0');
		if fraction.is_empty() {
			f.write_str(&integer)
		} else {
			write!(f, "{}.{}", integer, fraction)
		}
	}
}

impl Serialize for TokenAmount {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.collect_str(self)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn amount(raw: &str, decimals: u8) -> String {
		TokenAmount::new(U256::from_str_radix(raw, 10).unwrap(), decimals).to_string()
	}

	#[test]
	fn test_whole_units() {
		assert_eq!(amount("1000000", 6), "1");
		assert_eq!(amount("2000000", 6), "2");
		assert_eq!(amount("2500000000000000000", 18), "2.5");
	}

	#[test]
	fn test_smallest_unit() {
		assert_eq!(amount("1", 18), "0.000000000000000001");
		assert_eq!(amount("10", 2), "0.1");
	}

	#[test]
	fn test_zero_and_no_decimals() {
		assert_eq!(amount("0", 18), "0");
		assert_eq!(amount("12345", 0), "12345");
	}

	#[test]
	fn test_decimals_beyond_u256_range() {
		// 10^100 does not fit in a U256 but the formatting must still be exact.
		let formatted = amount("5", 100);
		assert!(formatted.starts_with("0.0"));
		assert!(formatted.ends_with('5'));
		assert_eq!(formatted.len(), 2 + 100);
	}

	#[test]
	fn test_serializes_as_string() {
		let value = TokenAmount::new(U256::from(1_500_000u64), 6);
		assert_eq!(serde_json::to_string(&value).unwrap(), "\"1.5\"");
	}
}
