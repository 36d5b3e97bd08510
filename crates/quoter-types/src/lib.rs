//! Shared types for the SOR quoter.
//!
//! This crate holds the request, order, route and token types passed between
//! the quoter crates, together with the configuration schema helpers used by
//! the pluggable chain and router implementations.

pub mod amount;
pub mod api;
pub mod order;
pub mod route;
pub mod token;
pub mod validation;

pub use amount::*;
pub use api::*;
pub use order::*;
pub use route::*;
pub use token::*;
pub use validation::*;

pub use alloy::primitives::{Address, U256};
