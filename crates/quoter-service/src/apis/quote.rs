//! Quote endpoint logic.
//!
//! Runs a request through the [`QuoteEngine`] and translates failures into
//! API error responses.

use axum::http::StatusCode;
use quoter_core::{QuoteEngine, QuoteError};
use quoter_types::{ErrorResponse, QuoteRequest, SwapRoute};
use std::time::Instant;
use tracing::{debug, info};

/// Computes the swap route for a quote request.
pub async fn process_quote_request(
	request: QuoteRequest,
	engine: &QuoteEngine,
) -> Result<SwapRoute, QuoteError> {
	info!(
		sell_token = %request.sell_token,
		buy_token = %request.buy_token,
		kind = %request.order_kind,
		amount = %request.amount,
		"Processing quote request"
	);

	let started = Instant::now();
	let route = engine.process(request).await?;
	debug!(elapsed_ms = started.elapsed().as_millis() as u64, "Quote computed");

	Ok(route)
}

/// HTTP status reported for a failed quote.
///
/// Malformed orders are the caller's fault; tokens whose metadata cannot be
/// read are well-formed but unprocessable; everything else is an upstream
/// failure of the chain or the routing engine.
pub fn status_code(error: &QuoteError) -> StatusCode {
	match error {
		QuoteError::InvalidOrder(_) => StatusCode::BAD_REQUEST,
		QuoteError::MetadataFetch(_) => StatusCode::UNPROCESSABLE_ENTITY,
		QuoteError::PoolRefresh(_)
		| QuoteError::Calibration(_)
		| QuoteError::QuoteComputation(_) => StatusCode::BAD_GATEWAY,
	}
}

pub fn error_response(error: &QuoteError) -> ErrorResponse {
	ErrorResponse {
		error: error.code().to_string(),
		message: error.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use quoter_router::RouterError;
	use quoter_types::OrderError;

	#[test]
	fn test_status_codes() {
		let invalid = QuoteError::InvalidOrder(OrderError::UnknownKind("trade".to_string()));
		assert_eq!(status_code(&invalid), StatusCode::BAD_REQUEST);
		assert_eq!(
			status_code(&QuoteError::PoolRefresh("timeout".to_string())),
			StatusCode::BAD_GATEWAY
		);
		assert_eq!(
			status_code(&QuoteError::QuoteComputation(RouterError::Engine(
				"no pools".to_string()
			))),
			StatusCode::BAD_GATEWAY
		);
	}

	#[test]
	fn test_error_response_body() {
		let body = error_response(&QuoteError::InvalidOrder(OrderError::UnknownKind(
			"trade".to_string(),
		)));
		assert_eq!(body.error, "INVALID_ORDER");
		assert_eq!(body.message, "invalid order kind trade");
	}
}
