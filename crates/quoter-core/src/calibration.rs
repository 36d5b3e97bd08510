//! Gas cost calibration of the routing engine.

use crate::QuoteError;
use quoter_router::RouterService;
use quoter_tokens::TokenService;
use quoter_types::{Address, SwapKind, U256};
use std::sync::Arc;
use tracing::debug;

/// Keeps the engine's swap cost estimate in step with the requested gas price.
pub struct CostCalibrator {
	tokens: Arc<TokenService>,
	router: Arc<RouterService>,
}

impl CostCalibrator {
	pub fn new(tokens: Arc<TokenService>, router: Arc<RouterService>) -> Self {
		Self { tokens, router }
	}

	/// Recomputes the swap cost when the gas price changed or the cost token
	/// has never been priced. Returns whether the engine was recalibrated.
	///
	/// The cost token is the output token of exact-in swaps and the input
	/// token of exact-out swaps.
	pub async fn ensure_calibrated(
		&self,
		kind: SwapKind,
		token_in: Address,
		token_out: Address,
		gas_price: U256,
	) -> Result<bool, QuoteError> {
		let token = kind.cost_token(token_in, token_out);

		let stored_gas_price = self.router.gas_price().await;
		if stored_gas_price == gas_price && self.router.token_cost(&token).await.is_some() {
			return Ok(false);
		}

		debug!(%token, %stored_gas_price, %gas_price, "Token cost is stale");
		self.router.set_gas_price(gas_price).await;

		let decimals = self
			.tokens
			.decimals(token)
			.await
			.map_err(|e| QuoteError::Calibration(e.to_string()))?;
		self.router
			.set_cost_token(token, decimals)
			.await
			.map_err(|e| QuoteError::Calibration(e.to_string()))?;

		Ok(true)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use quoter_chain::testing::MockChain;
	use quoter_chain::ChainService;
	use quoter_router::testing::MockRouter;
	use quoter_router::RouterError;
	use quoter_tokens::testing::script_token;
	use rust_decimal::Decimal;
	use std::time::Duration;

	const GWEI_30: u64 = 30_000_000_000;

	struct Fixture {
		chain: MockChain,
		router: MockRouter,
		service: Arc<RouterService>,
		calibrator: CostCalibrator,
		usdc: Address,
		weth: Address,
	}

	fn fixture() -> Fixture {
		let chain = MockChain::new();
		let router = MockRouter::new();
		let usdc = Address::repeat_byte(0xa0);
		let weth = Address::repeat_byte(0xc0);
		script_token(&chain, usdc, Some("USDC"), Some(6));
		script_token(&chain, weth, Some("WETH"), Some(18));
		router.set_cost(Decimal::new(21, 4));

		let chain_service = Arc::new(ChainService::new(
			Box::new(chain.clone()),
			Duration::from_secs(5),
		));
		let service = Arc::new(RouterService::new(
			Box::new(router.clone()),
			U256::from(GWEI_30),
		));
		let calibrator = CostCalibrator::new(
			Arc::new(TokenService::new(chain_service)),
			service.clone(),
		);

		Fixture {
			chain,
			router,
			service,
			calibrator,
			usdc,
			weth,
		}
	}

	#[tokio::test]
	async fn test_first_request_calibrates_output_token() {
		let f = fixture();

		let updated = f
			.calibrator
			.ensure_calibrated(SwapKind::ExactIn, f.usdc, f.weth, U256::from(GWEI_30))
			.await
			.unwrap();

		assert!(updated);
		assert_eq!(f.router.cost_calls(), vec![(f.weth, 18, U256::from(GWEI_30))]);
		assert_eq!(f.service.token_cost(&f.weth).await, Some(Decimal::new(21, 4)));
	}

	#[tokio::test]
	async fn test_exact_out_calibrates_input_token() {
		let f = fixture();

		f.calibrator
			.ensure_calibrated(SwapKind::ExactOut, f.usdc, f.weth, U256::from(GWEI_30))
			.await
			.unwrap();

		assert_eq!(f.router.cost_calls(), vec![(f.usdc, 6, U256::from(GWEI_30))]);
	}

	#[tokio::test]
	async fn test_fresh_calibration_is_kept() {
		let f = fixture();
		let gas_price = U256::from(GWEI_30);

		f.calibrator
			.ensure_calibrated(SwapKind::ExactIn, f.usdc, f.weth, gas_price)
			.await
			.unwrap();
		let updated = f
			.calibrator
			.ensure_calibrated(SwapKind::ExactIn, f.usdc, f.weth, gas_price)
			.await
			.unwrap();

		assert!(!updated);
		assert_eq!(f.router.cost_calls().len(), 1);
	}

	#[tokio::test]
	async fn test_gas_price_change_recalibrates() {
		let f = fixture();

		f.calibrator
			.ensure_calibrated(SwapKind::ExactIn, f.usdc, f.weth, U256::from(GWEI_30))
			.await
			.unwrap();
		let updated = f
			.calibrator
			.ensure_calibrated(SwapKind::ExactIn, f.usdc, f.weth, U256::from(GWEI_30 + 1))
			.await
			.unwrap();

		assert!(updated);
		assert_eq!(f.service.gas_price().await, U256::from(GWEI_30 + 1));
		assert_eq!(
			f.router.cost_calls().last(),
			Some(&(f.weth, 18, U256::from(GWEI_30 + 1)))
		);
	}

	#[tokio::test]
	async fn test_unknown_decimals_fail_calibration() {
		let f = fixture();
		let unknown = Address::repeat_byte(0xee);

		let err = f
			.calibrator
			.ensure_calibrated(SwapKind::ExactIn, f.usdc, unknown, U256::from(GWEI_30))
			.await
			.unwrap_err();

		assert!(matches!(err, QuoteError::Calibration(_)));
		assert!(f.router.cost_calls().is_empty());
		assert_eq!(f.chain.calls_to(unknown), 2);
	}

	#[tokio::test]
	async fn test_engine_failure_fails_calibration() {
		let f = fixture();
		f.router
			.fail_cost(RouterError::Engine("no price data".to_string()));

		let err = f
			.calibrator
			.ensure_calibrated(SwapKind::ExactIn, f.usdc, f.weth, U256::from(GWEI_30))
			.await
			.unwrap_err();

		assert!(matches!(err, QuoteError::Calibration(_)));
		assert_eq!(f.service.token_cost(&f.weth).await, None);
	}
}
