//! HTTP server for the quote API.
//!
//! A single endpoint, `POST /`, accepts an order as JSON and answers with the
//! routing engine's swap route. Failures are reported as an [`ErrorResponse`]
//! with a non-2xx status; they never take the server down.

use crate::apis::quote::{error_response, process_quote_request, status_code};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use quoter_core::QuoteEngine;
use quoter_types::{ErrorResponse, QuoteRequest};
use std::future::Future;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	pub engine: Arc<QuoteEngine>,
}

/// Builds the API router.
pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/", post(handle_quote))
		.with_state(state)
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
}

/// Serves the API on `port` until `shutdown` resolves.
pub async fn start_server<F>(engine: Arc<QuoteEngine>, port: u16, shutdown: F) -> anyhow::Result<()>
where
	F: Future<Output = ()> + Send + 'static,
{
	let app = router(AppState { engine });
	let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

	info!("Server listening at http://localhost:{}", port);

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown)
		.await?;

	Ok(())
}

/// Handles `POST /` requests.
async fn handle_quote(
	State(state): State<AppState>,
	payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> Response {
	let span = info_span!("quote", request_id = %Uuid::new_v4());

	async move {
		let Json(request) = match payload {
			Ok(payload) => payload,
			Err(rejection) => {
				warn!("Rejected quote request body: {}", rejection.body_text());
				return (
					StatusCode::BAD_REQUEST,
					Json(ErrorResponse {
						error: "INVALID_ORDER".to_string(),
						message: rejection.body_text(),
					}),
				)
					.into_response();
			}
		};

		match process_quote_request(request, &state.engine).await {
			Ok(route) => Json(route).into_response(),
			Err(e) => {
				warn!("Error: {}", e);
				(status_code(&e), Json(error_response(&e))).into_response()
			}
		}
	}
	.instrument(span)
	.await
}
