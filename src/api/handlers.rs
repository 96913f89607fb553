use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::ApiError;
use crate::delta::{DEFAULT_NUM_BLOCKS, DeltaError, DeltaService, MAX_NUM_BLOCKS};
use crate::provider::LedgerSource;

/// Shared state handed to every request
pub struct AppState {
	pub service: DeltaService<dyn LedgerSource>,
	pub request_timeout: Duration,
}

/// Query string of the most-changed endpoint
#[derive(Debug, Deserialize)]
pub struct MostChangedQuery {
	/// Window size as sent by the client. Parsed by the handler so bad input maps to a 400.
	pub blocks: Option<String>,
}

/// Response for the most-changed endpoint. Shares the wire shape of `WalletDelta`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MostChangedResponse {
	/// Address with the largest absolute balance change, or `""` if none was observed
	pub address: String,

	/// Signed hex delta of that address
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delta: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
	pub status: String,
}

/// Turn the raw `blocks` parameter into a window size.
///
/// Missing means the default, values above the maximum are clamped, and non-positive values
/// fall back to the default. Anything that is not an integer is rejected.
pub fn normalize_num_blocks(raw: Option<&str>) -> Result<usize, ApiError> {
	let Some(raw) = raw else {
		return Ok(DEFAULT_NUM_BLOCKS);
	};

	let requested: i64 = raw.trim().parse().map_err(|_| ApiError::InvalidQuery)?;

	Ok(match usize::try_from(requested) {
		Ok(0) | Err(_) => DEFAULT_NUM_BLOCKS,
		Ok(n) => n.min(MAX_NUM_BLOCKS),
	})
}

/// Run one pipeline call under the request timeout.
///
/// The call owns its cancellation token. On timeout the pipeline future is dropped, which aborts
/// its in-flight fetches.
async fn with_request_timeout<T, F, Fut>(timeout: Duration, call: F) -> Result<T, ApiError>
where
	F: FnOnce(CancellationToken) -> Fut,
	Fut: Future<Output = Result<T, DeltaError>>,
{
	let outcome = tokio::time::timeout(timeout, call(CancellationToken::new()))
		.await
		.map_err(|_| DeltaError::Timeout)?;

	Ok(outcome?)
}

/// Get the wallet whose balance changed the most over the last `blocks` blocks
pub async fn get_most_changed(
	state: web::Data<AppState>,
	query: web::Query<MostChangedQuery>,
) -> Result<HttpResponse, ApiError> {
	let num_blocks = normalize_num_blocks(query.blocks.as_deref())?;
	debug!("Most changed wallet requested over {} blocks", num_blocks);

	let wallet = with_request_timeout(state.request_timeout, |cancel| async move {
		state.service.most_changed_wallet(num_blocks, &cancel).await
	})
	.await?;

	Ok(match wallet {
		Some(wallet) => HttpResponse::Ok().json(wallet),
		None => HttpResponse::Ok().json(MostChangedResponse {
			address: String::new(),
			delta: None,
		}),
	})
}

/// Get only the address of the most changed wallet, `""` if none was observed
pub async fn get_most_changed_address(
	state: web::Data<AppState>,
	query: web::Query<MostChangedQuery>,
) -> Result<HttpResponse, ApiError> {
	let num_blocks = normalize_num_blocks(query.blocks.as_deref())?;
	debug!("Most changed address requested over {} blocks", num_blocks);

	let address = with_request_timeout(state.request_timeout, |cancel| async move {
		state.service.most_changed_address(num_blocks, &cancel).await
	})
	.await?;

	Ok(HttpResponse::Ok().json(MostChangedResponse {
		address,
		delta: None,
	}))
}

/// Liveness probe
pub async fn health() -> HttpResponse {
	HttpResponse::Ok().json(HealthResponse {
		status: "ok".to_string(),
	})
}
