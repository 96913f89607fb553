use crate::ledger::{BlockNumber, HexError};
use crate::provider::ProviderError;
use crate::retry::{RetryError, RetryPolicy};

/// Largest window a request may ask for; also the default fetch concurrency.
pub const MAX_NUM_BLOCKS: usize = 150;
/// Window used when the caller does not supply a usable value.
pub const DEFAULT_NUM_BLOCKS: usize = 100;

/// Knobs of the retrieval pipeline, passed in explicitly at construction.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
	/// Maximum number of provider calls in flight for one request.
	pub fetch_concurrency: usize,
	/// Retry policy applied to every provider call.
	pub retry: RetryPolicy,
}

impl Default for PipelineConfig {
	fn default() -> Self {
		Self {
			fetch_concurrency: MAX_NUM_BLOCKS,
			retry: RetryPolicy::default(),
		}
	}
}

/// Error types for the most-changed-wallet pipeline
#[derive(Debug, thiserror::Error)]
pub enum DeltaError {
	#[error("error fetch last block number. {0}")]
	Head(RetryError<ProviderError>),

	#[error("error fetch block {block}. {source}")]
	Fetch {
		block: BlockNumber,
		source: RetryError<ProviderError>,
	},

	#[error("error decode block number. {0}")]
	Decode(#[from] HexError),

	#[error("request cancelled")]
	Cancelled,

	#[error("request timed out")]
	Timeout,

	#[error("fetch task failed: {0}")]
	Task(#[from] tokio::task::JoinError),
}

impl DeltaError {
	/// Provider error behind a failed head or block retrieval.
	pub fn provider_error(&self) -> Option<&ProviderError> {
		match self {
			DeltaError::Head(err) | DeltaError::Fetch { source: err, .. } => Some(err.inner()),
			_ => None,
		}
	}

	/// Whether the request failed because the provider kept throttling us.
	pub fn is_rate_limited(&self) -> bool {
		self.provider_error()
			.is_some_and(ProviderError::is_rate_limited)
	}

	/// Whether the request was abandoned by its caller or ran out of time.
	pub fn is_timeout(&self) -> bool {
		matches!(self, DeltaError::Cancelled | DeltaError::Timeout)
	}
}
