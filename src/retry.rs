//! Attempt-bounded retry built on `backoff`.
//!
//! A `RetryPolicy` runs an async operation up to a fixed number of attempts. After each failure a
//! `RetryDecider` classifies the error: retry-worthy errors sleep for the policy delay and try
//! again, anything else stops immediately and is reported as `RetryError::Declined`. When the
//! budget runs out the last error is reported as `RetryError::Exhausted`.

use crate::provider::ProviderError;

use backoff::backoff::Backoff;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Attempt budget used for provider calls.
pub const DEFAULT_ATTEMPTS: usize = 3;
/// Fixed delay before repeating a throttled call.
pub const RATE_LIMIT_DELAY: Duration = Duration::from_secs(1);

/// Outcome of an operation that did not succeed within its retry policy.
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
	/// The decider refused to repeat the call after this error.
	#[error("decided not to repeat. {0}")]
	Declined(E),

	/// Every attempt failed with a retry-worthy error; this is the last one.
	#[error("{0}")]
	Exhausted(E),
}

impl<E> RetryError<E> {
	pub fn inner(&self) -> &E {
		match self {
			RetryError::Declined(err) | RetryError::Exhausted(err) => err,
		}
	}
}

/// Decides whether a failed attempt should be repeated.
pub trait RetryDecider<E>: Send + Sync {
	fn should_retry(&self, err: &E) -> bool;
}

impl<E, F> RetryDecider<E> for F
where
	F: Fn(&E) -> bool + Send + Sync,
{
	fn should_retry(&self, err: &E) -> bool {
		self(err)
	}
}

/// Retries provider calls only when the provider reported rate limiting.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateLimitDecider;

impl RetryDecider<ProviderError> for RateLimitDecider {
	fn should_retry(&self, err: &ProviderError) -> bool {
		err.is_rate_limited()
	}
}

/// Fixed-delay backoff that allows `retries` repetitions before giving up.
#[derive(Debug, Clone)]
struct AttemptBudget {
	retries: usize,
	remaining: usize,
	delay: Duration,
}

impl AttemptBudget {
	fn new(retries: usize, delay: Duration) -> Self {
		Self {
			retries,
			remaining: retries,
			delay,
		}
	}
}

impl Backoff for AttemptBudget {
	fn reset(&mut self) {
		self.remaining = self.retries;
	}

	fn next_backoff(&mut self) -> Option<Duration> {
		if self.remaining == 0 {
			return None;
		}

		self.remaining -= 1;
		Some(self.delay)
	}
}

/// Attempt count and delay between attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
	attempts: usize,
	delay: Duration,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self::new(DEFAULT_ATTEMPTS, RATE_LIMIT_DELAY)
	}
}

impl RetryPolicy {
	/// Create a policy. At least one attempt is always made.
	pub fn new(attempts: usize, delay: Duration) -> Self {
		Self {
			attempts: attempts.max(1),
			delay,
		}
	}

	pub fn attempts(&self) -> usize {
		self.attempts
	}

	pub fn delay(&self) -> Duration {
		self.delay
	}

	/// Run `operation` until it succeeds, the decider declines, or the attempts run out.
	pub async fn run<T, E, D, F, Fut>(&self, decider: &D, mut operation: F) -> Result<T, RetryError<E>>
	where
		D: RetryDecider<E> + ?Sized,
		E: fmt::Display,
		F: FnMut() -> Fut,
		Fut: Future<Output = Result<T, E>>,
	{
		let budget = AttemptBudget::new(self.attempts - 1, self.delay);

		backoff::future::retry_notify(
			budget,
			|| {
				let attempt = operation();
				async move {
					attempt.await.map_err(|err| {
						if decider.should_retry(&err) {
							backoff::Error::transient(RetryError::Exhausted(err))
						} else {
							backoff::Error::permanent(RetryError::Declined(err))
						}
					})
				}
			},
			|err: RetryError<E>, wait: Duration| {
				warn!("Attempt failed, retrying in {:?}: {}", wait, err.inner());
			},
		)
		.await
	}
}
