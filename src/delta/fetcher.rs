//! Concurrent block retrieval.
//!
//! `BlockFetcher` spawns one task per block of the requested window. Each task fetches its block
//! under the retry policy and forwards the transactions into a bounded channel. The first task
//! that fails cancels its siblings and fails the whole retrieval; no partial window is ever
//! reported as success.
//!
//! Every task owns a clone of the channel sender, so the channel closes exactly when the last
//! task has exited, whichever way it exited.
//!
//! The concurrency limit applies per call: each retrieval gets its own permits, so concurrent
//! requests never queue behind each other.

use crate::delta::{DeltaError, PipelineConfig};
use crate::ledger::{BlockNumber, Transaction};
use crate::provider::LedgerSource;
use crate::retry::{RateLimitDecider, RetryPolicy};

use num_bigint::BigUint;
use num_traits::Zero;
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Block numbers `head, head - 1, ...` covering `num_blocks` blocks, stopping at genesis.
pub fn block_window(head: &BigUint, num_blocks: usize) -> Vec<BigUint> {
	let mut window = Vec::with_capacity(num_blocks);
	let mut number = head.clone();

	for _ in 0..num_blocks {
		window.push(number.clone());
		if number.is_zero() {
			break;
		}
		number -= 1u32;
	}

	window
}

pub struct BlockFetcher<S: ?Sized> {
	source: Arc<S>,
	retry: RetryPolicy,
	fetch_concurrency: usize,
}

impl<S: LedgerSource + ?Sized + 'static> BlockFetcher<S> {
	pub fn new(source: Arc<S>, config: &PipelineConfig) -> Self {
		Self {
			source,
			retry: config.retry.clone(),
			fetch_concurrency: config.fetch_concurrency.max(1),
		}
	}

	/// Fetch the window ending at `head` and stream every transaction into `transactions`.
	///
	/// Returns the number of blocks fetched. `transactions` is consumed; the receiving side
	/// observes the channel closing once this returns.
	pub async fn stream_transactions(
		&self,
		head: &BigUint,
		num_blocks: usize,
		transactions: mpsc::Sender<Transaction>,
		cancel: &CancellationToken,
	) -> Result<usize, DeltaError> {
		let siblings = cancel.child_token();
		let permits = Arc::new(Semaphore::new(self.fetch_concurrency));
		let mut tasks = JoinSet::new();

		for number in block_window(head, num_blocks) {
			let task = FetchTask {
				source: self.source.clone(),
				retry: self.retry.clone(),
				permits: permits.clone(),
				transactions: transactions.clone(),
				cancel: siblings.clone(),
			};
			tasks.spawn(task.run(BlockNumber::from(&number)));
		}

		drop(transactions);

		let mut fetched = 0;
		while let Some(joined) = tasks.join_next().await {
			match joined.map_err(DeltaError::from).and_then(|outcome| outcome) {
				Ok(()) => fetched += 1,
				Err(err) => {
					error!("Block retrieval failed, cancelling {} pending fetches: {}", tasks.len(), err);
					siblings.cancel();
					tasks.abort_all();
					while tasks.join_next().await.is_some() {}
					return Err(err);
				}
			}
		}

		debug!("Fetched {} blocks", fetched);
		Ok(fetched)
	}
}

/// State owned by one spawned block fetch.
struct FetchTask<S: ?Sized> {
	source: Arc<S>,
	retry: RetryPolicy,
	permits: Arc<Semaphore>,
	transactions: mpsc::Sender<Transaction>,
	cancel: CancellationToken,
}

impl<S: LedgerSource + ?Sized> FetchTask<S> {
	async fn run(self, number: BlockNumber) -> Result<(), DeltaError> {
		tokio::select! {
			biased;
			_ = self.cancel.cancelled() => Err(DeltaError::Cancelled),
			outcome = self.fetch_and_forward(&number) => outcome,
		}
	}

	async fn fetch_and_forward(&self, number: &BlockNumber) -> Result<(), DeltaError> {
		let permit = self
			.permits
			.acquire()
			.await
			.map_err(|_| DeltaError::Cancelled)?;

		let block = self
			.retry
			.run(&RateLimitDecider, || self.source.block_by_number(number))
			.await
			.map_err(|source| DeltaError::Fetch {
				block: number.clone(),
				source,
			})?;

		drop(permit);

		debug!(
			"Fetched block {} with {} transactions",
			number,
			block.transactions.len()
		);

		for transaction in block.transactions {
			if self.transactions.send(transaction).await.is_err() {
				warn!("Transaction stream closed while forwarding block {}", number);
				return Err(DeltaError::Cancelled);
			}
		}

		Ok(())
	}
}
