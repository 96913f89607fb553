//! Most-changed-wallet service and integration point for the retrieval pipeline.
//!
//! `DeltaService` answers "which address's balance changed the most over the last N blocks?".
//! It resolves the chain head once, then runs block retrieval and delta aggregation side by side:
//!
//! - `BlockFetcher` fans out one task per block and streams transactions into a bounded channel
//! - `DeltaAggregator` drains that channel into a private per-address map
//! - `most_changed` ranks the final map
//!
//! Both halves run inside the caller's future. If the caller drops it (for example on timeout),
//! the fetch tasks are aborted along with it.

use crate::delta::{
	BlockFetcher, DeltaAggregator, DeltaError, PipelineConfig, fetcher::block_window, most_changed,
};
use crate::ledger::WalletDelta;
use crate::provider::LedgerSource;
use crate::retry::{RateLimitDecider, RetryPolicy};
use crate::utils::{NATIVE_TOKEN_DECIMALS, format_token_amount};

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub struct DeltaService<S: ?Sized> {
	source: Arc<S>,
	fetcher: BlockFetcher<S>,
	retry: RetryPolicy,
}

impl<S: LedgerSource + ?Sized + 'static> DeltaService<S> {
	pub fn new(source: Arc<S>, config: PipelineConfig) -> Self {
		Self {
			fetcher: BlockFetcher::new(source.clone(), &config),
			retry: config.retry,
			source,
		}
	}

	/// Wallet with the largest absolute balance change over the last `num_blocks` blocks.
	///
	/// `num_blocks` is expected to be normalized by the caller. Returns `None` if the window
	/// holds no transactions. Any failed block fails the whole request.
	pub async fn most_changed_wallet(
		&self,
		num_blocks: usize,
		cancel: &CancellationToken,
	) -> Result<Option<WalletDelta>, DeltaError> {
		let head = tokio::select! {
			biased;
			_ = cancel.cancelled() => return Err(DeltaError::Cancelled),
			head = self.retry.run(&RateLimitDecider, || self.source.head_block_number()) => {
				head.map_err(DeltaError::Head)?
			}
		};

		let head_number = head.to_biguint()?;
		let window = block_window(&head_number, num_blocks).len();
		info!(
			"Scanning {} blocks down from head {} (requested {})",
			window, head, num_blocks
		);

		let (sender, receiver) = mpsc::channel(window.max(1));

		let (fetched, deltas) = tokio::try_join!(
			self.fetcher
				.stream_transactions(&head_number, num_blocks, sender, cancel),
			DeltaAggregator::new().drain(receiver, cancel),
		)?;

		debug!("Fetched {} blocks touching {} addresses", fetched, deltas.len());

		let winner = most_changed(&deltas);
		match &winner {
			Some(wallet) => info!(
				"Most changed wallet {} with delta {} ETH",
				wallet.address,
				format_token_amount(&wallet.delta, NATIVE_TOKEN_DECIMALS)
			),
			None => info!("No wallets observed in the last {} blocks", window),
		}

		Ok(winner)
	}

	/// Address of the most changed wallet, or the empty string if no wallet was observed.
	pub async fn most_changed_address(
		&self,
		num_blocks: usize,
		cancel: &CancellationToken,
	) -> Result<String, DeltaError> {
		let wallet = self.most_changed_wallet(num_blocks, cancel).await?;

		Ok(wallet.map(|wallet| wallet.address).unwrap_or_default())
	}
}
