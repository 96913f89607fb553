//! In-memory ledger source for exercising the pipeline without a provider.

use crate::ledger::{Block, BlockNumber, Transaction};
use crate::provider::{LedgerSource, ProviderError};

use num_bigint::BigUint;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Build a plain value transfer.
pub fn transfer(from: &str, to: &str, value: u64) -> Transaction {
	Transaction {
		from: from.to_string(),
		to: to.to_string(),
		value: BigUint::from(value),
		..Transaction::default()
	}
}

/// Scripted failure returned before a block is served.
#[derive(Debug, Clone, Copy)]
pub enum Failure {
	RateLimited,
	Fatal(&'static str),
}

impl Failure {
	fn into_error(self) -> ProviderError {
		match self {
			Failure::RateLimited => ProviderError::RateLimitExceeded,
			Failure::Fatal(message) => ProviderError::Rpc {
				code: -32000,
				message: message.to_string(),
			},
		}
	}
}

/// Ledger with a fixed head. Unknown blocks are served empty.
///
/// Scripted failures for a block are returned one per call, in order, before the block itself.
/// Successful calls sleep for the configured latency first.
#[derive(Default)]
pub struct ScriptedSource {
	head: u64,
	head_failures: Mutex<VecDeque<Failure>>,
	blocks: HashMap<u64, Vec<Transaction>>,
	failures: Mutex<HashMap<u64, VecDeque<Failure>>>,
	calls: Mutex<HashMap<u64, usize>>,
	latency: Option<Duration>,
	in_flight: AtomicUsize,
	max_in_flight: AtomicUsize,
	completed: AtomicUsize,
}

impl ScriptedSource {
	pub fn new(head: u64) -> Self {
		Self {
			head,
			..Self::default()
		}
	}

	pub fn with_block(mut self, number: u64, transactions: Vec<Transaction>) -> Self {
		self.blocks.insert(number, transactions);
		self
	}

	pub fn fail_with(self, number: u64, failures: impl IntoIterator<Item = Failure>) -> Self {
		self.failures
			.lock()
			.unwrap()
			.entry(number)
			.or_default()
			.extend(failures);
		self
	}

	pub fn fail_head_with(self, failures: impl IntoIterator<Item = Failure>) -> Self {
		self.head_failures.lock().unwrap().extend(failures);
		self
	}

	pub fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = Some(latency);
		self
	}

	/// Number of `block_by_number` calls made for `number`.
	pub fn calls(&self, number: u64) -> usize {
		self.calls.lock().unwrap().get(&number).copied().unwrap_or(0)
	}

	/// Number of blocks successfully served.
	pub fn completed(&self) -> usize {
		self.completed.load(Ordering::SeqCst)
	}

	/// Highest number of concurrent successful calls observed.
	pub fn max_in_flight(&self) -> usize {
		self.max_in_flight.load(Ordering::SeqCst)
	}
}

/// Decrements the in-flight counter even when the call future is dropped mid-sleep.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
	fn drop(&mut self) {
		self.0.fetch_sub(1, Ordering::SeqCst);
	}
}

#[async_trait::async_trait]
impl LedgerSource for ScriptedSource {
	async fn head_block_number(&self) -> Result<BlockNumber, ProviderError> {
		if let Some(failure) = self.head_failures.lock().unwrap().pop_front() {
			return Err(failure.into_error());
		}

		Ok(BlockNumber::from(self.head))
	}

	async fn block_by_number(&self, number: &BlockNumber) -> Result<Block, ProviderError> {
		let key = u64::try_from(&number.to_biguint()?).map_err(|_| ProviderError::NoData)?;

		*self.calls.lock().unwrap().entry(key).or_default() += 1;

		let failure = self
			.failures
			.lock()
			.unwrap()
			.get_mut(&key)
			.and_then(VecDeque::pop_front);
		if let Some(failure) = failure {
			return Err(failure.into_error());
		}

		let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
		let _guard = InFlight(&self.in_flight);
		self.max_in_flight.fetch_max(current, Ordering::SeqCst);

		if let Some(latency) = self.latency {
			tokio::time::sleep(latency).await;
		}

		self.completed.fetch_add(1, Ordering::SeqCst);

		Ok(Block {
			number: BigUint::from(key),
			transactions: self.blocks.get(&key).cloned().unwrap_or_default(),
			..Block::default()
		})
	}
}
