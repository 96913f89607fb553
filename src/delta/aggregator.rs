//! Per-address delta accumulation.
//!
//! The aggregator is the single consumer of the transaction stream. It owns the accumulator
//! outright, so no locking is involved; the map is handed back read-only once the stream closes.

use crate::delta::DeltaError;
use crate::ledger::Transaction;

use num_bigint::BigInt;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Net signed balance change per address.
pub type Deltas = HashMap<String, BigInt>;

#[derive(Debug, Default)]
pub struct DeltaAggregator {
	deltas: Deltas,
	transactions_applied: usize,
}

impl DeltaAggregator {
	pub fn new() -> Self {
		Self::default()
	}

	/// Debit `from` and credit `to` by the transferred value.
	pub fn apply(&mut self, transaction: &Transaction) {
		let value = BigInt::from(transaction.value.clone());

		*self.deltas.entry(transaction.from.clone()).or_default() -= &value;
		*self.deltas.entry(transaction.to.clone()).or_default() += value;

		self.transactions_applied += 1;
	}

	pub fn deltas(&self) -> &Deltas {
		&self.deltas
	}

	pub fn transactions_applied(&self) -> usize {
		self.transactions_applied
	}

	/// Consume transactions until every producer has dropped its sender.
	///
	/// Returns early with `DeltaError::Cancelled` if `cancel` fires first.
	pub async fn drain(
		mut self,
		mut transactions: mpsc::Receiver<Transaction>,
		cancel: &CancellationToken,
	) -> Result<Deltas, DeltaError> {
		loop {
			tokio::select! {
				biased;
				_ = cancel.cancelled() => return Err(DeltaError::Cancelled),
				next = transactions.recv() => match next {
					Some(transaction) => self.apply(&transaction),
					None => break,
				},
			}
		}

		debug!(
			"Aggregated {} transactions into {} addresses",
			self.transactions_applied(),
			self.deltas().len()
		);

		Ok(self.deltas)
	}
}
