//! Most-changed-wallet pipeline
//!
//! This module retrieves a window of blocks ending at the chain head, sums signed transfer
//! deltas per address, and picks the address whose balance moved the most:
//!
//! - `fetcher`: bounded-concurrency block retrieval with rate-limit retries and fail-fast cancellation.
//! - `aggregator`: single-consumer accumulation of per-address deltas from the transaction stream.
//! - `selection`: ranking of the final deltas with a deterministic tie-break.
//! - `service`: wires the stages together behind `DeltaService`.

/// Per-address delta accumulation
pub mod aggregator;
/// Concurrent block retrieval
pub mod fetcher;
/// Ranking of accumulated deltas
pub mod selection;
/// Request-level entry point
pub mod service;
/// Pipeline configuration and error types
mod types;

pub use aggregator::{DeltaAggregator, Deltas};
pub use fetcher::BlockFetcher;
pub use selection::most_changed;
pub use service::DeltaService;
pub use types::*;
