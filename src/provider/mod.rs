//! Ledger data provider integration
//!
//! This module defines the `LedgerSource` port the delta pipeline consumes, plus a JSON-RPC
//! client for the GetBlock node API that implements it. The provider reports throttling as a
//! distinct `ProviderError::RateLimitExceeded`, which callers may retry.

/// JSON-RPC client for the GetBlock node API
mod client;
/// Wire types and error definitions
mod types;

pub use client::{DEFAULT_BASE_URL, GetBlockClient};
pub use types::*;

use crate::ledger::{Block, BlockNumber};

/// Capability to read the chain head and individual blocks from a remote ledger.
///
/// Cancellation is cooperative: callers drop the returned future to abandon a call.
#[async_trait::async_trait]
pub trait LedgerSource: Send + Sync {
	/// Number of the most recent block known to the provider.
	async fn head_block_number(&self) -> Result<BlockNumber, ProviderError>;

	/// Fetch a block together with its full transaction objects.
	async fn block_by_number(&self, number: &BlockNumber) -> Result<Block, ProviderError>;
}
