//! Ledger entity model
//!
//! Block numbers, blocks, transactions and wallet deltas as seen by the delta pipeline.
//! Monetary values and quantities are arbitrary-precision integers; the provider encodes
//! them as `0x`-prefixed hexadecimal strings.

/// Entity types and hex quantity conversion
mod types;

pub use types::*;
