//! Utility module for formatting ledger quantities.
//!
//! Re-exports hex and token amount formatting helpers used by logging and JSON encoding.

/// Formatting helpers for signed quantities
pub mod index;

pub use index::{NATIVE_TOKEN_DECIMALS, format_signed_hex, format_token_amount};
