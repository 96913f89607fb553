//! Types for blocks, transactions and per-address balance deltas

use chrono::{DateTime, Utc};
use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use serde::{Serialize, Serializer};
use std::fmt;

/// A hexadecimal quantity could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hex quantity: {0:?}")]
pub struct HexError(pub String);

/// Decode a `0x`-prefixed hexadecimal quantity.
///
/// Strings shorter than two characters (including the empty string) decode to zero.
pub fn parse_hex_quantity(raw: &str) -> Result<BigUint, HexError> {
	if raw.len() < 2 {
		return Ok(BigUint::zero());
	}

	let digits = raw
		.strip_prefix("0x")
		.or_else(|| raw.strip_prefix("0X"))
		.ok_or_else(|| HexError(raw.to_string()))?;

	if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
		return Err(HexError(raw.to_string()));
	}

	BigUint::parse_bytes(digits.as_bytes(), 16).ok_or_else(|| HexError(raw.to_string()))
}

/// Block number in the provider's wire encoding (`0x`-prefixed hex).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockNumber(String);

impl BlockNumber {
	pub fn new(raw: impl Into<String>) -> Self {
		Self(raw.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Convert to an exact integer. Fails on malformed hex.
	pub fn to_biguint(&self) -> Result<BigUint, HexError> {
		parse_hex_quantity(&self.0)
	}
}

impl From<&BigUint> for BlockNumber {
	fn from(number: &BigUint) -> Self {
		Self(format!("{:#x}", number))
	}
}

impl From<u64> for BlockNumber {
	fn from(number: u64) -> Self {
		Self(format!("{:#x}", number))
	}
}

impl fmt::Display for BlockNumber {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// A value transfer between two addresses.
///
/// Only `from`, `to` and `value` take part in delta accumulation. Addresses are compared
/// as raw strings; no case or whitespace normalization is applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transaction {
	pub hash: String,
	pub from: String,
	/// Empty for contract creation transactions.
	pub to: String,
	pub value: BigUint,
	pub block_number: BigUint,
	pub nonce: BigUint,
	pub gas: BigUint,
	pub gas_price: BigUint,
}

/// A block as returned by the ledger provider.
///
/// Header fields are carried along for diagnostics; the delta pipeline only consumes
/// `transactions`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
	pub number: BigUint,
	pub hash: String,
	pub parent_hash: String,
	pub miner: String,
	pub timestamp: DateTime<Utc>,
	pub gas_limit: BigUint,
	pub gas_used: BigUint,
	pub base_fee_per_gas: BigUint,
	pub difficulty: BigUint,
	pub size: BigUint,
	pub transactions: Vec<Transaction>,
}

/// Net signed balance change of one address over the observed block window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletDelta {
	pub address: String,
	#[serde(serialize_with = "serialize_signed_hex")]
	pub delta: BigInt,
}

impl WalletDelta {
	pub fn new(address: impl Into<String>, delta: BigInt) -> Self {
		Self {
			address: address.into(),
			delta,
		}
	}
}

fn serialize_signed_hex<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
	serializer.serialize_str(&crate::utils::format_signed_hex(value))
}
