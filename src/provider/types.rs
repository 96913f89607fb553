//! JSON-RPC wire types for the node provider

use crate::ledger::{Block, HexError, Transaction, parse_hex_quantity};

use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use serde::Deserialize;

/// JSON-RPC error code some providers use for request throttling.
pub const RATE_LIMIT_RPC_CODE: i64 = -32005;

/// JSON-RPC response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse<T> {
	pub result: Option<T>,
	pub error: Option<RpcErrorObject>,
}

/// Error object carried by a failed JSON-RPC call.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
	pub code: i64,
	pub message: String,
}

/// Block object as returned by `eth_getBlockByNumber` with full transactions.
///
/// Quantities stay hex strings here and are decoded when converting into `ledger::Block`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlock {
	pub number: Option<String>,
	#[serde(default)]
	pub hash: Option<String>,
	#[serde(default)]
	pub parent_hash: Option<String>,
	#[serde(default)]
	pub miner: Option<String>,
	#[serde(default)]
	pub timestamp: Option<String>,
	#[serde(default)]
	pub gas_limit: Option<String>,
	#[serde(default)]
	pub gas_used: Option<String>,
	#[serde(default)]
	pub base_fee_per_gas: Option<String>,
	#[serde(default)]
	pub difficulty: Option<String>,
	#[serde(default)]
	pub size: Option<String>,
	#[serde(default)]
	pub transactions: Vec<RpcTransaction>,
}

/// Transaction object embedded in an `RpcBlock`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
	#[serde(default)]
	pub hash: Option<String>,
	#[serde(default)]
	pub from: Option<String>,
	/// `null` for contract creation.
	#[serde(default)]
	pub to: Option<String>,
	#[serde(default)]
	pub value: Option<String>,
	#[serde(default)]
	pub block_number: Option<String>,
	#[serde(default)]
	pub nonce: Option<String>,
	#[serde(default)]
	pub gas: Option<String>,
	#[serde(default)]
	pub gas_price: Option<String>,
}

fn quantity(field: Option<&str>) -> Result<BigUint, HexError> {
	parse_hex_quantity(field.unwrap_or_default())
}

impl TryFrom<RpcTransaction> for Transaction {
	type Error = HexError;

	fn try_from(raw: RpcTransaction) -> Result<Self, Self::Error> {
		Ok(Transaction {
			value: quantity(raw.value.as_deref())?,
			block_number: quantity(raw.block_number.as_deref())?,
			nonce: quantity(raw.nonce.as_deref())?,
			gas: quantity(raw.gas.as_deref())?,
			gas_price: quantity(raw.gas_price.as_deref())?,
			hash: raw.hash.unwrap_or_default(),
			from: raw.from.unwrap_or_default(),
			to: raw.to.unwrap_or_default(),
		})
	}
}

impl TryFrom<RpcBlock> for Block {
	type Error = HexError;

	fn try_from(raw: RpcBlock) -> Result<Self, Self::Error> {
		let timestamp = quantity(raw.timestamp.as_deref())?;
		let timestamp = i64::try_from(&timestamp)
			.ok()
			.and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
			.unwrap_or_default();

		let transactions = raw
			.transactions
			.into_iter()
			.map(Transaction::try_from)
			.collect::<Result<Vec<_>, _>>()?;

		Ok(Block {
			number: quantity(raw.number.as_deref())?,
			hash: raw.hash.unwrap_or_default(),
			parent_hash: raw.parent_hash.unwrap_or_default(),
			miner: raw.miner.unwrap_or_default(),
			timestamp,
			gas_limit: quantity(raw.gas_limit.as_deref())?,
			gas_used: quantity(raw.gas_used.as_deref())?,
			base_fee_per_gas: quantity(raw.base_fee_per_gas.as_deref())?,
			difficulty: quantity(raw.difficulty.as_deref())?,
			size: quantity(raw.size.as_deref())?,
			transactions,
		})
	}
}

/// Error types for ledger provider calls
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
	#[error("api rate limit exceeded")]
	RateLimitExceeded,

	#[error("RPC error {code}: {message}")]
	Rpc { code: i64, message: String },

	#[error("unexpected HTTP status: {0}")]
	Status(u16),

	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),

	#[error("JSON parse error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("decode error: {0}")]
	Decode(#[from] HexError),

	#[error("No data returned")]
	NoData,
}

impl ProviderError {
	/// Whether the provider asked us to slow down.
	pub fn is_rate_limited(&self) -> bool {
		matches!(self, ProviderError::RateLimitExceeded)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn block_fixture() -> serde_json::Value {
		json!({
			"number": "0x12a05f2",
			"hash": "0xb3b20624f8f0f86eb50dd04688409e5cea4bd02d700bf6e79e9384d47d6a5a35",
			"parentHash": "0x2ab1d9ff6a86ad8bbaa7a2eb5b0c5c9dce31e8fd79e1a1a8e2fd0c1b0e0f2d5c",
			"miner": "0x95222290dd7278aa3ddd389cc1e1d165cc4bafe5",
			"timestamp": "0x65a1b2c3",
			"gasLimit": "0x1c9c380",
			"gasUsed": "0xe4e1c0",
			"baseFeePerGas": "0x3b9aca00",
			"size": "0x2a3b",
			"transactions": [
				{
					"hash": "0x01",
					"from": "0xaaa",
					"to": "0xbbb",
					"value": "0xde0b6b3a7640000",
					"blockNumber": "0x12a05f2",
					"nonce": "0x2",
					"gas": "0x5208",
					"gasPrice": "0x3b9aca00",
					"v": "0x1",
					"r": "0x00",
					"s": "0x00",
					"accessList": []
				},
				{
					"hash": "0x02",
					"from": "0xccc",
					"to": null,
					"value": "0x0",
					"input": "0x6080"
				}
			]
		})
	}

	#[test]
	fn test_decode_block() {
		let raw: RpcBlock = serde_json::from_value(block_fixture()).unwrap();
		let block = Block::try_from(raw).unwrap();

		assert_eq!(block.number, BigUint::from(19_531_250u32));
		assert_eq!(block.timestamp.timestamp(), 0x65a1b2c3);
		assert_eq!(block.difficulty, BigUint::from(0u32));
		assert_eq!(block.transactions.len(), 2);

		let transfer = &block.transactions[0];
		assert_eq!(transfer.from, "0xaaa");
		assert_eq!(transfer.to, "0xbbb");
		assert_eq!(transfer.value, BigUint::from(1_000_000_000_000_000_000u64));
		assert_eq!(transfer.gas, BigUint::from(21_000u32));

		let creation = &block.transactions[1];
		assert_eq!(creation.to, "");
		assert_eq!(creation.value, BigUint::from(0u32));
	}

	#[test]
	fn test_decode_block_rejects_malformed_value() {
		let mut fixture = block_fixture();
		fixture["transactions"][0]["value"] = json!("0xnot-hex");
		let raw: RpcBlock = serde_json::from_value(fixture).unwrap();

		assert!(Block::try_from(raw).is_err());
	}

	#[test]
	fn test_decode_rpc_error_envelope() {
		let envelope: RpcResponse<String> = serde_json::from_value(json!({
			"jsonrpc": "2.0",
			"id": 1,
			"error": { "code": -32602, "message": "invalid argument" }
		}))
		.unwrap();

		assert!(envelope.result.is_none());
		let error = envelope.error.unwrap();
		assert_eq!(error.code, -32602);
		assert_eq!(error.message, "invalid argument");
	}
}
