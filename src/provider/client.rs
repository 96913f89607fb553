//! JSON-RPC client for the GetBlock node API.
//!
//! This module provides an async client that resolves the chain head and fetches blocks with
//! their full transaction objects. HTTP throttling is surfaced as
//! `ProviderError::RateLimitExceeded` so callers can retry it; every other failure is returned
//! as-is.

use super::LedgerSource;
use super::types::*;
use crate::ledger::{Block, BlockNumber};

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// Default GetBlock API base URL. The access token is appended as the final path segment.
pub const DEFAULT_BASE_URL: &str = "https://go.getblock.io/";

/// GetBlock JSON-RPC client
#[derive(Clone)]
pub struct GetBlockClient {
	/// The underlying HTTP client.
	http_client: Client,
	/// Full RPC endpoint including the access token.
	endpoint: String,
	/// Monotonic JSON-RPC request id.
	next_id: Arc<AtomicU64>,
}

impl GetBlockClient {
	/// Create a new client.
	///
	/// # Arguments
	/// * `base_url` - The provider base URL, e.g. `DEFAULT_BASE_URL`.
	/// * `access_token` - The API access token.
	/// * `timeout` - Per-request HTTP timeout.
	pub fn new(base_url: &str, access_token: &str, timeout: Duration) -> Result<Self, ProviderError> {
		let http_client = Client::builder().timeout(timeout).build()?;

		let endpoint = if base_url.ends_with('/') {
			format!("{}{}", base_url, access_token)
		} else {
			format!("{}/{}", base_url, access_token)
		};

		Ok(Self {
			http_client,
			endpoint,
			next_id: Arc::new(AtomicU64::new(1)),
		})
	}

	/// Execute a JSON-RPC call and decode its `result`.
	///
	/// # Errors
	/// `RateLimitExceeded` on HTTP 429 or a throttling RPC error, `Rpc` for any other RPC
	/// error object, `Status` for other non-success HTTP statuses and `NoData` for a `null`
	/// result.
	pub async fn call<T: DeserializeOwned>(
		&self,
		method: &str,
		params: serde_json::Value,
	) -> Result<T, ProviderError> {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let request_body = json!({
			"jsonrpc": "2.0",
			"id": id,
			"method": method,
			"params": params
		});

		let response = self
			.http_client
			.post(&self.endpoint)
			.json(&request_body)
			.send()
			.await?;

		let status = response.status();
		let body = response.bytes().await?;

		decode_response(status, &body)
	}
}

/// Map an HTTP status and JSON-RPC body onto the call result.
fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, ProviderError> {
	if status == StatusCode::TOO_MANY_REQUESTS {
		return Err(ProviderError::RateLimitExceeded);
	}

	if !status.is_success() {
		return Err(ProviderError::Status(status.as_u16()));
	}

	let envelope: RpcResponse<T> = serde_json::from_slice(body)?;

	if let Some(error) = envelope.error {
		if error.code == RATE_LIMIT_RPC_CODE {
			return Err(ProviderError::RateLimitExceeded);
		}

		return Err(ProviderError::Rpc {
			code: error.code,
			message: error.message,
		});
	}

	envelope.result.ok_or(ProviderError::NoData)
}

#[async_trait::async_trait]
impl LedgerSource for GetBlockClient {
	async fn head_block_number(&self) -> Result<BlockNumber, ProviderError> {
		const METHOD: &str = "eth_blockNumber";

		let head: String = self.call(METHOD, json!([])).await?;
		debug!("{} returned {}", METHOD, head);

		Ok(BlockNumber::new(head))
	}

	async fn block_by_number(&self, number: &BlockNumber) -> Result<Block, ProviderError> {
		const METHOD: &str = "eth_getBlockByNumber";

		let raw: RpcBlock = self.call(METHOD, json!([number.as_str(), true])).await?;
		let block = Block::try_from(raw)?;
		debug!(
			"{} returned block {} with {} transactions",
			METHOD,
			number,
			block.transactions.len()
		);

		Ok(block)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_decode_response_result() {
		let head: String = decode_response(
			StatusCode::OK,
			br#"{"jsonrpc":"2.0","id":1,"result":"0x12a05f2"}"#,
		)
		.unwrap();
		assert_eq!(head, "0x12a05f2");
	}

	#[test]
	fn test_decode_response_rate_limited() {
		let result = decode_response::<String>(StatusCode::TOO_MANY_REQUESTS, b"Too Many Requests");
		assert!(matches!(result, Err(ProviderError::RateLimitExceeded)));

		let result = decode_response::<String>(
			StatusCode::OK,
			br#"{"jsonrpc":"2.0","id":1,"error":{"code":-32005,"message":"limit exceeded"}}"#,
		);
		assert!(matches!(result, Err(ProviderError::RateLimitExceeded)));
	}

	#[test]
	fn test_decode_response_errors() {
		let result = decode_response::<String>(
			StatusCode::OK,
			br#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"invalid argument"}}"#,
		);
		assert!(matches!(
			result,
			Err(ProviderError::Rpc { code: -32602, ref message }) if message == "invalid argument"
		));

		let result = decode_response::<String>(StatusCode::BAD_GATEWAY, b"");
		assert!(matches!(result, Err(ProviderError::Status(502))));

		let result = decode_response::<RpcBlock>(StatusCode::OK, br#"{"jsonrpc":"2.0","id":1,"result":null}"#);
		assert!(matches!(result, Err(ProviderError::NoData)));

		let result = decode_response::<String>(StatusCode::OK, b"<html>");
		assert!(matches!(result, Err(ProviderError::Json(_))));
	}

	#[test]
	fn test_endpoint_joins_access_token() {
		let client = GetBlockClient::new(DEFAULT_BASE_URL, "token", Duration::from_secs(1)).unwrap();
		assert_eq!(client.endpoint, "https://go.getblock.io/token");

		let client = GetBlockClient::new("http://localhost:8545", "abc", Duration::from_secs(1)).unwrap();
		assert_eq!(client.endpoint, "http://localhost:8545/abc");
	}
}
