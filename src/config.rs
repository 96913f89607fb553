use crate::delta::{MAX_NUM_BLOCKS, PipelineConfig};
use crate::provider::DEFAULT_BASE_URL;
use crate::retry::{DEFAULT_ATTEMPTS, RetryPolicy};

use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const ACCESS_TOKEN_ENV: &str = "BLK_GETBLOCK_ACCESS_TOKEN";
pub const PROVIDER_URL_ENV: &str = "BLK_PROVIDER_URL";
pub const HTTP_ADDR_ENV: &str = "BLK_HTTP_ADDR";
pub const LOG_LEVEL_ENV: &str = "BLK_LOG_LEVEL";
pub const REQUEST_TIMEOUT_ENV: &str = "BLK_REQUEST_TIMEOUT_SECS";
pub const HTTP_CLIENT_TIMEOUT_ENV: &str = "BLK_HTTP_CLIENT_TIMEOUT_SECS";
pub const FETCH_CONCURRENCY_ENV: &str = "BLK_FETCH_CONCURRENCY";
pub const RETRY_ATTEMPTS_ENV: &str = "BLK_RETRY_ATTEMPTS";
pub const RETRY_DELAY_ENV: &str = "BLK_RETRY_DELAY_MS";

const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_HTTP_CLIENT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Missing environment variable: {0}")]
	MissingVariable(&'static str),

	#[error("Invalid value for {key}: {value:?}")]
	InvalidValue { key: &'static str, value: String },
}

/// Runtime configuration, read from `BLK_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
	pub access_token: String,
	pub provider_url: String,
	pub http_addr: String,
	pub log_level: String,
	pub request_timeout: Duration,
	pub http_client_timeout: Duration,
	pub pipeline: PipelineConfig,
}

impl Config {
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| env::var(key).ok())
	}

	/// Build the configuration from an arbitrary key lookup.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		let access_token = lookup(ACCESS_TOKEN_ENV)
			.filter(|token| !token.is_empty())
			.ok_or(ConfigError::MissingVariable(ACCESS_TOKEN_ENV))?;

		let retry = RetryPolicy::new(
			parse_or(&lookup, RETRY_ATTEMPTS_ENV, DEFAULT_ATTEMPTS)?,
			Duration::from_millis(parse_or(&lookup, RETRY_DELAY_ENV, DEFAULT_RETRY_DELAY_MS)?),
		);

		let fetch_concurrency = parse_or(&lookup, FETCH_CONCURRENCY_ENV, MAX_NUM_BLOCKS)?;
		if fetch_concurrency == 0 {
			return Err(ConfigError::InvalidValue {
				key: FETCH_CONCURRENCY_ENV,
				value: "0".to_string(),
			});
		}

		Ok(Self {
			access_token,
			provider_url: lookup(PROVIDER_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
			http_addr: lookup(HTTP_ADDR_ENV).unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string()),
			log_level: lookup(LOG_LEVEL_ENV).unwrap_or_default(),
			request_timeout: Duration::from_secs(parse_or(
				&lookup,
				REQUEST_TIMEOUT_ENV,
				DEFAULT_REQUEST_TIMEOUT_SECS,
			)?),
			http_client_timeout: Duration::from_secs(parse_or(
				&lookup,
				HTTP_CLIENT_TIMEOUT_ENV,
				DEFAULT_HTTP_CLIENT_TIMEOUT_SECS,
			)?),
			pipeline: PipelineConfig {
				fetch_concurrency,
				retry,
			},
		})
	}
}

fn parse_or<T: FromStr>(
	lookup: &impl Fn(&str) -> Option<String>,
	key: &'static str,
	default: T,
) -> Result<T, ConfigError> {
	match lookup(key) {
		None => Ok(default),
		Some(value) if value.trim().is_empty() => Ok(default),
		Some(value) => value
			.trim()
			.parse()
			.map_err(|_| ConfigError::InvalidValue { key, value }),
	}
}

/// Map a `BLK_LOG_LEVEL` value onto a tracing filter level. Unknown values mean `info`.
pub fn log_filter_level(level: &str) -> tracing::Level {
	match level.trim().to_lowercase().as_str() {
		"dev" | "local" | "debug" => tracing::Level::DEBUG,
		"trace" => tracing::Level::TRACE,
		"warn" => tracing::Level::WARN,
		"error" => tracing::Level::ERROR,
		_ => tracing::Level::INFO,
	}
}
