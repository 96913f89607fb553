use crate::delta::DeltaError;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use tracing::error;

/// Errors reported to HTTP clients. Internal detail stays in the logs.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
	#[error("Invalid Query Params")]
	InvalidQuery,

	#[error("rate limit exceeded, try again later")]
	RateLimited,

	#[error("request timed out")]
	Timeout,

	#[error("internal server error")]
	Internal,
}

/// Body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub code: u16,
	pub message: String,
}

impl From<DeltaError> for ApiError {
	fn from(err: DeltaError) -> Self {
		error!("Most changed wallet request failed: {}", err);

		if err.is_rate_limited() {
			ApiError::RateLimited
		} else if err.is_timeout() {
			ApiError::Timeout
		} else {
			ApiError::Internal
		}
	}
}

impl ResponseError for ApiError {
	fn status_code(&self) -> StatusCode {
		match self {
			ApiError::InvalidQuery => StatusCode::BAD_REQUEST,
			ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
			ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
			ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn error_response(&self) -> HttpResponse {
		let status = self.status_code();
		HttpResponse::build(status).json(ErrorResponse {
			code: status.as_u16(),
			message: self.to_string(),
		})
	}
}
