//! HTTP boundary
//!
//! Exposes the most-changed-wallet pipeline over `actix-web`. The handlers own query
//! normalization and the request timeout; the pipeline itself never sees raw user input.

pub mod errors;
pub mod handlers;
pub mod routes;

pub use errors::ApiError;
pub use handlers::AppState;
pub use routes::configure_routes;
