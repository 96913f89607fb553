use actix_web::web;

use super::handlers;

/// Configures the API routes
///
/// # Arguments
///
/// * `cfg` - The service configuration
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
	cfg.route("/most-changed", web::get().to(handlers::get_most_changed))
		.route(
			"/most-changed/address",
			web::get().to(handlers::get_most_changed_address),
		)
		.route("/health", web::get().to(handlers::health));
}
