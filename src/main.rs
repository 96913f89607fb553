mod api;
mod config;
mod delta;
mod ledger;
mod provider;
mod retry;
#[cfg(test)]
mod testing;
mod utils;

use actix_web::{App, HttpServer, middleware, web};
use std::io;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::config::Config;
use crate::delta::DeltaService;
use crate::provider::{GetBlockClient, LedgerSource};

#[actix_web::main]
async fn main() -> io::Result<()> {
	dotenv::dotenv().ok();

	let config = Config::from_env();
	let level = config
		.as_ref()
		.map(|loaded| config::log_filter_level(&loaded.log_level))
		.unwrap_or(tracing::Level::INFO);

	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::builder()
				.with_default_directive(level.into())
				.from_env_lossy(),
		)
		.with_target(false)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_file(false)
		.with_line_number(false)
		.with_timer(tracing_subscriber::fmt::time::time())
		.init();

	let config = config.map_err(|err| {
		error!("Invalid configuration: {}", err);
		io::Error::new(io::ErrorKind::InvalidInput, err)
	})?;

	let client = GetBlockClient::new(
		&config.provider_url,
		&config.access_token,
		config.http_client_timeout,
	)
	.map_err(|err| {
		error!("Failed to create provider client: {}", err);
		io::Error::other(err)
	})?;

	info!("Created provider client for {}", config.provider_url);

	let source: Arc<dyn LedgerSource> = Arc::new(client);
	let state = web::Data::new(AppState {
		service: DeltaService::new(source, config.pipeline.clone()),
		request_timeout: config.request_timeout,
	});

	info!(
		"Starting HTTP server at http://{} (fetch concurrency {}, {} attempts per call, {:?} apart)",
		config.http_addr,
		config.pipeline.fetch_concurrency,
		config.pipeline.retry.attempts(),
		config.pipeline.retry.delay()
	);

	HttpServer::new(move || {
		App::new()
			.wrap(middleware::Logger::default())
			.app_data(state.clone())
			.configure(api::configure_routes)
	})
	.bind(config.http_addr.as_str())?
	.run()
	.await?;

	info!("HTTP server stopped");
	Ok(())
}
