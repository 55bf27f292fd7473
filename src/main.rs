/// Tubely - video thumbnail service
///
/// Accepts authenticated thumbnail uploads for videos, stores them in the
/// configured blob backend and records the public URL on the video.

mod api;
mod auth;
mod blob_store;
mod config;
mod context;
mod db;
mod error;
mod metrics;
mod server;
mod validation;

#[cfg(test)]
mod test_support;

use config::ServerConfig;
use context::AppContext;
use error::ApiResult;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ApiResult<()> {
    // Load configuration (also pulls RUST_LOG out of .env)
    let config = ServerConfig::from_env()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_new(&config.logging.level)
                .unwrap_or_else(|_| "tubely=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Create application context
    let ctx = AppContext::new(config).await?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}
