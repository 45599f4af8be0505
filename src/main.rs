//! HTTP server for the stay engine.
//!
//! Reads the hotel configuration directory from `STAY_ENGINE_CONFIG`
//! (default `./config/sample`) and listens on `STAY_ENGINE_ADDR`
//! (default `0.0.0.0:8080`). Log verbosity follows `RUST_LOG`.

use std::env;
use std::error::Error;

use stay_engine::api::{AppState, create_router};
use stay_engine::config::ConfigLoader;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_DIR: &str = "./config/sample";
const DEFAULT_ADDR: &str = "0.0.0.0:8080";

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logging();

    let config_dir = env::var("STAY_ENGINE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let addr = env::var("STAY_ENGINE_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());

    let config = ConfigLoader::load(&config_dir)?;
    info!(
        hotel = %config.config().settings().name,
        config_dir = %config_dir,
        payment_adjustments = config.config().settings().schema.payment_adjustments,
        "Configuration loaded"
    );

    let router = create_router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Stay engine listening");
    axum::serve(listener, router).await?;

    Ok(())
}
