use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use slotfinder_api::config::ApiConfig;
use slotfinder_core::clock::SystemClock;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;

    // Start API server against the wall clock
    slotfinder_api::start_server(config, Arc::new(SystemClock)).await?;
    info!("Shut down cleanly");

    Ok(())
}
