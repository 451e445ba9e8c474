//! Hearth API server entry point
//!
//! ```bash
//! cargo run -p hearth-api
//! ```
//!
//! Configuration is read from the environment (and `.env` when present).

use hearth_common::{try_init_tracing, AppConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "API server failed");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    info!("Starting Hearth API server...");

    let config = AppConfig::from_env()?;
    info!(env = ?config.app.env, address = %config.api.address(), "Configuration loaded");

    hearth_api::run(config).await?;
    Ok(())
}
