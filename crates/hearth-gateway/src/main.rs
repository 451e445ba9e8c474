//! Push gateway entry point
//!
//! ```bash
//! cargo run -p hearth-gateway
//! ```

use anyhow::Context;
use hearth_common::{try_init_tracing, AppConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "Gateway failed to start");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;

    info!(
        env = ?config.app.env,
        port = config.gateway.server.port,
        max_subscriptions = config.gateway.max_subscriptions,
        "Configuration loaded"
    );

    hearth_gateway::run(config).await?;
    Ok(())
}
