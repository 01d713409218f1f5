//! # Safe Registry Node
//!
//! Hosts the plaintext and the encrypted registry behind one process.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Initialize logging and metrics
//! 3. Open storage and wire both registries to the event bus
//! 4. Serve JSON-lines requests from stdin until EOF or Ctrl+C

use std::sync::Arc;

use anyhow::{Context, Result};
use registry_node::{IpcHandler, NodeConfig, RegistryContainer};
use registry_telemetry::init_telemetry;
use tokio::io::BufReader;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::from_env().context("Failed to load configuration")?;
    init_telemetry(&config.telemetry).context("Failed to initialize telemetry")?;

    info!("===========================================");
    info!("  Safe Registry Node v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let container =
        Arc::new(RegistryContainer::new(config).context("Failed to initialize registries")?);
    let handler = IpcHandler::new(Arc::clone(&container));

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    tokio::select! {
        served = handler.serve(stdin, stdout) => {
            served.context("Request stream failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    info!(last_block = container.current_block(), "Shutdown complete");
    Ok(())
}
