//! Healthcare Cost Estimator - Main Entry Point

use api::{init_logging, run_server, Settings};
use std::path::PathBuf;
use tracing::info;

/// Overrides the config file location
const CONFIG_ENV: &str = "COST_ESTIMATOR_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let settings = Settings::load(config_path.as_deref())?;

    init_logging(&settings.logging)?;

    info!("=== Healthcare Cost Estimator v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Loading artifacts and starting server...");

    run_server(settings).await
}
