//! Driver Fatigue Monitor - Main Entry Point

use api::{init_logging, run_server, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("=== Driver Fatigue Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load()?;
    info!(
        bind_addr = %config.bind_addr,
        ear_threshold = config.detection.ear_threshold,
        consec_frames = config.detection.consec_frames,
        mar_threshold = config.detection.mar_threshold,
        "starting fatigue monitoring pipeline"
    );

    run_server(config).await
}
