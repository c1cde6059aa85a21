//! Run command - start the broadcast daemon.

use tracing::info;

use stormcast::StormcastApp;

use super::common::{build_config, AppArgs};
use crate::error::CliError;

/// Run the daemon until interrupted.
///
/// Starts the application, spawns the hourly and daily broadcast schedules,
/// and waits for ctrl-c before draining and shutting down.
pub async fn run(args: AppArgs) -> Result<(), CliError> {
    let config = build_config(&args)?;
    let mut app = StormcastApp::start(config).await?;
    app.spawn_schedules();

    info!("stormcast daemon running, press ctrl-c to stop");
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| CliError::Config(format!("failed to listen for ctrl-c: {}", e)))?;

    let snapshot = app.telemetry_snapshot();
    info!(%snapshot, "final cache telemetry");

    app.shutdown().await;
    Ok(())
}
