//! Broadcast command - run one broadcast cycle and exit.

use clap::Args;
use tokio_util::sync::CancellationToken;

use stormcast::broadcast::Frequency;
use stormcast::StormcastApp;

use super::common::{build_config, AppArgs};
use crate::error::CliError;

/// Arguments for the broadcast command.
#[derive(Debug, Args)]
pub struct BroadcastArgs {
    /// Which subscriber group to broadcast to (hourly or daily)
    #[arg(long)]
    pub frequency: Frequency,

    #[command(flatten)]
    pub app: AppArgs,
}

/// Run a single broadcast cycle for the given frequency.
pub async fn run(args: BroadcastArgs) -> Result<(), CliError> {
    let config = build_config(&args.app)?;
    let app = StormcastApp::start(config).await?;

    let cancel = CancellationToken::new();
    let summary = app.engine().broadcast(args.frequency, &cancel).await;
    println!("{}", summary);
    println!("{}", app.telemetry_snapshot());

    app.shutdown().await;
    Ok(())
}
