//! Stormcast CLI - broadcast daemon and weather tooling.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::broadcast::BroadcastArgs;
use commands::common::AppArgs;
use commands::weather::WeatherArgs;

#[derive(Parser)]
#[command(name = "stormcast", version, about = "Weather broadcast engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the broadcast daemon with hourly and daily schedules
    Run(AppArgs),

    /// Run one broadcast cycle and exit
    Broadcast(BroadcastArgs),

    /// Resolve current weather for a city
    Weather(WeatherArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run(args) => commands::run::run(args).await,
        Command::Broadcast(args) => commands::broadcast::run(args).await,
        Command::Weather(args) => commands::weather::run(args).await,
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
