//! Weather command - resolve current conditions for one city.

use clap::Args;

use stormcast::StormcastApp;

use super::common::{build_config, AppArgs};
use crate::error::CliError;

/// Arguments for the weather command.
#[derive(Debug, Args)]
pub struct WeatherArgs {
    /// City to resolve
    pub city: String,

    /// Only check that the city is known to a provider
    #[arg(long)]
    pub check_only: bool,

    #[command(flatten)]
    pub app: AppArgs,
}

/// Resolve and print weather for a city, or just verify it exists.
pub async fn run(args: WeatherArgs) -> Result<(), CliError> {
    let config = build_config(&args.app)?;
    let app = StormcastApp::start(config).await?;

    if args.check_only {
        app.check_city_exists(&args.city).await?;
        println!("{}: known", args.city);
    } else {
        let weather = app.get_weather(&args.city).await?;
        println!(
            "{}: {} {:.1}°C, humidity {}%, wind {:.1} km/h (observed {})",
            args.city,
            weather.description,
            weather.temperature,
            weather.humidity,
            weather.wind_speed,
            weather.observed_at.to_rfc3339(),
        );
    }

    app.shutdown().await;
    Ok(())
}
