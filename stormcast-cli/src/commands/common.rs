//! Common arguments and utilities shared across CLI commands.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use stormcast::app::{AppConfig, ProviderKind, ServiceEndpoints, DEFAULT_CACHE_TTL_SECS};
use stormcast::broadcast::BroadcastConfig;

use crate::error::CliError;

/// Arguments shared by every command that boots the application.
#[derive(Debug, Clone, Args)]
pub struct AppArgs {
    /// WeatherAPI.com API key
    #[arg(long, env = "STORMCAST_WEATHERAPI_KEY")]
    pub weatherapi_key: Option<String>,

    /// OpenWeatherMap API key
    #[arg(long, env = "STORMCAST_OPENWEATHER_KEY")]
    pub openweather_key: Option<String>,

    /// Provider fallback order, highest priority first
    #[arg(long, value_delimiter = ',', default_value = "weatherapi,openweather")]
    pub provider_order: Vec<String>,

    /// Subscription service base URL
    #[arg(long, env = "STORMCAST_SUBSCRIPTIONS_URL", default_value = "http://localhost:8081")]
    pub subscriptions_url: String,

    /// Email service base URL
    #[arg(long, env = "STORMCAST_EMAIL_URL", default_value = "http://localhost:8082")]
    pub email_url: String,

    /// Weather cache TTL in seconds
    #[arg(long, default_value_t = DEFAULT_CACHE_TTL_SECS)]
    pub cache_ttl: u64,

    /// Subscribers fetched per page during a broadcast
    #[arg(long, default_value_t = 100)]
    pub page_size: u32,

    /// Maximum concurrent email dispatches
    #[arg(long, default_value_t = 10)]
    pub pool_size: usize,

    /// Directory for raw upstream response audit logs
    #[arg(long)]
    pub audit_dir: Option<PathBuf>,
}

/// Builds the application config from CLI arguments.
pub fn build_config(args: &AppArgs) -> Result<AppConfig, CliError> {
    let order = args
        .provider_order
        .iter()
        .map(|s| s.parse::<ProviderKind>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(CliError::Config)?;

    let mut config = AppConfig::new(ServiceEndpoints {
        subscriptions_url: args.subscriptions_url.clone(),
        email_url: args.email_url.clone(),
    })
    .with_provider_order(order)
    .with_cache_ttl(Duration::from_secs(args.cache_ttl))
    .with_broadcast(BroadcastConfig {
        page_size: args.page_size,
        pool_size: args.pool_size,
    });

    if let Some(key) = &args.weatherapi_key {
        config = config.with_weatherapi_key(key.clone());
    }
    if let Some(key) = &args.openweather_key {
        config = config.with_openweather_key(key.clone());
    }
    if let Some(dir) = &args.audit_dir {
        config = config.with_audit_dir(dir.clone());
    }

    Ok(config)
}
