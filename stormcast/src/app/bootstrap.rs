//! Application bootstrap implementation.
//!
//! `StormcastApp` assembles the full resolution and broadcast pipeline in
//! dependency order: provider adapters into the fallback chain, the chain
//! behind the metered TTL cache, the resolver over both, and the broadcast
//! engine plus its schedules on top.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::config::{AppConfig, ProviderKind};
use super::error::AppError;
use crate::broadcast::{BroadcastEngine, Frequency};
use crate::cache::{MemoryCache, MeteredWeatherCache, WeatherCache, WeatherCacheClient};
use crate::provider::{
    AsyncReqwestClient, FileResponseAudit, NullResponseAudit, OpenWeatherProvider, ProviderChain,
    ProviderError, ResponseAudit, WeatherApiProvider, WeatherProvider,
};
use crate::remote::{EmailServiceClient, SubscriptionServiceClient};
use crate::resolver::CachedWeatherResolver;
use crate::scheduler::spawn_broadcast_schedule;
use crate::telemetry::{CacheMetrics, TelemetrySnapshot};
use crate::weather::Weather;

/// The assembled application.
///
/// Startup order matters: the chain must exist before the resolver, and the
/// resolver before the engine. Shutdown reverses it — cancel the schedules,
/// wait for in-flight cycles to drain, then close the cache.
pub struct StormcastApp {
    resolver: Arc<CachedWeatherResolver>,
    engine: Arc<BroadcastEngine>,
    cache: Arc<dyn WeatherCache>,
    metrics: Arc<CacheMetrics>,
    cancel: CancellationToken,
    schedules: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for StormcastApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StormcastApp").finish_non_exhaustive()
    }
}

impl StormcastApp {
    /// Starts the application with the given configuration.
    ///
    /// Fails if no provider has an API key configured or if the shared HTTP
    /// client cannot be built. Schedules are not running yet; call
    /// [`spawn_schedules`](Self::spawn_schedules) to start them.
    pub async fn start(config: AppConfig) -> Result<Self, AppError> {
        info!("starting stormcast");

        let audit: Arc<dyn ResponseAudit> = match &config.audit_dir {
            Some(dir) => {
                info!(dir = %dir.display(), "raw response auditing enabled");
                Arc::new(FileResponseAudit::new(dir))
            }
            None => Arc::new(NullResponseAudit),
        };

        let chain = Arc::new(ProviderChain::new(Self::build_providers(&config, &audit)?)?);
        info!(providers = chain.len(), "provider chain assembled");

        let backend = Arc::new(MemoryCache::new(
            config.cache.max_size_bytes,
            config.cache.ttl,
        ));
        let cache: Arc<dyn WeatherCache> = Arc::new(WeatherCacheClient::new(backend));
        let metrics = Arc::new(CacheMetrics::new());
        let metered: Arc<dyn WeatherCache> =
            Arc::new(MeteredWeatherCache::new(cache, Arc::clone(&metrics)));
        info!(
            max_size_bytes = config.cache.max_size_bytes,
            ttl_secs = config.cache.ttl.as_secs(),
            "weather cache started"
        );

        let resolver = Arc::new(CachedWeatherResolver::new(Arc::clone(&metered), chain));

        let http = reqwest::Client::new();
        let lister = Arc::new(SubscriptionServiceClient::new(
            http.clone(),
            config.services.subscriptions_url.clone(),
        ));
        let mailer = Arc::new(EmailServiceClient::new(
            http,
            config.services.email_url.clone(),
        ));
        let engine = Arc::new(BroadcastEngine::new(
            lister,
            Arc::clone(&resolver) as Arc<dyn crate::broadcast::WeatherSource>,
            mailer,
            config.broadcast.clone(),
        ));

        Ok(Self {
            resolver,
            engine,
            cache: metered,
            metrics,
            cancel: CancellationToken::new(),
            schedules: Vec::new(),
        })
    }

    /// Builds adapters in the configured fallback order, skipping providers
    /// without credentials.
    fn build_providers(
        config: &AppConfig,
        audit: &Arc<dyn ResponseAudit>,
    ) -> Result<Vec<Arc<dyn WeatherProvider>>, AppError> {
        let mut providers: Vec<Arc<dyn WeatherProvider>> = Vec::new();

        for kind in &config.providers.order {
            match kind {
                ProviderKind::WeatherApi => match &config.providers.weatherapi_key {
                    Some(key) => {
                        let client = Self::http_client(config)?;
                        providers.push(Arc::new(WeatherApiProvider::new(
                            client,
                            key.clone(),
                            Arc::clone(audit),
                        )));
                    }
                    None => warn!("weatherapi listed in provider order but has no API key"),
                },
                ProviderKind::OpenWeather => match &config.providers.openweather_key {
                    Some(key) => {
                        let client = Self::http_client(config)?;
                        providers.push(Arc::new(OpenWeatherProvider::new(
                            client,
                            key.clone(),
                            Arc::clone(audit),
                        )));
                    }
                    None => warn!("openweather listed in provider order but has no API key"),
                },
            }
        }

        if providers.is_empty() {
            return Err(AppError::Config(
                "no provider with an API key configured".to_string(),
            ));
        }
        Ok(providers)
    }

    fn http_client(config: &AppConfig) -> Result<AsyncReqwestClient, AppError> {
        AsyncReqwestClient::with_timeout(config.http_timeout_secs).map_err(AppError::HttpClient)
    }

    /// Starts the hourly and daily broadcast schedules.
    pub fn spawn_schedules(&mut self) {
        for frequency in [Frequency::Hourly, Frequency::Daily] {
            self.schedules.push(spawn_broadcast_schedule(
                Arc::clone(&self.engine),
                frequency,
                self.cancel.clone(),
            ));
        }
    }

    /// The broadcast engine, for one-shot cycles outside the schedules.
    pub fn engine(&self) -> Arc<BroadcastEngine> {
        Arc::clone(&self.engine)
    }

    /// Resolves weather for a city through the cache and chain.
    pub async fn get_weather(&self, city: &str) -> Result<Weather, ProviderError> {
        self.resolver.get_weather(city).await
    }

    /// Checks whether any provider knows the city.
    pub async fn check_city_exists(&self, city: &str) -> Result<(), ProviderError> {
        self.resolver.check_city_exists(city).await
    }

    /// Point-in-time cache telemetry.
    pub fn telemetry_snapshot(&self) -> TelemetrySnapshot {
        self.metrics.snapshot()
    }

    /// The shutdown token shared with the schedules.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Shuts the application down gracefully.
    ///
    /// Cancels the schedules, waits for them to drain, then closes the
    /// cache. A cache-close failure is logged, not propagated; the process
    /// is exiting either way.
    pub async fn shutdown(self) {
        info!("shutting down stormcast");
        self.cancel.cancel();

        for handle in self.schedules {
            if let Err(e) = handle.await {
                warn!(error = %e, "broadcast schedule task panicked");
            }
        }

        if let Err(e) = self.cache.close().await {
            warn!(error = %e, "weather cache close failed");
        }
        info!("stormcast shutdown complete");
    }
}
