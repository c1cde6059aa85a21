//! Application configuration for StormcastApp.
//!
//! `AppConfig` combines everything needed to bootstrap the application:
//! provider credentials and ordering, cache sizing, broadcast tuning, and
//! the sibling service endpoints.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::broadcast::BroadcastConfig;

/// Default weather cache TTL (in seconds).
///
/// Current-conditions data goes stale quickly; ten minutes keeps repeated
/// lookups cheap without serving meaningfully outdated weather.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;

/// Default weather cache capacity in bytes.
pub const DEFAULT_CACHE_SIZE_BYTES: u64 = 64 * 1024 * 1024;

/// Default upstream request timeout (in seconds).
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// A configured upstream weather source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    WeatherApi,
    OpenWeather,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weatherapi" => Ok(ProviderKind::WeatherApi),
            "openweather" => Ok(ProviderKind::OpenWeather),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

/// Upstream provider configuration.
///
/// `order` determines the fallback chain: the first entry is the primary,
/// later entries are tried in turn when earlier ones fail. A provider is
/// only usable if its API key is present.
#[derive(Clone, Debug)]
pub struct ProviderSettings {
    pub weatherapi_key: Option<String>,
    pub openweather_key: Option<String>,
    pub order: Vec<ProviderKind>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            weatherapi_key: None,
            openweather_key: None,
            order: vec![ProviderKind::WeatherApi, ProviderKind::OpenWeather],
        }
    }
}

/// Weather cache configuration.
#[derive(Clone, Debug)]
pub struct CacheSettings {
    /// Maximum cache size in bytes.
    pub max_size_bytes: u64,

    /// Entry lifetime, fixed at write time.
    pub ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_CACHE_SIZE_BYTES,
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

/// Base URLs of the sibling platform services.
#[derive(Clone, Debug)]
pub struct ServiceEndpoints {
    /// Subscription service (paginated listing).
    pub subscriptions_url: String,

    /// Email service (weather-update dispatch).
    pub email_url: String,
}

/// Top-level configuration passed to `StormcastApp::start()`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Upstream provider credentials and fallback order.
    pub providers: ProviderSettings,

    /// Weather cache sizing and TTL.
    pub cache: CacheSettings,

    /// Broadcast pagination and dispatch pool tuning.
    pub broadcast: BroadcastConfig,

    /// Sibling service endpoints.
    pub services: ServiceEndpoints,

    /// Directory for raw upstream response audit logs. `None` disables
    /// auditing.
    pub audit_dir: Option<PathBuf>,

    /// Upstream request timeout in seconds.
    pub http_timeout_secs: u64,
}

impl AppConfig {
    /// Creates a config with default cache, broadcast, and provider-order
    /// settings.
    pub fn new(services: ServiceEndpoints) -> Self {
        Self {
            providers: ProviderSettings::default(),
            cache: CacheSettings::default(),
            broadcast: BroadcastConfig::default(),
            services,
            audit_dir: None,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }

    /// Set the WeatherAPI.com API key.
    pub fn with_weatherapi_key(mut self, key: impl Into<String>) -> Self {
        self.providers.weatherapi_key = Some(key.into());
        self
    }

    /// Set the OpenWeatherMap API key.
    pub fn with_openweather_key(mut self, key: impl Into<String>) -> Self {
        self.providers.openweather_key = Some(key.into());
        self
    }

    /// Set the provider fallback order.
    pub fn with_provider_order(mut self, order: Vec<ProviderKind>) -> Self {
        self.providers.order = order;
        self
    }

    /// Set the weather cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache.ttl = ttl;
        self
    }

    /// Set the weather cache capacity.
    pub fn with_cache_size(mut self, size_bytes: u64) -> Self {
        self.cache.max_size_bytes = size_bytes;
        self
    }

    /// Set broadcast tuning.
    pub fn with_broadcast(mut self, broadcast: BroadcastConfig) -> Self {
        self.broadcast = broadcast;
        self
    }

    /// Enable raw response auditing under `dir`.
    pub fn with_audit_dir(mut self, dir: PathBuf) -> Self {
        self.audit_dir = Some(dir);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> ServiceEndpoints {
        ServiceEndpoints {
            subscriptions_url: "http://subs.local".to_string(),
            email_url: "http://mail.local".to_string(),
        }
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::new(endpoints());
        assert_eq!(config.cache.ttl, Duration::from_secs(600));
        assert_eq!(config.cache.max_size_bytes, 64 * 1024 * 1024);
        assert_eq!(
            config.providers.order,
            vec![ProviderKind::WeatherApi, ProviderKind::OpenWeather]
        );
        assert!(config.audit_dir.is_none());
    }

    #[test]
    fn test_builder_methods() {
        let config = AppConfig::new(endpoints())
            .with_weatherapi_key("k1")
            .with_openweather_key("k2")
            .with_provider_order(vec![ProviderKind::OpenWeather])
            .with_cache_ttl(Duration::from_secs(30))
            .with_cache_size(1024);

        assert_eq!(config.providers.weatherapi_key.as_deref(), Some("k1"));
        assert_eq!(config.providers.openweather_key.as_deref(), Some("k2"));
        assert_eq!(config.providers.order, vec![ProviderKind::OpenWeather]);
        assert_eq!(config.cache.ttl, Duration::from_secs(30));
        assert_eq!(config.cache.max_size_bytes, 1024);
    }

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!(
            "weatherapi".parse::<ProviderKind>().unwrap(),
            ProviderKind::WeatherApi
        );
        assert_eq!(
            " OpenWeather ".parse::<ProviderKind>().unwrap(),
            ProviderKind::OpenWeather
        );
        assert!("accuweather".parse::<ProviderKind>().is_err());
    }
}
