//! Cached weather resolver.
//!
//! Cache-aside composition of the weather cache and the provider chain:
//! check the cache first, fall back to the chain on a miss or cache error,
//! and write fresh values back best-effort. A cache-write failure after a
//! successful upstream fetch is logged, never propagated.
//!
//! Existence checks always go straight to the chain: they are cheap, rarely
//! repeated, and staleness there is undesirable.

use std::sync::Arc;

use tracing::warn;

use crate::broadcast::{ResolveError, WeatherSource};
use crate::cache::WeatherCache;
use crate::provider::{BoxFuture, ProviderChain, ProviderError, WeatherProvider};
use crate::weather::Weather;

/// Weather resolver combining a TTL cache with the provider chain.
pub struct CachedWeatherResolver {
    cache: Arc<dyn WeatherCache>,
    chain: Arc<ProviderChain>,
}

impl CachedWeatherResolver {
    /// Creates a resolver over the given cache and chain.
    pub fn new(cache: Arc<dyn WeatherCache>, chain: Arc<ProviderChain>) -> Self {
        Self { cache, chain }
    }

    /// Resolves current weather for a city, cache first.
    ///
    /// A cache hit short-circuits the chain entirely; staleness is governed
    /// solely by the backend TTL. On a miss or any cache error the chain is
    /// consulted, and a success is written through best-effort.
    pub async fn get_weather(&self, city: &str) -> Result<Weather, ProviderError> {
        match self.cache.get(city).await {
            Ok(Some(weather)) => return Ok(weather),
            Ok(None) => {}
            Err(e) => {
                warn!(city, error = %e, "weather cache read failed, falling back to providers");
            }
        }

        let weather = self.chain.get_weather(city).await?;

        if let Err(e) = self.cache.set(city, &weather).await {
            warn!(city, error = %e, "weather cache write failed");
        }

        Ok(weather)
    }

    /// Checks whether any provider knows the city. Never cached.
    pub async fn check_city_exists(&self, city: &str) -> Result<(), ProviderError> {
        self.chain.check_city_exists(city).await
    }
}

impl WeatherSource for CachedWeatherResolver {
    fn get_weather_by_city<'a>(
        &'a self,
        city: &'a str,
    ) -> BoxFuture<'a, Result<Weather, ResolveError>> {
        // Provider and cache errors are absorbed here; the broadcast engine
        // only ever sees an opaque failure-to-resolve marker.
        Box::pin(async move {
            self.get_weather(city)
                .await
                .map_err(|e| ResolveError(e.to_string()))
        })
    }
}
