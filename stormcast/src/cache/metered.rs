//! Metrics decorator for the weather cache.
//!
//! Cross-cutting instrumentation layered over any [`WeatherCache`]: every
//! operation increments one of {hit, miss, error, skipped} and records its
//! latency. A `set` whose city normalizes to an empty key is counted as
//! `skipped` and returns success without touching the backend — a no-op
//! guard, not an error.

use std::sync::Arc;
use std::time::Instant;

use crate::cache::traits::CacheError;
use crate::cache::weather::WeatherCache;
use crate::provider::BoxFuture;
use crate::telemetry::CacheMetrics;
use crate::weather::{CityKey, Weather};

/// Weather cache decorator reporting hit/miss/error/skipped counts and
/// operation latency to [`CacheMetrics`].
pub struct MeteredWeatherCache {
    inner: Arc<dyn WeatherCache>,
    metrics: Arc<CacheMetrics>,
}

impl MeteredWeatherCache {
    /// Wraps `inner`, reporting to `metrics`.
    pub fn new(inner: Arc<dyn WeatherCache>, metrics: Arc<CacheMetrics>) -> Self {
        Self { inner, metrics }
    }
}

impl WeatherCache for MeteredWeatherCache {
    fn get<'a>(&'a self, city: &'a str) -> BoxFuture<'a, Result<Option<Weather>, CacheError>> {
        Box::pin(async move {
            let start = Instant::now();
            let result = self.inner.get(city).await;
            self.metrics.observe_latency(start.elapsed());

            match &result {
                Ok(Some(_)) => self.metrics.hit(),
                Ok(None) => self.metrics.miss(),
                Err(_) => self.metrics.error(),
            }
            result
        })
    }

    fn set<'a>(
        &'a self,
        city: &'a str,
        weather: &'a Weather,
    ) -> BoxFuture<'a, Result<(), CacheError>> {
        Box::pin(async move {
            if CityKey::new(city).is_empty() {
                self.metrics.skipped();
                return Ok(());
            }

            let start = Instant::now();
            let result = self.inner.set(city, weather).await;
            self.metrics.observe_latency(start.elapsed());

            if result.is_err() {
                self.metrics.error();
            }
            result
        })
    }

    fn close(&self) -> BoxFuture<'_, Result<(), CacheError>> {
        self.inner.close()
    }
}
