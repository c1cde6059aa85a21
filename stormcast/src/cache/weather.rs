//! Weather cache client.
//!
//! Wraps a generic byte [`Cache`] with:
//! - Key normalization: raw city spelling → `weather:{citykey}`
//! - JSON (de)serialization of [`Weather`] values
//!
//! Normalization is identical on the read and write paths, so distinct
//! spellings of the same city always address the same entry. A corrupt
//! stored value surfaces as `CacheError::Unmarshal`, never as a miss.

use std::sync::Arc;

use crate::cache::traits::{Cache, CacheError};
use crate::provider::BoxFuture;
use crate::weather::{CityKey, Weather};

/// Typed cache interface for weather values keyed by city.
///
/// Dyn-compatible so the metrics decorator can wrap any implementation.
pub trait WeatherCache: Send + Sync {
    /// Look up cached weather for a city. `Ok(None)` is a miss.
    fn get<'a>(&'a self, city: &'a str) -> BoxFuture<'a, Result<Option<Weather>, CacheError>>;

    /// Store weather for a city. The backend TTL applies at write time.
    fn set<'a>(&'a self, city: &'a str, weather: &'a Weather)
        -> BoxFuture<'a, Result<(), CacheError>>;

    /// Release the backing store.
    fn close(&self) -> BoxFuture<'_, Result<(), CacheError>>;
}

/// Weather cache client over a generic byte cache.
pub struct WeatherCacheClient {
    cache: Arc<dyn Cache>,
}

impl WeatherCacheClient {
    /// Creates a new client over the given backend.
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }

    /// Converts a raw city spelling to a cache key, rejecting empty input.
    fn city_to_key(city: &str) -> Result<String, CacheError> {
        let key = CityKey::new(city);
        if key.is_empty() {
            return Err(CacheError::InvalidKey);
        }
        Ok(format!("weather:{}", key))
    }
}

impl WeatherCache for WeatherCacheClient {
    fn get<'a>(&'a self, city: &'a str) -> BoxFuture<'a, Result<Option<Weather>, CacheError>> {
        Box::pin(async move {
            let key = Self::city_to_key(city)?;
            match self.cache.get(&key).await? {
                Some(bytes) => {
                    let weather: Weather = serde_json::from_slice(&bytes)
                        .map_err(|e| CacheError::Unmarshal(e.to_string()))?;
                    Ok(Some(weather))
                }
                None => Ok(None),
            }
        })
    }

    fn set<'a>(
        &'a self,
        city: &'a str,
        weather: &'a Weather,
    ) -> BoxFuture<'a, Result<(), CacheError>> {
        Box::pin(async move {
            let key = Self::city_to_key(city)?;
            let bytes =
                serde_json::to_vec(weather).map_err(|e| CacheError::Marshal(e.to_string()))?;
            self.cache.set(&key, bytes).await
        })
    }

    fn close(&self) -> BoxFuture<'_, Result<(), CacheError>> {
        self.cache.close()
    }
}
