//! Weather domain types.
//!
//! This module defines the `Weather` value object returned by providers and
//! stored in the cache, plus the normalized `CityKey` used to address cache
//! entries and per-cycle memoization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A current-conditions observation for one city.
///
/// `Weather` is an immutable value: its identity is the city it was resolved
/// for, not any persistent entity id. Equality is field-for-field, which is
/// what cache round-trip tests rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    /// Relative humidity, 0-100.
    pub humidity: u8,
    /// Human-readable condition text (e.g. "Partly cloudy").
    pub description: String,
    /// Wind speed in km/h.
    pub wind_speed: f64,
    /// When the upstream source observed these conditions.
    pub observed_at: DateTime<Utc>,
}

/// Normalized city key.
///
/// Distinct raw spellings that normalize equal ("Kyiv", " kyiv ", "KYIV")
/// must address the same cache entry and the same per-cycle memo slot, so
/// every read and write path goes through this one function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CityKey(String);

impl CityKey {
    /// Normalizes a raw city spelling: trim surrounding whitespace, lowercase.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    /// Returns the normalized key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the raw input normalized to nothing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for CityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
