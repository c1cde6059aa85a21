//! TTL cache for resolved weather.
//!
//! Layered design, bottom to top:
//!
//! - [`Cache`] — generic byte key-value interface with backend-enforced TTL
//!   ([`MemoryCache`] is the moka-backed implementation).
//! - [`WeatherCacheClient`] — key normalization and JSON (de)serialization.
//! - [`MeteredWeatherCache`] — hit/miss/error/skipped counters and latency.
//!
//! Cache failures are never fatal: every caller degrades to a direct
//! provider lookup.

mod memory;
mod metered;
mod traits;
mod weather;

pub use memory::MemoryCache;
pub use metered::MeteredWeatherCache;
pub use traits::{Cache, CacheError};
pub use weather::{WeatherCache, WeatherCacheClient};
