//! Application bootstrap and lifecycle management.
//!
//! This module provides the `StormcastApp` type which handles initialization
//! sequencing and graceful shutdown:
//!
//! 1. Provider adapters are built from configured credentials and composed
//!    into the fallback chain (fatal if the result would be empty).
//! 2. The TTL cache is wrapped in the metrics decorator and the resolver is
//!    assembled over cache and chain.
//! 3. The broadcast engine is wired to the sibling services and, on
//!    request, periodic schedules are spawned per frequency.
//!
//! Shutdown reverses the order: schedules are cancelled and drained before
//! the cache is closed.

mod bootstrap;
mod config;
mod error;

pub use bootstrap::StormcastApp;
pub use config::{
    AppConfig, CacheSettings, ProviderKind, ProviderSettings, ServiceEndpoints,
    DEFAULT_CACHE_SIZE_BYTES, DEFAULT_CACHE_TTL_SECS, DEFAULT_HTTP_TIMEOUT_SECS,
};
pub use error::AppError;
