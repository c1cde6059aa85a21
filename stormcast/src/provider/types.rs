//! Provider trait and shared error taxonomy.

use thiserror::Error;

use crate::weather::Weather;

/// Boxed future type for dyn-compatible async methods.
pub use futures::future::BoxFuture;

/// Errors that can occur while resolving weather through a provider.
///
/// Each adapter owns a private table mapping its upstream error codes onto
/// these shared variants, so callers never see provider-specific codes.
/// All variants except `AllProvidersUnavailable` are per-adapter and
/// recoverable via chain fallback.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    /// The upstream source does not know the requested city.
    #[error("city not found: {0}")]
    CityNotFound(String),

    /// The upstream source rejected the request due to quota exhaustion.
    #[error("rate limited by upstream")]
    RateLimited,

    /// The upstream source rejected our credentials.
    #[error("unauthorized by upstream")]
    Unauthorized,

    /// Any other upstream failure: transport errors (code 0), unexpected
    /// HTTP statuses, or undecodable response bodies.
    #[error("upstream failure (code {code}): {message}")]
    Upstream { code: u16, message: String },

    /// Every adapter in the chain failed. Only produced by the chain itself.
    #[error("all providers unavailable: {0}")]
    AllProvidersUnavailable(String),
}

impl ProviderError {
    /// Builds a transport-level upstream error (no HTTP status available).
    pub fn transport(message: impl Into<String>) -> Self {
        ProviderError::Upstream {
            code: 0,
            message: message.into(),
        }
    }
}

/// A single upstream weather source.
///
/// Implementations own request construction, response decoding, and error
/// mapping for exactly one upstream. The chain composes them in priority
/// order, so the trait is dyn-compatible via [`BoxFuture`].
pub trait WeatherProvider: Send + Sync {
    /// Resolves current weather for a city.
    fn get_weather<'a>(&'a self, city: &'a str) -> BoxFuture<'a, Result<Weather, ProviderError>>;

    /// Checks whether the upstream source knows the city.
    ///
    /// Returns `Ok(())` when the city exists, `Err(CityNotFound)` when it
    /// does not, and other variants for upstream failures.
    fn check_city_exists<'a>(&'a self, city: &'a str) -> BoxFuture<'a, Result<(), ProviderError>>;

    /// Short provider name used in logs and the audit trail.
    fn name(&self) -> &str;
}
