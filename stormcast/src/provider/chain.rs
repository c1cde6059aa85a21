//! Ordered fallback chain over weather providers.
//!
//! The chain holds an immutable, priority-ordered adapter list and tries
//! each adapter in turn, returning the first success. There is no load
//! balancing or randomization; order is the whole policy.
//!
//! Exhaustion is deliberately asymmetric:
//!
//! - `get_weather` with every adapter failing is a hard failure
//!   (`AllProvidersUnavailable`) — we cannot send weather we do not have.
//! - `check_city_exists` with every adapter failing degrades to
//!   `CityNotFound` — an existence question without an answer is "unknown",
//!   not an outage.

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::provider::types::{BoxFuture, ProviderError, WeatherProvider};
use crate::weather::Weather;

/// Chain construction failed because no adapters were supplied.
///
/// An empty chain would silently resolve nothing, so this is fatal at
/// startup rather than a runtime degradation.
#[derive(Debug, Error)]
#[error("provider chain requires at least one adapter")]
pub struct EmptyChainError;

/// Priority-ordered fallback chain of weather providers.
///
/// The chain itself implements [`WeatherProvider`], so callers compose it
/// exactly like a single adapter.
pub struct ProviderChain {
    providers: Vec<Arc<dyn WeatherProvider>>,
}

impl ProviderChain {
    /// Builds a chain from a non-empty, priority-ordered adapter list.
    pub fn new(providers: Vec<Arc<dyn WeatherProvider>>) -> Result<Self, EmptyChainError> {
        if providers.is_empty() {
            return Err(EmptyChainError);
        }
        Ok(Self { providers })
    }

    /// Number of adapters in the chain.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Always false; construction rejects empty chains.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    fn provider_names(&self) -> String {
        self.providers
            .iter()
            .map(|p| p.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl WeatherProvider for ProviderChain {
    fn get_weather<'a>(&'a self, city: &'a str) -> BoxFuture<'a, Result<Weather, ProviderError>> {
        Box::pin(async move {
            for provider in &self.providers {
                match provider.get_weather(city).await {
                    Ok(weather) => return Ok(weather),
                    Err(e) => {
                        warn!(
                            provider = provider.name(),
                            city,
                            error = %e,
                            "provider failed, trying next in chain"
                        );
                    }
                }
            }
            Err(ProviderError::AllProvidersUnavailable(self.provider_names()))
        })
    }

    fn check_city_exists<'a>(&'a self, city: &'a str) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(async move {
            for provider in &self.providers {
                match provider.check_city_exists(city).await {
                    Ok(()) => return Ok(()),
                    Err(e) => {
                        warn!(
                            provider = provider.name(),
                            city,
                            error = %e,
                            "existence check failed, trying next in chain"
                        );
                    }
                }
            }
            // Exhaustion degrades to "unknown city", not an outage.
            Err(ProviderError::CityNotFound(city.to_string()))
        })
    }

    fn name(&self) -> &str {
        "chain"
    }
}
