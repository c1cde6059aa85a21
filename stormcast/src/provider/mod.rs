//! Upstream weather source abstraction
//!
//! This module provides the [`WeatherProvider`] trait, concrete adapters for
//! the supported upstream APIs, and the priority-ordered fallback chain that
//! composes them.
//!
//! # Adding an Upstream
//!
//! Implement [`WeatherProvider`] for a new adapter owning its URL
//! construction, response decoding, and error-code table, then append it to
//! the adapter list handed to [`ProviderChain::new`]. Every adapter must
//! record the raw response body to the audit log before decoding.

mod audit;
mod chain;
mod http;
mod openweather;
mod types;
mod weatherapi;

pub use audit::{FileResponseAudit, NullResponseAudit, ResponseAudit};
pub use chain::{EmptyChainError, ProviderChain};
pub use http::{AsyncHttpClient, AsyncReqwestClient, HttpResponse};
pub use openweather::OpenWeatherProvider;
pub use types::{BoxFuture, ProviderError, WeatherProvider};
pub use weatherapi::WeatherApiProvider;

#[cfg(test)]
pub use audit::tests::RecordingAudit;
#[cfg(test)]
pub use chain::tests::{sample_weather, ScriptedProvider};
#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
