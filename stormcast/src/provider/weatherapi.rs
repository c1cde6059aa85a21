//! WeatherAPI.com provider.
//!
//! Primary upstream source. Uses the free-tier REST API:
//!
//! - Current conditions: `https://api.weatherapi.com/v1/current.json?key={k}&q={city}`
//! - City search: `https://api.weatherapi.com/v1/search.json?key={k}&q={city}`
//!
//! # Error Codes
//!
//! WeatherAPI reports application errors in a JSON envelope
//! `{"error": {"code": ..., "message": ...}}` alongside a non-2xx status.
//! The code table below maps them onto the shared taxonomy:
//!
//! | Code           | Meaning                    | Mapped to      |
//! |----------------|----------------------------|----------------|
//! | 1006           | no matching location       | `CityNotFound` |
//! | 2007           | quota exceeded             | `RateLimited`  |
//! | 2006/2008/2009 | key invalid/disabled/denied| `Unauthorized` |
//! | anything else  |                            | `Upstream`     |

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::provider::audit::ResponseAudit;
use crate::provider::http::{AsyncHttpClient, HttpResponse};
use crate::provider::types::{BoxFuture, ProviderError, WeatherProvider};
use crate::weather::Weather;

/// Base URL for the WeatherAPI.com v1 API.
const WEATHERAPI_BASE_URL: &str = "https://api.weatherapi.com/v1";

/// WeatherAPI.com current-conditions provider.
pub struct WeatherApiProvider<C: AsyncHttpClient> {
    http_client: C,
    api_key: String,
    audit: Arc<dyn ResponseAudit>,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current: CurrentBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temp_c: f64,
    humidity: u8,
    wind_kph: f64,
    condition: ConditionBlock,
    last_updated_epoch: i64,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBlock,
}

#[derive(Debug, Deserialize)]
struct ErrorBlock {
    code: u32,
    message: String,
}

impl<C: AsyncHttpClient> WeatherApiProvider<C> {
    /// Creates a new WeatherAPI.com provider.
    pub fn new(http_client: C, api_key: impl Into<String>, audit: Arc<dyn ResponseAudit>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            audit,
        }
    }

    /// Maps a non-2xx response onto the shared error taxonomy.
    fn map_error(&self, city: &str, response: &HttpResponse) -> ProviderError {
        if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(&response.body) {
            return match envelope.error.code {
                1006 => ProviderError::CityNotFound(city.to_string()),
                2007 => ProviderError::RateLimited,
                2006 | 2008 | 2009 => ProviderError::Unauthorized,
                code => ProviderError::Upstream {
                    code: response.status,
                    message: format!("weatherapi error {}: {}", code, envelope.error.message),
                },
            };
        }

        // No decodable envelope, fall back to the HTTP status.
        match response.status {
            401 | 403 => ProviderError::Unauthorized,
            429 => ProviderError::RateLimited,
            status => ProviderError::Upstream {
                code: status,
                message: String::from_utf8_lossy(&response.body).into_owned(),
            },
        }
    }

    fn decode_weather(&self, response: &HttpResponse) -> Result<Weather, ProviderError> {
        let decoded: CurrentResponse =
            serde_json::from_slice(&response.body).map_err(|e| ProviderError::Upstream {
                code: response.status,
                message: format!("undecodable weatherapi body: {}", e),
            })?;

        let observed_at = epoch_to_utc(decoded.current.last_updated_epoch);
        Ok(Weather {
            temperature: decoded.current.temp_c,
            humidity: decoded.current.humidity,
            description: decoded.current.condition.text,
            wind_speed: decoded.current.wind_kph,
            observed_at,
        })
    }
}

fn epoch_to_utc(epoch: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(epoch, 0).single().unwrap_or_else(Utc::now)
}

impl<C: AsyncHttpClient> WeatherProvider for WeatherApiProvider<C> {
    fn get_weather<'a>(&'a self, city: &'a str) -> BoxFuture<'a, Result<Weather, ProviderError>> {
        Box::pin(async move {
            let url = format!("{}/current.json", WEATHERAPI_BASE_URL);
            let response = self
                .http_client
                .get(&url, &[("key", self.api_key.as_str()), ("q", city)])
                .await?;

            // Audit before any decoding, even if decoding fails below.
            self.audit.record(self.name(), &response.body);

            if !response.is_success() {
                return Err(self.map_error(city, &response));
            }

            self.decode_weather(&response)
        })
    }

    fn check_city_exists<'a>(&'a self, city: &'a str) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(async move {
            let url = format!("{}/search.json", WEATHERAPI_BASE_URL);
            let response = self
                .http_client
                .get(&url, &[("key", self.api_key.as_str()), ("q", city)])
                .await?;

            self.audit.record(self.name(), &response.body);

            if !response.is_success() {
                return Err(self.map_error(city, &response));
            }

            let matches: Vec<serde_json::Value> = serde_json::from_slice(&response.body)
                .map_err(|e| ProviderError::Upstream {
                    code: response.status,
                    message: format!("undecodable weatherapi search body: {}", e),
                })?;

            if matches.is_empty() {
                return Err(ProviderError::CityNotFound(city.to_string()));
            }
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "weatherapi"
    }
}
