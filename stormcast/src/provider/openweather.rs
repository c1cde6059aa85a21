//! OpenWeatherMap provider.
//!
//! Fallback upstream source, used when WeatherAPI.com is unavailable.
//!
//! - Current conditions: `https://api.openweathermap.org/data/2.5/weather?q={city}&appid={k}&units=metric`
//!
//! # Error Mapping
//!
//! OpenWeatherMap reports errors through the HTTP status (mirrored in the
//! body's `cod` field):
//!
//! | Status | Meaning           | Mapped to      |
//! |--------|-------------------|----------------|
//! | 404    | city not found    | `CityNotFound` |
//! | 429    | quota exceeded    | `RateLimited`  |
//! | 401    | bad API key       | `Unauthorized` |
//! | other  |                   | `Upstream`     |
//!
//! # Units
//!
//! Requests use `units=metric`, which returns temperature in Celsius but
//! wind speed in m/s. Wind is converted to km/h to match the domain model.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use serde::Deserialize;

use crate::provider::audit::ResponseAudit;
use crate::provider::http::{AsyncHttpClient, HttpResponse};
use crate::provider::types::{BoxFuture, ProviderError, WeatherProvider};
use crate::weather::Weather;

/// Base URL for the OpenWeatherMap 2.5 API.
const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Conversion factor from m/s to km/h.
const MPS_TO_KMH: f64 = 3.6;

/// OpenWeatherMap current-conditions provider.
pub struct OpenWeatherProvider<C: AsyncHttpClient> {
    http_client: C,
    api_key: String,
    audit: Arc<dyn ResponseAudit>,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    main: MainBlock,
    wind: WindBlock,
    weather: Vec<ConditionBlock>,
    dt: i64,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct WindBlock {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    description: String,
}

impl<C: AsyncHttpClient> OpenWeatherProvider<C> {
    /// Creates a new OpenWeatherMap provider.
    pub fn new(http_client: C, api_key: impl Into<String>, audit: Arc<dyn ResponseAudit>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            audit,
        }
    }

    fn map_error(&self, city: &str, response: &HttpResponse) -> ProviderError {
        match response.status {
            404 => ProviderError::CityNotFound(city.to_string()),
            429 => ProviderError::RateLimited,
            401 => ProviderError::Unauthorized,
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
                message: format!("undecodable openweather body: {}", e),
            })?;

        let description = decoded
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .unwrap_or_default();

        Ok(Weather {
            temperature: decoded.main.temp,
            humidity: decoded.main.humidity,
            description,
            wind_speed: decoded.wind.speed * MPS_TO_KMH,
            observed_at: Utc
                .timestamp_opt(decoded.dt, 0)
                .single()
                .unwrap_or_else(Utc::now),
        })
    }

    async fn fetch(&self, city: &str) -> Result<HttpResponse, ProviderError> {
        let url = format!("{}/weather", OPENWEATHER_BASE_URL);
        let response = self
            .http_client
            .get(
                &url,
                &[
                    ("q", city),
                    ("appid", self.api_key.as_str()),
                    ("units", "metric"),
                ],
            )
            .await?;

        // Audit before any decoding, even if decoding fails later.
        self.audit.record(self.name(), &response.body);
        Ok(response)
    }
}

impl<C: AsyncHttpClient> WeatherProvider for OpenWeatherProvider<C> {
    fn get_weather<'a>(&'a self, city: &'a str) -> BoxFuture<'a, Result<Weather, ProviderError>> {
        Box::pin(async move {
            let response = self.fetch(city).await?;
            if !response.is_success() {
                return Err(self.map_error(city, &response));
            }
            self.decode_weather(&response)
        })
    }

    fn check_city_exists<'a>(&'a self, city: &'a str) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(async move {
            // No dedicated search endpoint; a current-conditions probe with
            // the body discarded answers the existence question.
            let response = self.fetch(city).await?;
            if !response.is_success() {
                return Err(self.map_error(city, &response));
            }
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "openweather"
    }
}
