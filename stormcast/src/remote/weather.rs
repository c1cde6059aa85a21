//! Weather gateway client.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::broadcast::{ResolveError, WeatherSource};
use crate::provider::BoxFuture;
use crate::weather::Weather;

/// Client for the weather gateway's resolution endpoint.
///
/// `GET {base}/weather?city=` returning current conditions. Used when the
/// broadcast engine runs in a separate process from the weather resolver;
/// in-process deployments wire [`crate::resolver::CachedWeatherResolver`]
/// into the same seam instead.
pub struct WeatherGatewayClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    temperature: f64,
    humidity: u8,
    description: String,
    wind_speed: f64,
    /// The gateway may omit the observation time; "now" is close enough
    /// for a freshly resolved value.
    observed_at: Option<DateTime<Utc>>,
}

impl WeatherGatewayClient {
    /// Creates a client against the given gateway base URL.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl WeatherSource for WeatherGatewayClient {
    fn get_weather_by_city<'a>(
        &'a self,
        city: &'a str,
    ) -> BoxFuture<'a, Result<Weather, ResolveError>> {
        Box::pin(async move {
            let url = format!("{}/weather", self.base_url);
            let response = self
                .client
                .get(&url)
                .query(&[("city", city)])
                .send()
                .await
                .map_err(|e| ResolveError(format!("request failed: {}", e)))?;

            if !response.status().is_success() {
                return Err(ResolveError(format!(
                    "weather gateway returned HTTP {}",
                    response.status()
                )));
            }

            let decoded: WeatherResponse = response
                .json()
                .await
                .map_err(|e| ResolveError(format!("undecodable weather: {}", e)))?;

            Ok(Weather {
                temperature: decoded.temperature,
                humidity: decoded.humidity,
                description: decoded.description,
                wind_speed: decoded.wind_speed,
                observed_at: decoded.observed_at.unwrap_or_else(Utc::now),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_resolve_decodes_weather() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "temperature": 8.5,
            "humidity": 70,
            "description": "Mist",
            "wind_speed": 12.0
        });

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("city", "kyiv"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = WeatherGatewayClient::new(reqwest::Client::new(), server.uri());
        let weather = client.get_weather_by_city("kyiv").await.unwrap();

        assert_eq!(weather.temperature, 8.5);
        assert_eq!(weather.humidity, 70);
        assert_eq!(weather.description, "Mist");
    }

    #[tokio::test]
    async fn test_gateway_failure_is_opaque_marker() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = WeatherGatewayClient::new(reqwest::Client::new(), server.uri());
        let err = client.get_weather_by_city("kyiv").await.unwrap_err();
        assert!(err.0.contains("502"));
    }
}
