//! Email service client.

use crate::broadcast::{DispatchError, Mailer, WeatherUpdate};
use crate::provider::BoxFuture;

/// Client for the email service's weather-update endpoint.
///
/// `POST {base}/emails/weather-update` with the [`WeatherUpdate`] payload.
/// Template rendering and SMTP delivery are the email service's concern;
/// this side only hands over structured fields.
pub struct EmailServiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl EmailServiceClient {
    /// Creates a client against the given service base URL.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl Mailer for EmailServiceClient {
    fn send_weather_update<'a>(
        &'a self,
        update: &'a WeatherUpdate,
    ) -> BoxFuture<'a, Result<(), DispatchError>> {
        Box::pin(async move {
            let url = format!("{}/emails/weather-update", self.base_url);
            let response = self
                .client
                .post(&url)
                .json(update)
                .send()
                .await
                .map_err(|e| DispatchError(format!("request failed: {}", e)))?;

            if !response.status().is_success() {
                return Err(DispatchError(format!(
                    "email service returned HTTP {}",
                    response.status()
                )));
            }
            Ok(())
        })
    }
}
