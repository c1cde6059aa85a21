//! Subscription service client.

use crate::broadcast::{Frequency, ListError, SubscriptionLister, SubscriptionPage};
use crate::provider::BoxFuture;

/// Client for the subscription service's listing endpoint.
///
/// `GET {base}/subscriptions?frequency=&after=&limit=` returning a
/// [`SubscriptionPage`]. The service guarantees only confirmed
/// subscriptions in ascending id order.
pub struct SubscriptionServiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl SubscriptionServiceClient {
    /// Creates a client against the given service base URL.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl SubscriptionLister for SubscriptionServiceClient {
    fn list_by_frequency<'a>(
        &'a self,
        frequency: Frequency,
        after: u64,
        page_size: u32,
    ) -> BoxFuture<'a, Result<SubscriptionPage, ListError>> {
        Box::pin(async move {
            let url = format!("{}/subscriptions", self.base_url);
            let response = self
                .client
                .get(&url)
                .query(&[
                    ("frequency", frequency.as_str()),
                    ("after", &after.to_string()),
                    ("limit", &page_size.to_string()),
                ])
                .send()
                .await
                .map_err(|e| ListError(format!("request failed: {}", e)))?;

            if !response.status().is_success() {
                return Err(ListError(format!(
                    "subscription service returned HTTP {}",
                    response.status()
                )));
            }

            response
                .json::<SubscriptionPage>()
                .await
                .map_err(|e| ListError(format!("undecodable page: {}", e)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_decodes_page() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "subscriptions": [{
                "id": 7,
                "email": "a@example.com",
                "city": "Kyiv",
                "frequency": "hourly",
                "confirmed": true,
                "token": "tok"
            }],
            "last_index": 7
        });

        Mock::given(method("GET"))
            .and(path("/subscriptions"))
            .and(query_param("frequency", "hourly"))
            .and(query_param("after", "0"))
            .and(query_param("limit", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = SubscriptionServiceClient::new(reqwest::Client::new(), server.uri());
        let page = client
            .list_by_frequency(Frequency::Hourly, 0, 100)
            .await
            .unwrap();

        assert_eq!(page.last_index, 7);
        assert_eq!(page.subscriptions.len(), 1);
        assert_eq!(page.subscriptions[0].email, "a@example.com");
    }

    #[tokio::test]
    async fn test_http_error_maps_to_list_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subscriptions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = SubscriptionServiceClient::new(reqwest::Client::new(), server.uri());
        let err = client
            .list_by_frequency(Frequency::Daily, 0, 100)
            .await
            .unwrap_err();

        assert!(err.0.contains("500"));
    }
}
