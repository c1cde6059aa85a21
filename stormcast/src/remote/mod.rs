//! HTTP clients for the sibling platform services.
//!
//! Each client implements one broadcast boundary trait over plain
//! JSON-over-HTTP: the subscription service, the weather gateway, and the
//! email service. All of them absorb transport and status failures into the
//! boundary's opaque error type.

mod mailer;
mod subscriptions;
mod weather;

pub use mailer::EmailServiceClient;
pub use subscriptions::SubscriptionServiceClient;
pub use weather::WeatherGatewayClient;
