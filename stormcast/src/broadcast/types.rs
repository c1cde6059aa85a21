//! Broadcast domain types and external boundaries.
//!
//! The engine only ever talks to the rest of the platform through the three
//! traits defined here: the subscription lister, the weather source, and the
//! mailer. Each trait's error type is deliberately opaque — upstream
//! taxonomies are absorbed before they cross these seams.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::provider::BoxFuture;
use crate::weather::Weather;

/// How often a subscriber receives weather updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Hourly,
    Daily,
}

impl Frequency {
    /// Interval between broadcast cycles for this frequency.
    pub fn period(&self) -> Duration {
        match self {
            Frequency::Hourly => Duration::from_secs(60 * 60),
            Frequency::Daily => Duration::from_secs(24 * 60 * 60),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Hourly => "hourly",
            Frequency::Daily => "daily",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hourly" => Ok(Frequency::Hourly),
            "daily" => Ok(Frequency::Daily),
            other => Err(format!("unknown frequency: {}", other)),
        }
    }
}

/// One confirmed weather-alert subscription, owned by the subscription
/// service and read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: u64,
    pub email: String,
    pub city: String,
    pub frequency: Frequency,
    pub confirmed: bool,
    /// Unsubscribe token forwarded to the mailer.
    pub token: String,
}

/// One page of subscriptions plus the cursor for the next page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionPage {
    pub subscriptions: Vec<Subscription>,
    /// Highest subscription id in this page; pass as `after` to continue.
    pub last_index: u64,
}

/// A personalized weather update handed to the mailer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherUpdate {
    pub to: String,
    pub city: String,
    #[serde(flatten)]
    pub weather: Weather,
    pub unsubscribe_token: String,
}

/// Page fetch failed. Ends the current cycle only; no in-cycle retry.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("subscription list failed: {0}")]
pub struct ListError(pub String);

/// A single subscriber's mail dispatch failed. Isolated and logged.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("mail dispatch failed: {0}")]
pub struct DispatchError(pub String);

/// Weather resolution failed for a city. Opaque marker: the provider and
/// cache taxonomies never reach the engine.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("weather resolution failed: {0}")]
pub struct ResolveError(pub String);

/// Pages confirmed subscriptions by frequency, cursor-ordered.
pub trait SubscriptionLister: Send + Sync {
    /// Returns up to `page_size` confirmed subscriptions for `frequency`
    /// with ids strictly greater than `after`, in ascending id order.
    fn list_by_frequency<'a>(
        &'a self,
        frequency: Frequency,
        after: u64,
        page_size: u32,
    ) -> BoxFuture<'a, Result<SubscriptionPage, ListError>>;
}

/// Resolves current weather for a city (the remote weather boundary).
pub trait WeatherSource: Send + Sync {
    fn get_weather_by_city<'a>(
        &'a self,
        city: &'a str,
    ) -> BoxFuture<'a, Result<Weather, ResolveError>>;
}

/// Delivers one rendered weather-update email.
pub trait Mailer: Send + Sync {
    fn send_weather_update<'a>(
        &'a self,
        update: &'a WeatherUpdate,
    ) -> BoxFuture<'a, Result<(), DispatchError>>;
}

/// Outcome counts for one broadcast cycle.
///
/// The cycle itself never fails: partial outcomes surface here and in the
/// logs, so operators can tell "fully healthy" from "completed with skips".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BroadcastSummary {
    /// Pages fetched (including the final empty page on a clean run).
    pub pages: u64,
    /// Subscriptions seen across all pages.
    pub subscribers: u64,
    /// Emails delivered.
    pub emails_sent: u64,
    /// Dispatch tasks that ran but failed to deliver.
    pub send_failures: u64,
    /// Subscribers skipped because their city failed to resolve.
    pub skipped_unresolved: u64,
    /// Distinct cities resolved successfully this cycle.
    pub cities_resolved: u64,
    /// Distinct cities that failed to resolve this cycle.
    pub cities_failed: u64,
    /// True when a page fetch failed and the cycle ended before exhausting
    /// the subscription list.
    pub ended_early: bool,
}

impl fmt::Display for BroadcastSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sent, {} failed, {} skipped across {} subscribers ({} cities ok, {} cities failed{})",
            self.emails_sent,
            self.send_failures,
            self.skipped_unresolved,
            self.subscribers,
            self.cities_resolved,
            self.cities_failed,
            if self.ended_early { ", ended early" } else { "" },
        )
    }
}
