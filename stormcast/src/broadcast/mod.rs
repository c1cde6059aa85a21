//! Periodic weather-email fan-out.
//!
//! The [`BroadcastEngine`] pages through confirmed subscriptions for one
//! frequency, resolves weather once per distinct city per cycle, and
//! dispatches personalized emails through a bounded worker pool with a
//! completion barrier. External collaborators plug in through the
//! [`SubscriptionLister`], [`WeatherSource`], and [`Mailer`] seams.

mod engine;
mod types;

pub use engine::{BroadcastConfig, BroadcastEngine, DEFAULT_PAGE_SIZE, DEFAULT_POOL_SIZE};
pub use types::{
    BroadcastSummary, DispatchError, Frequency, ListError, Mailer, ResolveError, Subscription,
    SubscriptionLister, SubscriptionPage, WeatherSource, WeatherUpdate,
};
