//! Broadcast engine: periodic fan-out of weather emails.
//!
//! One invocation pages through confirmed subscriptions in cursor order,
//! resolves weather once per distinct city, and dispatches personalized
//! emails through a bounded worker pool. The per-cycle city map is owned by
//! the invocation and written only on the page-processing path; dispatch
//! tasks capture resolved values, never a live reference, so no locking is
//! needed.
//!
//! Failure semantics: a single subscriber's mail failure is isolated; a
//! page-fetch failure ends the cycle early; everything is reported through
//! the returned [`BroadcastSummary`] and structured logs, never as an `Err`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::broadcast::types::{
    BroadcastSummary, DispatchError, Frequency, ListError, Mailer, ResolveError,
    SubscriptionLister, WeatherSource, WeatherUpdate,
};
use crate::weather::{CityKey, Weather};

/// Default page size for subscription listing.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Default number of concurrent email dispatch tasks.
pub const DEFAULT_POOL_SIZE: usize = 10;

/// Tuning knobs for the broadcast engine.
#[derive(Debug, Clone)]
pub struct BroadcastConfig {
    /// Subscriptions fetched per page.
    pub page_size: u32,
    /// Maximum in-flight dispatch tasks. Fixed budget shared by all
    /// subscribers in one invocation; not adaptive.
    pub pool_size: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

/// Drives one broadcast cycle per invocation.
pub struct BroadcastEngine {
    lister: Arc<dyn SubscriptionLister>,
    weather: Arc<dyn WeatherSource>,
    mailer: Arc<dyn Mailer>,
    page_size: u32,
    permits: Arc<Semaphore>,
    in_flight: Arc<AtomicUsize>,
}

/// Races an outbound call against cancellation. A cancelled call surfaces
/// as a per-call error, handled identically to any other failure.
async fn outbound<T, E, F>(
    cancel: &CancellationToken,
    call: F,
    on_cancel: impl FnOnce() -> E,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    tokio::select! {
        // Biased so an already-cancelled token always wins over a ready call.
        biased;
        _ = cancel.cancelled() => Err(on_cancel()),
        result = call => result,
    }
}

impl BroadcastEngine {
    /// Creates an engine over the three external boundaries.
    pub fn new(
        lister: Arc<dyn SubscriptionLister>,
        weather: Arc<dyn WeatherSource>,
        mailer: Arc<dyn Mailer>,
        config: BroadcastConfig,
    ) -> Self {
        Self {
            lister,
            weather,
            mailer,
            page_size: config.page_size,
            permits: Arc::new(Semaphore::new(config.pool_size)),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Current number of running dispatch tasks.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Runs one broadcast cycle for `frequency`.
    ///
    /// Returns after every submitted dispatch task has completed. The
    /// summary is the only outcome surface; the cycle itself cannot fail.
    pub async fn broadcast(
        &self,
        frequency: Frequency,
        cancel: &CancellationToken,
    ) -> BroadcastSummary {
        let mut summary = BroadcastSummary::default();
        let mut cursor = 0u64;
        // Per-cycle memo: at most one resolution per distinct city,
        // regardless of subscriber count. Discarded when the cycle ends;
        // reuse across cycles is the cache TTL's job.
        let mut city_weather: HashMap<CityKey, Option<Weather>> = HashMap::new();
        let mut dispatches: JoinSet<Result<(), DispatchError>> = JoinSet::new();

        loop {
            let page = match outbound(
                cancel,
                self.lister
                    .list_by_frequency(frequency, cursor, self.page_size),
                || ListError("cancelled".to_string()),
            )
            .await
            {
                Ok(page) => page,
                Err(e) => {
                    error!(%frequency, cursor, error = %e, "subscription page fetch failed, ending cycle");
                    summary.ended_early = true;
                    break;
                }
            };

            summary.pages += 1;
            if page.subscriptions.is_empty() {
                break;
            }

            for subscription in &page.subscriptions {
                summary.subscribers += 1;
                let key = CityKey::new(&subscription.city);

                if !city_weather.contains_key(&key) {
                    let resolved = outbound(
                        cancel,
                        self.weather.get_weather_by_city(key.as_str()),
                        || ResolveError("cancelled".to_string()),
                    )
                    .await;

                    match resolved {
                        Ok(weather) => {
                            summary.cities_resolved += 1;
                            city_weather.insert(key.clone(), Some(weather));
                        }
                        Err(e) => {
                            warn!(city = %key, error = %e, "weather resolution failed for city");
                            summary.cities_failed += 1;
                            city_weather.insert(key.clone(), None);
                        }
                    }
                }

                match city_weather.get(&key) {
                    Some(Some(weather)) => {
                        let update = WeatherUpdate {
                            to: subscription.email.clone(),
                            city: subscription.city.clone(),
                            weather: weather.clone(),
                            unsubscribe_token: subscription.token.clone(),
                        };
                        self.submit_dispatch(&mut dispatches, update, cancel).await;
                    }
                    _ => {
                        warn!(
                            subscription = subscription.id,
                            city = %subscription.city,
                            "skipping subscriber: city failed to resolve"
                        );
                        summary.skipped_unresolved += 1;
                    }
                }
            }

            cursor = page.last_index;
        }

        // Completion barrier: wait out every in-flight dispatch.
        while let Some(joined) = dispatches.join_next().await {
            match joined {
                Ok(Ok(())) => summary.emails_sent += 1,
                Ok(Err(_)) => summary.send_failures += 1,
                Err(e) => {
                    warn!(error = %e, "dispatch task panicked");
                    summary.send_failures += 1;
                }
            }
        }

        info!(%frequency, %summary, "broadcast cycle complete");
        summary
    }

    /// Submits one email dispatch, blocking while the pool is saturated.
    ///
    /// The permit is acquired on the page-processing path, so a full pool
    /// provides natural backpressure on the weather and mail dependencies.
    async fn submit_dispatch(
        &self,
        dispatches: &mut JoinSet<Result<(), DispatchError>>,
        update: WeatherUpdate,
        cancel: &CancellationToken,
    ) {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .expect("dispatch semaphore closed");

        let mailer = Arc::clone(&self.mailer);
        let in_flight = Arc::clone(&self.in_flight);
        let cancel = cancel.clone();

        dispatches.spawn(async move {
            let _permit = permit;
            in_flight.fetch_add(1, Ordering::SeqCst);

            let result = outbound(&cancel, mailer.send_weather_update(&update), || {
                DispatchError("cancelled".to_string())
            })
            .await;

            in_flight.fetch_sub(1, Ordering::SeqCst);

            if let Err(ref e) = result {
                warn!(to = %update.to, city = %update.city, error = %e, "weather update send failed");
            }
            result
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::types::{Subscription, SubscriptionPage};
    use crate::provider::BoxFuture;
    use chrono::Utc;
    use parking_lot::Mutex;
    use std::time::Duration;

    fn sample_weather(temp: f64) -> Weather {
        Weather {
            temperature: temp,
            humidity: 55,
            description: "cloudy".to_string(),
            wind_speed: 9.0,
            observed_at: Utc::now(),
        }
    }

    fn subscription(id: u64, email: &str, city: &str) -> Subscription {
        Subscription {
            id,
            email: email.to_string(),
            city: city.to_string(),
            frequency: Frequency::Hourly,
            confirmed: true,
            token: format!("tok-{}", id),
        }
    }

    /// In-memory lister paging over a fixed subscription set, optionally
    /// failing from a given page number on.
    struct MockLister {
        subscriptions: Vec<Subscription>,
        fail_from_page: Option<usize>,
        pages_served: AtomicUsize,
        cursors_seen: Mutex<Vec<u64>>,
    }

    impl MockLister {
        fn new(subscriptions: Vec<Subscription>) -> Arc<Self> {
            Arc::new(Self {
                subscriptions,
                fail_from_page: None,
                pages_served: AtomicUsize::new(0),
                cursors_seen: Mutex::new(Vec::new()),
            })
        }

        fn failing_from_page(subscriptions: Vec<Subscription>, page: usize) -> Arc<Self> {
            Arc::new(Self {
                subscriptions,
                fail_from_page: Some(page),
                pages_served: AtomicUsize::new(0),
                cursors_seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl SubscriptionLister for MockLister {
        fn list_by_frequency<'a>(
            &'a self,
            frequency: Frequency,
            after: u64,
            page_size: u32,
        ) -> BoxFuture<'a, Result<SubscriptionPage, ListError>> {
            Box::pin(async move {
                let page_number = self.pages_served.fetch_add(1, Ordering::SeqCst);
                self.cursors_seen.lock().push(after);

                if let Some(fail_from) = self.fail_from_page {
                    if page_number >= fail_from {
                        return Err(ListError("lister down".to_string()));
                    }
                }

                let subscriptions: Vec<Subscription> = self
                    .subscriptions
                    .iter()
                    .filter(|s| s.confirmed && s.frequency == frequency && s.id > after)
                    .take(page_size as usize)
                    .cloned()
                    .collect();

                let last_index = subscriptions.last().map(|s| s.id).unwrap_or(after);
                Ok(SubscriptionPage {
                    subscriptions,
                    last_index,
                })
            })
        }
    }

    /// Weather source with scripted per-city outcomes and call counting.
    struct MockWeatherSource {
        failing_cities: Vec<String>,
        calls: Mutex<HashMap<String, usize>>,
    }

    impl MockWeatherSource {
        fn new(failing_cities: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                failing_cities: failing_cities.iter().map(|c| c.to_string()).collect(),
                calls: Mutex::new(HashMap::new()),
            })
        }

        fn calls_for(&self, city: &str) -> usize {
            self.calls.lock().get(city).copied().unwrap_or(0)
        }

        fn total_calls(&self) -> usize {
            self.calls.lock().values().sum()
        }
    }

    impl WeatherSource for MockWeatherSource {
        fn get_weather_by_city<'a>(
            &'a self,
            city: &'a str,
        ) -> BoxFuture<'a, Result<Weather, ResolveError>> {
            Box::pin(async move {
                *self.calls.lock().entry(city.to_string()).or_insert(0) += 1;
                if self.failing_cities.iter().any(|c| c == city) {
                    Err(ResolveError("all providers unavailable".to_string()))
                } else {
                    Ok(sample_weather(10.0))
                }
            })
        }
    }

    /// Mailer recording every update and tracking peak concurrency.
    struct MockMailer {
        sent: Mutex<Vec<WeatherUpdate>>,
        failing_recipients: Vec<String>,
        delay: Duration,
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    impl MockMailer {
        fn new() -> Arc<Self> {
            Self::with_delay(Duration::ZERO)
        }

        fn with_delay(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                failing_recipients: Vec::new(),
                delay,
                current: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            })
        }

        fn failing_for(recipients: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                failing_recipients: recipients.iter().map(|r| r.to_string()).collect(),
                delay: Duration::ZERO,
                current: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            })
        }

        fn sent_to(&self) -> Vec<String> {
            self.sent.lock().iter().map(|u| u.to.clone()).collect()
        }
    }

    impl Mailer for MockMailer {
        fn send_weather_update<'a>(
            &'a self,
            update: &'a WeatherUpdate,
        ) -> BoxFuture<'a, Result<(), DispatchError>> {
            Box::pin(async move {
                let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);

                if !self.delay.is_zero() {
                    tokio::time::sleep(self.delay).await;
                }

                self.current.fetch_sub(1, Ordering::SeqCst);

                if self.failing_recipients.iter().any(|r| r == &update.to) {
                    return Err(DispatchError("mailbox unavailable".to_string()));
                }
                self.sent.lock().push(update.clone());
                Ok(())
            })
        }
    }

    fn engine(
        lister: Arc<MockLister>,
        weather: Arc<MockWeatherSource>,
        mailer: Arc<MockMailer>,
        config: BroadcastConfig,
    ) -> BroadcastEngine {
        BroadcastEngine::new(lister, weather, mailer, config)
    }

    #[tokio::test]
    async fn test_empty_subscription_list() {
        let lister = MockLister::new(Vec::new());
        let weather = MockWeatherSource::new(&[]);
        let mailer = MockMailer::new();
        let engine = engine(
            lister,
            weather.clone(),
            mailer.clone(),
            BroadcastConfig::default(),
        );

        let summary = engine
            .broadcast(Frequency::Hourly, &CancellationToken::new())
            .await;

        assert_eq!(summary.subscribers, 0);
        assert_eq!(summary.emails_sent, 0);
        assert_eq!(weather.total_calls(), 0);
        assert!(mailer.sent_to().is_empty());
        assert!(!summary.ended_early);
    }

    #[tokio::test]
    async fn test_mixed_cities_page_size_two() {
        // 5 confirmed subscriptions across city A (3) and city B (2),
        // fetched in pages of 2; A resolves, B fails.
        let lister = MockLister::new(vec![
            subscription(1, "a1@example.com", "Kyiv"),
            subscription(2, "b1@example.com", "Lviv"),
            subscription(3, "a2@example.com", "Kyiv"),
            subscription(4, "b2@example.com", "Lviv"),
            subscription(5, "a3@example.com", "Kyiv"),
        ]);
        let weather = MockWeatherSource::new(&["lviv"]);
        let mailer = MockMailer::new();
        let engine = engine(
            lister,
            weather.clone(),
            mailer.clone(),
            BroadcastConfig {
                page_size: 2,
                pool_size: 10,
            },
        );

        let summary = engine
            .broadcast(Frequency::Hourly, &CancellationToken::new())
            .await;

        // Exactly one resolution per distinct city despite multiple
        // subscribers and multiple pages.
        assert_eq!(weather.calls_for("kyiv"), 1);
        assert_eq!(weather.calls_for("lviv"), 1);

        assert_eq!(summary.emails_sent, 3);
        assert_eq!(summary.skipped_unresolved, 2);
        assert_eq!(summary.cities_resolved, 1);
        assert_eq!(summary.cities_failed, 1);
        assert_eq!(summary.subscribers, 5);

        let mut sent = mailer.sent_to();
        sent.sort();
        assert_eq!(sent, vec!["a1@example.com", "a2@example.com", "a3@example.com"]);
    }

    #[tokio::test]
    async fn test_city_spellings_share_one_resolution() {
        let lister = MockLister::new(vec![
            subscription(1, "a@example.com", "Kyiv"),
            subscription(2, "b@example.com", " kyiv "),
            subscription(3, "c@example.com", "KYIV"),
        ]);
        let weather = MockWeatherSource::new(&[]);
        let mailer = MockMailer::new();
        let engine = engine(
            lister,
            weather.clone(),
            mailer,
            BroadcastConfig::default(),
        );

        engine
            .broadcast(Frequency::Hourly, &CancellationToken::new())
            .await;

        assert_eq!(weather.total_calls(), 1);
        assert_eq!(weather.calls_for("kyiv"), 1);
    }

    #[tokio::test]
    async fn test_pool_bound_is_respected() {
        let subs: Vec<Subscription> = (1..=12)
            .map(|i| subscription(i, &format!("s{}@example.com", i), &format!("city{}", i)))
            .collect();
        let lister = MockLister::new(subs);
        let weather = MockWeatherSource::new(&[]);
        let mailer = MockMailer::with_delay(Duration::from_millis(20));
        let engine = engine(
            lister,
            weather,
            mailer.clone(),
            BroadcastConfig {
                page_size: 100,
                pool_size: 3,
            },
        );

        let summary = engine
            .broadcast(Frequency::Hourly, &CancellationToken::new())
            .await;

        assert_eq!(summary.emails_sent, 12);
        assert!(
            mailer.peak.load(Ordering::SeqCst) <= 3,
            "peak concurrency {} exceeded pool size",
            mailer.peak.load(Ordering::SeqCst)
        );
    }

    #[tokio::test]
    async fn test_broadcast_waits_for_all_dispatches() {
        let subs: Vec<Subscription> = (1..=5)
            .map(|i| subscription(i, &format!("s{}@example.com", i), "Kyiv"))
            .collect();
        let lister = MockLister::new(subs);
        let weather = MockWeatherSource::new(&[]);
        let mailer = MockMailer::with_delay(Duration::from_millis(10));
        let engine = engine(
            lister,
            weather,
            mailer.clone(),
            BroadcastConfig::default(),
        );

        let summary = engine
            .broadcast(Frequency::Hourly, &CancellationToken::new())
            .await;

        // Everything was delivered before broadcast returned, and nothing
        // is still running.
        assert_eq!(summary.emails_sent, 5);
        assert_eq!(mailer.sent_to().len(), 5);
        assert_eq!(engine.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_single_mail_failure_is_isolated() {
        let lister = MockLister::new(vec![
            subscription(1, "ok1@example.com", "Kyiv"),
            subscription(2, "broken@example.com", "Kyiv"),
            subscription(3, "ok2@example.com", "Kyiv"),
        ]);
        let weather = MockWeatherSource::new(&[]);
        let mailer = MockMailer::failing_for(&["broken@example.com"]);
        let engine = engine(
            lister,
            weather,
            mailer.clone(),
            BroadcastConfig::default(),
        );

        let summary = engine
            .broadcast(Frequency::Hourly, &CancellationToken::new())
            .await;

        assert_eq!(summary.emails_sent, 2);
        assert_eq!(summary.send_failures, 1);
        assert!(!summary.ended_early);
    }

    #[tokio::test]
    async fn test_page_fetch_failure_ends_cycle_but_drains() {
        let subs: Vec<Subscription> = (1..=4)
            .map(|i| subscription(i, &format!("s{}@example.com", i), "Kyiv"))
            .collect();
        // First page (2 subs) succeeds, second page fails.
        let lister = MockLister::failing_from_page(subs, 1);
        let weather = MockWeatherSource::new(&[]);
        let mailer = MockMailer::new();
        let engine = engine(
            lister,
            weather,
            mailer.clone(),
            BroadcastConfig {
                page_size: 2,
                pool_size: 10,
            },
        );

        let summary = engine
            .broadcast(Frequency::Hourly, &CancellationToken::new())
            .await;

        assert!(summary.ended_early);
        // Work submitted before the failure still completed.
        assert_eq!(summary.emails_sent, 2);
        assert_eq!(mailer.sent_to().len(), 2);
    }

    #[tokio::test]
    async fn test_cursor_advances_in_page_order() {
        let subs: Vec<Subscription> = (1..=5)
            .map(|i| subscription(i, &format!("s{}@example.com", i), "Kyiv"))
            .collect();
        let lister = MockLister::new(subs);
        let weather = MockWeatherSource::new(&[]);
        let mailer = MockMailer::new();
        let engine = engine(
            lister.clone(),
            weather,
            mailer,
            BroadcastConfig {
                page_size: 2,
                pool_size: 10,
            },
        );

        engine
            .broadcast(Frequency::Hourly, &CancellationToken::new())
            .await;

        // Pages of 2, 2, 1, then the empty page that ends the cycle.
        assert_eq!(*lister.cursors_seen.lock(), vec![0, 2, 4, 5]);
    }

    #[tokio::test]
    async fn test_cancellation_surfaces_as_list_failure() {
        let lister = MockLister::new(vec![subscription(1, "a@example.com", "Kyiv")]);
        let weather = MockWeatherSource::new(&[]);
        let mailer = MockMailer::new();
        let engine = engine(
            lister,
            weather.clone(),
            mailer.clone(),
            BroadcastConfig::default(),
        );

        let cancel = CancellationToken::new();
        cancel.cancel();

        let summary = engine.broadcast(Frequency::Hourly, &cancel).await;

        assert!(summary.ended_early);
        assert_eq!(summary.emails_sent, 0);
        assert_eq!(weather.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_memo_map_is_per_cycle() {
        let lister = MockLister::new(vec![subscription(1, "a@example.com", "Kyiv")]);
        let weather = MockWeatherSource::new(&[]);
        let mailer = MockMailer::new();
        let engine = engine(lister, weather.clone(), mailer, BroadcastConfig::default());

        let cancel = CancellationToken::new();
        engine.broadcast(Frequency::Hourly, &cancel).await;
        engine.broadcast(Frequency::Hourly, &cancel).await;

        // Each cycle resolves anew; cross-cycle reuse belongs to the cache.
        assert_eq!(weather.calls_for("kyiv"), 2);
    }
}
