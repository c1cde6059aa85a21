//! Lock-free cache metrics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::telemetry::snapshot::{LatencySnapshot, TelemetrySnapshot};

/// Upper bounds of the latency histogram buckets, in microseconds.
///
/// Spans sub-millisecond in-memory hits through multi-second upstream-bound
/// operations. Observations above the last bound land in the overflow bucket.
pub const LATENCY_BUCKET_BOUNDS_MICROS: [u64; 10] = [
    250, 500, 1_000, 2_500, 5_000, 10_000, 50_000, 100_000, 500_000, 1_000_000,
];

/// Fixed-bucket latency histogram with atomic counters.
pub struct LatencyHistogram {
    buckets: [AtomicU64; LATENCY_BUCKET_BOUNDS_MICROS.len()],
    overflow: AtomicU64,
    count: AtomicU64,
    sum_micros: AtomicU64,
}

impl LatencyHistogram {
    pub fn new() -> Self {
        Self {
            buckets: std::array::from_fn(|_| AtomicU64::new(0)),
            overflow: AtomicU64::new(0),
            count: AtomicU64::new(0),
            sum_micros: AtomicU64::new(0),
        }
    }

    /// Records one observation.
    pub fn observe(&self, latency: Duration) {
        let micros = latency.as_micros().min(u64::MAX as u128) as u64;

        match LATENCY_BUCKET_BOUNDS_MICROS
            .iter()
            .position(|&bound| micros <= bound)
        {
            Some(idx) => self.buckets[idx].fetch_add(1, Ordering::Relaxed),
            None => self.overflow.fetch_add(1, Ordering::Relaxed),
        };

        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum_micros.fetch_add(micros, Ordering::Relaxed);
    }

    fn snapshot(&self) -> LatencySnapshot {
        LatencySnapshot {
            buckets: LATENCY_BUCKET_BOUNDS_MICROS
                .iter()
                .zip(self.buckets.iter())
                .map(|(&bound, counter)| (bound, counter.load(Ordering::Relaxed)))
                .collect(),
            overflow: self.overflow.load(Ordering::Relaxed),
            count: self.count.load(Ordering::Relaxed),
            sum_micros: self.sum_micros.load(Ordering::Relaxed),
        }
    }
}

impl Default for LatencyHistogram {
    fn default() -> Self {
        Self::new()
    }
}

/// Metrics for one weather cache instance.
///
/// Every cache operation increments exactly one outcome counter and records
/// its latency (skipped writes excluded — they never touch the backend).
pub struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    errors: AtomicU64,
    skipped: AtomicU64,
    latency: LatencyHistogram,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            latency: LatencyHistogram::new(),
        }
    }

    /// A get found a value.
    pub fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// A get found nothing (and no error occurred).
    pub fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// A get or set failed against the backend.
    pub fn error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// An operation was skipped without touching the backend.
    pub fn skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the latency of one backend-touching operation.
    pub fn observe_latency(&self, latency: Duration) {
        self.latency.observe(latency);
    }

    /// Takes a point-in-time copy for display.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            latency: self.latency.snapshot(),
        }
    }
}

impl Default for CacheMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = CacheMetrics::new();
        metrics.hit();
        metrics.hit();
        metrics.miss();
        metrics.error();
        metrics.skipped();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.hits, 2);
        assert_eq!(snapshot.misses, 1);
        assert_eq!(snapshot.errors, 1);
        assert_eq!(snapshot.skipped, 1);
    }

    #[test]
    fn test_histogram_buckets_observations() {
        let histogram = LatencyHistogram::new();
        histogram.observe(Duration::from_micros(100)); // first bucket (<= 250)
        histogram.observe(Duration::from_micros(900)); // <= 1_000
        histogram.observe(Duration::from_secs(5)); // overflow

        let snapshot = histogram.snapshot();
        assert_eq!(snapshot.count, 3);
        assert_eq!(snapshot.overflow, 1);
        assert_eq!(snapshot.buckets[0], (250, 1));
        assert_eq!(snapshot.buckets[2], (1_000, 1));
    }

    #[test]
    fn test_histogram_mean() {
        let histogram = LatencyHistogram::new();
        histogram.observe(Duration::from_micros(100));
        histogram.observe(Duration::from_micros(300));

        let snapshot = histogram.snapshot();
        assert_eq!(snapshot.mean_micros(), 200.0);
    }

    #[test]
    fn test_empty_histogram_mean_is_zero() {
        let snapshot = LatencyHistogram::new().snapshot();
        assert_eq!(snapshot.mean_micros(), 0.0);
    }
}
