//! Point-in-time telemetry snapshots.

use std::fmt;

/// Copy of the latency histogram state at one instant.
#[derive(Debug, Clone, Default)]
pub struct LatencySnapshot {
    /// (upper bound in micros, observation count) per bucket.
    pub buckets: Vec<(u64, u64)>,
    /// Observations above the last bucket bound.
    pub overflow: u64,
    /// Total observations.
    pub count: u64,
    /// Sum of all observed latencies in micros.
    pub sum_micros: u64,
}

impl LatencySnapshot {
    /// Mean latency in microseconds, 0 when empty.
    pub fn mean_micros(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum_micros as f64 / self.count as f64
    }
}

/// Copy of the cache metrics at one instant, for display by the CLI or
/// structured log events.
#[derive(Debug, Clone, Default)]
pub struct TelemetrySnapshot {
    pub hits: u64,
    pub misses: u64,
    pub errors: u64,
    pub skipped: u64,
    pub latency: LatencySnapshot,
}

impl TelemetrySnapshot {
    /// Hit ratio over hits + misses, 0 when no lookups happened.
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            return 0.0;
        }
        self.hits as f64 / lookups as f64
    }
}

impl fmt::Display for TelemetrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cache: {} hits, {} misses ({:.0}% hit ratio), {} errors, {} skipped, mean latency {:.0}us",
            self.hits,
            self.misses,
            self.hit_ratio() * 100.0,
            self.errors,
            self.skipped,
            self.latency.mean_micros(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_ratio() {
        let snapshot = TelemetrySnapshot {
            hits: 3,
            misses: 1,
            ..Default::default()
        };
        assert_eq!(snapshot.hit_ratio(), 0.75);
    }

    #[test]
    fn test_hit_ratio_no_lookups() {
        assert_eq!(TelemetrySnapshot::default().hit_ratio(), 0.0);
    }

    #[test]
    fn test_display_contains_counts() {
        let snapshot = TelemetrySnapshot {
            hits: 5,
            misses: 2,
            errors: 1,
            skipped: 3,
            ..Default::default()
        };
        let display = snapshot.to_string();
        assert!(display.contains("5 hits"));
        assert!(display.contains("2 misses"));
        assert!(display.contains("3 skipped"));
    }
}
