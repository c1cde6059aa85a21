//! Cache telemetry for observability.
//!
//! This module provides metrics collection and reporting for the weather
//! cache layer. It uses lock-free atomic counters for instrumentation with
//! minimal overhead on the hot resolution path.
//!
//! # Architecture
//!
//! ```text
//! MeteredWeatherCache ─────► CacheMetrics ─────► TelemetrySnapshot ─────► Views
//!                            (atomic counters)   (point-in-time copy)     (CLI, logs)
//! ```

mod metrics;
mod snapshot;

pub use metrics::{CacheMetrics, LatencyHistogram, LATENCY_BUCKET_BOUNDS_MICROS};
pub use snapshot::{LatencySnapshot, TelemetrySnapshot};
