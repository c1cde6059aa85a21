//! Fixed-schedule broadcast triggers.
//!
//! One background task per frequency, ticking at that frequency's period
//! and running a single broadcast cycle per tick. Ticks missed while a slow
//! cycle is still running are skipped, not queued — the next cycle starts
//! from fresh data anyway.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::broadcast::{BroadcastEngine, Frequency};

/// Spawns the periodic trigger loop for one frequency.
///
/// The first cycle runs one full period after startup. Cancelling the token
/// stops the loop; an in-flight cycle observes the same token through its
/// outbound calls and drains.
pub fn spawn_broadcast_schedule(
    engine: Arc<BroadcastEngine>,
    frequency: Frequency,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    spawn_with_period(engine, frequency, frequency.period(), cancel)
}

/// Like [`spawn_broadcast_schedule`] with an explicit period. Split out so
/// tests can tick fast.
pub fn spawn_with_period(
    engine: Arc<BroadcastEngine>,
    frequency: Frequency,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(%frequency, period_secs = period.as_secs(), "broadcast schedule started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(%frequency, "broadcast schedule stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let summary = engine.broadcast(frequency, &cancel).await;
                    info!(%frequency, %summary, "scheduled broadcast finished");
                }
            }
        }
    })
}
