//! Append-only audit log of raw upstream responses.
//!
//! Every upstream call records its raw response body here *before* any
//! decoding or error mapping, so operators can reconstruct what a provider
//! actually returned even when our decoder rejects it.
//!
//! Entries are JSON lines `{"provider": ..., "body": ..., "ts": ...}`
//! written through a non-blocking rolling file appender.

use std::io::Write;
use std::path::Path;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::warn;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};

/// Sink for raw upstream response bodies.
pub trait ResponseAudit: Send + Sync {
    /// Appends one entry for an upstream call, regardless of its outcome.
    fn record(&self, provider: &str, body: &[u8]);
}

/// File-backed audit log using a daily-rolling, non-blocking appender.
pub struct FileResponseAudit {
    writer: Mutex<NonBlocking>,
    // Keeps the background writer thread alive for the life of the log.
    _guard: WorkerGuard,
}

impl FileResponseAudit {
    /// Creates an audit log writing to `{dir}/provider-audit.{date}` files.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let appender = tracing_appender::rolling::daily(dir, "provider-audit");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        Self {
            writer: Mutex::new(writer),
            _guard: guard,
        }
    }
}

impl ResponseAudit for FileResponseAudit {
    fn record(&self, provider: &str, body: &[u8]) {
        let entry = serde_json::json!({
            "provider": provider,
            "body": String::from_utf8_lossy(body),
            "ts": Utc::now().to_rfc3339(),
        });

        let mut writer = self.writer.lock();
        if let Err(e) = writeln!(writer, "{}", entry) {
            // The audit log must never fail a weather resolution.
            warn!(error = %e, provider, "failed to append provider audit entry");
        }
    }
}

/// Audit sink that discards everything. Used in tests and when auditing
/// is disabled by configuration.
pub struct NullResponseAudit;

impl ResponseAudit for NullResponseAudit {
    fn record(&self, _provider: &str, _body: &[u8]) {}
}
