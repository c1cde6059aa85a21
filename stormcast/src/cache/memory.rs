//! In-memory TTL cache backend using moka.
//!
//! Stands behind the same [`Cache`] seam a network key-value store would,
//! which keeps every layer above it backend-agnostic.
//!
//! # Why moka?
//!
//! - Lock-free reads (common case)
//! - Concurrent writes without blocking
//! - Built-in time-to-live applied on insert
//! - Memory-bounded with automatic LRU eviction

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::cache::traits::{Cache, CacheError};
use crate::provider::BoxFuture;

/// In-memory TTL cache provider.
pub struct MemoryCache {
    cache: MokaCache<String, Vec<u8>>,
    closed: AtomicBool,
}

impl MemoryCache {
    /// Creates a new memory cache.
    ///
    /// # Arguments
    ///
    /// * `max_size_bytes` - Maximum total size of stored values
    /// * `ttl` - Time-to-live applied to every entry at write time
    pub fn new(max_size_bytes: u64, ttl: Duration) -> Self {
        let cache = MokaCache::builder()
            // Weight each entry by its data size
            .weigher(|_key: &String, value: &Vec<u8>| -> u32 {
                value.len().min(u32::MAX as usize) as u32
            })
            .max_capacity(max_size_bytes)
            .time_to_live(ttl)
            .build();

        Self {
            cache,
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> Result<(), CacheError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(CacheError::Backend("cache is closed".to_string()));
        }
        Ok(())
    }
}

impl Cache for MemoryCache {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Vec<u8>>, CacheError>> {
        Box::pin(async move {
            self.ensure_open()?;
            Ok(self.cache.get(key).await)
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: Vec<u8>) -> BoxFuture<'a, Result<(), CacheError>> {
        Box::pin(async move {
            self.ensure_open()?;
            self.cache.insert(key.to_string(), value).await;
            Ok(())
        })
    }

    fn close(&self) -> BoxFuture<'_, Result<(), CacheError>> {
        Box::pin(async move {
            self.closed.store(true, Ordering::Release);
            self.cache.invalidate_all();
            self.cache.run_pending_tasks().await;
            Ok(())
        })
    }
}
