//! Core trait for the TTL key-value cache.
//!
//! The `Cache` trait provides a domain-agnostic key-value interface. Values
//! are raw bytes; domain concepts like city keys and JSON encoding live in
//! the decorator layers above. Expiry is the backend's job: the TTL is fixed
//! at construction and applied when an entry is written, never on read.

use thiserror::Error;

use crate::provider::BoxFuture;

/// Errors that can occur during cache operations.
///
/// None of these are ever fatal to a weather resolution; every caller
/// degrades to a direct provider lookup.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CacheError {
    /// The key normalized to an empty string.
    #[error("invalid cache key")]
    InvalidKey,

    /// The backing store failed.
    #[error("cache backend error: {0}")]
    Backend(String),

    /// Failed to serialize a value for storage.
    #[error("failed to serialize cache entry: {0}")]
    Marshal(String),

    /// A stored value failed to deserialize. Distinct from a miss: a corrupt
    /// entry is an operational signal, not an absence.
    #[error("corrupt cache entry: {0}")]
    Unmarshal(String),
}

/// Generic TTL cache interface over byte-string values.
///
/// The backend is network-reachable and shared across concurrent broadcast
/// runs and the live request path; implementations serialize their own
/// concurrent access. Dyn-compatible via [`BoxFuture`] so decorators can
/// wrap any backend polymorphically.
pub trait Cache: Send + Sync {
    /// Retrieve a value by key.
    ///
    /// `Ok(None)` is a miss and is distinct from `Err(_)`.
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Vec<u8>>, CacheError>>;

    /// Store a value. The backend applies its configured TTL at write time.
    fn set<'a>(&'a self, key: &'a str, value: Vec<u8>) -> BoxFuture<'a, Result<(), CacheError>>;

    /// Release backend resources. Further operations may fail.
    fn close(&self) -> BoxFuture<'_, Result<(), CacheError>>;
}
