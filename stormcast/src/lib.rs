//! Stormcast - weather resolution and broadcast engine
//!
//! This library provides the core pipeline behind a weather-alert
//! subscription platform:
//!
//! - Upstream provider adapters behind a priority-ordered fallback chain
//! - A TTL weather cache with a metrics decorator and cache-aside resolver
//! - A broadcast engine that pages through subscribers and fans out email
//!   dispatch with bounded concurrency
//! - Fixed-interval schedules driving hourly and daily broadcast cycles
//!
//! The [`app`] module wires everything together; see [`app::StormcastApp`].

pub mod app;
pub mod broadcast;
pub mod cache;
pub mod provider;
pub mod remote;
pub mod resolver;
pub mod scheduler;
pub mod telemetry;
pub mod weather;

pub use app::{AppConfig, StormcastApp};
pub use weather::Weather;
