//! CLI command implementations.

pub mod broadcast;
pub mod common;
pub mod run;
pub mod weather;
