//! CLI error type.

use std::fmt;

use stormcast::app::AppError;
use stormcast::provider::ProviderError;

/// Errors surfaced to the terminal.
#[derive(Debug)]
pub enum CliError {
    /// Invalid or incomplete command-line configuration.
    Config(String),

    /// Application startup failed.
    App(AppError),

    /// A weather lookup failed.
    Weather(ProviderError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "configuration error: {}", msg),
            CliError::App(e) => write!(f, "failed to start: {}", e),
            CliError::Weather(e) => write!(f, "weather lookup failed: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(_) => None,
            CliError::App(e) => Some(e),
            CliError::Weather(e) => Some(e),
        }
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::App(e)
    }
}

impl From<ProviderError> for CliError {
    fn from(e: ProviderError) -> Self {
        CliError::Weather(e)
    }
}
