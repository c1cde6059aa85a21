//! Application error types.

use thiserror::Error;

use crate::provider::{EmptyChainError, ProviderError};

/// Errors that can occur during application startup.
#[derive(Debug, Error)]
pub enum AppError {
    /// No usable provider could be built from the configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The fallback chain was constructed empty.
    #[error(transparent)]
    EmptyChain(#[from] EmptyChainError),

    /// The shared HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(ProviderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = AppError::Config("no provider API key configured".to_string());
        assert!(err.to_string().contains("configuration error"));
        assert!(err.to_string().contains("no provider API key"));
    }

    #[test]
    fn test_empty_chain_converts() {
        let err: AppError = EmptyChainError.into();
        assert!(matches!(err, AppError::EmptyChain(_)));
    }
}
