//! Error types for the MyIP service
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for MyIP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the MyIP service
#[derive(Error, Debug)]
pub enum Error {
    /// IP discovery errors (echo service, header parsing)
    #[error("IP discovery error: {0}")]
    IpDiscovery(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upstream call exceeded its time budget
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an IP discovery error
    pub fn ip_discovery(msg: impl Into<String>) -> Self {
        Self::IpDiscovery(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error was caused by the caller's input rather than the service
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
