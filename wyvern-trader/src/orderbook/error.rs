//! Error types for the orderbook client

use thiserror::Error;

/// Error type for orderbook operations
#[derive(Debug, Error, Clone)]
pub enum OrderbookError {
    /// Setup error
    #[error("Setup error: {0}")]
    Setup(String),

    /// Parsing error
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(String),

    /// The orderbook returned no order for a lookup
    #[error("Order not found: {0}")]
    NotFound(String),
}

impl OrderbookError {
    /// Create a new setup error
    #[allow(clippy::needless_pass_by_value)]
    pub fn setup<T: ToString>(msg: T) -> Self {
        Self::Setup(msg.to_string())
    }

    /// Create a new parsing error
    #[allow(clippy::needless_pass_by_value)]
    pub fn parsing<T: ToString>(msg: T) -> Self {
        Self::Parsing(msg.to_string())
    }

    /// Create a new HTTP error
    #[allow(clippy::needless_pass_by_value)]
    pub fn http<T: ToString>(msg: T) -> Self {
        Self::Http(msg.to_string())
    }
}
