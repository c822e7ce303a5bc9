//! Error types for the orderbook wire format

use thiserror::Error;

/// An error converting between wire values and their typed counterparts
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiTypeError {
    /// An enum discriminant outside of the known range
    #[error("invalid {kind} value: {value}")]
    InvalidDiscriminant {
        /// The name of the enum being parsed
        kind: &'static str,
        /// The offending value
        value: u8,
    },
    /// Order metadata that does not carry exactly one of `asset` or `bundle`
    #[error("invalid order metadata: {0}")]
    InvalidMetadata(String),
    /// A value that could not be parsed
    #[error("parse error: {0}")]
    Parse(String),
}

impl ApiTypeError {
    /// Create a new metadata error
    #[allow(clippy::needless_pass_by_value)]
    pub fn metadata<T: ToString>(msg: T) -> Self {
        Self::InvalidMetadata(msg.to_string())
    }

    /// Create a new parse error
    #[allow(clippy::needless_pass_by_value)]
    pub fn parse<T: ToString>(msg: T) -> Self {
        Self::Parse(msg.to_string())
    }
}
