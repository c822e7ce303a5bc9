//! The error type returned by the trader

use std::fmt::{self, Display};

use wyvern_api::{OrderSide, SchemaName};

use crate::{
    constants::MAX_ERROR_LENGTH, gateway::error::GatewayError, orderbook::error::OrderbookError,
};

/// A result alias for trader operations
pub type TraderResult<T> = Result<T, TraderError>;

/// Why a transaction submission failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionFailureKind {
    /// The signer refused to sign the transaction
    UserDeclined,
    /// The node or the chain rejected the transaction
    NetworkRejected,
}

impl SubmissionFailureKind {
    /// Classify a provider error message
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("denied") || lower.contains("user rejected") {
            Self::UserDeclined
        } else {
            Self::NetworkRejected
        }
    }
}

impl Display for SubmissionFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserDeclined => f.write_str("user declined to sign"),
            Self::NetworkRejected => f.write_str("rejected by the network"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
/// The error type returned by the trader
pub enum TraderError {
    #[error("Encoding error: {0}")]
    /// A transfer could not be encoded
    Encoding(String),
    #[error("Fee error: {0}")]
    /// The requested fees are out of bounds
    Fee(String),
    #[error("Invalid order parameter: {0}")]
    /// A caller-supplied order parameter is malformed
    OrderParameter(String),
    #[error("Invalid time window: {0}")]
    /// The listing window is out of bounds
    TimeWindow(String),
    #[error("Invalid price: {0}")]
    /// The requested price is malformed
    Price(String),
    #[error("Unsupported asset schema: {0}")]
    /// The asset schema is not registered for the network
    UnsupportedSchema(SchemaName),
    #[error("Signing error: {0}")]
    /// The signer failed or refused to sign
    Signing(String),
    #[error("No signer registered for {0}")]
    /// No signer is registered for an account
    SignerNotFound(String),

    // --- Match validation --- //
    #[error("Order sides do not match: buy order has side {buy}, sell order has side {sell}")]
    /// The orders are not a buy and a sell
    SideMismatch {
        /// The side of the would-be buy order
        buy: OrderSide,
        /// The side of the would-be sell order
        sell: OrderSide,
    },
    #[error("Order fee methods do not match")]
    /// The orders use different fee methods
    FeeMethodMismatch,
    #[error("Order payment tokens do not match: {buy} != {sell}")]
    /// The orders use different payment tokens
    PaymentTokenMismatch {
        /// The buy order's payment token
        buy: String,
        /// The sell order's payment token
        sell: String,
    },
    #[error("Order taker does not match the counter-order's maker: {0}")]
    /// One order is reserved for a different taker
    TakerMismatch(String),
    #[error("Exactly one order must have a fee recipient: {0}")]
    /// Neither or both orders carry a fee recipient
    FeeRecipient(String),
    #[error("Order targets do not match: {0}")]
    /// The orders call different targets or use different call kinds
    TargetMismatch(String),
    #[error("The {0} order has expired or is not yet listed")]
    /// One order is outside its listing window
    ExpiredOrder(OrderSide),
    #[error("Orders cannot be matched on-chain; check that the system clock is in sync")]
    /// The local replica accepted the match but the contract did not
    ClockSkew,
    #[error("Order calldata cannot be matched")]
    /// The contract rejected the combined calldata
    CalldataMismatch,
    #[error("Order failed match validation: {0}")]
    /// Match validation kept failing after retries
    MatchValidationFailed(String),

    // --- Settlement --- //
    #[error("Failed to estimate gas: {message}")]
    /// The provider could not estimate the match transaction
    GasEstimationFailed {
        /// The truncated provider message
        message: String,
        /// The underlying error
        #[source]
        source: GatewayError,
    },
    #[error("Transaction submission failed ({kind}): {message}")]
    /// The match transaction could not be submitted or reverted
    SubmissionFailed {
        /// Why the submission failed
        kind: SubmissionFailureKind,
        /// The truncated provider message
        message: String,
        /// The underlying error
        #[source]
        source: GatewayError,
    },
    #[error("Failed to validate order parameters: {0}")]
    /// The exchange rejected the order's parameters
    OrderParameterInvalid(String),

    // --- Collaborators --- //
    #[error("Gateway error: {0}")]
    /// An on-chain call failed
    Gateway(#[from] GatewayError),
    #[error("Orderbook error: {0}")]
    /// An orderbook request failed
    Orderbook(#[from] OrderbookError),
    #[error("Configuration error: {0}")]
    /// The client is misconfigured
    Config(String),
}

impl TraderError {
    /// Create a new encoding error
    #[allow(clippy::needless_pass_by_value)]
    pub fn encoding<T: ToString>(msg: T) -> Self {
        Self::Encoding(msg.to_string())
    }

    /// Create a new fee error
    #[allow(clippy::needless_pass_by_value)]
    pub fn fee<T: ToString>(msg: T) -> Self {
        Self::Fee(msg.to_string())
    }

    /// Create a new order parameter error
    #[allow(clippy::needless_pass_by_value)]
    pub fn order_parameter<T: ToString>(msg: T) -> Self {
        Self::OrderParameter(msg.to_string())
    }

    /// Create a new time window error
    #[allow(clippy::needless_pass_by_value)]
    pub fn time_window<T: ToString>(msg: T) -> Self {
        Self::TimeWindow(msg.to_string())
    }

    /// Create a new price error
    #[allow(clippy::needless_pass_by_value)]
    pub fn price<T: ToString>(msg: T) -> Self {
        Self::Price(msg.to_string())
    }

    /// Create a new signing error
    #[allow(clippy::needless_pass_by_value)]
    pub fn signing<T: ToString>(msg: T) -> Self {
        Self::Signing(msg.to_string())
    }

    /// Create a new configuration error
    #[allow(clippy::needless_pass_by_value)]
    pub fn config<T: ToString>(msg: T) -> Self {
        Self::Config(msg.to_string())
    }

    /// Wrap a failed gas estimate
    pub fn gas_estimation(source: GatewayError) -> Self {
        let message = truncate_message(&source.to_string());
        Self::GasEstimationFailed { message, source }
    }

    /// Wrap a failed submission, classifying the cause
    pub fn submission(source: GatewayError) -> Self {
        let full = source.to_string();
        let kind = SubmissionFailureKind::classify(&full);
        Self::SubmissionFailed { kind, message: truncate_message(&full), source }
    }

    /// Whether the error came from a chain read rather than a local check
    ///
    /// Only these are worth retrying during match validation
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ClockSkew | Self::CalldataMismatch | Self::Gateway(_))
    }
}

/// Truncate a provider message to the length surfaced to callers
pub(crate) fn truncate_message(message: &str) -> String {
    match message.char_indices().nth(MAX_ERROR_LENGTH) {
        Some((idx, _)) => format!("{}...", &message[..idx]),
        None => message.to_string(),
    }
}
