//! Possible errors thrown by the contract gateway

use alloy::{
    providers::PendingTransactionError,
    transports::{RpcError, TransportErrorKind},
};
use alloy_contract::Error as SolError;

#[derive(Debug, Clone, thiserror::Error)]
/// The error type returned by the contract gateway
pub enum GatewayError {
    #[error("Failed to set up RPC client: {0}")]
    /// Error thrown when the RPC client fails to initialize
    Setup(String),

    #[error("Contract interaction error: {0}")]
    /// Error thrown when a contract call fails
    ContractInteraction(String),

    #[error("RPC error: {0}")]
    /// An error interacting with the lower level rpc client
    Rpc(String),

    #[error("Pending transaction error: {0}")]
    /// Error thrown when a transaction fails to confirm
    PendingTransaction(String),

    #[error("Transaction {0} reverted")]
    /// A transaction was mined but reverted
    Reverted(String),
}

impl GatewayError {
    /// Create a new setup error
    #[allow(clippy::needless_pass_by_value)]
    pub fn setup<T: ToString>(msg: T) -> Self {
        Self::Setup(msg.to_string())
    }

    /// Create a new contract interaction error
    #[allow(clippy::needless_pass_by_value)]
    pub fn contract_interaction<T: ToString>(msg: T) -> Self {
        Self::ContractInteraction(msg.to_string())
    }

    /// Create a new RPC error
    #[allow(clippy::needless_pass_by_value)]
    pub fn rpc<T: ToString>(msg: T) -> Self {
        Self::Rpc(msg.to_string())
    }
}

impl From<SolError> for GatewayError {
    fn from(e: SolError) -> Self {
        Self::ContractInteraction(e.to_string())
    }
}

impl From<PendingTransactionError> for GatewayError {
    fn from(e: PendingTransactionError) -> Self {
        Self::PendingTransaction(e.to_string())
    }
}

impl From<RpcError<TransportErrorKind>> for GatewayError {
    fn from(e: RpcError<TransportErrorKind>) -> Self {
        Self::Rpc(e.to_string())
    }
}
