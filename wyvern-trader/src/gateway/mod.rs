//! The trader's view of the chain
//!
//! [`ContractGateway`] covers every read and write the trader makes against
//! the exchange, the proxy registry, token contracts and Multicall3. The
//! alloy-backed [`AlloyGateway`] talks to a node; [`mock::MockGateway`]
//! replays configured answers in tests.

use alloy::rpc::types::TransactionRequest;
use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;

use crate::{
    network::NetworkConfig,
    order::{Order, UnhashedOrder},
};

pub mod abis;
pub mod args;
mod client;
pub mod error;
#[cfg(any(test, feature = "mocks"))]
pub mod mock;

pub use client::AlloyGateway;
pub use error::GatewayError;

/// A result alias for gateway calls
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Typed access to the contracts the trader uses
#[async_trait]
pub trait ContractGateway: Send + Sync {
    /// The network the gateway is connected to
    fn network(&self) -> &NetworkConfig;

    // --- Exchange --- //

    /// The proxy registered for `owner`, or the null address
    async fn proxies(&self, owner: Address) -> GatewayResult<Address>;
    /// The bulk-cancellation nonce of `maker`
    async fn nonces(&self, maker: Address) -> GatewayResult<U256>;
    /// Whether the exchange accepts the order's parameters
    async fn validate_order_parameters(&self, order: &UnhashedOrder) -> GatewayResult<bool>;
    /// Whether the exchange accepts the order and its signature
    async fn validate_order(&self, order: &Order) -> GatewayResult<bool>;
    /// Whether the exchange would match the two orders
    async fn orders_can_match(&self, buy: &Order, sell: &Order) -> GatewayResult<bool>;
    /// Whether the two orders' calldata can be spliced together
    async fn order_calldata_can_match(&self, buy: &Order, sell: &Order) -> GatewayResult<bool>;

    // --- Tokens --- //

    /// The ERC20 allowance `owner` has granted `spender`
    async fn erc20_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> GatewayResult<U256>;
    /// The ERC20 balance of `owner`
    async fn erc20_balance(&self, token: Address, owner: Address) -> GatewayResult<U256>;
    /// Whether `operator` may move all of `owner`'s tokens in an ERC721 or
    /// ERC1155 contract
    async fn is_approved_for_all(
        &self,
        token: Address,
        owner: Address,
        operator: Address,
    ) -> GatewayResult<bool>;
    /// The owner of an ERC721 token
    async fn owner_of(&self, token: Address, token_id: U256) -> GatewayResult<Address>;
    /// The ERC1155 balance of `owner`
    async fn erc1155_balance(
        &self,
        token: Address,
        owner: Address,
        token_id: U256,
    ) -> GatewayResult<U256>;
    /// The native coin balance of `owner`
    async fn native_balance(&self, owner: Address) -> GatewayResult<U256>;

    // --- Transactions --- //

    /// Estimate the gas a transaction uses
    async fn estimate_gas(&self, tx: &TransactionRequest) -> GatewayResult<u64>;
    /// Send a transaction and wait for it to be mined
    ///
    /// A reverted transaction is an error
    async fn send_transaction(&self, tx: TransactionRequest) -> GatewayResult<TxHash>;
}
