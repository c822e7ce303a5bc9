//! A trading client for the Wyvern exchange protocol
//!
//! The crate builds orders for ERC721, ERC1155 and ERC20 assets, signs them
//! with EIP-712, replays the exchange's match predicate locally, and settles
//! matches on-chain through a [`gateway::ContractGateway`].
//!
//! The pieces compose leaf-first:
//! - [`encoding`] produces transfer calldata and replacement patterns
//! - [`pricing`] computes base prices, auction decay and fees
//! - [`builder`] assembles unsigned orders and counter-orders
//! - [`signing`] produces order signatures
//! - [`validation`] checks that two orders can be matched
//! - [`settlement`] drives approvals, validation and submission

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
#![deny(unsafe_code)]
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::needless_pass_by_ref_mut)]
#![deny(clippy::uninlined_format_args)]

pub mod builder;
pub mod constants;
pub mod encoding;
pub mod error;
pub mod gateway;
pub mod network;
pub mod order;
pub mod orderbook;
pub mod pricing;
pub mod settlement;
pub mod signing;
pub mod validation;

pub use error::{TraderError, TraderResult};
pub use order::{EcSignature, Order, UnhashedOrder};

/// The current unix time in seconds
pub(crate) fn now_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default()
}
