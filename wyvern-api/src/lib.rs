//! Wire types for the Wyvern orderbook API
//!
//! These types are shared between the trading client and anything that talks
//! to the off-chain orderbook. All integer-valued fields are serialized as
//! base-10 strings, addresses are lowercased, and byte strings are `0x`
//! prefixed hex.
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
#![deny(unsafe_code)]

pub mod error;
pub mod serialization;
mod types;
pub use types::*;
