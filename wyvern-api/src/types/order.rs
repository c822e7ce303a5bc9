//! The JSON representation of a Wyvern order

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::{
    serialization::{
        address_string_serialization, bytes_string_serialization,
        option_u256_string_serialization, u256_string_serialization,
    },
    FeeMethod, HowToCall, OrderMetadata, OrderSide, SaleKind,
};

/// An order as exchanged with the orderbook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderJson {
    // --- Routing --- //
    /// The exchange contract the order is valid on
    #[serde(with = "address_string_serialization")]
    pub exchange: Address,
    /// The account that created the order
    #[serde(with = "address_string_serialization")]
    pub maker: Address,
    /// The only account allowed to take the order, or the null address
    #[serde(with = "address_string_serialization")]
    pub taker: Address,

    // --- Fees --- //
    /// Relayer fee charged to the maker, in basis points
    #[serde(with = "u256_string_serialization")]
    pub maker_relayer_fee: U256,
    /// Relayer fee charged to the taker, in basis points
    #[serde(with = "u256_string_serialization")]
    pub taker_relayer_fee: U256,
    /// Protocol fee charged to the maker, in basis points
    #[serde(with = "u256_string_serialization")]
    pub maker_protocol_fee: U256,
    /// Protocol fee charged to the taker, in basis points
    #[serde(with = "u256_string_serialization")]
    pub taker_protocol_fee: U256,
    /// Share of the maker fee paid to a referrer, in basis points
    #[serde(with = "u256_string_serialization")]
    pub maker_referrer_fee: U256,
    /// The recipient of relayer fees
    #[serde(with = "address_string_serialization")]
    pub fee_recipient: Address,
    /// How fees are charged
    pub fee_method: FeeMethod,

    // --- Matching --- //
    /// The side of the order
    pub side: OrderSide,
    /// How the price evolves
    pub sale_kind: SaleKind,
    /// The contract invoked on settlement
    #[serde(with = "address_string_serialization")]
    pub target: Address,
    /// How the target is invoked
    pub how_to_call: HowToCall,
    /// The call made on the target
    #[serde(with = "bytes_string_serialization")]
    pub calldata: Bytes,
    /// The mask of calldata bytes the counter-order may replace
    #[serde(with = "bytes_string_serialization")]
    pub replacement_pattern: Bytes,
    /// An optional static-call validation target
    #[serde(with = "address_string_serialization")]
    pub static_target: Address,
    /// Extra data for the static-call validation
    #[serde(with = "bytes_string_serialization")]
    pub static_extradata: Bytes,

    // --- Economics --- //
    /// The payment token, or the null address for the native coin
    #[serde(with = "address_string_serialization")]
    pub payment_token: Address,
    /// The starting price in the payment token's base unit
    #[serde(with = "u256_string_serialization")]
    pub base_price: U256,
    /// The price delta over the auction window
    #[serde(with = "u256_string_serialization")]
    pub extra: U256,
    /// The number of units traded
    #[serde(with = "u256_string_serialization")]
    pub quantity: U256,
    /// When the order becomes valid, in unix seconds
    #[serde(with = "u256_string_serialization")]
    pub listing_time: U256,
    /// When the order expires, in unix seconds, or zero for never
    #[serde(with = "u256_string_serialization")]
    pub expiration_time: U256,
    /// A random nonce making the order hash unique
    #[serde(with = "u256_string_serialization")]
    pub salt: U256,

    // --- Metadata --- //
    /// What the order trades
    pub metadata: OrderMetadata,
    /// When the orderbook received the order, unset before posting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(with = "option_u256_string_serialization")]
    pub created_time: Option<U256>,
    /// The maker's bulk-cancellation nonce at signing time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(with = "option_u256_string_serialization")]
    pub nonce: Option<U256>,
    /// The order hash, if computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<B256>,
    /// Whether the order was cancelled or already filled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_or_finalized: Option<bool>,
    /// Whether the orderbook flagged the order as invalid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marked_invalid: Option<bool>,

    // --- Signature --- //
    /// The recovery id of the signature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<u8>,
    /// The `r` component of the signature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<B256>,
    /// The `s` component of the signature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<B256>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Asset, SchemaName};

    /// A representative order as the orderbook would return it
    const ORDER_JSON: &str = r#"{
        "exchange": "0x7f268357a8c2552623316e2562d90e642bb538e5",
        "maker": "0x00000000000000000000000000000000000000aa",
        "taker": "0x0000000000000000000000000000000000000000",
        "makerRelayerFee": "250",
        "takerRelayerFee": "0",
        "makerProtocolFee": "0",
        "takerProtocolFee": "0",
        "makerReferrerFee": "0",
        "feeRecipient": "0x5b3256965e7c3cf26e11fcaf296dfc8807c01073",
        "feeMethod": 1,
        "side": 1,
        "saleKind": 0,
        "target": "0x4bf010f1b9beda5450a8dd702ed602a104ff65ee",
        "howToCall": 0,
        "calldata": "0x23b872dd",
        "replacementPattern": "0x00000000",
        "staticTarget": "0x0000000000000000000000000000000000000000",
        "staticExtradata": "0x",
        "paymentToken": "0x0000000000000000000000000000000000000000",
        "basePrice": "100000000000000000",
        "extra": "0",
        "quantity": "1",
        "listingTime": 1650000000,
        "expirationTime": "1650086400",
        "salt": "115792089237316195423570985008687907853269984665640564039457584007913129639935",
        "metadata": {
            "asset": {
                "tokenId": "5465",
                "tokenAddress": "0x4bf010f1b9beda5450a8dd702ed602a104ff65ee"
            },
            "schema": "ERC721"
        },
        "v": 27
    }"#;

    #[test]
    fn test_order_json_parse() {
        let order: OrderJson = serde_json::from_str(ORDER_JSON).unwrap();
        assert_eq!(order.side, OrderSide::Sell);
        assert_eq!(order.base_price, U256::from(100_000_000_000_000_000u64));
        assert_eq!(order.listing_time, U256::from(1_650_000_000u64));
        assert_eq!(order.salt, U256::MAX);
        assert_eq!(order.v, Some(27));
        assert_eq!(
            order.metadata,
            OrderMetadata::single(
                Asset {
                    token_id: U256::from(5465u64),
                    token_address: order.target,
                    schema_name: None,
                    name: None,
                },
                SchemaName::Erc721
            )
        );
    }

    #[test]
    fn test_order_json_roundtrip() {
        let order: OrderJson = serde_json::from_str(ORDER_JSON).unwrap();
        let serialized = serde_json::to_value(&order).unwrap();
        assert_eq!(serialized["listingTime"], "1650000000");
        assert_eq!(serialized["salt"], U256::MAX.to_string());

        let reparsed: OrderJson = serde_json::from_value(serialized).unwrap();
        assert_eq!(order, reparsed);
    }
}
