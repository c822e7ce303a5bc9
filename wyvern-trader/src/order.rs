//! The typed order model
//!
//! [`UnhashedOrder`] holds every field fixed at construction time; an
//! [`Order`] adds the signature and the fields assigned by the chain or the
//! orderbook. Both convert losslessly to and from [`OrderJson`].

use std::ops::Deref;

use alloy_primitives::{Address, Bytes, Signature, B256, U256};
use wyvern_api::{FeeMethod, HowToCall, OrderJson, OrderMetadata, OrderSide, SaleKind};

/// An order before it is signed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnhashedOrder {
    /// The exchange contract the order is valid on
    pub exchange: Address,
    /// The account that created the order
    pub maker: Address,
    /// The only account allowed to take the order, or the null address
    pub taker: Address,
    /// Relayer fee charged to the maker, in basis points
    pub maker_relayer_fee: U256,
    /// Relayer fee charged to the taker, in basis points
    pub taker_relayer_fee: U256,
    /// Protocol fee charged to the maker, in basis points
    pub maker_protocol_fee: U256,
    /// Protocol fee charged to the taker, in basis points
    pub taker_protocol_fee: U256,
    /// Share of the maker fee paid to a referrer, in basis points
    pub maker_referrer_fee: U256,
    /// The recipient of relayer fees, or the null address
    pub fee_recipient: Address,
    /// How fees are charged
    pub fee_method: FeeMethod,
    /// The side of the order
    pub side: OrderSide,
    /// How the price evolves
    pub sale_kind: SaleKind,
    /// The contract invoked on settlement
    pub target: Address,
    /// How the target is invoked
    pub how_to_call: HowToCall,
    /// The call made on the target
    pub calldata: Bytes,
    /// The mask of calldata bytes the counter-order may replace
    pub replacement_pattern: Bytes,
    /// An optional static-call validation target
    pub static_target: Address,
    /// Extra data for the static-call validation
    pub static_extradata: Bytes,
    /// The payment token, or the null address for the native coin
    pub payment_token: Address,
    /// The starting price in the payment token's base unit
    pub base_price: U256,
    /// The price delta over the auction window, in the same unit
    pub extra: U256,
    /// The number of units traded
    pub quantity: U256,
    /// When the order becomes valid, in unix seconds
    pub listing_time: U256,
    /// When the order expires, in unix seconds, or zero for never
    pub expiration_time: U256,
    /// A random nonce making the order hash unique
    pub salt: U256,
    /// What the order trades
    pub metadata: OrderMetadata,
}

impl UnhashedOrder {
    /// Whether the order is paid in the native coin
    pub fn pays_native(&self) -> bool {
        self.payment_token == Address::ZERO
    }
}

/// An ECDSA signature in the `v, r, s` form the exchange consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcSignature {
    /// The recovery id, 27 or 28
    pub v: u8,
    /// The `r` component
    pub r: B256,
    /// The `s` component
    pub s: B256,
}

impl From<Signature> for EcSignature {
    fn from(sig: Signature) -> Self {
        Self {
            v: 27 + sig.v() as u8,
            r: B256::from(sig.r()),
            s: B256::from(sig.s()),
        }
    }
}

/// An order with its signature and chain-assigned fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// The signed fields
    pub order: UnhashedOrder,
    /// The maker's signature, absent on synthesised counter-orders
    pub signature: Option<EcSignature>,
    /// The EIP-712 hash of the order
    pub hash: Option<B256>,
    /// The maker's bulk-cancellation nonce at signing time
    pub nonce: Option<U256>,
    /// When the orderbook received the order
    pub created_time: Option<U256>,
    /// Whether the order was cancelled or already filled
    pub cancelled_or_finalized: Option<bool>,
    /// Whether the orderbook flagged the order as invalid
    pub marked_invalid: Option<bool>,
}

impl Order {
    /// Wrap an order that has not been signed
    pub fn unsigned(order: UnhashedOrder) -> Self {
        Self {
            order,
            signature: None,
            hash: None,
            nonce: None,
            created_time: None,
            cancelled_or_finalized: None,
            marked_invalid: None,
        }
    }

    /// The signature, or an all-zero signature for an unsigned order
    ///
    /// The exchange skips signature checks for the side sent by the caller,
    /// so the synthesised side is submitted with zeros
    pub fn signature_or_default(&self) -> EcSignature {
        self.signature.unwrap_or(EcSignature { v: 0, r: B256::ZERO, s: B256::ZERO })
    }
}

impl Deref for Order {
    type Target = UnhashedOrder;

    fn deref(&self) -> &Self::Target {
        &self.order
    }
}

impl From<&Order> for OrderJson {
    fn from(order: &Order) -> Self {
        let o = &order.order;
        OrderJson {
            exchange: o.exchange,
            maker: o.maker,
            taker: o.taker,
            maker_relayer_fee: o.maker_relayer_fee,
            taker_relayer_fee: o.taker_relayer_fee,
            maker_protocol_fee: o.maker_protocol_fee,
            taker_protocol_fee: o.taker_protocol_fee,
            maker_referrer_fee: o.maker_referrer_fee,
            fee_recipient: o.fee_recipient,
            fee_method: o.fee_method,
            side: o.side,
            sale_kind: o.sale_kind,
            target: o.target,
            how_to_call: o.how_to_call,
            calldata: o.calldata.clone(),
            replacement_pattern: o.replacement_pattern.clone(),
            static_target: o.static_target,
            static_extradata: o.static_extradata.clone(),
            payment_token: o.payment_token,
            base_price: o.base_price,
            extra: o.extra,
            quantity: o.quantity,
            listing_time: o.listing_time,
            expiration_time: o.expiration_time,
            salt: o.salt,
            metadata: o.metadata.clone(),
            created_time: order.created_time,
            nonce: order.nonce,
            hash: order.hash,
            cancelled_or_finalized: order.cancelled_or_finalized,
            marked_invalid: order.marked_invalid,
            v: order.signature.map(|sig| sig.v),
            r: order.signature.map(|sig| sig.r),
            s: order.signature.map(|sig| sig.s),
        }
    }
}

impl From<OrderJson> for Order {
    fn from(json: OrderJson) -> Self {
        let signature = match (json.v, json.r, json.s) {
            (Some(v), Some(r), Some(s)) => Some(EcSignature { v, r, s }),
            _ => None,
        };

        let order = UnhashedOrder {
            exchange: json.exchange,
            maker: json.maker,
            taker: json.taker,
            maker_relayer_fee: json.maker_relayer_fee,
            taker_relayer_fee: json.taker_relayer_fee,
            maker_protocol_fee: json.maker_protocol_fee,
            taker_protocol_fee: json.taker_protocol_fee,
            maker_referrer_fee: json.maker_referrer_fee,
            fee_recipient: json.fee_recipient,
            fee_method: json.fee_method,
            side: json.side,
            sale_kind: json.sale_kind,
            target: json.target,
            how_to_call: json.how_to_call,
            calldata: json.calldata,
            replacement_pattern: json.replacement_pattern,
            static_target: json.static_target,
            static_extradata: json.static_extradata,
            payment_token: json.payment_token,
            base_price: json.base_price,
            extra: json.extra,
            quantity: json.quantity,
            listing_time: json.listing_time,
            expiration_time: json.expiration_time,
            salt: json.salt,
            metadata: json.metadata,
        };

        Self {
            order,
            signature,
            hash: json.hash,
            nonce: json.nonce,
            created_time: json.created_time,
            cancelled_or_finalized: json.cancelled_or_finalized,
            marked_invalid: json.marked_invalid,
        }
    }
}


#[cfg(test)]
mod tests {
    use alloy_primitives::b256;

    use super::{test_helpers::sell_order, *};

    #[test]
    fn test_order_json_roundtrip() {
        let order = Order {
            order: sell_order(1_650_000_000),
            signature: Some(EcSignature {
                v: 28,
                r: b256!("1111111111111111111111111111111111111111111111111111111111111111"),
                s: b256!("2222222222222222222222222222222222222222222222222222222222222222"),
            }),
            hash: None,
            nonce: Some(U256::from(3u64)),
            created_time: None,
            cancelled_or_finalized: Some(false),
            marked_invalid: None,
        };

        let json = serde_json::to_value(OrderJson::from(&order)).unwrap();
        assert_eq!(json["basePrice"], "100000000000000000");
        assert_eq!(json["maker"], "0x00000000000000000000000000000000000000aa");
        assert_eq!(json["exchange"], "0x7f268357a8c2552623316e2562d90e642bb538e5");

        let parsed: OrderJson = serde_json::from_value(json).unwrap();
        assert_eq!(Order::from(parsed), order);
    }

    #[test]
    fn test_partial_signature_is_dropped() {
        let mut json = OrderJson::from(&Order::unsigned(sell_order(1_650_000_000)));
        json.v = Some(27);
        assert_eq!(Order::from(json).signature, None);
    }
}
