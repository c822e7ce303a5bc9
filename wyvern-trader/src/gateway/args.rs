//! Flattening of orders into the exchange's call arguments
//!
//! The exchange takes orders as parallel fixed-size arrays of addresses,
//! integers and enum discriminants rather than as structs.

use alloy_primitives::{Address, B256, U256};

use super::abis::IWyvernExchange::{
    atomicMatch_Call, orderCalldataCanMatchCall, ordersCanMatch_Call, validateOrderParameters_Call,
    validateOrder_Call,
};
use crate::order::{Order, UnhashedOrder};

/// The address arguments of one order
fn order_addrs(order: &UnhashedOrder) -> [Address; 7] {
    [
        order.exchange,
        order.maker,
        order.taker,
        order.fee_recipient,
        order.target,
        order.static_target,
        order.payment_token,
    ]
}

/// The integer arguments of one order
fn order_uints(order: &UnhashedOrder) -> [U256; 9] {
    [
        order.maker_relayer_fee,
        order.taker_relayer_fee,
        order.maker_protocol_fee,
        order.taker_protocol_fee,
        order.base_price,
        order.extra,
        order.listing_time,
        order.expiration_time,
        order.salt,
    ]
}

/// The enum arguments of one order
fn order_enums(order: &UnhashedOrder) -> [u8; 4] {
    [
        u8::from(order.fee_method),
        u8::from(order.side),
        u8::from(order.sale_kind),
        u8::from(order.how_to_call),
    ]
}

/// Concatenate two fixed-size arrays
fn concat<T: Copy + Default, const A: usize, const B: usize, const C: usize>(
    a: [T; A],
    b: [T; B],
) -> [T; C] {
    debug_assert_eq!(A + B, C);
    let mut out = [T::default(); C];
    out[..A].copy_from_slice(&a);
    out[A..].copy_from_slice(&b);
    out
}

/// The arguments of `validateOrderParameters_`
pub fn validate_order_parameters_call(order: &UnhashedOrder) -> validateOrderParameters_Call {
    let [fee_method, side, sale_kind, how_to_call] = order_enums(order);
    validateOrderParameters_Call {
        addrs: order_addrs(order),
        uints: order_uints(order),
        feeMethod: fee_method,
        side,
        saleKind: sale_kind,
        howToCall: how_to_call,
        orderCalldata: order.calldata.clone(),
        replacementPattern: order.replacement_pattern.clone(),
        staticExtradata: order.static_extradata.clone(),
    }
}

/// The arguments of `validateOrder_`
pub fn validate_order_call(order: &Order) -> validateOrder_Call {
    let [fee_method, side, sale_kind, how_to_call] = order_enums(order);
    let sig = order.signature_or_default();
    validateOrder_Call {
        addrs: order_addrs(order),
        uints: order_uints(order),
        feeMethod: fee_method,
        side,
        saleKind: sale_kind,
        howToCall: how_to_call,
        orderCalldata: order.calldata.clone(),
        replacementPattern: order.replacement_pattern.clone(),
        staticExtradata: order.static_extradata.clone(),
        v: sig.v,
        r: sig.r,
        s: sig.s,
    }
}

/// The arguments of `ordersCanMatch_`
pub fn orders_can_match_call(buy: &UnhashedOrder, sell: &UnhashedOrder) -> ordersCanMatch_Call {
    ordersCanMatch_Call {
        addrs: concat(order_addrs(buy), order_addrs(sell)),
        uints: concat(order_uints(buy), order_uints(sell)),
        feeMethodsSidesKindsHowToCalls: concat(order_enums(buy), order_enums(sell)),
        calldataBuy: buy.calldata.clone(),
        calldataSell: sell.calldata.clone(),
        replacementPatternBuy: buy.replacement_pattern.clone(),
        replacementPatternSell: sell.replacement_pattern.clone(),
        staticExtradataBuy: buy.static_extradata.clone(),
        staticExtradataSell: sell.static_extradata.clone(),
    }
}

/// The arguments of `orderCalldataCanMatch`
pub fn order_calldata_can_match_call(
    buy: &UnhashedOrder,
    sell: &UnhashedOrder,
) -> orderCalldataCanMatchCall {
    orderCalldataCanMatchCall {
        buyCalldata: buy.calldata.clone(),
        buyReplacementPattern: buy.replacement_pattern.clone(),
        sellCalldata: sell.calldata.clone(),
        sellReplacementPattern: sell.replacement_pattern.clone(),
    }
}

/// The arguments of `atomicMatch_`
///
/// `metadata` is recorded in the exchange's match event, typically the
/// referrer's address left-padded to a word
pub fn atomic_match_call(buy: &Order, sell: &Order, metadata: B256) -> atomicMatch_Call {
    let base = orders_can_match_call(buy, sell);
    let buy_sig = buy.signature_or_default();
    let sell_sig = sell.signature_or_default();

    atomicMatch_Call {
        addrs: base.addrs,
        uints: base.uints,
        feeMethodsSidesKindsHowToCalls: base.feeMethodsSidesKindsHowToCalls,
        calldataBuy: base.calldataBuy,
        calldataSell: base.calldataSell,
        replacementPatternBuy: base.replacementPatternBuy,
        replacementPatternSell: base.replacementPatternSell,
        staticExtradataBuy: base.staticExtradataBuy,
        staticExtradataSell: base.staticExtradataSell,
        vs: [buy_sig.v, sell_sig.v],
        rssMetadata: [buy_sig.r, buy_sig.s, sell_sig.r, sell_sig.s, metadata],
    }
}

/// Encode a referrer into the match metadata word
pub fn referrer_metadata(referrer: Option<Address>) -> B256 {
    referrer.map(|addr| addr.into_word()).unwrap_or(B256::ZERO)
}
