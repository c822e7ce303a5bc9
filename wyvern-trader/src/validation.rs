//! Match validation
//!
//! [`check_orders_can_match`] replays the exchange's `ordersCanMatch` rules
//! locally so that an incompatible pair fails with the rule it violates
//! rather than an opaque revert. Calldata compatibility is left to the
//! contract's `orderCalldataCanMatch`.

use alloy_primitives::{Address, U256};
use tracing::warn;
use wyvern_api::OrderSide;

use crate::{
    error::{TraderError, TraderResult},
    gateway::ContractGateway,
    order::{Order, UnhashedOrder},
};

/// Check the structural match rules for a buy and a sell order at `now`
pub fn check_orders_can_match(
    buy: &UnhashedOrder,
    sell: &UnhashedOrder,
    now: u64,
) -> TraderResult<()> {
    if buy.side != OrderSide::Buy || sell.side != OrderSide::Sell {
        return Err(TraderError::SideMismatch { buy: buy.side, sell: sell.side });
    }

    if buy.fee_method != sell.fee_method {
        return Err(TraderError::FeeMethodMismatch);
    }

    if buy.payment_token != sell.payment_token {
        return Err(TraderError::PaymentTokenMismatch {
            buy: buy.payment_token.to_string(),
            sell: sell.payment_token.to_string(),
        });
    }

    if !taker_allows(sell.taker, buy.maker) {
        return Err(TraderError::TakerMismatch(format!(
            "sell order is reserved for {}, buyer is {}",
            sell.taker, buy.maker
        )));
    }
    if !taker_allows(buy.taker, sell.maker) {
        return Err(TraderError::TakerMismatch(format!(
            "buy order is reserved for {}, seller is {}",
            buy.taker, sell.maker
        )));
    }

    let buy_has_recipient = buy.fee_recipient != Address::ZERO;
    let sell_has_recipient = sell.fee_recipient != Address::ZERO;
    if buy_has_recipient == sell_has_recipient {
        return Err(TraderError::FeeRecipient(format!(
            "buy fee recipient {}, sell fee recipient {}",
            buy.fee_recipient, sell.fee_recipient
        )));
    }

    if buy.target != sell.target {
        return Err(TraderError::TargetMismatch(format!(
            "buy targets {}, sell targets {}",
            buy.target, sell.target
        )));
    }
    if buy.how_to_call != sell.how_to_call {
        return Err(TraderError::TargetMismatch(format!(
            "buy uses {:?}, sell uses {:?}",
            buy.how_to_call, sell.how_to_call
        )));
    }

    for order in [buy, sell] {
        if !is_live(order.listing_time, order.expiration_time, now) {
            return Err(TraderError::ExpiredOrder(order.side));
        }
    }

    Ok(())
}

/// Whether a taker restriction admits `counterparty`
fn taker_allows(taker: Address, counterparty: Address) -> bool {
    taker == Address::ZERO || taker == counterparty
}

/// Whether an order's listing window contains `now`
fn is_live(listing_time: U256, expiration_time: U256, now: u64) -> bool {
    let now = U256::from(now);
    listing_time < now && (expiration_time == U256::ZERO || now < expiration_time)
}

/// Check a pair locally, then ask the exchange
///
/// The local check covers every rule the exchange applies except its view of
/// the current time, so a rejection from the exchange after a local pass is
/// reported as clock skew
pub async fn require_orders_can_match(
    gateway: &dyn ContractGateway,
    buy: &Order,
    sell: &Order,
    now: u64,
) -> TraderResult<()> {
    check_orders_can_match(buy, sell, now)?;

    if !gateway.orders_can_match(buy, sell).await? {
        warn!("orders pass local match checks but the exchange rejects them");
        return Err(TraderError::ClockSkew);
    }

    Ok(())
}

/// Ask the exchange whether the pair's calldata can be spliced together
pub async fn require_order_calldata_can_match(
    gateway: &dyn ContractGateway,
    buy: &Order,
    sell: &Order,
) -> TraderResult<()> {
    if !gateway.order_calldata_can_match(buy, sell).await? {
        return Err(TraderError::CalldataMismatch);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;
    use wyvern_api::{FeeMethod, HowToCall};

    use super::*;
    use crate::{
        gateway::mock::MockGateway,
        network::{Network, NetworkConfig},
        order::test_helpers::{buy_order, sell_order, MAKER, TAKER},
    };

    const NOW: u64 = 1_700_000_000;

    /// A compatible buy/sell pair
    fn pair() -> (UnhashedOrder, UnhashedOrder) {
        (buy_order(NOW), sell_order(NOW))
    }

    #[test]
    fn test_compatible_pair() {
        let (buy, sell) = pair();
        check_orders_can_match(&buy, &sell, NOW).unwrap();
    }

    #[test]
    fn test_side_mismatch() {
        let (_, sell) = pair();
        let err = check_orders_can_match(&sell, &sell, NOW).unwrap_err();
        assert!(matches!(
            err,
            TraderError::SideMismatch { buy: OrderSide::Sell, sell: OrderSide::Sell }
        ));
    }

    #[test]
    fn test_fee_method_mismatch() {
        let (mut buy, sell) = pair();
        buy.fee_method = FeeMethod::ProtocolFee;
        let err = check_orders_can_match(&buy, &sell, NOW).unwrap_err();
        assert!(matches!(err, TraderError::FeeMethodMismatch));
    }

    #[test]
    fn test_payment_token_mismatch() {
        let (mut buy, sell) = pair();
        buy.payment_token = address!("c778417E063141139Fce010982780140Aa0cD5Ab");
        let err = check_orders_can_match(&buy, &sell, NOW).unwrap_err();
        assert!(matches!(err, TraderError::PaymentTokenMismatch { .. }));
    }

    #[test]
    fn test_taker_restrictions() {
        let (buy, mut sell) = pair();
        sell.taker = TAKER;
        check_orders_can_match(&buy, &sell, NOW).unwrap();

        sell.taker = Address::repeat_byte(0x42);
        let err = check_orders_can_match(&buy, &sell, NOW).unwrap_err();
        assert!(matches!(err, TraderError::TakerMismatch(_)));

        let (mut buy, sell) = pair();
        buy.taker = MAKER;
        check_orders_can_match(&buy, &sell, NOW).unwrap();
        buy.taker = TAKER;
        let err = check_orders_can_match(&buy, &sell, NOW).unwrap_err();
        assert!(matches!(err, TraderError::TakerMismatch(_)));
    }

    #[test]
    fn test_fee_recipient_rule() {
        let (mut buy, sell) = pair();
        buy.fee_recipient = sell.fee_recipient;
        let err = check_orders_can_match(&buy, &sell, NOW).unwrap_err();
        assert!(matches!(err, TraderError::FeeRecipient(_)));

        let (buy, mut sell) = pair();
        sell.fee_recipient = Address::ZERO;
        let err = check_orders_can_match(&buy, &sell, NOW).unwrap_err();
        assert!(matches!(err, TraderError::FeeRecipient(_)));
    }

    #[test]
    fn test_target_and_call_kind() {
        let (mut buy, sell) = pair();
        buy.target = Address::repeat_byte(0x77);
        let err = check_orders_can_match(&buy, &sell, NOW).unwrap_err();
        assert!(matches!(err, TraderError::TargetMismatch(_)));

        let (mut buy, sell) = pair();
        buy.how_to_call = match sell.how_to_call {
            HowToCall::Call => HowToCall::DelegateCall,
            HowToCall::DelegateCall => HowToCall::Call,
        };
        let err = check_orders_can_match(&buy, &sell, NOW).unwrap_err();
        assert!(matches!(err, TraderError::TargetMismatch(_)));
    }

    #[test]
    fn test_listing_windows() {
        let (mut buy, sell) = pair();
        buy.listing_time = U256::from(NOW - 1_000);

        // Before the sell order is listed
        let listing = sell.listing_time.saturating_to::<u64>();
        let err = check_orders_can_match(&buy, &sell, listing).unwrap_err();
        assert!(matches!(err, TraderError::ExpiredOrder(OrderSide::Sell)));

        // After the sell order expires
        let expiry = sell.expiration_time.saturating_to::<u64>();
        let err = check_orders_can_match(&buy, &sell, expiry).unwrap_err();
        assert!(matches!(err, TraderError::ExpiredOrder(OrderSide::Sell)));

        // A buy order that is not yet listed
        let mut late_buy = buy.clone();
        late_buy.listing_time = U256::from(NOW + 60);
        let err = check_orders_can_match(&late_buy, &sell, NOW).unwrap_err();
        assert!(matches!(err, TraderError::ExpiredOrder(OrderSide::Buy)));
    }

    #[tokio::test]
    async fn test_exchange_rejection_is_clock_skew() {
        let (buy, sell) = pair();
        let (buy, sell) = (Order::unsigned(buy), Order::unsigned(sell));
        let gateway = MockGateway::new(NetworkConfig::for_network(Network::Rinkeby).unwrap());

        require_orders_can_match(&gateway, &buy, &sell, NOW).await.unwrap();

        gateway.state().await.orders_can_match_default = false;
        let err = require_orders_can_match(&gateway, &buy, &sell, NOW).await.unwrap_err();
        assert!(matches!(err, TraderError::ClockSkew));

        gateway.state().await.calldata_can_match = false;
        let err = require_order_calldata_can_match(&gateway, &buy, &sell).await.unwrap_err();
        assert!(matches!(err, TraderError::CalldataMismatch));
    }
}
