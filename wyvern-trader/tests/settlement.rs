//! End-to-end settlement against an in-memory gateway

use std::{
    str::FromStr,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use alloy::signers::local::PrivateKeySigner;
use alloy_primitives::{address, Address, TxKind, B256, U256};
use bigdecimal::BigDecimal;
use wyvern_api::{Asset, OrderSide, SchemaName};
use wyvern_trader::{
    builder::{assign_orders_to_sides, SellOrderParams},
    gateway::{mock::MockGateway, ContractGateway},
    network::{Network, NetworkConfig},
    settlement::{SettlementConfig, SettlementEngine},
    signing::Keyring,
    TraderError,
};

/// The listed collection
const COLLECTION: Address = address!("4bf010f1b9beda5450a8dd702ed602a104ff65ee");

/// A settlement policy without delays
fn fast_config() -> SettlementConfig {
    SettlementConfig {
        match_validation_delay: Duration::ZERO,
        proxy_poll_delay: Duration::ZERO,
        ..Default::default()
    }
}

/// An engine holding one fresh key, sharing `gateway`
fn engine(gateway: &MockGateway) -> (SettlementEngine<Keyring>, Address) {
    let mut keyring = Keyring::new();
    let account = keyring.insert(PrivateKeySigner::random());
    let engine = SettlementEngine::new(Arc::new(gateway.clone()), keyring, fast_config()).unwrap();
    (engine, account)
}

/// A 0.1 coin listing of token 5465 expiring in a day
fn listing_params(seller: Address) -> SellOrderParams {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
    SellOrderParams {
        asset: Asset::new(COLLECTION, U256::from(5465u64), SchemaName::Erc721),
        account: seller,
        start_amount: BigDecimal::from_str("0.1").unwrap(),
        end_amount: None,
        quantity: U256::from(1u64),
        expiration_time: Some(now + 86_400),
        listing_time: None,
        payment_token: Address::ZERO,
        extra_bounty_basis_points: 0,
        buyer: Address::ZERO,
    }
}

#[tokio::test]
async fn test_list_then_fill() {
    let gateway = MockGateway::new(NetworkConfig::for_network(Network::Rinkeby).unwrap());
    let (seller_engine, seller) = engine(&gateway);
    let (buyer_engine, buyer) = engine(&gateway);
    {
        let mut state = gateway.state().await;
        state.owners.insert((COLLECTION, U256::from(5465u64)), seller);
        state.native_balances.insert(buyer, U256::from(10u64).pow(U256::from(18u64)));
    }

    let listing = seller_engine.create_sell_order(listing_params(seller)).await.unwrap();
    assert_eq!(listing.side, OrderSide::Sell);
    assert_eq!(listing.base_price, U256::from(100_000_000_000_000_000u64));
    assert!(listing.signature.is_some());

    // Proxy registration and the collection approval
    assert_eq!(gateway.sent().await.len(), 2);

    buyer_engine.fulfill_order(&listing, buyer, None, None).await.unwrap();

    let sent = gateway.sent().await;
    assert_eq!(sent.len(), 3);
    let tx = &sent[2];
    assert_eq!(tx.from, Some(buyer));
    assert_eq!(tx.to, Some(TxKind::Call(gateway.network().exchange)));
    assert_eq!(tx.value, Some(listing.base_price));
    assert_eq!(tx.gas, Some(101_000));
}

#[tokio::test]
async fn test_payment_token_mismatch_fails_before_gas_estimation() {
    let gateway = MockGateway::new(NetworkConfig::for_network(Network::Rinkeby).unwrap());
    let (seller_engine, seller) = engine(&gateway);
    let (buyer_engine, buyer) = engine(&gateway);
    gateway.state().await.owners.insert((COLLECTION, U256::from(5465u64)), seller);

    let listing = seller_engine.create_sell_order(listing_params(seller)).await.unwrap();
    let sent_before = gateway.sent().await.len();

    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
    let mut matching =
        buyer_engine.builder().make_matching_order(&listing, buyer, buyer, now).unwrap();
    matching.payment_token = gateway.network().weth;
    let pair = assign_orders_to_sides(&listing, matching);

    let err = buyer_engine.atomic_match(&pair.buy, &pair.sell, buyer, B256::ZERO).await.unwrap_err();
    assert!(matches!(err, TraderError::PaymentTokenMismatch { .. }));
    assert_eq!(gateway.state().await.gas_estimates, 0);
    assert_eq!(gateway.sent().await.len(), sent_before);
}
