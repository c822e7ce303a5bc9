//! Filling several listings in one Multicall3 transaction

use alloy::network::TransactionBuilder;
use alloy_primitives::{Address, TxHash, U256};
use alloy_sol_types::SolCall;
use futures::future::try_join_all;
use tracing::{info, instrument};
use wyvern_api::OrderSide;

use super::{call_tx, SettlementEngine, SettlementState};
use crate::{
    builder::{assign_orders_to_sides, MatchPair},
    error::{TraderError, TraderResult},
    gateway::{
        abis::IMulticall3::{aggregate3ValueCall, Call3Value},
        args::{atomic_match_call, referrer_metadata},
    },
    now_secs,
    order::Order,
    pricing::required_payment_for_sell_order,
    signing::SignerResolver,
};

impl<R: SignerResolver> SettlementEngine<R> {
    /// Fill several native-coin listings in one transaction from `account`
    ///
    /// Each counter-order is made by the multicall contract, which sends the
    /// inner matches, and transfers the asset to `account`. Every pair goes
    /// through match validation with the exchange before anything is sent.
    /// The transaction carries the sum of every listing's required payment.
    #[instrument(skip_all, fields(account = %account, orders = orders.len()))]
    pub async fn fulfill_orders(&self, orders: &[Order], account: Address) -> TraderResult<TxHash> {
        if orders.is_empty() {
            return Err(TraderError::order_parameter("no orders to fill"));
        }

        let now = now_secs();
        let multicall = self.gateway.network().multicall;
        let mut pairs = Vec::with_capacity(orders.len());
        for order in orders {
            if order.side != OrderSide::Sell || !order.pays_native() {
                return Err(TraderError::order_parameter(
                    "only sell orders paid in the native coin can be filled in a batch",
                ));
            }

            let matching = self.builder.make_matching_order(order, multicall, account, now)?;
            pairs.push(assign_orders_to_sides(order, matching));
        }
        info!(state = %SettlementState::Built, "counter-orders built");

        for pair in &pairs {
            self.validate_match(&pair.buy, &pair.sell).await?;
        }

        let values = try_join_all(pairs.iter().map(|pair| self.batched_value(pair, now))).await?;
        let total = values
            .iter()
            .try_fold(U256::ZERO, |acc, value| acc.checked_add(*value))
            .ok_or_else(|| TraderError::price("batch value overflow"))?;
        info!(state = %SettlementState::Validated, "listings valid, total value {total}");

        let exchange = self.gateway.network().exchange;
        let calls = pairs
            .iter()
            .zip(orders)
            .zip(values)
            .map(|((pair, order), value)| {
                let metadata = referrer_metadata(order.metadata.referrer_address);
                let call = atomic_match_call(&pair.buy, &pair.sell, metadata);
                Call3Value {
                    target: exchange,
                    allowFailure: false,
                    value,
                    callData: call.abi_encode().into(),
                }
            })
            .collect();

        let call = aggregate3ValueCall { calls };
        let tx = call_tx(account, multicall, call.abi_encode().into()).with_value(total);

        info!(state = %SettlementState::Submitted, "submitting batched matches");
        let tx_hash = self.send_with_gas_estimate(tx).await?;
        info!(state = %SettlementState::Confirmed, "batch confirmed in {tx_hash}");

        Ok(tx_hash)
    }

    /// Validate a listing on-chain and compute the value its match carries
    async fn batched_value(&self, pair: &MatchPair, now: u64) -> TraderResult<U256> {
        if !self.gateway.validate_order(&pair.sell).await? {
            return Err(TraderError::OrderParameterInvalid(format!(
                "listing by {} is no longer valid on the exchange",
                pair.sell.maker
            )));
        }

        required_payment_for_sell_order(&pair.sell, now)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::TxKind;

    use super::*;
    use crate::{
        gateway::ContractGateway,
        settlement::{atomic_match::test_helpers::listing, test_helpers::engine},
    };

    #[tokio::test]
    async fn test_fulfill_orders_in_one_transaction() {
        let (engine, gateway, account) = engine();
        let orders =
            [listing(engine.builder(), Address::ZERO), listing(engine.builder(), Address::ZERO)];

        engine.fulfill_orders(&orders, account).await.unwrap();

        let sent = gateway.sent().await;
        assert_eq!(sent.len(), 1);
        let tx = &sent[0];
        assert_eq!(tx.to, Some(TxKind::Call(gateway.network().multicall)));
        assert_eq!(tx.value, Some(orders[0].base_price * U256::from(2u64)));

        let input = tx.input.input().unwrap();
        let decoded = aggregate3ValueCall::abi_decode(input).unwrap();
        assert_eq!(decoded.calls.len(), 2);
        assert!(decoded.calls.iter().all(|c| c.target == gateway.network().exchange));
        assert!(decoded.calls.iter().all(|c| c.value == orders[0].base_price));
    }

    #[tokio::test]
    async fn test_only_native_listings() {
        let (engine, gateway, account) = engine();
        let weth = gateway.network().weth;
        let orders = [listing(engine.builder(), Address::ZERO), listing(engine.builder(), weth)];

        let err = engine.fulfill_orders(&orders, account).await.unwrap_err();
        assert!(matches!(err, TraderError::OrderParameter(_)));
        assert!(gateway.sent().await.is_empty());

        let err = engine.fulfill_orders(&[], account).await.unwrap_err();
        assert!(matches!(err, TraderError::OrderParameter(_)));
    }

    #[tokio::test]
    async fn test_invalid_listing_aborts_batch() {
        let (engine, gateway, account) = engine();
        gateway.state().await.order_valid = false;
        let orders = [listing(engine.builder(), Address::ZERO)];

        let err = engine.fulfill_orders(&orders, account).await.unwrap_err();
        assert!(matches!(err, TraderError::OrderParameterInvalid(_)));
        assert_eq!(gateway.state().await.gas_estimates, 0);
    }

    #[tokio::test]
    async fn test_exchange_rejecting_match_aborts_batch() {
        let (engine, gateway, account) = engine();
        gateway.state().await.orders_can_match_default = false;
        let orders = [listing(engine.builder(), Address::ZERO)];

        let err = engine.fulfill_orders(&orders, account).await.unwrap_err();
        assert!(matches!(err, TraderError::MatchValidationFailed(_)));
        assert_eq!(gateway.state().await.gas_estimates, 0);
        assert!(gateway.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_calldata_mismatch_aborts_batch() {
        let (engine, gateway, account) = engine();
        gateway.state().await.calldata_can_match = false;
        let orders = [listing(engine.builder(), Address::ZERO)];

        let err = engine.fulfill_orders(&orders, account).await.unwrap_err();
        assert!(matches!(err, TraderError::MatchValidationFailed(_)));
        assert_eq!(gateway.state().await.gas_estimates, 0);
        assert!(gateway.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_batch_retries_until_exchange_agrees() {
        let (engine, gateway, account) = engine();
        gateway.state().await.orders_can_match.extend([Ok(false), Ok(false)]);
        let orders = [listing(engine.builder(), Address::ZERO)];

        engine.fulfill_orders(&orders, account).await.unwrap();
        assert_eq!(gateway.sent().await.len(), 1);
    }
}
