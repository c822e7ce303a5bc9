//! Filling orders with `atomicMatch_`

use alloy::network::TransactionBuilder;
use alloy_primitives::{Address, TxHash, B256, U256};
use alloy_sol_types::SolCall;
use tracing::{info, instrument, warn};
use wyvern_api::OrderSide;

use super::{call_tx, SettlementEngine, SettlementState};
use crate::{
    builder::assign_orders_to_sides,
    error::{TraderError, TraderResult},
    gateway::args::{atomic_match_call, referrer_metadata},
    now_secs,
    order::Order,
    pricing::required_payment_for_sell_order,
    signing::SignerResolver,
    validation::{require_order_calldata_can_match, require_orders_can_match},
};

impl<R: SignerResolver> SettlementEngine<R> {
    /// Fill a signed order from `account`
    ///
    /// The counter-order is built for `account`, which receives the asset
    /// unless a `recipient` is given. The `referrer` is credited in the match
    /// metadata, falling back to the referrer recorded on the order.
    #[instrument(skip_all, fields(account = %account, side = %order.side))]
    pub async fn fulfill_order(
        &self,
        order: &Order,
        account: Address,
        recipient: Option<Address>,
        referrer: Option<Address>,
    ) -> TraderResult<TxHash> {
        let now = now_secs();
        let recipient = recipient.unwrap_or(account);
        let matching = self.builder.make_matching_order(order, account, recipient, now)?;
        let pair = assign_orders_to_sides(order, matching);
        info!(state = %SettlementState::Built, "counter-order built");

        match order.side {
            OrderSide::Sell => {
                let required = required_payment_for_sell_order(&pair.sell, now)?;
                self.buy_order_validation_and_approvals(&pair.buy, account, required).await?;
            },
            OrderSide::Buy => self.sell_order_validation_and_approvals(&pair.sell, account).await?,
        }
        info!(state = %SettlementState::Approved, "approvals in place");

        let metadata = referrer_metadata(referrer.or(order.metadata.referrer_address));
        self.atomic_match(&pair.buy, &pair.sell, account, metadata).await
    }

    /// Validate a buy/sell pair and submit `atomicMatch_` from `account`
    ///
    /// The order `account` did not make is validated on-chain, then the pair
    /// goes through match validation with retries. The transaction carries
    /// the sell order's required payment when `account` buys with the native
    /// coin, and its receipt is awaited.
    #[instrument(skip_all, fields(account = %account))]
    pub async fn atomic_match(
        &self,
        buy: &Order,
        sell: &Order,
        account: Address,
        metadata: B256,
    ) -> TraderResult<TxHash> {
        let res = self.try_atomic_match(buy, sell, account, metadata).await;
        if let Err(e) = &res {
            warn!(state = %SettlementState::Failed, "match failed: {e}");
        }

        res
    }

    /// The body of [`Self::atomic_match`]
    async fn try_atomic_match(
        &self,
        buy: &Order,
        sell: &Order,
        account: Address,
        metadata: B256,
    ) -> TraderResult<TxHash> {
        let now = now_secs();
        let value = if buy.maker == account && buy.pays_native() {
            required_payment_for_sell_order(sell, now)?
        } else {
            U256::ZERO
        };

        let counter = if buy.maker == account { sell } else { buy };
        if !self.gateway.validate_order(counter).await? {
            return Err(TraderError::OrderParameterInvalid(format!(
                "the {} order is no longer valid on the exchange",
                counter.side
            )));
        }

        self.validate_match(buy, sell).await?;
        info!(state = %SettlementState::Validated, "orders can match");

        let call = atomic_match_call(buy, sell, metadata);
        let exchange = self.gateway.network().exchange;
        let tx = call_tx(account, exchange, call.abi_encode().into()).with_value(value);

        info!(state = %SettlementState::Submitted, "submitting match with value {value}");
        let tx_hash = self.send_with_gas_estimate(tx).await?;
        info!(state = %SettlementState::Confirmed, "match confirmed in {tx_hash}");

        Ok(tx_hash)
    }

    /// Run match validation, retrying failures that may be transient
    ///
    /// Local rule violations fail immediately; rejections from the exchange
    /// are retried with a delay until the attempts run out
    pub(super) async fn validate_match(&self, buy: &Order, sell: &Order) -> TraderResult<()> {
        let attempts = self.config.match_validation_attempts;
        let mut last_err = None;
        for attempt in 1..=attempts {
            let res = match require_orders_can_match(self.gateway(), buy, sell, now_secs()).await {
                Ok(()) => require_order_calldata_can_match(self.gateway(), buy, sell).await,
                Err(e) => Err(e),
            };

            match res {
                Ok(()) => return Ok(()),
                Err(e) if e.is_retryable() => {
                    warn!("match validation failed (attempt {attempt}/{attempts}): {e}");
                    last_err = Some(e);
                    if attempt < attempts {
                        tokio::time::sleep(self.config.match_validation_delay).await;
                    }
                },
                Err(e) => return Err(e),
            }
        }

        let reason = last_err.map(|e| e.to_string()).unwrap_or_else(|| "no attempts made".into());
        Err(TraderError::MatchValidationFailed(reason))
    }
}

#[cfg(test)]
pub(crate) mod test_helpers {
    //! Listings made by an account outside the engine's keyring

    use std::str::FromStr;

    use alloy_primitives::address;
    use bigdecimal::BigDecimal;
    use wyvern_api::{Asset, SchemaName};

    use super::*;
    use crate::{
        builder::{OrderBuilder, SellOrderParams},
        order::{test_helpers::ASSET_CONTRACT, EcSignature},
    };

    /// The seller of test listings
    pub const SELLER: Address = address!("00000000000000000000000000000000000000cc");

    /// A signed 0.1 coin listing by [`SELLER`] paid in `payment_token`
    pub fn listing(builder: &OrderBuilder, payment_token: Address) -> Order {
        let params = SellOrderParams {
            asset: Asset::new(ASSET_CONTRACT, U256::from(5465u64), SchemaName::Erc721),
            account: SELLER,
            start_amount: BigDecimal::from_str("0.1").unwrap(),
            end_amount: None,
            quantity: U256::from(1u64),
            expiration_time: None,
            listing_time: None,
            payment_token,
            extra_bounty_basis_points: 0,
            buyer: Address::ZERO,
        };

        let mut order = Order::unsigned(builder.make_sell_order(params, now_secs()).unwrap());
        order.signature =
            Some(EcSignature { v: 27, r: B256::repeat_byte(0x01), s: B256::repeat_byte(0x02) });
        order
    }
}
