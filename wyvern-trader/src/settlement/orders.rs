//! Order creation: balance checks, approvals, validation and signing

use alloy_primitives::{Address, U256};
use tracing::{info, instrument};
use wyvern_api::{Asset, SchemaName};

use super::{schema_tagged_assets, SettlementEngine, SettlementState};
use crate::{
    builder::{BundleSellOrderParams, BuyOrderParams, SellOrderParams},
    error::{TraderError, TraderResult},
    now_secs,
    order::{Order, UnhashedOrder},
    signing::SignerResolver,
};

impl<R: SignerResolver> SettlementEngine<R> {
    /// Check that `account` can sell `order`, grant the approvals it needs and
    /// have the exchange validate its parameters
    #[instrument(skip_all, fields(account = %account))]
    pub async fn sell_order_validation_and_approvals(
        &self,
        order: &UnhashedOrder,
        account: Address,
    ) -> TraderResult<()> {
        let assets = schema_tagged_assets(&order.metadata);
        for asset in &assets {
            self.require_ownership(asset, account, order.quantity).await?;
        }

        self.approve_all(&assets, account, order.quantity).await?;
        self.require_valid_parameters(order).await
    }

    /// Check that `account` can pay `required` for `order`, approve the
    /// payment token and have the exchange validate the order's parameters
    #[instrument(skip_all, fields(account = %account))]
    pub async fn buy_order_validation_and_approvals(
        &self,
        order: &UnhashedOrder,
        account: Address,
        required: U256,
    ) -> TraderResult<()> {
        if order.pays_native() {
            let balance = self.gateway.native_balance(account).await?;
            if balance < required {
                return Err(TraderError::order_parameter(format!(
                    "insufficient balance: {balance} < {required}"
                )));
            }
        } else {
            let balance = self.gateway.erc20_balance(order.payment_token, account).await?;
            if balance < required {
                return Err(TraderError::order_parameter(format!(
                    "insufficient {} balance: {balance} < {required}",
                    order.payment_token
                )));
            }
            self.approve_fungible_token(account, order.payment_token, required, None).await?;
        }

        self.require_valid_parameters(order).await
    }

    /// Build, approve and sign a listing for a single asset
    #[instrument(skip_all, fields(account = %params.account))]
    pub async fn create_sell_order(&self, params: SellOrderParams) -> TraderResult<Order> {
        let account = params.account;
        let order = self.builder.make_sell_order(params, now_secs())?;
        self.approve_and_sign(order, account).await
    }

    /// Build, approve and sign a listing for a bundle
    #[instrument(skip_all, fields(account = %params.account))]
    pub async fn create_bundle_sell_order(
        &self,
        params: BundleSellOrderParams,
    ) -> TraderResult<Order> {
        let account = params.account;
        let order = self.builder.make_bundle_sell_order(params, now_secs())?;
        self.approve_and_sign(order, account).await
    }

    /// Build, approve and sign an offer
    #[instrument(skip_all, fields(account = %params.account))]
    pub async fn create_buy_order(&self, params: BuyOrderParams) -> TraderResult<Order> {
        let account = params.account;
        let order = self.builder.make_buy_order(params, now_secs())?;
        info!(state = %SettlementState::Built, "offer built");

        self.buy_order_validation_and_approvals(&order, account, order.base_price).await?;
        info!(state = %SettlementState::Approved, "offer approved");

        self.sign(order).await
    }

    /// Post a signed order to the configured orderbook
    pub async fn post_order(&self, order: &Order) -> TraderResult<Order> {
        Ok(self.orderbook()?.post_order(order).await?)
    }

    /// Approve a freshly built sell order and sign it straight away
    async fn approve_and_sign(&self, order: UnhashedOrder, account: Address) -> TraderResult<Order> {
        info!(state = %SettlementState::Built, "listing built");
        self.sell_order_validation_and_approvals(&order, account).await?;
        info!(state = %SettlementState::Approved, "listing approved");

        self.sign(order).await
    }

    /// Sign an order with its maker's key
    async fn sign(&self, order: UnhashedOrder) -> TraderResult<Order> {
        let signature = self.signer.authorize_order(&order, self.gateway.as_ref()).await?;
        Ok(signature.into_order(order))
    }

    /// Fail unless `account` holds `quantity` of `asset`
    async fn require_ownership(
        &self,
        asset: &Asset,
        account: Address,
        quantity: U256,
    ) -> TraderResult<()> {
        let token = asset.token_address;
        let owned = match asset.schema() {
            SchemaName::Erc721 => {
                self.gateway.owner_of(token, asset.token_id).await? == account
            },
            SchemaName::Erc1155 => {
                self.gateway.erc1155_balance(token, account, asset.token_id).await? >= quantity
            },
            SchemaName::Erc20 => self.gateway.erc20_balance(token, account).await? >= quantity,
            other => return Err(TraderError::UnsupportedSchema(other)),
        };

        if !owned {
            return Err(TraderError::order_parameter(format!(
                "{account} does not own {quantity} of token {} in {token}",
                asset.token_id
            )));
        }

        Ok(())
    }

    /// Have the exchange validate an order's parameters
    async fn require_valid_parameters(&self, order: &UnhashedOrder) -> TraderResult<()> {
        if !self.gateway.validate_order_parameters(order).await? {
            return Err(TraderError::OrderParameterInvalid(format!(
                "the exchange at {} rejected the order; check the network configuration",
                order.exchange
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use alloy_primitives::address;
    use bigdecimal::BigDecimal;
    use wyvern_api::{OrderSide, SaleKind};

    use super::*;
    use crate::{
        gateway::ContractGateway, order::test_helpers::ASSET_CONTRACT,
        settlement::test_helpers::engine,
    };

    /// The asset listed in tests
    fn asset() -> Asset {
        Asset::new(ASSET_CONTRACT, U256::from(5465u64), SchemaName::Erc721)
    }

    /// A fixed-price listing of [`asset`] by `account`
    fn sell_params(account: Address) -> SellOrderParams {
        SellOrderParams {
            asset: asset(),
            account,
            start_amount: BigDecimal::from_str("0.1").unwrap(),
            end_amount: None,
            quantity: U256::from(1u64),
            expiration_time: None,
            listing_time: None,
            payment_token: Address::ZERO,
            extra_bounty_basis_points: 0,
            buyer: Address::ZERO,
        }
    }

    #[tokio::test]
    async fn test_create_sell_order() {
        let (engine, gateway, account) = engine();
        gateway.state().await.owners.insert((ASSET_CONTRACT, U256::from(5465u64)), account);

        let order = engine.create_sell_order(sell_params(account)).await.unwrap();
        assert_eq!(order.side, OrderSide::Sell);
        assert_eq!(order.sale_kind, SaleKind::FixedPrice);
        assert!(order.signature.is_some());
        assert_eq!(order.nonce, Some(U256::ZERO));

        // Proxy registration and the collection approval
        let state = gateway.state().await;
        assert_eq!(state.sent.len(), 2);
        assert_eq!(
            state.approvals_for_all.get(&(ASSET_CONTRACT, account, state.proxy_on_register)),
            Some(&true)
        );
    }

    #[tokio::test]
    async fn test_sell_requires_ownership() {
        let (engine, gateway, account) = engine();
        let other = address!("00000000000000000000000000000000000000cc");
        gateway.state().await.owners.insert((ASSET_CONTRACT, U256::from(5465u64)), other);

        let err = engine.create_sell_order(sell_params(account)).await.unwrap_err();
        assert!(matches!(err, TraderError::OrderParameter(_)));
        assert!(gateway.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_parameters() {
        let (engine, gateway, account) = engine();
        {
            let mut state = gateway.state().await;
            state.owners.insert((ASSET_CONTRACT, U256::from(5465u64)), account);
            state.order_parameters_valid = false;
        }

        let err = engine.create_sell_order(sell_params(account)).await.unwrap_err();
        assert!(matches!(err, TraderError::OrderParameterInvalid(_)));
    }

    #[tokio::test]
    async fn test_create_buy_order_approves_payment() {
        let (engine, gateway, account) = engine();
        let weth = gateway.network().weth;
        let price = U256::from(100_000_000_000_000_000u64);
        gateway.state().await.erc20_balances.insert((weth, account), price);

        let params = BuyOrderParams {
            asset: asset(),
            account,
            start_amount: BigDecimal::from_str("0.1").unwrap(),
            quantity: U256::from(1u64),
            expiration_time: None,
            listing_time: None,
            payment_token: weth,
            seller: Address::ZERO,
        };
        let order = engine.create_buy_order(params.clone()).await.unwrap();
        assert_eq!(order.side, OrderSide::Buy);
        assert_eq!(order.base_price, price);

        let spender = gateway.network().token_transfer_proxy;
        let allowance = gateway.state().await.erc20_allowances[&(weth, account, spender)];
        assert_eq!(allowance, U256::MAX);

        // Too little balance for a larger offer
        let params = BuyOrderParams { start_amount: BigDecimal::from(1), ..params };
        let err = engine.create_buy_order(params).await.unwrap_err();
        assert!(matches!(err, TraderError::OrderParameter(_)));
    }

    #[tokio::test]
    async fn test_post_order_needs_orderbook() {
        let (engine, gateway, account) = engine();
        gateway.state().await.owners.insert((ASSET_CONTRACT, U256::from(5465u64)), account);
        let order = engine.create_sell_order(sell_params(account)).await.unwrap();

        let err = engine.post_order(&order).await.unwrap_err();
        assert!(matches!(err, TraderError::Config(_)));
    }
}
