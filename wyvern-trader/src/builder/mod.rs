//! Order construction
//!
//! The builder turns trade parameters into unsigned orders, and synthesises
//! the counter-order a taker submits alongside a maker's signed order.

use std::str::FromStr;

use alloy_primitives::{Address, Bytes, U256};
use bigdecimal::BigDecimal;
use wyvern_api::{Asset, AssetSelection, Bundle, OrderMetadata, OrderSide, SaleKind};

use crate::{
    constants::{DEFAULT_PAYMENT_TOKEN_DECIMALS, PROTOCOL_FEE_RECIPIENT},
    encoding::{encode_atomicized_transfer, encode_transfer, SchemaRegistry, TransferEncoding},
    error::{TraderError, TraderResult},
    network::NetworkConfig,
    order::{Order, UnhashedOrder},
    pricing::{compute_fees, price_parameters, sale_kind, FeeParameters},
};

pub mod time;

pub use time::{max_expiration_timestamp, time_parameters, TimeParameters};

/// Parse an account address, rejecting the null address
pub fn validate_and_format_wallet_address(address: &str) -> TraderResult<Address> {
    let parsed = Address::from_str(address.trim()).map_err(|e| {
        TraderError::order_parameter(format!("invalid wallet address {address}: {e}"))
    })?;
    ensure_account(parsed)
}

/// Reject the null address as an account
fn ensure_account(address: Address) -> TraderResult<Address> {
    if address == Address::ZERO {
        return Err(TraderError::order_parameter("account cannot be the null address"));
    }
    Ok(address)
}

/// A fresh random salt
pub fn generate_salt() -> U256 {
    U256::random()
}

/// Parameters for listing a single asset
#[derive(Debug, Clone)]
pub struct SellOrderParams {
    /// The asset to sell
    pub asset: Asset,
    /// The seller
    pub account: Address,
    /// The starting price in human units
    pub start_amount: BigDecimal,
    /// The ending price of a declining auction
    pub end_amount: Option<BigDecimal>,
    /// The number of units to sell
    pub quantity: U256,
    /// When the listing expires, defaulting to the maximum
    pub expiration_time: Option<u64>,
    /// When the listing starts, defaulting to just before now
    pub listing_time: Option<u64>,
    /// The payment token, or the null address for the native coin
    pub payment_token: Address,
    /// An additional referral bounty offered by the seller
    pub extra_bounty_basis_points: u64,
    /// The only buyer allowed to fill the listing, or the null address
    pub buyer: Address,
}

/// Parameters for listing a bundle of assets
#[derive(Debug, Clone)]
pub struct BundleSellOrderParams {
    /// The bundle to sell
    pub bundle: Bundle,
    /// The seller
    pub account: Address,
    /// The starting price in human units
    pub start_amount: BigDecimal,
    /// The ending price of a declining auction
    pub end_amount: Option<BigDecimal>,
    /// When the listing expires, defaulting to the maximum
    pub expiration_time: Option<u64>,
    /// When the listing starts, defaulting to just before now
    pub listing_time: Option<u64>,
    /// The payment token, or the null address for the native coin
    pub payment_token: Address,
    /// An additional referral bounty offered by the seller
    pub extra_bounty_basis_points: u64,
    /// The only buyer allowed to fill the listing, or the null address
    pub buyer: Address,
}

/// Parameters for an offer on a single asset
#[derive(Debug, Clone)]
pub struct BuyOrderParams {
    /// The asset to buy
    pub asset: Asset,
    /// The buyer
    pub account: Address,
    /// The offered price in human units
    pub start_amount: BigDecimal,
    /// The number of units to buy
    pub quantity: U256,
    /// When the offer expires, defaulting to the maximum
    pub expiration_time: Option<u64>,
    /// When the offer starts, defaulting to just before now
    pub listing_time: Option<u64>,
    /// The ERC20 the offer is paid in
    pub payment_token: Address,
    /// The only seller allowed to accept the offer, or the null address
    pub seller: Address,
}

/// A buy order and a sell order ready to be matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPair {
    /// The buy side
    pub buy: Order,
    /// The sell side
    pub sell: Order,
}

/// Builds orders for one network
#[derive(Debug, Clone)]
pub struct OrderBuilder {
    /// The network's contract addresses
    network: NetworkConfig,
    /// The schemas available on the network
    schemas: SchemaRegistry,
}

impl OrderBuilder {
    /// Create a new builder
    pub fn new(network: NetworkConfig, schemas: SchemaRegistry) -> Self {
        Self { network, schemas }
    }

    /// The network the builder targets
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// The schemas the builder encodes with
    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    /// Build a listing for a single asset
    pub fn make_sell_order(&self, params: SellOrderParams, now: u64) -> TraderResult<UnhashedOrder> {
        let account = ensure_account(params.account)?;
        let fees = compute_fees(OrderSide::Sell, params.extra_bounty_basis_points)?;

        let schema_name = params.asset.schema();
        let schema = self.schemas.get(schema_name)?;
        let transfer = encode_transfer(
            OrderSide::Sell,
            schema,
            &params.asset,
            account,
            self.network.merkle_validator,
            params.quantity,
        )?;

        let sale_kind = sale_kind(&params.start_amount, params.end_amount.as_ref());
        let times = time_parameters(params.expiration_time, params.listing_time, false, now)?;
        let prices = price_parameters(
            OrderSide::Sell,
            params.payment_token,
            times.expiration_time.saturating_to::<u64>(),
            &params.start_amount,
            params.end_amount.as_ref(),
            DEFAULT_PAYMENT_TOKEN_DECIMALS,
        )?;

        Ok(self.assemble(
            account,
            params.buyer,
            OrderSide::Sell,
            sale_kind,
            transfer,
            FeeParameters::for_sell(&fees),
            prices.payment_token,
            (prices.base_price, prices.extra),
            params.quantity,
            times,
            OrderMetadata::single(params.asset, schema_name),
        ))
    }

    /// Build a listing for a bundle, transferred through the atomicizer
    pub fn make_bundle_sell_order(
        &self,
        params: BundleSellOrderParams,
        now: u64,
    ) -> TraderResult<UnhashedOrder> {
        let account = ensure_account(params.account)?;
        let fees = compute_fees(OrderSide::Sell, params.extra_bounty_basis_points)?;

        let transfer = encode_atomicized_transfer(
            OrderSide::Sell,
            &self.schemas,
            &params.bundle.assets,
            &params.bundle.schemas,
            account,
            self.network.atomicizer,
        )?;

        let sale_kind = sale_kind(&params.start_amount, params.end_amount.as_ref());
        let times = time_parameters(params.expiration_time, params.listing_time, false, now)?;
        let prices = price_parameters(
            OrderSide::Sell,
            params.payment_token,
            times.expiration_time.saturating_to::<u64>(),
            &params.start_amount,
            params.end_amount.as_ref(),
            DEFAULT_PAYMENT_TOKEN_DECIMALS,
        )?;

        Ok(self.assemble(
            account,
            params.buyer,
            OrderSide::Sell,
            sale_kind,
            transfer,
            FeeParameters::for_sell(&fees),
            prices.payment_token,
            (prices.base_price, prices.extra),
            U256::from(1u64),
            times,
            OrderMetadata::bundle(params.bundle),
        ))
    }

    /// Build a fixed-price offer for a single asset
    pub fn make_buy_order(&self, params: BuyOrderParams, now: u64) -> TraderResult<UnhashedOrder> {
        let account = ensure_account(params.account)?;
        let fees = compute_fees(OrderSide::Buy, 0)?;

        let schema_name = params.asset.schema();
        let schema = self.schemas.get(schema_name)?;
        let transfer = encode_transfer(
            OrderSide::Buy,
            schema,
            &params.asset,
            account,
            self.network.merkle_validator,
            params.quantity,
        )?;

        let times = time_parameters(params.expiration_time, params.listing_time, false, now)?;
        let prices = price_parameters(
            OrderSide::Buy,
            params.payment_token,
            times.expiration_time.saturating_to::<u64>(),
            &params.start_amount,
            None,
            DEFAULT_PAYMENT_TOKEN_DECIMALS,
        )?;

        Ok(self.assemble(
            account,
            params.seller,
            OrderSide::Buy,
            SaleKind::FixedPrice,
            transfer,
            FeeParameters::for_buy(&fees),
            prices.payment_token,
            (prices.base_price, prices.extra),
            params.quantity,
            times,
            OrderMetadata::single(params.asset, schema_name),
        ))
    }

    /// Build the counter-order that fills `order`
    ///
    /// `account` becomes the maker and `recipient` the party whose address is
    /// encoded into the transfer. Exactly one of the two orders carries a fee
    /// recipient, and the counter-order never expires.
    pub fn make_matching_order(
        &self,
        order: &UnhashedOrder,
        account: Address,
        recipient: Address,
        now: u64,
    ) -> TraderResult<UnhashedOrder> {
        let account = ensure_account(account)?;
        let recipient = ensure_account(recipient)?;

        let fee_recipient = if order.fee_recipient == Address::ZERO {
            PROTOCOL_FEE_RECIPIENT
        } else {
            Address::ZERO
        };

        let side = order.side.opposite();
        let transfer = match &order.metadata.assets {
            AssetSelection::Single { asset, schema } => {
                let schema = self.schemas.get(*schema)?;
                let validator =
                    Some(order.target).filter(|t| Some(*t) == self.network.merkle_validator);
                encode_transfer(side, schema, asset, recipient, validator, order.quantity)?
            },
            AssetSelection::Bundle(bundle) => encode_atomicized_transfer(
                side,
                &self.schemas,
                &bundle.assets,
                &bundle.schemas,
                recipient,
                self.network.atomicizer,
            )?,
        };
        if transfer.target != order.target {
            return Err(TraderError::encoding(format!(
                "order targets {} but its counter-order would target {}",
                order.target, transfer.target
            )));
        }

        let times = time_parameters(None, None, true, now)?;
        Ok(UnhashedOrder {
            exchange: order.exchange,
            maker: account,
            taker: order.maker,
            maker_relayer_fee: order.maker_relayer_fee,
            taker_relayer_fee: order.taker_relayer_fee,
            maker_protocol_fee: order.maker_protocol_fee,
            taker_protocol_fee: order.taker_protocol_fee,
            maker_referrer_fee: order.maker_referrer_fee,
            fee_recipient,
            fee_method: order.fee_method,
            side,
            sale_kind: SaleKind::FixedPrice,
            target: transfer.target,
            how_to_call: order.how_to_call,
            calldata: transfer.calldata,
            replacement_pattern: transfer.replacement_pattern,
            static_target: Address::ZERO,
            static_extradata: Bytes::new(),
            payment_token: order.payment_token,
            base_price: order.base_price,
            extra: U256::ZERO,
            quantity: order.quantity,
            listing_time: times.listing_time,
            expiration_time: times.expiration_time,
            salt: generate_salt(),
            metadata: order.metadata.clone(),
        })
    }

    /// Assemble an order from its computed parts
    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        maker: Address,
        taker: Address,
        side: OrderSide,
        sale_kind: SaleKind,
        transfer: TransferEncoding,
        fees: FeeParameters,
        payment_token: Address,
        (base_price, extra): (U256, U256),
        quantity: U256,
        times: TimeParameters,
        metadata: OrderMetadata,
    ) -> UnhashedOrder {
        UnhashedOrder {
            exchange: self.network.exchange,
            maker,
            taker,
            maker_relayer_fee: fees.maker_relayer_fee,
            taker_relayer_fee: fees.taker_relayer_fee,
            maker_protocol_fee: fees.maker_protocol_fee,
            taker_protocol_fee: fees.taker_protocol_fee,
            maker_referrer_fee: fees.maker_referrer_fee,
            fee_recipient: fees.fee_recipient,
            fee_method: fees.fee_method,
            side,
            sale_kind,
            target: transfer.target,
            how_to_call: transfer.how_to_call,
            calldata: transfer.calldata,
            replacement_pattern: transfer.replacement_pattern,
            static_target: Address::ZERO,
            static_extradata: Bytes::new(),
            payment_token,
            base_price,
            extra,
            quantity,
            listing_time: times.listing_time,
            expiration_time: times.expiration_time,
            salt: generate_salt(),
            metadata,
        }
    }
}

/// Pair a signed order with its synthesised counter-order
///
/// The counter-order carries the signed order's signature; the exchange
/// skips the check for the side whose maker sends the transaction
pub fn assign_orders_to_sides(order: &Order, matching: UnhashedOrder) -> MatchPair {
    let mut counter = Order::unsigned(matching);
    counter.signature = order.signature;

    match order.side {
        OrderSide::Sell => MatchPair { buy: counter, sell: order.clone() },
        OrderSide::Buy => MatchPair { buy: order.clone(), sell: counter },
    }
}
