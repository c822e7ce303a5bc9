//! Fee policy

use alloy_primitives::{Address, U256};
use wyvern_api::{FeeMethod, OrderSide};

use crate::{
    constants::{
        DEFAULT_BUYER_FEE_BASIS_POINTS, DEFAULT_MAX_BOUNTY, DEFAULT_SELLER_FEE_BASIS_POINTS,
        PROTOCOL_FEE_RECIPIENT, PROTOCOL_SELLER_BOUNTY_BASIS_POINTS,
    },
    error::{TraderError, TraderResult},
};

/// The fee totals for an order, in basis points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputedFees {
    /// All fees charged to the buyer
    pub total_buyer_fee_basis_points: u64,
    /// All fees charged to the seller
    pub total_seller_fee_basis_points: u64,
    /// The protocol's share of the buyer fee
    pub protocol_buyer_fee_basis_points: u64,
    /// The protocol's share of the seller fee
    pub protocol_seller_fee_basis_points: u64,
    /// The collection developer's share of the buyer fee
    pub dev_buyer_fee_basis_points: u64,
    /// The collection developer's share of the seller fee
    pub dev_seller_fee_basis_points: u64,
    /// The referral bounty the seller offers on top of the protocol bounty
    pub seller_bounty_basis_points: u64,
}

/// Compute the fees for a new order
///
/// Only sellers may offer a bounty, and the bounty plus the protocol's own
/// bounty may not exceed the maximum
pub fn compute_fees(side: OrderSide, extra_bounty_basis_points: u64) -> TraderResult<ComputedFees> {
    let protocol_buyer_fee_basis_points = DEFAULT_BUYER_FEE_BASIS_POINTS;
    let protocol_seller_fee_basis_points = DEFAULT_SELLER_FEE_BASIS_POINTS;
    let dev_buyer_fee_basis_points = 0;
    let dev_seller_fee_basis_points = 0;

    let seller_bounty_basis_points = match side {
        OrderSide::Sell => extra_bounty_basis_points,
        OrderSide::Buy => 0,
    };
    let total_bounty = seller_bounty_basis_points.saturating_add(PROTOCOL_SELLER_BOUNTY_BASIS_POINTS);
    if seller_bounty_basis_points > 0 && total_bounty > DEFAULT_MAX_BOUNTY {
        return Err(TraderError::fee(format!(
            "total bounty of {total_bounty} bps exceeds the maximum of {DEFAULT_MAX_BOUNTY} bps"
        )));
    }

    Ok(ComputedFees {
        total_buyer_fee_basis_points: protocol_buyer_fee_basis_points + dev_buyer_fee_basis_points,
        total_seller_fee_basis_points: protocol_seller_fee_basis_points
            + dev_seller_fee_basis_points,
        protocol_buyer_fee_basis_points,
        protocol_seller_fee_basis_points,
        dev_buyer_fee_basis_points,
        dev_seller_fee_basis_points,
        seller_bounty_basis_points,
    })
}

/// The fee fields written onto an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeParameters {
    /// Relayer fee charged to the maker
    pub maker_relayer_fee: U256,
    /// Relayer fee charged to the taker
    pub taker_relayer_fee: U256,
    /// Protocol fee charged to the maker
    pub maker_protocol_fee: U256,
    /// Protocol fee charged to the taker
    pub taker_protocol_fee: U256,
    /// Share of the maker fee paid to a referrer
    pub maker_referrer_fee: U256,
    /// The recipient of relayer fees
    pub fee_recipient: Address,
    /// How fees are charged
    pub fee_method: FeeMethod,
}

impl FeeParameters {
    /// The fee split for a listing: the seller pays the seller fee as maker
    pub fn for_sell(fees: &ComputedFees) -> Self {
        Self {
            maker_relayer_fee: U256::from(fees.total_seller_fee_basis_points),
            taker_relayer_fee: U256::from(fees.total_buyer_fee_basis_points),
            maker_protocol_fee: U256::ZERO,
            taker_protocol_fee: U256::ZERO,
            maker_referrer_fee: U256::from(fees.seller_bounty_basis_points),
            fee_recipient: PROTOCOL_FEE_RECIPIENT,
            fee_method: FeeMethod::SplitFee,
        }
    }

    /// The fee split for an offer: the buyer pays the buyer fee as maker
    pub fn for_buy(fees: &ComputedFees) -> Self {
        Self {
            maker_relayer_fee: U256::from(fees.total_buyer_fee_basis_points),
            taker_relayer_fee: U256::from(fees.total_seller_fee_basis_points),
            maker_protocol_fee: U256::ZERO,
            taker_protocol_fee: U256::ZERO,
            maker_referrer_fee: U256::ZERO,
            fee_recipient: PROTOCOL_FEE_RECIPIENT,
            fee_method: FeeMethod::SplitFee,
        }
    }
}
