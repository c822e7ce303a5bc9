//! Price computation
//!
//! Prices are quoted in human units as `BigDecimal` and converted to the
//! payment token's base unit. Settlement prices follow the exchange's
//! `calculateFinalPrice`: fixed, or linear between the listing and expiration
//! times.

use alloy_primitives::{Address, U256};
use bigdecimal::{num_bigint::BigInt, BigDecimal, Signed, Zero};
use wyvern_api::{OrderSide, SaleKind};

use crate::{
    constants::{AUCTION_BACKTRACK_SECS, INVERSE_BASIS_POINT},
    error::{TraderError, TraderResult},
    order::UnhashedOrder,
};

pub mod fees;

pub use fees::{compute_fees, ComputedFees, FeeParameters};

/// The price fields written onto an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceParameters {
    /// The starting price in base units
    pub base_price: U256,
    /// The price delta over the auction window in base units
    pub extra: U256,
    /// The payment token
    pub payment_token: Address,
}

/// Convert a human-unit amount to a token's base unit
///
/// Fails if the amount is negative, does not fit in 256 bits, or has more
/// precision than the token
pub fn to_base_units(amount: &BigDecimal, decimals: u32) -> TraderResult<U256> {
    if amount.is_negative() {
        return Err(TraderError::price(format!("amount {amount} is negative")));
    }

    let scale = BigDecimal::new(BigInt::from(1), -i64::from(decimals));
    let scaled = amount * scale;
    if !scaled.is_integer() {
        return Err(TraderError::price(format!(
            "amount {amount} has more than {decimals} decimals"
        )));
    }

    let (digits, _) = scaled.with_scale(0).into_bigint_and_scale();
    let (_, bytes) = digits.to_bytes_be();
    U256::try_from_be_slice(&bytes)
        .ok_or_else(|| TraderError::price(format!("amount {amount} overflows")))
}

/// Compute the price fields of a new order
///
/// A positive difference between `start_amount` and `end_amount` makes a
/// declining auction, which needs an expiration time. Both the start price
/// and the difference are converted to base units.
pub fn price_parameters(
    side: OrderSide,
    payment_token: Address,
    expiration_time: u64,
    start_amount: &BigDecimal,
    end_amount: Option<&BigDecimal>,
    decimals: u32,
) -> TraderResult<PriceParameters> {
    if start_amount.is_negative() {
        return Err(TraderError::price("starting price must be a number >= 0"));
    }
    if payment_token == Address::ZERO && side == OrderSide::Buy {
        return Err(TraderError::price("offers must use wrapped ETH or an ERC-20 token"));
    }

    let price_diff = match end_amount {
        Some(end) => start_amount - end,
        None => BigDecimal::zero(),
    };
    if price_diff.is_negative() {
        return Err(TraderError::price("end price must be less than or equal to the start price"));
    }
    if price_diff.is_positive() && expiration_time == 0 {
        return Err(TraderError::price(
            "expiration time must be set if order will change in price",
        ));
    }

    let base_price = to_base_units(start_amount, decimals)?;
    let extra = to_base_units(&price_diff, decimals)?;
    Ok(PriceParameters { base_price, extra, payment_token })
}

/// The sale kind implied by a start and end amount
pub fn sale_kind(start_amount: &BigDecimal, end_amount: Option<&BigDecimal>) -> SaleKind {
    match end_amount {
        Some(end) if end != start_amount => SaleKind::DutchAuction,
        _ => SaleKind::FixedPrice,
    }
}

/// Returns `x * y / denominator`, rounded up
pub fn mul_div_up(x: U256, y: U256, denominator: U256) -> TraderResult<U256> {
    if denominator.is_zero() {
        return Err(TraderError::price("division by zero"));
    }

    let product = x.checked_mul(y).ok_or_else(|| TraderError::price("price overflow"))?;
    let quotient = product / denominator;
    if (product % denominator).is_zero() {
        Ok(quotient)
    } else {
        quotient.checked_add(U256::from(1)).ok_or_else(|| TraderError::price("price overflow"))
    }
}

/// The exchange's settlement price for an order at time `at`
///
/// The auction price moves from `base_price` toward `base_price - extra` for
/// sells and `base_price + extra` for buys; `at` is clamped to the window
pub fn current_price(order: &UnhashedOrder, at: u64) -> TraderResult<U256> {
    match order.sale_kind {
        SaleKind::FixedPrice => Ok(order.base_price),
        SaleKind::DutchAuction => {
            if order.expiration_time.is_zero() || order.expiration_time <= order.listing_time {
                return Err(TraderError::price("auction orders need a listing window"));
            }

            let at = U256::from(at).clamp(order.listing_time, order.expiration_time);
            let elapsed = at - order.listing_time;
            let duration = order.expiration_time - order.listing_time;
            let diff = order
                .extra
                .checked_mul(elapsed)
                .ok_or_else(|| TraderError::price("price overflow"))?
                / duration;

            match order.side {
                OrderSide::Sell => Ok(order.base_price.saturating_sub(diff)),
                OrderSide::Buy => order
                    .base_price
                    .checked_add(diff)
                    .ok_or_else(|| TraderError::price("price overflow")),
            }
        },
    }
}

/// The amount a taker must pay to fill `sell` at local time `now`
///
/// Auction prices are evaluated slightly in the past so the price the
/// transaction lands at is no higher than quoted. The taker relayer fee is
/// added and the total rounded up.
pub fn required_payment_for_sell_order(sell: &UnhashedOrder, now: u64) -> TraderResult<U256> {
    let at = now.saturating_sub(AUCTION_BACKTRACK_SECS);
    let exact_price = current_price(sell, at)?;

    let denominator = U256::from(INVERSE_BASIS_POINT);
    let multiplier = denominator
        .checked_add(sell.taker_relayer_fee)
        .ok_or_else(|| TraderError::price("fee overflow"))?;
    mul_div_up(exact_price, multiplier, denominator)
}
