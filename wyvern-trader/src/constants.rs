//! Protocol constants

use std::time::Duration;

use alloy_primitives::{address, Address};

// ----------
// | Orders |
// ----------

/// The denominator of every basis-point fee
pub const INVERSE_BASIS_POINT: u64 = 10_000;
/// The default fee charged to buyers, in basis points
pub const DEFAULT_BUYER_FEE_BASIS_POINTS: u64 = 0;
/// The default fee charged to sellers, in basis points
pub const DEFAULT_SELLER_FEE_BASIS_POINTS: u64 = 250;
/// The part of the seller fee always reserved as a referral bounty
pub const PROTOCOL_SELLER_BOUNTY_BASIS_POINTS: u64 = 100;
/// The largest total bounty a seller may offer
pub const DEFAULT_MAX_BOUNTY: u64 = DEFAULT_SELLER_FEE_BASIS_POINTS;
/// The recipient of protocol relayer fees
pub const PROTOCOL_FEE_RECIPIENT: Address = address!("5b3256965e7c3cf26e11fcaf296dfc8807c01073");

/// The shortest window a new order may be listed for
pub const MIN_EXPIRATION_MINUTES: u64 = 15;
/// The furthest in the future a new order may expire
pub const MAX_EXPIRATION_MONTHS: u32 = 6;
/// How far in the past a default listing time is placed, absorbing clock skew
pub const LISTING_TIME_BUFFER_SECS: u64 = 100;
/// How far the Dutch auction price evaluation is moved back from the local
/// clock
pub const AUCTION_BACKTRACK_SECS: u64 = 30;

/// The decimals of every supported payment token
pub const DEFAULT_PAYMENT_TOKEN_DECIMALS: u32 = 18;

// -----------
// | EIP-712 |
// -----------

/// The EIP-712 domain name of the exchange
pub const EIP_712_WYVERN_DOMAIN_NAME: &str = "Wyvern Exchange Contract";
/// The EIP-712 domain version of the exchange
pub const EIP_712_WYVERN_DOMAIN_VERSION: &str = "2.3";

// --------------
// | Settlement |
// --------------

/// Gas estimates are multiplied by this many hundredths
pub const GAS_INCREASE_PERCENT: u64 = 101;
/// The longest provider error message surfaced to a caller
pub const MAX_ERROR_LENGTH: usize = 200;
/// How many times match validation is attempted
pub const MATCH_VALIDATION_ATTEMPTS: usize = 3;
/// The delay between match validation attempts
pub const MATCH_VALIDATION_DELAY: Duration = Duration::from_millis(500);
/// How many times the proxy registry is polled after registration
pub const PROXY_POLL_ATTEMPTS: usize = 10;
/// The delay between proxy registry polls
pub const PROXY_POLL_DELAY: Duration = Duration::from_secs(1);
