//! Listing window validation

use alloy_primitives::U256;
use chrono::{DateTime, Months};

use crate::{
    constants::{LISTING_TIME_BUFFER_SECS, MAX_EXPIRATION_MONTHS, MIN_EXPIRATION_MINUTES},
    error::{TraderError, TraderResult},
};

/// The listing window of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeParameters {
    /// When the order becomes valid
    pub listing_time: U256,
    /// When the order expires, or zero for never
    pub expiration_time: U256,
}

/// The latest expiration a new order may have, six calendar months from `now`
pub fn max_expiration_timestamp(now: u64) -> TraderResult<u64> {
    let now_secs = i64::try_from(now).map_err(TraderError::time_window)?;
    let max = DateTime::from_timestamp(now_secs, 0)
        .and_then(|dt| dt.checked_add_months(Months::new(MAX_EXPIRATION_MONTHS)))
        .ok_or_else(|| TraderError::time_window("timestamp out of range"))?;
    u64::try_from(max.timestamp()).map_err(TraderError::time_window)
}

/// Validate and default the listing window of an order
///
/// Counter-orders built for matching never expire, so they skip the
/// expiration checks
pub fn time_parameters(
    expiration_time: Option<u64>,
    listing_time: Option<u64>,
    is_matching_order: bool,
    now: u64,
) -> TraderResult<TimeParameters> {
    let max_expiration = max_expiration_timestamp(now)?;
    let expiration = match expiration_time {
        Some(expiration) => expiration,
        None if is_matching_order => 0,
        None => max_expiration,
    };

    if let Some(listing) = listing_time {
        if listing < now {
            return Err(TraderError::time_window("listing time cannot be in the past"));
        }
        if !is_matching_order && listing >= expiration {
            return Err(TraderError::time_window(
                "listing time must be before the expiration time",
            ));
        }
    }
    let listing = listing_time.unwrap_or_else(|| now.saturating_sub(LISTING_TIME_BUFFER_SECS));

    if !is_matching_order {
        if expiration == 0 {
            return Err(TraderError::time_window("expiration time cannot be 0"));
        }
        if expiration > max_expiration {
            return Err(TraderError::time_window(format!(
                "expiration time must not exceed {MAX_EXPIRATION_MONTHS} months from now"
            )));
        }
        let min_expiration = listing + MIN_EXPIRATION_MINUTES * 60;
        if expiration < min_expiration {
            return Err(TraderError::time_window(format!(
                "expiration time must be at least {MIN_EXPIRATION_MINUTES} minutes from the listing date"
            )));
        }
    }

    Ok(TimeParameters { listing_time: U256::from(listing), expiration_time: U256::from(expiration) })
}
