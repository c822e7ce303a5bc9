//! The small enums carried on every order
//!
//! On the wire these are plain integers matching the exchange contract's
//! `uint8` encoding.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::error::ApiTypeError;

/// Implements the `u8` conversions used for the wire format of an enum
macro_rules! impl_u8_enum {
    ($name:ident, $kind:literal, { $($variant:ident = $val:literal),+ $(,)? }) => {
        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value as u8
            }
        }

        impl TryFrom<u8> for $name {
            type Error = ApiTypeError;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $($val => Ok(Self::$variant),)+
                    _ => Err(ApiTypeError::InvalidDiscriminant { kind: $kind, value }),
                }
            }
        }
    };
}

/// Which side of the book an order sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OrderSide {
    /// An offer to buy
    Buy = 0,
    /// A listing
    Sell = 1,
}
impl_u8_enum!(OrderSide, "side", { Buy = 0, Sell = 1 });

impl OrderSide {
    /// The side a counter-order must take
    pub fn opposite(self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

impl Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => f.write_str("buy"),
            OrderSide::Sell => f.write_str("sell"),
        }
    }
}

/// How the sale price evolves over the listing window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum SaleKind {
    /// A constant price
    FixedPrice = 0,
    /// A price that moves linearly between listing and expiration
    DutchAuction = 1,
}
impl_u8_enum!(SaleKind, "saleKind", { FixedPrice = 0, DutchAuction = 1 });

/// How relayer and protocol fees are charged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum FeeMethod {
    /// Fees paid in the protocol token
    ProtocolFee = 0,
    /// Fees split out of the payment token
    SplitFee = 1,
}
impl_u8_enum!(FeeMethod, "feeMethod", { ProtocolFee = 0, SplitFee = 1 });

/// How the user's proxy invokes the order's target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum HowToCall {
    /// A regular `CALL`
    Call = 0,
    /// A `DELEGATECALL` into a helper contract
    DelegateCall = 1,
}
impl_u8_enum!(HowToCall, "howToCall", { Call = 0, DelegateCall = 1 });

#[cfg(test)]
mod tests {
    use super::*;

    /// Enums serialize as their contract discriminants
    #[test]
    fn test_enum_wire_values() {
        assert_eq!(serde_json::to_string(&OrderSide::Sell).unwrap(), "1");
        assert_eq!(serde_json::to_string(&HowToCall::DelegateCall).unwrap(), "1");
        let kind: SaleKind = serde_json::from_str("1").unwrap();
        assert_eq!(kind, SaleKind::DutchAuction);
    }

    /// Out of range discriminants are rejected
    #[test]
    fn test_invalid_discriminant() {
        let err = FeeMethod::try_from(7u8).unwrap_err();
        assert_eq!(err, ApiTypeError::InvalidDiscriminant { kind: "feeMethod", value: 7 });
        assert!(serde_json::from_str::<OrderSide>("2").is_err());
    }

    #[test]
    fn test_opposite_side() {
        assert_eq!(OrderSide::Buy.opposite(), OrderSide::Sell);
        assert_eq!(OrderSide::Sell.opposite(), OrderSide::Buy);
    }
}
