//! Query and response types for the order listing endpoint

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{serialization::address_to_lower_hex, OrderJson, OrderSide, SaleKind};

/// Filters for listing orders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQuery {
    /// Only orders made by this account
    pub maker: Option<Address>,
    /// Only orders reserved for this taker
    pub taker: Option<Address>,
    /// Only orders on this side
    pub side: Option<OrderSide>,
    /// Only orders of this sale kind
    pub sale_kind: Option<SaleKind>,
    /// Only orders for assets in this contract
    pub asset_contract_address: Option<Address>,
    /// Only orders paid in this token
    pub payment_token_address: Option<Address>,
    /// Only orders for this token id
    pub token_id: Option<U256>,
    /// Only orders for any of these token ids
    pub token_ids: Vec<U256>,
    /// Only orders listed after this unix time
    pub listed_after: Option<u64>,
    /// Only orders listed before this unix time
    pub listed_before: Option<u64>,
}

impl OrderQuery {
    /// Flatten the query into URL parameters
    ///
    /// `token_ids` is repeated once per value, so this can't be expressed as a
    /// plain urlencoded struct
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let mut push = |key: &str, value: String| pairs.push((key.to_string(), value));

        if let Some(maker) = &self.maker {
            push("maker", address_to_lower_hex(maker));
        }
        if let Some(taker) = &self.taker {
            push("taker", address_to_lower_hex(taker));
        }
        if let Some(side) = self.side {
            push("side", u8::from(side).to_string());
        }
        if let Some(sale_kind) = self.sale_kind {
            push("sale_kind", u8::from(sale_kind).to_string());
        }
        if let Some(addr) = &self.asset_contract_address {
            push("asset_contract_address", address_to_lower_hex(addr));
        }
        if let Some(addr) = &self.payment_token_address {
            push("payment_token_address", address_to_lower_hex(addr));
        }
        if let Some(token_id) = &self.token_id {
            push("token_id", token_id.to_string());
        }
        for token_id in &self.token_ids {
            push("token_ids", token_id.to_string());
        }
        if let Some(after) = self.listed_after {
            push("listed_after", after.to_string());
        }
        if let Some(before) = self.listed_before {
            push("listed_before", before.to_string());
        }

        pairs
    }
}

/// A page of orders returned by the orderbook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderbookResponse {
    /// The orders on this page
    pub orders: Vec<OrderJson>,
    /// The total number of orders matching the query
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs() {
        let query = OrderQuery {
            side: Some(OrderSide::Sell),
            asset_contract_address: Some(
                "0xBC4CA0EDA7647A8AB7C2061C2E118A18A936F13D".parse().unwrap(),
            ),
            token_ids: vec![U256::from(1u64), U256::from(2u64)],
            ..Default::default()
        };

        let pairs = query.to_query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("side".to_string(), "1".to_string()),
                (
                    "asset_contract_address".to_string(),
                    "0xbc4ca0eda7647a8ab7c2061c2e118a18a936f13d".to_string()
                ),
                ("token_ids".to_string(), "1".to_string()),
                ("token_ids".to_string(), "2".to_string()),
            ]
        );
    }
}
