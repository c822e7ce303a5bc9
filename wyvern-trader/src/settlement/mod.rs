//! Settlement of orders on-chain
//!
//! The [`SettlementEngine`] owns the pipeline from trade parameters to a
//! confirmed match: it builds orders, grants the approvals the exchange
//! needs, signs, validates the pair and submits `atomicMatch_`. Every
//! transaction is confirmed before the next step starts.

use std::{
    fmt::{self, Display},
    sync::Arc,
    time::Duration,
};

use alloy::{network::TransactionBuilder, rpc::types::TransactionRequest};
use alloy_primitives::{Address, Bytes, TxHash};
use tracing::info;
use wyvern_api::{Asset, AssetSelection, OrderMetadata};

use crate::{
    builder::OrderBuilder,
    constants::{
        GAS_INCREASE_PERCENT, MATCH_VALIDATION_ATTEMPTS, MATCH_VALIDATION_DELAY,
        PROXY_POLL_ATTEMPTS, PROXY_POLL_DELAY,
    },
    encoding::SchemaRegistry,
    error::{TraderError, TraderResult},
    gateway::ContractGateway,
    orderbook::OrderbookClient,
    signing::{OrderSigner, SignerResolver},
};

mod approvals;
mod atomic_match;
mod batch;
mod orders;

/// The stages of one settlement attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementState {
    /// The orders are built
    Built,
    /// The account's approvals are in place
    Approved,
    /// The pair passed match validation
    Validated,
    /// The match transaction was sent
    Submitted,
    /// The match transaction was mined
    Confirmed,
    /// The attempt failed
    Failed,
}

impl Display for SettlementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Built => "built",
            Self::Approved => "approved",
            Self::Validated => "validated",
            Self::Submitted => "submitted",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Retry and polling policy for settlement
#[derive(Debug, Clone, Copy)]
pub struct SettlementConfig {
    /// How many times match validation is attempted
    pub match_validation_attempts: usize,
    /// The delay between match validation attempts
    pub match_validation_delay: Duration,
    /// How many times the proxy registry is polled after registration
    pub proxy_poll_attempts: usize,
    /// The delay between proxy registry polls
    pub proxy_poll_delay: Duration,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            match_validation_attempts: MATCH_VALIDATION_ATTEMPTS,
            match_validation_delay: MATCH_VALIDATION_DELAY,
            proxy_poll_attempts: PROXY_POLL_ATTEMPTS,
            proxy_poll_delay: PROXY_POLL_DELAY,
        }
    }
}

/// Builds, approves, signs and settles orders for a set of accounts
pub struct SettlementEngine<R: SignerResolver> {
    /// The chain
    gateway: Arc<dyn ContractGateway>,
    /// Order construction for the gateway's network
    builder: OrderBuilder,
    /// Order signing
    signer: OrderSigner<R>,
    /// The orderbook orders are posted to, if any
    orderbook: Option<OrderbookClient>,
    /// Retry and polling policy
    config: SettlementConfig,
}

impl<R: SignerResolver> SettlementEngine<R> {
    /// Create an engine with the standard asset schemas
    pub fn new(
        gateway: Arc<dyn ContractGateway>,
        resolver: R,
        config: SettlementConfig,
    ) -> TraderResult<Self> {
        let builder = OrderBuilder::new(gateway.network().clone(), SchemaRegistry::standard()?);
        Ok(Self { gateway, builder, signer: OrderSigner::new(resolver), orderbook: None, config })
    }

    /// Post created orders to an orderbook
    pub fn with_orderbook(mut self, orderbook: OrderbookClient) -> Self {
        self.orderbook = Some(orderbook);
        self
    }

    /// The engine's order builder
    pub fn builder(&self) -> &OrderBuilder {
        &self.builder
    }

    /// The engine's gateway
    pub fn gateway(&self) -> &dyn ContractGateway {
        self.gateway.as_ref()
    }

    /// The engine's orderbook client, if configured
    pub fn orderbook(&self) -> TraderResult<&OrderbookClient> {
        self.orderbook.as_ref().ok_or_else(|| TraderError::config("no orderbook configured"))
    }

    /// Estimate gas for a transaction, pad it, and send it
    async fn send_with_gas_estimate(&self, tx: TransactionRequest) -> TraderResult<TxHash> {
        let estimate =
            self.gateway.estimate_gas(&tx).await.map_err(TraderError::gas_estimation)?;
        let gas_limit = pad_gas_estimate(estimate);
        info!("sending transaction with gas limit {gas_limit}");

        let tx = tx.with_gas_limit(gas_limit);
        self.gateway.send_transaction(tx).await.map_err(TraderError::submission)
    }
}

/// Pad a gas estimate by the safety margin, rounding up
pub fn pad_gas_estimate(estimate: u64) -> u64 {
    let padded = u128::from(estimate) * u128::from(GAS_INCREASE_PERCENT);
    u64::try_from(padded.div_ceil(100)).unwrap_or(u64::MAX)
}

/// A transaction from `from` calling `to` with `input`
fn call_tx(from: Address, to: Address, input: Bytes) -> TransactionRequest {
    TransactionRequest::default().with_from(from).with_to(to).with_input(input)
}

/// The assets an order trades, each tagged with its schema
fn schema_tagged_assets(metadata: &OrderMetadata) -> Vec<Asset> {
    match &metadata.assets {
        AssetSelection::Single { asset, schema } => {
            vec![Asset { schema_name: Some(*schema), ..asset.clone() }]
        },
        AssetSelection::Bundle(bundle) => bundle
            .assets
            .iter()
            .enumerate()
            .map(|(i, asset)| {
                let schema = bundle.schemas.get(i).copied().unwrap_or_else(|| asset.schema());
                Asset { schema_name: Some(schema), ..asset.clone() }
            })
            .collect(),
    }
}

#[cfg(test)]
pub(crate) mod test_helpers {
    //! Engine fixtures shared across settlement tests

    use std::time::Duration;

    use alloy::signers::local::PrivateKeySigner;

    use super::*;
    use crate::{
        gateway::mock::MockGateway,
        network::{Network, NetworkConfig},
        signing::Keyring,
    };

    /// A settlement policy without delays
    pub fn fast_config() -> SettlementConfig {
        SettlementConfig {
            match_validation_delay: Duration::ZERO,
            proxy_poll_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    /// An engine over a mock gateway, with one random account in its keyring
    pub fn engine() -> (SettlementEngine<Keyring>, MockGateway, Address) {
        let network = NetworkConfig::for_network(Network::Rinkeby).unwrap();
        let gateway = MockGateway::new(network);

        let mut keyring = Keyring::new();
        let account = keyring.insert(PrivateKeySigner::random());

        let engine =
            SettlementEngine::new(Arc::new(gateway.clone()), keyring, fast_config()).unwrap();
        (engine, gateway, account)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;
    use wyvern_api::{Bundle, SchemaName};

    use super::*;

    #[test]
    fn test_pad_gas_estimate() {
        assert_eq!(pad_gas_estimate(100_000), 101_000);
        assert_eq!(pad_gas_estimate(150), 152);
        assert_eq!(pad_gas_estimate(0), 0);
    }

    #[test]
    fn test_bundle_assets_take_bundle_schemas() {
        let token = Address::repeat_byte(0x01);
        let bundle = Bundle {
            assets: vec![
                Asset::new(token, U256::from(1u64), SchemaName::Erc721),
                Asset { schema_name: None, ..Asset::new(token, U256::from(2u64), SchemaName::Erc721) },
            ],
            schemas: vec![SchemaName::Erc721, SchemaName::Erc1155],
            name: None,
            description: None,
            external_link: None,
        };

        let assets = schema_tagged_assets(&OrderMetadata::bundle(bundle));
        assert_eq!(assets[0].schema(), SchemaName::Erc721);
        assert_eq!(assets[1].schema(), SchemaName::Erc1155);
    }
}
