//! A contract gateway backed by an alloy provider

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
};
use alloy_primitives::{Address, TxHash, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use tracing::{info, instrument};
use url::Url;

use super::{
    abis::{
        IProxyRegistry::IProxyRegistryInstance, IWyvernExchange::IWyvernExchangeInstance,
        IERC1155, IERC20, IERC721,
    },
    args::{
        order_calldata_can_match_call, orders_can_match_call, validate_order_call,
        validate_order_parameters_call,
    },
    ContractGateway, GatewayError, GatewayResult,
};
use crate::{
    network::NetworkConfig,
    order::{Order, UnhashedOrder},
};

/// A gateway that sends calls to a node over HTTP
#[derive(Clone)]
pub struct AlloyGateway {
    /// The network's contract addresses
    network: NetworkConfig,
    /// The shared provider, signing with the configured wallet if any
    provider: DynProvider,
    /// The exchange contract
    exchange: IWyvernExchangeInstance<DynProvider>,
    /// The proxy registry contract
    registry: IProxyRegistryInstance<DynProvider>,
}

impl AlloyGateway {
    /// Connect to a node
    ///
    /// Without a wallet the gateway can read but not send transactions
    pub fn connect(
        rpc_url: &str,
        network: NetworkConfig,
        wallet: Option<EthereumWallet>,
    ) -> GatewayResult<Self> {
        let url = Url::parse(rpc_url).map_err(GatewayError::setup)?;
        let provider = match wallet {
            Some(wallet) => DynProvider::new(ProviderBuilder::new().wallet(wallet).connect_http(url)),
            None => DynProvider::new(ProviderBuilder::new().connect_http(url)),
        };

        Ok(Self::from_provider(provider, network))
    }

    /// Create a gateway over an existing provider
    pub fn from_provider(provider: DynProvider, network: NetworkConfig) -> Self {
        let exchange = IWyvernExchangeInstance::new(network.exchange, provider.clone());
        let registry = IProxyRegistryInstance::new(network.proxy_registry, provider.clone());
        Self { network, provider, exchange, registry }
    }

    /// Get a clone of the shared provider
    pub fn provider(&self) -> DynProvider {
        self.provider.clone()
    }

    /// Make a read-only call to the exchange and decode a boolean result
    async fn call_exchange<C: SolCall<Return = bool>>(&self, call: C) -> GatewayResult<bool> {
        let tx = TransactionRequest::default()
            .with_to(self.network.exchange)
            .with_input(call.abi_encode());
        let ret = self.provider.call(tx).await?;
        C::abi_decode_returns(&ret).map_err(GatewayError::contract_interaction)
    }
}

#[async_trait]
impl ContractGateway for AlloyGateway {
    fn network(&self) -> &NetworkConfig {
        &self.network
    }

    async fn proxies(&self, owner: Address) -> GatewayResult<Address> {
        Ok(self.registry.proxies(owner).call().await?)
    }

    async fn nonces(&self, maker: Address) -> GatewayResult<U256> {
        Ok(self.exchange.nonces(maker).call().await?)
    }

    async fn validate_order_parameters(&self, order: &UnhashedOrder) -> GatewayResult<bool> {
        self.call_exchange(validate_order_parameters_call(order)).await
    }

    async fn validate_order(&self, order: &Order) -> GatewayResult<bool> {
        self.call_exchange(validate_order_call(order)).await
    }

    async fn orders_can_match(&self, buy: &Order, sell: &Order) -> GatewayResult<bool> {
        self.call_exchange(orders_can_match_call(buy, sell)).await
    }

    async fn order_calldata_can_match(&self, buy: &Order, sell: &Order) -> GatewayResult<bool> {
        self.call_exchange(order_calldata_can_match_call(buy, sell)).await
    }

    async fn erc20_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> GatewayResult<U256> {
        let erc20 = IERC20::new(token, self.provider.clone());
        Ok(erc20.allowance(owner, spender).call().await?)
    }

    async fn erc20_balance(&self, token: Address, owner: Address) -> GatewayResult<U256> {
        let erc20 = IERC20::new(token, self.provider.clone());
        Ok(erc20.balanceOf(owner).call().await?)
    }

    async fn is_approved_for_all(
        &self,
        token: Address,
        owner: Address,
        operator: Address,
    ) -> GatewayResult<bool> {
        let nft = IERC721::new(token, self.provider.clone());
        Ok(nft.isApprovedForAll(owner, operator).call().await?)
    }

    async fn owner_of(&self, token: Address, token_id: U256) -> GatewayResult<Address> {
        let nft = IERC721::new(token, self.provider.clone());
        Ok(nft.ownerOf(token_id).call().await?)
    }

    async fn erc1155_balance(
        &self,
        token: Address,
        owner: Address,
        token_id: U256,
    ) -> GatewayResult<U256> {
        let multi = IERC1155::new(token, self.provider.clone());
        Ok(multi.balanceOf(owner, token_id).call().await?)
    }

    async fn native_balance(&self, owner: Address) -> GatewayResult<U256> {
        Ok(self.provider.get_balance(owner).await?)
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> GatewayResult<u64> {
        Ok(self.provider.estimate_gas(tx.clone()).await?)
    }

    #[instrument(skip_all, fields(to = ?tx.to))]
    async fn send_transaction(&self, tx: TransactionRequest) -> GatewayResult<TxHash> {
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(GatewayError::contract_interaction)?;
        let receipt = pending.get_receipt().await?;

        let tx_hash = receipt.transaction_hash;
        if !receipt.status() {
            return Err(GatewayError::Reverted(format!("{tx_hash:#x}")));
        }

        info!("transaction {tx_hash:#x} confirmed");
        Ok(tx_hash)
    }
}
