//! Proxy registration and token approvals

use std::collections::HashSet;

use alloy_primitives::{Address, TxHash, U256};
use alloy_sol_types::SolCall;
use tracing::{info, instrument, warn};
use wyvern_api::{Asset, SchemaName};

use super::{call_tx, SettlementEngine};
use crate::{
    error::{TraderError, TraderResult},
    gateway::abis::{
        IProxyRegistry::registerProxyCall, IERC20::approveCall, IERC721::setApprovalForAllCall,
    },
    signing::SignerResolver,
};

impl<R: SignerResolver> SettlementEngine<R> {
    /// The account's proxy, registering one if it has none
    ///
    /// After registering, the registry is polled until the proxy is visible
    #[instrument(skip(self))]
    pub async fn ensure_proxy(&self, account: Address) -> TraderResult<Address> {
        let proxy = self.gateway.proxies(account).await?;
        if proxy != Address::ZERO {
            return Ok(proxy);
        }

        info!("registering a proxy");
        let registry = self.gateway.network().proxy_registry;
        let tx = call_tx(account, registry, registerProxyCall {}.abi_encode().into());
        self.gateway.send_transaction(tx).await?;

        let attempts = self.config.proxy_poll_attempts;
        for attempt in 1..=attempts {
            let proxy = self.gateway.proxies(account).await?;
            if proxy != Address::ZERO {
                info!("proxy {proxy} registered");
                return Ok(proxy);
            }

            warn!("proxy not yet visible (attempt {attempt}/{attempts})");
            if attempt < attempts {
                tokio::time::sleep(self.config.proxy_poll_delay).await;
            }
        }

        Err(TraderError::config(format!("failed to register a proxy for {account}")))
    }

    /// Ensure the account's proxy may move every asset in `assets`
    ///
    /// NFT contracts get a blanket operator approval, each contract at most
    /// once per call. Fungible assets are approved for at least `quantity`.
    /// Returns the hashes of the approval transactions sent.
    #[instrument(skip(self, assets))]
    pub async fn approve_all(
        &self,
        assets: &[Asset],
        account: Address,
        quantity: U256,
    ) -> TraderResult<Vec<TxHash>> {
        let proxy = self.ensure_proxy(account).await?;

        let mut approved_contracts = HashSet::new();
        let mut txs = Vec::new();
        for asset in assets {
            match asset.schema() {
                SchemaName::Erc721 | SchemaName::Erc1155 => {
                    if !approved_contracts.insert(asset.token_address) {
                        continue;
                    }
                    let tx =
                        self.approve_non_fungible(account, asset.token_address, proxy).await?;
                    txs.extend(tx);
                },
                SchemaName::Erc20 => {
                    let tx = self
                        .approve_fungible_token(account, asset.token_address, quantity, Some(proxy))
                        .await?;
                    txs.extend(tx);
                },
                other => return Err(TraderError::UnsupportedSchema(other)),
            }
        }

        Ok(txs)
    }

    /// Grant `operator` a blanket approval on an NFT contract unless it has one
    async fn approve_non_fungible(
        &self,
        account: Address,
        token: Address,
        operator: Address,
    ) -> TraderResult<Option<TxHash>> {
        if self.gateway.is_approved_for_all(token, account, operator).await? {
            return Ok(None);
        }

        info!("approving {operator} for all tokens of {token}");
        let call = setApprovalForAllCall { operator, approved: true };
        let tx = call_tx(account, token, call.abi_encode().into());
        Ok(Some(self.gateway.send_transaction(tx).await?))
    }

    /// Ensure `spender` may move at least `minimum` of an ERC20
    ///
    /// The spender defaults to the network's token transfer proxy. An
    /// insufficient allowance is raised to the maximum so later trades need
    /// no approval; the approval's hash is returned.
    #[instrument(skip(self))]
    pub async fn approve_fungible_token(
        &self,
        account: Address,
        token: Address,
        minimum: U256,
        spender: Option<Address>,
    ) -> TraderResult<Option<TxHash>> {
        let spender = spender.unwrap_or(self.gateway.network().token_transfer_proxy);
        let allowance = self.gateway.erc20_allowance(token, account, spender).await?;
        if allowance >= minimum {
            return Ok(None);
        }

        info!("approving {spender} to spend {token}");
        let call = approveCall { spender, amount: U256::MAX };
        let tx = call_tx(account, token, call.abi_encode().into());
        Ok(Some(self.gateway.send_transaction(tx).await?))
    }
}
