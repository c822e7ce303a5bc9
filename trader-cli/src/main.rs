//! Entrypoint for the Wyvern trading client

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::needless_pass_by_ref_mut)]
#![deny(unsafe_code)]
#![deny(clippy::uninlined_format_args)]

use std::sync::Arc;

use alloy_primitives::Address;
use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::info;
use wyvern_api::{Asset, OrderJson, OrderQuery, OrderSide};
use wyvern_trader::{
    builder::SellOrderParams,
    gateway::AlloyGateway,
    network::NetworkConfig,
    orderbook::{OrderbookClient, OrderbookClientConfig, DEFAULT_PAGE_SIZE},
    settlement::{SettlementConfig, SettlementEngine},
    signing::Keyring,
};

use crate::cli::{Cli, Command};

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.setup_logging();

    let orderbook = OrderbookClient::new(OrderbookClientConfig {
        base_url: cli.orderbook_url.clone(),
        api_key: cli.api_key.clone(),
        page_size: DEFAULT_PAGE_SIZE,
    })?;

    match &cli.command {
        Command::Orders { token_address, token_id, side, page } => {
            let query = OrderQuery {
                asset_contract_address: Some(*token_address),
                token_id: *token_id,
                side: side.map(OrderSide::from),
                ..Default::default()
            };
            let result = orderbook.get_orders(&query, *page).await?;

            let orders: Vec<OrderJson> = result.orders.iter().map(OrderJson::from).collect();
            println!("{}", serde_json::to_string_pretty(&orders)?);
            info!("page {page} of {} orders", result.count);
        },
        Command::Sell {
            token_address,
            token_id,
            schema,
            price,
            end_price,
            quantity,
            expiration_time,
            payment_token,
            post,
        } => {
            let (engine, account) = setup_engine(&cli, orderbook)?;
            let params = SellOrderParams {
                asset: Asset::new(*token_address, *token_id, (*schema).into()),
                account,
                start_amount: price.clone(),
                end_amount: end_price.clone(),
                quantity: *quantity,
                expiration_time: *expiration_time,
                listing_time: None,
                payment_token: payment_token.unwrap_or(Address::ZERO),
                extra_bounty_basis_points: 0,
                buyer: Address::ZERO,
            };

            let mut order = engine.create_sell_order(params).await?;
            if *post {
                order = engine.post_order(&order).await?;
            }
            println!("{}", serde_json::to_string_pretty(&OrderJson::from(&order))?);
        },
        Command::Fulfill { token_address, token_id, side, recipient, referrer } => {
            let (engine, account) = setup_engine(&cli, orderbook)?;
            let query = OrderQuery {
                asset_contract_address: Some(*token_address),
                token_id: Some(*token_id),
                side: Some((*side).into()),
                ..Default::default()
            };
            let order = engine.orderbook()?.get_order(&query).await?;

            let tx_hash = engine.fulfill_order(&order, account, *recipient, *referrer).await?;
            println!("{tx_hash:#x}");
        },
    }

    Ok(())
}

// -----------
// | Helpers |
// -----------

/// Connect to the node and build a settlement engine over the CLI's keys
///
/// Returns the engine and the account to trade from
fn setup_engine(
    cli: &Cli,
    orderbook: OrderbookClient,
) -> Result<(SettlementEngine<Keyring>, Address)> {
    let keyring = Keyring::from_private_keys(&cli.private_keys)?;
    let account = select_account(cli.account, &keyring)?;
    let network = NetworkConfig::for_network(cli.network)?;
    let wallet = keyring.ethereum_wallet()?;

    let gateway = AlloyGateway::connect(&cli.rpc_url, network, Some(wallet))?;
    let engine = SettlementEngine::new(Arc::new(gateway), keyring, SettlementConfig::default())?
        .with_orderbook(orderbook);
    Ok((engine, account))
}

/// The account to trade from
fn select_account(account: Option<Address>, keyring: &Keyring) -> Result<Address> {
    let accounts = keyring.accounts();
    match (account, accounts.as_slice()) {
        (Some(account), _) if accounts.contains(&account) => Ok(account),
        (Some(account), _) => Err(anyhow!("no private key given for {account}")),
        (None, [account]) => Ok(*account),
        (None, []) => Err(anyhow!("no private keys given")),
        (None, _) => Err(anyhow!("several private keys given; choose one with --account")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The first well-known development key
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    /// A second development key
    const DEV_KEY_2: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

    #[test]
    fn test_select_account() {
        let one = Keyring::from_private_keys(&[DEV_KEY]).unwrap();
        let only = one.accounts()[0];
        assert_eq!(select_account(None, &one).unwrap(), only);
        assert!(select_account(Some(Address::repeat_byte(1)), &one).is_err());

        let two = Keyring::from_private_keys(&[DEV_KEY, DEV_KEY_2]).unwrap();
        assert!(select_account(None, &two).is_err());
        assert_eq!(select_account(Some(only), &two).unwrap(), only);

        assert!(select_account(None, &Keyring::new()).is_err());
    }

    #[test]
    fn test_parse_sell() {
        let cli = Cli::try_parse_from([
            "wyvern-trader",
            "--rpc-url",
            "http://localhost:8545",
            "--network",
            "rinkeby",
            "sell",
            "--token-address",
            "0x4bf010f1b9beda5450a8dd702ed602a104ff65ee",
            "--token-id",
            "5465",
            "--price",
            "0.1",
        ])
        .unwrap();

        assert_eq!(cli.network, wyvern_trader::network::Network::Rinkeby);
        assert!(matches!(cli.command, Command::Sell { post: false, .. }));
    }
}
