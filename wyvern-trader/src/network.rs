//! Per-network contract addresses

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use alloy_primitives::{address, Address};

use crate::error::TraderError;

/// The address of the Multicall3 contract, identical on every network
pub const MULTICALL3_ADDRESS: Address = address!("cA11bde05977b3631167028862bE2a173976CA11");

/// The networks the trader knows addresses for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    /// Ethereum mainnet
    Main,
    /// The Rinkeby testnet
    Rinkeby,
    /// The BNB smart chain testnet
    BscTestnet,
}

impl Network {
    /// The EIP-155 chain id of the network
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Main => 1,
            Network::Rinkeby => 4,
            Network::BscTestnet => 97,
        }
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Network::Main => "main",
            Network::Rinkeby => "rinkeby",
            Network::BscTestnet => "bsc-testnet",
        };
        f.write_str(name)
    }
}

impl FromStr for Network {
    type Err = TraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "main" | "mainnet" => Ok(Network::Main),
            "rinkeby" => Ok(Network::Rinkeby),
            "bsc-testnet" | "bsc_test" => Ok(Network::BscTestnet),
            other => Err(TraderError::config(format!("unknown network: {other}"))),
        }
    }
}

/// The contract addresses a trader needs on one network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// The network
    pub network: Network,
    /// The EIP-155 chain id
    pub chain_id: u64,
    /// The exchange contract
    pub exchange: Address,
    /// The registry of user proxies
    pub proxy_registry: Address,
    /// The proxy that moves ERC-20 payments on the exchange's behalf
    pub token_transfer_proxy: Address,
    /// The contract that bundles several calls into one
    pub atomicizer: Address,
    /// The merkle validator used for criteria transfers, if deployed
    pub merkle_validator: Option<Address>,
    /// Wrapped ether
    pub weth: Address,
    /// The Multicall3 contract used for batched fills
    pub multicall: Address,
}

/// The addresses known for a network, any of which may be missing
struct KnownAddresses {
    /// The exchange contract
    exchange: Option<Address>,
    /// The proxy registry
    proxy_registry: Option<Address>,
    /// The token transfer proxy
    token_transfer_proxy: Option<Address>,
    /// The atomicizer
    atomicizer: Option<Address>,
    /// The merkle validator
    merkle_validator: Option<Address>,
    /// Wrapped ether
    weth: Option<Address>,
}

impl KnownAddresses {
    /// The addresses recorded for a network
    fn for_network(network: Network) -> Self {
        match network {
            Network::Main => Self {
                exchange: Some(address!("7f268357A8c2552623316e2562D90e642bB538E5")),
                proxy_registry: Some(address!("a5409ec958c83c3f309868babaca7c86dcb077c1")),
                token_transfer_proxy: Some(address!("E5c783EE536cf5E63E792988335c4255169be4E1")),
                atomicizer: Some(address!("c99f70bfd82fb7c8f8191fdfbfb735606b15e5c5")),
                merkle_validator: Some(address!("baf2127b49fc93cbca6269fade0f7f31df4c88a7")),
                weth: Some(address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2")),
            },
            Network::Rinkeby => Self {
                exchange: Some(address!("2d1FBe9075e01bB16dc4C5c209be8CEBb3db1eB1")),
                proxy_registry: Some(address!("Eb3542517464701cD4d42B5bDC49c1cB21d83331")),
                token_transfer_proxy: Some(address!("db043586cc1a0a784329733f5caa39f2167d8c0f")),
                atomicizer: Some(address!("1d9D0D4f3C47187CD483b11E1556aEA838f0270d")),
                merkle_validator: Some(address!("35411178dfF431Be291e95bF4925b9932AC07785")),
                weth: Some(address!("c778417E063141139Fce010982780140Aa0cD5Ab")),
            },
            Network::BscTestnet => Self {
                exchange: Some(address!("b90b9A8e129D359F80F7b6fccf503B525e1B6455")),
                proxy_registry: Some(address!("6CEa74418A513C95D0efa4D75349Cb1f6ee7A335")),
                token_transfer_proxy: None,
                atomicizer: Some(address!("443EF018e182d409bcf7f794d409bCea4C73C2C7")),
                merkle_validator: Some(address!("078b9259b4dc543eCa8F85A70d4635F403238D21")),
                weth: None,
            },
        }
    }
}

/// Unwrap a known address or name the missing contract
fn require(addr: Option<Address>, name: &str, network: Network) -> Result<Address, TraderError> {
    addr.ok_or_else(|| TraderError::config(format!("no {name} address configured for {network}")))
}

impl NetworkConfig {
    /// The deployed addresses for a network
    ///
    /// Fails if any required contract is missing for the network
    pub fn for_network(network: Network) -> Result<Self, TraderError> {
        let known = KnownAddresses::for_network(network);
        Ok(Self {
            network,
            chain_id: network.chain_id(),
            exchange: require(known.exchange, "exchange", network)?,
            proxy_registry: require(known.proxy_registry, "proxy registry", network)?,
            token_transfer_proxy: require(
                known.token_transfer_proxy,
                "token transfer proxy",
                network,
            )?,
            atomicizer: require(known.atomicizer, "atomicizer", network)?,
            merkle_validator: known.merkle_validator,
            weth: require(known.weth, "weth", network)?,
            multicall: MULTICALL3_ADDRESS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_config() {
        let config = NetworkConfig::for_network(Network::Main).unwrap();
        assert_eq!(config.chain_id, 1);
        assert_eq!(config.exchange, address!("7f268357A8c2552623316e2562D90e642bB538E5"));
        assert!(config.merkle_validator.is_some());
    }

    #[test]
    fn test_missing_addresses_fail_at_construction() {
        let err = NetworkConfig::for_network(Network::BscTestnet).unwrap_err();
        assert!(matches!(err, TraderError::Config(_)));
    }

    #[test]
    fn test_parse_network() {
        assert_eq!("Mainnet".parse::<Network>().unwrap(), Network::Main);
        assert_eq!("rinkeby".parse::<Network>().unwrap(), Network::Rinkeby);
        assert!("goerli".parse::<Network>().is_err());
    }
}
