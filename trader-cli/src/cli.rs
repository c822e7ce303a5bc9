//! The command line interface

use alloy_primitives::{Address, U256};
use bigdecimal::BigDecimal;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer,
};
use wyvern_api::{OrderSide, SchemaName, API_BASE_MAINNET};
use wyvern_trader::network::Network;

/// List and fill orders on the Wyvern exchange
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    // --- Chain --- //
    /// The RPC URL of an Ethereum node
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: String,
    /// The network the exchange is deployed on
    #[arg(long, env = "NETWORK", default_value = "main")]
    pub network: Network,
    /// Hex-encoded private keys, comma separated
    #[arg(long, env = "PRIVATE_KEYS", value_delimiter = ',', hide_env_values = true)]
    pub private_keys: Vec<String>,
    /// The account to trade from, required when several keys are given
    #[arg(long, env = "ACCOUNT")]
    pub account: Option<Address>,

    // --- Orderbook --- //
    /// The base URL of the orderbook API
    #[arg(long, env = "ORDERBOOK_URL", default_value = API_BASE_MAINNET)]
    pub orderbook_url: String,
    /// The orderbook API key
    #[arg(long, env = "ORDERBOOK_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    // --- Telemetry --- //
    /// Whether to emit JSON-formatted logs
    #[arg(long, env = "JSON_LOGS")]
    pub json_logs: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The commands the client runs
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List an asset for sale
    Sell {
        /// The asset's contract
        #[arg(long)]
        token_address: Address,
        /// The asset's token id
        #[arg(long)]
        token_id: U256,
        /// The asset's schema
        #[arg(long, value_enum, default_value_t = SchemaArg::Erc721)]
        schema: SchemaArg,
        /// The price in whole units of the payment token
        #[arg(long)]
        price: BigDecimal,
        /// The final price of a declining auction
        #[arg(long)]
        end_price: Option<BigDecimal>,
        /// The number of units to sell
        #[arg(long, default_value_t = U256::from(1u64))]
        quantity: U256,
        /// When the listing expires, in unix seconds
        #[arg(long)]
        expiration_time: Option<u64>,
        /// The payment token, the native coin when omitted
        #[arg(long)]
        payment_token: Option<Address>,
        /// Post the signed listing to the orderbook
        #[arg(long)]
        post: bool,
    },
    /// Fill the first order on the orderbook for an asset
    Fulfill {
        /// The asset's contract
        #[arg(long)]
        token_address: Address,
        /// The asset's token id
        #[arg(long)]
        token_id: U256,
        /// The side of the order to fill
        #[arg(long, value_enum, default_value_t = SideArg::Sell)]
        side: SideArg,
        /// The account that receives the asset
        #[arg(long)]
        recipient: Option<Address>,
        /// The account credited for the referral
        #[arg(long)]
        referrer: Option<Address>,
    },
    /// Print one page of orders for an asset contract
    Orders {
        /// The asset's contract
        #[arg(long)]
        token_address: Address,
        /// Only orders for this token id
        #[arg(long)]
        token_id: Option<U256>,
        /// Only orders on this side
        #[arg(long, value_enum)]
        side: Option<SideArg>,
        /// The page to fetch, counting from 1
        #[arg(long, default_value_t = 1)]
        page: u64,
    },
}

/// An asset schema on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SchemaArg {
    /// An ERC20 token
    Erc20,
    /// An ERC721 token
    Erc721,
    /// An ERC1155 token
    Erc1155,
}

impl From<SchemaArg> for SchemaName {
    fn from(arg: SchemaArg) -> Self {
        match arg {
            SchemaArg::Erc20 => SchemaName::Erc20,
            SchemaArg::Erc721 => SchemaName::Erc721,
            SchemaArg::Erc1155 => SchemaName::Erc1155,
        }
    }
}

/// An order side on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SideArg {
    /// Offers
    Buy,
    /// Listings
    Sell,
}

impl From<SideArg> for OrderSide {
    fn from(arg: SideArg) -> Self {
        match arg {
            SideArg::Buy => OrderSide::Buy,
            SideArg::Sell => OrderSide::Sell,
        }
    }
}

impl Cli {
    /// Configure the logging subscriber
    pub fn setup_logging(&self) {
        let filter =
            EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy();
        let layer = if self.json_logs {
            fmt::layer().with_file(true).with_line_number(true).json().flatten_event(true).boxed()
        } else {
            fmt::layer().with_target(false).boxed()
        };

        tracing_subscriber::registry().with(filter).with(layer).init();
    }
}
