//! API types for the orderbook

pub mod asset;
pub mod enums;
pub mod order;
pub mod query;

pub use asset::*;
pub use enums::*;
pub use order::*;
pub use query::*;

/// The version of the orderbook API
pub const ORDERBOOK_VERSION: u8 = 1;
/// The path prefix of the orderbook routes
pub const ORDERBOOK_PATH: &str = "/wyvern/v1";
/// The route for listing orders
pub const ORDERS_ROUTE: &str = "/wyvern/v1/orders/";
/// The route for posting an order
pub const POST_ORDER_ROUTE: &str = "/wyvern/v1/orders/post/";
/// The default orderbook base URL
pub const API_BASE_MAINNET: &str = "https://api.opensea.io";
