//! A client for the off-chain orderbook

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{info, instrument};
use url::Url;
use wyvern_api::{
    OrderJson, OrderQuery, OrderbookResponse, API_BASE_MAINNET, ORDERS_ROUTE, POST_ORDER_ROUTE,
};

use crate::order::Order;

pub mod error;
use error::OrderbookError;

// -------------
// | Constants |
// -------------

/// The number of orders requested per page
pub const DEFAULT_PAGE_SIZE: u64 = 20;
/// Default timeout for requests to the orderbook
const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// The header carrying the API key
const API_KEY_HEADER: &str = "X-API-KEY";

// ---------
// | Types |
// ---------

/// The configuration options for the orderbook client
#[derive(Debug, Clone)]
pub struct OrderbookClientConfig {
    /// The base URL of the orderbook API
    pub base_url: String,
    /// An API key sent with every request
    pub api_key: Option<String>,
    /// The number of orders requested per page
    pub page_size: u64,
}

impl Default for OrderbookClientConfig {
    fn default() -> Self {
        Self { base_url: API_BASE_MAINNET.to_string(), api_key: None, page_size: DEFAULT_PAGE_SIZE }
    }
}

/// A page of orders
#[derive(Debug, Clone)]
pub struct OrderPage {
    /// The orders on the page
    pub orders: Vec<Order>,
    /// The total number of orders matching the query
    pub count: u64,
}

// ---------------------
// | Client Definition |
// ---------------------

/// Fetches and posts orders over HTTP
#[derive(Debug, Clone)]
pub struct OrderbookClient {
    /// The base URL of the orderbook API
    base_url: Url,
    /// The API key, if any
    api_key: Option<String>,
    /// The number of orders requested per page
    page_size: u64,
    /// The shared HTTP client
    http_client: Client,
}

impl OrderbookClient {
    /// Create a new client
    pub fn new(config: OrderbookClientConfig) -> Result<Self, OrderbookError> {
        let OrderbookClientConfig { base_url, api_key, page_size } = config;
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(OrderbookError::setup)?;
        if page_size == 0 {
            return Err(OrderbookError::setup("page size must be positive"));
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(OrderbookError::http)?;

        Ok(Self { base_url, api_key, page_size, http_client })
    }

    /// The URL listing one page of orders, counting pages from 1
    pub fn orders_url(&self, query: &OrderQuery, page: u64) -> Result<Url, OrderbookError> {
        let mut url = self.route(ORDERS_ROUTE)?;
        let offset = page.saturating_sub(1) * self.page_size;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("limit", &self.page_size.to_string());
            pairs.append_pair("offset", &offset.to_string());
            for (key, value) in query.to_query_pairs() {
                pairs.append_pair(&key, &value);
            }
        }

        Ok(url)
    }

    /// Fetch one page of orders, counting pages from 1
    #[instrument(skip_all, fields(page = page))]
    pub async fn get_orders(
        &self,
        query: &OrderQuery,
        page: u64,
    ) -> Result<OrderPage, OrderbookError> {
        let url = self.orders_url(query, page)?;
        let resp: OrderbookResponse = self.send_get_request(url).await?;

        info!("fetched {} of {} orders", resp.orders.len(), resp.count);
        Ok(OrderPage { orders: resp.orders.into_iter().map(Order::from).collect(), count: resp.count })
    }

    /// Fetch the first order matching a query
    pub async fn get_order(&self, query: &OrderQuery) -> Result<Order, OrderbookError> {
        let page = self.get_orders(query, 1).await?;
        page.orders
            .into_iter()
            .next()
            .ok_or_else(|| OrderbookError::NotFound(format!("{query:?}")))
    }

    /// Post a signed order, returning the order as stored by the orderbook
    #[instrument(skip_all, fields(maker = %order.maker))]
    pub async fn post_order(&self, order: &Order) -> Result<Order, OrderbookError> {
        let url = self.route(POST_ORDER_ROUTE)?;
        let body = OrderJson::from(order);

        let mut req = self.http_client.post(url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.header(API_KEY_HEADER, key);
        }
        let response = req.send().await.map_err(OrderbookError::http)?;
        let posted: OrderJson = Self::parse_response(response).await?;

        info!("posted order to the orderbook");
        Ok(Order::from(posted))
    }

    /// Join a route onto the base URL
    fn route(&self, route: &str) -> Result<Url, OrderbookError> {
        Url::parse(&format!("{}{route}", self.base_url.as_str().trim_end_matches('/')))
            .map_err(OrderbookError::setup)
    }

    /// Send a GET request and parse the JSON body
    async fn send_get_request<T: DeserializeOwned>(&self, url: Url) -> Result<T, OrderbookError> {
        let mut req = self.http_client.get(url);
        if let Some(key) = &self.api_key {
            req = req.header(API_KEY_HEADER, key);
        }

        let response = req.send().await.map_err(OrderbookError::http)?;
        Self::parse_response(response).await
    }

    /// Check the status of a response and parse its JSON body
    async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, OrderbookError> {
        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.map_err(OrderbookError::parsing)?;

            return Err(OrderbookError::http(format!("Status {status}: {message}")));
        }

        response.json().await.map_err(OrderbookError::parsing)
    }
}

#[cfg(test)]
mod tests {
    use wyvern_api::OrderSide;

    use super::*;

    #[test]
    fn test_orders_url() {
        let client = OrderbookClient::new(OrderbookClientConfig {
            base_url: "https://orders.example.com/".to_string(),
            ..Default::default()
        })
        .unwrap();

        let query = OrderQuery { side: Some(OrderSide::Sell), ..Default::default() };
        let url = client.orders_url(&query, 3).unwrap();
        assert_eq!(
            url.as_str(),
            "https://orders.example.com/wyvern/v1/orders/?limit=20&offset=40&side=1"
        );

        let first = client.orders_url(&OrderQuery::default(), 1).unwrap();
        assert_eq!(first.query(), Some("limit=20&offset=0"));
    }

    #[test]
    fn test_invalid_config() {
        let bad_url = OrderbookClientConfig { base_url: "not a url".to_string(), ..Default::default() };
        assert!(matches!(OrderbookClient::new(bad_url), Err(OrderbookError::Setup(_))));

        let no_page = OrderbookClientConfig { page_size: 0, ..Default::default() };
        assert!(matches!(OrderbookClient::new(no_page), Err(OrderbookError::Setup(_))));
    }
}
