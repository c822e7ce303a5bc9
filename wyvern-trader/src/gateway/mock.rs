//! An in-memory contract gateway for tests
//!
//! Transactions that register a proxy or grant an approval update the mock's
//! state, so approval flows can be observed end to end.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use alloy::rpc::types::TransactionRequest;
use alloy_primitives::{Address, TxHash, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};

use super::{
    abis::{IProxyRegistry::registerProxyCall, IERC20::approveCall, IERC721::setApprovalForAllCall},
    ContractGateway, GatewayError, GatewayResult,
};
use crate::{
    network::NetworkConfig,
    order::{Order, UnhashedOrder},
};

/// The configurable state behind a [`MockGateway`]
#[derive(Debug)]
pub struct MockState {
    /// Registered proxies by owner
    pub proxies: HashMap<Address, Address>,
    /// The proxy assigned when an account registers one
    pub proxy_on_register: Address,
    /// Polls of `proxies` that return null after a registration
    pub proxy_registration_lag: usize,
    /// Maker nonces
    pub nonces: HashMap<Address, U256>,
    /// The answer to `validateOrderParameters_`
    pub order_parameters_valid: bool,
    /// The answer to `validateOrder_`
    pub order_valid: bool,
    /// Queued answers to `ordersCanMatch_`, falling back to
    /// `orders_can_match_default` once drained
    pub orders_can_match: VecDeque<GatewayResult<bool>>,
    /// The answer to `ordersCanMatch_` once the queue is drained
    pub orders_can_match_default: bool,
    /// The answer to `orderCalldataCanMatch`
    pub calldata_can_match: bool,
    /// ERC20 allowances by `(token, owner, spender)`
    pub erc20_allowances: HashMap<(Address, Address, Address), U256>,
    /// ERC20 balances by `(token, owner)`
    pub erc20_balances: HashMap<(Address, Address), U256>,
    /// Operator approvals by `(token, owner, operator)`
    pub approvals_for_all: HashMap<(Address, Address, Address), bool>,
    /// ERC721 owners by `(token, id)`
    pub owners: HashMap<(Address, U256), Address>,
    /// ERC1155 balances by `(token, owner, id)`
    pub erc1155_balances: HashMap<(Address, Address, U256), U256>,
    /// Native balances
    pub native_balances: HashMap<Address, U256>,
    /// The answer to every gas estimate
    pub gas_estimate: GatewayResult<u64>,
    /// The number of gas estimates made
    pub gas_estimates: usize,
    /// An error returned by every `send_transaction`, if set
    pub send_error: Option<GatewayError>,
    /// Every transaction sent, in order
    pub sent: Vec<TransactionRequest>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            proxies: HashMap::new(),
            proxy_on_register: Address::repeat_byte(0x9a),
            proxy_registration_lag: 0,
            nonces: HashMap::new(),
            order_parameters_valid: true,
            order_valid: true,
            orders_can_match: VecDeque::new(),
            orders_can_match_default: true,
            calldata_can_match: true,
            erc20_allowances: HashMap::new(),
            erc20_balances: HashMap::new(),
            approvals_for_all: HashMap::new(),
            owners: HashMap::new(),
            erc1155_balances: HashMap::new(),
            native_balances: HashMap::new(),
            gas_estimate: Ok(100_000),
            gas_estimates: 0,
            send_error: None,
            sent: Vec::new(),
        }
    }
}

impl MockState {
    /// Apply the side effects of a mined transaction
    fn apply(&mut self, tx: &TransactionRequest) {
        let from = tx.from.unwrap_or_default();
        let to = tx.to.and_then(|kind| kind.to().copied()).unwrap_or_default();
        let Some(input) = tx.input.input() else { return };

        if registerProxyCall::abi_decode(input).is_ok() {
            self.proxies.insert(from, self.proxy_on_register);
        } else if let Ok(call) = setApprovalForAllCall::abi_decode(input) {
            self.approvals_for_all.insert((to, from, call.operator), call.approved);
        } else if let Ok(call) = approveCall::abi_decode(input) {
            self.erc20_allowances.insert((to, from, call.spender), call.amount);
        }
    }
}

/// A gateway answering from [`MockState`]
#[derive(Clone)]
pub struct MockGateway {
    /// The network the mock pretends to be
    network: NetworkConfig,
    /// The shared state
    state: Arc<Mutex<MockState>>,
}

impl MockGateway {
    /// Create a mock with default answers
    pub fn new(network: NetworkConfig) -> Self {
        Self { network, state: Arc::new(Mutex::new(MockState::default())) }
    }

    /// Lock the mock's state for configuration or inspection
    pub async fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().await
    }

    /// The transactions sent so far
    pub async fn sent(&self) -> Vec<TransactionRequest> {
        self.state.lock().await.sent.clone()
    }
}

#[async_trait]
impl ContractGateway for MockGateway {
    fn network(&self) -> &NetworkConfig {
        &self.network
    }

    async fn proxies(&self, owner: Address) -> GatewayResult<Address> {
        let mut state = self.state.lock().await;
        let proxy = state.proxies.get(&owner).copied().unwrap_or_default();
        if proxy != Address::ZERO && state.proxy_registration_lag > 0 {
            state.proxy_registration_lag -= 1;
            return Ok(Address::ZERO);
        }

        Ok(proxy)
    }

    async fn nonces(&self, maker: Address) -> GatewayResult<U256> {
        Ok(self.state.lock().await.nonces.get(&maker).copied().unwrap_or_default())
    }

    async fn validate_order_parameters(&self, _order: &UnhashedOrder) -> GatewayResult<bool> {
        Ok(self.state.lock().await.order_parameters_valid)
    }

    async fn validate_order(&self, _order: &Order) -> GatewayResult<bool> {
        Ok(self.state.lock().await.order_valid)
    }

    async fn orders_can_match(&self, _buy: &Order, _sell: &Order) -> GatewayResult<bool> {
        let mut state = self.state.lock().await;
        let default = state.orders_can_match_default;
        state.orders_can_match.pop_front().unwrap_or(Ok(default))
    }

    async fn order_calldata_can_match(&self, _buy: &Order, _sell: &Order) -> GatewayResult<bool> {
        Ok(self.state.lock().await.calldata_can_match)
    }

    async fn erc20_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> GatewayResult<U256> {
        let state = self.state.lock().await;
        Ok(state.erc20_allowances.get(&(token, owner, spender)).copied().unwrap_or_default())
    }

    async fn erc20_balance(&self, token: Address, owner: Address) -> GatewayResult<U256> {
        Ok(self.state.lock().await.erc20_balances.get(&(token, owner)).copied().unwrap_or_default())
    }

    async fn is_approved_for_all(
        &self,
        token: Address,
        owner: Address,
        operator: Address,
    ) -> GatewayResult<bool> {
        let state = self.state.lock().await;
        Ok(state.approvals_for_all.get(&(token, owner, operator)).copied().unwrap_or_default())
    }

    async fn owner_of(&self, token: Address, token_id: U256) -> GatewayResult<Address> {
        Ok(self.state.lock().await.owners.get(&(token, token_id)).copied().unwrap_or_default())
    }

    async fn erc1155_balance(
        &self,
        token: Address,
        owner: Address,
        token_id: U256,
    ) -> GatewayResult<U256> {
        let state = self.state.lock().await;
        Ok(state.erc1155_balances.get(&(token, owner, token_id)).copied().unwrap_or_default())
    }

    async fn native_balance(&self, owner: Address) -> GatewayResult<U256> {
        Ok(self.state.lock().await.native_balances.get(&owner).copied().unwrap_or_default())
    }

    async fn estimate_gas(&self, _tx: &TransactionRequest) -> GatewayResult<u64> {
        let mut state = self.state.lock().await;
        state.gas_estimates += 1;
        state.gas_estimate.clone()
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> GatewayResult<TxHash> {
        let mut state = self.state.lock().await;
        if let Some(err) = state.send_error.clone() {
            return Err(err);
        }

        state.apply(&tx);
        state.sent.push(tx);
        Ok(TxHash::with_last_byte(state.sent.len() as u8))
    }
}
