//! EIP-712 order signatures
//!
//! Orders are signed as the exchange's `Order` struct under the domain
//! `{name, version, chainId, verifyingContract}`. The struct includes the
//! maker's bulk-cancellation nonce, which is read from the exchange at
//! signing time.

use std::borrow::Cow;

use alloy::signers::{local::PrivateKeySigner, SignerSync};
use alloy_dyn_abi::{Resolver, TypedData};
use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::Eip712Domain;
use serde_json::json;
use tracing::{info, instrument};

use crate::{
    constants::{EIP_712_WYVERN_DOMAIN_NAME, EIP_712_WYVERN_DOMAIN_VERSION},
    error::{TraderError, TraderResult},
    gateway::ContractGateway,
    order::{EcSignature, Order, UnhashedOrder},
};

mod keyring;
pub use keyring::Keyring;

/// The EIP-712 encoding of the exchange's order struct
///
/// The maker referrer fee is not part of the signed struct
pub const ORDER_TYPE: &str = "Order(address exchange,address maker,address taker,\
uint256 makerRelayerFee,uint256 takerRelayerFee,uint256 makerProtocolFee,\
uint256 takerProtocolFee,address feeRecipient,uint8 feeMethod,uint8 side,\
uint8 saleKind,address target,uint8 howToCall,bytes calldata,\
bytes replacementPattern,address staticTarget,bytes staticExtradata,\
address paymentToken,uint256 basePrice,uint256 extra,uint256 listingTime,\
uint256 expirationTime,uint256 salt,uint256 nonce)";

/// The primary type name of the signed struct
const ORDER_PRIMARY_TYPE: &str = "Order";

/// Resolves the signing key for an account
pub trait SignerResolver: Send + Sync {
    /// The signer for `account`, or [`TraderError::SignerNotFound`]
    fn resolve(&self, account: Address) -> TraderResult<PrivateKeySigner>;
}

/// A signature over an order, with the nonce it commits to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSignature {
    /// The maker's signature
    pub signature: EcSignature,
    /// The maker nonce included in the signed struct
    pub nonce: U256,
    /// The EIP-712 signing hash
    pub hash: B256,
}

impl OrderSignature {
    /// Attach the signature to an order
    pub fn into_order(self, order: UnhashedOrder) -> Order {
        let mut signed = Order::unsigned(order);
        signed.signature = Some(self.signature);
        signed.nonce = Some(self.nonce);
        signed.hash = Some(self.hash);
        signed
    }
}

/// The EIP-712 domain of an exchange deployment
pub fn wyvern_domain(chain_id: u64, exchange: Address) -> Eip712Domain {
    Eip712Domain::new(
        Some(Cow::Borrowed(EIP_712_WYVERN_DOMAIN_NAME)),
        Some(Cow::Borrowed(EIP_712_WYVERN_DOMAIN_VERSION)),
        Some(U256::from(chain_id)),
        Some(exchange),
        None,
    )
}

/// Build the typed data signed for an order
pub fn order_typed_data(
    order: &UnhashedOrder,
    nonce: U256,
    chain_id: u64,
) -> TraderResult<TypedData> {
    let mut resolver = Resolver::default();
    resolver.ingest_string(ORDER_TYPE).map_err(TraderError::signing)?;

    let message = json!({
        "exchange": order.exchange.to_string(),
        "maker": order.maker.to_string(),
        "taker": order.taker.to_string(),
        "makerRelayerFee": order.maker_relayer_fee.to_string(),
        "takerRelayerFee": order.taker_relayer_fee.to_string(),
        "makerProtocolFee": order.maker_protocol_fee.to_string(),
        "takerProtocolFee": order.taker_protocol_fee.to_string(),
        "feeRecipient": order.fee_recipient.to_string(),
        "feeMethod": u8::from(order.fee_method),
        "side": u8::from(order.side),
        "saleKind": u8::from(order.sale_kind),
        "target": order.target.to_string(),
        "howToCall": u8::from(order.how_to_call),
        "calldata": order.calldata.to_string(),
        "replacementPattern": order.replacement_pattern.to_string(),
        "staticTarget": order.static_target.to_string(),
        "staticExtradata": order.static_extradata.to_string(),
        "paymentToken": order.payment_token.to_string(),
        "basePrice": order.base_price.to_string(),
        "extra": order.extra.to_string(),
        "listingTime": order.listing_time.to_string(),
        "expirationTime": order.expiration_time.to_string(),
        "salt": order.salt.to_string(),
        "nonce": nonce.to_string(),
    });

    Ok(TypedData {
        domain: wyvern_domain(chain_id, order.exchange),
        resolver,
        primary_type: ORDER_PRIMARY_TYPE.to_string(),
        message,
    })
}

/// The EIP-712 signing hash of an order
pub fn order_hash(order: &UnhashedOrder, nonce: U256, chain_id: u64) -> TraderResult<B256> {
    order_typed_data(order, nonce, chain_id)?.eip712_signing_hash().map_err(TraderError::signing)
}

/// Signs orders with keys from a [`SignerResolver`]
pub struct OrderSigner<R: SignerResolver> {
    /// The key lookup
    resolver: R,
}

impl<R: SignerResolver> OrderSigner<R> {
    /// Create a new signer
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// The key lookup backing the signer
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Sign an order with its maker's key
    ///
    /// The maker's current nonce is read from the exchange and committed to
    #[instrument(skip_all, fields(maker = %order.maker))]
    pub async fn authorize_order(
        &self,
        order: &UnhashedOrder,
        gateway: &dyn ContractGateway,
    ) -> TraderResult<OrderSignature> {
        let signer = self.resolver.resolve(order.maker)?;
        let nonce = gateway.nonces(order.maker).await?;
        let chain_id = gateway.network().chain_id;

        let signature = self.sign_with(&signer, order, nonce, chain_id)?;
        info!("signed order {:#x}", signature.hash);
        Ok(signature)
    }

    /// Sign an order at a known nonce
    pub fn sign_with(
        &self,
        signer: &PrivateKeySigner,
        order: &UnhashedOrder,
        nonce: U256,
        chain_id: u64,
    ) -> TraderResult<OrderSignature> {
        if signer.address() != order.maker {
            return Err(TraderError::signing(format!(
                "signer {} is not the maker {}",
                signer.address(),
                order.maker
            )));
        }

        let hash = order_hash(order, nonce, chain_id)?;
        let signature = signer.sign_hash_sync(&hash).map_err(TraderError::signing)?;
        Ok(OrderSignature { signature: signature.into(), nonce, hash })
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Signature;

    use super::*;
    use crate::{
        gateway::mock::MockGateway,
        network::{Network, NetworkConfig},
        order::test_helpers::sell_order,
    };

    const NOW: u64 = 1_700_000_000;

    /// A keyring holding one random key, and an order made by that key
    fn keyring_and_order() -> (Keyring, UnhashedOrder) {
        let signer = PrivateKeySigner::random();
        let mut order = sell_order(NOW);
        order.maker = signer.address();

        let mut keyring = Keyring::new();
        keyring.insert(signer);
        (keyring, order)
    }

    #[test]
    fn test_order_type_encoding() {
        let (_, order) = keyring_and_order();
        let typed = order_typed_data(&order, U256::ZERO, 1).unwrap();
        assert_eq!(typed.encode_type().unwrap(), ORDER_TYPE);
        assert!(!ORDER_TYPE.contains("makerReferrerFee"));
    }

    #[test]
    fn test_hash_binds_domain_and_nonce() {
        let (_, order) = keyring_and_order();
        let base = order_hash(&order, U256::ZERO, 1).unwrap();

        assert_ne!(base, order_hash(&order, U256::from(1u64), 1).unwrap());
        assert_ne!(base, order_hash(&order, U256::ZERO, 4).unwrap());

        let mut other_exchange = order.clone();
        other_exchange.exchange = Address::repeat_byte(0x11);
        assert_ne!(base, order_hash(&other_exchange, U256::ZERO, 1).unwrap());

        // The referrer fee is not signed
        let mut referred = order.clone();
        referred.maker_referrer_fee = U256::from(100u64);
        assert_eq!(base, order_hash(&referred, U256::ZERO, 1).unwrap());
    }

    #[tokio::test]
    async fn test_authorize_order_recovers_maker() {
        let (keyring, order) = keyring_and_order();
        let network = NetworkConfig::for_network(Network::Rinkeby).unwrap();
        let gateway = MockGateway::new(network.clone());
        gateway.state().await.nonces.insert(order.maker, U256::from(3u64));

        let signer = OrderSigner::new(keyring);
        let sig = signer.authorize_order(&order, &gateway).await.unwrap();
        assert_eq!(sig.nonce, U256::from(3u64));
        assert_eq!(sig.hash, order_hash(&order, sig.nonce, network.chain_id).unwrap());
        assert!(sig.signature.v == 27 || sig.signature.v == 28);

        let recovered = Signature::new(
            U256::from_be_bytes(sig.signature.r.0),
            U256::from_be_bytes(sig.signature.s.0),
            sig.signature.v == 28,
        )
        .recover_address_from_prehash(&sig.hash)
        .unwrap();
        assert_eq!(recovered, order.maker);
    }

    #[tokio::test]
    async fn test_unknown_maker() {
        let (_, order) = keyring_and_order();
        let gateway = MockGateway::new(NetworkConfig::for_network(Network::Main).unwrap());

        let signer = OrderSigner::new(Keyring::new());
        let err = signer.authorize_order(&order, &gateway).await.unwrap_err();
        assert!(matches!(err, TraderError::SignerNotFound(_)));
    }
}
