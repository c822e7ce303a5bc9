//! An in-memory set of signing keys

use std::{collections::HashMap, str::FromStr};

use alloy::{network::EthereumWallet, signers::local::PrivateKeySigner};
use alloy_primitives::Address;

use super::SignerResolver;
use crate::error::{TraderError, TraderResult};

/// Local signers keyed by address
#[derive(Debug, Clone, Default)]
pub struct Keyring {
    /// The signers
    signers: HashMap<Address, PrivateKeySigner>,
}

impl Keyring {
    /// Create an empty keyring
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a keyring from hex-encoded private keys
    pub fn from_private_keys<S: AsRef<str>>(keys: &[S]) -> TraderResult<Self> {
        let mut keyring = Self::new();
        for key in keys {
            let signer = PrivateKeySigner::from_str(key.as_ref())
                .map_err(|e| TraderError::config(format!("invalid private key: {e}")))?;
            keyring.insert(signer);
        }

        Ok(keyring)
    }

    /// Add a signer, returning its address
    pub fn insert(&mut self, signer: PrivateKeySigner) -> Address {
        let address = signer.address();
        self.signers.insert(address, signer);
        address
    }

    /// The accounts the keyring can sign for
    pub fn accounts(&self) -> Vec<Address> {
        self.signers.keys().copied().collect()
    }

    /// A wallet that signs transactions with every key in the keyring
    ///
    /// The first key inserted is not guaranteed to be the default signer;
    /// transactions should always set `from`
    pub fn ethereum_wallet(&self) -> TraderResult<EthereumWallet> {
        let mut signers = self.signers.values().cloned();
        let first = signers.next().ok_or_else(|| TraderError::config("keyring is empty"))?;

        let mut wallet = EthereumWallet::new(first);
        for signer in signers {
            wallet.register_signer(signer);
        }

        Ok(wallet)
    }
}

impl SignerResolver for Keyring {
    fn resolve(&self, account: Address) -> TraderResult<PrivateKeySigner> {
        self.signers
            .get(&account)
            .cloned()
            .ok_or_else(|| TraderError::SignerNotFound(account.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The first well-known development key
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_from_private_keys() {
        let keyring = Keyring::from_private_keys(&[DEV_KEY]).unwrap();
        let expected = Address::from_str("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap();

        assert_eq!(keyring.accounts(), vec![expected]);
        assert_eq!(keyring.resolve(expected).unwrap().address(), expected);
        assert!(keyring.ethereum_wallet().is_ok());
    }

    #[test]
    fn test_invalid_key_and_empty_keyring() {
        assert!(matches!(
            Keyring::from_private_keys(&["not-a-key"]),
            Err(TraderError::Config(_))
        ));
        assert!(Keyring::new().ethereum_wallet().is_err());
        assert!(matches!(
            Keyring::new().resolve(Address::ZERO),
            Err(TraderError::SignerNotFound(_))
        ));
    }
}
