//! Asset descriptors and the order metadata that references them

use std::fmt::{self, Display};

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiTypeError,
    serialization::{
        address_string_serialization, option_address_string_serialization,
        u256_string_serialization,
    },
};

/// The token standard an asset is traded under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SchemaName {
    /// A fungible token
    Erc20,
    /// A non-fungible token
    #[default]
    Erc721,
    /// A semi-fungible token
    Erc1155,
    /// Any schema the client does not know how to trade
    Other,
}

impl SchemaName {
    /// The canonical wire name of the schema
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaName::Erc20 => "ERC20",
            SchemaName::Erc721 => "ERC721",
            SchemaName::Erc1155 => "ERC1155",
            SchemaName::Other => "Other",
        }
    }
}

impl Display for SchemaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for SchemaName {
    fn from(value: String) -> Self {
        match value.to_uppercase().as_str() {
            "ERC20" => SchemaName::Erc20,
            "ERC721" => SchemaName::Erc721,
            "ERC1155" => SchemaName::Erc1155,
            _ => SchemaName::Other,
        }
    }
}

impl From<SchemaName> for String {
    fn from(value: SchemaName) -> Self {
        value.as_str().to_string()
    }
}

/// A single tradable unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// The token id within its contract
    #[serde(with = "u256_string_serialization")]
    pub token_id: U256,
    /// The token contract
    #[serde(with = "address_string_serialization")]
    pub token_address: Address,
    /// The schema the asset trades under, ERC721 when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<SchemaName>,
    /// A display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Asset {
    /// Create a new asset
    pub fn new(token_address: Address, token_id: U256, schema_name: SchemaName) -> Self {
        Self { token_id, token_address, schema_name: Some(schema_name), name: None }
    }

    /// The schema of the asset, defaulting to ERC721
    pub fn schema(&self) -> SchemaName {
        self.schema_name.unwrap_or_default()
    }
}

/// An ordered group of assets sold together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// The assets in the bundle
    pub assets: Vec<Asset>,
    /// The schema of each asset, index-aligned with `assets`
    pub schemas: Vec<SchemaName>,
    /// The bundle's name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// A description of the bundle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// A link to more information
    #[serde(default, rename = "external_link", skip_serializing_if = "Option::is_none")]
    pub external_link: Option<String>,
}

/// The assets an order trades
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSelection {
    /// A single asset with its schema
    Single {
        /// The asset
        asset: Asset,
        /// The schema used to encode the transfer
        schema: SchemaName,
    },
    /// A bundle of assets transferred atomically
    Bundle(Bundle),
}

/// Metadata attached to an order describing what it trades
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOrderMetadata", into = "RawOrderMetadata")]
pub struct OrderMetadata {
    /// The assets being traded
    pub assets: AssetSelection,
    /// The account that referred the order, if any
    pub referrer_address: Option<Address>,
}

impl OrderMetadata {
    /// Metadata for a single asset
    pub fn single(asset: Asset, schema: SchemaName) -> Self {
        Self { assets: AssetSelection::Single { asset, schema }, referrer_address: None }
    }

    /// Metadata for a bundle
    pub fn bundle(bundle: Bundle) -> Self {
        Self { assets: AssetSelection::Bundle(bundle), referrer_address: None }
    }

    /// All assets referenced by the metadata
    pub fn assets(&self) -> Vec<&Asset> {
        match &self.assets {
            AssetSelection::Single { asset, .. } => vec![asset],
            AssetSelection::Bundle(bundle) => bundle.assets.iter().collect(),
        }
    }
}

/// The wire form of order metadata, where `asset` and `bundle` are both
/// optional
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOrderMetadata {
    /// A single asset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    asset: Option<Asset>,
    /// The schema of the single asset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    schema: Option<SchemaName>,
    /// A bundle of assets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bundle: Option<Bundle>,
    /// The referrer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(with = "option_address_string_serialization")]
    referrer_address: Option<Address>,
}

impl TryFrom<RawOrderMetadata> for OrderMetadata {
    type Error = ApiTypeError;

    fn try_from(raw: RawOrderMetadata) -> Result<Self, Self::Error> {
        let assets = match (raw.asset, raw.bundle) {
            (Some(asset), None) => {
                let schema = raw.schema.unwrap_or_else(|| asset.schema());
                AssetSelection::Single { asset, schema }
            },
            (None, Some(bundle)) => {
                if bundle.assets.len() != bundle.schemas.len() {
                    return Err(ApiTypeError::metadata("bundle assets and schemas differ in length"));
                }
                AssetSelection::Bundle(bundle)
            },
            (Some(_), Some(_)) => {
                return Err(ApiTypeError::metadata("both `asset` and `bundle` present"))
            },
            (None, None) => return Err(ApiTypeError::metadata("neither `asset` nor `bundle` present")),
        };

        Ok(Self { assets, referrer_address: raw.referrer_address })
    }
}

impl From<OrderMetadata> for RawOrderMetadata {
    fn from(metadata: OrderMetadata) -> Self {
        let referrer_address = metadata.referrer_address;
        match metadata.assets {
            AssetSelection::Single { asset, schema } => RawOrderMetadata {
                asset: Some(asset),
                schema: Some(schema),
                bundle: None,
                referrer_address,
            },
            AssetSelection::Bundle(bundle) => RawOrderMetadata {
                asset: None,
                schema: None,
                bundle: Some(bundle),
                referrer_address,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a test asset
    fn asset() -> Asset {
        Asset::new(
            "0x4bf010f1b9beda5450a8dd702ed602a104ff65ee".parse().unwrap(),
            U256::from(5465u64),
            SchemaName::Erc721,
        )
    }

    #[test]
    fn test_single_asset_metadata_roundtrip() {
        let metadata = OrderMetadata::single(asset(), SchemaName::Erc721);
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["schema"], "ERC721");
        assert_eq!(json["asset"]["tokenId"], "5465");
        assert!(json.get("bundle").is_none());

        let parsed: OrderMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, metadata);
    }

    #[test]
    fn test_metadata_requires_exactly_one_selection() {
        let asset_json = serde_json::to_value(asset()).unwrap();
        let both = serde_json::json!({
            "asset": asset_json,
            "schema": "ERC721",
            "bundle": { "assets": [asset_json], "schemas": ["ERC721"] },
        });
        assert!(serde_json::from_value::<OrderMetadata>(both).is_err());

        let neither = serde_json::json!({ "schema": "ERC721" });
        assert!(serde_json::from_value::<OrderMetadata>(neither).is_err());
    }

    #[test]
    fn test_unknown_schema_is_other() {
        let schema: SchemaName = serde_json::from_str("\"ENSShortNameAuction\"").unwrap();
        assert_eq!(schema, SchemaName::Other);
        assert_eq!(asset().schema(), SchemaName::Erc721);
    }
}
