//! Transfer schemas for the supported token standards

use std::collections::HashMap;

use alloy_json_abi::{Function, JsonAbi};
use wyvern_api::SchemaName;

use crate::error::{TraderError, TraderResult};

/// The ERC721 direct transfer
const ERC721_TRANSFER: &str =
    "function safeTransferFrom(address from, address to, uint256 tokenId)";
/// The ERC721 criteria transfer through the merkle validator
const ERC721_CRITERIA_TRANSFER: &str = "function matchERC721WithSafeTransferUsingCriteria(address from, address to, address token, uint256 tokenId, bytes32 root, bytes32[] proof) returns (bool)";
/// The ERC1155 direct transfer
const ERC1155_TRANSFER: &str = "function safeTransferFrom(address from, address to, uint256 id, uint256 amount, bytes data)";
/// The ERC1155 criteria transfer through the merkle validator
const ERC1155_CRITERIA_TRANSFER: &str = "function matchERC1155UsingCriteria(address from, address to, address token, uint256 tokenId, uint256 amount, bytes32 root, bytes32[] proof) returns (bool)";
/// The ERC20 direct transfer
const ERC20_TRANSFER: &str =
    "function transferFrom(address from, address to, uint256 amount) returns (bool)";

/// The ABI surface used to move one kind of asset
#[derive(Debug, Clone)]
pub struct Schema {
    /// The schema's name
    pub name: SchemaName,
    /// The transfer functions of the schema
    pub interface: JsonAbi,
    /// The name of the direct transfer function
    transfer: &'static str,
    /// The name of the merkle validator's criteria transfer, if one exists
    criteria_transfer: Option<&'static str>,
}

impl Schema {
    /// Build a schema from human readable function signatures
    fn new(
        name: SchemaName,
        signatures: &[&str],
        transfer: &'static str,
        criteria_transfer: Option<&'static str>,
    ) -> TraderResult<Self> {
        let interface = JsonAbi::parse(signatures.iter().copied()).map_err(TraderError::encoding)?;
        Ok(Self { name, interface, transfer, criteria_transfer })
    }

    /// The ERC721 schema
    pub fn erc721() -> TraderResult<Self> {
        Self::new(
            SchemaName::Erc721,
            &[ERC721_TRANSFER, ERC721_CRITERIA_TRANSFER],
            "safeTransferFrom",
            Some("matchERC721WithSafeTransferUsingCriteria"),
        )
    }

    /// The ERC1155 schema
    pub fn erc1155() -> TraderResult<Self> {
        Self::new(
            SchemaName::Erc1155,
            &[ERC1155_TRANSFER, ERC1155_CRITERIA_TRANSFER],
            "safeTransferFrom",
            Some("matchERC1155UsingCriteria"),
        )
    }

    /// The ERC20 schema
    pub fn erc20() -> TraderResult<Self> {
        Self::new(SchemaName::Erc20, &[ERC20_TRANSFER], "transferFrom", None)
    }

    /// Look up a function by name
    pub fn function(&self, name: &str) -> TraderResult<&Function> {
        self.interface.function(name).and_then(|overloads| overloads.first()).ok_or_else(|| {
            TraderError::encoding(format!("schema {} has no function `{name}`", self.name))
        })
    }

    /// The direct transfer function
    pub fn transfer_function(&self) -> TraderResult<&Function> {
        self.function(self.transfer)
    }

    /// The criteria transfer function, if the schema has one
    pub fn criteria_function(&self) -> Option<TraderResult<&Function>> {
        self.criteria_transfer.map(|name| self.function(name))
    }
}

/// The schemas available on a network
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    /// The registered schemas
    schemas: HashMap<SchemaName, Schema>,
}

impl SchemaRegistry {
    /// A registry of the ERC20, ERC721 and ERC1155 schemas
    pub fn standard() -> TraderResult<Self> {
        let schemas = [Schema::erc20()?, Schema::erc721()?, Schema::erc1155()?]
            .into_iter()
            .map(|schema| (schema.name, schema))
            .collect();
        Ok(Self { schemas })
    }

    /// An empty registry
    pub fn empty() -> Self {
        Self { schemas: HashMap::new() }
    }

    /// Add or replace a schema
    pub fn register(&mut self, schema: Schema) {
        self.schemas.insert(schema.name, schema);
    }

    /// Resolve the schema for an asset kind
    pub fn get(&self, name: SchemaName) -> TraderResult<&Schema> {
        self.schemas.get(&name).ok_or(TraderError::UnsupportedSchema(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry() {
        let registry = SchemaRegistry::standard().unwrap();

        let erc721 = registry.get(SchemaName::Erc721).unwrap();
        assert_eq!(erc721.transfer_function().unwrap().inputs.len(), 3);
        assert_eq!(erc721.criteria_function().unwrap().unwrap().inputs.len(), 6);

        let erc1155 = registry.get(SchemaName::Erc1155).unwrap();
        assert_eq!(erc1155.transfer_function().unwrap().inputs.len(), 5);

        let erc20 = registry.get(SchemaName::Erc20).unwrap();
        assert!(erc20.criteria_function().is_none());
    }

    #[test]
    fn test_unsupported_schema() {
        let registry = SchemaRegistry::standard().unwrap();
        let err = registry.get(SchemaName::Other).unwrap_err();
        assert!(matches!(err, TraderError::UnsupportedSchema(SchemaName::Other)));
    }

    #[test]
    fn test_missing_function() {
        let schema = Schema::erc20().unwrap();
        assert!(matches!(schema.function("setApprovalForAll"), Err(TraderError::Encoding(_))));
    }
}
