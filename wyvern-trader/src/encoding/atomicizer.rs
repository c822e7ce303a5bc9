//! Bundle transfers through the atomicizer
//!
//! The atomicizer executes a list of calls in one delegated call. Its
//! calldata concatenates each sub-call, so the bundle's replacement pattern
//! is the concatenation of each sub-call's pattern placed over the `bytes`
//! argument's data.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use wyvern_api::{Asset, HowToCall, OrderSide, SchemaName};

use super::{encode_direct_transfer, schemas::SchemaRegistry, TransferEncoding};
use crate::error::{TraderError, TraderResult};

sol! {
    /// Execute each call in turn, reverting if any fails
    function atomicize(address[] addrs, uint256[] values, uint256[] calldataLengths, bytes calldatas);
}

/// The width of an ABI word
const WORD_SIZE: usize = 32;

/// The amount each bundled asset transfers; fungible items move one unit
pub const BUNDLE_ITEM_QUANTITY: U256 = U256::from_limbs([1, 0, 0, 0]);

/// The byte offset of the concatenated calldata within an `atomicize` call
/// of `n` sub-calls
///
/// The selector is followed by four offset words, the three length-prefixed
/// arrays of `n` words each, and the `bytes` length word
fn calldatas_offset(n: usize) -> usize {
    4 + WORD_SIZE * (4 + 3 * (1 + n)) + WORD_SIZE
}

/// Encode one side of a bundle transfer
///
/// Every asset is transferred with a direct call of
/// [`BUNDLE_ITEM_QUANTITY`]
pub fn encode_atomicized_transfer(
    side: OrderSide,
    registry: &SchemaRegistry,
    assets: &[Asset],
    schemas: &[SchemaName],
    address: Address,
    atomicizer: Address,
) -> TraderResult<TransferEncoding> {
    if assets.is_empty() {
        return Err(TraderError::encoding("cannot encode an empty bundle"));
    }
    if assets.len() != schemas.len() {
        return Err(TraderError::encoding(format!(
            "bundle has {} assets but {} schemas",
            assets.len(),
            schemas.len()
        )));
    }

    let transfers = assets
        .iter()
        .zip(schemas)
        .map(|(asset, name)| {
            let schema = registry.get(*name)?;
            encode_direct_transfer(side, schema, asset, address, BUNDLE_ITEM_QUANTITY)
        })
        .collect::<TraderResult<Vec<_>>>()?;

    let call = atomicizeCall {
        addrs: transfers.iter().map(|t| t.target).collect(),
        values: vec![U256::ZERO; transfers.len()],
        calldataLengths: transfers.iter().map(|t| U256::from(t.calldata.len())).collect(),
        calldatas: transfers.iter().flat_map(|t| t.calldata.iter().copied()).collect(),
    };
    let calldata = call.abi_encode();

    let mut mask = vec![0u8; calldata.len()];
    let start = calldatas_offset(transfers.len());
    let sub_masks = transfers.iter().flat_map(|t| t.replacement_pattern.iter().copied());
    for (byte, m) in mask[start..].iter_mut().zip(sub_masks) {
        *byte = m;
    }

    Ok(TransferEncoding {
        target: atomicizer,
        how_to_call: HowToCall::DelegateCall,
        calldata: Bytes::from(calldata),
        replacement_pattern: Bytes::from(mask),
    })
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;
    use crate::encoding::apply_replacement;

    /// The atomicizer used in these tests
    const ATOMICIZER: Address = address!("c99f70bfd82fb7c8f8191fdfbfb735606b15e5c5");
    /// The seller
    const SELLER: Address = address!("00000000000000000000000000000000000000aa");
    /// The buyer
    const BUYER: Address = address!("00000000000000000000000000000000000000bb");

    /// A two-asset bundle
    fn bundle() -> (Vec<Asset>, Vec<SchemaName>) {
        let assets = vec![
            Asset::new(
                address!("4bf010f1b9beda5450a8dd702ed602a104ff65ee"),
                U256::from(1u64),
                SchemaName::Erc721,
            ),
            Asset::new(
                address!("495f947276749ce646f68ac8c248420045cb7b5e"),
                U256::from(2u64),
                SchemaName::Erc1155,
            ),
        ];
        (assets, vec![SchemaName::Erc721, SchemaName::Erc1155])
    }

    #[test]
    fn test_bundle_mask_splices_counterparty() {
        let registry = SchemaRegistry::standard().unwrap();
        let (assets, schemas) = bundle();

        let sell = encode_atomicized_transfer(
            OrderSide::Sell,
            &registry,
            &assets,
            &schemas,
            SELLER,
            ATOMICIZER,
        )
        .unwrap();
        let buy = encode_atomicized_transfer(
            OrderSide::Buy,
            &registry,
            &assets,
            &schemas,
            BUYER,
            ATOMICIZER,
        )
        .unwrap();
        assert_eq!(sell.calldata.len(), sell.replacement_pattern.len());
        assert_eq!(sell.calldata.len(), buy.calldata.len());

        let sell_filled =
            apply_replacement(&sell.calldata, &buy.calldata, &sell.replacement_pattern).unwrap();
        let buy_filled =
            apply_replacement(&buy.calldata, &sell.calldata, &buy.replacement_pattern).unwrap();
        assert_eq!(sell_filled, buy_filled);

        let decoded = atomicizeCall::abi_decode(&sell_filled).unwrap();
        assert_eq!(decoded.addrs, vec![assets[0].token_address, assets[1].token_address]);
        // The first sub-call's `to` word now carries the buyer
        let to_word = &decoded.calldatas[4 + 32..4 + 64];
        assert_eq!(&to_word[12..], BUYER.as_slice());

        // The ERC1155 sub-call moves a single unit
        let erc1155_start = decoded.calldataLengths[0].to::<usize>();
        let amount_start = erc1155_start + 4 + 3 * 32;
        let amount = U256::from_be_slice(&decoded.calldatas[amount_start..amount_start + 32]);
        assert_eq!(amount, BUNDLE_ITEM_QUANTITY);
    }

    #[test]
    fn test_bundle_schema_length_mismatch() {
        let registry = SchemaRegistry::standard().unwrap();
        let (assets, _) = bundle();
        let res = encode_atomicized_transfer(
            OrderSide::Sell,
            &registry,
            &assets,
            &[SchemaName::Erc721],
            SELLER,
            ATOMICIZER,
        );
        assert!(matches!(res, Err(TraderError::Encoding(_))));
    }
}
