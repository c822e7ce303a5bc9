//! Transfer calldata and replacement pattern encoding
//!
//! Each side of a trade signs a transfer call with its own address in place
//! and the counterparty's slot left as the null address. The replacement
//! pattern marks the counterparty slot so the exchange can splice the two
//! calls together on-chain.

use alloy_dyn_abi::{DynSolValue, JsonAbiExt};
use alloy_json_abi::Function;
use alloy_primitives::{Address, Bytes, B256, U256};
use wyvern_api::{Asset, HowToCall, OrderSide};

use crate::error::{TraderError, TraderResult};

pub mod atomicizer;
pub mod replacement;
pub mod schemas;

pub use atomicizer::encode_atomicized_transfer;
pub use replacement::{apply_replacement, encode_replacement_pattern, ReplaceKind};
pub use schemas::{Schema, SchemaRegistry};

/// The target, calldata and mask for one side of a transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEncoding {
    /// The contract the maker's proxy calls
    pub target: Address,
    /// How the proxy calls the target
    pub how_to_call: HowToCall,
    /// The encoded call
    pub calldata: Bytes,
    /// The bytes of `calldata` the counter-order may replace
    pub replacement_pattern: Bytes,
}

/// The `from`/`to` pair and replace kinds for one side of a transfer
///
/// A seller fixes `from` and leaves `to` replaceable; a buyer does the reverse
fn transfer_parties(side: OrderSide, address: Address) -> ([DynSolValue; 2], [ReplaceKind; 2]) {
    use ReplaceKind::*;

    match side {
        OrderSide::Sell => (
            [DynSolValue::Address(address), DynSolValue::Address(Address::ZERO)],
            [DoNotReplace, Replace],
        ),
        OrderSide::Buy => (
            [DynSolValue::Address(Address::ZERO), DynSolValue::Address(address)],
            [Replace, DoNotReplace],
        ),
    }
}

/// Encode a call to `function` and its replacement pattern
fn encode_call(
    function: &Function,
    args: &[DynSolValue],
    replace_kinds: &[ReplaceKind],
) -> TraderResult<(Bytes, Bytes)> {
    let calldata = function.abi_encode_input(args).map_err(TraderError::encoding)?;
    let mask = encode_replacement_pattern(function, replace_kinds)?;
    if calldata.len() != mask.len() {
        return Err(TraderError::encoding(format!(
            "{} calldata is {} bytes but its replacement pattern is {}",
            function.name,
            calldata.len(),
            mask.len()
        )));
    }

    Ok((Bytes::from(calldata), mask))
}

/// Encode a direct transfer of `asset` on the asset contract itself
pub fn encode_direct_transfer(
    side: OrderSide,
    schema: &Schema,
    asset: &Asset,
    address: Address,
    quantity: U256,
) -> TraderResult<TransferEncoding> {
    use ReplaceKind::DoNotReplace;

    let function = schema.transfer_function()?;
    let (parties, party_kinds) = transfer_parties(side, address);

    let mut args = parties.to_vec();
    let mut kinds = party_kinds.to_vec();
    match function.inputs.len() {
        // ERC20 `transferFrom(from, to, amount)`
        3 if schema.name == wyvern_api::SchemaName::Erc20 => {
            args.push(DynSolValue::Uint(quantity, 256));
            kinds.push(DoNotReplace);
        },
        // ERC721 `safeTransferFrom(from, to, tokenId)`
        3 => {
            args.push(DynSolValue::Uint(asset.token_id, 256));
            kinds.push(DoNotReplace);
        },
        // ERC1155 `safeTransferFrom(from, to, id, amount, data)`
        5 => {
            args.extend([
                DynSolValue::Uint(asset.token_id, 256),
                DynSolValue::Uint(quantity, 256),
                DynSolValue::Bytes(Vec::new()),
            ]);
            kinds.extend([DoNotReplace; 3]);
        },
        n => {
            return Err(TraderError::encoding(format!(
                "{} transfer takes {n} arguments",
                schema.name
            )))
        },
    }

    let (calldata, replacement_pattern) = encode_call(function, &args, &kinds)?;
    Ok(TransferEncoding {
        target: asset.token_address,
        how_to_call: HowToCall::Call,
        calldata,
        replacement_pattern,
    })
}

/// Encode a criteria transfer delegated through the merkle validator
///
/// The root is zero and the proof empty, which the validator treats as an
/// exact token id match
fn encode_criteria_transfer(
    side: OrderSide,
    function: &Function,
    asset: &Asset,
    address: Address,
    quantity: U256,
    validator: Address,
) -> TraderResult<TransferEncoding> {
    use ReplaceKind::DoNotReplace;

    let (parties, party_kinds) = transfer_parties(side, address);
    let mut args = parties.to_vec();
    let mut kinds = party_kinds.to_vec();

    args.push(DynSolValue::Address(asset.token_address));
    args.push(DynSolValue::Uint(asset.token_id, 256));
    kinds.extend([DoNotReplace; 2]);
    // The ERC1155 variant carries an amount before the root
    if function.inputs.len() == 7 {
        args.push(DynSolValue::Uint(quantity, 256));
        kinds.push(DoNotReplace);
    }
    args.push(DynSolValue::FixedBytes(B256::ZERO, 32));
    args.push(DynSolValue::Array(Vec::new()));
    kinds.extend([DoNotReplace; 2]);

    let (calldata, replacement_pattern) = encode_call(function, &args, &kinds)?;
    Ok(TransferEncoding {
        target: validator,
        how_to_call: HowToCall::DelegateCall,
        calldata,
        replacement_pattern,
    })
}

/// Encode one side of a single-asset transfer
///
/// With a validator the transfer is a delegated criteria call; schemas
/// without a criteria function fall back to a direct call
pub fn encode_transfer(
    side: OrderSide,
    schema: &Schema,
    asset: &Asset,
    address: Address,
    validator: Option<Address>,
    quantity: U256,
) -> TraderResult<TransferEncoding> {
    match (validator, schema.criteria_function()) {
        (Some(validator), Some(function)) => {
            encode_criteria_transfer(side, function?, asset, address, quantity, validator)
        },
        _ => encode_direct_transfer(side, schema, asset, address, quantity),
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;
    use wyvern_api::SchemaName;

    use super::*;

    /// The asset contract used in these tests
    const TOKEN: Address = address!("4bf010f1b9beda5450a8dd702ed602a104ff65ee");
    /// The merkle validator used in these tests
    const VALIDATOR: Address = address!("baf2127b49fc93cbca6269fade0f7f31df4c88a7");
    /// The seller
    const SELLER: Address = address!("00000000000000000000000000000000000000aa");
    /// The buyer
    const BUYER: Address = address!("00000000000000000000000000000000000000bb");

    /// Every schema with every transfer path
    fn cases() -> Vec<(Schema, Option<Address>, U256)> {
        vec![
            (Schema::erc721().unwrap(), None, U256::from(1u64)),
            (Schema::erc721().unwrap(), Some(VALIDATOR), U256::from(1u64)),
            (Schema::erc1155().unwrap(), None, U256::from(3u64)),
            (Schema::erc1155().unwrap(), Some(VALIDATOR), U256::from(3u64)),
            (Schema::erc20().unwrap(), None, U256::from(1000u64)),
            (Schema::erc20().unwrap(), Some(VALIDATOR), U256::from(1000u64)),
        ]
    }

    #[test]
    fn test_mask_matches_calldata_length() {
        let asset = Asset::new(TOKEN, U256::from(5465u64), SchemaName::Erc721);
        for (schema, validator, quantity) in cases() {
            for side in [OrderSide::Buy, OrderSide::Sell] {
                let enc =
                    encode_transfer(side, &schema, &asset, SELLER, validator, quantity).unwrap();
                assert_eq!(enc.calldata.len(), enc.replacement_pattern.len(), "{}", schema.name);
                assert!(enc.replacement_pattern[..4].iter().all(|b| *b == 0));
            }
        }
    }

    /// Splicing the buyer's calldata into the seller's through the seller's
    /// mask yields the transfer from seller to buyer, and vice versa
    #[test]
    fn test_replacement_reproduces_full_transfer() {
        let asset = Asset::new(TOKEN, U256::from(5465u64), SchemaName::Erc721);
        for (schema, validator, quantity) in cases() {
            let sell =
                encode_transfer(OrderSide::Sell, &schema, &asset, SELLER, validator, quantity)
                    .unwrap();
            let buy = encode_transfer(OrderSide::Buy, &schema, &asset, BUYER, validator, quantity)
                .unwrap();

            let sell_filled =
                apply_replacement(&sell.calldata, &buy.calldata, &sell.replacement_pattern)
                    .unwrap();
            let buy_filled =
                apply_replacement(&buy.calldata, &sell.calldata, &buy.replacement_pattern).unwrap();
            assert_eq!(sell_filled, buy_filled, "{}", schema.name);

            // The spliced call is the fully specified transfer
            let function = match (validator, schema.criteria_function()) {
                (Some(_), Some(f)) => f.unwrap(),
                _ => schema.transfer_function().unwrap(),
            };
            let decoded = function.abi_decode_input(&sell_filled[4..]).unwrap();
            assert_eq!(decoded[0], DynSolValue::Address(SELLER));
            assert_eq!(decoded[1], DynSolValue::Address(BUYER));
        }
    }

    #[test]
    fn test_validator_path_delegates() {
        let asset = Asset::new(TOKEN, U256::from(1u64), SchemaName::Erc721);
        let schema = Schema::erc721().unwrap();

        let direct =
            encode_transfer(OrderSide::Sell, &schema, &asset, SELLER, None, U256::from(1u64))
                .unwrap();
        assert_eq!(direct.target, TOKEN);
        assert_eq!(direct.how_to_call, HowToCall::Call);

        let delegated = encode_transfer(
            OrderSide::Sell,
            &schema,
            &asset,
            SELLER,
            Some(VALIDATOR),
            U256::from(1u64),
        )
        .unwrap();
        assert_eq!(delegated.target, VALIDATOR);
        assert_eq!(delegated.how_to_call, HowToCall::DelegateCall);
    }

    #[test]
    fn test_erc20_without_criteria_falls_back() {
        let asset = Asset::new(TOKEN, U256::ZERO, SchemaName::Erc20);
        let schema = Schema::erc20().unwrap();
        let enc = encode_transfer(
            OrderSide::Buy,
            &schema,
            &asset,
            BUYER,
            Some(VALIDATOR),
            U256::from(5u64),
        )
        .unwrap();
        assert_eq!(enc.target, TOKEN);
        assert_eq!(enc.how_to_call, HowToCall::Call);
    }
}
