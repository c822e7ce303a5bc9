//! Replacement pattern construction
//!
//! A replacement pattern is a byte mask the same length as an order's
//! calldata. The exchange overwrites every masked byte of one order's calldata
//! with the counter-order's bytes before comparing the two, so the mask must
//! follow the ABI encoder's word layout exactly.

use alloy_dyn_abi::{DynSolType, Specifier};
use alloy_json_abi::Function;
use alloy_primitives::Bytes;

use crate::error::{TraderError, TraderResult};

/// The width of an ABI word
const WORD_SIZE: usize = 32;
/// The width of a function selector
const SELECTOR_SIZE: usize = 4;

/// Whether the counter-order may overwrite an argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceKind {
    /// The argument is fixed by the maker
    DoNotReplace,
    /// The counter-order supplies the argument
    Replace,
}

/// The number of head words a static type occupies
fn static_words(ty: &DynSolType) -> usize {
    match ty {
        DynSolType::FixedArray(inner, len) => static_words(inner) * len,
        DynSolType::Tuple(members) => members.iter().map(static_words).sum(),
        _ => 1,
    }
}

/// The number of tail words the empty value of a dynamic type occupies
fn empty_tail_words(ty: &DynSolType) -> TraderResult<usize> {
    match ty {
        // A single length word of zero
        DynSolType::Bytes | DynSolType::String | DynSolType::Array(_) => Ok(1),
        other => Err(TraderError::encoding(format!("unsupported dynamic argument type {other}"))),
    }
}

/// Build the replacement pattern for a call to `function`
///
/// Each static argument contributes its full head width, filled with `0xff`
/// when replaceable. A dynamic argument contributes a zero offset word in the
/// head and a zero tail holding its empty value; dynamic arguments can never
/// be replaced.
pub fn encode_replacement_pattern(
    function: &Function,
    replace_kinds: &[ReplaceKind],
) -> TraderResult<Bytes> {
    if function.inputs.len() != replace_kinds.len() {
        return Err(TraderError::encoding(format!(
            "{} takes {} arguments but {} replace kinds were given",
            function.name,
            function.inputs.len(),
            replace_kinds.len()
        )));
    }

    let mut head = Vec::new();
    let mut tail_words = 0;
    for (param, kind) in function.inputs.iter().zip(replace_kinds) {
        let ty = param.resolve().map_err(TraderError::encoding)?;
        if ty.is_dynamic() {
            if *kind == ReplaceKind::Replace {
                return Err(TraderError::encoding(format!(
                    "dynamic argument `{}` of {} cannot be replaced",
                    param.name, function.name
                )));
            }

            head.extend_from_slice(&[0u8; WORD_SIZE]);
            tail_words += empty_tail_words(&ty)?;
            continue;
        }

        let fill = match kind {
            ReplaceKind::Replace => 0xff,
            ReplaceKind::DoNotReplace => 0x00,
        };
        head.extend(std::iter::repeat_n(fill, static_words(&ty) * WORD_SIZE));
    }

    let mut mask = vec![0u8; SELECTOR_SIZE];
    mask.extend(head);
    mask.extend(std::iter::repeat_n(0u8, tail_words * WORD_SIZE));
    Ok(Bytes::from(mask))
}

/// Overwrite the masked bytes of `target` with the bytes of `desired`
///
/// This mirrors the exchange's `guardedArrayReplace`
pub fn apply_replacement(target: &[u8], desired: &[u8], mask: &[u8]) -> TraderResult<Bytes> {
    if target.len() != desired.len() || target.len() != mask.len() {
        return Err(TraderError::encoding(format!(
            "cannot replace: target has {} bytes, desired {}, mask {}",
            target.len(),
            desired.len(),
            mask.len()
        )));
    }

    let replaced = target
        .iter()
        .zip(desired)
        .zip(mask)
        .map(|((t, d), m)| (t & !m) | (d & m))
        .collect::<Vec<u8>>();
    Ok(Bytes::from(replaced))
}
