//! Non-standard packed encoding (`abi.encodePacked`).
//!
//! Elementary values use their minimal width: `uintN`/`intN` take N/8
//! bytes, `address` 20, `bool` 1, `bytesN` N. `bytes` and `string` are
//! written raw with no length. Array elements are padded to full words.
//! Nested arrays and tuples have no packed form and are rejected.

use ethkit_common::{Hash256, WORD_SIZE};

use super::encoder::encode_value;
use super::types::ParamType;
use super::value::{type_check_all, AbiValue};
use super::AbiError;
use crate::crypto::keccak256;

/// Packs `values` according to `types`.
pub fn encode_packed(types: &[ParamType], values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    for ty in types {
        ty.validate()?;
    }
    type_check_all(types, values)?;
    let mut out = Vec::new();
    for (ty, value) in types.iter().zip(values) {
        pack_value(ty, value, &mut out)?;
    }
    Ok(out)
}

/// Keccak256 of the packed encoding, as computed by Solidity's
/// `keccak256(abi.encodePacked(...))`.
pub fn solidity_keccak256(types: &[ParamType], values: &[AbiValue]) -> Result<Hash256, AbiError> {
    Ok(keccak256(&encode_packed(types, values)?))
}

fn pack_value(ty: &ParamType, value: &AbiValue, out: &mut Vec<u8>) -> Result<(), AbiError> {
    match (ty, value) {
        (ParamType::Uint(bits) | ParamType::Int(bits), _) => {
            let start = WORD_SIZE
                .checked_sub(*bits as usize / 8)
                .ok_or_else(|| AbiError::UnknownType(ty.to_string()))?;
            let word = encode_value(ty, value)?;
            out.extend_from_slice(&word[start..]);
        }
        (ParamType::Address, AbiValue::Address(addr)) => out.extend_from_slice(&addr.0),
        (ParamType::Bool, AbiValue::Bool(b)) => out.push(*b as u8),
        (ParamType::FixedBytes(_), AbiValue::FixedBytes(data))
        | (ParamType::Bytes, AbiValue::Bytes(data)) => out.extend_from_slice(data),
        (ParamType::String, AbiValue::String(s)) => out.extend_from_slice(s.as_bytes()),
        (ParamType::FixedArray(inner, _) | ParamType::DynamicArray(inner), AbiValue::Array(items)) => {
            if !inner.is_elementary() {
                return Err(AbiError::Unsupported(format!("packed encoding of {ty}")));
            }
            for item in items {
                out.extend(encode_value(inner, item)?);
            }
        }
        (ParamType::Tuple(_), _) => {
            return Err(AbiError::Unsupported(format!("packed encoding of {ty}")));
        }
        _ => {
            return Err(AbiError::TypeMismatch {
                expected: ty.canonical(),
                found: value.kind().to_string(),
            })
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::I256;
    use ethkit_common::Address;
    use hex_literal::hex;

    fn ty(s: &str) -> ParamType {
        ParamType::parse(s).unwrap()
    }

    #[test]
    fn test_packed_layout() {
        let packed = encode_packed(
            &[ty("int16"), ty("bytes1"), ty("uint16"), ty("string")],
            &[
                I256::from(-1).into(),
                AbiValue::FixedBytes(vec![0x42]),
                3u64.into(),
                "Hello, world!".into(),
            ],
        )
        .unwrap();
        assert_eq!(packed, hex!("ffff42000348656c6c6f2c20776f726c6421"));
    }

    #[test]
    fn test_packed_array_elements_padded() {
        let packed = encode_packed(
            &[ty("uint8[]")],
            &[AbiValue::Array(vec![1u64.into(), 2u64.into()])],
        )
        .unwrap();
        assert_eq!(packed.len(), 64);
        assert_eq!(packed[31], 1);
        assert_eq!(packed[63], 2);
    }

    #[test]
    fn test_solidity_keccak256_vectors() {
        assert_eq!(
            solidity_keccak256(&[ParamType::Bool], &[true.into()]).unwrap(),
            hex!("5fe7f977e71dba2ea1a68e21057beebb9be2ac30c6410aa38d4f3fbe41dcffd2")
        );
        assert_eq!(
            solidity_keccak256(&[ParamType::String], &["Hello!%".into()]).unwrap(),
            hex!("661136a4267dba9ccdf6bfddb7c00e714de936674c4bdb065a531cf1cb15c7fc")
        );
        assert_eq!(
            solidity_keccak256(&[ty("uint256")], &[234u64.into()]).unwrap(),
            hex!("61c831beab28d67d1bb40b5ae1a11e2757fa842f031a2d0bc94a7867bc5d26c2")
        );
        assert_eq!(
            solidity_keccak256(&[ty("int8")], &[I256::from(-23).into()]).unwrap(),
            hex!("dc046d75852af4aea44a770057190294068a953828daaaab83800e2d0a8f1f35")
        );
        let addr = Address(hex!("407d73d8a49eeb85d32cf465507dd71d507100c1"));
        assert_eq!(
            solidity_keccak256(&[ParamType::Address], &[addr.into()]).unwrap(),
            hex!("4e8ebbefa452077428f93c9520d3edd60594ff452a29ac7d2ccc11d47f3ab95b")
        );
    }

    #[test]
    fn test_solidity_keccak256_mixed() {
        let addr = Address(hex!("85f43d8a49eeb85d32cf465507dd71d507100c1d"));
        let hash = solidity_keccak256(
            &[ParamType::String, ty("int8"), ParamType::Address],
            &["Hello!%".into(), I256::from(-23).into(), addr.into()],
        )
        .unwrap();
        assert_eq!(
            hash,
            hex!("a13b31627c1ed7aaded5aecec71baf02fe123797fffd45e662eac8e06fbe4955")
        );
    }

    #[test]
    fn test_packed_rejects_tuples() {
        let result = encode_packed(
            &[ty("(uint8,bool)")],
            &[AbiValue::Tuple(vec![1u64.into(), true.into()])],
        );
        assert!(matches!(result, Err(AbiError::Unsupported(_))));
    }

    #[test]
    fn test_packed_rejects_invalid_widths() {
        assert!(matches!(
            encode_packed(&[ParamType::Uint(512)], &[AbiValue::Uint(1u64.into())]),
            Err(AbiError::UnknownType(_))
        ));
        assert!(matches!(
            encode_packed(&[ParamType::FixedBytes(40)], &[AbiValue::FixedBytes(vec![0; 40])]),
            Err(AbiError::UnknownType(_))
        ));

        let mut out = Vec::new();
        assert!(pack_value(&ParamType::Int(512), &AbiValue::Int(I256::from(1)), &mut out).is_err());
        assert!(out.is_empty());
    }
}
