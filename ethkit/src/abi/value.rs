//! Typed ABI values.

use ethkit_common::Address;

use super::types::ParamType;
use super::AbiError;
use crate::primitives::{I256, U256};

/// A value matching some [`ParamType`].
///
/// `Array` covers both fixed and dynamic arrays; the declared type decides
/// whether a length word is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    /// Unsigned integer.
    Uint(U256),
    /// Signed integer.
    Int(I256),
    /// Address (20 bytes).
    Address(Address),
    /// Boolean.
    Bool(bool),
    /// Fixed-size bytes (1-32 bytes).
    FixedBytes(Vec<u8>),
    /// Dynamic bytes.
    Bytes(Vec<u8>),
    /// String.
    String(String),
    /// Array of values.
    Array(Vec<AbiValue>),
    /// Tuple of values.
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    /// Short name of the value's kind, used in mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            AbiValue::Uint(_) => "uint",
            AbiValue::Int(_) => "int",
            AbiValue::Address(_) => "address",
            AbiValue::Bool(_) => "bool",
            AbiValue::FixedBytes(_) => "fixed bytes",
            AbiValue::Bytes(_) => "bytes",
            AbiValue::String(_) => "string",
            AbiValue::Array(_) => "array",
            AbiValue::Tuple(_) => "tuple",
        }
    }

    /// Checks that this value can be encoded as `ty`.
    ///
    /// Integers must fit the declared width, fixed bytes and fixed arrays
    /// must have the declared length, and tuples the declared arity.
    pub fn type_check(&self, ty: &ParamType) -> Result<(), AbiError> {
        let mismatch = || AbiError::TypeMismatch {
            expected: ty.canonical(),
            found: self.kind().to_string(),
        };
        match (ty, self) {
            (ParamType::Uint(bits), AbiValue::Uint(v)) => {
                if v.bits() > *bits as usize {
                    return Err(AbiError::Overflow {
                        bits: *bits,
                        signed: false,
                    });
                }
                Ok(())
            }
            (ParamType::Int(bits), AbiValue::Int(v)) => {
                if !v.fits(*bits) {
                    return Err(AbiError::Overflow {
                        bits: *bits,
                        signed: true,
                    });
                }
                Ok(())
            }
            (ParamType::Address, AbiValue::Address(_))
            | (ParamType::Bool, AbiValue::Bool(_))
            | (ParamType::Bytes, AbiValue::Bytes(_))
            | (ParamType::String, AbiValue::String(_)) => Ok(()),
            (ParamType::FixedBytes(len), AbiValue::FixedBytes(data)) => {
                if data.len() != *len {
                    return Err(AbiError::TypeMismatch {
                        expected: ty.canonical(),
                        found: format!("bytes{}", data.len()),
                    });
                }
                Ok(())
            }
            (ParamType::FixedArray(inner, len), AbiValue::Array(items)) => {
                if items.len() != *len {
                    return Err(AbiError::ArityMismatch {
                        expected: *len,
                        found: items.len(),
                    });
                }
                items.iter().try_for_each(|item| item.type_check(inner))
            }
            (ParamType::DynamicArray(inner), AbiValue::Array(items)) => {
                items.iter().try_for_each(|item| item.type_check(inner))
            }
            (ParamType::Tuple(types), AbiValue::Tuple(items)) => type_check_all(types, items),
            _ => Err(mismatch()),
        }
    }

    /// Returns the unsigned integer if this is one.
    pub fn as_uint(&self) -> Option<&U256> {
        match self {
            AbiValue::Uint(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the signed integer if this is one.
    pub fn as_int(&self) -> Option<&I256> {
        match self {
            AbiValue::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Returns this value as an address if it is one.
    pub fn as_address(&self) -> Option<&Address> {
        match self {
            AbiValue::Address(addr) => Some(addr),
            _ => None,
        }
    }

    /// Returns this value as a bool if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the payload of `bytes` or `bytesN` values.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AbiValue::Bytes(b) | AbiValue::FixedBytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns this value as a string if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements of an array or tuple.
    pub fn as_slice(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::Array(items) | AbiValue::Tuple(items) => Some(items),
            _ => None,
        }
    }
}

/// Checks arity and then each value against its type.
pub fn type_check_all(types: &[ParamType], values: &[AbiValue]) -> Result<(), AbiError> {
    if types.len() != values.len() {
        return Err(AbiError::ArityMismatch {
            expected: types.len(),
            found: values.len(),
        });
    }
    types
        .iter()
        .zip(values)
        .try_for_each(|(ty, value)| value.type_check(ty))
}

impl From<U256> for AbiValue {
    fn from(v: U256) -> Self {
        AbiValue::Uint(v)
    }
}

impl From<u64> for AbiValue {
    fn from(v: u64) -> Self {
        AbiValue::Uint(U256::from(v))
    }
}

impl From<I256> for AbiValue {
    fn from(v: I256) -> Self {
        AbiValue::Int(v)
    }
}

impl From<Address> for AbiValue {
    fn from(v: Address) -> Self {
        AbiValue::Address(v)
    }
}

impl From<bool> for AbiValue {
    fn from(v: bool) -> Self {
        AbiValue::Bool(v)
    }
}

impl From<&str> for AbiValue {
    fn from(v: &str) -> Self {
        AbiValue::String(v.to_string())
    }
}

impl From<String> for AbiValue {
    fn from(v: String) -> Self {
        AbiValue::String(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_check_mismatch() {
        let ty = ParamType::parse("(uint256,string)").unwrap();
        let err = AbiValue::from("dave").type_check(&ty).unwrap_err();
        assert_eq!(
            err,
            AbiError::TypeMismatch {
                expected: "(uint256,string)".to_string(),
                found: "string".to_string(),
            }
        );
    }

    #[test]
    fn test_type_check_overflow() {
        let err = AbiValue::from(300u64).type_check(&ParamType::Uint(8)).unwrap_err();
        assert_eq!(err, AbiError::Overflow { bits: 8, signed: false });
        assert!(AbiValue::Int(I256::from(-129))
            .type_check(&ParamType::Int(8))
            .is_err());
    }

    #[test]
    fn test_type_check_lengths() {
        let fixed = ParamType::parse("bytes4").unwrap();
        assert!(AbiValue::FixedBytes(vec![1, 2, 3, 4]).type_check(&fixed).is_ok());
        assert!(AbiValue::FixedBytes(vec![1, 2, 3]).type_check(&fixed).is_err());

        let arr = ParamType::parse("bool[2]").unwrap();
        assert_eq!(
            AbiValue::Array(vec![true.into()]).type_check(&arr),
            Err(AbiError::ArityMismatch { expected: 2, found: 1 })
        );
    }

    #[test]
    fn test_type_check_all_arity() {
        let types = [ParamType::Address, ParamType::Uint(256)];
        assert_eq!(
            type_check_all(&types, &[AbiValue::from(1u64)]),
            Err(AbiError::ArityMismatch { expected: 2, found: 1 })
        );
    }
}
