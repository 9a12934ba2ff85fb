//! Head/tail encoder.
//!
//! A sequence of values is laid out as a heads section followed by a tails
//! section. Static values are written inline in the heads; a dynamic value
//! gets a placeholder head and its encoding is appended to the tails. Once
//! every head is known, each placeholder is patched with the offset of its
//! tail measured from the start of the sequence. Nested dynamic values run
//! the same scheme in their own context and hand the finished blob to the
//! parent.

use super::types::ParamType;
use super::value::{type_check_all, AbiValue};
use super::AbiError;
use crate::primitives::{encode_int, encode_uint, encode_usize, pad_to_word_multiple, right_pad};

/// Encodes `values` as the ABI tuple `types` (function arguments, return data).
pub fn encode(types: &[ParamType], values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    for ty in types {
        ty.validate()?;
    }
    type_check_all(types, values)?;
    encode_sequence(types.iter(), values)
}

/// One head slot of a sequence being encoded.
enum Head {
    /// Encoding of a static value.
    Inline(Vec<u8>),
    /// Offset placeholder, pointing at `tail_start` within the tails section.
    Placeholder { tail_start: usize },
}

/// Encoding state for one head/tail level.
struct EncodeContext {
    heads: Vec<Head>,
    tails: Vec<u8>,
    heads_len: usize,
}

impl EncodeContext {
    fn with_capacity(len: usize) -> Self {
        Self {
            heads: Vec::with_capacity(len),
            tails: Vec::new(),
            heads_len: 0,
        }
    }

    fn push(&mut self, ty: &ParamType, encoded: Vec<u8>) {
        if ty.is_dynamic() {
            self.heads.push(Head::Placeholder {
                tail_start: self.tails.len(),
            });
            self.heads_len += 32;
            self.tails.extend_from_slice(&encoded);
        } else {
            self.heads_len += encoded.len();
            self.heads.push(Head::Inline(encoded));
        }
    }

    /// Backpatches placeholders and concatenates heads and tails.
    fn finish(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.heads_len + self.tails.len());
        for head in self.heads {
            match head {
                Head::Inline(bytes) => out.extend_from_slice(&bytes),
                Head::Placeholder { tail_start } => {
                    out.extend_from_slice(&encode_usize(self.heads_len + tail_start))
                }
            }
        }
        out.extend_from_slice(&self.tails);
        out
    }
}

fn encode_sequence<'a, I>(types: I, values: &[AbiValue]) -> Result<Vec<u8>, AbiError>
where
    I: Iterator<Item = &'a ParamType>,
{
    let mut ctx = EncodeContext::with_capacity(values.len());
    for (ty, value) in types.zip(values) {
        let encoded = encode_value(ty, value)?;
        ctx.push(ty, encoded);
    }
    Ok(ctx.finish())
}

/// Encodes a single value on its own: the inline words of a static value,
/// or the tail payload of a dynamic one.
pub(crate) fn encode_value(ty: &ParamType, value: &AbiValue) -> Result<Vec<u8>, AbiError> {
    let encoded = match (ty, value) {
        (ParamType::Uint(bits), AbiValue::Uint(v)) => encode_uint(v, *bits)?.to_vec(),
        (ParamType::Int(bits), AbiValue::Int(v)) => encode_int(v, *bits)?.to_vec(),
        (ParamType::Address, AbiValue::Address(addr)) => addr.to_word().to_vec(),
        (ParamType::Bool, AbiValue::Bool(b)) => encode_usize(*b as usize).to_vec(),
        (ParamType::FixedBytes(_), AbiValue::FixedBytes(data)) => right_pad(data, 32),
        (ParamType::Bytes, AbiValue::Bytes(data)) => encode_dynamic_bytes(data),
        (ParamType::String, AbiValue::String(s)) => encode_dynamic_bytes(s.as_bytes()),
        (ParamType::FixedArray(inner, _), AbiValue::Array(items)) => {
            encode_sequence(core::iter::repeat(inner.as_ref()), items)?
        }
        (ParamType::DynamicArray(inner), AbiValue::Array(items)) => {
            let mut out = encode_usize(items.len()).to_vec();
            out.extend(encode_sequence(core::iter::repeat(inner.as_ref()), items)?);
            out
        }
        (ParamType::Tuple(types), AbiValue::Tuple(items)) => encode_sequence(types.iter(), items)?,
        _ => {
            return Err(AbiError::TypeMismatch {
                expected: ty.canonical(),
                found: value.kind().to_string(),
            })
        }
    };
    log::trace!("encoded {} as {} bytes", ty, encoded.len());
    Ok(encoded)
}

/// Length word followed by the payload right-padded to a word boundary.
fn encode_dynamic_bytes(data: &[u8]) -> Vec<u8> {
    let mut out = encode_usize(data.len()).to_vec();
    out.extend(pad_to_word_multiple(data));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{I256, U256};
    use ethkit_common::Address;
    use hex_literal::hex;

    fn words(hex_words: &[&str]) -> Vec<u8> {
        hex_words
            .iter()
            .flat_map(|w| hex::decode(w).unwrap())
            .collect()
    }

    #[test]
    fn test_encode_uint() {
        let encoded = encode(&[ParamType::Uint(256)], &[1u64.into()]).unwrap();
        assert_eq!(
            encoded,
            hex!("0000000000000000000000000000000000000000000000000000000000000001")
        );
    }

    #[test]
    fn test_encode_string() {
        let encoded = encode(&[ParamType::String], &["dave".into()]).unwrap();
        assert_eq!(
            encoded,
            words(&[
                "0000000000000000000000000000000000000000000000000000000000000020",
                "0000000000000000000000000000000000000000000000000000000000000004",
                "6461766500000000000000000000000000000000000000000000000000000000",
            ])
        );
    }

    #[test]
    fn test_encode_transfer_args() {
        let to = Address(hex!("123456789abcdef0123456789abcdef012345678"));
        let encoded = encode(
            &[ParamType::Address, ParamType::Uint(256)],
            &[to.into(), 1_000_000u64.into()],
        )
        .unwrap();
        assert_eq!(
            encoded,
            hex!(
                "000000000000000000000000123456789abcdef0123456789abcdef012345678"
                "00000000000000000000000000000000000000000000000000000000000f4240"
            )
        );
    }

    #[test]
    fn test_encode_solidity_docs_example() {
        // f(uint256,uint32[],bytes10,bytes) with (0x123, [0x456, 0x789], "1234567890", "Hello, world!")
        let types: Vec<ParamType> = ["uint256", "uint32[]", "bytes10", "bytes"]
            .iter()
            .map(|t| ParamType::parse(t).unwrap())
            .collect();
        let values = vec![
            AbiValue::Uint(U256::from(0x123u64)),
            AbiValue::Array(vec![0x456u64.into(), 0x789u64.into()]),
            AbiValue::FixedBytes(b"1234567890".to_vec()),
            AbiValue::Bytes(b"Hello, world!".to_vec()),
        ];
        let encoded = encode(&types, &values).unwrap();
        assert_eq!(
            encoded,
            words(&[
                "0000000000000000000000000000000000000000000000000000000000000123",
                "0000000000000000000000000000000000000000000000000000000000000080",
                "3132333435363738393000000000000000000000000000000000000000000000",
                "00000000000000000000000000000000000000000000000000000000000000e0",
                "0000000000000000000000000000000000000000000000000000000000000002",
                "0000000000000000000000000000000000000000000000000000000000000456",
                "0000000000000000000000000000000000000000000000000000000000000789",
                "000000000000000000000000000000000000000000000000000000000000000d",
                "48656c6c6f2c20776f726c642100000000000000000000000000000000000000",
            ])
        );
    }

    #[test]
    fn test_encode_array_of_dynamic_tuples() {
        // (uint256,string)[] with two elements: each tuple gets its own offset word
        let ty = ParamType::parse("(uint256,string)[]").unwrap();
        let value = AbiValue::Array(vec![
            AbiValue::Tuple(vec![1u64.into(), "one".into()]),
            AbiValue::Tuple(vec![2u64.into(), "two".into()]),
        ]);
        let encoded = encode(&[ty], &[value]).unwrap();
        assert_eq!(
            encoded,
            words(&[
                "0000000000000000000000000000000000000000000000000000000000000020",
                "0000000000000000000000000000000000000000000000000000000000000002",
                "0000000000000000000000000000000000000000000000000000000000000040",
                "00000000000000000000000000000000000000000000000000000000000000c0",
                "0000000000000000000000000000000000000000000000000000000000000001",
                "0000000000000000000000000000000000000000000000000000000000000040",
                "0000000000000000000000000000000000000000000000000000000000000003",
                "6f6e650000000000000000000000000000000000000000000000000000000000",
                "0000000000000000000000000000000000000000000000000000000000000002",
                "0000000000000000000000000000000000000000000000000000000000000040",
                "0000000000000000000000000000000000000000000000000000000000000003",
                "74776f0000000000000000000000000000000000000000000000000000000000",
            ])
        );
    }

    #[test]
    fn test_encode_fixed_array_of_dynamic() {
        // string[2] has internal offsets but no length word
        let ty = ParamType::parse("string[2]").unwrap();
        let value = AbiValue::Array(vec!["a".into(), "b".into()]);
        let encoded = encode(&[ty], &[value]).unwrap();
        assert_eq!(
            encoded,
            words(&[
                "0000000000000000000000000000000000000000000000000000000000000020",
                "0000000000000000000000000000000000000000000000000000000000000040",
                "0000000000000000000000000000000000000000000000000000000000000080",
                "0000000000000000000000000000000000000000000000000000000000000001",
                "6100000000000000000000000000000000000000000000000000000000000000",
                "0000000000000000000000000000000000000000000000000000000000000001",
                "6200000000000000000000000000000000000000000000000000000000000000",
            ])
        );
    }

    #[test]
    fn test_encode_static_fixed_array_inline() {
        let ty = ParamType::parse("uint8[2]").unwrap();
        let value = AbiValue::Array(vec![1u64.into(), 2u64.into()]);
        let encoded = encode(&[ty, ParamType::Bool], &[value, true.into()]).unwrap();
        assert_eq!(encoded.len(), 96);
        assert_eq!(encoded[31], 1);
        assert_eq!(encoded[63], 2);
        assert_eq!(encoded[95], 1);
    }

    #[test]
    fn test_encode_negative_int() {
        let encoded = encode(&[ParamType::Int(32)], &[I256::from(-1).into()]).unwrap();
        assert_eq!(encoded, [0xff; 32]);
    }

    #[test]
    fn test_encode_errors() {
        assert_eq!(
            encode(&[ParamType::Uint(8)], &[256u64.into()]),
            Err(AbiError::Overflow { bits: 8, signed: false })
        );
        assert_eq!(
            encode(&[ParamType::Bool], &[]),
            Err(AbiError::ArityMismatch { expected: 1, found: 0 })
        );
        assert!(matches!(
            encode(&[ParamType::Address], &["x".into()]),
            Err(AbiError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_encode_rejects_invalid_types() {
        assert!(matches!(
            encode(&[ParamType::FixedBytes(40)], &[AbiValue::FixedBytes(vec![1; 40])]),
            Err(AbiError::UnknownType(_))
        ));
        let huge = ParamType::FixedArray(Box::new(ParamType::Uint(256)), usize::MAX / 16);
        assert!(matches!(
            encode(&[huge], &[AbiValue::Array(vec![])]),
            Err(AbiError::TypeTooLarge(_))
        ));
    }
}
