//! Head/tail decoder.
//!
//! Mirrors [`super::encoder`]: a sequence is read head by head, static
//! values in place and dynamic values by following their offset word.
//! Offsets are relative to the start of the enclosing sequence.

use ethkit_common::{Address, WORD_SIZE};

use super::types::ParamType;
use super::value::AbiValue;
use super::AbiError;
use crate::config::CodecLimits;
use crate::primitives::{decode_int, decode_uint, padded_len};

/// Decodes `data` as the ABI tuple `types` using default limits.
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
    decode_with_limits(types, data, &CodecLimits::default())
}

/// Decodes `data` as the ABI tuple `types` under explicit limits.
pub fn decode_with_limits(
    types: &[ParamType],
    data: &[u8],
    limits: &CodecLimits,
) -> Result<Vec<AbiValue>, AbiError> {
    for ty in types {
        ty.validate()?;
    }
    Decoder::new(data, *limits).decode_sequence(0, types.iter(), 0)
}

/// ABI decoder over a borrowed buffer.
pub struct Decoder<'a> {
    data: &'a [u8],
    limits: CodecLimits,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder.
    pub fn new(data: &'a [u8], limits: CodecLimits) -> Self {
        Self { data, limits }
    }

    /// Decodes one value of type `ty` whose encoding starts at `pos`.
    ///
    /// For a static type `pos` is its head; for a dynamic type it is the
    /// start of its tail.
    pub fn decode_value(
        &self,
        pos: usize,
        ty: &ParamType,
        depth: usize,
    ) -> Result<AbiValue, AbiError> {
        if depth > self.limits.max_abi_depth {
            return Err(AbiError::NestingTooDeep {
                max: self.limits.max_abi_depth,
            });
        }

        match ty {
            ParamType::Uint(bits) => Ok(AbiValue::Uint(decode_uint(&self.read_word(pos)?, *bits)?)),

            ParamType::Int(bits) => Ok(AbiValue::Int(decode_int(&self.read_word(pos)?, *bits)?)),

            ParamType::Address => {
                let word = self.read_word(pos)?;
                if word[..12].iter().any(|&b| b != 0) {
                    return Err(AbiError::InvalidPadding);
                }
                let mut addr = [0u8; 20];
                addr.copy_from_slice(&word[12..]);
                Ok(AbiValue::Address(Address(addr)))
            }

            ParamType::Bool => {
                let word = self.read_word(pos)?;
                if word[..31].iter().any(|&b| b != 0) || word[31] > 1 {
                    return Err(AbiError::InvalidBool);
                }
                Ok(AbiValue::Bool(word[31] == 1))
            }

            ParamType::FixedBytes(len) => {
                if !(1..=WORD_SIZE).contains(len) {
                    return Err(AbiError::UnknownType(ty.to_string()));
                }
                let word = self.read_word(pos)?;
                if word[*len..].iter().any(|&b| b != 0) {
                    return Err(AbiError::InvalidPadding);
                }
                Ok(AbiValue::FixedBytes(word[..*len].to_vec()))
            }

            ParamType::Bytes => Ok(AbiValue::Bytes(self.read_dynamic_bytes(pos)?.to_vec())),

            ParamType::String => {
                let bytes = self.read_dynamic_bytes(pos)?;
                let s = core::str::from_utf8(bytes).map_err(|_| AbiError::InvalidUtf8)?;
                Ok(AbiValue::String(s.to_string()))
            }

            ParamType::DynamicArray(inner) => {
                let len = self.read_usize(pos)?;
                if len > self.limits.max_array_len {
                    return Err(AbiError::DataTooLarge {
                        size: len,
                        max: self.limits.max_array_len,
                    });
                }
                let base = pos + WORD_SIZE;
                self.require_heads(base, inner, len)?;
                let values =
                    self.decode_sequence(base, core::iter::repeat(inner.as_ref()).take(len), depth + 1)?;
                Ok(AbiValue::Array(values))
            }

            ParamType::FixedArray(inner, len) => {
                self.require_heads(pos, inner, *len)?;
                let values =
                    self.decode_sequence(pos, core::iter::repeat(inner.as_ref()).take(*len), depth + 1)?;
                Ok(AbiValue::Array(values))
            }

            ParamType::Tuple(types) => {
                let values = self.decode_sequence(pos, types.iter(), depth + 1)?;
                Ok(AbiValue::Tuple(values))
            }
        }
    }

    /// Decodes a head/tail sequence starting at `base`.
    pub fn decode_sequence<'t, I>(
        &self,
        base: usize,
        types: I,
        depth: usize,
    ) -> Result<Vec<AbiValue>, AbiError>
    where
        I: Iterator<Item = &'t ParamType>,
    {
        // Never reserve more slots than there are words left to read.
        let words_left = self.data.len().saturating_sub(base) / WORD_SIZE;
        let mut values = Vec::with_capacity(types.size_hint().0.min(words_left + 1));
        let mut cursor = base;

        for ty in types {
            let pos = if ty.is_dynamic() {
                let offset = self.read_usize(cursor)?;
                let target = base.checked_add(offset).ok_or(AbiError::InvalidOffset {
                    offset,
                    len: self.data.len(),
                })?;
                if target >= self.data.len() {
                    return Err(AbiError::InvalidOffset {
                        offset: target,
                        len: self.data.len(),
                    });
                }
                target
            } else {
                cursor
            };
            values.push(self.decode_value(pos, ty, depth)?);
            cursor = cursor
                .checked_add(ty.head_size()?)
                .ok_or_else(|| AbiError::TypeTooLarge(ty.to_string()))?;
        }

        Ok(values)
    }

    /// Fails unless the heads of `count` elements of `inner` fit at `pos`.
    ///
    /// Runs before any element is allocated. Zero-sized elements (empty
    /// tuples) are bounded by the array length limit instead.
    fn require_heads(&self, pos: usize, inner: &ParamType, count: usize) -> Result<(), AbiError> {
        let head = inner.head_size()?;
        if head == 0 && count > self.limits.max_array_len {
            return Err(AbiError::DataTooLarge {
                size: count,
                max: self.limits.max_array_len,
            });
        }
        let needed = head
            .checked_mul(count)
            .ok_or_else(|| AbiError::TypeTooLarge(inner.to_string()))?;
        self.require(pos, needed)
    }

    /// Fails unless `len` bytes are available at `pos`.
    fn require(&self, pos: usize, len: usize) -> Result<(), AbiError> {
        let available = self.data.len().saturating_sub(pos);
        if len > available {
            return Err(AbiError::Truncated {
                needed: len,
                available,
            });
        }
        Ok(())
    }

    /// Reads a 32-byte word at `pos`.
    fn read_word(&self, pos: usize) -> Result<[u8; 32], AbiError> {
        self.require(pos, WORD_SIZE)?;
        let mut word = [0u8; 32];
        word.copy_from_slice(&self.data[pos..pos + WORD_SIZE]);
        Ok(word)
    }

    /// Reads a word holding a length or offset.
    fn read_usize(&self, pos: usize) -> Result<usize, AbiError> {
        let word = self.read_word(pos)?;
        let too_large = || AbiError::InvalidOffset {
            offset: usize::MAX,
            len: self.data.len(),
        };
        if word[..24].iter().any(|&b| b != 0) {
            return Err(too_large());
        }
        let mut low = [0u8; 8];
        low.copy_from_slice(&word[24..]);
        usize::try_from(u64::from_be_bytes(low)).map_err(|_| too_large())
    }

    /// Reads a length-prefixed payload, requiring its full padded size.
    fn read_dynamic_bytes(&self, pos: usize) -> Result<&'a [u8], AbiError> {
        let len = self.read_usize(pos)?;
        if len > self.limits.max_dynamic_size {
            return Err(AbiError::DataTooLarge {
                size: len,
                max: self.limits.max_dynamic_size,
            });
        }
        self.require(pos, WORD_SIZE + padded_len(len))?;
        let start = pos + WORD_SIZE;
        Ok(&self.data[start..start + len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::encode;
    use crate::primitives::U256;
    use hex_literal::hex;

    #[test]
    fn test_decode_uint() {
        let data = hex!("0000000000000000000000000000000000000000000000000000000000000001");
        let values = decode(&[ParamType::Uint(256)], &data).unwrap();
        assert_eq!(values, vec![AbiValue::Uint(U256::one())]);
    }

    #[test]
    fn test_decode_simple_transfer() {
        let data = hex!(
            "000000000000000000000000123456789abcdef0123456789abcdef012345678"
            "00000000000000000000000000000000000000000000000000000000000f4240"
        );
        let values = decode(&[ParamType::Address, ParamType::Uint(256)], &data).unwrap();
        assert_eq!(
            values[0].as_address().unwrap().0,
            hex!("123456789abcdef0123456789abcdef012345678")
        );
        assert_eq!(values[1].as_uint().unwrap(), &U256::from(1_000_000u64));
    }

    #[test]
    fn test_decode_string() {
        let encoded = encode(&[ParamType::String], &["dave".into()]).unwrap();
        let values = decode(&[ParamType::String], &encoded).unwrap();
        assert_eq!(values[0].as_str(), Some("dave"));
    }

    #[test]
    fn test_decode_nested_dynamic() {
        let ty = ParamType::parse("(uint256,string)[]").unwrap();
        let value = AbiValue::Array(vec![
            AbiValue::Tuple(vec![1u64.into(), "one".into()]),
            AbiValue::Tuple(vec![2u64.into(), "two".into()]),
        ]);
        let encoded = encode(&[ty.clone()], &[value.clone()]).unwrap();
        assert_eq!(decode(&[ty], &encoded).unwrap(), vec![value]);
    }

    #[test]
    fn test_decode_bool_strict() {
        let mut data = [0u8; 32];
        data[31] = 2;
        assert_eq!(decode(&[ParamType::Bool], &data), Err(AbiError::InvalidBool));
    }

    #[test]
    fn test_decode_address_padding() {
        let mut data = [0u8; 32];
        data[0] = 1;
        assert_eq!(decode(&[ParamType::Address], &data), Err(AbiError::InvalidPadding));
    }

    #[test]
    fn test_decode_truncated_payload() {
        // Declares 4 bytes but the padded payload word is missing.
        let data = hex!(
            "0000000000000000000000000000000000000000000000000000000000000020"
            "0000000000000000000000000000000000000000000000000000000000000004"
        );
        assert_eq!(
            decode(&[ParamType::String], &data),
            Err(AbiError::Truncated {
                needed: 64,
                available: 32
            })
        );
    }

    #[test]
    fn test_decode_offset_out_of_bounds() {
        let data = hex!("0000000000000000000000000000000000000000000000000000000000000100");
        assert!(matches!(
            decode(&[ParamType::Bytes], &data),
            Err(AbiError::InvalidOffset { offset: 0x100, len: 32 })
        ));
    }

    #[test]
    fn test_decode_huge_array_count() {
        let data = hex!(
            "0000000000000000000000000000000000000000000000000000000000000020"
            "0000000000000000000000000000000000000000000000000000000000000010"
        );
        assert!(matches!(
            decode(&[ParamType::parse("uint256[]").unwrap()], &data),
            Err(AbiError::Truncated { .. })
        ));

        let limits = CodecLimits {
            max_array_len: 8,
            ..CodecLimits::default()
        };
        assert_eq!(
            decode_with_limits(&[ParamType::parse("uint256[]").unwrap()], &data, &limits),
            Err(AbiError::DataTooLarge { size: 16, max: 8 })
        );
    }

    #[test]
    fn test_decode_depth_limit() {
        let ty = ParamType::parse("uint8[1][1][1][1]").unwrap();
        let data = [0u8; 32];
        let limits = CodecLimits {
            max_abi_depth: 2,
            ..CodecLimits::default()
        };
        assert_eq!(
            decode_with_limits(&[ty.clone()], &data, &limits),
            Err(AbiError::NestingTooDeep { max: 2 })
        );
        assert!(decode(&[ty], &data).is_ok());
    }

    #[test]
    fn test_decode_int_out_of_range() {
        // 0x0100 is not a valid uint8
        let mut data = [0u8; 32];
        data[30] = 1;
        assert_eq!(
            decode(&[ParamType::Uint(8)], &data),
            Err(AbiError::Overflow { bits: 8, signed: false })
        );
    }

    #[test]
    fn test_decode_huge_fixed_array() {
        // One word of data cannot hold 10^17 uint8 heads.
        let ty = ParamType::parse("uint8[100000000000000000]").unwrap();
        assert!(matches!(
            decode(&[ty], &[0u8; 32]),
            Err(AbiError::Truncated { available: 32, .. })
        ));
    }

    #[test]
    fn test_decode_empty_tuple_array_bounded() {
        let ty = ParamType::FixedArray(Box::new(ParamType::Tuple(vec![])), 1_000_000);
        assert_eq!(
            decode(&[ty], &[]),
            Err(AbiError::DataTooLarge {
                size: 1_000_000,
                max: CodecLimits::default().max_array_len
            })
        );
    }

    #[test]
    fn test_decode_rejects_oversized_head() {
        let ty = ParamType::Tuple(vec![
            ParamType::FixedArray(Box::new(ParamType::Uint(256)), usize::MAX / 16),
            ParamType::Bool,
        ]);
        assert!(matches!(
            decode(&[ty], &[0u8; 64]),
            Err(AbiError::TypeTooLarge(_))
        ));
    }

    #[test]
    fn test_decode_rejects_invalid_widths() {
        let data = [0u8; 32];
        assert!(matches!(
            decode(&[ParamType::FixedBytes(40)], &data),
            Err(AbiError::UnknownType(_))
        ));
        assert!(matches!(
            decode(&[ParamType::Uint(512)], &data),
            Err(AbiError::UnknownType(_))
        ));

        // Bypassing type validation still hits the width guard.
        let decoder = Decoder::new(&data, CodecLimits::default());
        assert!(matches!(
            decoder.decode_value(0, &ParamType::FixedBytes(40), 0),
            Err(AbiError::UnknownType(_))
        ));
    }

    #[test]
    fn test_decode_fixed_string_array() {
        let ty = ParamType::parse("string[2]").unwrap();
        let value = AbiValue::Array(vec!["left".into(), "right".into()]);
        let encoded = encode(&[ty.clone()], &[value.clone()]).unwrap();
        assert_eq!(decode(&[ty], &encoded).unwrap(), vec![value]);
    }
}
