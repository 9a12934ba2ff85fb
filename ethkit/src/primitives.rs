//! Fixed-width integer encodings and word padding.
//!
//! ABI integers occupy one 32-byte big-endian word. Unsigned values are
//! zero-extended; signed values are two's complement, sign-extended to 256
//! bits. Both directions enforce the declared bit width: a value that does
//! not fit is an error, never truncated.

use core::fmt;

use ethkit_common::WORD_SIZE;

use crate::abi::AbiError;

pub use primitive_types::U256;

// =============================================================================
// I256
// =============================================================================

/// 256-bit two's-complement signed integer.
///
/// Stored as the raw 256-bit pattern, so `I256::from_i128(-1).into_raw()`
/// is `U256::MAX`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct I256(U256);

impl I256 {
    /// Zero.
    pub fn zero() -> Self {
        I256(U256::zero())
    }

    /// Wraps a raw two's-complement bit pattern.
    pub fn from_raw(raw: U256) -> Self {
        I256(raw)
    }

    /// Returns the raw two's-complement bit pattern.
    pub fn into_raw(self) -> U256 {
        self.0
    }

    /// Converts from a native signed integer.
    pub fn from_i128(value: i128) -> Self {
        let magnitude = U256::from(value.unsigned_abs());
        if value < 0 {
            I256(magnitude.overflowing_neg().0)
        } else {
            I256(magnitude)
        }
    }

    /// Parses a decimal string with an optional leading `-`.
    pub fn from_dec_str(s: &str) -> Result<Self, AbiError> {
        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let magnitude = U256::from_dec_str(digits)
            .map_err(|_| AbiError::InvalidValue(format!("not a decimal integer: {s:?}")))?;

        let min_magnitude = U256::one() << 255;
        if negative {
            if magnitude > min_magnitude {
                return Err(AbiError::Overflow { bits: 256, signed: true });
            }
            Ok(I256(magnitude.overflowing_neg().0))
        } else {
            if magnitude >= min_magnitude {
                return Err(AbiError::Overflow { bits: 256, signed: true });
            }
            Ok(I256(magnitude))
        }
    }

    /// Returns true when the value is below zero.
    pub fn is_negative(&self) -> bool {
        self.0.bit(255)
    }

    /// Returns the magnitude. `I256::MIN` maps to `2^255`.
    pub fn unsigned_abs(&self) -> U256 {
        if self.is_negative() {
            self.0.overflowing_neg().0
        } else {
            self.0
        }
    }

    /// Returns true if the value is representable as a `bits`-wide signed integer.
    pub fn fits(&self, bits: u16) -> bool {
        if bits >= 256 {
            return true;
        }
        // For negative x, !x == -x - 1, which must fit in bits - 1 like a positive value.
        let magnitude = if self.is_negative() { !self.0 } else { self.0 };
        magnitude.bits() < bits as usize
    }
}

impl From<i64> for I256 {
    fn from(value: i64) -> Self {
        I256::from_i128(value as i128)
    }
}

impl fmt::Display for I256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-{}", self.unsigned_abs())
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl fmt::Debug for I256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I256({self})")
    }
}

// =============================================================================
// Word encodings
// =============================================================================

/// Encodes an unsigned integer as a zero-left-padded 32-byte word.
pub fn encode_uint(value: &U256, bits: u16) -> Result<[u8; 32], AbiError> {
    if value.bits() > bits as usize {
        return Err(AbiError::Overflow { bits, signed: false });
    }
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    Ok(word)
}

/// Encodes a signed integer as a sign-extended two's-complement 32-byte word.
pub fn encode_int(value: &I256, bits: u16) -> Result<[u8; 32], AbiError> {
    if !value.fits(bits) {
        return Err(AbiError::Overflow { bits, signed: true });
    }
    let mut word = [0u8; 32];
    value.into_raw().to_big_endian(&mut word);
    Ok(word)
}

/// Decodes an unsigned `bits`-wide integer from a word.
pub fn decode_uint(word: &[u8; 32], bits: u16) -> Result<U256, AbiError> {
    let value = U256::from_big_endian(word);
    if value.bits() > bits as usize {
        return Err(AbiError::Overflow { bits, signed: false });
    }
    Ok(value)
}

/// Decodes a signed `bits`-wide integer from a word, requiring proper sign extension.
pub fn decode_int(word: &[u8; 32], bits: u16) -> Result<I256, AbiError> {
    let value = I256::from_raw(U256::from_big_endian(word));
    if !value.fits(bits) {
        return Err(AbiError::Overflow { bits, signed: true });
    }
    Ok(value)
}

/// Encodes a `usize` (length or offset) as a word.
pub fn encode_usize(value: usize) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

// =============================================================================
// Padding
// =============================================================================

/// Prepends zero bytes until `data` is `len` bytes long.
pub fn left_pad(data: &[u8], len: usize) -> Vec<u8> {
    if data.len() >= len {
        return data.to_vec();
    }
    let mut out = vec![0u8; len - data.len()];
    out.extend_from_slice(data);
    out
}

/// Appends zero bytes until `data` is `len` bytes long.
pub fn right_pad(data: &[u8], len: usize) -> Vec<u8> {
    let mut out = data.to_vec();
    if out.len() < len {
        out.resize(len, 0);
    }
    out
}

/// Right-pads `data` to the next multiple of the word size.
pub fn pad_to_word_multiple(data: &[u8]) -> Vec<u8> {
    right_pad(data, padded_len(data.len()))
}

/// Rounds `len` up to a multiple of the word size.
#[inline]
pub fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD_SIZE) * WORD_SIZE
}
