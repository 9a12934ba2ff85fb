//! RLP (Recursive Length Prefix) codec.
//!
//! RLP is the framing used for every Ethereum transaction on the wire.
//!
//! # Encoding rules
//!
//! - Single byte [0x00, 0x7f]: itself
//! - String [0x80, 0xb7]: 0x80 + len, then data
//! - String [0xb8, 0xbf]: 0xb7 + len_of_len, then len, then data
//! - List [0xc0, 0xf7]: 0xc0 + len, then items
//! - List [0xf8, 0xff]: 0xf7 + len_of_len, then len, then items
//!
//! # Security
//!
//! - Validates all length fields before access
//! - Rejects non-canonical encodings
//! - Bounded recursion depth (see [`CodecLimits::max_rlp_depth`])

use core::fmt;

use ethkit_common::Address;

use crate::config::CodecLimits;
use crate::primitives::U256;

/// RLP decoding errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RlpError {
    /// Input is empty when data expected.
    EmptyInput,
    /// Input too short for declared length.
    UnexpectedEof {
        /// Bytes required by the header.
        needed: usize,
        /// Bytes actually remaining.
        available: usize,
    },
    /// Non-canonical encoding (leading zeros in length, long form for short payload).
    NonCanonical,
    /// Single byte should be encoded as itself.
    SingleByteMismatch,
    /// Length field is too large.
    LengthOverflow,
    /// Exceeded maximum nesting depth.
    TooDeep {
        /// Configured limit.
        max: usize,
    },
    /// Expected list but got string.
    ExpectedList,
    /// Expected string but got list.
    ExpectedString,
    /// Extra data after RLP item.
    TrailingData {
        /// Number of unconsumed bytes.
        remaining: usize,
    },
    /// Integer has leading zero bytes.
    LeadingZero,
    /// Integer or fixed-size value is longer than its target type.
    ValueTooLarge {
        /// Maximum length in bytes.
        max: usize,
        /// Length found.
        found: usize,
    },
    /// Fixed-size value has the wrong length.
    InvalidLength {
        /// Required length in bytes.
        expected: usize,
        /// Length found.
        found: usize,
    },
}

impl fmt::Display for RlpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RlpError::EmptyInput => write!(f, "empty input"),
            RlpError::UnexpectedEof { needed, available } => write!(
                f,
                "declared length exceeds buffer: need {needed} bytes, {available} available"
            ),
            RlpError::NonCanonical => write!(f, "non-canonical length encoding"),
            RlpError::SingleByteMismatch => {
                write!(f, "single byte below 0x80 must encode as itself")
            }
            RlpError::LengthOverflow => write!(f, "length field overflows"),
            RlpError::TooDeep { max } => write!(f, "nesting deeper than {max} levels"),
            RlpError::ExpectedList => write!(f, "expected list, found byte string"),
            RlpError::ExpectedString => write!(f, "expected byte string, found list"),
            RlpError::TrailingData { remaining } => {
                write!(f, "{remaining} trailing bytes after item")
            }
            RlpError::LeadingZero => write!(f, "integer has leading zero bytes"),
            RlpError::ValueTooLarge { max, found } => {
                write!(f, "value is {found} bytes, at most {max} allowed")
            }
            RlpError::InvalidLength { expected, found } => {
                write!(f, "expected {expected} bytes, found {found}")
            }
        }
    }
}

impl std::error::Error for RlpError {}

// =============================================================================
// Item tree
// =============================================================================

/// An RLP item.
///
/// `Empty` and `Bytes(vec![])` both encode as `0x80` and compare equal; the
/// decoder always produces `Empty` for a zero-length string.
#[derive(Debug, Clone, Eq)]
pub enum RlpItem {
    /// The empty byte string.
    Empty,
    /// A byte string.
    Bytes(Vec<u8>),
    /// A list of items.
    List(Vec<RlpItem>),
}

impl PartialEq for RlpItem {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RlpItem::List(a), RlpItem::List(b)) => a == b,
            (RlpItem::List(_), _) | (_, RlpItem::List(_)) => false,
            (a, b) => a.byte_slice() == b.byte_slice(),
        }
    }
}

impl RlpItem {
    /// Builds a byte-string item, normalising empty input to `Empty`.
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        if data.is_empty() {
            RlpItem::Empty
        } else {
            RlpItem::Bytes(data)
        }
    }

    /// Builds a minimal big-endian integer item.
    pub fn uint(value: u64) -> Self {
        RlpItem::bytes(trim_leading_zeros(&value.to_be_bytes()))
    }

    /// Builds a minimal big-endian integer item from a 256-bit value.
    pub fn u256(value: &U256) -> Self {
        let mut buf = [0u8; 32];
        value.to_big_endian(&mut buf);
        RlpItem::bytes(trim_leading_zeros(&buf))
    }

    /// Returns true if this is a string item.
    #[inline]
    pub fn is_string(&self) -> bool {
        !self.is_list()
    }

    /// Returns true if this is a list item.
    #[inline]
    pub fn is_list(&self) -> bool {
        matches!(self, RlpItem::List(_))
    }

    fn byte_slice(&self) -> &[u8] {
        match self {
            RlpItem::Bytes(data) => data,
            _ => &[],
        }
    }

    /// Returns the string data.
    pub fn as_bytes(&self) -> Result<&[u8], RlpError> {
        match self {
            RlpItem::List(_) => Err(RlpError::ExpectedString),
            other => Ok(other.byte_slice()),
        }
    }

    /// Returns the list items.
    pub fn as_list(&self) -> Result<&[RlpItem], RlpError> {
        match self {
            RlpItem::List(items) => Ok(items),
            _ => Err(RlpError::ExpectedList),
        }
    }

    /// Reads a canonical big-endian u64.
    pub fn as_u64(&self) -> Result<u64, RlpError> {
        let data = self.as_integer_bytes(8)?;
        Ok(data.iter().fold(0u64, |acc, &b| acc << 8 | b as u64))
    }

    /// Reads a canonical big-endian 256-bit integer.
    pub fn as_u256(&self) -> Result<U256, RlpError> {
        let data = self.as_integer_bytes(32)?;
        Ok(U256::from_big_endian(data))
    }

    /// Reads a 20-byte address.
    pub fn as_address(&self) -> Result<Address, RlpError> {
        let data = self.as_bytes()?;
        Address::from_slice(data).map_err(|_| RlpError::InvalidLength {
            expected: Address::LEN,
            found: data.len(),
        })
    }

    /// Reads an exactly 32-byte value (hashes, storage keys).
    pub fn as_bytes32(&self) -> Result<[u8; 32], RlpError> {
        let data = self.as_bytes()?;
        if data.len() != 32 {
            return Err(RlpError::InvalidLength {
                expected: 32,
                found: data.len(),
            });
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(data);
        Ok(out)
    }

    fn as_integer_bytes(&self, max: usize) -> Result<&[u8], RlpError> {
        let data = self.as_bytes()?;
        if data.len() > max {
            return Err(RlpError::ValueTooLarge {
                max,
                found: data.len(),
            });
        }
        if data.first() == Some(&0) {
            return Err(RlpError::LeadingZero);
        }
        Ok(data)
    }
}

impl From<Vec<u8>> for RlpItem {
    fn from(data: Vec<u8>) -> Self {
        RlpItem::bytes(data)
    }
}

impl From<&[u8]> for RlpItem {
    fn from(data: &[u8]) -> Self {
        RlpItem::bytes(data)
    }
}

impl From<&str> for RlpItem {
    fn from(s: &str) -> Self {
        RlpItem::bytes(s.as_bytes())
    }
}

impl From<u64> for RlpItem {
    fn from(value: u64) -> Self {
        RlpItem::uint(value)
    }
}

impl From<U256> for RlpItem {
    fn from(value: U256) -> Self {
        RlpItem::u256(&value)
    }
}

impl From<Address> for RlpItem {
    fn from(address: Address) -> Self {
        RlpItem::Bytes(address.0.to_vec())
    }
}

impl From<Vec<RlpItem>> for RlpItem {
    fn from(items: Vec<RlpItem>) -> Self {
        RlpItem::List(items)
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decodes exactly one item spanning the whole input.
pub fn decode(input: &[u8]) -> Result<RlpItem, RlpError> {
    decode_with_limits(input, &CodecLimits::default())
}

/// Decodes exactly one item spanning the whole input under explicit limits.
pub fn decode_with_limits(input: &[u8], limits: &CodecLimits) -> Result<RlpItem, RlpError> {
    let (item, rest) = decode_internal(input, 0, limits.max_rlp_depth)?;
    if !rest.is_empty() {
        return Err(RlpError::TrailingData {
            remaining: rest.len(),
        });
    }
    Ok(item)
}

/// Decodes one item from the front of the input, returning the remainder.
pub fn decode_prefix(input: &[u8]) -> Result<(RlpItem, &[u8]), RlpError> {
    decode_internal(input, 0, CodecLimits::default().max_rlp_depth)
}

/// Decodes an input that must be a list, returning its items.
///
/// A byte string, even one whose payload happens to look like RLP, is
/// rejected with [`RlpError::ExpectedList`].
pub fn decode_list(input: &[u8]) -> Result<Vec<RlpItem>, RlpError> {
    decode_list_with_limits(input, &CodecLimits::default())
}

/// [`decode_list`] under explicit limits.
pub fn decode_list_with_limits(
    input: &[u8],
    limits: &CodecLimits,
) -> Result<Vec<RlpItem>, RlpError> {
    match decode_with_limits(input, limits)? {
        RlpItem::List(items) => Ok(items),
        _ => Err(RlpError::ExpectedList),
    }
}

/// Splits off `len` payload bytes after a `header`-byte prefix.
fn take(input: &[u8], header: usize, len: usize) -> Result<(&[u8], &[u8]), RlpError> {
    let needed = header.checked_add(len).ok_or(RlpError::LengthOverflow)?;
    if input.len() < needed {
        return Err(RlpError::UnexpectedEof {
            needed,
            available: input.len(),
        });
    }
    Ok((&input[header..needed], &input[needed..]))
}

/// Reads a long-form length, rejecting leading zeros and short payloads.
fn read_long_length(input: &[u8], len_of_len: usize) -> Result<usize, RlpError> {
    let (len_bytes, _) = take(input, 1, len_of_len)?;
    if len_bytes[0] == 0 {
        return Err(RlpError::NonCanonical);
    }
    let len = decode_length(len_bytes)?;
    if len < 56 {
        return Err(RlpError::NonCanonical);
    }
    Ok(len)
}

fn decode_internal(
    input: &[u8],
    depth: usize,
    max_depth: usize,
) -> Result<(RlpItem, &[u8]), RlpError> {
    if depth > max_depth {
        return Err(RlpError::TooDeep { max: max_depth });
    }

    let first = *input.first().ok_or(RlpError::EmptyInput)?;

    match first {
        // Single byte
        0x00..=0x7f => Ok((RlpItem::Bytes(vec![first]), &input[1..])),

        // Short string (0-55 bytes)
        0x80..=0xb7 => {
            let len = (first - 0x80) as usize;
            let (data, rest) = take(input, 1, len)?;
            if len == 1 && data[0] < 0x80 {
                return Err(RlpError::SingleByteMismatch);
            }
            Ok((RlpItem::bytes(data), rest))
        }

        // Long string (56+ bytes)
        0xb8..=0xbf => {
            let len_of_len = (first - 0xb7) as usize;
            let len = read_long_length(input, len_of_len)?;
            let (data, rest) = take(input, 1 + len_of_len, len)?;
            Ok((RlpItem::Bytes(data.to_vec()), rest))
        }

        // Short list (0-55 bytes total)
        0xc0..=0xf7 => {
            let len = (first - 0xc0) as usize;
            let (payload, rest) = take(input, 1, len)?;
            let items = decode_list_items(payload, depth + 1, max_depth)?;
            Ok((RlpItem::List(items), rest))
        }

        // Long list (56+ bytes total)
        0xf8..=0xff => {
            let len_of_len = (first - 0xf7) as usize;
            let len = read_long_length(input, len_of_len)?;
            let (payload, rest) = take(input, 1 + len_of_len, len)?;
            let items = decode_list_items(payload, depth + 1, max_depth)?;
            Ok((RlpItem::List(items), rest))
        }
    }
}

/// Decodes a big-endian length value.
fn decode_length(bytes: &[u8]) -> Result<usize, RlpError> {
    if bytes.len() > core::mem::size_of::<usize>() {
        return Err(RlpError::LengthOverflow);
    }

    let mut len = 0usize;
    for &byte in bytes {
        len = len.checked_shl(8).ok_or(RlpError::LengthOverflow)?;
        len = len.checked_add(byte as usize).ok_or(RlpError::LengthOverflow)?;
    }

    Ok(len)
}

/// Decodes all items in a list payload.
fn decode_list_items(
    mut data: &[u8],
    depth: usize,
    max_depth: usize,
) -> Result<Vec<RlpItem>, RlpError> {
    let mut items = Vec::new();

    while !data.is_empty() {
        let (item, rest) = decode_internal(data, depth, max_depth)?;
        items.push(item);
        data = rest;
    }

    Ok(items)
}

// =============================================================================
// Encoding
// =============================================================================

/// Encodes an item tree.
pub fn encode(item: &RlpItem) -> Vec<u8> {
    match item {
        RlpItem::Empty => vec![0x80],
        RlpItem::Bytes(data) => encode_bytes(data),
        RlpItem::List(items) => {
            let payload: Vec<u8> = items.iter().flat_map(encode).collect();
            encode_list(&payload)
        }
    }
}

/// Encodes a u64 as RLP bytes.
pub fn encode_u64(value: u64) -> Vec<u8> {
    encode_bytes(trim_leading_zeros(&value.to_be_bytes()))
}

/// Encodes a 256-bit integer as RLP bytes.
pub fn encode_u256(value: &U256) -> Vec<u8> {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    encode_bytes(trim_leading_zeros(&buf))
}

/// Encodes a byte slice as RLP.
pub fn encode_bytes(data: &[u8]) -> Vec<u8> {
    if data.len() == 1 && data[0] < 0x80 {
        return data.to_vec();
    }
    encode_with_header(0x80, data)
}

/// Encodes a list of already-encoded items as RLP.
pub fn encode_list(payload: &[u8]) -> Vec<u8> {
    encode_with_header(0xc0, payload)
}

fn encode_with_header(base: u8, payload: &[u8]) -> Vec<u8> {
    let mut result;
    if payload.len() <= 55 {
        result = Vec::with_capacity(1 + payload.len());
        result.push(base + payload.len() as u8);
    } else {
        let len_bytes = encode_length_bytes(payload.len());
        result = Vec::with_capacity(1 + len_bytes.len() + payload.len());
        // 0xb7 / 0xf7 are the long-form bases for strings / lists.
        result.push(base + 55 + len_bytes.len() as u8);
        result.extend_from_slice(&len_bytes);
    }
    result.extend_from_slice(payload);
    result
}

/// Encodes a length as big-endian bytes.
fn encode_length_bytes(len: usize) -> Vec<u8> {
    trim_leading_zeros(&len.to_be_bytes()).to_vec()
}

fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}
