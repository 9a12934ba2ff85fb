//! Contract ABI codec.
//!
//! This module implements the Solidity ABI:
//! - [`ParamType`] parsing from textual type strings and JSON descriptors
//! - head/tail encoding and decoding of [`AbiValue`] sequences
//! - non-standard packed encoding (`abi.encodePacked`)
//! - functions, events, constructors and custom errors with their selectors
//! - overload-aware lookup over a whole [`Contract`] description
//!
//! # Supported Types
//!
//! - Elementary: uint8-uint256, int8-int256, address, bool, bytes1-bytes32
//! - Dynamic: bytes, string
//! - Arrays: T[] (dynamic), T[N] (fixed)
//! - Tuples: (T1, T2, ...) for struct encoding
//!
//! # Security
//!
//! Decoding operates on untrusted input. The decoder:
//! - Validates all offsets and lengths before access
//! - Bounds nesting depth, array length and dynamic payload size
//! - Rejects values that do not fit their declared type

use core::fmt;

use ethkit_common::Selector;

pub mod contract;
pub mod decoder;
pub mod element;
pub mod encoder;
pub mod json;
pub mod packed;
pub mod types;
pub mod value;

pub use contract::Contract;
pub use decoder::{decode, decode_with_limits, Decoder};
pub use element::{
    AbiElement, Constructor, ErrorDef, Event, Fallback, Function, Param, RevertReason,
    StateMutability,
};
pub use encoder::encode;
pub use json::parse_abi_json;
pub use packed::{encode_packed, solidity_keccak256};
pub use types::ParamType;
pub use value::AbiValue;

/// ABI errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    /// Unknown or malformed type string.
    UnknownType(String),
    /// Number of values does not match number of types.
    ArityMismatch {
        /// Declared parameter count.
        expected: usize,
        /// Supplied value count.
        found: usize,
    },
    /// Value kind does not match the declared type.
    TypeMismatch {
        /// Canonical declared type.
        expected: String,
        /// Kind of the supplied value.
        found: String,
    },
    /// Integer does not fit its declared width.
    Overflow {
        /// Declared bit width.
        bits: u16,
        /// Whether the declared type is signed.
        signed: bool,
    },
    /// A textual value could not be converted.
    InvalidValue(String),
    /// Offset word points outside the buffer.
    InvalidOffset {
        /// Absolute offset read from the data.
        offset: usize,
        /// Buffer length.
        len: usize,
    },
    /// Input data shorter than the encoding requires.
    Truncated {
        /// Bytes required.
        needed: usize,
        /// Bytes available.
        available: usize,
    },
    /// Invalid UTF-8 in string.
    InvalidUtf8,
    /// Boolean word other than 0 or 1.
    InvalidBool,
    /// Non-zero bytes in the padding of an address or fixed-bytes word.
    InvalidPadding,
    /// Nesting too deep.
    NestingTooDeep {
        /// Configured limit.
        max: usize,
    },
    /// Static encoding size of a type does not fit in `usize`.
    TypeTooLarge(String),
    /// Dynamic payload or array larger than the configured limit.
    DataTooLarge {
        /// Declared size.
        size: usize,
        /// Configured limit.
        max: usize,
    },
    /// Calldata or error data starts with a different selector.
    SelectorMismatch {
        /// Selector of the ABI element.
        expected: Selector,
        /// Selector found in the data.
        found: Selector,
    },
    /// First log topic is not the event topic.
    TopicMismatch,
    /// Fewer log topics than indexed parameters.
    MissingTopics {
        /// Topics required.
        expected: usize,
        /// Topics supplied.
        found: usize,
    },
    /// Two ABI elements share a signature.
    DuplicateSignature(String),
    /// A bare name matches several overloads.
    AmbiguousFunction {
        /// Name that was looked up.
        name: String,
        /// Signatures of the matching overloads.
        candidates: Vec<String>,
    },
    /// No ABI element matches the lookup key.
    NotFound(String),
    /// Malformed JSON descriptor.
    InvalidJson(String),
    /// Type cannot be used in this encoding.
    Unsupported(String),
}

impl fmt::Display for AbiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiError::UnknownType(ty) => write!(f, "unknown type {ty:?}"),
            AbiError::ArityMismatch { expected, found } => {
                write!(f, "expected {expected} values, found {found}")
            }
            AbiError::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {expected}, found {found}")
            }
            AbiError::Overflow { bits, signed } => {
                let prefix = if *signed { "int" } else { "uint" };
                write!(f, "value does not fit in {prefix}{bits}")
            }
            AbiError::InvalidValue(msg) => write!(f, "invalid value: {msg}"),
            AbiError::InvalidOffset { offset, len } => {
                write!(f, "offset {offset} outside of {len} byte buffer")
            }
            AbiError::Truncated { needed, available } => {
                write!(f, "data too short: need {needed} bytes, {available} available")
            }
            AbiError::InvalidUtf8 => write!(f, "invalid utf-8 in string"),
            AbiError::InvalidBool => write!(f, "boolean word is neither 0 nor 1"),
            AbiError::InvalidPadding => write!(f, "non-zero padding bytes"),
            AbiError::NestingTooDeep { max } => write!(f, "nesting deeper than {max} levels"),
            AbiError::TypeTooLarge(ty) => write!(f, "type {ty} is too large to encode"),
            AbiError::DataTooLarge { size, max } => {
                write!(f, "declared size {size} exceeds limit {max}")
            }
            AbiError::SelectorMismatch { expected, found } => write!(
                f,
                "selector mismatch: expected 0x{}, found 0x{}",
                hex::encode(expected),
                hex::encode(found)
            ),
            AbiError::TopicMismatch => write!(f, "log topic does not match event"),
            AbiError::MissingTopics { expected, found } => {
                write!(f, "expected {expected} topics, found {found}")
            }
            AbiError::DuplicateSignature(sig) => write!(f, "duplicate signature {sig}"),
            AbiError::AmbiguousFunction { name, candidates } => write!(
                f,
                "{name} is ambiguous, use one of: {}",
                candidates.join(", ")
            ),
            AbiError::NotFound(key) => write!(f, "no ABI element matches {key:?}"),
            AbiError::InvalidJson(msg) => write!(f, "invalid ABI JSON: {msg}"),
            AbiError::Unsupported(what) => write!(f, "unsupported: {what}"),
        }
    }
}

impl std::error::Error for AbiError {}

impl From<serde_json::Error> for AbiError {
    fn from(e: serde_json::Error) -> Self {
        AbiError::InvalidJson(e.to_string())
    }
}
