//! Error type for parsing the shared primitive types.

use core::fmt;

/// Errors produced while parsing addresses, hashes and type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommonError {
    /// Input is not valid hexadecimal.
    InvalidHex,
    /// Input has the wrong number of bytes.
    InvalidLength {
        /// Number of bytes the type requires.
        expected: usize,
        /// Number of bytes found in the input.
        found: usize,
    },
    /// Transaction type byte is not one of the supported EIP-2718 types.
    UnknownTransactionType(u8),
    /// Recovery id outside of 0..=1 (or 27..=28 in serialized form).
    InvalidRecoveryId(u8),
    /// Mixed-case address whose casing does not match its EIP-55 checksum.
    InvalidChecksum,
}

impl fmt::Display for CommonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommonError::InvalidHex => write!(f, "invalid hex string"),
            CommonError::InvalidLength { expected, found } => {
                write!(f, "invalid length: expected {expected} bytes, found {found}")
            }
            CommonError::UnknownTransactionType(ty) => {
                write!(f, "unknown transaction type 0x{ty:02x}")
            }
            CommonError::InvalidRecoveryId(v) => write!(f, "invalid recovery id {v}"),
            CommonError::InvalidChecksum => write!(f, "address checksum mismatch"),
        }
    }
}

impl std::error::Error for CommonError {}

impl From<hex::FromHexError> for CommonError {
    fn from(_: hex::FromHexError) -> Self {
        CommonError::InvalidHex
    }
}
