//! Core types shared across the workspace.
//!
//! Values here are plain data. Validation of their contents (checksums,
//! curve membership, canonical encodings) happens in `ethkit`.

use core::fmt;
use core::str::FromStr;

use zeroize::Zeroize;

use crate::error::CommonError;

/// Keccak256 hash (32 bytes).
pub type Hash256 = [u8; 32];

/// Function or error selector (4 bytes).
pub type Selector = [u8; 4];

/// EIP-155 chain identifier.
pub type ChainId = u64;

/// Strips an optional `0x`/`0X` prefix.
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Decodes a hex string with an optional `0x` prefix.
///
/// Odd-length input is rejected: `0x1` is not a byte string.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, CommonError> {
    Ok(hex::decode(strip_hex_prefix(s.trim()))?)
}

/// Encodes bytes as a `0x`-prefixed lowercase hex string.
pub fn encode_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    out.push_str(&hex::encode(bytes));
    out
}

// =============================================================================
// Address
// =============================================================================

/// Ethereum account address (20 bytes).
///
/// `Display` renders lowercase hex. EIP-55 checksum rendering needs keccak256
/// and is provided by `ethkit::crypto::to_checksum`.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Address length in bytes.
    pub const LEN: usize = 20;

    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Creates an address from a slice, which must be exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CommonError> {
        if bytes.len() != Self::LEN {
            return Err(CommonError::InvalidLength {
                expected: Self::LEN,
                found: bytes.len(),
            });
        }
        let mut addr = [0u8; 20];
        addr.copy_from_slice(bytes);
        Ok(Address(addr))
    }

    /// Returns the raw bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns the address right-aligned in a 32-byte word.
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&self.0);
        word
    }

    /// Returns true for the zero address.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", hex::encode(self.0))
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "0x")?;
        }
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = CommonError;

    /// Parses a hex address. Checksum casing is not verified here.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = strip_hex_prefix(s.trim());
        if digits.len() != Self::LEN * 2 {
            return Err(CommonError::InvalidLength {
                expected: Self::LEN,
                found: digits.len() / 2,
            });
        }
        let bytes = hex::decode(digits)?;
        Address::from_slice(&bytes)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Signature
// =============================================================================

/// Recoverable ECDSA signature over secp256k1.
///
/// `recovery_id` is the raw parity bit (0 or 1). Chain-specific `v` values
/// are derived from it by `ethkit::signing::VValue`.
#[derive(Clone, Default, PartialEq, Eq, Hash, Zeroize)]
pub struct Signature {
    /// R component (32 bytes, big-endian).
    pub r: [u8; 32],
    /// S component (32 bytes, big-endian, low-S normalized).
    pub s: [u8; 32],
    /// Recovery identifier (0 or 1).
    pub recovery_id: u8,
}

impl Signature {
    /// Serialized length of `r || s || v`.
    pub const LEN: usize = 65;

    /// Returns the signature as a 65-byte array (r || s || v) with `v = 27 + recovery_id`.
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[0..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = 27 + self.recovery_id;
        bytes
    }

    /// Parses a 65-byte `r || s || v` signature. `v` may be 0/1 or 27/28.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CommonError> {
        if bytes.len() != Self::LEN {
            return Err(CommonError::InvalidLength {
                expected: Self::LEN,
                found: bytes.len(),
            });
        }
        let recovery_id = match bytes[64] {
            v @ (0 | 1) => v,
            v @ (27 | 28) => v - 27,
            v => return Err(CommonError::InvalidRecoveryId(v)),
        };
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[0..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self { r, s, recovery_id })
    }

    /// Returns true when both `r` and `s` are zero (an unsigned placeholder).
    pub fn is_empty(&self) -> bool {
        self.r.iter().chain(self.s.iter()).all(|&b| b == 0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("r", &encode_hex(&self.r))
            .field("s", &encode_hex(&self.s))
            .field("recovery_id", &self.recovery_id)
            .finish()
    }
}

// =============================================================================
// Transaction Types
// =============================================================================

/// Transaction type for EIP-2718 typed transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TransactionType {
    /// Legacy transaction (pre-EIP-2718).
    #[default]
    Legacy = 0x00,
    /// EIP-2930 access list transaction.
    AccessList = 0x01,
    /// EIP-1559 fee market transaction.
    FeeMarket = 0x02,
}

impl TransactionType {
    /// Returns the EIP-2718 envelope byte, `None` for legacy transactions.
    pub fn envelope_byte(self) -> Option<u8> {
        match self {
            TransactionType::Legacy => None,
            other => Some(other as u8),
        }
    }
}

impl TryFrom<u8> for TransactionType {
    type Error = CommonError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(TransactionType::Legacy),
            0x01 => Ok(TransactionType::AccessList),
            0x02 => Ok(TransactionType::FeeMarket),
            other => Err(CommonError::UnknownTransactionType(other)),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Legacy => write!(f, "legacy"),
            TransactionType::AccessList => write!(f, "eip2930"),
            TransactionType::FeeMarket => write!(f, "eip1559"),
        }
    }
}
