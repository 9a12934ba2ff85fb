//! ABI/RLP codec and transaction signing for Ethereum clients.
//!
//! This crate provides:
//! - Fixed-width integer and padding primitives for 32-byte ABI words
//! - RLP encoding and decoding of nested byte-string/list trees
//! - The contract ABI type system, head/tail codec and JSON descriptor parsing
//! - Legacy, EIP-2930 and EIP-1559 transaction models with signing preimages
//! - Recoverable secp256k1 signing with EIP-155 `v` handling
//!
//! Everything here is pure and synchronous. Transport, keystores and gas
//! estimation are external collaborators; see [`keystore::KeySource`].
//!
//! # Security
//!
//! All decoders operate on untrusted input. They:
//! - Validate every length and offset before access
//! - Fail closed with a typed error instead of substituting defaults
//! - Bound recursion depth and allocation size via [`config::CodecLimits`]

pub mod abi;
pub mod config;
pub mod crypto;
pub mod error;
pub mod keystore;
pub mod primitives;
pub mod rlp;
pub mod signing;
pub mod transaction;

pub use config::{ChainIdPolicy, CodecLimits, Config, SignerConfig};
pub use error::Error;
pub use ethkit_common::{Address, ChainId, Hash256, Selector, Signature, TransactionType};
pub use primitives::{I256, U256};

/// Convenience result alias using the crate-level [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;
