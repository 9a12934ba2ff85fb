//! Common types for the ethkit codec and signing crates.
//!
//! This crate holds the plain data types shared by the core library and its
//! front-ends: addresses, hashes, signatures and transaction type tags. It has
//! no cryptographic dependencies; hashing and key handling live in `ethkit`.

pub mod error;
pub mod types;

pub use error::CommonError;
pub use types::*;

/// Maximum raw transaction size accepted by the decoders (128KB).
pub const MAX_TX_SIZE: usize = 131_072;

/// Size of an ABI word in bytes.
pub const WORD_SIZE: usize = 32;
