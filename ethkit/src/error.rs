//! Crate-level error wrapping the per-module error types.

use core::fmt;

use ethkit_common::CommonError;

use crate::abi::AbiError;
use crate::config::ConfigError;
use crate::rlp::RlpError;
use crate::signing::SigningError;
use crate::transaction::TransactionError;

/// Any error produced by this crate.
#[derive(Debug)]
pub enum Error {
    /// Malformed primitive value (hex, address, recovery id).
    Common(CommonError),
    /// RLP framing error.
    Rlp(RlpError),
    /// ABI type or value error.
    Abi(AbiError),
    /// Transaction assembly or decoding error.
    Transaction(TransactionError),
    /// Key handling or signing error.
    Signing(SigningError),
    /// Configuration loading error.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Common(e) => write!(f, "{e}"),
            Error::Rlp(e) => write!(f, "rlp: {e}"),
            Error::Abi(e) => write!(f, "abi: {e}"),
            Error::Transaction(e) => write!(f, "transaction: {e}"),
            Error::Signing(e) => write!(f, "signing: {e}"),
            Error::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Common(e) => Some(e),
            Error::Rlp(e) => Some(e),
            Error::Abi(e) => Some(e),
            Error::Transaction(e) => Some(e),
            Error::Signing(e) => Some(e),
            Error::Config(e) => Some(e),
        }
    }
}

impl From<CommonError> for Error {
    fn from(e: CommonError) -> Self {
        Error::Common(e)
    }
}

impl From<RlpError> for Error {
    fn from(e: RlpError) -> Self {
        Error::Rlp(e)
    }
}

impl From<AbiError> for Error {
    fn from(e: AbiError) -> Self {
        Error::Abi(e)
    }
}

impl From<TransactionError> for Error {
    fn from(e: TransactionError) -> Self {
        Error::Transaction(e)
    }
}

impl From<SigningError> for Error {
    fn from(e: SigningError) -> Self {
        Error::Signing(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_source_chain() {
        let err: Error = RlpError::ExpectedList.into();
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "rlp: expected list, found byte string");
    }
}
