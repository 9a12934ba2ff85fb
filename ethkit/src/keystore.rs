//! Key provider seam.
//!
//! Encrypted keystores, mnemonic derivation and hardware-backed stores live
//! outside this crate. They plug in by implementing [`KeySource`].

use std::collections::HashMap;

use ethkit_common::Address;

use crate::signing::{PrivateKey, SigningError};

/// Supplies signing keys for accounts.
///
/// Implementations hand out a [`PrivateKey`], which wipes its bytes when
/// dropped; callers must not copy the raw bytes elsewhere.
pub trait KeySource {
    /// Returns the key for `account`, unlocked with `password`.
    fn signing_key_for(&self, account: &Address, password: &str) -> Result<PrivateKey, SigningError>;

    /// Accounts this source can sign for.
    fn accounts(&self) -> Vec<Address>;
}

impl<T: KeySource + ?Sized> KeySource for &T {
    fn signing_key_for(&self, account: &Address, password: &str) -> Result<PrivateKey, SigningError> {
        (**self).signing_key_for(account, password)
    }

    fn accounts(&self) -> Vec<Address> {
        (**self).accounts()
    }
}

/// In-memory key source. Passwords are ignored.
#[derive(Default)]
pub struct StaticKeySource {
    keys: HashMap<Address, PrivateKey>,
}

impl StaticKeySource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key, returning the account it signs for.
    pub fn insert(&mut self, key: PrivateKey) -> Result<Address, SigningError> {
        let address = key.address()?;
        log::debug!("key source: added account {address}");
        self.keys.insert(address, key);
        Ok(address)
    }
}

impl KeySource for StaticKeySource {
    fn signing_key_for(&self, account: &Address, _password: &str) -> Result<PrivateKey, SigningError> {
        self.keys
            .get(account)
            .cloned()
            .ok_or_else(|| SigningError::KeyUnavailable(format!("no key for {account}")))
    }

    fn accounts(&self) -> Vec<Address> {
        let mut accounts: Vec<Address> = self.keys.keys().copied().collect();
        accounts.sort();
        accounts
    }
}
