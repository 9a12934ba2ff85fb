//! Recoverable ECDSA signing over secp256k1.
//!
//! This module provides:
//! - Private/public key wrappers and Ethereum address derivation
//! - Hash signing with a mandatory recovery self-check
//! - EIP-155 `v` value encoding and decoding
//! - EIP-191 personal message signing
//! - [`Signer`], which pairs a [`KeySource`] with signer settings
//!
//! # Security
//!
//! - Private key bytes are zeroized on drop
//! - Signatures are low-S normalized
//! - A signature is only returned once recovering it yields the signer's own key

use core::fmt;

use ethkit_common::{Address, ChainId, CommonError, Hash256, Signature};
use k256::ecdsa::signature::hazmat::RandomizedPrehashSigner;
use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::SignerConfig;
use crate::crypto::keccak256;
use crate::keystore::KeySource;
use crate::transaction::{SignedTransaction, TransactionError, TypedTransaction};

/// Signing errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningError {
    /// Key bytes are not a valid secp256k1 scalar.
    InvalidPrivateKey,
    /// Public key bytes are not a valid curve point.
    InvalidPublicKey,
    /// Signature components are out of range or do not recover to a key.
    InvalidSignature,
    /// Recovery id outside of 0..=1.
    InvalidRecoveryId(u8),
    /// `v` value that is neither pre-EIP-155 nor EIP-155.
    InvalidV(u64),
    /// Chain ID too large to encode into `v`.
    ChainIdOverflow(ChainId),
    /// No attempt produced a signature that recovers to the signer's key.
    ConsistencyCheckFailed {
        /// Attempts made.
        attempts: u32,
    },
    /// The key source could not provide a key.
    KeyUnavailable(String),
}

impl fmt::Display for SigningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningError::InvalidPrivateKey => write!(f, "invalid private key"),
            SigningError::InvalidPublicKey => write!(f, "invalid public key"),
            SigningError::InvalidSignature => write!(f, "invalid signature"),
            SigningError::InvalidRecoveryId(id) => write!(f, "invalid recovery id {id}"),
            SigningError::InvalidV(v) => write!(f, "invalid v value {v}"),
            SigningError::ChainIdOverflow(id) => write!(f, "chain id {id} too large for v"),
            SigningError::ConsistencyCheckFailed { attempts } => write!(
                f,
                "no signature recovered to the signing key after {attempts} attempts"
            ),
            SigningError::KeyUnavailable(msg) => write!(f, "key unavailable: {msg}"),
        }
    }
}

impl std::error::Error for SigningError {}

impl From<CommonError> for SigningError {
    fn from(e: CommonError) -> Self {
        match e {
            CommonError::InvalidRecoveryId(id) => SigningError::InvalidRecoveryId(id),
            _ => SigningError::InvalidSignature,
        }
    }
}

// =============================================================================
// Keys
// =============================================================================

/// secp256k1 private key. The bytes are wiped when the value is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    /// Validates and wraps 32 raw key bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SigningError> {
        SigningKey::from_slice(bytes).map_err(|_| SigningError::InvalidPrivateKey)?;
        let mut key = [0u8; 32];
        key.copy_from_slice(bytes);
        Ok(PrivateKey(key))
    }

    /// Parses a hex key with optional `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, SigningError> {
        let mut bytes = ethkit_common::decode_hex(s).map_err(|_| SigningError::InvalidPrivateKey)?;
        let key = Self::from_slice(&bytes);
        bytes.zeroize();
        key
    }

    /// Generates a fresh key from the OS random source.
    pub fn random() -> Self {
        let signing_key = SigningKey::random(&mut OsRng);
        PrivateKey(signing_key.to_bytes().into())
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    fn signing_key(&self) -> Result<SigningKey, SigningError> {
        SigningKey::from_slice(&self.0).map_err(|_| SigningError::InvalidPrivateKey)
    }

    /// Derives the public key.
    pub fn public_key(&self) -> Result<PublicKey, SigningError> {
        Ok(PublicKey::from_verifying_key(self.signing_key()?.verifying_key()))
    }

    /// Derives the Ethereum address.
    pub fn address(&self) -> Result<Address, SigningError> {
        Ok(self.public_key()?.address())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(..)")
    }
}

/// Uncompressed SEC1 public key (`0x04 || x || y`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 65]);

impl PublicKey {
    fn from_verifying_key(key: &VerifyingKey) -> Self {
        let encoded = key.to_encoded_point(false);
        let mut bytes = [0u8; 65];
        bytes.copy_from_slice(encoded.as_bytes());
        PublicKey(bytes)
    }

    /// Parses a compressed or uncompressed SEC1 public key.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, SigningError> {
        let key = VerifyingKey::from_sec1_bytes(bytes).map_err(|_| SigningError::InvalidPublicKey)?;
        Ok(Self::from_verifying_key(&key))
    }

    /// Uncompressed key bytes.
    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }

    /// Ethereum address of this key.
    pub fn address(&self) -> Address {
        public_key_to_address(self)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey(0x{})", hex::encode(self.0))
    }
}

/// Address = keccak256(pubkey[1..])[12..32]
///
/// (Skip the 0x04 prefix of the uncompressed key, take the last 20 bytes of the hash.)
pub fn public_key_to_address(key: &PublicKey) -> Address {
    let hash = keccak256(&key.0[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    Address(address)
}

/// Ethereum address of a private key.
pub fn address_of(key: &PrivateKey) -> Result<Address, SigningError> {
    key.address()
}

// =============================================================================
// Signing
// =============================================================================

fn to_signature(sig: &K256Signature, recovery_id: RecoveryId) -> Signature {
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&sig.r().to_bytes());
    s.copy_from_slice(&sig.s().to_bytes());
    Signature {
        r,
        s,
        recovery_id: recovery_id.to_byte(),
    }
}

/// Finds the recovery id under which `sig` recovers to `expected`.
fn trial_recovery(hash: &Hash256, sig: &K256Signature, expected: &VerifyingKey) -> Option<RecoveryId> {
    (0u8..=1)
        .filter_map(RecoveryId::from_byte)
        .find(|&id| {
            VerifyingKey::recover_from_prehash(hash, sig, id)
                .map(|recovered| recovered == *expected)
                .unwrap_or(false)
        })
}

/// Signs a 32-byte hash.
///
/// The first attempt uses a deterministic RFC 6979 nonce; later attempts
/// mix in fresh OS randomness. Each candidate is recovered and compared with
/// the key's own public key, and only a matching candidate is returned.
pub fn sign_hash(
    hash: &Hash256,
    key: &PrivateKey,
    config: &SignerConfig,
) -> Result<Signature, SigningError> {
    let signing_key = key.signing_key()?;
    let own_key = *signing_key.verifying_key();

    for attempt in 1..=config.max_attempts {
        let candidate = if attempt == 1 {
            signing_key.sign_prehash_recoverable(hash).ok()
        } else {
            let signed: Result<K256Signature, _> =
                signing_key.sign_prehash_with_rng(&mut OsRng, hash);
            signed.ok().map(|sig| {
                let sig = sig.normalize_s().unwrap_or(sig);
                let id = trial_recovery(hash, &sig, &own_key);
                (sig, id.unwrap_or(RecoveryId::new(false, false)))
            })
        };

        let Some((sig, recovery_id)) = candidate else {
            log::debug!("signing attempt {attempt} produced no signature");
            continue;
        };

        let recovered = VerifyingKey::recover_from_prehash(hash, &sig, recovery_id);
        if matches!(recovered, Ok(ref k) if *k == own_key) {
            if attempt > 1 {
                log::debug!("signature verified on attempt {attempt}");
            }
            return Ok(to_signature(&sig, recovery_id));
        }
        log::debug!("signing attempt {attempt} failed the recovery check, retrying");
    }

    log::warn!(
        "signing gave up after {} attempts",
        config.max_attempts
    );
    Err(SigningError::ConsistencyCheckFailed {
        attempts: config.max_attempts,
    })
}

/// Recovers the public key that produced `signature` over `hash`.
pub fn recover_public_key(hash: &Hash256, signature: &Signature) -> Result<PublicKey, SigningError> {
    let sig = K256Signature::from_scalars(signature.r, signature.s)
        .map_err(|_| SigningError::InvalidSignature)?;
    let recovery_id = RecoveryId::from_byte(signature.recovery_id)
        .filter(|id| !id.is_x_reduced())
        .ok_or(SigningError::InvalidRecoveryId(signature.recovery_id))?;
    let key = VerifyingKey::recover_from_prehash(hash, &sig, recovery_id)
        .map_err(|_| SigningError::InvalidSignature)?;
    Ok(PublicKey::from_verifying_key(&key))
}

/// Recovers the address that produced `signature` over `hash`.
pub fn recover_sender(hash: &Hash256, signature: &Signature) -> Result<Address, SigningError> {
    Ok(recover_public_key(hash, signature)?.address())
}

// =============================================================================
// V Value
// =============================================================================

/// What a transaction's `v` value says about its signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureKind {
    /// No signature yet (`r == s == 0`). An EIP-155 placeholder carries the
    /// chain ID in `v`.
    Unsigned {
        /// Chain ID implied by `v`, if any.
        chain_id: Option<ChainId>,
    },
    /// `v = 27 + recovery_id`.
    PreEip155 {
        /// Recovery id.
        recovery_id: u8,
    },
    /// `v = 35 + 2 * chain_id + recovery_id`.
    Eip155 {
        /// Chain ID.
        chain_id: ChainId,
        /// Recovery id.
        recovery_id: u8,
    },
}

impl SignatureKind {
    /// Chain ID carried by `v`, if any.
    pub fn chain_id(&self) -> Option<ChainId> {
        match self {
            SignatureKind::Unsigned { chain_id } => *chain_id,
            SignatureKind::PreEip155 { .. } => None,
            SignatureKind::Eip155 { chain_id, .. } => Some(*chain_id),
        }
    }

    /// Recovery id, for signed values.
    pub fn recovery_id(&self) -> Option<u8> {
        match self {
            SignatureKind::Unsigned { .. } => None,
            SignatureKind::PreEip155 { recovery_id }
            | SignatureKind::Eip155 { recovery_id, .. } => Some(*recovery_id),
        }
    }
}

/// Legacy transaction `v` arithmetic.
pub struct VValue;

impl VValue {
    /// Computes `v`.
    ///
    /// - With chain ID (EIP-155): v = chain_id * 2 + 35 + recovery_id
    /// - Without chain ID: v = 27 + recovery_id
    pub fn encode(recovery_id: u8, chain_id: Option<ChainId>) -> Result<u64, SigningError> {
        if recovery_id > 1 {
            return Err(SigningError::InvalidRecoveryId(recovery_id));
        }
        match chain_id {
            Some(cid) => cid
                .checked_mul(2)
                .and_then(|x| x.checked_add(35))
                .and_then(|x| x.checked_add(recovery_id as u64))
                .ok_or(SigningError::ChainIdOverflow(cid)),
            None => Ok(27 + recovery_id as u64),
        }
    }

    /// Classifies a `v` value, inverting [`VValue::encode`].
    ///
    /// Zero `r` and `s` mark an unsigned transaction; `v` then holds the chain
    /// ID, except that 0, 27 and 28 carry none.
    pub fn decode(v: u64, r: &[u8; 32], s: &[u8; 32]) -> Result<SignatureKind, SigningError> {
        let unsigned = r.iter().chain(s.iter()).all(|&b| b == 0);
        if unsigned {
            let chain_id = match v {
                0 | 27 | 28 => None,
                other => Some(other),
            };
            return Ok(SignatureKind::Unsigned { chain_id });
        }
        match v {
            27 | 28 => Ok(SignatureKind::PreEip155 {
                recovery_id: (v - 27) as u8,
            }),
            v if v >= 35 => Ok(SignatureKind::Eip155 {
                chain_id: (v - 35) / 2,
                recovery_id: ((v - 35) % 2) as u8,
            }),
            other => Err(SigningError::InvalidV(other)),
        }
    }
}

// =============================================================================
// EIP-191 personal messages
// =============================================================================

/// keccak256("\x19Ethereum Signed Message:\n" + len + message)
pub fn hash_personal_message(message: &[u8]) -> Hash256 {
    let prefix = format!("\x19Ethereum Signed Message:\n{}", message.len());
    let mut prefixed = Vec::with_capacity(prefix.len() + message.len());
    prefixed.extend_from_slice(prefix.as_bytes());
    prefixed.extend_from_slice(message);
    keccak256(&prefixed)
}

/// Signs an EIP-191 personal message. Serialize with [`Signature::to_bytes`]
/// for the usual `v = 27 + recovery_id` form.
pub fn sign_personal_message(
    message: &[u8],
    key: &PrivateKey,
    config: &SignerConfig,
) -> Result<Signature, SigningError> {
    sign_hash(&hash_personal_message(message), key, config)
}

/// Recovers the signer of an EIP-191 personal message.
pub fn recover_personal_message_signer(
    message: &[u8],
    signature: &Signature,
) -> Result<Address, SigningError> {
    recover_sender(&hash_personal_message(message), signature)
}

// =============================================================================
// Signer
// =============================================================================

/// Signs on behalf of accounts held by a [`KeySource`].
pub struct Signer<S> {
    source: S,
    config: SignerConfig,
}

impl<S: KeySource> Signer<S> {
    /// Creates a signer.
    pub fn new(source: S, config: SignerConfig) -> Self {
        Self { source, config }
    }

    /// Signer settings.
    pub fn config(&self) -> &SignerConfig {
        &self.config
    }

    /// Signs a hash with the key of `account`.
    pub fn sign_hash(
        &self,
        account: &Address,
        password: &str,
        hash: &Hash256,
    ) -> Result<Signature, SigningError> {
        let key = self.source.signing_key_for(account, password)?;
        sign_hash(hash, &key, &self.config)
    }

    /// Signs a transaction with the key of `account`.
    pub fn sign_transaction(
        &self,
        account: &Address,
        password: &str,
        tx: TypedTransaction,
    ) -> Result<SignedTransaction, TransactionError> {
        let key = self.source.signing_key_for(account, password)?;
        let signed = tx.sign(&key, &self.config)?;
        log::debug!("signed {} transaction {}", signed.tx_type(), ethkit_common::encode_hex(&signed.hash()));
        Ok(signed)
    }
}
