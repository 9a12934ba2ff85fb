//! Transaction models, signing preimages and wire encoding.
//!
//! Three transaction formats are supported:
//! - Legacy, optionally replay-protected with an EIP-155 chain ID
//! - EIP-2930 access list transactions (type `0x01`)
//! - EIP-1559 fee market transactions (type `0x02`)
//!
//! An unsigned [`TypedTransaction`] is freely mutable. Signing consumes it and
//! yields a [`SignedTransaction`] whose fields are read-only; editing a signed
//! transaction requires [`SignedTransaction::into_unsigned`], which drops the
//! signature so a stale one can never be re-encoded.

mod eip1559;
mod eip2930;
mod legacy;
mod request;

use core::fmt;

use ethkit_common::{
    encode_hex, Address, ChainId, CommonError, Hash256, Signature, TransactionType, MAX_TX_SIZE,
};

use crate::config::{ChainIdPolicy, SignerConfig};
use crate::crypto::keccak256;
use crate::primitives::U256;
use crate::rlp::{self, RlpError, RlpItem};
use crate::signing::{self, PrivateKey, SignatureKind, SigningError, VValue};

pub use eip1559::FeeMarketTx;
pub use eip2930::AccessListTx;
pub use legacy::LegacyTx;
pub use request::{AccessListEntry, Quantity, TransactionRequest};

/// Transaction errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// A chain ID is required but none was set.
    MissingChainId,
    /// A required field was not supplied.
    MissingField(&'static str),
    /// A field holds a value that cannot be used.
    InvalidField {
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: String,
    },
    /// The RLP list has the wrong number of fields for its type.
    InvalidFieldCount {
        /// Transaction type being decoded.
        tx_type: TransactionType,
        /// Field count of the signed form.
        expected: usize,
        /// Field count found.
        found: usize,
    },
    /// Envelope byte names no supported transaction type.
    UnknownType(u8),
    /// The decoded transaction carries no signature.
    NotSigned,
    /// Raw transaction exceeds the size limit.
    TooLarge {
        /// Size of the input.
        size: usize,
        /// Maximum accepted size.
        max: usize,
    },
    /// RLP framing error.
    Rlp(RlpError),
    /// Signing or recovery error.
    Signing(SigningError),
    /// Malformed primitive value.
    Common(CommonError),
}

impl fmt::Display for TransactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionError::MissingChainId => write!(f, "chain id is required"),
            TransactionError::MissingField(field) => write!(f, "missing field {field}"),
            TransactionError::InvalidField { field, value } => {
                write!(f, "invalid value {value:?} for field {field}")
            }
            TransactionError::InvalidFieldCount {
                tx_type,
                expected,
                found,
            } => write!(
                f,
                "{tx_type} transaction: expected {expected} fields, found {found}"
            ),
            TransactionError::UnknownType(ty) => write!(f, "unknown transaction type 0x{ty:02x}"),
            TransactionError::NotSigned => write!(f, "transaction is not signed"),
            TransactionError::TooLarge { size, max } => {
                write!(f, "transaction too large: {size} bytes (max {max})")
            }
            TransactionError::Rlp(e) => write!(f, "rlp: {e}"),
            TransactionError::Signing(e) => write!(f, "{e}"),
            TransactionError::Common(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for TransactionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransactionError::Rlp(e) => Some(e),
            TransactionError::Signing(e) => Some(e),
            TransactionError::Common(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RlpError> for TransactionError {
    fn from(e: RlpError) -> Self {
        TransactionError::Rlp(e)
    }
}

impl From<SigningError> for TransactionError {
    fn from(e: SigningError) -> Self {
        TransactionError::Signing(e)
    }
}

impl From<CommonError> for TransactionError {
    fn from(e: CommonError) -> Self {
        match e {
            CommonError::UnknownTransactionType(ty) => TransactionError::UnknownType(ty),
            other => TransactionError::Common(other),
        }
    }
}

// =============================================================================
// Access Lists
// =============================================================================

/// One EIP-2930 access list entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessListItem {
    /// Accessed contract.
    pub address: Address,
    /// Accessed storage slots.
    pub storage_keys: Vec<Hash256>,
}

impl AccessListItem {
    fn to_rlp(&self) -> RlpItem {
        let keys = self
            .storage_keys
            .iter()
            .map(|key| RlpItem::Bytes(key.to_vec()))
            .collect::<Vec<_>>();
        RlpItem::List(vec![self.address.into(), RlpItem::List(keys)])
    }

    fn from_rlp(item: &RlpItem) -> Result<Self, RlpError> {
        let fields = item.as_list()?;
        let [address, keys] = fields else {
            return Err(RlpError::InvalidLength {
                expected: 2,
                found: fields.len(),
            });
        };
        let storage_keys = keys
            .as_list()?
            .iter()
            .map(RlpItem::as_bytes32)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AccessListItem {
            address: address.as_address()?,
            storage_keys,
        })
    }
}

pub(crate) fn access_list_to_rlp(list: &[AccessListItem]) -> RlpItem {
    RlpItem::List(list.iter().map(AccessListItem::to_rlp).collect())
}

pub(crate) fn access_list_from_rlp(item: &RlpItem) -> Result<Vec<AccessListItem>, RlpError> {
    item.as_list()?.iter().map(AccessListItem::from_rlp).collect()
}

// =============================================================================
// Field helpers
// =============================================================================

/// `None` (contract creation) encodes as the empty string.
pub(crate) fn to_rlp(to: &Option<Address>) -> RlpItem {
    match to {
        Some(address) => (*address).into(),
        None => RlpItem::Empty,
    }
}

pub(crate) fn to_from_rlp(item: &RlpItem) -> Result<Option<Address>, RlpError> {
    if item.as_bytes()?.is_empty() {
        Ok(None)
    } else {
        item.as_address().map(Some)
    }
}

/// Signature scalars are encoded as minimal big-endian integers.
pub(crate) fn scalar_to_rlp(scalar: &[u8; 32]) -> RlpItem {
    RlpItem::u256(&U256::from_big_endian(scalar))
}

pub(crate) fn scalar_from_rlp(item: &RlpItem) -> Result<[u8; 32], RlpError> {
    let mut out = [0u8; 32];
    item.as_u256()?.to_big_endian(&mut out);
    Ok(out)
}

fn check_field_count(
    tx_type: TransactionType,
    items: &[RlpItem],
    unsigned: usize,
) -> Result<bool, TransactionError> {
    match items.len() {
        n if n == unsigned => Ok(false),
        n if n == unsigned + 3 => Ok(true),
        found => Err(TransactionError::InvalidFieldCount {
            tx_type,
            expected: unsigned + 3,
            found,
        }),
    }
}

// =============================================================================
// Unsigned transactions
// =============================================================================

/// An unsigned transaction of any supported type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedTransaction {
    /// Legacy transaction.
    Legacy(LegacyTx),
    /// EIP-2930 transaction.
    AccessList(AccessListTx),
    /// EIP-1559 transaction.
    FeeMarket(FeeMarketTx),
}

impl From<LegacyTx> for TypedTransaction {
    fn from(tx: LegacyTx) -> Self {
        TypedTransaction::Legacy(tx)
    }
}

impl From<AccessListTx> for TypedTransaction {
    fn from(tx: AccessListTx) -> Self {
        TypedTransaction::AccessList(tx)
    }
}

impl From<FeeMarketTx> for TypedTransaction {
    fn from(tx: FeeMarketTx) -> Self {
        TypedTransaction::FeeMarket(tx)
    }
}

impl TypedTransaction {
    /// Transaction type.
    pub fn tx_type(&self) -> TransactionType {
        match self {
            TypedTransaction::Legacy(_) => TransactionType::Legacy,
            TypedTransaction::AccessList(_) => TransactionType::AccessList,
            TypedTransaction::FeeMarket(_) => TransactionType::FeeMarket,
        }
    }

    /// Chain ID, if set.
    pub fn chain_id(&self) -> Option<ChainId> {
        match self {
            TypedTransaction::Legacy(tx) => tx.chain_id,
            TypedTransaction::AccessList(tx) => Some(tx.chain_id),
            TypedTransaction::FeeMarket(tx) => Some(tx.chain_id),
        }
    }

    /// Sender nonce.
    pub fn nonce(&self) -> u64 {
        match self {
            TypedTransaction::Legacy(tx) => tx.nonce,
            TypedTransaction::AccessList(tx) => tx.nonce,
            TypedTransaction::FeeMarket(tx) => tx.nonce,
        }
    }

    /// Gas limit.
    pub fn gas_limit(&self) -> u64 {
        match self {
            TypedTransaction::Legacy(tx) => tx.gas_limit,
            TypedTransaction::AccessList(tx) => tx.gas_limit,
            TypedTransaction::FeeMarket(tx) => tx.gas_limit,
        }
    }

    /// Recipient; `None` deploys a contract.
    pub fn to(&self) -> Option<Address> {
        match self {
            TypedTransaction::Legacy(tx) => tx.to,
            TypedTransaction::AccessList(tx) => tx.to,
            TypedTransaction::FeeMarket(tx) => tx.to,
        }
    }

    /// Value in wei.
    pub fn value(&self) -> U256 {
        match self {
            TypedTransaction::Legacy(tx) => tx.value,
            TypedTransaction::AccessList(tx) => tx.value,
            TypedTransaction::FeeMarket(tx) => tx.value,
        }
    }

    /// Call data or init code.
    pub fn data(&self) -> &[u8] {
        match self {
            TypedTransaction::Legacy(tx) => &tx.data,
            TypedTransaction::AccessList(tx) => &tx.data,
            TypedTransaction::FeeMarket(tx) => &tx.data,
        }
    }

    /// Access list; empty for legacy transactions.
    pub fn access_list(&self) -> &[AccessListItem] {
        match self {
            TypedTransaction::Legacy(_) => &[],
            TypedTransaction::AccessList(tx) => &tx.access_list,
            TypedTransaction::FeeMarket(tx) => &tx.access_list,
        }
    }

    /// Bytes hashed for signing.
    ///
    /// - Legacy with chain ID: `rlp([nonce, gasPrice, gasLimit, to, value, data, chainId, 0, 0])`
    /// - Legacy without chain ID: `rlp([nonce, gasPrice, gasLimit, to, value, data])`
    /// - Typed: `type || rlp([chainId, ..., accessList])`
    pub fn signing_preimage(&self) -> Vec<u8> {
        match self {
            TypedTransaction::Legacy(tx) => tx.signing_preimage(),
            TypedTransaction::AccessList(tx) => {
                envelope(TransactionType::AccessList, tx.fields())
            }
            TypedTransaction::FeeMarket(tx) => envelope(TransactionType::FeeMarket, tx.fields()),
        }
    }

    /// keccak256 of [`Self::signing_preimage`].
    pub fn signing_hash(&self) -> Hash256 {
        keccak256(&self.signing_preimage())
    }

    /// Attaches a signature produced over [`Self::signing_hash`].
    pub fn into_signed(self, signature: Signature) -> Result<SignedTransaction, TransactionError> {
        let v = match &self {
            TypedTransaction::Legacy(tx) => VValue::encode(signature.recovery_id, tx.chain_id)?,
            _ => {
                if signature.recovery_id > 1 {
                    return Err(SigningError::InvalidRecoveryId(signature.recovery_id).into());
                }
                signature.recovery_id as u64
            }
        };
        Ok(SignedTransaction {
            tx: self,
            signature,
            v,
        })
    }

    /// Signs with `key`, honouring the configured chain ID policy.
    pub fn sign(
        self,
        key: &PrivateKey,
        config: &SignerConfig,
    ) -> Result<SignedTransaction, TransactionError> {
        if config.chain_id_policy == ChainIdPolicy::Required && self.chain_id().is_none() {
            log::warn!("refusing to sign legacy transaction without chain id");
            return Err(TransactionError::MissingChainId);
        }
        let hash = self.signing_hash();
        let signature = signing::sign_hash(&hash, key, config)?;
        self.into_signed(signature)
    }
}

fn envelope(tx_type: TransactionType, fields: Vec<RlpItem>) -> Vec<u8> {
    let body = rlp::encode(&RlpItem::List(fields));
    let mut out = Vec::with_capacity(1 + body.len());
    out.extend(tx_type.envelope_byte());
    out.extend_from_slice(&body);
    out
}

// =============================================================================
// Signed transactions
// =============================================================================

/// A signed transaction, ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    tx: TypedTransaction,
    signature: Signature,
    v: u64,
}

impl SignedTransaction {
    /// The signed fields.
    pub fn transaction(&self) -> &TypedTransaction {
        &self.tx
    }

    /// The signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Transaction type.
    pub fn tx_type(&self) -> TransactionType {
        self.tx.tx_type()
    }

    /// Encoded `v` (the y-parity for typed transactions).
    pub fn v(&self) -> u64 {
        self.v
    }

    /// Drops the signature so the fields can be edited and signed again.
    pub fn into_unsigned(self) -> TypedTransaction {
        self.tx
    }

    fn signature_fields(&self) -> [RlpItem; 3] {
        [
            RlpItem::uint(self.v),
            scalar_to_rlp(&self.signature.r),
            scalar_to_rlp(&self.signature.s),
        ]
    }

    /// Wire bytes for `eth_sendRawTransaction`.
    pub fn encode(&self) -> Vec<u8> {
        let mut fields = match &self.tx {
            TypedTransaction::Legacy(tx) => tx.fields(),
            TypedTransaction::AccessList(tx) => tx.fields(),
            TypedTransaction::FeeMarket(tx) => tx.fields(),
        };
        fields.extend(self.signature_fields());
        match self.tx_type() {
            TransactionType::Legacy => rlp::encode(&RlpItem::List(fields)),
            ty => envelope(ty, fields),
        }
    }

    /// 0x-prefixed hex of [`Self::encode`].
    pub fn to_raw_hex(&self) -> String {
        encode_hex(&self.encode())
    }

    /// Transaction hash.
    pub fn hash(&self) -> Hash256 {
        keccak256(&self.encode())
    }

    /// Recovers the sender address.
    pub fn recover_sender(&self) -> Result<Address, TransactionError> {
        Ok(signing::recover_sender(
            &self.tx.signing_hash(),
            &self.signature,
        )?)
    }

    /// Decodes signed wire bytes; unsigned input fails with
    /// [`TransactionError::NotSigned`].
    pub fn decode(raw: &[u8]) -> Result<Self, TransactionError> {
        match decode(raw)? {
            DecodedTransaction::Signed(tx) => Ok(tx),
            DecodedTransaction::Unsigned(_) => Err(TransactionError::NotSigned),
        }
    }

    /// Decodes 0x-prefixed hex wire bytes.
    pub fn decode_hex(raw: &str) -> Result<Self, TransactionError> {
        Self::decode(&ethkit_common::decode_hex(raw)?)
    }
}

/// Result of [`decode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedTransaction {
    /// No signature present (a signing preimage, or zero `r` and `s`).
    Unsigned(TypedTransaction),
    /// Signed transaction.
    Signed(SignedTransaction),
}

/// Decodes a raw transaction or signing preimage.
///
/// Legacy input is a bare RLP list; typed input starts with its envelope
/// byte. For legacy transactions the chain ID is re-derived from `v`.
pub fn decode(raw: &[u8]) -> Result<DecodedTransaction, TransactionError> {
    if raw.len() > MAX_TX_SIZE {
        return Err(TransactionError::TooLarge {
            size: raw.len(),
            max: MAX_TX_SIZE,
        });
    }
    let first = *raw.first().ok_or(RlpError::EmptyInput)?;
    if first >= 0xc0 {
        return decode_legacy(raw);
    }
    if first >= 0x80 {
        return Err(RlpError::ExpectedList.into());
    }

    let tx_type = TransactionType::try_from(first)?;
    let items = rlp::decode_list(&raw[1..])?;
    let (tx, unsigned_len): (TypedTransaction, usize) = match tx_type {
        TransactionType::AccessList => {
            let signed = check_field_count(tx_type, &items, AccessListTx::FIELD_COUNT)?;
            let tx = AccessListTx::from_fields(&items[..AccessListTx::FIELD_COUNT])?;
            if !signed {
                return Ok(DecodedTransaction::Unsigned(tx.into()));
            }
            (tx.into(), AccessListTx::FIELD_COUNT)
        }
        TransactionType::FeeMarket => {
            let signed = check_field_count(tx_type, &items, FeeMarketTx::FIELD_COUNT)?;
            let tx = FeeMarketTx::from_fields(&items[..FeeMarketTx::FIELD_COUNT])?;
            if !signed {
                return Ok(DecodedTransaction::Unsigned(tx.into()));
            }
            (tx.into(), FeeMarketTx::FIELD_COUNT)
        }
        TransactionType::Legacy => return Err(TransactionError::UnknownType(first)),
    };

    let sig = &items[unsigned_len..];
    let y_parity = sig[0].as_u64()?;
    if y_parity > 1 {
        return Err(SigningError::InvalidV(y_parity).into());
    }
    let signature = Signature {
        r: scalar_from_rlp(&sig[1])?,
        s: scalar_from_rlp(&sig[2])?,
        recovery_id: y_parity as u8,
    };
    Ok(DecodedTransaction::Signed(tx.into_signed(signature)?))
}

fn decode_legacy(raw: &[u8]) -> Result<DecodedTransaction, TransactionError> {
    let items = rlp::decode_list(raw)?;
    let signed = check_field_count(TransactionType::Legacy, &items, LegacyTx::FIELD_COUNT)?;
    let mut tx = LegacyTx::from_fields(&items[..LegacyTx::FIELD_COUNT])?;
    if !signed {
        return Ok(DecodedTransaction::Unsigned(tx.into()));
    }

    let v = items[6].as_u64()?;
    let r = scalar_from_rlp(&items[7])?;
    let s = scalar_from_rlp(&items[8])?;
    let recovery_id = match VValue::decode(v, &r, &s)? {
        SignatureKind::Unsigned { chain_id } => {
            tx.chain_id = chain_id;
            return Ok(DecodedTransaction::Unsigned(tx.into()));
        }
        SignatureKind::PreEip155 { recovery_id } => {
            tx.chain_id = None;
            recovery_id
        }
        SignatureKind::Eip155 {
            chain_id,
            recovery_id,
        } => {
            tx.chain_id = Some(chain_id);
            recovery_id
        }
    };
    let signature = Signature { r, s, recovery_id };
    Ok(DecodedTransaction::Signed(
        TypedTransaction::Legacy(tx).into_signed(signature)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn eip155_key() -> PrivateKey {
        PrivateKey::from_slice(&hex!(
            "4646464646464646464646464646464646464646464646464646464646464646"
        ))
        .unwrap()
    }

    /// The example transaction from EIP-155.
    fn eip155_tx() -> LegacyTx {
        LegacyTx {
            nonce: 9,
            gas_price: U256::from(20_000_000_000u64),
            gas_limit: 21000,
            to: Some(Address(hex!("3535353535353535353535353535353535353535"))),
            value: U256::from(1_000_000_000_000_000_000u64),
            data: Vec::new(),
            chain_id: Some(1),
        }
    }

    #[test]
    fn test_eip155_preimage_and_hash() {
        let tx = TypedTransaction::from(eip155_tx());
        assert_eq!(
            tx.signing_preimage(),
            hex!("ec098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a764000080018080")
        );
        assert_eq!(
            tx.signing_hash(),
            hex!("daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53")
        );
    }

    #[test]
    fn test_eip155_signed_encoding() {
        let signed = TypedTransaction::from(eip155_tx())
            .sign(&eip155_key(), &SignerConfig::default())
            .unwrap();
        assert_eq!(signed.v(), 37);
        assert_eq!(
            signed.encode(),
            hex!("f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83")
        );
        assert_eq!(
            signed.recover_sender().unwrap(),
            Address(hex!("9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f"))
        );
    }

    #[test]
    fn test_decode_signed_legacy() {
        let raw = hex!("f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83");
        let signed = SignedTransaction::decode(&raw).unwrap();
        assert_eq!(signed.transaction(), &TypedTransaction::Legacy(eip155_tx()));
        assert_eq!(signed.signature().recovery_id, 0);
        assert_eq!(signed.encode(), raw.to_vec());
    }

    #[test]
    fn test_decode_preimage_is_unsigned() {
        let tx = TypedTransaction::from(eip155_tx());
        let decoded = decode(&tx.signing_preimage()).unwrap();
        assert_eq!(decoded, DecodedTransaction::Unsigned(tx.clone()));
        assert_eq!(
            SignedTransaction::decode(&tx.signing_preimage()),
            Err(TransactionError::NotSigned)
        );
    }

    #[test]
    fn test_pre_eip155_signing() {
        let mut tx = eip155_tx();
        tx.chain_id = None;
        let tx = TypedTransaction::from(tx);
        assert_eq!(rlp::decode_list(&tx.signing_preimage()).unwrap().len(), 6);

        let signed = tx.clone().sign(&eip155_key(), &SignerConfig::default()).unwrap();
        assert!(signed.v() == 27 || signed.v() == 28);

        let decoded = SignedTransaction::decode(&signed.encode()).unwrap();
        assert_eq!(decoded.transaction().chain_id(), None);
        assert_eq!(decoded.recover_sender().unwrap(), eip155_key().address().unwrap());
    }

    #[test]
    fn test_required_chain_id_policy() {
        let mut tx = eip155_tx();
        tx.chain_id = None;
        let config = SignerConfig {
            chain_id_policy: ChainIdPolicy::Required,
            ..SignerConfig::default()
        };
        assert_eq!(
            TypedTransaction::from(tx).sign(&eip155_key(), &config),
            Err(TransactionError::MissingChainId)
        );
    }

    #[test]
    fn test_contract_creation_encodes_empty_to() {
        let mut tx = eip155_tx();
        tx.to = None;
        let items = rlp::decode_list(&TypedTransaction::from(tx).signing_preimage()).unwrap();
        assert_eq!(items[3], RlpItem::Empty);
    }

    #[test]
    fn test_fee_market_roundtrip() {
        let tx = FeeMarketTx {
            chain_id: 1,
            nonce: 0,
            max_priority_fee_per_gas: U256::from(1_000_000_000u64),
            max_fee_per_gas: U256::from(100_000_000_000u64),
            gas_limit: 50_000,
            to: Some(Address([0x11; 20])),
            value: U256::zero(),
            data: hex!("a9059cbb").to_vec(),
            access_list: vec![AccessListItem {
                address: Address([0x22; 20]),
                storage_keys: vec![[0x33; 32]],
            }],
        };
        let key = eip155_key();
        let signed = TypedTransaction::from(tx)
            .sign(&key, &SignerConfig::default())
            .unwrap();
        let raw = signed.encode();
        assert_eq!(raw[0], 0x02);

        let decoded = SignedTransaction::decode(&raw).unwrap();
        assert_eq!(decoded, signed);
        assert_eq!(decoded.hash(), signed.hash());
        assert_eq!(decoded.recover_sender().unwrap(), key.address().unwrap());
    }

    #[test]
    fn test_into_unsigned_resign() {
        let key = eip155_key();
        let signed = TypedTransaction::from(eip155_tx())
            .sign(&key, &SignerConfig::default())
            .unwrap();
        let mut tx = signed.clone().into_unsigned();
        if let TypedTransaction::Legacy(inner) = &mut tx {
            inner.nonce += 1;
        }
        let resigned = tx.sign(&key, &SignerConfig::default()).unwrap();
        assert_ne!(resigned.hash(), signed.hash());
        assert_eq!(resigned.recover_sender().unwrap(), key.address().unwrap());
    }

    #[test]
    fn test_decode_rejections() {
        assert_eq!(
            decode(&[0x05, 0xc0]),
            Err(TransactionError::UnknownType(0x05))
        );
        assert_eq!(decode(&[]), Err(TransactionError::Rlp(RlpError::EmptyInput)));
        assert_eq!(
            decode(&hex!("83646f67")),
            Err(TransactionError::Rlp(RlpError::ExpectedList))
        );
        assert!(matches!(
            decode(&hex!("c3010203")),
            Err(TransactionError::InvalidFieldCount {
                tx_type: TransactionType::Legacy,
                expected: 9,
                found: 3
            })
        ));
        assert!(matches!(
            decode(&vec![0xc0; MAX_TX_SIZE + 1]),
            Err(TransactionError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_invalid_legacy_v() {
        let mut raw_items = rlp::decode_list(&hex!("f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83")).unwrap();
        raw_items[6] = RlpItem::uint(30);
        let raw = rlp::encode(&RlpItem::List(raw_items));
        assert_eq!(
            decode(&raw),
            Err(TransactionError::Signing(SigningError::InvalidV(30)))
        );
    }
}
