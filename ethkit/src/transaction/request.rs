//! JSON transaction requests.
//!
//! Field names follow the `eth_sendTransaction` object: camelCase keys,
//! quantities as JSON numbers or decimal/`0x` hex strings.

use core::fmt;

use ethkit_common::{decode_hex, encode_hex, Hash256, TransactionType};
use serde::{Deserialize, Serialize};

use super::{AccessListItem, AccessListTx, FeeMarketTx, LegacyTx, TransactionError, TypedTransaction};
use crate::crypto::{parse_address, to_checksum};
use crate::primitives::U256;

/// A numeric field: a JSON number or a decimal or `0x` hex string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Number(u64),
    Text(String),
}

impl Quantity {
    fn to_u256(&self, field: &'static str) -> Result<U256, TransactionError> {
        let invalid = || TransactionError::InvalidField {
            field,
            value: self.to_string(),
        };
        match self {
            Quantity::Number(n) => Ok(U256::from(*n)),
            Quantity::Text(s) => match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex) if !hex.is_empty() => {
                    U256::from_str_radix(hex, 16).map_err(|_| invalid())
                }
                Some(_) => Err(invalid()),
                None => U256::from_dec_str(s).map_err(|_| invalid()),
            },
        }
    }

    fn to_u64(&self, field: &'static str) -> Result<u64, TransactionError> {
        let value = self.to_u256(field)?;
        if value > U256::from(u64::MAX) {
            return Err(TransactionError::InvalidField {
                field,
                value: self.to_string(),
            });
        }
        Ok(value.low_u64())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Number(n) => write!(f, "{n}"),
            Quantity::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<u64> for Quantity {
    fn from(n: u64) -> Self {
        Quantity::Number(n)
    }
}

impl From<U256> for Quantity {
    fn from(n: U256) -> Self {
        if n.bits() <= 64 {
            Quantity::Number(n.low_u64())
        } else {
            Quantity::Text(n.to_string())
        }
    }
}

/// JSON form of an access list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessListEntry {
    pub address: String,
    #[serde(default)]
    pub storage_keys: Vec<String>,
}

/// A transaction described field by field, as received from a wallet UI or
/// a JSON file. Unknown keys (`from`, `hash`, ...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub tx_type: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<Quantity>,
    #[serde(default, alias = "gasLimit", skip_serializing_if = "Option::is_none")]
    pub gas: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Quantity>,
    #[serde(default, alias = "input", skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_list: Option<Vec<AccessListEntry>>,
}

impl TransactionRequest {
    /// Parses a JSON request.
    pub fn from_json(s: &str) -> Result<Self, TransactionError> {
        serde_json::from_str(s).map_err(|e| TransactionError::InvalidField {
            field: "request",
            value: e.to_string(),
        })
    }

    /// Resolves the transaction type.
    ///
    /// An explicit `type` wins; otherwise fee caps select EIP-1559 and an
    /// access list selects EIP-2930.
    pub fn resolved_type(&self) -> Result<TransactionType, TransactionError> {
        if let Some(ty) = &self.tx_type {
            let byte = ty.to_u64("type")?;
            let byte = u8::try_from(byte).map_err(|_| TransactionError::InvalidField {
                field: "type",
                value: ty.to_string(),
            })?;
            return Ok(TransactionType::try_from(byte)?);
        }
        if self.max_fee_per_gas.is_some() || self.max_priority_fee_per_gas.is_some() {
            Ok(TransactionType::FeeMarket)
        } else if self.access_list.is_some() {
            Ok(TransactionType::AccessList)
        } else {
            Ok(TransactionType::Legacy)
        }
    }

    /// Builds the unsigned transaction.
    ///
    /// `nonce`, `value` and `data` default to zero/empty. Gas and fee fields
    /// are required, as is `chainId` for typed transactions.
    pub fn into_transaction(self) -> Result<TypedTransaction, TransactionError> {
        let tx_type = self.resolved_type()?;

        let nonce = opt_u64(&self.nonce, "nonce")?.unwrap_or(0);
        let gas_limit = opt_u64(&self.gas, "gas")?.ok_or(TransactionError::MissingField("gas"))?;
        let chain_id = opt_u64(&self.chain_id, "chainId")?;
        let value = opt_u256(&self.value, "value")?.unwrap_or_default();
        let to = match &self.to {
            Some(s) if !s.is_empty() => Some(parse_address(s)?),
            _ => None,
        };
        let data = match &self.data {
            Some(s) => decode_hex(s).map_err(|_| TransactionError::InvalidField {
                field: "data",
                value: s.clone(),
            })?,
            None => Vec::new(),
        };
        let access_list = self
            .access_list
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(access_list_item)
            .collect::<Result<Vec<_>, _>>()?;

        let tx = match tx_type {
            TransactionType::Legacy => TypedTransaction::Legacy(LegacyTx {
                nonce,
                gas_price: required_u256(&self.gas_price, "gasPrice")?,
                gas_limit,
                to,
                value,
                data,
                chain_id,
            }),
            TransactionType::AccessList => TypedTransaction::AccessList(AccessListTx {
                chain_id: chain_id.ok_or(TransactionError::MissingChainId)?,
                nonce,
                gas_price: required_u256(&self.gas_price, "gasPrice")?,
                gas_limit,
                to,
                value,
                data,
                access_list,
            }),
            TransactionType::FeeMarket => TypedTransaction::FeeMarket(FeeMarketTx {
                chain_id: chain_id.ok_or(TransactionError::MissingChainId)?,
                nonce,
                max_priority_fee_per_gas: required_u256(
                    &self.max_priority_fee_per_gas,
                    "maxPriorityFeePerGas",
                )?,
                max_fee_per_gas: required_u256(&self.max_fee_per_gas, "maxFeePerGas")?,
                gas_limit,
                to,
                value,
                data,
                access_list,
            }),
        };
        Ok(tx)
    }
}

impl From<&TypedTransaction> for TransactionRequest {
    fn from(tx: &TypedTransaction) -> Self {
        let mut request = TransactionRequest {
            tx_type: Some(Quantity::Number(tx.tx_type() as u64)),
            chain_id: tx.chain_id().map(Quantity::from),
            nonce: Some(tx.nonce().into()),
            gas: Some(tx.gas_limit().into()),
            to: tx.to().as_ref().map(to_checksum),
            value: Some(tx.value().into()),
            data: Some(encode_hex(tx.data())),
            ..Default::default()
        };
        match tx {
            TypedTransaction::Legacy(inner) => {
                request.gas_price = Some(inner.gas_price.into());
            }
            TypedTransaction::AccessList(inner) => {
                request.gas_price = Some(inner.gas_price.into());
                request.access_list = Some(access_list_entries(&inner.access_list));
            }
            TypedTransaction::FeeMarket(inner) => {
                request.max_fee_per_gas = Some(inner.max_fee_per_gas.into());
                request.max_priority_fee_per_gas = Some(inner.max_priority_fee_per_gas.into());
                request.access_list = Some(access_list_entries(&inner.access_list));
            }
        }
        request
    }
}

fn opt_u64(q: &Option<Quantity>, field: &'static str) -> Result<Option<u64>, TransactionError> {
    q.as_ref().map(|q| q.to_u64(field)).transpose()
}

fn opt_u256(q: &Option<Quantity>, field: &'static str) -> Result<Option<U256>, TransactionError> {
    q.as_ref().map(|q| q.to_u256(field)).transpose()
}

fn required_u256(q: &Option<Quantity>, field: &'static str) -> Result<U256, TransactionError> {
    opt_u256(q, field)?.ok_or(TransactionError::MissingField(field))
}

fn access_list_item(entry: &AccessListEntry) -> Result<AccessListItem, TransactionError> {
    let storage_keys = entry
        .storage_keys
        .iter()
        .map(|key| {
            let bytes = decode_hex(key)?;
            Hash256::try_from(bytes.as_slice()).map_err(|_| TransactionError::InvalidField {
                field: "storageKeys",
                value: key.clone(),
            })
        })
        .collect::<Result<Vec<_>, TransactionError>>()?;
    Ok(AccessListItem {
        address: parse_address(&entry.address)?,
        storage_keys,
    })
}

fn access_list_entries(list: &[AccessListItem]) -> Vec<AccessListEntry> {
    list.iter()
        .map(|item| AccessListEntry {
            address: to_checksum(&item.address),
            storage_keys: item.storage_keys.iter().map(|k| encode_hex(k)).collect(),
        })
        .collect()
}
