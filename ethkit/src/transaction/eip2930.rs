use ethkit_common::{Address, ChainId};

use super::{access_list_from_rlp, access_list_to_rlp, to_from_rlp, to_rlp, AccessListItem};
use crate::primitives::U256;
use crate::rlp::{RlpError, RlpItem};

/// EIP-2930 access list transaction (type `0x01`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessListTx {
    pub chain_id: ChainId,
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    pub to: Option<Address>,
    pub value: U256,
    pub data: Vec<u8>,
    pub access_list: Vec<AccessListItem>,
}

impl AccessListTx {
    pub(crate) const FIELD_COUNT: usize = 8;

    /// `[chainId, nonce, gasPrice, gasLimit, to, value, data, accessList]`
    pub(crate) fn fields(&self) -> Vec<RlpItem> {
        vec![
            RlpItem::uint(self.chain_id),
            RlpItem::uint(self.nonce),
            RlpItem::u256(&self.gas_price),
            RlpItem::uint(self.gas_limit),
            to_rlp(&self.to),
            RlpItem::u256(&self.value),
            RlpItem::bytes(self.data.as_slice()),
            access_list_to_rlp(&self.access_list),
        ]
    }

    pub(crate) fn from_fields(items: &[RlpItem]) -> Result<Self, RlpError> {
        Ok(AccessListTx {
            chain_id: items[0].as_u64()?,
            nonce: items[1].as_u64()?,
            gas_price: items[2].as_u256()?,
            gas_limit: items[3].as_u64()?,
            to: to_from_rlp(&items[4])?,
            value: items[5].as_u256()?,
            data: items[6].as_bytes()?.to_vec(),
            access_list: access_list_from_rlp(&items[7])?,
        })
    }
}
