use ethkit_common::{Address, ChainId};

use super::{access_list_from_rlp, access_list_to_rlp, to_from_rlp, to_rlp, AccessListItem};
use crate::primitives::U256;
use crate::rlp::{RlpError, RlpItem};

/// EIP-1559 fee market transaction (type `0x02`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeMarketTx {
    pub chain_id: ChainId,
    pub nonce: u64,
    /// Tip paid to the block producer.
    pub max_priority_fee_per_gas: U256,
    /// Cap on base fee plus tip.
    pub max_fee_per_gas: U256,
    pub gas_limit: u64,
    pub to: Option<Address>,
    pub value: U256,
    pub data: Vec<u8>,
    pub access_list: Vec<AccessListItem>,
}

impl FeeMarketTx {
    pub(crate) const FIELD_COUNT: usize = 9;

    /// `[chainId, nonce, maxPriorityFeePerGas, maxFeePerGas, gasLimit, to, value, data, accessList]`
    pub(crate) fn fields(&self) -> Vec<RlpItem> {
        vec![
            RlpItem::uint(self.chain_id),
            RlpItem::uint(self.nonce),
            RlpItem::u256(&self.max_priority_fee_per_gas),
            RlpItem::u256(&self.max_fee_per_gas),
            RlpItem::uint(self.gas_limit),
            to_rlp(&self.to),
            RlpItem::u256(&self.value),
            RlpItem::bytes(self.data.as_slice()),
            access_list_to_rlp(&self.access_list),
        ]
    }

    pub(crate) fn from_fields(items: &[RlpItem]) -> Result<Self, RlpError> {
        Ok(FeeMarketTx {
            chain_id: items[0].as_u64()?,
            nonce: items[1].as_u64()?,
            max_priority_fee_per_gas: items[2].as_u256()?,
            max_fee_per_gas: items[3].as_u256()?,
            gas_limit: items[4].as_u64()?,
            to: to_from_rlp(&items[5])?,
            value: items[6].as_u256()?,
            data: items[7].as_bytes()?.to_vec(),
            access_list: access_list_from_rlp(&items[8])?,
        })
    }
}
