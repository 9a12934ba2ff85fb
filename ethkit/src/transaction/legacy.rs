use ethkit_common::{Address, ChainId};

use super::{to_from_rlp, to_rlp};
use crate::primitives::U256;
use crate::rlp::{self, RlpError, RlpItem};

/// A legacy (pre-EIP-2718) transaction.
///
/// `chain_id` selects EIP-155 replay protection. It is a plain field: set it
/// before signing, and it is re-derived from `v` when decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyTx {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    /// `None` deploys a contract.
    pub to: Option<Address>,
    pub value: U256,
    pub data: Vec<u8>,
    pub chain_id: Option<ChainId>,
}

impl LegacyTx {
    /// Fields before `v, r, s`.
    pub(crate) const FIELD_COUNT: usize = 6;

    pub(crate) fn fields(&self) -> Vec<RlpItem> {
        vec![
            RlpItem::uint(self.nonce),
            RlpItem::u256(&self.gas_price),
            RlpItem::uint(self.gas_limit),
            to_rlp(&self.to),
            RlpItem::u256(&self.value),
            RlpItem::bytes(self.data.as_slice()),
        ]
    }

    pub(crate) fn signing_preimage(&self) -> Vec<u8> {
        let mut fields = self.fields();
        if let Some(chain_id) = self.chain_id {
            fields.extend([RlpItem::uint(chain_id), RlpItem::Empty, RlpItem::Empty]);
        }
        rlp::encode(&RlpItem::List(fields))
    }

    /// Reads the six leading fields. The chain ID is left unset.
    pub(crate) fn from_fields(items: &[RlpItem]) -> Result<Self, RlpError> {
        Ok(LegacyTx {
            nonce: items[0].as_u64()?,
            gas_price: items[1].as_u256()?,
            gas_limit: items[2].as_u64()?,
            to: to_from_rlp(&items[3])?,
            value: items[4].as_u256()?,
            data: items[5].as_bytes()?.to_vec(),
            chain_id: None,
        })
    }
}
