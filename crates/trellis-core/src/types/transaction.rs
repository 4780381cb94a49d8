//! Raw transaction objects as returned by `eth_getBlockByNumber` with full
//! transaction bodies.
//!
//! Every numeric field is a [`Quantity`] so signature components and fee
//! values survive untouched at any width. Fields that only exist for some
//! transaction types are optional here; [`crate::encode::TxEnvelope`]
//! enforces per-type presence when it builds the canonical encoding.

use serde::{Deserialize, Serialize};

use super::primitives::{Address, Hash32, HexBytes, Quantity};

/// A transaction as the provider reports it, before any validation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTransaction {
    /// Claimed transaction hash. Recomputed and checked during trie build.
    pub hash: Option<Hash32>,

    /// Envelope type. Absent or "0x0" means a legacy transaction.
    #[serde(rename = "type")]
    pub tx_type: Option<Quantity>,

    pub nonce: Option<Quantity>,

    /// Recipient. `None` (JSON `null`) marks contract creation and encodes
    /// as the empty byte string.
    pub to: Option<Address>,

    pub gas: Option<Quantity>,

    pub value: Option<Quantity>,

    /// Calldata. Some providers call this field `data`.
    #[serde(alias = "data")]
    pub input: Option<HexBytes>,

    pub gas_price: Option<Quantity>,

    pub max_priority_fee_per_gas: Option<Quantity>,

    pub max_fee_per_gas: Option<Quantity>,

    pub chain_id: Option<Quantity>,

    pub access_list: Option<Vec<AccessListItem>>,

    pub max_fee_per_blob_gas: Option<Quantity>,

    pub blob_versioned_hashes: Option<Vec<Hash32>>,

    pub authorization_list: Option<Vec<Authorization>>,

    /// Legacy recovery value. For typed transactions some providers emit
    /// this alongside (or instead of) `yParity`, holding the same 0/1 value.
    pub v: Option<Quantity>,

    pub y_parity: Option<Quantity>,

    pub r: Option<Quantity>,

    pub s: Option<Quantity>,

    /// Position within the block, used for cross-checks against receipts.
    pub transaction_index: Option<Quantity>,

    pub block_hash: Option<Hash32>,
}

/// One entry of an EIP-2930 access list.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessListItem {
    pub address: Option<Address>,

    pub storage_keys: Vec<Hash32>,
}

/// One entry of an EIP-7702 authorization list.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Authorization {
    pub chain_id: Option<Quantity>,

    pub address: Option<Address>,

    pub nonce: Option<Quantity>,

    pub y_parity: Option<Quantity>,

    pub r: Option<Quantity>,

    pub s: Option<Quantity>,
}
