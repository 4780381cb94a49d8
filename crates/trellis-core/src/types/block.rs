//! The merged block view the prover operates on.

use serde::{Deserialize, Serialize};

use super::primitives::Hash32;
use super::receipt::RawReceipt;
use super::transaction::RawTransaction;

/// A block with full transaction bodies and the matching receipt list.
///
/// Callers typically merge one `eth_getBlockByNumber(.., true)` response
/// with one `eth_getBlockReceipts` response. The two header roots are the
/// only trusted inputs; everything else is re-derived and checked against
/// them.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockData {
    /// Block hash, used only to cross-check receipt provenance.
    pub hash: Option<Hash32>,

    /// Header commitment to the transaction trie.
    pub transactions_root: Option<Hash32>,

    /// Header commitment to the receipt trie.
    pub receipts_root: Option<Hash32>,

    pub transactions: Vec<RawTransaction>,

    pub receipts: Vec<RawReceipt>,
}
