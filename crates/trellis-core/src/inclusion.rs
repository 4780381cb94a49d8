//! Proof orchestration over a full block.
//!
//! Given a block's transactions and receipts plus the two header roots,
//! this module re-encodes every item, rebuilds both tries from scratch,
//! extracts the target's proofs, and verifies them against the header
//! roots before handing out a [`ProofBundle`]. The header roots are the
//! only trusted inputs; every other claim the provider makes is checked
//! against bytes recomputed here. Any mismatch is a hard error, never a
//! silently degraded result.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encode::{EncodeError, ReceiptEnvelope, TxEnvelope};
use crate::hash::keccak256;
use crate::rlp;
use crate::trie::{verify_proof, ProofError, Trie};
use crate::types::{BlockData, Hash32};

/// Which of a block's two tries an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrieKind {
    Transactions,
    Receipts,
}

impl fmt::Display for TrieKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Transactions => f.write_str("transaction"),
            Self::Receipts => f.write_str("receipt"),
        }
    }
}

/// Errors from building or checking a block-level inclusion proof.
#[derive(Debug, Error)]
pub enum InclusionError {
    #[error("Transaction index {index} is out of range for a block with {len} transactions")]
    TargetOutOfRange { index: usize, len: usize },

    #[error("Block carries {transactions} transactions but {receipts} receipts")]
    ItemCountMismatch { transactions: usize, receipts: usize },

    #[error("Block is missing the {field} header field")]
    MissingHeaderField { field: &'static str },

    #[error("Receipt at index {index} does not belong here: {reason}")]
    ReceiptMismatch { index: usize, reason: String },

    #[error("Cannot encode item at index {index}: {source}")]
    Encode { index: usize, source: EncodeError },

    #[error("Transaction at index {index} carries no hash to check its encoding against")]
    MissingTransactionHash { index: usize },

    #[error("Transaction at index {index} hashes to {computed}, provider claims {claimed}")]
    HashMismatch {
        index: usize,
        claimed: String,
        computed: String,
    },

    #[error("Computed {kind} root {computed} does not match header root {expected}")]
    RootMismatch {
        kind: TrieKind,
        computed: String,
        expected: String,
    },

    #[error("Proof verification failed for the {kind} trie: {source}")]
    Proof { kind: TrieKind, source: ProofError },

    #[error("The {kind} trie holds no value at index {index}")]
    AbsentFromTrie { kind: TrieKind, index: usize },

    #[error("Proven {kind} value does not equal the recomputed canonical bytes")]
    ValueMismatch { kind: TrieKind },

    #[error("Target hash does not equal the keccak256 of the proven transaction bytes")]
    TargetHashMismatch,

    #[error("Transaction {hash} is not in this block")]
    UnknownTransaction { hash: String },
}

/// A self-contained inclusion proof for one transaction and its receipt.
///
/// Serializes to the JSON shape external verifiers expect: roots and the
/// target hash as 0x-prefixed hex strings, proof nodes and encoded values
/// as arrays of integers 0-255.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofBundle {
    /// keccak256 of the canonical transaction bytes.
    pub target_hash: Hash32,

    /// Position of the transaction in the block, which is also the trie
    /// key (RLP-encoded) both proofs walk.
    pub tx_index: u64,

    pub transactions_root: Hash32,

    pub transaction_proof: Vec<Vec<u8>>,

    pub transaction_encoded_value: Vec<u8>,

    pub receipts_root: Hash32,

    pub receipt_proof: Vec<Vec<u8>>,

    pub receipt_encoded_value: Vec<u8>,

    /// True on every bundle this module hands out; bundles are never
    /// returned in a partially verified state.
    pub verified: bool,
}

/// Prove that the transaction at `tx_index` and its receipt are committed
/// to by the block's header roots.
///
/// Every transaction and receipt in the block is re-encoded to rebuild
/// both tries, each transaction's claimed hash is checked against its
/// recomputed bytes (a transaction with no hash at all is rejected, not
/// skipped), and the extracted proofs are verified against the header
/// roots before the bundle is returned.
pub fn prove_inclusion(
    block: &BlockData,
    tx_index: usize,
) -> Result<ProofBundle, InclusionError> {
    // 1. Shape and provenance checks.
    let tx_count = block.transactions.len();
    if tx_index >= tx_count {
        return Err(InclusionError::TargetOutOfRange {
            index: tx_index,
            len: tx_count,
        });
    }
    if block.receipts.len() != tx_count {
        return Err(InclusionError::ItemCountMismatch {
            transactions: tx_count,
            receipts: block.receipts.len(),
        });
    }
    let transactions_root = block
        .transactions_root
        .ok_or(InclusionError::MissingHeaderField {
            field: "transactionsRoot",
        })?;
    let receipts_root = block
        .receipts_root
        .ok_or(InclusionError::MissingHeaderField {
            field: "receiptsRoot",
        })?;
    check_receipt_alignment(block)?;

    // 2. Recompute every item's canonical bytes, checking each claimed
    // transaction hash on the way.
    let mut tx_encodings = Vec::with_capacity(tx_count);
    for (index, tx) in block.transactions.iter().enumerate() {
        let bytes = TxEnvelope::from_raw(tx)
            .map_err(|source| InclusionError::Encode { index, source })?
            .canonical_bytes();
        let computed = keccak256(&bytes);
        let claimed = tx
            .hash
            .as_ref()
            .ok_or(InclusionError::MissingTransactionHash { index })?;
        if claimed.0 != computed {
            return Err(InclusionError::HashMismatch {
                index,
                claimed: hex::encode(claimed.0),
                computed: hex::encode(computed),
            });
        }
        tx_encodings.push((bytes, computed));
    }
    let mut receipt_encodings = Vec::with_capacity(tx_count);
    for (index, receipt) in block.receipts.iter().enumerate() {
        let bytes = ReceiptEnvelope::from_raw(receipt)
            .map_err(|source| InclusionError::Encode { index, source })?
            .canonical_bytes();
        receipt_encodings.push(bytes);
    }

    // 3. Build both tries under RLP-encoded index keys.
    let mut tx_trie = Trie::new();
    for (index, (bytes, _)) in tx_encodings.iter().enumerate() {
        tx_trie.put(&rlp::encode_uint(index as u64), bytes.clone());
    }
    let mut receipt_trie = Trie::new();
    for (index, bytes) in receipt_encodings.iter().enumerate() {
        receipt_trie.put(&rlp::encode_uint(index as u64), bytes.clone());
    }

    // 4. The recomputed roots must equal the header roots before a proof
    // against those headers can mean anything.
    let computed = tx_trie.root_hash();
    if computed != transactions_root.0 {
        return Err(root_mismatch(
            TrieKind::Transactions,
            computed,
            transactions_root,
        ));
    }
    let computed = receipt_trie.root_hash();
    if computed != receipts_root.0 {
        return Err(root_mismatch(TrieKind::Receipts, computed, receipts_root));
    }

    // 5. Extract both proofs and verify them the way an external party
    // would, against the header roots rather than the local tries.
    let key = rlp::encode_uint(tx_index as u64);
    let transaction_proof = tx_trie.create_proof(&key);
    let receipt_proof = receipt_trie.create_proof(&key);

    let (target_bytes, target_digest) = &tx_encodings[tx_index];
    let proven_tx = walk(
        TrieKind::Transactions,
        &transactions_root,
        &key,
        &transaction_proof,
        tx_index,
    )?;
    if &proven_tx != target_bytes {
        return Err(InclusionError::ValueMismatch {
            kind: TrieKind::Transactions,
        });
    }
    let proven_receipt = walk(
        TrieKind::Receipts,
        &receipts_root,
        &key,
        &receipt_proof,
        tx_index,
    )?;
    if proven_receipt != receipt_encodings[tx_index] {
        return Err(InclusionError::ValueMismatch {
            kind: TrieKind::Receipts,
        });
    }

    Ok(ProofBundle {
        target_hash: Hash32(*target_digest),
        tx_index: tx_index as u64,
        transactions_root,
        transaction_proof,
        transaction_encoded_value: proven_tx,
        receipts_root,
        receipt_proof,
        receipt_encoded_value: proven_receipt,
        verified: true,
    })
}

/// [`prove_inclusion`] for callers who know the transaction hash but not
/// its position.
pub fn prove_inclusion_by_hash(
    block: &BlockData,
    target: &Hash32,
) -> Result<ProofBundle, InclusionError> {
    let tx_index = block
        .transactions
        .iter()
        .position(|tx| tx.hash.as_ref() == Some(target))
        .ok_or(InclusionError::UnknownTransaction {
            hash: hex::encode(target.0),
        })?;
    prove_inclusion(block, tx_index)
}

/// Re-verify a bundle without the block, for example after it crossed a
/// network boundary.
///
/// Walks both proofs against the roots the bundle carries, checks the
/// proven values against the embedded canonical bytes, and binds the
/// target hash to the proven transaction bytes. Trusting the result still
/// requires the caller to match the bundle's roots against a header they
/// trust.
pub fn verify_bundle(bundle: &ProofBundle) -> Result<(), InclusionError> {
    let index = bundle.tx_index as usize;
    let key = rlp::encode_uint(bundle.tx_index);

    let proven_tx = walk(
        TrieKind::Transactions,
        &bundle.transactions_root,
        &key,
        &bundle.transaction_proof,
        index,
    )?;
    if proven_tx != bundle.transaction_encoded_value {
        return Err(InclusionError::ValueMismatch {
            kind: TrieKind::Transactions,
        });
    }
    if keccak256(&proven_tx) != bundle.target_hash.0 {
        return Err(InclusionError::TargetHashMismatch);
    }

    let proven_receipt = walk(
        TrieKind::Receipts,
        &bundle.receipts_root,
        &key,
        &bundle.receipt_proof,
        index,
    )?;
    if proven_receipt != bundle.receipt_encoded_value {
        return Err(InclusionError::ValueMismatch {
            kind: TrieKind::Receipts,
        });
    }
    Ok(())
}

fn walk(
    kind: TrieKind,
    root: &Hash32,
    key: &[u8],
    proof: &[Vec<u8>],
    index: usize,
) -> Result<Vec<u8>, InclusionError> {
    verify_proof(&root.0, key, proof)
        .map_err(|source| InclusionError::Proof { kind, source })?
        .ok_or(InclusionError::AbsentFromTrie { kind, index })
}

fn root_mismatch(kind: TrieKind, computed: [u8; 32], expected: Hash32) -> InclusionError {
    InclusionError::RootMismatch {
        kind,
        computed: hex::encode(computed),
        expected: hex::encode(expected.0),
    }
}

/// Receipts arrive from a separate call than the block itself, so before
/// treating the two lists as index-aligned, check every provenance field
/// the receipts carry.
fn check_receipt_alignment(block: &BlockData) -> Result<(), InclusionError> {
    for (index, receipt) in block.receipts.iter().enumerate() {
        if let Some(position) = &receipt.transaction_index {
            if position.to_u64() != Some(index as u64) {
                return Err(align_error(
                    index,
                    "transactionIndex does not match its position in the receipt list",
                ));
            }
        }
        if let (Some(receipt_block), Some(block_hash)) = (&receipt.block_hash, &block.hash) {
            if receipt_block != block_hash {
                return Err(align_error(
                    index,
                    "blockHash differs from the block it was supplied with",
                ));
            }
        }
        if let (Some(receipt_tx), Some(tx_hash)) =
            (&receipt.transaction_hash, &block.transactions[index].hash)
        {
            if receipt_tx != tx_hash {
                return Err(align_error(
                    index,
                    "transactionHash differs from the transaction at the same index",
                ));
            }
        }
    }
    Ok(())
}

fn align_error(index: usize, reason: &str) -> InclusionError {
    InclusionError::ReceiptMismatch {
        index,
        reason: reason.to_string(),
    }
}
