//! Canonical consensus encodings for transactions and receipts.
//!
//! Provider JSON is a lossy projection of the signed payload, so the bytes
//! each item contributed to its trie have to be rebuilt field by field.
//! [`TxEnvelope`] and [`ReceiptEnvelope`] validate the raw objects into
//! per-type structs and emit exactly those bytes, EIP-2718 prefix included.

pub mod receipt;
pub mod transaction;

pub use receipt::ReceiptEnvelope;
pub use transaction::TxEnvelope;

use thiserror::Error;

use crate::rlp::Item;
use crate::types::Quantity;

/// Errors turning a raw provider object into its canonical encoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Unsupported transaction type {got}")]
    UnsupportedTxType { got: u64 },

    #[error("Unsupported receipt type {got}")]
    UnsupportedReceiptType { got: u64 },

    #[error("Type {tx_type} item is missing required field {field}")]
    MissingField { tx_type: u8, field: &'static str },

    #[error("Logs bloom must be 256 bytes, got {got}")]
    InvalidBloomLength { got: usize },

    #[error("Type field does not fit in a u64")]
    TypeOutOfRange,
}

/// Resolve a raw `type` field to its envelope byte. Absent means legacy.
pub(crate) fn envelope_type(raw: &Option<Quantity>) -> Result<u64, EncodeError> {
    match raw {
        None => Ok(0),
        Some(q) => q.to_u64().ok_or(EncodeError::TypeOutOfRange),
    }
}

/// An RLP item holding a quantity's minimal big-endian bytes.
pub(crate) fn quantity_item(q: &Quantity) -> Item {
    Item::Bytes(q.as_bytes().to_vec())
}
