//! # Trellis Core
//!
//! Pure Rust Ethereum transaction and receipt inclusion proofs.
//!
//! This crate contains **no networking code** and **no RPC dependencies**.
//! It consumes raw block JSON fetched elsewhere and recomputes everything
//! it verifies from those inputs alone.
//!
//! ## Trust Model
//!
//! - **Canonical re-encoding** (`encode` module): every transaction and
//!   receipt is rebuilt field by field from the raw JSON, so proofs commit
//!   to bytes this crate computed, never bytes the provider sent.
//!
//! - **Trie reconstruction** (`trie` module): both block tries are built
//!   from scratch and their roots checked against the block header before
//!   any proof is handed out. The two header roots are the only trusted
//!   inputs.
//!
//! ## Usage
//!
//! ```ignore
//! use trellis_core::{prove_inclusion, verify_bundle, BlockData};
//!
//! let block: BlockData = serde_json::from_str(&merged_block_json)?;
//! let bundle = prove_inclusion(&block, 3)?;
//! verify_bundle(&bundle)?;
//! ```

pub mod encode;
pub mod hash;
pub mod inclusion;
pub mod rlp;
pub mod trie;
pub mod types;

// Re-export commonly used types for convenience
pub use encode::{EncodeError, ReceiptEnvelope, TxEnvelope};
pub use hash::keccak256;
pub use inclusion::{
    prove_inclusion, prove_inclusion_by_hash, verify_bundle, InclusionError, ProofBundle,
    TrieKind,
};
pub use trie::{verify_proof, ProofError, Trie, EMPTY_ROOT};
pub use types::{block::*, primitives::*, receipt::*, transaction::*};
