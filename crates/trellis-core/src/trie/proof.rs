//! Stateless verification of Merkle Patricia inclusion proofs.

use thiserror::Error;

use super::nibbles::{bytes_to_nibbles, hex_prefix_decode};
use crate::hash::keccak256;
use crate::rlp::{self, DecodeError, Item};

/// Errors during Merkle Patricia proof verification.
/// Each variant is specific enough to diagnose exactly what went wrong.
#[derive(Debug, Error)]
pub enum ProofError {
    #[error("Empty proof: no trie nodes provided")]
    EmptyProof,

    #[error("Proof root mismatch: first node hashes to {computed}, expected root is {expected}")]
    RootMismatch { computed: String, expected: String },

    #[error("Hash chain broken at depth {depth}: node hashes to {computed}, parent references {expected}")]
    NodeHashMismatch {
        depth: usize,
        computed: String,
        expected: String,
    },

    #[error("Proof ends at depth {depth}: parent references node {hash} but no further node was supplied")]
    MissingNode { depth: usize, hash: String },

    #[error("Proof has {total} nodes but the walk only linked {used}")]
    UnconsumedNodes { used: usize, total: usize },

    #[error("Invalid trie node at depth {depth}: {reason}")]
    InvalidNode { depth: usize, reason: String },

    #[error("Invalid RLP in proof node at depth {depth}: {source}")]
    InvalidRlp { depth: usize, source: DecodeError },
}

/// How a parent's encoding refers to one child.
enum ChildRef {
    Absent,
    Hash([u8; 32]),
    Embedded(Item),
}

/// Verify a Merkle Patricia inclusion proof against a known root hash.
///
/// Walks the proof from the root node toward `key`, checking every hash
/// link on the way and descending into embedded children in place. Returns
/// the value stored under the key, or `None` when the proof shows the key
/// is absent from the trie. The proof must contain exactly the nodes the
/// walk links, in root-to-leaf order.
pub fn verify_proof(
    expected_root: &[u8; 32],
    key: &[u8],
    proof_nodes: &[Vec<u8>],
) -> Result<Option<Vec<u8>>, ProofError> {
    if proof_nodes.is_empty() {
        return Err(ProofError::EmptyProof);
    }

    let computed = keccak256(&proof_nodes[0]);
    if computed != *expected_root {
        return Err(ProofError::RootMismatch {
            computed: hex::encode(computed),
            expected: hex::encode(expected_root),
        });
    }

    let nibbles = bytes_to_nibbles(key);
    let total = proof_nodes.len();
    let mut pos = 0;
    let mut node_index = 0;
    let mut depth = 0;
    let mut current = decode_node(&proof_nodes[0], 0)?;

    loop {
        let items = match &current {
            Item::List(items) => items,
            Item::Bytes(_) => {
                return Err(ProofError::InvalidNode {
                    depth,
                    reason: "expected a node list, found a byte string".to_string(),
                })
            }
        };

        let next = match items.len() {
            17 => {
                // Branch node: 16 children plus a value slot.
                if pos == nibbles.len() {
                    return finish(branch_value(&items[16], depth)?, node_index + 1, total);
                }
                let slot = nibbles[pos] as usize;
                pos += 1;
                child_ref(&items[slot], depth)?
            }
            2 => {
                // Extension or leaf, distinguished by the hex-prefix flag.
                let encoded_path = match &items[0] {
                    Item::Bytes(bytes) => bytes,
                    Item::List(_) => {
                        return Err(ProofError::InvalidNode {
                            depth,
                            reason: "path element is not a byte string".to_string(),
                        })
                    }
                };
                let (path, is_leaf) =
                    hex_prefix_decode(encoded_path).ok_or_else(|| ProofError::InvalidNode {
                        depth,
                        reason: "malformed hex-prefix path".to_string(),
                    })?;

                if is_leaf {
                    if nibbles[pos..] == path[..] {
                        let value = match &items[1] {
                            Item::Bytes(value) => value.clone(),
                            Item::List(_) => {
                                return Err(ProofError::InvalidNode {
                                    depth,
                                    reason: "leaf value is not a byte string".to_string(),
                                })
                            }
                        };
                        return finish(Some(value), node_index + 1, total);
                    }
                    // Divergent leaf: valid proof of absence.
                    return finish(None, node_index + 1, total);
                }

                if !nibbles[pos..].starts_with(&path) {
                    // Divergent extension: valid proof of absence.
                    return finish(None, node_index + 1, total);
                }
                pos += path.len();
                child_ref(&items[1], depth)?
            }
            len => {
                return Err(ProofError::InvalidNode {
                    depth,
                    reason: format!("{len}-element node list"),
                })
            }
        };

        match next {
            ChildRef::Absent => return finish(None, node_index + 1, total),
            ChildRef::Embedded(item) => current = item,
            ChildRef::Hash(hash) => {
                node_index += 1;
                let node = match proof_nodes.get(node_index) {
                    Some(node) => node,
                    None => {
                        return Err(ProofError::MissingNode {
                            depth: depth + 1,
                            hash: hex::encode(hash),
                        })
                    }
                };
                let computed = keccak256(node);
                if computed != hash {
                    return Err(ProofError::NodeHashMismatch {
                        depth: depth + 1,
                        computed: hex::encode(computed),
                        expected: hex::encode(hash),
                    });
                }
                current = decode_node(node, depth + 1)?;
            }
        }
        depth += 1;
    }
}

/// Terminal check shared by every successful walk: the proof may not carry
/// nodes the walk never linked.
fn finish(
    value: Option<Vec<u8>>,
    used: usize,
    total: usize,
) -> Result<Option<Vec<u8>>, ProofError> {
    if used != total {
        return Err(ProofError::UnconsumedNodes { used, total });
    }
    Ok(value)
}

fn child_ref(item: &Item, depth: usize) -> Result<ChildRef, ProofError> {
    match item {
        Item::Bytes(bytes) if bytes.is_empty() => Ok(ChildRef::Absent),
        Item::Bytes(bytes) if bytes.len() == 32 => {
            let mut hash = [0u8; 32];
            hash.copy_from_slice(bytes);
            Ok(ChildRef::Hash(hash))
        }
        Item::Bytes(bytes) => Err(ProofError::InvalidNode {
            depth,
            reason: format!("{}-byte child reference", bytes.len()),
        }),
        Item::List(_) => Ok(ChildRef::Embedded(item.clone())),
    }
}

fn branch_value(item: &Item, depth: usize) -> Result<Option<Vec<u8>>, ProofError> {
    match item {
        Item::Bytes(bytes) if bytes.is_empty() => Ok(None),
        Item::Bytes(bytes) => Ok(Some(bytes.clone())),
        Item::List(_) => Err(ProofError::InvalidNode {
            depth,
            reason: "branch value is not a byte string".to_string(),
        }),
    }
}

fn decode_node(data: &[u8], depth: usize) -> Result<Item, ProofError> {
    rlp::decode_exact(data).map_err(|source| ProofError::InvalidRlp { depth, source })
}
