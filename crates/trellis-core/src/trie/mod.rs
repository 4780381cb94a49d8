//! Merkle Patricia Trie construction and proof handling.
//!
//! The trie here exists to reproduce Ethereum's transaction and receipt
//! trie roots byte for byte, so the node encoding rules are replicated
//! exactly: hex-prefixed nibble paths, four node kinds, and the hybrid
//! child-reference rule where a child whose encoding is shorter than 32
//! bytes is embedded in its parent while anything longer is referenced by
//! its keccak256 digest. The root node is always referenced by hash.

pub mod nibbles;
pub mod node;
pub mod proof;

pub use node::{Node, NodeId};
pub use proof::{verify_proof, ProofError};

use crate::hash::keccak256;
use crate::rlp::{self, Item};
use nibbles::{bytes_to_nibbles, common_prefix_len, hex_prefix_encode};
use node::EMPTY_NODE;

/// Root hash of an empty trie: keccak256 of RLP("").
pub const EMPTY_ROOT: [u8; 32] = [
    0x56, 0xe8, 0x1f, 0x17, 0x1b, 0xcc, 0x55, 0xa6, 0xff, 0x83, 0x45, 0xe6, 0x92, 0xc0, 0xf8,
    0x6e, 0x5b, 0x48, 0xe0, 0x1b, 0x99, 0x6c, 0xad, 0xc0, 0x01, 0x62, 0x2f, 0xb5, 0xe3, 0x63,
    0xb4, 0x21,
];

/// An in-memory Merkle Patricia Trie keyed by raw bytes.
///
/// Built fresh for one block, queried for its root and proofs, then
/// dropped. All nodes live in an arena owned by the trie and handles never
/// escape it. Nothing is hashed during insertion; `root_hash` and
/// `create_proof` encode whatever the structure is when they are called, so
/// the root is always a pure function of the current key/value set.
pub struct Trie {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    /// Create an empty trie.
    pub fn new() -> Self {
        Trie {
            nodes: vec![Node::Empty],
            root: EMPTY_NODE,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root == EMPTY_NODE
    }

    /// Insert a key/value pair, overwriting any previous value.
    pub fn put(&mut self, key: &[u8], value: Vec<u8>) {
        let path = bytes_to_nibbles(key);
        self.root = self.insert_at(self.root, &path, value);
    }

    /// Look up the value stored under `key`.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        let path = bytes_to_nibbles(key);
        let mut id = self.root;
        let mut pos = 0;

        loop {
            match &self.nodes[id.0] {
                Node::Empty => return None,
                Node::Leaf { path: leaf_path, value } => {
                    return if &path[pos..] == leaf_path.as_slice() {
                        Some(value.as_slice())
                    } else {
                        None
                    };
                }
                Node::Extension { path: ext_path, child } => {
                    if !path[pos..].starts_with(ext_path) {
                        return None;
                    }
                    pos += ext_path.len();
                    id = *child;
                }
                Node::Branch { children, value } => {
                    if pos == path.len() {
                        return value.as_deref();
                    }
                    id = children[path[pos] as usize];
                    pos += 1;
                }
            }
        }
    }

    /// keccak256 of the encoded root node; `EMPTY_ROOT` for an empty trie.
    pub fn root_hash(&self) -> [u8; 32] {
        if self.root == EMPTY_NODE {
            return EMPTY_ROOT;
        }
        keccak256(&self.encode_node(self.root))
    }

    /// Collect the proof nodes on the path from the root toward `key`.
    ///
    /// A visited node contributes an entry iff it is the root or its
    /// encoding is at least 32 bytes; shorter nodes already travel inside
    /// their parent's encoding. The key need not exist: for an absent key
    /// the path up to the divergence point is returned.
    pub fn create_proof(&self, key: &[u8]) -> Vec<Vec<u8>> {
        let path = bytes_to_nibbles(key);
        let mut proof = Vec::new();
        let mut id = self.root;
        let mut pos = 0;
        let mut is_root = true;

        while id != EMPTY_NODE {
            let encoded = self.encode_node(id);
            if is_root || encoded.len() >= 32 {
                proof.push(encoded);
            }
            is_root = false;

            match &self.nodes[id.0] {
                Node::Empty | Node::Leaf { .. } => break,
                Node::Extension { path: ext_path, child } => {
                    if !path[pos..].starts_with(ext_path) {
                        break;
                    }
                    pos += ext_path.len();
                    id = *child;
                }
                Node::Branch { children, .. } => {
                    if pos == path.len() {
                        break;
                    }
                    id = children[path[pos] as usize];
                    pos += 1;
                }
            }
        }
        proof
    }

    // --- Node encoding ---

    /// Full RLP encoding of a node.
    fn encode_node(&self, id: NodeId) -> Vec<u8> {
        rlp::encode(&self.node_item(id))
    }

    /// Structural RLP item for a node, children resolved through
    /// `child_ref`.
    fn node_item(&self, id: NodeId) -> Item {
        match &self.nodes[id.0] {
            Node::Empty => Item::Bytes(Vec::new()),
            Node::Leaf { path, value } => Item::List(vec![
                Item::Bytes(hex_prefix_encode(path, true)),
                Item::Bytes(value.clone()),
            ]),
            Node::Extension { path, child } => Item::List(vec![
                Item::Bytes(hex_prefix_encode(path, false)),
                self.child_ref(*child),
            ]),
            Node::Branch { children, value } => {
                let mut items = Vec::with_capacity(17);
                for &child in children.iter() {
                    items.push(self.child_ref(child));
                }
                items.push(Item::Bytes(value.clone().unwrap_or_default()));
                Item::List(items)
            }
        }
    }

    /// How a parent refers to a child: the child's own item when its
    /// encoding is shorter than 32 bytes, its keccak256 digest otherwise.
    fn child_ref(&self, id: NodeId) -> Item {
        if id == EMPTY_NODE {
            return Item::Bytes(Vec::new());
        }
        let item = self.node_item(id);
        let encoded = rlp::encode(&item);
        if encoded.len() < 32 {
            item
        } else {
            Item::Bytes(keccak256(&encoded).to_vec())
        }
    }

    // --- Insertion ---

    fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn take(&mut self, id: NodeId) -> Node {
        std::mem::replace(&mut self.nodes[id.0], Node::Empty)
    }

    fn insert_at(&mut self, id: NodeId, path: &[u8], value: Vec<u8>) -> NodeId {
        if id == EMPTY_NODE {
            return self.alloc(Node::Leaf {
                path: path.to_vec(),
                value,
            });
        }

        match self.take(id) {
            // Only slot 0 holds Empty, and that is the id == EMPTY_NODE case.
            Node::Empty => self.alloc(Node::Leaf {
                path: path.to_vec(),
                value,
            }),

            Node::Leaf {
                path: leaf_path,
                value: leaf_value,
            } => {
                let common = common_prefix_len(&leaf_path, path);
                if common == leaf_path.len() && common == path.len() {
                    // Same key: overwrite in place.
                    self.nodes[id.0] = Node::Leaf {
                        path: leaf_path,
                        value,
                    };
                    return id;
                }

                let mut children = Node::empty_children();
                let mut branch_value = None;

                if common == leaf_path.len() {
                    branch_value = Some(leaf_value);
                } else {
                    let slot = leaf_path[common] as usize;
                    children[slot] = self.alloc(Node::Leaf {
                        path: leaf_path[common + 1..].to_vec(),
                        value: leaf_value,
                    });
                }

                if common == path.len() {
                    branch_value = Some(value);
                } else {
                    let slot = path[common] as usize;
                    children[slot] = self.alloc(Node::Leaf {
                        path: path[common + 1..].to_vec(),
                        value,
                    });
                }

                let branch = Node::Branch {
                    children,
                    value: branch_value,
                };
                self.install_split(id, &leaf_path[..common], branch)
            }

            Node::Extension {
                path: ext_path,
                child,
            } => {
                let common = common_prefix_len(&ext_path, path);
                if common == ext_path.len() {
                    // The key runs through this extension; descend.
                    let new_child = self.insert_at(child, &path[common..], value);
                    self.nodes[id.0] = Node::Extension {
                        path: ext_path,
                        child: new_child,
                    };
                    return id;
                }

                let mut children = Node::empty_children();
                let mut branch_value = None;

                // Re-hang the truncated extension, or its child directly
                // when nothing remains of the path past the branch nibble.
                let ext_slot = ext_path[common] as usize;
                let ext_rest = &ext_path[common + 1..];
                children[ext_slot] = if ext_rest.is_empty() {
                    child
                } else {
                    self.alloc(Node::Extension {
                        path: ext_rest.to_vec(),
                        child,
                    })
                };

                if common == path.len() {
                    branch_value = Some(value);
                } else {
                    let slot = path[common] as usize;
                    children[slot] = self.alloc(Node::Leaf {
                        path: path[common + 1..].to_vec(),
                        value,
                    });
                }

                let branch = Node::Branch {
                    children,
                    value: branch_value,
                };
                self.install_split(id, &ext_path[..common], branch)
            }

            Node::Branch {
                mut children,
                value: branch_value,
            } => {
                if path.is_empty() {
                    self.nodes[id.0] = Node::Branch {
                        children,
                        value: Some(value),
                    };
                    return id;
                }
                let slot = path[0] as usize;
                children[slot] = self.insert_at(children[slot], &path[1..], value);
                self.nodes[id.0] = Node::Branch {
                    children,
                    value: branch_value,
                };
                id
            }
        }
    }

    /// Install a split result at `id`: the branch directly when the
    /// diverging paths shared nothing, otherwise an extension over the
    /// shared prefix.
    fn install_split(&mut self, id: NodeId, shared: &[u8], branch: Node) -> NodeId {
        if shared.is_empty() {
            self.nodes[id.0] = branch;
        } else {
            let branch_id = self.alloc(branch);
            self.nodes[id.0] = Node::Extension {
                path: shared.to_vec(),
                child: branch_id,
            };
        }
        id
    }
}
