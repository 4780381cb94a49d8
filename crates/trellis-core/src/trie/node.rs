/// Handle to a node inside its owning trie's arena.
///
/// A `NodeId` is only meaningful to the `Trie` that allocated it; there is
/// no way to resolve one without going through the owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeId(pub(crate) usize);

/// Slot 0 of every arena holds `Node::Empty` and doubles as the null
/// reference: an empty root and every vacant branch slot point here.
pub(crate) const EMPTY_NODE: NodeId = NodeId(0);

/// One node of a Merkle Patricia Trie.
///
/// Paths are nibble sequences (one `u8` per nibble, values 0 to 15).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Unoccupied: the root of an empty trie or an absent branch child.
    Empty,
    /// Terminal node holding the value for the rest of the key path.
    Leaf { path: Vec<u8>, value: Vec<u8> },
    /// Shared-prefix shortcut down to a single child.
    Extension { path: Vec<u8>, child: NodeId },
    /// Sixteen-way fan-out, one slot per next nibble, plus the value for a
    /// key that ends exactly here.
    Branch {
        children: [NodeId; 16],
        value: Option<Vec<u8>>,
    },
}

impl Node {
    pub(crate) fn empty_children() -> [NodeId; 16] {
        [EMPTY_NODE; 16]
    }
}
