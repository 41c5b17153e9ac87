use std::collections::HashMap;

use zmt_core::base::Digest;

use crate::zero_hashes::ZeroHashes;

/// Position of a node: level 0 is the root, level `height` holds the leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeAddress {
    /// Distance from the root.
    pub level: u8,
    /// Position within the level, in `[0, 2^level)`.
    pub index: u64,
}

impl NodeAddress {
    /// The root address.
    pub const ROOT: Self = Self::new(0, 0);

    /// Create a node address.
    #[must_use]
    pub const fn new(level: u8, index: u64) -> Self {
        Self { level, index }
    }

    /// The parent node. The root is its own parent.
    #[must_use]
    pub const fn parent(self) -> Self {
        Self::new(self.level.saturating_sub(1), self.index >> 1)
    }

    /// The node sharing this node's parent.
    #[must_use]
    pub const fn sibling(self) -> Self {
        Self::new(self.level, self.index ^ 1)
    }
}

/// Sparse map from node address to digest.
///
/// Addresses that were never written read as the empty-subtree root of their
/// height, `zero_hashes[height - level]`. The store does not check bounds.
#[derive(Debug, Clone)]
pub struct NodeStore {
    zero_hashes: ZeroHashes,
    nodes: HashMap<NodeAddress, Digest>,
}

impl NodeStore {
    /// Create an empty store over the given zero-hash table.
    #[must_use]
    pub fn new(zero_hashes: ZeroHashes) -> Self {
        Self {
            zero_hashes,
            nodes: HashMap::new(),
        }
    }

    /// Stored value, or the empty-subtree root of the node's height.
    #[must_use]
    pub fn get(&self, address: NodeAddress) -> Digest {
        self.nodes.get(&address).copied().unwrap_or_else(|| {
            let height = self.zero_hashes.height();
            self.zero_hashes.at(height.saturating_sub(address.level))
        })
    }

    /// Insert or overwrite a node.
    pub fn set(&mut self, address: NodeAddress, value: Digest) {
        self.nodes.insert(address, value);
    }

    /// Whether the node was ever written.
    #[must_use]
    pub fn contains(&self, address: NodeAddress) -> bool {
        self.nodes.contains_key(&address)
    }

    /// Number of written nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node was ever written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The zero-hash table backing the defaults.
    #[must_use]
    pub const fn zero_hashes(&self) -> &ZeroHashes {
        &self.zero_hashes
    }
}
