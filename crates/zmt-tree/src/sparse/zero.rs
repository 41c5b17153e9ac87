//! Random-access Merkle tree over a sparse node store.

use tracing::{debug, trace};
use zmt_core::base::{Digest, MerkleHasher, Sha256};
use zmt_core::schema::config::{HashAlgorithm, TreeConfig};

use super::node_store::{NodeAddress, NodeStore};
use crate::core::{MerkleTreeError, validate_leaf_index, validate_node_address};
use crate::proof::{DeltaMerkleProof, MerkleProof, combine_at};
use crate::zero_hashes::ZeroHashes;

/// A Merkle tree of `2^height` leaves that stores only written paths.
///
/// Every leaf starts as [`Digest::EMPTY`]. Each [`set_leaf`](Self::set_leaf)
/// writes the leaf and its `height` ancestors, so storage grows with the
/// number of updates and never with `2^height`.
#[derive(Debug, Clone)]
pub struct ZeroMerkleTree<H = Sha256> {
    hasher: H,
    height: u8,
    store: NodeStore,
}

impl ZeroMerkleTree {
    /// Create an empty SHA-256 tree.
    ///
    /// # Errors
    /// Returns `MerkleTreeError::HeightTooLarge` above
    /// [`MAX_TREE_HEIGHT`](crate::MAX_TREE_HEIGHT).
    pub fn new(height: u8) -> Result<Self, MerkleTreeError> {
        Self::with_hasher(height, Sha256)
    }
}

impl ZeroMerkleTree<HashAlgorithm> {
    /// Create an empty tree from configuration.
    ///
    /// # Errors
    /// Returns `MerkleTreeError::HeightTooLarge` if the configured height is
    /// not supported.
    pub fn from_config(config: &TreeConfig) -> Result<Self, MerkleTreeError> {
        Self::with_hasher(config.height, config.hash)
    }
}

impl<H: MerkleHasher> ZeroMerkleTree<H> {
    /// Create an empty tree with a custom hasher.
    ///
    /// # Errors
    /// Returns `MerkleTreeError::HeightTooLarge` above
    /// [`MAX_TREE_HEIGHT`](crate::MAX_TREE_HEIGHT).
    pub fn with_hasher(height: u8, hasher: H) -> Result<Self, MerkleTreeError> {
        let zero_hashes = ZeroHashes::compute(&hasher, height)?;
        Self::with_zero_hashes(hasher, zero_hashes)
    }

    /// Create an empty tree reusing a pre-computed zero-hash table.
    ///
    /// The tree height is the height of the table.
    ///
    /// # Errors
    /// Returns `MerkleTreeError::ZeroHashMismatch` if the table was computed
    /// with a different hasher.
    pub fn with_zero_hashes(hasher: H, zero_hashes: ZeroHashes) -> Result<Self, MerkleTreeError> {
        if !zero_hashes.is_produced_by(&hasher) {
            return Err(MerkleTreeError::ZeroHashMismatch);
        }
        let height = zero_hashes.height();
        debug!(height, root = %zero_hashes.empty_root(), "Created zero Merkle tree");
        Ok(Self {
            hasher,
            height,
            store: NodeStore::new(zero_hashes),
        })
    }

    /// Tree height.
    #[must_use]
    pub const fn height(&self) -> u8 {
        self.height
    }

    /// Current root.
    #[must_use]
    pub fn root(&self) -> Digest {
        self.store.get(NodeAddress::ROOT)
    }

    /// Number of nodes written so far.
    #[must_use]
    pub fn stored_node_count(&self) -> usize {
        self.store.len()
    }

    /// The zero-hash table, for sharing with other trees of the same shape.
    #[must_use]
    pub const fn zero_hashes(&self) -> &ZeroHashes {
        self.store.zero_hashes()
    }

    /// Current value of a leaf.
    ///
    /// # Errors
    /// Returns `MerkleTreeError::IndexOutOfRange` if `index >= 2^height`.
    pub fn get_leaf(&self, index: u64) -> Result<Digest, MerkleTreeError> {
        validate_leaf_index(index, self.height)?;
        Ok(self.store.get(NodeAddress::new(self.height, index)))
    }

    /// Current value of any node.
    ///
    /// # Errors
    /// Returns an error if `level > height` or `index >= 2^level`.
    pub fn get_node(&self, level: u8, index: u64) -> Result<Digest, MerkleTreeError> {
        validate_node_address(level, index, self.height)?;
        Ok(self.store.get(NodeAddress::new(level, index)))
    }

    /// Membership proof of a leaf against the current root.
    ///
    /// # Errors
    /// Returns `MerkleTreeError::IndexOutOfRange` if `index >= 2^height`.
    pub fn get_proof(&self, index: u64) -> Result<MerkleProof, MerkleTreeError> {
        validate_leaf_index(index, self.height)?;

        let leaf = NodeAddress::new(self.height, index);
        let mut siblings = Vec::with_capacity(usize::from(self.height));
        let mut address = leaf;
        while address.level > 0 {
            siblings.push(self.store.get(address.sibling()));
            address = address.parent();
        }

        MerkleProof::new(index, self.store.get(leaf), siblings, self.root())
    }

    /// Overwrite a leaf and recompute its path to the root.
    ///
    /// Writes exactly the leaf and its ancestors. Siblings are never written,
    /// so they serve as the proof of both the old and the new value.
    ///
    /// # Errors
    /// Returns `MerkleTreeError::IndexOutOfRange` if `index >= 2^height`; the
    /// tree is left untouched in that case.
    pub fn set_leaf(
        &mut self,
        index: u64,
        value: Digest,
    ) -> Result<DeltaMerkleProof, MerkleTreeError> {
        validate_leaf_index(index, self.height)?;

        let old_value = self.store.get(NodeAddress::new(self.height, index));
        let old_root = self.root();

        let mut siblings = Vec::with_capacity(usize::from(self.height));
        let mut current = value;
        let mut address = NodeAddress::new(self.height, index);
        while address.level > 0 {
            self.store.set(address, current);
            let sibling = self.store.get(address.sibling());
            current = combine_at(&self.hasher, address.index, &current, &sibling);
            siblings.push(sibling);
            address = address.parent();
        }
        self.store.set(NodeAddress::ROOT, current);

        trace!(index, value = %value, root = %current, "Set leaf");
        DeltaMerkleProof::new(index, old_value, old_root, siblings, value, current)
    }
}
