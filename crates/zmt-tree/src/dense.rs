//! Fully materialized Merkle tree for small heights.
//!
//! Every node is stored, level by level. The tree is built bottom-up in a
//! single pass and serves as a reference for the sparse variants.

use tracing::debug;
use zmt_core::base::{Digest, MerkleHasher, Sha256};

use crate::core::{MerkleTreeError, leaf_capacity, validate_leaf_index, validate_node_address};
use crate::proof::{DeltaMerkleProof, MerkleProof, compute_merkle_path};
use crate::sparse::NodeAddress;

/// The tallest dense tree: `2^20` leaves and about two million nodes.
pub const DENSE_MAX_HEIGHT: u8 = 20;

/// A Merkle tree holding all `2^(height + 1) - 1` nodes in memory.
#[derive(Debug, Clone)]
pub struct DenseMerkleTree<H = Sha256> {
    hasher: H,
    height: u8,
    /// `levels[0]` holds the root, `levels[height]` the leaves.
    levels: Vec<Vec<Digest>>,
}

impl<H: MerkleHasher> DenseMerkleTree<H> {
    /// Build a tree from its leftmost leaves.
    ///
    /// Missing leaves are padded with [`Digest::EMPTY`].
    ///
    /// # Errors
    /// Returns `MerkleTreeError::HeightTooLarge` above [`DENSE_MAX_HEIGHT`],
    /// and `MerkleTreeError::IndexOutOfRange` if there are more leaves than
    /// slots.
    pub fn from_leaves(
        hasher: H,
        height: u8,
        mut leaves: Vec<Digest>,
    ) -> Result<Self, MerkleTreeError> {
        if height > DENSE_MAX_HEIGHT {
            return Err(MerkleTreeError::HeightTooLarge {
                height: usize::from(height),
                max: DENSE_MAX_HEIGHT,
            });
        }
        let slots = leaf_capacity(height);
        let capacity = usize::try_from(slots)
            .map_err(|_| MerkleTreeError::Unexpected("leaf capacity does not fit into usize"))?;
        if leaves.len() > capacity {
            return Err(MerkleTreeError::IndexOutOfRange {
                index: slots,
                height,
            });
        }
        let filled = leaves.len();
        leaves.resize(capacity, Digest::EMPTY);

        let mut levels = Vec::with_capacity(usize::from(height).saturating_add(1));
        let mut current = leaves;
        for _ in 0..height {
            let next = current
                .chunks_exact(2)
                .map(|pair| match pair {
                    [left, right] => Ok(hasher.combine(left, right)),
                    _ => Err(MerkleTreeError::Unexpected("dense level has odd width")),
                })
                .collect::<Result<Vec<_>, _>>()?;
            levels.push(current);
            current = next;
        }
        levels.push(current);
        levels.reverse();

        let tree = Self {
            hasher,
            height,
            levels,
        };
        debug!(height, leaves = filled, root = %tree.root(), "Built dense Merkle tree");
        Ok(tree)
    }

    /// Tree height.
    #[must_use]
    pub const fn height(&self) -> u8 {
        self.height
    }

    /// Current root.
    #[must_use]
    pub fn root(&self) -> Digest {
        self.levels
            .first()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or(Digest::EMPTY)
    }

    /// Current value of any node.
    ///
    /// # Errors
    /// Returns an error if `level > height` or `index >= 2^level`.
    pub fn get_node(&self, level: u8, index: u64) -> Result<Digest, MerkleTreeError> {
        validate_node_address(level, index, self.height)?;
        self.slot(NodeAddress::new(level, index))
    }

    /// Current value of a leaf.
    ///
    /// # Errors
    /// Returns `MerkleTreeError::IndexOutOfRange` if `index >= 2^height`.
    pub fn get_leaf(&self, index: u64) -> Result<Digest, MerkleTreeError> {
        validate_leaf_index(index, self.height)?;
        self.slot(NodeAddress::new(self.height, index))
    }

    /// Membership proof of a leaf against the current root.
    ///
    /// # Errors
    /// Returns `MerkleTreeError::IndexOutOfRange` if `index >= 2^height`.
    pub fn get_proof(&self, index: u64) -> Result<MerkleProof, MerkleTreeError> {
        let value = self.get_leaf(index)?;

        let mut siblings = Vec::with_capacity(usize::from(self.height));
        let mut address = NodeAddress::new(self.height, index);
        while address.level > 0 {
            siblings.push(self.slot(address.sibling())?);
            address = address.parent();
        }

        MerkleProof::new(index, value, siblings, self.root())
    }

    /// Overwrite a leaf and recompute its ancestors.
    ///
    /// # Errors
    /// Returns `MerkleTreeError::IndexOutOfRange` if `index >= 2^height`.
    pub fn update_leaf(
        &mut self,
        index: u64,
        value: Digest,
    ) -> Result<DeltaMerkleProof, MerkleTreeError> {
        let old = self.get_proof(index)?;
        let path = compute_merkle_path(&self.hasher, &old.siblings, value, index)?;
        let new_root = *path
            .last()
            .ok_or(MerkleTreeError::Unexpected("Merkle path is empty"))?;

        let mut address = NodeAddress::new(self.height, index);
        for node in path {
            *self.slot_mut(address)? = node;
            address = address.parent();
        }

        DeltaMerkleProof::new(index, old.value, old.root, old.siblings, value, new_root)
    }

    fn slot(&self, address: NodeAddress) -> Result<Digest, MerkleTreeError> {
        let index = usize::try_from(address.index)
            .map_err(|_| MerkleTreeError::Unexpected("node index does not fit into usize"))?;
        self.levels
            .get(usize::from(address.level))
            .and_then(|level| level.get(index))
            .copied()
            .ok_or(MerkleTreeError::NodeIndexOutOfRange {
                level: address.level,
                index: address.index,
            })
    }

    fn slot_mut(&mut self, address: NodeAddress) -> Result<&mut Digest, MerkleTreeError> {
        let index = usize::try_from(address.index)
            .map_err(|_| MerkleTreeError::Unexpected("node index does not fit into usize"))?;
        self.levels
            .get_mut(usize::from(address.level))
            .and_then(|level| level.get_mut(index))
            .ok_or(MerkleTreeError::NodeIndexOutOfRange {
                level: address.level,
                index: address.index,
            })
    }
}
