//! Append-only Merkle tree that keeps nothing but its last proof.
//!
//! Appending leaf `n + 1` only needs the proof of leaf `n`. At every level
//! where the two leaves share an ancestor, the old sibling still applies. Where
//! they do not, the new leaf either opens a fresh right-hand subtree (its
//! sibling is an empty-subtree root) or starts the right half of a subtree
//! whose left half was just sealed (its sibling is the old path node).

#![allow(
    clippy::arithmetic_side_effects,
    reason = "Shifts are by levels below the validated tree height"
)]

use tracing::{debug, trace};
use zmt_core::base::{Digest, MerkleHasher, Sha256};
use zmt_core::schema::config::{HashAlgorithm, TreeConfig};

use crate::core::{MerkleTreeError, validate_leaf_index};
use crate::proof::{DeltaMerkleProof, MerkleProof, compute_merkle_path, compute_root};
use crate::zero_hashes::ZeroHashes;

/// Proof of the most recently appended leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontier {
    /// Index of the last appended leaf, `None` before the first append.
    pub last_index: Option<u64>,
    /// Value of the last appended leaf.
    pub value: Digest,
    /// Siblings of the last appended leaf, leaf-to-root.
    pub siblings: Vec<Digest>,
    /// Root after the last append.
    pub root: Digest,
}

impl Frontier {
    /// The frontier of a tree with no leaves.
    #[must_use]
    pub fn empty(zero_hashes: &ZeroHashes) -> Self {
        Self {
            last_index: None,
            value: Digest::EMPTY,
            siblings: zero_hashes
                .as_slice()
                .iter()
                .take(usize::from(zero_hashes.height()))
                .copied()
                .collect(),
            root: zero_hashes.empty_root(),
        }
    }

    /// Index the next append will use.
    #[must_use]
    pub fn next_index(&self) -> u64 {
        self.last_index.map_or(0, |index| index.saturating_add(1))
    }
}

/// A Merkle tree filled strictly left to right.
///
/// State is a single [`Frontier`], so each append costs `O(height)` time and
/// memory no matter how many leaves came before.
#[derive(Debug, Clone)]
pub struct AppendOnlyMerkleTree<H = Sha256> {
    hasher: H,
    height: u8,
    zero_hashes: ZeroHashes,
    frontier: Frontier,
}

impl AppendOnlyMerkleTree {
    /// Create an empty SHA-256 tree.
    ///
    /// # Errors
    /// Returns `MerkleTreeError::HeightTooLarge` above
    /// [`MAX_TREE_HEIGHT`](crate::MAX_TREE_HEIGHT).
    pub fn new(height: u8) -> Result<Self, MerkleTreeError> {
        Self::with_hasher(height, Sha256)
    }
}

impl AppendOnlyMerkleTree<HashAlgorithm> {
    /// Create an empty tree from configuration.
    ///
    /// # Errors
    /// Returns `MerkleTreeError::HeightTooLarge` if the configured height is
    /// not supported.
    pub fn from_config(config: &TreeConfig) -> Result<Self, MerkleTreeError> {
        Self::with_hasher(config.height, config.hash)
    }
}

impl<H: MerkleHasher> AppendOnlyMerkleTree<H> {
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
    /// # Errors
    /// Returns `MerkleTreeError::ZeroHashMismatch` if the table was computed
    /// with a different hasher.
    pub fn with_zero_hashes(hasher: H, zero_hashes: ZeroHashes) -> Result<Self, MerkleTreeError> {
        if !zero_hashes.is_produced_by(&hasher) {
            return Err(MerkleTreeError::ZeroHashMismatch);
        }
        let height = zero_hashes.height();
        let frontier = Frontier::empty(&zero_hashes);
        debug!(height, root = %frontier.root, "Created append-only Merkle tree");
        Ok(Self {
            hasher,
            height,
            zero_hashes,
            frontier,
        })
    }

    /// Tree height.
    #[must_use]
    pub const fn height(&self) -> u8 {
        self.height
    }

    /// Current root.
    #[must_use]
    pub const fn root(&self) -> Digest {
        self.frontier.root
    }

    /// Number of leaves appended so far.
    #[must_use]
    pub fn leaf_count(&self) -> u64 {
        self.frontier.next_index()
    }

    /// The proof state carried between appends.
    #[must_use]
    pub const fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// The zero-hash table, for sharing with other trees of the same shape.
    #[must_use]
    pub const fn zero_hashes(&self) -> &ZeroHashes {
        &self.zero_hashes
    }

    /// Membership proof of the last appended leaf, if any.
    #[must_use]
    pub fn last_proof(&self) -> Option<MerkleProof> {
        self.frontier.last_index.map(|index| MerkleProof {
            index,
            value: self.frontier.value,
            siblings: self.frontier.siblings.clone(),
            root: self.frontier.root,
        })
    }

    /// Append a leaf at the next free index.
    ///
    /// The returned delta always has an empty `old_value`, since the slot was
    /// never written before.
    ///
    /// # Errors
    /// Returns `MerkleTreeError::IndexOutOfRange` when all `2^height` slots
    /// are taken; the tree is left untouched in that case.
    pub fn append_leaf(&mut self, value: Digest) -> Result<DeltaMerkleProof, MerkleTreeError> {
        let index = self.frontier.next_index();
        validate_leaf_index(index, self.height)?;

        let siblings = self.next_siblings(index)?;
        let new_root = compute_root(&self.hasher, &siblings, value, index)?;
        let delta = DeltaMerkleProof::new(
            index,
            Digest::EMPTY,
            self.frontier.root,
            siblings.clone(),
            value,
            new_root,
        )?;

        self.frontier = Frontier {
            last_index: Some(index),
            value,
            siblings,
            root: new_root,
        };
        trace!(index, value = %value, root = %new_root, "Appended leaf");
        Ok(delta)
    }

    /// Siblings of leaf `index`, derived from the frontier at `index - 1`.
    fn next_siblings(&self, index: u64) -> Result<Vec<Digest>, MerkleTreeError> {
        let old = &self.frontier;
        let old_path = match old.last_index {
            Some(old_index) => {
                compute_merkle_path(&self.hasher, &old.siblings, old.value, old_index)?
            }
            None => Vec::new(),
        };

        (0..self.height)
            .map(|level| {
                let new_ancestor = index >> level;
                let old_ancestor = old.last_index.map(|old_index| old_index >> level);
                let slot = usize::from(level);
                if old_ancestor == Some(new_ancestor) {
                    old.siblings.get(slot).copied()
                } else if new_ancestor.is_multiple_of(2) {
                    self.zero_hashes.get(level)
                } else {
                    old_path.get(slot).copied()
                }
            })
            .collect::<Option<Vec<_>>>()
            .ok_or(MerkleTreeError::Unexpected(
                "frontier is shorter than the tree height",
            ))
    }
}
