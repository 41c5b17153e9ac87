//! Roots of all-empty subtrees, one per height.

use std::sync::Arc;

use zmt_core::base::{Digest, MerkleHasher};

use crate::core::{MerkleTreeError, validate_height};

/// Pre-computed roots of empty subtrees.
///
/// Entry `i` is the root of an all-empty subtree of height `i`: entry 0 is
/// [`Digest::EMPTY`] and entry `i` is `combine(entry[i-1], entry[i-1])`. For
/// a tree of height `H`, entry `i` is therefore the value of every node at
/// level `H - i` whose subtree was never written.
///
/// The table is immutable and cheap to clone, so trees of the same height and
/// hasher can share one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZeroHashes {
    height: u8,
    hashes: Arc<[Digest]>,
}

impl ZeroHashes {
    /// Compute the table for a tree of the given height.
    ///
    /// # Errors
    /// Returns `MerkleTreeError::HeightTooLarge` if `height` exceeds
    /// [`MAX_TREE_HEIGHT`](crate::MAX_TREE_HEIGHT).
    pub fn compute<H: MerkleHasher>(hasher: &H, height: u8) -> Result<Self, MerkleTreeError> {
        validate_height(usize::from(height))?;

        let mut hashes = Vec::with_capacity(usize::from(height).saturating_add(1));
        let mut current = Digest::EMPTY;
        hashes.push(current);
        for _ in 0..height {
            current = hasher.combine(&current, &current);
            hashes.push(current);
        }

        Ok(Self {
            height,
            hashes: hashes.into(),
        })
    }

    /// Height of the tree this table was computed for.
    #[must_use]
    pub const fn height(&self) -> u8 {
        self.height
    }

    /// Root of an empty subtree of height `i`, if `i <= height`.
    #[must_use]
    pub fn get(&self, i: u8) -> Option<Digest> {
        self.hashes.get(usize::from(i)).copied()
    }

    /// Root of the whole tree while nothing has been written.
    #[must_use]
    pub fn empty_root(&self) -> Digest {
        self.at(self.height)
    }

    /// The table, from the empty leaf (index 0) to the empty root.
    #[must_use]
    pub fn as_slice(&self) -> &[Digest] {
        &self.hashes
    }

    /// Entry `i`, clamped to the empty root for `i > height`.
    #[allow(
        clippy::indexing_slicing,
        reason = "The clamped index is at most `height` and the table has `height + 1` entries"
    )]
    pub(crate) fn at(&self, i: u8) -> Digest {
        self.hashes[usize::from(i.min(self.height))]
    }

    /// Whether this table was produced by `hasher`.
    ///
    /// Checks the empty leaf and the first combination, which is enough to
    /// catch a table shared between trees with different hash primitives.
    pub(crate) fn is_produced_by<H: MerkleHasher>(&self, hasher: &H) -> bool {
        let leaf = self.at(0);
        if leaf != Digest::EMPTY {
            return false;
        }
        self.get(1)
            .is_none_or(|first| first == hasher.combine(&leaf, &leaf))
    }
}
