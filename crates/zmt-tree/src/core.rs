//! Shared error type and bounds checks.

use thiserror::Error;

/// The tallest supported tree.
///
/// With 63 levels every leaf index in `[0, 2^height)` fits in a `u64`.
pub const MAX_TREE_HEIGHT: u8 = 63;

/// Errors that can occur when working with a Merkle tree or a proof.
///
/// A proof that fails to verify is not an error: verification functions
/// return `false` instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MerkleTreeError {
    /// The leaf index is not in `[0, 2^height)`.
    #[error("Leaf index {index} is out of range for a tree of height {height}")]
    IndexOutOfRange {
        /// The rejected leaf index.
        index: u64,
        /// Height of the tree or proof.
        height: u8,
    },

    /// The node level is deeper than the leaves.
    #[error("Level {level} is out of range for a tree of height {height}")]
    LevelOutOfRange {
        /// The rejected level (0 is the root).
        level: u8,
        /// Height of the tree.
        height: u8,
    },

    /// The node index is not in `[0, 2^level)`.
    #[error("Node index {index} is out of range at level {level}")]
    NodeIndexOutOfRange {
        /// Level of the node (0 is the root).
        level: u8,
        /// The rejected node index.
        index: u64,
    },

    /// The tree or proof is taller than supported.
    #[error("Height {height} exceeds maximum supported height {max}")]
    HeightTooLarge {
        /// Requested height (or sibling count of a proof).
        height: usize,
        /// Maximum supported height.
        max: u8,
    },

    /// A shared zero-hash table was not computed with the tree's hasher.
    #[error("Zero-hash table does not match the tree hasher")]
    ZeroHashMismatch,

    /// Unexpected error.
    #[error("Unexpected error: {0}")]
    Unexpected(&'static str),
}

/// Number of leaf slots in a tree of the given height.
///
/// Heights above [`MAX_TREE_HEIGHT`] saturate to `u64::MAX`.
#[must_use]
#[allow(clippy::as_conversions, reason = "Lossless u8 to u32 widening in a const fn")]
pub const fn leaf_capacity(height: u8) -> u64 {
    match 1_u64.checked_shl(height as u32) {
        Some(capacity) => capacity,
        None => u64::MAX,
    }
}

/// Validate a tree height (or the sibling count of a proof).
///
/// # Errors
/// Returns `MerkleTreeError::HeightTooLarge` above [`MAX_TREE_HEIGHT`].
pub fn validate_height(height: usize) -> Result<u8, MerkleTreeError> {
    u8::try_from(height)
        .ok()
        .filter(|h| *h <= MAX_TREE_HEIGHT)
        .ok_or(MerkleTreeError::HeightTooLarge {
            height,
            max: MAX_TREE_HEIGHT,
        })
}

/// Validate that `index` addresses a leaf of a tree of the given height.
///
/// # Errors
/// Returns `MerkleTreeError::IndexOutOfRange` if `index >= 2^height`.
pub fn validate_leaf_index(index: u64, height: u8) -> Result<(), MerkleTreeError> {
    if fits_below(index, height) {
        Ok(())
    } else {
        Err(MerkleTreeError::IndexOutOfRange { index, height })
    }
}

/// Validate a `(level, index)` node address of a tree of the given height.
///
/// # Errors
/// Returns `MerkleTreeError::LevelOutOfRange` if `level > height`, and
/// `MerkleTreeError::NodeIndexOutOfRange` if `index >= 2^level`.
pub fn validate_node_address(level: u8, index: u64, height: u8) -> Result<(), MerkleTreeError> {
    if level > height {
        return Err(MerkleTreeError::LevelOutOfRange { level, height });
    }
    if !fits_below(index, level) {
        return Err(MerkleTreeError::NodeIndexOutOfRange { level, index });
    }
    Ok(())
}

#[allow(clippy::as_conversions, reason = "Lossless u8 to u32 widening in a const fn")]
const fn fits_below(index: u64, bits: u8) -> bool {
    match index.checked_shr(bits as u32) {
        Some(high) => high == 0,
        None => true,
    }
}
