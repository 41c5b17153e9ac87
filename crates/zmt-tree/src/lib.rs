//! Sparse, zero-aware Merkle trees and their membership and delta proofs.
//!
//! Never-written nodes take the value of an all-empty subtree of the same
//! height, so a tree only stores the nodes it has touched:
//! - [`ZeroMerkleTree`] supports random-access leaf updates over a sparse
//!   [`NodeStore`],
//! - [`AppendOnlyMerkleTree`] keeps only the proof of its last leaf,
//! - [`DenseMerkleTree`] materializes every node and is meant for small trees.
//!
//! Every mutation returns a [`DeltaMerkleProof`] that a remote party can check
//! with [`verify_delta_proof`] without holding the tree.

mod core;
mod dense;
mod proof;
mod sparse;
mod zero_hashes;

pub use core::{MAX_TREE_HEIGHT, MerkleTreeError, leaf_capacity};

pub use dense::{DENSE_MAX_HEIGHT, DenseMerkleTree};
pub use proof::{
    DeltaMerkleProof, MerkleProof, compute_merkle_path, compute_root, verify_delta_chain,
    verify_delta_proof, verify_proof,
};
pub use sparse::{AppendOnlyMerkleTree, Frontier, NodeAddress, NodeStore, ZeroMerkleTree};
pub use zero_hashes::ZeroHashes;
