//! The collision-resistant hash primitive used to combine two child nodes.

use blake2b_simd::Params;
use sha2::Digest as _;

use super::digest::{DIGEST_SIZE, Digest};
use crate::schema::config::HashAlgorithm;

/// Combines two child digests into their parent digest.
///
/// Implementations hash the raw 64-byte concatenation `left || right`.
/// There is no domain separation between leaves and internal nodes, nor
/// between levels: the same rule produces every node of the tree. Adding
/// separation would change every committed root.
pub trait MerkleHasher {
    /// Hash `left || right`.
    fn combine(&self, left: &Digest, right: &Digest) -> Digest;
}

/// SHA-256 over the concatenated children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sha256;

impl MerkleHasher for Sha256 {
    fn combine(&self, left: &Digest, right: &Digest) -> Digest {
        let out: [u8; DIGEST_SIZE] = sha2::Sha256::new()
            .chain_update(left.as_bytes())
            .chain_update(right.as_bytes())
            .finalize()
            .into();
        Digest::new(out)
    }
}

/// `BLAKE2b` with a 32-byte output over the concatenated children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blake2b256;

impl MerkleHasher for Blake2b256 {
    fn combine(&self, left: &Digest, right: &Digest) -> Digest {
        let mut state = Params::new().hash_length(DIGEST_SIZE).to_state();
        state.update(left.as_bytes());
        state.update(right.as_bytes());
        let hash = state.finalize();
        let mut out = [0_u8; DIGEST_SIZE];
        out.copy_from_slice(hash.as_bytes());
        Digest::new(out)
    }
}

impl MerkleHasher for HashAlgorithm {
    fn combine(&self, left: &Digest, right: &Digest) -> Digest {
        match self {
            Self::Sha256 => Sha256.combine(left, right),
            Self::Blake2b => Blake2b256.combine(left, right),
        }
    }
}
