//! Foundational primitive types and hashing helpers.

mod digest;
mod hasher;

pub use digest::{DIGEST_SIZE, Digest, DigestError};
pub use hasher::{Blake2b256, MerkleHasher, Sha256};
