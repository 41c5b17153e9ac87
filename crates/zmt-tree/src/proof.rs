//! Single-leaf membership proofs, delta proofs, and their verification.
//!
//! Sibling lists are ordered leaf-to-root: `siblings[l]` is the sibling of the
//! path node at distance `l` from the leaf. The proof height is the number of
//! siblings.

#![allow(
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    reason = "Path arithmetic is bounded by validated proof heights"
)]

use serde::{Deserialize, Serialize};
use zmt_core::base::{Digest, MerkleHasher};

use crate::core::{MerkleTreeError, validate_height, validate_leaf_index};

/// Proof that `value` sits at leaf `index` of a tree with root `root`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedMerkleProof")]
pub struct MerkleProof {
    /// Leaf index.
    pub index: u64,
    /// Leaf value.
    pub value: Digest,
    /// Sibling digests, leaf-to-root.
    pub siblings: Vec<Digest>,
    /// Claimed root.
    pub root: Digest,
}

impl MerkleProof {
    /// Create a proof, checking that `index` fits the proof height.
    ///
    /// # Errors
    /// Returns `MerkleTreeError::HeightTooLarge` if there are more siblings than
    /// [`MAX_TREE_HEIGHT`](crate::MAX_TREE_HEIGHT), and
    /// `MerkleTreeError::IndexOutOfRange` if `index >= 2^siblings.len()`.
    pub fn new(
        index: u64,
        value: Digest,
        siblings: Vec<Digest>,
        root: Digest,
    ) -> Result<Self, MerkleTreeError> {
        validate_path(&siblings, index)?;
        Ok(Self {
            index,
            value,
            siblings,
            root,
        })
    }

    /// Height of the tree this proof was taken from.
    #[must_use]
    pub fn height(&self) -> usize {
        self.siblings.len()
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct UncheckedMerkleProof {
    index: u64,
    value: Digest,
    siblings: Vec<Digest>,
    root: Digest,
}

impl TryFrom<UncheckedMerkleProof> for MerkleProof {
    type Error = MerkleTreeError;

    fn try_from(proof: UncheckedMerkleProof) -> Result<Self, Self::Error> {
        Self::new(proof.index, proof.value, proof.siblings, proof.root)
    }
}

/// Before/after proof of a single leaf mutation.
///
/// Changing one leaf never changes a sibling on its own path, so one sibling
/// list serves both the `old_*` and the `new_*` proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedDeltaMerkleProof")]
pub struct DeltaMerkleProof {
    /// Leaf index.
    pub index: u64,
    /// Leaf value before the mutation.
    pub old_value: Digest,
    /// Root before the mutation.
    pub old_root: Digest,
    /// Sibling digests, leaf-to-root.
    pub siblings: Vec<Digest>,
    /// Leaf value after the mutation.
    pub new_value: Digest,
    /// Root after the mutation.
    pub new_root: Digest,
}

impl DeltaMerkleProof {
    /// Create a delta proof, checking that `index` fits the proof height.
    ///
    /// # Errors
    /// Same conditions as [`MerkleProof::new`].
    pub fn new(
        index: u64,
        old_value: Digest,
        old_root: Digest,
        siblings: Vec<Digest>,
        new_value: Digest,
        new_root: Digest,
    ) -> Result<Self, MerkleTreeError> {
        validate_path(&siblings, index)?;
        Ok(Self {
            index,
            old_value,
            old_root,
            siblings,
            new_value,
            new_root,
        })
    }

    /// Height of the tree this proof was taken from.
    #[must_use]
    pub fn height(&self) -> usize {
        self.siblings.len()
    }

    /// The proof of the leaf before the mutation.
    #[must_use]
    pub fn old_proof(&self) -> MerkleProof {
        MerkleProof {
            index: self.index,
            value: self.old_value,
            siblings: self.siblings.clone(),
            root: self.old_root,
        }
    }

    /// The proof of the leaf after the mutation.
    #[must_use]
    pub fn new_proof(&self) -> MerkleProof {
        MerkleProof {
            index: self.index,
            value: self.new_value,
            siblings: self.siblings.clone(),
            root: self.new_root,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct UncheckedDeltaMerkleProof {
    index: u64,
    old_value: Digest,
    old_root: Digest,
    siblings: Vec<Digest>,
    new_value: Digest,
    new_root: Digest,
}

impl TryFrom<UncheckedDeltaMerkleProof> for DeltaMerkleProof {
    type Error = MerkleTreeError;

    fn try_from(proof: UncheckedDeltaMerkleProof) -> Result<Self, Self::Error> {
        Self::new(
            proof.index,
            proof.old_value,
            proof.old_root,
            proof.siblings,
            proof.new_value,
            proof.new_root,
        )
    }
}

fn validate_path(siblings: &[Digest], index: u64) -> Result<(), MerkleTreeError> {
    let height = validate_height(siblings.len())?;
    validate_leaf_index(index, height)
}

/// Combine a path node with its sibling.
///
/// An even `index` puts `node` on the left, an odd one on the right. Every
/// tree variant goes through this function.
pub(crate) fn combine_at<H: MerkleHasher>(
    hasher: &H,
    index: u64,
    node: &Digest,
    sibling: &Digest,
) -> Digest {
    if index.is_multiple_of(2) {
        hasher.combine(node, sibling)
    } else {
        hasher.combine(sibling, node)
    }
}

/// Node values along the path from leaf `index` to the root.
///
/// The result has `siblings.len() + 1` entries: the leaf value first and the
/// root last.
///
/// # Errors
/// Returns an error if the path is taller than
/// [`MAX_TREE_HEIGHT`](crate::MAX_TREE_HEIGHT) or `index` does not fit it.
pub fn compute_merkle_path<H: MerkleHasher>(
    hasher: &H,
    siblings: &[Digest],
    value: Digest,
    index: u64,
) -> Result<Vec<Digest>, MerkleTreeError> {
    validate_path(siblings, index)?;

    let mut path = Vec::with_capacity(siblings.len() + 1);
    let mut current = value;
    let mut index = index;
    path.push(current);
    for sibling in siblings {
        current = combine_at(hasher, index, &current, sibling);
        path.push(current);
        index >>= 1;
    }
    Ok(path)
}

/// Root implied by `value` at leaf `index` and its sibling path.
///
/// # Errors
/// Same conditions as [`compute_merkle_path`].
pub fn compute_root<H: MerkleHasher>(
    hasher: &H,
    siblings: &[Digest],
    value: Digest,
    index: u64,
) -> Result<Digest, MerkleTreeError> {
    validate_path(siblings, index)?;

    let mut index = index;
    Ok(siblings.iter().fold(value, |current, sibling| {
        let parent = combine_at(hasher, index, &current, sibling);
        index >>= 1;
        parent
    }))
}

/// Check a membership proof.
///
/// A proof whose index does not fit its height never verifies.
#[must_use]
pub fn verify_proof<H: MerkleHasher>(hasher: &H, proof: &MerkleProof) -> bool {
    compute_root(hasher, &proof.siblings, proof.value, proof.index)
        .is_ok_and(|root| root == proof.root)
}

/// Check both halves of a delta proof against the shared sibling list.
#[must_use]
pub fn verify_delta_proof<H: MerkleHasher>(hasher: &H, delta: &DeltaMerkleProof) -> bool {
    let old_ok = compute_root(hasher, &delta.siblings, delta.old_value, delta.index)
        .is_ok_and(|root| root == delta.old_root);
    let new_ok = compute_root(hasher, &delta.siblings, delta.new_value, delta.index)
        .is_ok_and(|root| root == delta.new_root);
    old_ok && new_ok
}

/// Check a sequence of delta proofs produced by successive mutations.
///
/// Every delta must verify, and each delta must start from the root the
/// previous one ended at. An empty sequence is trivially valid.
#[must_use]
pub fn verify_delta_chain<H: MerkleHasher>(hasher: &H, deltas: &[DeltaMerkleProof]) -> bool {
    deltas.iter().all(|delta| verify_delta_proof(hasher, delta))
        && deltas
            .windows(2)
            .all(|pair| matches!(pair, [prev, next] if prev.new_root == next.old_root))
}

#[cfg(test)]
mod tests {
    use zmt_core::base::{Blake2b256, Sha256};

    use super::*;
    use crate::zero_hashes::ZeroHashes;

    fn leaf(byte: u8) -> Digest {
        Digest::new([byte; 32])
    }

    /// Height-2 tree over leaves 1, 2, 3, 4 with a proof for leaf 2.
    fn small_tree() -> (Digest, MerkleProof) {
        let hasher = Sha256;
        let left = hasher.combine(&leaf(1), &leaf(2));
        let right = hasher.combine(&leaf(3), &leaf(4));
        let root = hasher.combine(&left, &right);
        let proof = MerkleProof::new(2, leaf(3), vec![leaf(4), left], root)
            .expect("index 2 fits height 2");
        (root, proof)
    }

    mod compute {
        use super::*;

        #[test]
        fn root_follows_index_parity() {
            let (root, proof) = small_tree();
            assert_eq!(
                compute_root(&Sha256, &proof.siblings, proof.value, proof.index),
                Ok(root)
            );

            // Index 3 swaps the leaf-level operand order.
            let swapped = compute_root(&Sha256, &proof.siblings, proof.value, 3)
                .expect("index 3 fits height 2");
            assert_ne!(swapped, root);
        }

        #[test]
        fn path_starts_at_leaf_and_ends_at_root() {
            let (root, proof) = small_tree();
            let path = compute_merkle_path(&Sha256, &proof.siblings, proof.value, proof.index)
                .expect("valid path");

            assert_eq!(path.len(), 3);
            assert_eq!(path.first(), Some(&leaf(3)));
            assert_eq!(path[1], Sha256.combine(&leaf(3), &leaf(4)));
            assert_eq!(path.last(), Some(&root));
        }

        #[test]
        fn empty_path_is_the_value() {
            assert_eq!(compute_root(&Sha256, &[], leaf(9), 0), Ok(leaf(9)));
            assert_eq!(
                compute_root(&Sha256, &[], leaf(9), 1),
                Err(MerkleTreeError::IndexOutOfRange {
                    index: 1,
                    height: 0
                })
            );
        }

        #[test]
        fn empty_tree_matches_zero_hashes() {
            let zero = ZeroHashes::compute(&Blake2b256, 6).expect("height 6 is valid");
            let siblings = &zero.as_slice()[..6];
            for index in [0, 1, 17, 63] {
                assert_eq!(
                    compute_root(&Blake2b256, siblings, Digest::EMPTY, index),
                    Ok(zero.empty_root())
                );
            }
        }

        #[test]
        fn rejects_index_beyond_height() {
            let siblings = vec![Digest::EMPTY; 3];
            assert_eq!(
                compute_merkle_path(&Sha256, &siblings, leaf(1), 8),
                Err(MerkleTreeError::IndexOutOfRange {
                    index: 8,
                    height: 3
                })
            );
        }

        #[test]
        fn rejects_excessive_height() {
            let siblings = vec![Digest::EMPTY; 64];
            assert!(matches!(
                compute_root(&Sha256, &siblings, leaf(1), 0),
                Err(MerkleTreeError::HeightTooLarge { height: 64, .. })
            ));
        }
    }

    mod verify {
        use super::*;

        #[test]
        fn accepts_valid_proof() {
            let (_, proof) = small_tree();
            assert!(verify_proof(&Sha256, &proof));
        }

        #[test]
        fn rejects_wrong_hasher() {
            let (_, proof) = small_tree();
            assert!(!verify_proof(&Blake2b256, &proof));
        }

        #[test]
        fn rejects_any_flipped_byte() {
            let (_, proof) = small_tree();

            for byte in 0..32 {
                let mut tampered = proof.clone();
                let mut bytes = tampered.value.to_bytes();
                bytes[byte] ^= 1;
                tampered.value = Digest::new(bytes);
                assert!(!verify_proof(&Sha256, &tampered));
            }

            for level in 0..proof.siblings.len() {
                let mut tampered = proof.clone();
                let mut bytes = tampered.siblings[level].to_bytes();
                bytes[7] ^= 0x80;
                tampered.siblings[level] = Digest::new(bytes);
                assert!(!verify_proof(&Sha256, &tampered));
            }

            let mut tampered = proof;
            tampered.index = 3;
            assert!(!verify_proof(&Sha256, &tampered));
        }

        #[test]
        fn out_of_range_proof_never_verifies() {
            let (_, mut proof) = small_tree();
            proof.index = 6;
            assert!(!verify_proof(&Sha256, &proof));
        }
    }

    mod delta {
        use super::*;

        fn sample_delta() -> DeltaMerkleProof {
            let (old_root, proof) = small_tree();
            let new_value = leaf(7);
            let new_root = compute_root(&Sha256, &proof.siblings, new_value, proof.index)
                .expect("valid path");
            DeltaMerkleProof::new(
                proof.index,
                proof.value,
                old_root,
                proof.siblings,
                new_value,
                new_root,
            )
            .expect("index 2 fits height 2")
        }

        #[test]
        fn splits_into_two_proofs() {
            let delta = sample_delta();
            assert!(verify_delta_proof(&Sha256, &delta));

            let old = delta.old_proof();
            let new = delta.new_proof();
            assert!(verify_proof(&Sha256, &old));
            assert!(verify_proof(&Sha256, &new));
            assert_eq!(old.siblings, new.siblings);
            assert_eq!(old.value, leaf(3));
            assert_eq!(new.value, leaf(7));
            assert_eq!(delta.height(), 2);
        }

        #[test]
        fn tampering_breaks_the_delta() {
            let delta = sample_delta();

            let mut tampered = delta.clone();
            tampered.old_value = leaf(8);
            assert!(!verify_delta_proof(&Sha256, &tampered));

            let mut tampered = delta.clone();
            tampered.new_value = leaf(8);
            assert!(!verify_delta_proof(&Sha256, &tampered));

            let mut tampered = delta.clone();
            tampered.new_root = tampered.old_root;
            assert!(!verify_delta_proof(&Sha256, &tampered));

            let mut tampered = delta;
            tampered.siblings[0] = leaf(8);
            assert!(!verify_proof(&Sha256, &tampered.old_proof()));
            assert!(!verify_proof(&Sha256, &tampered.new_proof()));
        }

        #[test]
        fn chain_requires_linked_roots() {
            let first = sample_delta();
            let siblings = first.siblings.clone();
            let third_value = leaf(9);
            let second = DeltaMerkleProof::new(
                first.index,
                first.new_value,
                first.new_root,
                siblings.clone(),
                third_value,
                compute_root(&Sha256, &siblings, third_value, first.index).expect("valid path"),
            )
            .expect("index 2 fits height 2");

            assert!(verify_delta_chain(&Sha256, &[]));
            assert!(verify_delta_chain(&Sha256, &[first.clone()]));
            assert!(verify_delta_chain(
                &Sha256,
                &[first.clone(), second.clone()]
            ));
            assert!(!verify_delta_chain(&Sha256, &[second, first]));
        }
    }

    mod wire {
        use super::*;

        #[test]
        fn proof_uses_snake_case_hex_fields() {
            let (_, proof) = small_tree();
            let json = serde_json::to_value(&proof).expect("serialize");

            assert_eq!(json["index"], 2);
            assert_eq!(json["value"], leaf(3).to_hex());
            assert_eq!(json["siblings"][0], leaf(4).to_hex());

            let back: MerkleProof = serde_json::from_value(json).expect("deserialize");
            assert_eq!(back, proof);
        }

        #[test]
        fn delta_roundtrips() {
            let (old_root, proof) = small_tree();
            let delta = DeltaMerkleProof::new(
                proof.index,
                proof.value,
                old_root,
                proof.siblings,
                proof.value,
                old_root,
            )
            .expect("index 2 fits height 2");

            let json = serde_json::to_string(&delta).expect("serialize");
            assert!(json.contains("\"old_root\""));
            assert!(json.contains("\"new_value\""));
            let back: DeltaMerkleProof = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(back, delta);
        }

        #[test]
        fn rejects_out_of_range_index() {
            let (_, proof) = small_tree();
            let mut json = serde_json::to_value(&proof).expect("serialize");
            json["index"] = 4.into();
            assert!(serde_json::from_value::<MerkleProof>(json).is_err());
        }

        #[test]
        fn rejects_malformed_digest() {
            let (_, proof) = small_tree();
            let mut json = serde_json::to_value(&proof).expect("serialize");
            json["root"] = "00ff".into();
            assert!(serde_json::from_value::<MerkleProof>(json).is_err());
        }
    }
}
