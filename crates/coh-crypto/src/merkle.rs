//! # Merkle Commitment — Ordered Batches with Inclusion Proofs
//!
//! Builds the deterministic binary Merkle tree over an ordered, non-empty
//! sequence of 32-byte leaf pre-images (in the kernel, `receipt_id`s in
//! record order), and produces and verifies inclusion proofs against the
//! root.
//!
//! ## Construction
//!
//! - Leaf: `SHA256(0x00 ∥ preimage)`; internal: `SHA256(0x01 ∥ left ∥ right)`.
//!   The one-byte prefixes separate the two roles, so an internal node can
//!   never be replayed as a leaf.
//! - Levels are built bottom-up; a level with an odd number of nodes
//!   duplicates its last node (hashing it against itself) — the classic
//!   odd-level rule.
//!
//! ## Proof Encoding
//!
//! A proof is an ordered list of `(sibling, dir)` steps from leaf toward
//! root. The direction spellings are exactly `"L"` and `"R"`: `L` means the
//! sibling is the LEFT child, so the parent is `internal(sibling, me)`; `R`
//! is the mirror. Any other spelling fails deserialization — `"left"`,
//! `"right"`, `"0"`, `"1"` are non-conformant.

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use thiserror::Error;

use coh_core::Digest;

/// One-byte domain prefix for leaf hashing.
pub const MERKLE_LEAF_PREFIX: u8 = 0x00;

/// One-byte domain prefix for internal-node hashing.
pub const MERKLE_INTERNAL_PREFIX: u8 = 0x01;

/// Errors in Merkle tree construction and proof generation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MerkleError {
    /// A tree needs at least one leaf; there is no root of nothing.
    #[error("merkle tree requires at least one leaf")]
    EmptyLeafSet,

    /// The requested leaf index does not exist.
    #[error("leaf index {index} out of range for {leaf_count} leaves")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of leaves in the tree.
        leaf_count: usize,
    },
}

/// Hash a 32-byte leaf pre-image: `SHA256(0x00 ∥ preimage)`.
pub fn merkle_leaf(preimage: &Digest) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update([MERKLE_LEAF_PREFIX]);
    hasher.update(preimage.as_bytes());
    Digest::from_bytes(hasher.finalize().into())
}

/// Hash an internal node: `SHA256(0x01 ∥ left ∥ right)`.
pub fn merkle_internal(left: &Digest, right: &Digest) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update([MERKLE_INTERNAL_PREFIX]);
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    Digest::from_bytes(hasher.finalize().into())
}

/// Which side of the parent the sibling occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Sibling is the left child: parent = `internal(sibling, me)`.
    L,
    /// Sibling is the right child: parent = `internal(me, sibling)`.
    R,
}

/// One step of an inclusion proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    /// The sibling hash at this level.
    pub sibling: Digest,
    /// Which side the sibling sits on.
    pub dir: Direction,
}

/// An inclusion proof: steps in order from leaf toward root.
///
/// Serializes as a bare JSON array of `{"sibling": <64 hex>, "dir": "L"|"R"}`
/// objects, the wire schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InclusionProof {
    /// The ordered proof steps.
    pub steps: Vec<ProofStep>,
}

/// Compute the Merkle root over ordered leaf pre-images.
pub fn merkle_root(preimages: &[Digest]) -> Result<Digest, MerkleError> {
    if preimages.is_empty() {
        return Err(MerkleError::EmptyLeafSet);
    }
    let mut level: Vec<Digest> = preimages.iter().map(merkle_leaf).collect();
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            // Odd-level rule: duplicate the last node.
            level.push(level[level.len() - 1]);
        }
        level = level
            .chunks_exact(2)
            .map(|pair| merkle_internal(&pair[0], &pair[1]))
            .collect();
    }
    Ok(level[0])
}

/// Build the inclusion proof for the leaf at `index`.
///
/// The proof pairs with [`merkle_root`]: folding it from
/// `merkle_leaf(preimages[index])` reproduces the root.
pub fn prove(preimages: &[Digest], index: usize) -> Result<InclusionProof, MerkleError> {
    if preimages.is_empty() {
        return Err(MerkleError::EmptyLeafSet);
    }
    if index >= preimages.len() {
        return Err(MerkleError::IndexOutOfRange {
            index,
            leaf_count: preimages.len(),
        });
    }

    let mut level: Vec<Digest> = preimages.iter().map(merkle_leaf).collect();
    let mut pos = index;
    let mut steps = Vec::new();

    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(level[level.len() - 1]);
        }
        let sibling_pos = pos ^ 1;
        let dir = if sibling_pos < pos {
            Direction::L
        } else {
            Direction::R
        };
        steps.push(ProofStep {
            sibling: level[sibling_pos],
            dir,
        });
        level = level
            .chunks_exact(2)
            .map(|pair| merkle_internal(&pair[0], &pair[1]))
            .collect();
        pos /= 2;
    }

    Ok(InclusionProof { steps })
}

/// Verify an inclusion proof against a claimed root.
///
/// Starts from `merkle_leaf(preimage)`, folds the steps, and compares to
/// `root`. Returns `false` on any mismatch; malformed direction tokens never
/// reach this function because [`Direction`] cannot deserialize them.
pub fn verify_inclusion(preimage: &Digest, proof: &InclusionProof, root: &Digest) -> bool {
    let mut cur = merkle_leaf(preimage);
    for step in &proof.steps {
        cur = match step.dir {
            Direction::L => merkle_internal(&step.sibling, &cur),
            Direction::R => merkle_internal(&cur, &step.sibling),
        };
    }
    cur == *root
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn preimages(n: u8) -> Vec<Digest> {
        (1..=n).map(|i| Digest::from_bytes([i; 32])).collect()
    }

    #[test]
    fn empty_leaf_set_rejected() {
        assert_eq!(merkle_root(&[]), Err(MerkleError::EmptyLeafSet));
        assert_eq!(prove(&[], 0), Err(MerkleError::EmptyLeafSet));
    }

    #[test]
    fn index_out_of_range_rejected() {
        let pres = preimages(3);
        assert_eq!(
            prove(&pres, 3),
            Err(MerkleError::IndexOutOfRange {
                index: 3,
                leaf_count: 3
            })
        );
    }

    #[test]
    fn single_leaf_root_is_leaf_hash() {
        let pres = preimages(1);
        assert_eq!(merkle_root(&pres).unwrap(), merkle_leaf(&pres[0]));
        let proof = prove(&pres, 0).unwrap();
        assert!(proof.steps.is_empty());
    }

    #[test]
    fn roundtrip_all_indices_various_sizes() {
        for n in [1u8, 2, 3, 4, 5, 7, 8, 9, 15, 16, 17, 31, 32, 33] {
            let pres = preimages(n);
            let root = merkle_root(&pres).unwrap();
            for i in 0..n as usize {
                let proof = prove(&pres, i).unwrap();
                assert!(
                    verify_inclusion(&pres[i], &proof, &root),
                    "proof failed at n={n}, i={i}"
                );
            }
        }
    }

    #[test]
    fn tampered_leaf_fails() {
        let pres = preimages(5);
        let root = merkle_root(&pres).unwrap();
        let proof = prove(&pres, 2).unwrap();

        let mut bytes = *pres[2].as_bytes();
        bytes[0] ^= 0x01;
        let flipped = Digest::from_bytes(bytes);
        assert!(!verify_inclusion(&flipped, &proof, &root));
    }

    #[test]
    fn tampered_sibling_fails() {
        let pres = preimages(9);
        let root = merkle_root(&pres).unwrap();
        let mut proof = prove(&pres, 4).unwrap();
        proof.steps[0].sibling = Digest::zero();
        assert!(!verify_inclusion(&pres[4], &proof, &root));
    }

    #[test]
    fn swapped_direction_fails() {
        let pres = preimages(8);
        let root = merkle_root(&pres).unwrap();
        for i in 0..8 {
            let proof = prove(&pres, i).unwrap();
            for k in 0..proof.steps.len() {
                let mut mutated = proof.clone();
                mutated.steps[k].dir = match mutated.steps[k].dir {
                    Direction::L => Direction::R,
                    Direction::R => Direction::L,
                };
                assert!(
                    !verify_inclusion(&pres[i], &mutated, &root),
                    "direction swap not detected at i={i}, step={k}"
                );
            }
        }
    }

    #[test]
    fn truncated_proof_fails() {
        let pres = preimages(8);
        let root = merkle_root(&pres).unwrap();
        let mut proof = prove(&pres, 3).unwrap();
        proof.steps.pop();
        assert!(!verify_inclusion(&pres[3], &proof, &root));
    }

    #[test]
    fn duplicate_last_rule_matches_explicit_duplication() {
        // A 3-leaf tree duplicates leaf 2 internally, so it equals the
        // 4-leaf tree that carries leaf 2 twice. Inherent to the rule.
        let three = preimages(3);
        let mut four = preimages(3);
        four.push(four[2]);
        assert_eq!(merkle_root(&three), merkle_root(&four));
        let root = merkle_root(&three).unwrap();
        let proof = prove(&three, 2).unwrap();
        assert!(verify_inclusion(&three[2], &proof, &root));
    }

    // -----------------------------------------------------------------------
    // Wire encoding
    // -----------------------------------------------------------------------

    #[test]
    fn proof_serializes_as_array_of_sibling_dir() {
        let pres = preimages(4);
        let proof = prove(&pres, 1).unwrap();
        let json = serde_json::to_value(&proof).unwrap();
        let arr = json.as_array().expect("proof is a bare array");
        assert_eq!(arr.len(), 2);
        for step in arr {
            let dir = step.get("dir").and_then(|d| d.as_str()).unwrap();
            assert!(dir == "L" || dir == "R");
            let sib = step.get("sibling").and_then(|s| s.as_str()).unwrap();
            assert_eq!(sib.len(), 64);
        }
    }

    #[test]
    fn other_direction_spellings_rejected() {
        for bad in ["left", "right", "l", "r", "0", "1"] {
            let json = format!(
                r#"[{{"sibling":"{}","dir":"{bad}"}}]"#,
                "ab".repeat(32)
            );
            assert!(
                serde_json::from_str::<InclusionProof>(&json).is_err(),
                "spelling {bad:?} must be rejected"
            );
        }
    }

    #[test]
    fn proof_json_roundtrip() {
        let pres = preimages(7);
        let proof = prove(&pres, 5).unwrap();
        let json = serde_json::to_string(&proof).unwrap();
        let back: InclusionProof = serde_json::from_str(&json).unwrap();
        assert_eq!(back, proof);
    }

    // -----------------------------------------------------------------------
    // Golden vectors — verified against an independent implementation.
    // -----------------------------------------------------------------------

    #[test]
    fn golden_leaf_hash_of_zero_preimage() {
        assert_eq!(
            merkle_leaf(&Digest::zero()).to_hex(),
            "7f9c9e31ac8256ca2f258583df262dbc7d6f68f2a03043d5c99a4ae5a7396ce9"
        );
    }

    #[test]
    fn golden_five_leaf_root() {
        let pres = preimages(5);
        assert_eq!(
            merkle_root(&pres).unwrap().to_hex(),
            "f6ab5bbc08c6028b7dd999a9fe1d057cce4d7d5fc7a47b18a17118eeda7fb8dc"
        );
    }
}
