//! # Slab Sealing — Batched Merkle Commitments
//!
//! A slab is an ordered, contiguous run of records summarized under one
//! Merkle root. When the producer emits a `SLAB_SEAL` record, the verifier
//! folds the accumulated run into the seal and starts a new one.
//!
//! The seal's hashed core keeps the fixed eight-field shape; the slab
//! figures travel in a side table ([`SlabSummary`]) outside the core and are
//! bound to it through the core's `proposal_commitment`, which must equal
//! `H(DOMAIN_SLAB ∥ parent_root ∥ root ∥ first_cd ∥ last_cd ∥ length)`.
//!
//! ## Integrity Invariants
//!
//! - A seal covers at least one and at most [`SLAB_CAPACITY`] members.
//! - The declared length equals the accumulated member count.
//! - The declared root equals the Merkle root over member `receipt_id`s in
//!   record order.
//! - The declared first/last chain digests match the accumulated boundary.
//! - `parent_root` equals the previous seal's root, or the genesis chain
//!   digest for the first slab.
//! - The seal is an ordinary record for chain purposes and is NOT a member
//!   of its own tree.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use coh_core::Digest;
use coh_crypto::{merkle_root, slab_commitment, MerkleError};

use crate::record::RecordCore;

/// Maximum number of member records in one slab. Protocol constant.
pub const SLAB_CAPACITY: usize = 1024;

/// The identity pair the verifier accumulates per member record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlabMember {
    /// Content identity of the member record.
    pub receipt_id: Digest,
    /// Chain digest the member contributed.
    pub chain_digest: Digest,
}

/// The side table a `SLAB_SEAL` record carries, outside its hashed core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlabSummary {
    /// Merkle root over member `receipt_id`s in record order.
    pub root: Digest,
    /// Chain digest of the first member.
    pub first_chain_digest: Digest,
    /// Chain digest of the last member.
    pub last_chain_digest: Digest,
    /// The previous seal's root, or the genesis chain digest for slab zero.
    pub parent_root: Digest,
    /// Declared member count.
    pub length: u64,
}

impl SlabSummary {
    /// Build the summary over an accumulated member run.
    ///
    /// This is the producer-side constructor; the verifier recomputes the
    /// same figures independently in [`check_seal`].
    pub fn over(members: &[SlabMember], parent_root: Digest) -> Result<SlabSummary, SlabError> {
        if members.is_empty() {
            return Err(SlabError::Empty);
        }
        if members.len() > SLAB_CAPACITY {
            return Err(SlabError::CapacityExceeded {
                length: members.len(),
            });
        }
        let ids: Vec<Digest> = members.iter().map(|m| m.receipt_id).collect();
        let root = merkle_root(&ids)?;
        Ok(SlabSummary {
            root,
            first_chain_digest: members[0].chain_digest,
            last_chain_digest: members[members.len() - 1].chain_digest,
            parent_root,
            length: members.len() as u64,
        })
    }

    /// The binding commitment a seal core must carry in `proposal_commitment`.
    pub fn commitment(&self) -> Digest {
        slab_commitment(
            &self.parent_root,
            &self.root,
            &self.first_chain_digest,
            &self.last_chain_digest,
            self.length,
        )
    }
}

/// Why a seal fails verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlabError {
    /// A seal requires at least one member record.
    #[error("empty slab: a seal requires at least one member record")]
    Empty,

    /// The run exceeds the protocol capacity.
    #[error("slab length {length} exceeds capacity")]
    CapacityExceeded {
        /// Number of accumulated members.
        length: usize,
    },

    /// Declared length does not match the accumulated run.
    #[error("declared length {declared} does not match {actual} accumulated records")]
    LengthMismatch {
        /// Length the seal declares.
        declared: u64,
        /// Members the verifier accumulated.
        actual: u64,
    },

    /// Declared Merkle root does not match the recomputed root.
    #[error("merkle root mismatch: declared {declared}, computed {computed}")]
    RootMismatch {
        /// Root the seal declares.
        declared: Digest,
        /// Root recomputed over the accumulated members.
        computed: Digest,
    },

    /// Declared first/last chain digest does not match the run boundary.
    #[error("{field} mismatch: declared {declared}, accumulated {actual}")]
    BoundaryMismatch {
        /// Which boundary field disagrees.
        field: &'static str,
        /// Digest the seal declares.
        declared: Digest,
        /// Digest the verifier accumulated.
        actual: Digest,
    },

    /// Declared parent root does not match the previous seal.
    #[error("parent root mismatch: declared {declared}, expected {expected}")]
    ParentMismatch {
        /// Parent root the seal declares.
        declared: Digest,
        /// The previous seal's root (or genesis).
        expected: Digest,
    },

    /// The seal core's `proposal_commitment` does not bind the summary.
    #[error("seal commitment mismatch: core carries {declared}, summary binds {expected}")]
    CommitmentMismatch {
        /// Commitment the core carries.
        declared: Digest,
        /// Commitment the summary requires.
        expected: Digest,
    },

    /// A seal must not move the state: `next_state_hash` must equal
    /// `prev_state_hash`.
    #[error("seal moves state: prev {prev}, next {next}")]
    SealMovesState {
        /// Declared pre-state commitment.
        prev: Digest,
        /// Declared post-state commitment.
        next: Digest,
    },

    /// Merkle construction failed.
    #[error(transparent)]
    Merkle(#[from] MerkleError),
}

/// Verify a seal against the accumulated run.
///
/// `members` is the run since the previous seal (or genesis), in order;
/// `parent_root` is the previous seal's root or the genesis chain digest.
pub fn check_seal(
    core: &RecordCore,
    summary: &SlabSummary,
    members: &[SlabMember],
    parent_root: &Digest,
) -> Result<(), SlabError> {
    if core.next_state_hash != core.prev_state_hash {
        return Err(SlabError::SealMovesState {
            prev: core.prev_state_hash,
            next: core.next_state_hash,
        });
    }
    if members.is_empty() {
        return Err(SlabError::Empty);
    }
    if summary.length != members.len() as u64 {
        return Err(SlabError::LengthMismatch {
            declared: summary.length,
            actual: members.len() as u64,
        });
    }

    let ids: Vec<Digest> = members.iter().map(|m| m.receipt_id).collect();
    let computed = merkle_root(&ids)?;
    if summary.root != computed {
        return Err(SlabError::RootMismatch {
            declared: summary.root,
            computed,
        });
    }

    if summary.first_chain_digest != members[0].chain_digest {
        return Err(SlabError::BoundaryMismatch {
            field: "first_chain_digest",
            declared: summary.first_chain_digest,
            actual: members[0].chain_digest,
        });
    }
    let last = members[members.len() - 1].chain_digest;
    if summary.last_chain_digest != last {
        return Err(SlabError::BoundaryMismatch {
            field: "last_chain_digest",
            declared: summary.last_chain_digest,
            actual: last,
        });
    }

    if summary.parent_root != *parent_root {
        return Err(SlabError::ParentMismatch {
            declared: summary.parent_root,
            expected: *parent_root,
        });
    }

    let expected = summary.commitment();
    if core.proposal_commitment != expected {
        return Err(SlabError::CommitmentMismatch {
            declared: core.proposal_commitment,
            expected,
        });
    }

    Ok(())
}

// ===========================================================================
// Tests
// ===========================================================================
