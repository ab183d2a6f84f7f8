//! # Typed Rejections
//!
//! The closed set of rejection codes the verifier can emit, and the
//! [`Rejection`] value that pins one to a record index. Exceptions from the
//! construction and admissibility layers are caught exactly once, at the
//! verifier boundary, and mapped here — nothing is swallowed, retried, or
//! downgraded.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The rejection codes. The kernel emits exactly one of these per rejected
/// trajectory; the spellings below are the wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectKind {
    /// An IEEE-754 value reached the consensus path.
    FloatInConsensusPath,
    /// Fixed-point arithmetic left the signed 64-bit domain.
    Overflow,
    /// Division by zero in the numeric domain.
    DivByZero,
    /// A previous chain digest was not a well-formed 32-byte value.
    BadPrevDigest,
    /// `prev_state_hash` does not match the running state.
    StateDiscontinuity,
    /// `budget_before` does not match the running budget.
    BudgetDiscontinuity,
    /// The record's `kappa` differs from the trajectory's.
    KappaMismatch,
    /// A budget field is negative.
    NegativeBudget,
    /// The required debit exceeds the available budget.
    InsufficientBudget,
    /// A positive-risk step did not debit exactly.
    BudgetNotDebited,
    /// A non-positive-risk step changed the budget.
    BudgetNotConserved,
    /// A Merkle inclusion proof failed to verify.
    BadMerkleProof,
    /// A slab seal disagrees with the accumulated run.
    BadSlab,
    /// The record violates the wire schema.
    MalformedRecord,
}

impl fmt::Display for RejectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectKind::FloatInConsensusPath => "FloatInConsensusPath",
            RejectKind::Overflow => "Overflow",
            RejectKind::DivByZero => "DivByZero",
            RejectKind::BadPrevDigest => "BadPrevDigest",
            RejectKind::StateDiscontinuity => "StateDiscontinuity",
            RejectKind::BudgetDiscontinuity => "BudgetDiscontinuity",
            RejectKind::KappaMismatch => "KappaMismatch",
            RejectKind::NegativeBudget => "NegativeBudget",
            RejectKind::InsufficientBudget => "InsufficientBudget",
            RejectKind::BudgetNotDebited => "BudgetNotDebited",
            RejectKind::BudgetNotConserved => "BudgetNotConserved",
            RejectKind::BadMerkleProof => "BadMerkleProof",
            RejectKind::BadSlab => "BadSlab",
            RejectKind::MalformedRecord => "MalformedRecord",
        };
        f.write_str(s)
    }
}

/// A terminal rejection: the kind, the zero-based index of the failing
/// record, and a short machine-readable detail string.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("record {index} rejected: {kind}: {detail}")]
pub struct Rejection {
    /// The rejection code.
    pub kind: RejectKind,
    /// Zero-based position of the failing record.
    pub index: u64,
    /// Machine-readable detail.
    pub detail: String,
}

impl Rejection {
    pub fn new(kind: RejectKind, index: u64, detail: impl Into<String>) -> Self {
        Rejection {
            kind,
            index,
            detail: detail.into(),
        }
    }
}
