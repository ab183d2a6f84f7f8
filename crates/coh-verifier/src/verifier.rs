//! # The Trajectory Verifier
//!
//! Consumes a sequence of transition records in producer-asserted order and
//! either accepts the trajectory or emits a typed, index-pinned rejection.
//!
//! ## Per-Record Procedure (fixed order)
//!
//! 1. Canonicalize the core; compute `receipt_id`.
//! 2. Compute `chain_digest(prev, receipt_id)`.
//! 3. Check state continuity (`prev_state_hash` vs running state).
//! 4. Check budget continuity (`budget_before` vs running budget).
//! 5. Check `kappa` against the trajectory coefficient.
//! 6. Apply the admissibility law.
//! 7. For `SLAB_SEAL`: verify the seal against the accumulated run.
//!    Otherwise: advance state, budget, and chain head.
//!
//! Rejection is terminal; record `k+1` is never inspected before record
//! `k`'s decision is final.
//!
//! ## Determinism
//!
//! The verifier is a pure function of its inputs. It reads no clock, no
//! RNG, no environment, no filesystem, no locale, and holds no shared
//! state — callers may run many verifiers in parallel across independent
//! trajectories without locks. Working memory is O(slab capacity): only the
//! open batch's identity pairs are buffered, never the whole trajectory.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use coh_core::{CanonicalizationError, Digest, NumericError, Q18};
use coh_crypto::{chain_digest, genesis_chain_digest, receipt_id};
use coh_ledger::budget::AdmissibilityError;
use coh_ledger::slab::{check_seal, SlabMember, SLAB_CAPACITY};
use coh_ledger::wire::{record_from_value, WireError};
use coh_ledger::{check_admissible, ActionTag, Record};

use crate::reject::{RejectKind, Rejection};

/// Trajectory-initial parameters. Immutable for the life of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrajectoryParams {
    /// Commitment to the state before the first record.
    pub initial_state_hash: Digest,
    /// The initial budget `B₀`. Non-negative.
    pub initial_budget: Q18,
    /// The fixed risk coefficient. Positive, constant across the trajectory.
    pub kappa: Q18,
    /// The chain seed. Defaults to the protocol genesis constant.
    pub genesis_chain_digest: Digest,
    /// Slab capacity. Defaults to the protocol constant.
    pub slab_capacity: usize,
}

impl TrajectoryParams {
    /// Parameters with the protocol genesis seed and slab capacity.
    pub fn new(initial_state_hash: Digest, initial_budget: Q18, kappa: Q18) -> Self {
        TrajectoryParams {
            initial_state_hash,
            initial_budget,
            kappa,
            genesis_chain_digest: genesis_chain_digest(),
            slab_capacity: SLAB_CAPACITY,
        }
    }
}

/// The verifier's accepting output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acceptance {
    /// Commitment to the state after the last record.
    pub final_state_hash: Digest,
    /// Budget after the last record.
    pub final_budget: Q18,
    /// Chain digest after the last record (the genesis seed for an empty
    /// trajectory).
    pub final_chain_digest: Digest,
    /// Number of records processed.
    pub records: u64,
}

/// The verifier's decision over a whole trajectory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Every record passed; the trajectory replays to these finals.
    Accept(Acceptance),
    /// A record failed; nothing after it was inspected.
    Reject(Rejection),
}

/// Streaming trajectory verifier. See the module docs for the procedure.
#[derive(Debug, Clone)]
pub struct Verifier {
    params: TrajectoryParams,
    state_hash: Digest,
    budget: Q18,
    prev_chain_digest: Digest,
    parent_slab_root: Digest,
    open_batch: Vec<SlabMember>,
    index: u64,
}

impl Verifier {
    /// A verifier positioned before the first record.
    pub fn new(params: TrajectoryParams) -> Self {
        Verifier {
            state_hash: params.initial_state_hash,
            budget: params.initial_budget,
            prev_chain_digest: params.genesis_chain_digest,
            parent_slab_root: params.genesis_chain_digest,
            open_batch: Vec::new(),
            index: 0,
            params,
        }
    }

    /// Zero-based index of the next record to be ingested.
    pub fn position(&self) -> u64 {
        self.index
    }

    /// Ingest one typed record. On error the verifier must be discarded;
    /// rejection is terminal and there is no partial accept.
    pub fn ingest(&mut self, record: &Record) -> Result<(), Rejection> {
        let index = self.index;

        // 1. Canonicalize the core and derive its content identity.
        let core_bytes = record
            .core
            .canonical_bytes()
            .map_err(|e| self.canonical_rejection(e))?;
        let rid = receipt_id(&core_bytes);

        // 2. Chain link.
        let cd = chain_digest(&self.prev_chain_digest, &rid);

        // 3. State continuity.
        if record.core.prev_state_hash != self.state_hash {
            return Err(Rejection::new(
                RejectKind::StateDiscontinuity,
                index,
                format!(
                    "prev_state_hash {} != running state {}",
                    record.core.prev_state_hash, self.state_hash
                ),
            ));
        }

        // 4. Budget continuity.
        if record.core.budget_before != self.budget {
            return Err(Rejection::new(
                RejectKind::BudgetDiscontinuity,
                index,
                format!(
                    "budget_before {} != running budget {}",
                    record.core.budget_before, self.budget
                ),
            ));
        }

        // 5. Trajectory coefficient.
        if record.core.kappa != self.params.kappa {
            return Err(Rejection::new(
                RejectKind::KappaMismatch,
                index,
                format!(
                    "kappa {} != trajectory kappa {}",
                    record.core.kappa, self.params.kappa
                ),
            ));
        }

        // 6. Admissibility.
        check_admissible(&record.core).map_err(|e| admissibility_rejection(e, index))?;

        // 7. Seal or advance.
        if record.core.action_tag == ActionTag::SlabSeal {
            let summary = record.slab.as_ref().ok_or_else(|| {
                Rejection::new(
                    RejectKind::BadSlab,
                    index,
                    "seal record carries no slab summary",
                )
            })?;
            check_seal(&record.core, summary, &self.open_batch, &self.parent_slab_root)
                .map_err(|e| Rejection::new(RejectKind::BadSlab, index, e.to_string()))?;

            self.parent_slab_root = summary.root;
            self.open_batch.clear();
            // A seal conserves budget and state; only the chain advances.
            self.budget = record.core.budget_after;
        } else {
            if record.slab.is_some() {
                return Err(Rejection::new(
                    RejectKind::MalformedRecord,
                    index,
                    "slab summary on a non-seal record",
                ));
            }
            if self.open_batch.len() == self.params.slab_capacity {
                return Err(Rejection::new(
                    RejectKind::BadSlab,
                    index,
                    format!(
                        "batch reached capacity {}; expected SLAB_SEAL",
                        self.params.slab_capacity
                    ),
                ));
            }
            self.open_batch.push(SlabMember {
                receipt_id: rid,
                chain_digest: cd,
            });
            self.state_hash = record.core.next_state_hash;
            self.budget = record.core.budget_after;
        }

        self.prev_chain_digest = cd;
        self.index += 1;
        Ok(())
    }

    /// Ingest one wire-form record, mapping construction errors to their
    /// rejection kinds before the typed procedure runs.
    pub fn ingest_value(&mut self, value: &Value) -> Result<(), Rejection> {
        let record =
            record_from_value(value).map_err(|e| wire_rejection(e, self.index))?;
        self.ingest(&record)
    }

    /// Conclude the trajectory. An open (unsealed) tail batch is permitted;
    /// sealing it is the producer's choice.
    pub fn finish(self) -> Acceptance {
        Acceptance {
            final_state_hash: self.state_hash,
            final_budget: self.budget,
            final_chain_digest: self.prev_chain_digest,
            records: self.index,
        }
    }

    /// Drive a whole trajectory of typed records.
    pub fn run<I>(params: TrajectoryParams, records: I) -> Verdict
    where
        I: IntoIterator<Item = Record>,
    {
        let mut verifier = Verifier::new(params);
        for record in records {
            if let Err(rejection) = verifier.ingest(&record) {
                return Verdict::Reject(rejection);
            }
        }
        Verdict::Accept(verifier.finish())
    }

    /// Drive a whole trajectory of wire-form records.
    pub fn run_values<I>(params: TrajectoryParams, values: I) -> Verdict
    where
        I: IntoIterator<Item = Value>,
    {
        let mut verifier = Verifier::new(params);
        for value in values {
            if let Err(rejection) = verifier.ingest_value(&value) {
                return Verdict::Reject(rejection);
            }
        }
        Verdict::Accept(verifier.finish())
    }

    fn canonical_rejection(&self, err: CanonicalizationError) -> Rejection {
        let kind = match err {
            CanonicalizationError::FloatRejected(_) => RejectKind::FloatInConsensusPath,
            CanonicalizationError::SerializationFailed(_) => RejectKind::MalformedRecord,
        };
        Rejection::new(kind, self.index, err.to_string())
    }
}

/// Standalone audit check: does `proof` place the member `receipt_id`
/// `leaf` inside the sealed slab committed to by `root`?
///
/// This is the entry point for auditors holding a seal and a proof but not
/// the trajectory. `leaf_index` is the member's position inside its slab
/// and pins the rejection.
pub fn check_slab_inclusion(
    leaf_index: u64,
    leaf: &Digest,
    proof: &coh_crypto::InclusionProof,
    root: &Digest,
) -> Result<(), Rejection> {
    if coh_crypto::verify_inclusion(leaf, proof, root) {
        Ok(())
    } else {
        Err(Rejection::new(
            RejectKind::BadMerkleProof,
            leaf_index,
            format!("proof does not reproduce root {root}"),
        ))
    }
}

fn admissibility_rejection(err: AdmissibilityError, index: u64) -> Rejection {
    let kind = match err {
        AdmissibilityError::NegativeBudget { .. } => RejectKind::NegativeBudget,
        AdmissibilityError::BudgetNotConserved { .. } => RejectKind::BudgetNotConserved,
        AdmissibilityError::InsufficientBudget { .. } => RejectKind::InsufficientBudget,
        AdmissibilityError::BudgetNotDebited { .. } => RejectKind::BudgetNotDebited,
        AdmissibilityError::Numeric(NumericError::Overflow) => RejectKind::Overflow,
        AdmissibilityError::Numeric(NumericError::DivByZero) => RejectKind::DivByZero,
    };
    Rejection::new(kind, index, err.to_string())
}

fn wire_rejection(err: WireError, index: u64) -> Rejection {
    let kind = match err {
        WireError::FloatInConsensusPath { .. } => RejectKind::FloatInConsensusPath,
        WireError::BadPrevDigest { .. } => RejectKind::BadPrevDigest,
        WireError::Malformed(_) => RejectKind::MalformedRecord,
    };
    Rejection::new(kind, index, err.to_string())
}

// ===========================================================================
// Tests — unit coverage; trajectory scenarios live in tests/trajectory.rs
// ===========================================================================
