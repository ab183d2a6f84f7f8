//! # Transition Records
//!
//! A record is the receipt of one proposed cognitive-state transition. It
//! has two partitions with very different rules:
//!
//! - **Core** — the eight hash-bearing fields. Strictly canonical: Q18
//!   integers and 32-byte digests only, serialized through
//!   [`CanonicalBytes`], hashed with the record-id domain tag. Immutable
//!   once created.
//! - **Metadata** — producer labels, wall-clock timestamps, free-form notes.
//!   Stored alongside, never hashed, never consulted by any admissibility or
//!   linkage decision.
//!
//! ## Record Identity
//!
//! Two derived digests, computed for every record:
//!
//! - `receipt_id = H(DOMAIN_RECEIPT_ID ∥ canonical_bytes(core))` — content
//!   identity, independent of history.
//! - `chain_digest = H(DOMAIN_CHAIN ∥ prev ∥ receipt_id)` — the cumulative
//!   tamper-evidence link.
//!
//! These are deliberately distinct values under distinct domain tags; the
//! receipt id answers "what is this record", the chain digest answers
//! "after what history did it arrive".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use coh_core::{CanonicalBytes, CanonicalizationError, Digest, Q18};
use coh_crypto::{chain_digest, receipt_id};

use crate::slab::SlabSummary;

/// The closed set of transition kinds.
///
/// Wire spellings are fixed; adding a variant is a versioned protocol
/// change, not a runtime extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionTag {
    /// Incorporate external evidence into the state.
    #[serde(rename = "OBSERVE")]
    Observe,
    /// Derive new state content from existing content.
    #[serde(rename = "INFER")]
    Infer,
    /// Retract or rewrite previously held content.
    #[serde(rename = "REVISE")]
    Revise,
    /// Seal the accumulated batch under a Merkle commitment.
    #[serde(rename = "SLAB_SEAL")]
    SlabSeal,
}

impl ActionTag {
    /// The fixed wire spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            ActionTag::Observe => "OBSERVE",
            ActionTag::Infer => "INFER",
            ActionTag::Revise => "REVISE",
            ActionTag::SlabSeal => "SLAB_SEAL",
        }
    }

    /// Parse a wire spelling. Returns `None` for anything outside the set.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "OBSERVE" => Some(ActionTag::Observe),
            "INFER" => Some(ActionTag::Infer),
            "REVISE" => Some(ActionTag::Revise),
            "SLAB_SEAL" => Some(ActionTag::SlabSeal),
            _ => None,
        }
    }
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The hash-bearing core of a record. Exactly these eight fields, no more.
///
/// Field names are the wire keys. Key order in the wire form is irrelevant —
/// the canonicalizer sorts — but the struct lists them alphabetically to
/// match the canonical output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCore {
    /// Transition kind, from the closed set.
    pub action_tag: ActionTag,
    /// Budget after this step. Non-negative in any admissible record.
    pub budget_after: Q18,
    /// Budget before this step. Non-negative in any admissible record.
    pub budget_before: Q18,
    /// The fixed risk coefficient. Positive, constant across a trajectory.
    pub kappa: Q18,
    /// Commitment to the state after the step.
    pub next_state_hash: Digest,
    /// Commitment to the state before the step.
    pub prev_state_hash: Digest,
    /// Commitment to the producer's selected candidate. Opaque to the
    /// kernel, except for seals where it binds the slab summary.
    pub proposal_commitment: Digest,
    /// Signed risk change of this step.
    pub risk_delta: Q18,
}

impl RecordCore {
    /// The canonical byte serialization of this core — the hash preimage.
    pub fn canonical_bytes(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        CanonicalBytes::new(self)
    }

    /// Content identity of this core.
    pub fn receipt_id(&self) -> Result<Digest, CanonicalizationError> {
        Ok(receipt_id(&self.canonical_bytes()?))
    }

    /// Chain link given the previous chain digest (or the genesis seed).
    pub fn chain_digest(&self, prev: &Digest) -> Result<Digest, CanonicalizationError> {
        Ok(chain_digest(prev, &self.receipt_id()?))
    }
}

/// Non-consensus metadata. May be stored; must never influence a hash or an
/// admissibility decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    /// Human-readable producer label.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub producer: Option<String>,
    /// Wall-clock creation time. Consensus never reads this.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub produced_at: Option<DateTime<Utc>>,
    /// Producer run identifier for log correlation.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub run_id: Option<Uuid>,
    /// Free-form note.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub note: Option<String>,
}

impl RecordMeta {
    /// True when every field is absent; such metadata is omitted on the wire.
    pub fn is_empty(&self) -> bool {
        self.producer.is_none()
            && self.produced_at.is_none()
            && self.run_id.is_none()
            && self.note.is_none()
    }
}

/// A full record: hashed core, optional slab side table, unhashed metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The hash-bearing core.
    pub core: RecordCore,
    /// Slab side table. Present exactly on `SLAB_SEAL` records; lives
    /// outside the hashed core and is bound to it through the seal's
    /// `proposal_commitment`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub slab: Option<SlabSummary>,
    /// Non-consensus metadata.
    #[serde(skip_serializing_if = "RecordMeta::is_empty", default)]
    pub meta: RecordMeta,
}

impl Record {
    /// A record with empty metadata and no side table.
    pub fn from_core(core: RecordCore) -> Self {
        Record {
            core,
            slab: None,
            meta: RecordMeta::default(),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
