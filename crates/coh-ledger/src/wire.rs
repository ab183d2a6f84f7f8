//! # Wire Codec — Strict Parsing of Proposed Records
//!
//! Producers submit records as JSON. This module is the boundary where that
//! untrusted form becomes a typed [`Record`] — or a precise construction
//! error, raised before anything reaches a hasher.
//!
//! ## Record Schema
//!
//! A wire record is an object with a `core` member and optional `slab` and
//! `meta` members. The core's keys are exactly: `action_tag`,
//! `budget_after`, `budget_before`, `kappa`, `next_state_hash`,
//! `prev_state_hash`, `proposal_commitment`, `risk_delta`. Numeric fields
//! are decimal integers (raw Q18 values); hash fields are 64 lowercase hex
//! chars. Key order is irrelevant — the canonicalizer sorts.
//!
//! ## Error Taxonomy
//!
//! - Any float anywhere in the core — including an integral-valued one —
//!   is [`WireError::FloatInConsensusPath`]. The float never reaches the
//!   canonicalizer, let alone a hash.
//! - A chain-digest field of the slab side table that fails strict digest
//!   parsing is [`WireError::BadPrevDigest`].
//! - Every other shape violation — missing or unknown keys, bad hex, an
//!   action tag outside the closed set, out-of-range integers — is
//!   [`WireError::Malformed`].

use serde_json::Value;
use thiserror::Error;

use coh_core::{Digest, Q18};

use crate::record::{ActionTag, Record, RecordCore, RecordMeta};
use crate::slab::SlabSummary;

/// The eight core keys, in canonical (sorted) order.
pub const CORE_KEYS: [&str; 8] = [
    "action_tag",
    "budget_after",
    "budget_before",
    "kappa",
    "next_state_hash",
    "prev_state_hash",
    "proposal_commitment",
    "risk_delta",
];

/// Error parsing a wire record.
#[derive(Error, Debug)]
pub enum WireError {
    /// An IEEE-754 value appeared in the hashed core.
    #[error("float value in consensus path at core.{field}")]
    FloatInConsensusPath {
        /// The core field carrying the float.
        field: String,
    },

    /// A chain-digest field failed strict digest parsing.
    #[error("bad chain digest in {field}: {reason}")]
    BadPrevDigest {
        /// The offending field.
        field: String,
        /// Parse failure description.
        reason: String,
    },

    /// Any other schema violation.
    #[error("malformed record: {0}")]
    Malformed(String),
}

/// Parse one wire record.
pub fn record_from_value(value: &Value) -> Result<Record, WireError> {
    let obj = value
        .as_object()
        .ok_or_else(|| WireError::Malformed("record must be a JSON object".into()))?;

    for key in obj.keys() {
        if !matches!(key.as_str(), "core" | "slab" | "meta") {
            return Err(WireError::Malformed(format!("unknown record member {key:?}")));
        }
    }

    let core = core_from_value(
        obj.get("core")
            .ok_or_else(|| WireError::Malformed("record is missing \"core\"".into()))?,
    )?;

    let slab = match obj.get("slab") {
        Some(v) => Some(slab_from_value(v)?),
        None => None,
    };

    let meta = match obj.get("meta") {
        Some(v) => serde_json::from_value::<RecordMeta>(v.clone())
            .map_err(|e| WireError::Malformed(format!("bad meta: {e}")))?,
        None => RecordMeta::default(),
    };

    Ok(Record { core, slab, meta })
}

/// Parse the eight-field core with the full error taxonomy.
pub fn core_from_value(value: &Value) -> Result<RecordCore, WireError> {
    let obj = value
        .as_object()
        .ok_or_else(|| WireError::Malformed("core must be a JSON object".into()))?;

    // Floats are hunted first, field by field, so the construction error
    // names the consensus path they tried to enter. The walk is recursive:
    // a float smuggled inside a nested value is still a float in the core.
    for (key, v) in obj {
        if coh_core::canonical::reject_floats(v).is_err() {
            return Err(WireError::FloatInConsensusPath { field: key.clone() });
        }
    }

    for key in CORE_KEYS {
        if !obj.contains_key(key) {
            return Err(WireError::Malformed(format!("core is missing {key:?}")));
        }
    }
    for key in obj.keys() {
        if !CORE_KEYS.contains(&key.as_str()) {
            return Err(WireError::Malformed(format!("unknown core key {key:?}")));
        }
    }

    let action_tag = {
        let s = obj["action_tag"]
            .as_str()
            .ok_or_else(|| WireError::Malformed("action_tag must be a string".into()))?;
        ActionTag::from_wire(s)
            .ok_or_else(|| WireError::Malformed(format!("unknown action_tag {s:?}")))?
    };

    Ok(RecordCore {
        action_tag,
        budget_after: q_field(obj, "budget_after")?,
        budget_before: q_field(obj, "budget_before")?,
        kappa: q_field(obj, "kappa")?,
        next_state_hash: digest_field(obj, "next_state_hash")?,
        prev_state_hash: digest_field(obj, "prev_state_hash")?,
        proposal_commitment: digest_field(obj, "proposal_commitment")?,
        risk_delta: q_field(obj, "risk_delta")?,
    })
}

/// Parse the slab side table of a seal record.
pub fn slab_from_value(value: &Value) -> Result<SlabSummary, WireError> {
    const SLAB_KEYS: [&str; 5] = [
        "first_chain_digest",
        "last_chain_digest",
        "length",
        "parent_root",
        "root",
    ];

    let obj = value
        .as_object()
        .ok_or_else(|| WireError::Malformed("slab must be a JSON object".into()))?;
    for key in SLAB_KEYS {
        if !obj.contains_key(key) {
            return Err(WireError::Malformed(format!("slab is missing {key:?}")));
        }
    }
    for key in obj.keys() {
        if !SLAB_KEYS.contains(&key.as_str()) {
            return Err(WireError::Malformed(format!("unknown slab key {key:?}")));
        }
    }

    let length = obj["length"]
        .as_u64()
        .ok_or_else(|| WireError::Malformed("slab length must be an unsigned integer".into()))?;

    Ok(SlabSummary {
        root: digest_field(obj, "root")?,
        first_chain_digest: chain_digest_field(obj, "first_chain_digest")?,
        last_chain_digest: chain_digest_field(obj, "last_chain_digest")?,
        parent_root: chain_digest_field(obj, "parent_root")?,
        length,
    })
}

fn q_field(obj: &serde_json::Map<String, Value>, key: &str) -> Result<Q18, WireError> {
    obj[key]
        .as_i64()
        .map(Q18::from_raw)
        .ok_or_else(|| WireError::Malformed(format!("{key} must be a signed 64-bit integer")))
}

fn digest_field(obj: &serde_json::Map<String, Value>, key: &str) -> Result<Digest, WireError> {
    let s = obj[key]
        .as_str()
        .ok_or_else(|| WireError::Malformed(format!("{key} must be a hex string")))?;
    Digest::from_hex(s).map_err(|e| WireError::Malformed(format!("bad {key}: {e}")))
}

/// Like [`digest_field`] but the field carries a chain digest, so a parse
/// failure is `BadPrevDigest` rather than generic malformation.
fn chain_digest_field(
    obj: &serde_json::Map<String, Value>,
    key: &str,
) -> Result<Digest, WireError> {
    let s = obj[key].as_str().ok_or_else(|| WireError::BadPrevDigest {
        field: key.to_string(),
        reason: "must be a hex string".into(),
    })?;
    Digest::from_hex(s).map_err(|e| WireError::BadPrevDigest {
        field: key.to_string(),
        reason: e.to_string(),
    })
}

// ===========================================================================
// Tests
// ===========================================================================
