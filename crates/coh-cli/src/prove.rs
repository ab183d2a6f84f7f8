//! # Inclusion Proofs
//!
//! `coh prove` replays a trajectory, locates the sealed slab containing the
//! requested record, and emits the inclusion proof for that record's
//! `receipt_id` against the seal's declared root. `coh verify-proof` checks
//! a proof standalone, the way a light client or auditor would: no chain
//! access, just the leaf, the proof, and the claimed root.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;
use serde::{Deserialize, Serialize};

use coh_core::Digest;
use coh_crypto::{prove, InclusionProof};
use coh_ledger::{record_from_value, ActionTag};
use coh_verifier::{check_slab_inclusion, Verifier};

use crate::params::load_params;

/// Arguments for `coh prove`.
#[derive(Args, Debug)]
pub struct ProveArgs {
    /// Trajectory file: one wire-form record per line (JSON Lines).
    pub trajectory: PathBuf,

    /// Trajectory parameters file (YAML or JSON).
    #[arg(long)]
    pub params: PathBuf,

    /// Zero-based trajectory index of the record to prove.
    #[arg(long)]
    pub index: u64,
}

/// Arguments for `coh verify-proof`.
#[derive(Args, Debug)]
pub struct VerifyProofArgs {
    /// The sealed slab's Merkle root, 64 hex chars.
    #[arg(long)]
    pub root: String,

    /// The member `receipt_id` under proof, 64 hex chars.
    #[arg(long)]
    pub leaf: String,

    /// Proof file: the JSON array of `{sibling, dir}` steps.
    #[arg(long)]
    pub proof: PathBuf,

    /// The member's position inside its slab (pins the rejection).
    #[arg(long, default_value_t = 0)]
    pub leaf_index: u64,
}

/// A proof bundle: the leaf, where it sits, the root it verifies against,
/// and the proof steps themselves.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProofBundle {
    /// Trajectory index of the proven record.
    pub record_index: u64,
    /// Position of the record inside its slab.
    pub leaf_index: usize,
    /// The record's `receipt_id` — the leaf pre-image.
    pub leaf: Digest,
    /// The seal's declared Merkle root.
    pub root: Digest,
    /// The inclusion proof steps.
    pub proof: InclusionProof,
}

/// Replay, validate, and emit the proof bundle for one record.
pub fn run_prove(args: &ProveArgs) -> anyhow::Result<u8> {
    let params = load_params(&args.params)?;
    let file = File::open(&args.trajectory)
        .with_context(|| format!("cannot open trajectory {}", args.trajectory.display()))?;
    let reader = BufReader::new(file);

    // The verifier runs alongside so a proof is only ever emitted from a
    // trajectory that actually verifies up to and including the seal.
    let mut verifier = Verifier::new(params);
    let mut batch: Vec<(u64, Digest)> = Vec::new();
    let mut index: u64 = 0;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("cannot read line {}", line_no + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value = serde_json::from_str(&line)
            .with_context(|| format!("line {} is not valid JSON", line_no + 1))?;
        let record = record_from_value(&value)
            .with_context(|| format!("record {index} failed to parse"))?;
        if let Err(rejection) = verifier.ingest(&record) {
            bail!("trajectory does not verify: {rejection}");
        }

        if record.core.action_tag == ActionTag::SlabSeal {
            let summary = record
                .slab
                .context("verified seal is missing its side table")?;
            if let Some(leaf_index) = batch.iter().position(|(i, _)| *i == args.index) {
                let ids: Vec<Digest> = batch.iter().map(|(_, rid)| *rid).collect();
                let proof = prove(&ids, leaf_index)?;
                let bundle = ProofBundle {
                    record_index: args.index,
                    leaf_index,
                    leaf: ids[leaf_index],
                    root: summary.root,
                    proof,
                };
                println!("{}", serde_json::to_string_pretty(&bundle)?);
                return Ok(0);
            }
            batch.clear();
        } else {
            batch.push((index, record.core.receipt_id()?));
        }
        index += 1;
    }

    if args.index >= index {
        bail!("record {} does not exist; trajectory has {index} records", args.index);
    }
    bail!("record {} is not covered by a sealed slab", args.index)
}

/// Verify a proof bundle's steps against a claimed root and leaf.
pub fn run_verify_proof(args: &VerifyProofArgs) -> anyhow::Result<u8> {
    let root = Digest::from_hex(&args.root).context("bad --root")?;
    let leaf = Digest::from_hex(&args.leaf).context("bad --leaf")?;
    let raw = std::fs::read_to_string(&args.proof)
        .with_context(|| format!("cannot read proof {}", args.proof.display()))?;
    let proof: InclusionProof =
        serde_json::from_str(&raw).context("proof file does not match the proof schema")?;

    match check_slab_inclusion(args.leaf_index, &leaf, &proof, &root) {
        Ok(()) => {
            println!("OK");
            Ok(0)
        }
        Err(rejection) => {
            println!("{rejection}");
            Ok(1)
        }
    }
}
