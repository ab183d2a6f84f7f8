//! # Trajectory Replay
//!
//! Streams a JSON Lines trajectory file through the verifier and reports
//! the verdict. Records are parsed and ingested one line at a time; the
//! full trajectory is never held in memory, matching the kernel's own
//! O(slab-capacity) discipline.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use coh_verifier::{Verdict, Verifier};

use crate::params::load_params;

/// Arguments for `coh replay`.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Trajectory file: one wire-form record per line (JSON Lines).
    pub trajectory: PathBuf,

    /// Trajectory parameters file (YAML or JSON).
    #[arg(long)]
    pub params: PathBuf,

    /// Print the verdict as compact JSON instead of human-readable text.
    #[arg(long)]
    pub json: bool,
}

/// Replay a trajectory and print the verdict. Exit code 0 on accept, 1 on
/// reject.
pub fn run_replay(args: &ReplayArgs) -> anyhow::Result<u8> {
    let params = load_params(&args.params)?;
    tracing::debug!(
        kappa = params.kappa.raw(),
        initial_budget = params.initial_budget.raw(),
        "verifier parameters loaded"
    );

    let file = File::open(&args.trajectory)
        .with_context(|| format!("cannot open trajectory {}", args.trajectory.display()))?;
    let reader = BufReader::new(file);

    let mut verifier = Verifier::new(params);
    let mut verdict: Option<Verdict> = None;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("cannot read line {}", line_no + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value = serde_json::from_str(&line)
            .with_context(|| format!("line {} is not valid JSON", line_no + 1))?;
        if let Err(rejection) = verifier.ingest_value(&value) {
            tracing::info!(index = rejection.index, kind = %rejection.kind, "trajectory rejected");
            verdict = Some(Verdict::Reject(rejection));
            break;
        }
    }

    let verdict = match verdict {
        Some(v) => v,
        None => {
            let acceptance = verifier.finish();
            tracing::info!(records = acceptance.records, "trajectory accepted");
            Verdict::Accept(acceptance)
        }
    };

    let code = match &verdict {
        Verdict::Accept(acc) => {
            if args.json {
                println!("{}", serde_json::to_string(&verdict)?);
            } else {
                println!("ACCEPT");
                println!("  records:            {}", acc.records);
                println!("  final_state_hash:   {}", acc.final_state_hash);
                println!("  final_budget:       {}", acc.final_budget);
                println!("  final_chain_digest: {}", acc.final_chain_digest);
            }
            0
        }
        Verdict::Reject(rejection) => {
            if args.json {
                println!("{}", serde_json::to_string(&verdict)?);
            } else {
                println!("REJECT");
                println!("  kind:   {}", rejection.kind);
                println!("  index:  {}", rejection.index);
                println!("  detail: {}", rejection.detail);
            }
            1
        }
    };
    Ok(code)
}
