//! # coh CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Uses clap derive macros; verbosity flags map onto a tracing
//! `EnvFilter`, and all kernel output stays on stdout so verdicts can be
//! piped while logs go to stderr.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use coh_cli::prove::{run_prove, run_verify_proof, ProveArgs, VerifyProofArgs};
use coh_cli::replay::{run_replay, ReplayArgs};

/// Coherence audit kernel CLI.
///
/// Replays transition-record trajectories through the deterministic
/// verifier, generates inclusion proofs against sealed slabs, and checks
/// proofs standalone.
#[derive(Parser, Debug)]
#[command(name = "coh", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a trajectory and print ACCEPT or the typed rejection.
    Replay(ReplayArgs),

    /// Emit the inclusion proof for a record inside its sealed slab.
    Prove(ProveArgs),

    /// Verify an inclusion proof against a claimed root and leaf.
    VerifyProof(VerifyProofArgs),

    /// Print the protocol genesis constants.
    Genesis,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Replay(args) => run_replay(&args),
        Commands::Prove(args) => run_prove(&args),
        Commands::VerifyProof(args) => run_verify_proof(&args),
        Commands::Genesis => {
            println!("genesis_chain_digest: {}", coh_crypto::genesis_chain_digest());
            println!("empty_state_hash:     {}", coh_crypto::empty_state_hash());
            Ok(0)
        }
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
