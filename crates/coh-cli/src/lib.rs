//! # coh-cli — Host Tooling for the Coherence Audit Kernel
//!
//! The kernel crates are pure functions; this crate is the caller that owns
//! I/O and observability. It loads trajectory files and parameters, drives
//! the verifier, and renders verdicts and inclusion proofs.

pub mod params;
pub mod prove;
pub mod replay;

pub use params::load_params;
pub use prove::{run_prove, run_verify_proof, ProofBundle, ProveArgs, VerifyProofArgs};
pub use replay::{run_replay, ReplayArgs};
