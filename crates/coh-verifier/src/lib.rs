//! # coh-verifier — Trajectory Verification
//!
//! The decision layer of the coherence audit kernel. A [`Verifier`] consumes
//! transition records in order, holding O(1) running state plus the open
//! slab batch, and produces a [`Verdict`]: either
//! `Accept(final_state_hash, final_budget, final_chain_digest)` or a typed
//! `Reject(kind, index, detail)`.
//!
//! A trajectory either replays bit-identically to the finals the producer
//! claimed, or it is rejected at a pinpointed index. There is no partial
//! accept, and no error is swallowed, retried, or downgraded.
//!
//! This crate, like everything below it, never logs and owns no clock —
//! the caller owns observability.

pub mod reject;
pub mod verifier;

// Re-export primary types.
pub use reject::{RejectKind, Rejection};
pub use verifier::{check_slab_inclusion, Acceptance, TrajectoryParams, Verdict, Verifier};
