//! # coh-core — Foundational Types for the Coherence Audit Kernel
//!
//! This crate is the bedrock of the workspace. It defines the primitives
//! every consensus decision flows through; every other crate depends on
//! `coh-core` and it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **`Q18` is the only numeric type in hashed cores.** A signed 64-bit
//!    fixed-point scalar with scale `2^18`, explicit rounding modes, and
//!    overflow rejection. No floats, anywhere, ever.
//!
//! 2. **`CanonicalBytes` newtype.** ALL digest computation flows through
//!    `CanonicalBytes::new()`. No raw `serde_json::to_vec()` for digests.
//!    Floats are rejected at the constructor, so the "wrong serialization
//!    path" defect class is structurally impossible.
//!
//! 3. **`Digest` wire form is canonical.** 64 lowercase hex chars; strict
//!    parsing. A digest re-serializes to exactly the bytes it arrived as.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `coh-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - No I/O, no clock, no logging: every function is a pure mapping.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod qfixed;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::Digest;
pub use error::{CanonicalizationError, DigestParseError, NumericError};
pub use qfixed::{Q18, RoundMode, SCALE, SCALE_BITS};
