//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types shared by the kernel crates. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Construction errors (canonicalization, digest parsing, arithmetic) are
//!   raised synchronously by the layer that detects them; the offending value
//!   never reaches a hasher.
//! - Nothing here logs. The kernel is a pure function; the caller owns
//!   observability.

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted anywhere in the consensus path.
    /// Scaled quantities must be Q18 integers.
    #[error("float value {0} is not permitted in the consensus path; use a Q18 integer")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error in Q18 fixed-point arithmetic.
///
/// Every operation either yields a representable Q18 value or fails with one
/// of these. There is no silent saturation anywhere in the numeric domain.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericError {
    /// The mathematical result falls outside the signed 64-bit domain.
    #[error("arithmetic overflow outside the signed 64-bit Q18 domain")]
    Overflow,

    /// Division by zero.
    #[error("division by zero")]
    DivByZero,
}

/// Error parsing a 32-byte digest from its wire form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestParseError {
    /// The hex string is not exactly 64 characters.
    #[error("expected 64 hex chars, got {0}")]
    BadLength(usize),

    /// A character is not lowercase hex. Uppercase is rejected: the wire
    /// form of a digest is canonical, not merely decodable.
    #[error("invalid digest character at offset {0}; digests are lowercase hex")]
    BadChar(usize),
}
