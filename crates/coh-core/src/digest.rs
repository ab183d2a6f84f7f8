//! # Digest — 32-Byte Content Identifiers
//!
//! [`Digest`] is the workspace-wide 32-byte hash value: receipt ids, chain
//! digests, state hashes, Merkle roots. The protocol pins SHA-256, so the
//! type carries no algorithm tag.
//!
//! The wire form is exactly 64 lowercase hex characters. Parsing is strict:
//! uppercase, whitespace, and wrong lengths are rejected, because the wire
//! form is canonical — a digest that re-serializes differently from how it
//! arrived would split consensus.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::DigestParseError;

/// A 32-byte digest value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Wrap raw digest bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Digest(bytes)
    }

    /// The all-zero digest. Useful as a test fixture; not a protocol value.
    pub const fn zero() -> Self {
        Digest([0u8; 32])
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render as 64 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        let mut s = String::with_capacity(64);
        for b in self.0 {
            s.push(HEX_DIGITS[(b >> 4) as usize] as char);
            s.push(HEX_DIGITS[(b & 0x0f) as usize] as char);
        }
        s
    }

    /// Parse from the canonical wire form: exactly 64 lowercase hex chars.
    pub fn from_hex(s: &str) -> Result<Self, DigestParseError> {
        let bytes = s.as_bytes();
        if bytes.len() != 64 {
            return Err(DigestParseError::BadLength(bytes.len()));
        }
        let mut out = [0u8; 32];
        for (i, pair) in bytes.chunks_exact(2).enumerate() {
            let hi = nibble(pair[0]).ok_or(DigestParseError::BadChar(2 * i))?;
            let lo = nibble(pair[1]).ok_or(DigestParseError::BadChar(2 * i + 1))?;
            out[i] = (hi << 4) | lo;
        }
        Ok(Digest(out))
    }
}

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Decode one lowercase hex digit. Uppercase is not a digest character.
fn nibble(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        _ => None,
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Digest::from_hex(&s).map_err(D::Error::custom)
    }
}
