//! # Canonical Serialization — JCS Byte Production
//!
//! Defines [`CanonicalBytes`], the sole construction path for bytes used in
//! digest computation across the workspace.
//!
//! ## Security Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only way to
//! construct it is through [`CanonicalBytes::new`] or
//! [`CanonicalBytes::from_value`], both of which walk the value tree and
//! reject any IEEE-754 number — including integral-valued floats — before
//! RFC 8785 serialization. Any function that hashes accepts
//! `&CanonicalBytes`, never raw `&[u8]`, so an uncanonicalized byte string
//! can never reach a domain-separated hasher.
//!
//! ## Encoding Rules
//!
//! After the float check, serialization uses `serde_jcs` for RFC 8785 (JSON
//! Canonicalization Scheme) output: object keys sorted lexicographically by
//! UTF-8 bytes, compact separators, minimal escaping, UTF-8 throughout.
//! Numbers in this protocol are always signed 64-bit integers, which JCS
//! renders as plain decimal with no leading zeros and no sign for
//! non-negative values. The encoder consults no ambient state: no locale,
//! no environment, no clock.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by float-rejecting RFC 8785 canonicalization.
///
/// # Invariants
///
/// - The only constructors are [`CanonicalBytes::new`] and
///   [`CanonicalBytes::from_value`].
/// - The byte string contains no float literal; every number is a signed
///   decimal integer.
/// - Two canonical values are equal iff their canonical bytes are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// [`CanonicalizationError::FloatRejected`] if the value contains any
    /// float; [`CanonicalizationError::SerializationFailed`] if JSON or JCS
    /// serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        Self::from_value(serde_json::to_value(obj)?)
    }

    /// Construct canonical bytes from a pre-built JSON value.
    pub fn from_value(value: Value) -> Result<Self, CanonicalizationError> {
        reject_floats(&value)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// The canonical empty object, exactly `b"{}"`.
    pub fn empty_object() -> Self {
        Self(b"{}".to_vec())
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Recursively reject float values anywhere in a JSON value tree.
///
/// A `serde_json::Number` that is representable as neither `i64` nor `u64`
/// is an IEEE-754 value and fails with `FloatRejected`. Everything else —
/// null, booleans, integers, strings, arrays, objects — passes through.
pub fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if n.is_f64() && !n.is_i64() && !n.is_u64() {
                // as_f64 is total for an f64-backed Number.
                return Err(CanonicalizationError::FloatRejected(
                    n.as_f64().unwrap_or(f64::NAN),
                ));
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(reject_floats),
        Value::Object(map) => map.values().try_for_each(reject_floats),
    }
}

// ===========================================================================
// Tests
// ===========================================================================


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for float-free JSON values, the canonical-value algebra.
    fn canonical_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            "[a-zA-Z0-9_ ]{0,40}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,10}", inner, 0..8).prop_map(|m| {
                    Value::Object(m.into_iter().collect())
                }),
            ]
        })
    }

    proptest! {
        /// Canonicalization is total on the float-free algebra.
        #[test]
        fn total_on_canonical_values(value in canonical_value()) {
            prop_assert!(CanonicalBytes::from_value(value).is_ok());
        }

        /// Same input, same bytes — across invocations.
        #[test]
        fn deterministic(value in canonical_value()) {
            let a = CanonicalBytes::from_value(value.clone()).unwrap();
            let b = CanonicalBytes::from_value(value).unwrap();
            prop_assert_eq!(a.as_bytes(), b.as_bytes());
        }

        /// Output parses back as JSON and is valid UTF-8.
        #[test]
        fn output_is_valid_json(value in canonical_value()) {
            let cb = CanonicalBytes::from_value(value).unwrap();
            prop_assert!(std::str::from_utf8(cb.as_bytes()).is_ok());
            prop_assert!(serde_json::from_slice::<Value>(cb.as_bytes()).is_ok());
        }

        /// Object keys come out sorted by UTF-8 bytes.
        #[test]
        fn keys_sorted(keys in prop::collection::btree_set("[a-z]{1,8}", 2..6)) {
            let map: serde_json::Map<String, Value> = keys
                .iter()
                .enumerate()
                .map(|(i, k)| (k.clone(), serde_json::json!(i)))
                .collect();
            let cb = CanonicalBytes::from_value(Value::Object(map)).unwrap();
            let parsed: serde_json::Map<String, Value> =
                serde_json::from_slice(cb.as_bytes()).unwrap();
            let got: Vec<&String> = parsed.keys().collect();
            let mut sorted = got.clone();
            sorted.sort();
            prop_assert_eq!(got, sorted);
        }

        /// Any non-integral float anywhere in the tree is rejected.
        #[test]
        fn floats_always_rejected(f in any::<f64>().prop_filter("finite non-integer", |f| {
            f.is_finite() && f.fract() != 0.0
        })) {
            let data = serde_json::json!({"val": f});
            prop_assert!(CanonicalBytes::new(&data).is_err());
        }
    }
}
