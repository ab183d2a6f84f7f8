//! # Q18 Fixed-Point Arithmetic
//!
//! The sole numeric type carried in hashed record cores. A [`Q18`] is a
//! signed 64-bit integer interpreted as a real value scaled by `2^18`.
//! Floats never enter the consensus path; every arithmetic operation either
//! yields a representable value or fails with [`NumericError::Overflow`].
//!
//! ## Rounding Discipline
//!
//! Multiplication and division take an explicit [`RoundMode`] at every call
//! site — there is no default. The budget law debits with `Up` and credits
//! with `Down`, so accumulated sub-unit fractions can never understate what
//! a trajectory consumed.
//!
//! The `mul` reduction rule is mechanical and pinned: compute the exact
//! product in 128 bits, truncate by arithmetic shift right by [`SCALE_BITS`],
//! and add one when rounding `Up` and any discarded bit is non-zero. For a
//! negative intermediate the shift floors toward negative infinity and the
//! `Up` adjustment then yields the ceiling.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::NumericError;

/// Number of fractional bits in the fixed-point representation.
pub const SCALE_BITS: u32 = 18;

/// The scaling factor: one whole unit is `SCALE` raw steps. Fixed for the
/// life of the protocol.
pub const SCALE: i64 = 1 << SCALE_BITS;

/// Rounding mode for `mul` and `div`. Explicit at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundMode {
    /// Round up when any remainder is discarded. Mandated for debits.
    Up,
    /// Truncate. Mandated for refunds and credits.
    Down,
}

/// A signed fixed-point scalar with scale `2^18`.
///
/// The inner raw value is private; construction goes through [`Q18::from_raw`]
/// (pre-scaled) or [`Q18::from_int`] (whole units, checked). The serde form is
/// the raw scaled value as a JSON integer — never a decimal fraction, never a
/// float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Q18(i64);

impl Q18 {
    /// The zero value.
    pub const ZERO: Q18 = Q18(0);

    /// Construct from a pre-scaled raw value.
    pub const fn from_raw(raw: i64) -> Self {
        Q18(raw)
    }

    /// Construct from a whole-unit count: `from_int(5)` is 5.0 units.
    pub fn from_int(units: i64) -> Result<Self, NumericError> {
        units
            .checked_mul(SCALE)
            .map(Q18)
            .ok_or(NumericError::Overflow)
    }

    /// The raw scaled value.
    pub const fn raw(self) -> i64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Checked addition. Fails when the mathematical sum leaves the domain.
    pub fn add(self, other: Q18) -> Result<Q18, NumericError> {
        self.0
            .checked_add(other.0)
            .map(Q18)
            .ok_or(NumericError::Overflow)
    }

    /// Checked subtraction, symmetric to [`Q18::add`].
    pub fn sub(self, other: Q18) -> Result<Q18, NumericError> {
        self.0
            .checked_sub(other.0)
            .map(Q18)
            .ok_or(NumericError::Overflow)
    }

    /// Checked negation. Fails on `i64::MIN`, which has no negation.
    pub fn neg(self) -> Result<Q18, NumericError> {
        self.0.checked_neg().map(Q18).ok_or(NumericError::Overflow)
    }

    /// Multiply two Q18 values, reducing by `SCALE` with the given mode.
    ///
    /// The exact product is computed in `i128` (which cannot overflow for
    /// two `i64` factors), truncated by arithmetic shift, and bumped by one
    /// for `Up` when any discarded remainder bit is set. The final value
    /// must fit the signed 64-bit domain.
    pub fn mul(self, other: Q18, mode: RoundMode) -> Result<Q18, NumericError> {
        let wide = (self.0 as i128) * (other.0 as i128);
        let mut q = wide >> SCALE_BITS;
        if mode == RoundMode::Up && (wide & ((1i128 << SCALE_BITS) - 1)) != 0 {
            q += 1;
        }
        i64::try_from(q).map(Q18).map_err(|_| NumericError::Overflow)
    }

    /// Divide self by other: `(self << 18) / other` in `i128`.
    ///
    /// `Down` truncates toward zero; `Up` adds one unit away from zero when
    /// the remainder is non-zero. The denominator is pre-checked so a zero
    /// divisor fails with [`NumericError::DivByZero`], never a panic.
    pub fn div(self, other: Q18, mode: RoundMode) -> Result<Q18, NumericError> {
        if other.0 == 0 {
            return Err(NumericError::DivByZero);
        }
        let num = (self.0 as i128) << SCALE_BITS;
        let den = other.0 as i128;
        let mut q = num / den;
        if mode == RoundMode::Up && num % den != 0 {
            q += if (num < 0) != (den < 0) { -1 } else { 1 };
        }
        i64::try_from(q).map(Q18).map_err(|_| NumericError::Overflow)
    }
}

impl fmt::Display for Q18 {
    /// Renders the raw scaled value, matching the wire form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Q18 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for Q18 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = serde_json::Value::deserialize(deserializer)?;
        match v.as_i64() {
            Some(raw) => Ok(Q18(raw)),
            None => Err(D::Error::custom(
                "Q18 values are signed 64-bit integers; floats and out-of-range numbers are rejected",
            )),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_is_2_pow_18() {
        assert_eq!(SCALE, 262_144);
    }

    #[test]
    fn from_int_scales() {
        assert_eq!(Q18::from_int(100).unwrap().raw(), 26_214_400);
        assert_eq!(Q18::from_int(-20).unwrap().raw(), -5_242_880);
    }

    #[test]
    fn from_int_overflow() {
        assert_eq!(Q18::from_int(i64::MAX / 2), Err(NumericError::Overflow));
    }

    #[test]
    fn add_and_sub_roundtrip() {
        let a = Q18::from_int(7).unwrap();
        let b = Q18::from_int(3).unwrap();
        assert_eq!(a.add(b).unwrap().sub(b).unwrap(), a);
    }

    #[test]
    fn add_overflow_rejected() {
        let max = Q18::from_raw(i64::MAX);
        assert_eq!(max.add(Q18::from_raw(1)), Err(NumericError::Overflow));
    }

    #[test]
    fn sub_overflow_rejected() {
        let min = Q18::from_raw(i64::MIN);
        assert_eq!(min.sub(Q18::from_raw(1)), Err(NumericError::Overflow));
    }

    #[test]
    fn neg_min_rejected() {
        assert_eq!(Q18::from_raw(i64::MIN).neg(), Err(NumericError::Overflow));
        assert_eq!(Q18::from_raw(-5).neg().unwrap().raw(), 5);
    }

    #[test]
    fn mul_exact_product() {
        // 2.0 * 3.0 = 6.0, exact in both modes.
        let a = Q18::from_int(2).unwrap();
        let b = Q18::from_int(3).unwrap();
        assert_eq!(a.mul(b, RoundMode::Down).unwrap(), Q18::from_int(6).unwrap());
        assert_eq!(a.mul(b, RoundMode::Up).unwrap(), Q18::from_int(6).unwrap());
    }

    #[test]
    fn mul_inexact_product_up_exceeds_down() {
        // 1 raw step * 1 raw step = 2^-36 units: Down truncates to 0, Up bumps to 1 raw.
        let tiny = Q18::from_raw(1);
        assert_eq!(tiny.mul(tiny, RoundMode::Down).unwrap().raw(), 0);
        assert_eq!(tiny.mul(tiny, RoundMode::Up).unwrap().raw(), 1);
    }

    #[test]
    fn mul_negative_intermediate_shift_rule() {
        // -1 raw * 1 raw = -1 wide; shift floors to -1, Up bumps to 0.
        let a = Q18::from_raw(-1);
        let b = Q18::from_raw(1);
        assert_eq!(a.mul(b, RoundMode::Down).unwrap().raw(), -1);
        assert_eq!(a.mul(b, RoundMode::Up).unwrap().raw(), 0);
    }

    #[test]
    fn mul_overflow_rejected() {
        let big = Q18::from_raw(i64::MAX);
        assert_eq!(
            big.mul(Q18::from_int(2).unwrap(), RoundMode::Down),
            Err(NumericError::Overflow)
        );
    }

    #[test]
    fn div_by_zero_rejected() {
        let a = Q18::from_int(1).unwrap();
        assert_eq!(a.div(Q18::ZERO, RoundMode::Down), Err(NumericError::DivByZero));
    }

    #[test]
    fn div_exact() {
        let a = Q18::from_int(6).unwrap();
        let b = Q18::from_int(3).unwrap();
        assert_eq!(a.div(b, RoundMode::Down).unwrap(), Q18::from_int(2).unwrap());
        assert_eq!(a.div(b, RoundMode::Up).unwrap(), Q18::from_int(2).unwrap());
    }

    #[test]
    fn div_inexact_up_rounds_away_from_zero() {
        // 1.0 / 3.0: Down truncates, Up adds one raw step.
        let one = Q18::from_int(1).unwrap();
        let three = Q18::from_int(3).unwrap();
        let down = one.div(three, RoundMode::Down).unwrap();
        let up = one.div(three, RoundMode::Up).unwrap();
        assert_eq!(up.raw(), down.raw() + 1);

        // Negative quotient: Up moves further from zero.
        let neg = one.neg().unwrap();
        let ndown = neg.div(three, RoundMode::Down).unwrap();
        let nup = neg.div(three, RoundMode::Up).unwrap();
        assert_eq!(nup.raw(), ndown.raw() - 1);
    }

    #[test]
    fn serde_is_raw_integer() {
        let q = Q18::from_int(100).unwrap();
        assert_eq!(serde_json::to_string(&q).unwrap(), "26214400");
        let back: Q18 = serde_json::from_str("26214400").unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn serde_rejects_float() {
        assert!(serde_json::from_str::<Q18>("0.5").is_err());
        assert!(serde_json::from_str::<Q18>("1.0").is_err());
    }

    #[test]
    fn serde_rejects_out_of_range() {
        // u64 beyond i64::MAX
        assert!(serde_json::from_str::<Q18>("9223372036854775808").is_err());
    }
}
