//! # Admissibility and the Budget Law
//!
//! The per-record predicate that decides whether a proposed transition may
//! be appended to a trajectory. Given `(risk_delta, budget_before,
//! budget_after, kappa)`, all Q18:
//!
//! - `risk_delta ≤ 0`: the budget must be conserved exactly. No refund is
//!   ever credited.
//! - `risk_delta > 0`: the debit is `mul(kappa, risk_delta, Up)`; it must be
//!   available and must be subtracted exactly.
//! - Budgets are non-negative on both sides of every step.
//!
//! ## The Kernel Theorem
//!
//! For any trajectory accepted under this law with initial budget `B₀`:
//!
//! ```text
//! Σ_{k: risk_delta_k > 0} mul(kappa, risk_delta_k, Up)  ≤  B₀
//! ```
//!
//! Up-rounded debits upper-bound the exact real sum `κ·Σ(Δ⁺)`, so the bound
//! cannot be gamed by accumulating sub-unit fractional savings.

use thiserror::Error;

use coh_core::{NumericError, Q18, RoundMode};

use crate::record::RecordCore;

/// Why a record fails the budget law. Each variant maps one-to-one onto a
/// verifier rejection code.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissibilityError {
    /// A budget field is negative.
    #[error("negative budget: before={before} after={after}")]
    NegativeBudget {
        /// Raw Q18 budget before the step.
        before: i64,
        /// Raw Q18 budget after the step.
        after: i64,
    },

    /// Non-positive risk delta changed the budget.
    #[error("non-positive risk delta must conserve the budget: before={before} after={after}")]
    BudgetNotConserved {
        /// Raw Q18 budget before the step.
        before: i64,
        /// Raw Q18 budget after the step.
        after: i64,
    },

    /// The required debit exceeds the available budget.
    #[error("insufficient budget: required={required} available={available}")]
    InsufficientBudget {
        /// Raw Q18 debit required for this step.
        required: i64,
        /// Raw Q18 budget available before the step.
        available: i64,
    },

    /// The declared post-step budget does not equal the exact debit.
    #[error("budget not debited exactly: expected after={expected} got {actual}")]
    BudgetNotDebited {
        /// Raw Q18 budget the exact debit would leave.
        expected: i64,
        /// Raw Q18 budget the record declares.
        actual: i64,
    },

    /// Arithmetic failed while computing the debit.
    #[error(transparent)]
    Numeric(#[from] NumericError),
}

/// The debit a positive risk delta costs: `mul(kappa, risk_delta, Up)`.
///
/// Up is mandated for debits; Down is reserved for refunds and credits,
/// which this law never grants.
pub fn required_debit(kappa: Q18, risk_delta: Q18) -> Result<Q18, NumericError> {
    kappa.mul(risk_delta, RoundMode::Up)
}

/// Apply the budget law to one record core.
pub fn check_admissible(core: &RecordCore) -> Result<(), AdmissibilityError> {
    let before = core.budget_before;
    let after = core.budget_after;

    if before.is_negative() || after.is_negative() {
        return Err(AdmissibilityError::NegativeBudget {
            before: before.raw(),
            after: after.raw(),
        });
    }

    if !core.risk_delta.is_positive() {
        if after != before {
            return Err(AdmissibilityError::BudgetNotConserved {
                before: before.raw(),
                after: after.raw(),
            });
        }
        return Ok(());
    }

    let required = required_debit(core.kappa, core.risk_delta)?;
    if before < required {
        return Err(AdmissibilityError::InsufficientBudget {
            required: required.raw(),
            available: before.raw(),
        });
    }
    let expected = before.sub(required)?;
    if after != expected {
        return Err(AdmissibilityError::BudgetNotDebited {
            expected: expected.raw(),
            actual: after.raw(),
        });
    }
    Ok(())
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ActionTag;
    use coh_core::Digest;

    fn core(risk_delta: Q18, before: Q18, after: Q18, kappa: Q18) -> RecordCore {
        RecordCore {
            action_tag: ActionTag::Infer,
            budget_after: after,
            budget_before: before,
            kappa,
            next_state_hash: Digest::from_bytes([1; 32]),
            prev_state_hash: Digest::from_bytes([0; 32]),
            proposal_commitment: Digest::from_bytes([2; 32]),
            risk_delta,
        }
    }

    fn units(n: i64) -> Q18 {
        Q18::from_int(n).unwrap()
    }

    #[test]
    fn descent_conserves_budget() {
        let c = core(units(-20), units(100), units(100), units(1));
        assert_eq!(check_admissible(&c), Ok(()));
    }

    #[test]
    fn descent_with_refund_rejected() {
        let c = core(units(-20), units(100), units(120), units(1));
        assert!(matches!(
            check_admissible(&c),
            Err(AdmissibilityError::BudgetNotConserved { .. })
        ));
    }

    #[test]
    fn zero_delta_conserves_budget() {
        let c = core(Q18::ZERO, units(5), units(5), units(1));
        assert_eq!(check_admissible(&c), Ok(()));
    }

    #[test]
    fn ascent_debits_exactly() {
        // kappa = 1.0, delta = +30: debit is exactly 30 units.
        let c = core(units(30), units(100), units(70), units(1));
        assert_eq!(check_admissible(&c), Ok(()));
    }

    #[test]
    fn ascent_wrong_debit_rejected() {
        let c = core(units(30), units(100), units(71), units(1));
        assert!(matches!(
            check_admissible(&c),
            Err(AdmissibilityError::BudgetNotDebited { .. })
        ));
    }

    #[test]
    fn ascent_over_budget_rejected() {
        let c = core(units(50), units(40), Q18::ZERO, units(1));
        assert_eq!(
            check_admissible(&c),
            Err(AdmissibilityError::InsufficientBudget {
                required: units(50).raw(),
                available: units(40).raw(),
            })
        );
    }

    #[test]
    fn negative_budget_rejected_either_side() {
        let c = core(units(-1), units(-1), units(-1), units(1));
        assert!(matches!(
            check_admissible(&c),
            Err(AdmissibilityError::NegativeBudget { .. })
        ));
        let c = core(units(1), units(1), Q18::from_raw(-1), units(1));
        assert!(matches!(
            check_admissible(&c),
            Err(AdmissibilityError::NegativeBudget { .. })
        ));
    }

    #[test]
    fn fractional_debit_rounds_up() {
        // kappa = 0.5 units (SCALE/2 raw), delta = 1 raw step.
        // Exact product is half a raw step; the debit rounds up to 1 raw.
        let kappa = Q18::from_raw(coh_core::SCALE / 2);
        let delta = Q18::from_raw(1);
        let required = required_debit(kappa, delta).unwrap();
        assert_eq!(required.raw(), 1);

        // Declaring a zero-cost debit (the Down result) must be rejected.
        let before = units(1);
        let c = core(delta, before, before, kappa);
        assert!(matches!(
            check_admissible(&c),
            Err(AdmissibilityError::BudgetNotDebited { .. })
        ));

        // The exact Up debit is admissible.
        let after = before.sub(required).unwrap();
        let c = core(delta, before, after, kappa);
        assert_eq!(check_admissible(&c), Ok(()));
    }

    #[test]
    fn debit_overflow_surfaces_as_numeric() {
        let c = core(
            Q18::from_raw(i64::MAX),
            Q18::from_raw(i64::MAX),
            Q18::ZERO,
            Q18::from_raw(i64::MAX),
        );
        assert_eq!(
            check_admissible(&c),
            Err(AdmissibilityError::Numeric(NumericError::Overflow))
        );
    }
}
