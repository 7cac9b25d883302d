//! Jacobi-Perron simultaneous continued fraction for two coordinates.
//!
//! With fractional parts `0 <= α1, α2 < 1` the map
//!
//! ```text
//! b = floor(1/α1),  a = floor(α2/α1)
//! (α1, α2) -> (α2/α1 - a, 1/α1 - b)
//! ```
//!
//! satisfies `(1, α1, α2) ∝ M·(1, α1', α2')` with
//! `M = [[b, 0, 1], [1, 0, 0], [a, 1, 0]]`. The columns of the running
//! product `M_1·M_2·…` are integer vectors `(q, p1, p2)` with
//! `α_i ≈ p_i / q`; the leading column is the new convergent at every step:
//!
//! ```text
//! c0' = b·c0 + c1 + a·c2,   c1' = c2,   c2' = c0
//! ```
//!
//! Once `α1` reaches zero the problem collapses to an ordinary continued
//! fraction of `α2` acting on columns `c0` and `c2`. Rational inputs always
//! terminate because the leading denominator strictly shrinks.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use tracing::trace;

use super::{ApproximationResult, GuaranteeMode};
use crate::error::{Result, SnapError};
use crate::math::floor;
use crate::types::PrecisionSpec;

/// Integer column `(q, p1, p2)` of the convergent matrix.
type Column = [BigInt; 3];

fn unit_column(i: usize) -> Column {
    std::array::from_fn(|k| if k == i { BigInt::one() } else { BigInt::zero() })
}

fn zero_column() -> Column {
    std::array::from_fn(|_| BigInt::zero())
}

/// `b·c0 + c1 + a·c2` (pass a zero `c1` for the one-dimensional step).
fn combine(b: &BigInt, c0: &Column, c1: &Column, a: &BigInt, c2: &Column) -> Column {
    std::array::from_fn(|k| b * &c0[k] + &c1[k] + a * &c2[k])
}

fn fractional_part(x: &BigRational) -> BigRational {
    x - BigRational::from_integer(floor(x))
}

/// Two-coordinate shared-denominator approximation.
///
/// In [`GuaranteeMode::BoundedDistance`] the expansion runs until some
/// convergent is within the precision's epsilon of both coordinates. In
/// [`GuaranteeMode::BoundedSize`] it stops before the denominator exceeds the
/// precision's maximum denominator and returns the closest convergent seen.
/// Numerators are re-rounded against the original coordinates.
pub fn jacobi_perron(
    xs: &[BigRational],
    precision: &PrecisionSpec,
    mode: GuaranteeMode,
) -> Result<ApproximationResult> {
    if xs.len() != 2 {
        return Err(SnapError::DimensionMismatch {
            strategy: "Jacobi-Perron",
            expected: "exactly 2",
            found: xs.len(),
        });
    }

    let epsilon = precision.epsilon();
    let max_denominator = precision.max_denominator();

    let mut alpha1 = fractional_part(&xs[0]);
    let mut alpha2 = fractional_part(&xs[1]);
    let (mut c0, mut c1, mut c2) = (unit_column(0), unit_column(1), unit_column(2));

    let mut best = ApproximationResult::from_denominator(xs, &BigInt::one());
    let mut best_deviation = best.max_deviation(xs);
    let mut steps = 0usize;

    loop {
        if mode == GuaranteeMode::BoundedDistance && best_deviation <= epsilon {
            break;
        }
        if alpha1.is_zero() && alpha2.is_zero() {
            break;
        }

        if !alpha1.is_zero() {
            let inv = alpha1.recip();
            let ratio = &alpha2 / &alpha1;
            let b = floor(&inv);
            let a = floor(&ratio);
            alpha1 = ratio - BigRational::from_integer(a.clone());
            alpha2 = inv - BigRational::from_integer(b.clone());
            let next = combine(&b, &c0, &c1, &a, &c2);
            c1 = std::mem::replace(&mut c2, std::mem::replace(&mut c0, next));
        } else {
            let inv = alpha2.recip();
            let b = floor(&inv);
            alpha2 = inv - BigRational::from_integer(b.clone());
            let next = combine(&b, &c0, &zero_column(), &BigInt::zero(), &c2);
            c2 = std::mem::replace(&mut c0, next);
        }
        steps += 1;

        let q = &c0[0];
        if mode == GuaranteeMode::BoundedSize && q > &max_denominator {
            break;
        }
        let candidate = ApproximationResult::from_denominator(xs, q);
        let deviation = candidate.max_deviation(xs);
        if deviation < best_deviation
            || (deviation == best_deviation && candidate.denominator < best.denominator)
        {
            best = candidate;
            best_deviation = deviation;
        }
    }

    trace!(steps, denominator = %best.denominator, ?mode, "jacobi-perron expansion");
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn exact_rationals_terminate() {
        let xs = [q(1, 2), q(1, 3)];
        let spec = PrecisionSpec::Epsilon(q(1, 1_000_000));
        let r = jacobi_perron(&xs, &spec, GuaranteeMode::BoundedDistance).unwrap();
        assert_eq!(r.denominator, BigInt::from(6));
        assert_eq!(r.numerators, vec![BigInt::from(3), BigInt::from(2)]);
    }

    #[test]
    fn bounded_distance_meets_epsilon() {
        let xs = [q(355, 1000), q(-123, 1000)];
        let spec = PrecisionSpec::Significands(8);
        let r = jacobi_perron(&xs, &spec, GuaranteeMode::BoundedDistance).unwrap();
        assert!(r.max_deviation(&xs) <= q(1, 256));
        assert_eq!(r.denominator, BigInt::from(479));
    }

    #[test]
    fn bounded_size_respects_denominator() {
        let xs = [q(355, 1000), q(-123, 1000)];
        let spec = PrecisionSpec::MaxDenominator(BigInt::from(256));
        let r = jacobi_perron(&xs, &spec, GuaranteeMode::BoundedSize).unwrap();
        assert!(r.denominator <= BigInt::from(256));
        assert_eq!(r.denominator, BigInt::from(42));
        assert_eq!(r.numerators, vec![BigInt::from(15), BigInt::from(-5)]);
    }

    #[test]
    fn wrong_dimension() {
        let xs = [q(1, 2), q(1, 3), q(1, 5)];
        let err = jacobi_perron(&xs, &PrecisionSpec::Significands(8), GuaranteeMode::BoundedDistance);
        assert!(matches!(err, Err(SnapError::DimensionMismatch { found: 3, .. })));
    }

    #[test]
    fn zero_input_is_zero() {
        let xs = [q(0, 1), q(0, 1)];
        let r = jacobi_perron(&xs, &PrecisionSpec::Significands(8), GuaranteeMode::BoundedSize).unwrap();
        assert_eq!(r.denominator, BigInt::one());
        assert!(r.numerators.iter().all(|n| n.is_zero()));
    }
}
