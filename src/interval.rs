//! Simplest rational inside a closed interval.
//!
//! The continued-fraction expansions of both endpoints are generated in lock
//! step. The first position where they disagree decides the last term; the
//! terms are then folded back into a fraction with the usual convergent
//! recurrence. The result has the smallest denominator of any rational in
//! the interval.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::math::floor;

/// The rational with minimal denominator in `[lower, upper]`.
///
/// Endpoints given in the wrong order are swapped. Intervals touching zero
/// yield zero; negative intervals are solved on their positive mirror.
pub fn within(lower: &BigRational, upper: &BigRational) -> BigRational {
    if lower > upper {
        return within(upper, lower);
    }
    if !lower.is_positive() && !upper.is_negative() {
        return BigRational::zero();
    }
    if upper.is_negative() {
        return -within(&-upper, &-lower);
    }
    from_continued_fraction(&simplest_terms(lower.clone(), upper.clone()))
}

/// Continued-fraction terms of the simplest rational in `[lo, hi]`, `0 < lo <= hi`.
fn simplest_terms(mut lo: BigRational, mut hi: BigRational) -> Vec<BigInt> {
    let mut terms = Vec::new();
    loop {
        // Reciprocation flips the order at every level.
        if lo > hi {
            std::mem::swap(&mut lo, &mut hi);
        }
        let a_lo = floor(&lo);
        let a_hi = floor(&hi);
        let r_lo = &lo - BigRational::from_integer(a_lo.clone());
        if r_lo.is_zero() {
            // The lower bound is itself a truncation of the upper one.
            terms.push(a_lo);
            return terms;
        }
        if a_lo != a_hi {
            terms.push(a_lo.min(a_hi) + 1u32);
            return terms;
        }
        let r_hi = &hi - BigRational::from_integer(a_hi);
        terms.push(a_lo);
        lo = r_lo.recip();
        hi = r_hi.recip();
    }
}

/// Fold continued-fraction terms `[a0; a1, a2, ...]` into a reduced fraction.
pub fn from_continued_fraction(terms: &[BigInt]) -> BigRational {
    let (mut p_prev, mut p) = (BigInt::zero(), BigInt::one());
    let (mut q_prev, mut q) = (BigInt::one(), BigInt::zero());
    for a in terms {
        let p_next = a * &p + &p_prev;
        let q_next = a * &q + &q_prev;
        p_prev = std::mem::replace(&mut p, p_next);
        q_prev = std::mem::replace(&mut q, q_next);
    }
    if q.is_zero() {
        return BigRational::zero();
    }
    BigRational::new(p, q)
}

/// Regular continued-fraction expansion of a rational.
pub fn continued_fraction(value: &BigRational) -> Vec<BigInt> {
    let mut terms = Vec::new();
    let mut x = value.clone();
    loop {
        let a = floor(&x);
        let rest = &x - BigRational::from_integer(a.clone());
        terms.push(a);
        if rest.is_zero() {
            return terms;
        }
        x = rest.recip();
    }
}
