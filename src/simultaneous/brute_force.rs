//! Exhaustive shared-denominator search.
//!
//! Tries every denominator from `max_denominator` down to 2 and keeps the one
//! with the smallest worst-case deviation. Only a strictly better deviation
//! replaces the incumbent, so among equally good denominators the largest
//! one found first wins. Cost is linear in `max_denominator · d`; this is a
//! reference oracle for small problems.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;
use tracing::trace;

use super::ApproximationResult;
use crate::error::{Result, SnapError};

pub fn brute_force(xs: &[BigRational], max_denominator: &BigInt) -> Result<ApproximationResult> {
    if xs.is_empty() {
        return Err(SnapError::EmptyPoint);
    }

    let two = BigInt::from(2);
    let mut best: Option<(BigRational, ApproximationResult)> = None;
    let mut q = max_denominator.clone();
    while q >= two {
        let candidate = ApproximationResult::from_denominator(xs, &q);
        let deviation = candidate.max_deviation(xs);
        if best.as_ref().map_or(true, |(d, _)| deviation < *d) {
            best = Some((deviation, candidate));
        }
        q -= 1u32;
    }

    let result = match best {
        Some((_, result)) => result,
        None => ApproximationResult::from_denominator(xs, &BigInt::one()),
    };
    trace!(max_denominator = %max_denominator, denominator = %result.denominator, "brute-force search");
    Ok(result)
}
