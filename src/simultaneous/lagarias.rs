//! Simultaneous approximation by lattice reduction (Lagarias' construction).
//!
//! For inputs `x_1..x_d` with common scale `B` and denominator bound `N`,
//! set `NB = N·B` and reduce the rows of
//!
//! ```text
//! | 2^j  NB·x_1  NB·x_2  ...  NB·x_d |
//! |  0    NB      0      ...   0     |
//! |  0    0       NB     ...   0     |
//! |  ...                             |
//! |  0    0       0      ...   NB    |
//! ```
//!
//! A lattice vector `q·row_0 + Σ m_i·row_i` has first entry `q·2^j` and
//! remaining entries `NB·(q·x_i + m_i)`, so short vectors carry small shared
//! denominators `q` with small deviations. The weight `2^j` is scanned over
//! `1..=d + bits(NB)` to trade denominator size against deviation.

use nalgebra::DMatrix;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use tracing::{debug, trace, warn};

use super::reduction::{default_delta, lll_reduce};
use super::{ApproximationResult, GuaranteeMode};
use crate::error::{Result, SnapError};
use crate::math::{log2_rational, pow2, shared_or_product_denominator};
use crate::types::PrecisionSpec;

/// How the denominator bound `N` of a lattice-reduction search is chosen.
#[derive(Clone, Debug, PartialEq)]
pub enum LllTarget {
    /// Start at `N = 2` and double until every coordinate is within `epsilon`.
    Greedy { epsilon: BigRational },
    /// One run with a caller-supplied or epsilon-derived bound.
    Fixed { bound: BigInt },
    /// One run with the bound predicted by Lagarias' theorem for `epsilon`.
    /// Experimental: the prediction is loose and grows quickly with `d`.
    Scaled { bound: BigInt },
}

impl LllTarget {
    pub fn greedy(precision: &PrecisionSpec, mode: GuaranteeMode, dim: usize) -> Self {
        match mode {
            GuaranteeMode::BoundedSize => Self::size_bounded(precision, dim),
            GuaranteeMode::BoundedDistance => LllTarget::Greedy { epsilon: precision.epsilon() },
        }
    }

    pub fn fixed(precision: &PrecisionSpec, mode: GuaranteeMode, dim: usize) -> Self {
        match mode {
            GuaranteeMode::BoundedSize => Self::size_bounded(precision, dim),
            GuaranteeMode::BoundedDistance => LllTarget::Fixed { bound: precision.max_denominator() },
        }
    }

    pub fn scaled(precision: &PrecisionSpec, mode: GuaranteeMode, dim: usize) -> Self {
        match mode {
            GuaranteeMode::BoundedSize => Self::size_bounded(precision, dim),
            GuaranteeMode::BoundedDistance => LllTarget::Scaled {
                bound: lagarias_bound(&precision.epsilon(), dim),
            },
        }
    }

    /// A single run whose accepted denominators `q <= N·2^(d/2)` stay within
    /// the precision's maximum denominator.
    fn size_bounded(precision: &PrecisionSpec, dim: usize) -> Self {
        let shift = dim.div_ceil(2) as u64;
        let bound = (precision.max_denominator() >> shift).max(BigInt::from(2));
        LllTarget::Fixed { bound }
    }
}

/// `N` such that one reduction is expected to reach `epsilon`:
/// `N = (sqrt(5d) · 2^((d-1)/2) / epsilon)^d`, rounded up to a power of two.
pub fn lagarias_bound(epsilon: &BigRational, dim: usize) -> BigInt {
    let d = dim.max(1) as f64;
    let per_coordinate = 0.5 * (5.0 * d).log2() + (d - 1.0) / 2.0 - log2_rational(epsilon);
    let bits = (d * per_coordinate).ceil().max(1.0);
    pow2(bits as u64)
}

/// Run the search described by `target`.
///
/// The greedy search gives up with [`SnapError::PrecisionUnattainable`] after
/// `max_iterations` doublings.
pub fn lll_approximate(
    xs: &[BigRational],
    target: &LllTarget,
    max_iterations: usize,
) -> Result<ApproximationResult> {
    if xs.len() < 2 {
        return Err(SnapError::DimensionMismatch {
            strategy: "lattice reduction",
            expected: "at least 2",
            found: xs.len(),
        });
    }
    match target {
        LllTarget::Fixed { bound } => lagarias_run(xs, bound),
        LllTarget::Scaled { bound } => {
            warn!(bits = bound.bits(), "formula-derived lattice bound is experimental");
            lagarias_run(xs, bound)
        }
        LllTarget::Greedy { epsilon } => {
            let mut bound = BigInt::from(2);
            for iteration in 0..max_iterations {
                let result = lagarias_run(xs, &bound)?;
                let achieved = result.max_deviation(xs);
                trace!(
                    iteration,
                    bound_bits = bound.bits(),
                    deviation_log2 = log2_rational(&achieved),
                    "greedy lattice step"
                );
                if &achieved <= epsilon {
                    debug!(iterations = iteration + 1, denominator_bits = result.denominator_bits(), "greedy lattice search converged");
                    return Ok(result);
                }
                bound <<= 1u32;
            }
            Err(SnapError::PrecisionUnattainable { iterations: max_iterations })
        }
    }
}

/// One lattice-reduction search with denominator bound `bound`.
///
/// Candidates with `q <= bound·2^(d/2)` are compared by their largest
/// deviation; ties keep the smaller denominator. No candidate at all yields
/// the all-zero approximation over 1.
pub fn lagarias_run(xs: &[BigRational], bound: &BigInt) -> Result<ApproximationResult> {
    let d = xs.len();
    if d < 2 {
        return Err(SnapError::DimensionMismatch {
            strategy: "lattice reduction",
            expected: "at least 2",
            found: d,
        });
    }
    if !bound.is_positive() {
        return Err(SnapError::InvalidPrecision(format!("denominator bound must be positive, got {bound}")));
    }

    let scale = shared_or_product_denominator(xs);
    let nb = bound * &scale;
    // Entries NB·x_i are integral because B is a multiple of every denominator.
    let scaled: Vec<BigInt> = xs
        .iter()
        .map(|x| (x * BigRational::from_integer(nb.clone())).to_integer())
        .collect();
    // q <= N·sqrt(2^d)  <=>  q² <= N²·2^d
    let q_limit = bound * bound * pow2(d as u64);
    let delta = default_delta();

    let mut best: Option<(BigRational, BigInt)> = None;
    let max_exponent = d as u64 + nb.bits();
    for j in 1..=max_exponent {
        let mut basis = DMatrix::from_element(d + 1, d + 1, BigInt::zero());
        basis[(0, 0)] = pow2(j);
        for (i, v) in scaled.iter().enumerate() {
            basis[(0, i + 1)] = v.clone();
            basis[(i + 1, i + 1)] = nb.clone();
        }
        lll_reduce(&mut basis, &delta)?;

        for row in 0..=d {
            // Column 0 only ever receives multiples of 2^j.
            let q = basis[(row, 0)].abs() >> j;
            if q.is_zero() || &q * &q > q_limit {
                continue;
            }
            let deviation = ApproximationResult::from_denominator(xs, &q).max_deviation(xs);
            let better = match &best {
                None => true,
                Some((best_dev, best_q)) => {
                    deviation < *best_dev || (deviation == *best_dev && &q < best_q)
                }
            };
            if better {
                best = Some((deviation, q));
            }
        }
    }

    let denominator = best.map(|(_, q)| q).unwrap_or_else(BigInt::zero);
    trace!(bound_bits = bound.bits(), denominator_bits = denominator.bits(), "lagarias run");
    Ok(ApproximationResult::from_denominator(xs, &denominator))
}
