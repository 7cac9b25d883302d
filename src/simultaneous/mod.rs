//! Joint (shared-denominator) simultaneous Diophantine approximation.
//!
//! Given `x_1..x_d`, find one denominator `Q` and numerators `p_i` such that
//! every `|x_i - p_i/Q|` is small. Three searches are provided:
//!
//! - [`lagarias`]: lattice reduction on Lagarias' basis. The production path.
//! - [`brute_force`]: exhaustive scan over denominators. Reference oracle.
//! - [`jacobi_perron`]: two-dimensional simultaneous continued fraction.
//!
//! All of them finish with the same numerator reconstruction
//! ([`ApproximationResult::from_denominator`]).

pub mod brute_force;
pub mod jacobi_perron;
pub mod lagarias;
pub mod reduction;

pub use brute_force::brute_force;
pub use jacobi_perron::jacobi_perron;
pub use lagarias::{lagarias_run, lll_approximate, LllTarget};
pub use reduction::lll_reduce;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use tracing::debug;

use crate::error::{Result, SnapError};
use crate::flags::StrategyFlags;
use crate::math::{max_deviation, nearest_numerator};
use crate::types::PrecisionSpec;

/// Whether a joint strategy bounds the achieved distance or the denominator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GuaranteeMode {
    /// Keep going until every coordinate is within epsilon.
    #[default]
    BoundedDistance,
    /// Never exceed the maximum denominator; return the closest result found.
    BoundedSize,
}

impl GuaranteeMode {
    pub fn from_flags(flags: StrategyFlags) -> Self {
        if flags.contains(StrategyFlags::BOUNDED_SIZE) {
            GuaranteeMode::BoundedSize
        } else {
            GuaranteeMode::BoundedDistance
        }
    }
}

/// A shared denominator and one numerator per coordinate, not yet reduced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApproximationResult {
    pub denominator: BigInt,
    pub numerators: Vec<BigInt>,
}

impl ApproximationResult {
    /// Round every coordinate to the nearest multiple of `1/denominator`.
    ///
    /// A zero denominator falls back to all-zero numerators over 1.
    pub fn from_denominator(xs: &[BigRational], denominator: &BigInt) -> Self {
        if denominator.is_zero() {
            return Self {
                denominator: BigInt::one(),
                numerators: vec![BigInt::zero(); xs.len()],
            };
        }
        Self {
            denominator: denominator.clone(),
            numerators: xs.iter().map(|x| nearest_numerator(x, denominator)).collect(),
        }
    }

    /// Canonical reduced fractions `p_i / Q`.
    pub fn to_rationals(&self) -> Vec<BigRational> {
        self.numerators
            .iter()
            .map(|p| BigRational::new(p.clone(), self.denominator.clone()))
            .collect()
    }

    /// Largest `|x_i - p_i/Q|`.
    pub fn max_deviation(&self, xs: &[BigRational]) -> BigRational {
        max_deviation(xs, &self.to_rationals())
    }

    /// Bit length of the shared denominator.
    pub fn denominator_bits(&self) -> u64 {
        self.denominator.bits()
    }
}

/// Run the joint strategy selected by `flags`.
pub fn approximate_jointly(
    xs: &[BigRational],
    flags: StrategyFlags,
    precision: &PrecisionSpec,
    max_iterations: usize,
) -> Result<ApproximationResult> {
    let mode = GuaranteeMode::from_flags(flags);
    debug!(dim = xs.len(), ?mode, ?flags, "joint approximation");
    if flags.contains(StrategyFlags::JACOBI_PERRON) {
        return jacobi_perron(xs, precision, mode);
    }
    if flags.contains(StrategyFlags::BRUTE_FORCE) {
        return brute_force(xs, &precision.max_denominator());
    }
    let target = if flags.contains(StrategyFlags::LLL_SCALED) {
        LllTarget::scaled(precision, mode, xs.len())
    } else if flags.contains(StrategyFlags::LLL_FIXED) {
        LllTarget::fixed(precision, mode, xs.len())
    } else if flags.contains(StrategyFlags::LLL) {
        LllTarget::greedy(precision, mode, xs.len())
    } else {
        return Err(SnapError::UnsupportedSnapType(format!("{flags:?} is not a joint strategy")));
    };
    lll_approximate(xs, &target, max_iterations)
}
