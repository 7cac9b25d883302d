//! Independent per-coordinate snapping.
//!
//! Each strategy maps one value to one rational with its own error and
//! denominator contract:
//!
//! | Strategy           | Error bound              | Denominator            |
//! |--------------------|--------------------------|------------------------|
//! | continued fraction | `<= 2^-(s+1)`            | `<= 2^s`, minimal      |
//! | fixed point        | `< 2^-s`                 | power of two `<= 2^s`  |
//! | float round        | half an ulp at `s` bits  | power of two           |

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use tracing::trace;

use crate::error::{Result, SnapError};
use crate::flags::StrategyFlags;
use crate::interval::within;
use crate::math::{pow2, pow2_rational};
use crate::real::{Real, RoundingMode};

/// A per-coordinate snapping strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CoordinateStrategy {
    ContinuedFraction,
    FixedPoint,
    FloatRound,
}

impl CoordinateStrategy {
    /// All per-coordinate strategies, in the order `AUTO` tries them.
    pub const ALL: [CoordinateStrategy; 3] = [
        CoordinateStrategy::ContinuedFraction,
        CoordinateStrategy::FixedPoint,
        CoordinateStrategy::FloatRound,
    ];

    /// Pick the strategy named by `flags`.
    pub fn from_flags(flags: StrategyFlags) -> Result<Self> {
        if flags.contains(StrategyFlags::CONTINUED_FRACTION) {
            Ok(CoordinateStrategy::ContinuedFraction)
        } else if flags.contains(StrategyFlags::FIXED_POINT) {
            Ok(CoordinateStrategy::FixedPoint)
        } else if flags.contains(StrategyFlags::FLOAT_ROUND) {
            Ok(CoordinateStrategy::FloatRound)
        } else {
            Err(SnapError::UnsupportedSnapType(format!("{flags:?}")))
        }
    }

    pub fn flag(self) -> StrategyFlags {
        match self {
            CoordinateStrategy::ContinuedFraction => StrategyFlags::CONTINUED_FRACTION,
            CoordinateStrategy::FixedPoint => StrategyFlags::FIXED_POINT,
            CoordinateStrategy::FloatRound => StrategyFlags::FLOAT_ROUND,
        }
    }
}

/// Snap an exact value with a `significands`-bit budget.
pub fn snap_coordinate(
    value: &BigRational,
    strategy: CoordinateStrategy,
    significands: u32,
) -> Result<BigRational> {
    match strategy {
        CoordinateStrategy::ContinuedFraction => Ok(snap_continued_fraction(
            value,
            &pow2_rational(-(significands as i64) - 1),
        )),
        CoordinateStrategy::FixedPoint => snap_fixed_point(value, significands),
        CoordinateStrategy::FloatRound => Ok(snap_float_round(value, significands)),
    }
}

/// Snap a real value. Without a bit budget the value's own precision is used;
/// for the continued-fraction strategy that means the interval spans half an
/// ulp on either side, i.e. every rational that rounds to this real.
pub fn snap_real_coordinate(
    value: &Real,
    strategy: CoordinateStrategy,
    significands: Option<u32>,
) -> Result<BigRational> {
    let exact = value.to_rational();
    match (strategy, significands) {
        (_, Some(s)) => snap_coordinate(&exact, strategy, s),
        (CoordinateStrategy::ContinuedFraction, None) => match value.ulp() {
            None => Ok(BigRational::zero()),
            Some(ulp) => {
                let half = ulp / BigInt::from(2);
                Ok(snap_continued_fraction(&exact, &half))
            }
        },
        (_, None) => snap_coordinate(&exact, strategy, value.precision()),
    }
}

/// Simplest rational within `radius` of `value`.
pub fn snap_continued_fraction(value: &BigRational, radius: &BigRational) -> BigRational {
    within(&(value - radius), &(value + radius))
}

/// Truncate toward zero onto the grid `2^-significands`.
///
/// Values below the grid spacing truncate to zero and `±1` is kept as is.
/// Values with `|v| > 1` fail with [`SnapError::FixedPointRange`].
pub fn snap_fixed_point(value: &BigRational, significands: u32) -> Result<BigRational> {
    if value.abs() > BigRational::one() {
        return Err(SnapError::FixedPointRange { value: value.clone() });
    }
    let scale = pow2(significands as u64);
    let scaled = value * BigRational::from_integer(scale.clone());
    let truncated = scaled.trunc().to_integer();
    trace!(significands, numerator = %truncated, "fixed-point truncation");
    Ok(BigRational::new(truncated, scale))
}

/// Round to nearest with `significands` significant bits and return the
/// exact dyadic value.
pub fn snap_float_round(value: &BigRational, significands: u32) -> BigRational {
    Real::from_rational(value, significands, RoundingMode::Nearest).to_rational()
}

/// Snap every coordinate independently.
pub fn snap_coordinates(
    values: &[BigRational],
    strategy: CoordinateStrategy,
    significands: u32,
) -> Result<Vec<BigRational>> {
    values
        .iter()
        .map(|v| snap_coordinate(v, strategy, significands))
        .collect()
}
