//! Snapping orchestration.
//!
//! A point enters through [`snap`] (real coordinates), [`snap_rational`] or
//! [`snap_f64`], and goes through, in order:
//!
//! 1. optional normalization (`NORMALIZE`), computed exactly and rounded once
//!    at the working precision;
//! 2. `AUTO` expansion into one run per applicable strategy;
//! 3. the projection domain:
//!    - `SPHERE`: snap the sphere coordinates, then push the result through
//!      the plane and back to restore the unit norm exactly;
//!    - `PLANE`: project first, snap the `n - 1` free plane coordinates,
//!      project back.
//!
//! Either domain ends in [`plane_to_sphere`], so every [`SnapOutcome`] point
//! satisfies `Σ x_i² = 1` exactly.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::coordinate::{snap_coordinates, CoordinateStrategy};
use crate::error::{Result, SnapError};
use crate::flags::StrategyFlags;
use crate::math::{is_on_unit_sphere, log2_rational, max_denominator, max_deviation, RationalPoint};
use crate::projection::{plane_to_sphere, sphere_to_plane, SphereScalar};
use crate::real::{sqrt_rational, Real, RoundingMode};
use crate::simultaneous::approximate_jointly;
use crate::types::{PoleDescriptor, SnapSettings};

/// Extra bits carried by real-valued projection and normalization on top of
/// the input and target precision.
pub const GUARD_BITS: u32 = 16;

/// A snapped sphere point with the statistics collected along the way.
#[derive(Clone, Debug, PartialEq)]
pub struct SnapOutcome {
    /// Rational point with `Σ x_i² = 1` exactly.
    pub point: RationalPoint,
    /// Pole used by the final projection.
    pub pole: Option<PoleDescriptor>,
    /// Largest `|input_i - point_i|`, measured against the (normalized) input.
    pub deviation: BigRational,
    /// For joint strategies, bit length of the shared denominator of the
    /// snapped coordinates (before the inverse projection).
    pub shared_denominator_bits: Option<u64>,
    /// Flags of the run that produced this point.
    pub flags: StrategyFlags,
}

impl SnapOutcome {
    /// `-log2(deviation)`, infinite when the input was reproduced exactly.
    pub fn deviation_bits(&self) -> f64 {
        -log2_rational(&self.deviation)
    }

    /// Largest denominator among the output coordinates.
    pub fn max_denominator(&self) -> BigInt {
        max_denominator(&self.point)
    }

    pub fn is_on_unit_sphere(&self) -> bool {
        is_on_unit_sphere(&self.point)
    }

    /// Closer to the input, or as close with smaller denominators.
    fn beats(&self, other: &SnapOutcome) -> bool {
        match self.deviation.cmp(&other.deviation) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Equal => self.max_denominator() < other.max_denominator(),
            std::cmp::Ordering::Greater => false,
        }
    }
}

/// Coordinates approximated without any projection.
#[derive(Clone, Debug, PartialEq)]
pub struct Approximation {
    pub values: RationalPoint,
    pub shared_denominator_bits: Option<u64>,
}

// -- Entry points --

/// Snap a real point onto the unit sphere.
pub fn snap(point: &[Real], settings: &SnapSettings) -> Result<SnapOutcome> {
    snap_point(point, settings)
}

/// Snap a point whose coordinates are known exactly.
pub fn snap_rational(point: &[BigRational], settings: &SnapSettings) -> Result<SnapOutcome> {
    snap_point(point, settings)
}

/// Snap a point of doubles. Every double is converted exactly.
pub fn snap_f64(point: &[f64], settings: &SnapSettings) -> Result<SnapOutcome> {
    let reals = point
        .iter()
        .map(|x| Real::from_f64(*x))
        .collect::<Result<Vec<_>>>()?;
    snap_point(&reals, settings)
}

/// Snap independent points in parallel. Results keep the input order.
pub fn snap_points(points: &[Vec<Real>], settings: &SnapSettings) -> Vec<Result<SnapOutcome>> {
    points.par_iter().map(|point| snap(point, settings)).collect()
}

/// Raw approximation of `values` by the strategy in `settings.flags`, with
/// no projection and no unit-norm guarantee.
pub fn approximate_point(values: &[BigRational], settings: &SnapSettings) -> Result<Approximation> {
    settings.precision.validate()?;
    approximate_with(values, settings.flags, settings)
}

// -- Pipeline --

fn snap_point<T: SphereScalar>(point: &[T], settings: &SnapSettings) -> Result<SnapOutcome> {
    if point.is_empty() {
        return Err(SnapError::EmptyPoint);
    }
    settings.precision.validate()?;
    let flags = settings.flags;
    debug!(
        dim = point.len(),
        ?flags,
        significands = settings.precision.significands(),
        "snapping point"
    );

    if flags.contains(StrategyFlags::NORMALIZE) {
        let inner = settings.clone().with_flags(flags.remove(StrategyFlags::NORMALIZE));
        return match normalized(point, working_precision(point, settings))? {
            Some(unit) => snap_point(&unit, &inner),
            None => snap_point(point, &inner),
        };
    }
    if flags.contains(StrategyFlags::AUTO) {
        return snap_auto(point, settings);
    }
    if flags.contains(StrategyFlags::SPHERE) {
        snap_on_sphere(point, settings)
    } else if flags.contains(StrategyFlags::PLANE) {
        snap_on_plane(point, settings)
    } else {
        Err(SnapError::NoProjectionDomain)
    }
}

fn working_precision<T: SphereScalar>(point: &[T], settings: &SnapSettings) -> u32 {
    settings.working_precision.unwrap_or_else(|| {
        let input = point.iter().filter_map(|x| x.precision_bits()).max().unwrap_or(0);
        input.max(settings.precision.significands()) + GUARD_BITS
    })
}

/// `point / |point|` rounded to `bits`, or `None` if the norm is exactly 1.
fn normalized<T: SphereScalar>(point: &[T], bits: u32) -> Result<Option<Vec<Real>>> {
    let exact: Vec<BigRational> = point.iter().map(|x| x.exact()).collect();
    let norm_sq: BigRational = exact.iter().map(|x| x * x).sum();
    if norm_sq.is_zero() {
        return Err(SnapError::ZeroDenominator);
    }
    if norm_sq.is_one() {
        return Ok(None);
    }
    let norm = sqrt_rational(&norm_sq, bits + GUARD_BITS)?.to_rational();
    trace!(bits, norm_log2 = log2_rational(&norm), "normalizing input");
    Ok(Some(
        exact
            .iter()
            .map(|x| Real::from_rational(&(x / &norm), bits, RoundingMode::Nearest))
            .collect(),
    ))
}

fn approximate_with(
    values: &[BigRational],
    flags: StrategyFlags,
    settings: &SnapSettings,
) -> Result<Approximation> {
    if flags.is_joint() {
        let result = approximate_jointly(values, flags, &settings.precision, settings.max_iterations)?;
        return Ok(Approximation {
            values: result.to_rationals(),
            shared_denominator_bits: Some(result.denominator_bits()),
        });
    }
    let strategy = CoordinateStrategy::from_flags(flags)?;
    Ok(Approximation {
        values: snap_coordinates(values, strategy, settings.precision.significands())?,
        shared_denominator_bits: None,
    })
}

fn snap_on_sphere<T: SphereScalar>(point: &[T], settings: &SnapSettings) -> Result<SnapOutcome> {
    let exact: Vec<BigRational> = point.iter().map(|x| x.exact()).collect();
    let approx = approximate_with(&exact, settings.flags, settings)?;

    // Correction pass: the snapped coordinates are off the sphere in general.
    let (plane, pole) = sphere_to_plane(&approx.values)?;
    let snapped = plane_to_sphere(&plane, pole)?;

    let deviation = max_deviation(&exact, &snapped);
    let bound = settings.precision.epsilon();
    if deviation > bound {
        warn!(
            deviation_log2 = log2_rational(&deviation),
            bound_log2 = log2_rational(&bound),
            "sphere correction moved the point beyond the nominal bound"
        );
    }
    Ok(SnapOutcome {
        point: snapped,
        pole: Some(pole),
        deviation,
        shared_denominator_bits: approx.shared_denominator_bits,
        flags: settings.flags,
    })
}

fn snap_on_plane<T: SphereScalar>(point: &[T], settings: &SnapSettings) -> Result<SnapOutcome> {
    let bits = working_precision(point, settings);
    let working: Vec<T> = point.iter().map(|x| x.widened(bits)).collect();
    let (plane, pole) = sphere_to_plane(&working)?;
    let k = pole.index();

    // The pole slot is a placeholder, not a free coordinate.
    let free: Vec<BigRational> = plane
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != k)
        .map(|(_, p)| p.exact())
        .collect();
    let approx = approximate_with(&free, settings.flags, settings)?;

    let mut snapped_plane = approx.values;
    snapped_plane.insert(k, BigRational::zero());
    let snapped = plane_to_sphere(&snapped_plane, pole)?;

    let exact: Vec<BigRational> = point.iter().map(|x| x.exact()).collect();
    let deviation = max_deviation(&exact, &snapped);
    trace!(
        pole = pole.value(),
        bits,
        deviation_log2 = log2_rational(&deviation),
        "plane snap"
    );
    Ok(SnapOutcome {
        point: snapped,
        pole: Some(pole),
        deviation,
        shared_denominator_bits: approx.shared_denominator_bits,
        flags: settings.flags,
    })
}

/// Run every applicable strategy and keep the closest result.
fn snap_auto<T: SphereScalar>(point: &[T], settings: &SnapSettings) -> Result<SnapOutcome> {
    let mut base = settings.flags.without_strategy();
    if !base.intersects(StrategyFlags::SPHERE | StrategyFlags::PLANE) {
        base = base.insert(StrategyFlags::PLANE);
    }
    let free = if base.contains(StrategyFlags::SPHERE) {
        point.len()
    } else {
        point.len() - 1
    };

    let mut candidates: Vec<StrategyFlags> =
        CoordinateStrategy::ALL.iter().map(|s| s.flag()).collect();
    if free >= 2 {
        candidates.push(StrategyFlags::LLL);
    }
    if free == 2 {
        candidates.push(StrategyFlags::JACOBI_PERRON);
    }

    let mut best: Option<SnapOutcome> = None;
    let mut last_error = None;
    for strategy in candidates {
        let attempt = settings.clone().with_flags(base | strategy);
        match snap_point(point, &attempt) {
            Ok(outcome) => {
                if best.as_ref().map_or(true, |b| outcome.beats(b)) {
                    best = Some(outcome);
                }
            }
            Err(err) => {
                trace!(?strategy, %err, "auto candidate failed");
                last_error = Some(err);
            }
        }
    }

    match best {
        Some(outcome) => {
            debug!(flags = ?outcome.flags, deviation_log2 = log2_rational(&outcome.deviation), "auto selection");
            Ok(outcome)
        }
        None => Err(last_error
            .unwrap_or_else(|| SnapError::UnsupportedSnapType("no applicable strategy".into()))),
    }
}
