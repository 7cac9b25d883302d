//! N-dimensional stereographic projection with a pole chosen per point.
//!
//! A sphere point is projected away from the coordinate of largest
//! magnitude, in the direction of its sign, so the projection denominator
//! `1 + |x_pole|` never drops below 1. The inverse is a rational map whose
//! output satisfies `Σ x_i² = 1` exactly for *any* rational plane point:
//! with `S = Σ p_i²` and `D = 1 + S`,
//!
//! ```text
//! Σ (2p_i / D)² + ((D - 2) / D)² = (4S + (S - 1)²) / (S + 1)² = 1
//! ```
//!
//! That identity is what lets a snapped (approximate) plane point turn into
//! an exactly-on-sphere rational point.
//!
//! The projector is generic over [`SphereScalar`] so real inputs are
//! projected at a working precision while rational inputs stay exact.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::error::{Result, SnapError};
use crate::real::Real;
use crate::types::PoleDescriptor;

/// Coordinate type the projector can work with.
///
/// Method names are distinct from the inherent and `num_traits` methods of
/// the implementing types so calls never become ambiguous.
pub trait SphereScalar: Clone + fmt::Debug + Send + Sync {
    /// Zero of the same kind (and precision) as `self`.
    fn zero_like(&self) -> Self;
    /// One of the same kind (and precision) as `self`.
    fn one_like(&self) -> Self;
    fn below_zero(&self) -> bool;
    /// Compare `|self|` with `|other|`.
    fn cmp_magnitude(&self, other: &Self) -> Ordering;
    fn plus(&self, other: &Self) -> Self;
    fn minus(&self, other: &Self) -> Self;
    fn times(&self, other: &Self) -> Self;
    fn over(&self, other: &Self) -> Result<Self>;
    /// The exact value.
    fn exact(&self) -> BigRational;
    /// Mantissa width if the value is rounded, `None` if exact.
    fn precision_bits(&self) -> Option<u32>;
    /// Raise the working precision to at least `bits`. No-op for exact values.
    fn widened(&self, bits: u32) -> Self;
}

impl SphereScalar for BigRational {
    fn zero_like(&self) -> Self {
        BigRational::zero()
    }

    fn one_like(&self) -> Self {
        BigRational::one()
    }

    fn below_zero(&self) -> bool {
        self.is_negative()
    }

    fn cmp_magnitude(&self, other: &Self) -> Ordering {
        self.abs().cmp(&other.abs())
    }

    fn plus(&self, other: &Self) -> Self {
        self + other
    }

    fn minus(&self, other: &Self) -> Self {
        self - other
    }

    fn times(&self, other: &Self) -> Self {
        self * other
    }

    fn over(&self, other: &Self) -> Result<Self> {
        if other.is_zero() {
            return Err(SnapError::ZeroDenominator);
        }
        Ok(self / other)
    }

    fn exact(&self) -> BigRational {
        self.clone()
    }

    fn precision_bits(&self) -> Option<u32> {
        None
    }

    fn widened(&self, _bits: u32) -> Self {
        self.clone()
    }
}

impl SphereScalar for Real {
    fn zero_like(&self) -> Self {
        Real::zero(self.precision())
    }

    fn one_like(&self) -> Self {
        Real::from_integer(&BigInt::one(), self.precision())
    }

    fn below_zero(&self) -> bool {
        self.is_negative()
    }

    fn cmp_magnitude(&self, other: &Self) -> Ordering {
        self.abs().cmp(&other.abs())
    }

    fn plus(&self, other: &Self) -> Self {
        self.add(other)
    }

    fn minus(&self, other: &Self) -> Self {
        self.sub(other)
    }

    fn times(&self, other: &Self) -> Self {
        self.mul(other)
    }

    fn over(&self, other: &Self) -> Result<Self> {
        self.div(other)
    }

    fn exact(&self) -> BigRational {
        self.to_rational()
    }

    fn precision_bits(&self) -> Option<u32> {
        Some(self.precision())
    }

    fn widened(&self, bits: u32) -> Self {
        self.widen(bits)
    }
}

// -- Pole selection --

/// Pole for `point`: the first coordinate of strictly largest magnitude,
/// signed by that coordinate's sign (zero counts as upper).
pub fn position_on_sphere<T: SphereScalar>(point: &[T]) -> Result<PoleDescriptor> {
    let (first, rest) = point.split_first().ok_or(SnapError::EmptyPoint)?;
    let mut best_index = 0;
    let mut best = first;
    for (i, x) in rest.iter().enumerate() {
        if x.cmp_magnitude(best) == Ordering::Greater {
            best_index = i + 1;
            best = x;
        }
    }
    Ok(PoleDescriptor::from_index(best_index, !best.below_zero()))
}

// -- Forward projection --

/// Project a sphere point onto the plane, choosing the pole automatically.
pub fn sphere_to_plane<T: SphereScalar>(point: &[T]) -> Result<(Vec<T>, PoleDescriptor)> {
    let pole = position_on_sphere(point)?;
    let plane = sphere_to_plane_with_pole(point, pole)?;
    Ok((plane, pole))
}

/// Project away from a given pole. The pole slot of the result holds zero.
///
/// Fails with [`SnapError::ZeroDenominator`] when the point sits exactly at
/// the antipode of the pole (`1 ± x_pole == 0`).
pub fn sphere_to_plane_with_pole<T: SphereScalar>(
    point: &[T],
    pole: PoleDescriptor,
) -> Result<Vec<T>> {
    if point.is_empty() {
        return Err(SnapError::EmptyPoint);
    }
    pole.check(point.len())?;
    let k = pole.index();
    let one = point[k].one_like();
    let denom = if pole.is_upper() {
        one.plus(&point[k])
    } else {
        one.minus(&point[k])
    };
    if denom.exact().is_zero() {
        return Err(SnapError::ZeroDenominator);
    }

    point
        .iter()
        .enumerate()
        .map(|(i, x)| if i == k { Ok(x.zero_like()) } else { x.over(&denom) })
        .collect()
}

// -- Inverse projection --

/// Map a plane point back onto the unit sphere.
///
/// The pole slot of `plane` is ignored. For rational input the result lies
/// on the sphere exactly.
pub fn plane_to_sphere<T: SphereScalar>(plane: &[T], pole: PoleDescriptor) -> Result<Vec<T>> {
    let first = plane.first().ok_or(SnapError::EmptyPoint)?;
    pole.check(plane.len())?;
    let k = pole.index();

    let one = first.one_like();
    let two = one.plus(&one);
    let denom = plane
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != k)
        .fold(one.clone(), |acc, (_, p)| acc.plus(&p.times(p)));

    let mut pole_value = denom.minus(&two).over(&denom)?;
    if pole.is_upper() {
        pole_value = pole_value.zero_like().minus(&pole_value);
    }

    plane
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if i == k {
                Ok(pole_value.clone())
            } else {
                two.times(p).over(&denom)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::is_on_unit_sphere;

    fn q(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn first_maximum_wins() {
        let point = [q(1, 2), q(-1, 2), q(1, 3)];
        assert_eq!(position_on_sphere(&point).unwrap().value(), 1);
        let point = [q(1, 3), q(-1, 2), q(1, 2)];
        assert_eq!(position_on_sphere(&point).unwrap().value(), -2);
    }

    #[test]
    fn empty_point_has_no_pole() {
        let point: [BigRational; 0] = [];
        assert_eq!(position_on_sphere(&point), Err(SnapError::EmptyPoint));
    }

    #[test]
    fn north_pole_projects_to_origin() {
        let point = [q(0, 1), q(0, 1), q(1, 1)];
        let (plane, pole) = sphere_to_plane(&point).unwrap();
        assert_eq!(pole.value(), 3);
        assert!(plane.iter().all(|p| p.is_zero()));
        assert_eq!(plane_to_sphere(&plane, pole).unwrap(), point.to_vec());
    }

    #[test]
    fn pythagorean_round_trip() {
        let point = [q(3, 13), q(-4, 13), q(-12, 13)];
        let (plane, pole) = sphere_to_plane(&point).unwrap();
        assert_eq!(pole.value(), -3);
        // 1 - (-12/13) = 25/13
        assert_eq!(plane, vec![q(3, 25), q(-4, 25), q(0, 1)]);
        assert_eq!(plane_to_sphere(&plane, pole).unwrap(), point.to_vec());
    }

    #[test]
    fn arbitrary_plane_point_lands_on_sphere() {
        let plane = [q(7, 3), q(0, 1), q(-5, 11), q(1, 1000)];
        for k in 1..=4 {
            for pole in [k, -k] {
                let pole = PoleDescriptor::new(pole, 4).unwrap();
                let sphere = plane_to_sphere(&plane, pole).unwrap();
                assert!(is_on_unit_sphere(&sphere), "pole {pole:?}");
            }
        }
    }

    #[test]
    fn antipode_is_a_zero_denominator() {
        let point = [q(0, 1), q(-1, 1)];
        let pole = PoleDescriptor::new(2, 2).unwrap();
        assert_eq!(sphere_to_plane_with_pole(&point, pole), Err(SnapError::ZeroDenominator));
    }

    #[test]
    fn pole_out_of_range_rejected() {
        let plane = [q(1, 2), q(0, 1)];
        let pole = PoleDescriptor::from_index(5, true);
        assert!(matches!(plane_to_sphere(&plane, pole), Err(SnapError::InvalidPole { .. })));
    }

    #[test]
    fn real_projection_rounds_at_working_precision() {
        let point: Vec<Real> = [0.6, 0.8]
            .iter()
            .map(|x| Real::from_f64(*x).unwrap().widened(80))
            .collect();
        let (plane, pole) = sphere_to_plane(&point).unwrap();
        assert_eq!(pole.value(), 2);
        assert_eq!(plane[0].precision(), 80);
        // 0.6 / 1.8 = 1/3 up to rounding of the inputs and the quotient
        let err = (plane[0].exact() - q(1, 3)).abs();
        assert!(err < q(1, 1 << 50));
    }
}
