//! Exact number helpers shared by the snapping strategies.
//!
//! Every coordinate that leaves this crate is a [`BigRational`]. The helpers
//! here cover the handful of integer/rational operations the strategies keep
//! reaching for: powers of two, nearest-numerator rounding against a shared
//! denominator, deviation measurement and unit-sphere validation.

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

/// A point whose coordinates are exact fractions.
pub type RationalPoint = Vec<BigRational>;

/// Mantissa width of an IEEE-754 double.
pub const DOUBLE_PRECISION: u32 = 53;

/// `2^bits` as an integer.
pub fn pow2(bits: u64) -> BigInt {
    BigInt::one() << bits
}

/// `2^exp` as a rational; negative exponents give `1 / 2^-exp`.
pub fn pow2_rational(exp: i64) -> BigRational {
    if exp >= 0 {
        BigRational::from_integer(pow2(exp as u64))
    } else {
        BigRational::new(BigInt::one(), pow2(exp.unsigned_abs()))
    }
}

/// Largest integer `<= r`.
pub fn floor(r: &BigRational) -> BigInt {
    r.floor().to_integer()
}

/// Smallest integer `>= r`.
pub fn ceil(r: &BigRational) -> BigInt {
    r.ceil().to_integer()
}

/// Numerator `p` minimizing `|x - p/den|`, choosing between `floor(x*den)`
/// and `floor(x*den) + 1`. Ties go to the floor.
pub fn nearest_numerator(x: &BigRational, den: &BigInt) -> BigInt {
    let scaled = x * BigRational::from_integer(den.clone());
    let low = floor(&scaled);
    let frac = scaled - BigRational::from_integer(low.clone());
    if frac > BigRational::new(BigInt::one(), BigInt::from(2)) {
        low + 1u32
    } else {
        low
    }
}

/// Largest per-coordinate distance `max_i |a_i - b_i|`.
///
/// Coordinates beyond the shorter slice are ignored.
pub fn max_deviation(a: &[BigRational], b: &[BigRational]) -> BigRational {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .max()
        .unwrap_or_else(BigRational::zero)
}

/// Least common multiple of all denominators (1 for an empty slice).
pub fn common_denominator(xs: &[BigRational]) -> BigInt {
    xs.iter().fold(BigInt::one(), |acc, x| acc.lcm(x.denom()))
}

/// The shared denominator when every coordinate already has the same one,
/// otherwise the product of all denominators.
pub fn shared_or_product_denominator(xs: &[BigRational]) -> BigInt {
    match xs.split_first() {
        None => BigInt::one(),
        Some((first, rest)) if rest.iter().all(|x| x.denom() == first.denom()) => {
            first.denom().clone()
        }
        Some(_) => xs.iter().fold(BigInt::one(), |acc, x| acc * x.denom()),
    }
}

/// Largest denominator among the coordinates.
pub fn max_denominator(xs: &[BigRational]) -> BigInt {
    xs.iter()
        .map(|x| x.denom().clone())
        .max()
        .unwrap_or_else(BigInt::one)
}

/// `Σ x_i² == 1` in exact arithmetic.
pub fn is_on_unit_sphere(point: &[BigRational]) -> bool {
    let sum: BigRational = point.iter().map(|x| x * x).sum();
    sum.is_one()
}

/// `log2 |n|` as a float, usable for integers far beyond `f64` range.
pub fn log2_int(n: &BigInt) -> f64 {
    let bits = n.bits();
    if bits == 0 {
        return f64::NEG_INFINITY;
    }
    let shift = bits.saturating_sub(62);
    let top = (n.abs() >> shift).to_f64().unwrap_or(f64::INFINITY);
    top.log2() + shift as f64
}

/// `log2 |r|` as a float. Zero maps to negative infinity.
pub fn log2_rational(r: &BigRational) -> f64 {
    if r.is_zero() {
        return f64::NEG_INFINITY;
    }
    log2_int(r.numer()) - log2_int(r.denom())
}
