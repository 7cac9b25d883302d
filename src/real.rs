//! Software binary floating point with an explicit mantissa width.
//!
//! A [`Real`] is `mantissa · 2^exponent` with `|mantissa| < 2^precision`.
//! Arithmetic computes the exact rational result first and rounds once at
//! the wider operand precision, so no operation ever double-rounds.

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::error::{Result, SnapError};
use crate::math::{pow2, pow2_rational, DOUBLE_PRECISION};

/// How a value that does not fit the target precision is rounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RoundingMode {
    /// Round to nearest, ties to even.
    #[default]
    Nearest,
    /// Round toward zero.
    Truncate,
}

/// Arbitrary-precision binary float.
///
/// The representation is canonical: the mantissa is odd (or zero with a zero
/// exponent), so two reals with the same value compare equal regardless of
/// their nominal precision.
#[derive(Clone, Debug)]
pub struct Real {
    mantissa: BigInt,
    exponent: i64,
    precision: u32,
}

impl PartialEq for Real {
    fn eq(&self, other: &Self) -> bool {
        self.mantissa == other.mantissa && self.exponent == other.exponent
    }
}

impl Eq for Real {}

impl PartialOrd for Real {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Real {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_rational().cmp(&other.to_rational())
    }
}

impl Real {
    /// Zero carrying the given nominal precision.
    pub fn zero(precision: u32) -> Self {
        Self { mantissa: BigInt::zero(), exponent: 0, precision: precision.max(1) }
    }

    /// Exact conversion of a finite double (precision 53).
    pub fn from_f64(x: f64) -> Result<Self> {
        if !x.is_finite() {
            return Err(SnapError::NonFinite(x));
        }
        if x == 0.0 {
            return Ok(Self::zero(DOUBLE_PRECISION));
        }
        let bits = x.to_bits();
        let negative = bits >> 63 == 1;
        let biased = ((bits >> 52) & 0x7ff) as i64;
        let fraction = bits & ((1u64 << 52) - 1);
        let (mantissa, exponent) = if biased == 0 {
            (fraction, -1074)
        } else {
            (fraction | (1u64 << 52), biased - 1075)
        };
        let mantissa = if negative { -BigInt::from(mantissa) } else { BigInt::from(mantissa) };
        Ok(Self::canonical(mantissa, exponent, DOUBLE_PRECISION))
    }

    /// Exact conversion of an integer, widening the precision if needed.
    pub fn from_integer(n: &BigInt, precision: u32) -> Self {
        let width = (n.bits() as u32).max(precision);
        Self::canonical(n.clone(), 0, width)
    }

    /// Round an exact rational to `precision` significant bits.
    pub fn from_rational(value: &BigRational, precision: u32, mode: RoundingMode) -> Self {
        let precision = precision.max(1);
        if value.is_zero() {
            return Self::zero(precision);
        }
        let negative = value.is_negative();
        let numer = value.numer().abs();
        let denom = value.denom();

        // Pick e with 2^(p-1) <= |v| / 2^e < 2^p; the first guess is off by at most one.
        let mut exponent = numer.bits() as i64 - denom.bits() as i64 - precision as i64;
        let (quotient, remainder, divisor) = loop {
            let (q, r, d) = scaled_div_rem(&numer, denom, exponent);
            match q.bits().cmp(&(precision as u64)) {
                Ordering::Greater => exponent += 1,
                Ordering::Less => exponent -= 1,
                Ordering::Equal => break (q, r, d),
            }
        };

        let mut mantissa = match mode {
            RoundingMode::Truncate => quotient,
            RoundingMode::Nearest => {
                let twice = &remainder << 1u32;
                match twice.cmp(&divisor) {
                    Ordering::Greater => quotient + 1u32,
                    Ordering::Equal if quotient.is_odd() => quotient + 1u32,
                    _ => quotient,
                }
            }
        };
        if mantissa.bits() > precision as u64 {
            mantissa >>= 1u32;
            exponent += 1;
        }
        if negative {
            mantissa = -mantissa;
        }
        Self::canonical(mantissa, exponent, precision)
    }

    fn canonical(mut mantissa: BigInt, mut exponent: i64, precision: u32) -> Self {
        match mantissa.trailing_zeros() {
            None => exponent = 0,
            Some(tz) => {
                mantissa >>= tz;
                exponent += tz as i64;
            }
        }
        Self { mantissa, exponent, precision }
    }

    /// Exact value as a fraction.
    pub fn to_rational(&self) -> BigRational {
        BigRational::from_integer(self.mantissa.clone()) * pow2_rational(self.exponent)
    }

    /// Lossy conversion for diagnostics.
    pub fn to_f64(&self) -> f64 {
        let bits = self.mantissa.bits();
        let shift = bits.saturating_sub(63);
        let top = (&self.mantissa >> shift).to_f64().unwrap_or(0.0);
        let mut exp = self.exponent + shift as i64;
        // Scale in steps so neither factor overflows on its own.
        let mut value = top;
        while exp > 1000 {
            value *= 2f64.powi(1000);
            exp -= 1000;
        }
        while exp < -1000 {
            value *= 2f64.powi(-1000);
            exp += 1000;
        }
        value * 2f64.powi(exp as i32)
    }

    /// Nominal mantissa width in bits.
    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa.is_negative()
    }

    /// Exponent of the leading bit: `2^msb <= |x| < 2^(msb+1)`. `None` for zero.
    pub fn msb_exponent(&self) -> Option<i64> {
        if self.is_zero() {
            None
        } else {
            Some(self.exponent + self.mantissa.bits() as i64 - 1)
        }
    }

    /// Spacing between adjacent representable values at this magnitude and
    /// precision. `None` for zero.
    pub fn ulp(&self) -> Option<BigRational> {
        self.msb_exponent()
            .map(|msb| pow2_rational(msb - self.precision as i64 + 1))
    }

    /// Re-round to a new precision.
    pub fn round(&self, precision: u32, mode: RoundingMode) -> Self {
        Self::from_rational(&self.to_rational(), precision, mode)
    }

    /// Same value, nominal precision raised to at least `precision` bits.
    pub fn widen(&self, precision: u32) -> Self {
        Self {
            mantissa: self.mantissa.clone(),
            exponent: self.exponent,
            precision: self.precision.max(precision),
        }
    }

    pub fn neg(&self) -> Self {
        Self { mantissa: -&self.mantissa, exponent: self.exponent, precision: self.precision }
    }

    pub fn abs(&self) -> Self {
        Self { mantissa: self.mantissa.abs(), exponent: self.exponent, precision: self.precision }
    }

    // -- Arithmetic: exact result, one rounding at the wider precision --

    pub fn add(&self, other: &Real) -> Real {
        self.rounded(&(self.to_rational() + other.to_rational()), other)
    }

    pub fn sub(&self, other: &Real) -> Real {
        self.rounded(&(self.to_rational() - other.to_rational()), other)
    }

    pub fn mul(&self, other: &Real) -> Real {
        self.rounded(&(self.to_rational() * other.to_rational()), other)
    }

    pub fn div(&self, other: &Real) -> Result<Real> {
        if other.is_zero() {
            return Err(SnapError::ZeroDenominator);
        }
        Ok(self.rounded(&(self.to_rational() / other.to_rational()), other))
    }

    fn rounded(&self, exact: &BigRational, other: &Real) -> Real {
        Real::from_rational(exact, self.precision.max(other.precision), RoundingMode::Nearest)
    }

    /// Square root rounded to nearest at `precision` bits.
    pub fn sqrt(&self, precision: u32) -> Result<Real> {
        sqrt_rational(&self.to_rational(), precision)
    }
}

/// Square root of a non-negative rational, rounded to nearest at `precision` bits.
///
/// `sqrt(n/d) = sqrt(n·d) / d`; the integer root is taken with enough guard
/// bits that an inexact root is replaced by the midpoint of its bracketing
/// interval without affecting the final rounding.
pub fn sqrt_rational(value: &BigRational, precision: u32) -> Result<Real> {
    if value.is_negative() {
        return Err(SnapError::NegativeRadicand(value.clone()));
    }
    if value.is_zero() {
        return Ok(Real::zero(precision));
    }
    let product = value.numer() * value.denom();
    let guard = (precision as i64 + 16 - product.bits() as i64 / 2).max(0) as u64;
    let scaled = &product << (2 * guard);
    let root = scaled.sqrt();
    let scale = value.denom() * pow2(guard);
    let approx = if &root * &root == scaled {
        BigRational::new(root, scale)
    } else {
        BigRational::new((root << 1u32) + BigInt::one(), scale << 1u32)
    };
    Ok(Real::from_rational(&approx, precision, RoundingMode::Nearest))
}

/// `(floor(n / (d·2^e)), remainder, divisor)` with the shift applied to
/// whichever side keeps everything integral.
fn scaled_div_rem(numer: &BigInt, denom: &BigInt, exponent: i64) -> (BigInt, BigInt, BigInt) {
    if exponent >= 0 {
        let divisor = denom << (exponent as u64);
        let (q, r) = numer.div_rem(&divisor);
        (q, r, divisor)
    } else {
        let shifted = numer << exponent.unsigned_abs();
        let (q, r) = shifted.div_rem(denom);
        (q, r, denom.clone())
    }
}

impl TryFrom<f64> for Real {
    type Error = SnapError;

    fn try_from(x: f64) -> Result<Self> {
        Real::from_f64(x)
    }
}
