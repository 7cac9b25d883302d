use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::error::{Result, SnapError};
use crate::flags::StrategyFlags;
use crate::math::{ceil, pow2, pow2_rational, DOUBLE_PRECISION};

/// Which coordinate a stereographic projection eliminated, and from which
/// hemisphere.
///
/// Stored as the signed 1-based index `k` with `1 <= |k| <= N`. A positive
/// value means the eliminated coordinate was non-negative ("upper").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoleDescriptor(i64);

impl PoleDescriptor {
    /// Validate a raw signed pole against the point dimension.
    pub fn new(value: i64, dim: usize) -> Result<Self> {
        let pole = Self(value);
        pole.check(dim)?;
        Ok(pole)
    }

    /// Pole for the 0-based coordinate `index`.
    pub fn from_index(index: usize, upper: bool) -> Self {
        let k = index as i64 + 1;
        Self(if upper { k } else { -k })
    }

    /// The signed 1-based descriptor.
    pub fn value(self) -> i64 {
        self.0
    }

    /// 0-based index of the eliminated coordinate.
    pub fn index(self) -> usize {
        (self.0.unsigned_abs() - 1) as usize
    }

    pub fn is_upper(self) -> bool {
        self.0 > 0
    }

    pub fn check(self, dim: usize) -> Result<()> {
        let k = self.0.unsigned_abs();
        if k == 0 || k as usize > dim {
            return Err(SnapError::InvalidPole { pole: self.0, dim });
        }
        Ok(())
    }
}

/// Target accuracy of a snapping call. Exactly one form governs a call.
#[derive(Clone, Debug, PartialEq)]
pub enum PrecisionSpec {
    /// Error `<= 2^-s` or denominator `<= 2^s`, depending on the strategy.
    Significands(u32),
    /// Explicit error bound.
    Epsilon(BigRational),
    /// Explicit bound on the (shared) denominator.
    MaxDenominator(BigInt),
}

impl Default for PrecisionSpec {
    fn default() -> Self {
        PrecisionSpec::Significands(DOUBLE_PRECISION)
    }
}

impl PrecisionSpec {
    pub fn validate(&self) -> Result<()> {
        match self {
            PrecisionSpec::Significands(_) => Ok(()),
            PrecisionSpec::Epsilon(e) if !e.is_positive() => {
                Err(SnapError::InvalidPrecision(format!("epsilon must be positive, got {e}")))
            }
            PrecisionSpec::MaxDenominator(n) if n < &BigInt::one() => {
                Err(SnapError::InvalidPrecision(format!("maximum denominator must be >= 1, got {n}")))
            }
            _ => Ok(()),
        }
    }

    /// Error bound implied by this precision.
    pub fn epsilon(&self) -> BigRational {
        match self {
            PrecisionSpec::Significands(s) => pow2_rational(-(*s as i64)),
            PrecisionSpec::Epsilon(e) => e.clone(),
            PrecisionSpec::MaxDenominator(n) => {
                BigRational::new(BigInt::one(), n.clone().max(BigInt::one()))
            }
        }
    }

    /// Denominator bound implied by this precision.
    pub fn max_denominator(&self) -> BigInt {
        match self {
            PrecisionSpec::Significands(s) => pow2(*s as u64),
            PrecisionSpec::Epsilon(e) if e.is_positive() => ceil(&e.recip()).max(BigInt::one()),
            PrecisionSpec::Epsilon(_) => BigInt::one(),
            PrecisionSpec::MaxDenominator(n) => n.clone().max(BigInt::one()),
        }
    }

    /// Bit budget for per-coordinate strategies: the smallest `s` with
    /// `2^-s <= epsilon`, or the largest `s` with `2^s <= max_denominator`.
    pub fn significands(&self) -> u32 {
        match self {
            PrecisionSpec::Significands(s) => *s,
            PrecisionSpec::Epsilon(_) => {
                let n = self.max_denominator();
                (n - BigInt::one()).bits() as u32
            }
            PrecisionSpec::MaxDenominator(n) if n.is_zero() => 0,
            PrecisionSpec::MaxDenominator(n) => (n.bits() as u32).saturating_sub(1),
        }
    }
}

/// Settings controlling a snap call.
///
/// Nothing here is process-wide; every call receives its settings explicitly.
#[derive(Clone, Debug, PartialEq)]
pub struct SnapSettings {
    pub flags: StrategyFlags,
    pub precision: PrecisionSpec,
    /// Cap on the greedy lattice-reduction doubling loop.
    pub max_iterations: usize,
    /// Bits used for real-valued projection and normalization. `None` picks
    /// the input precision plus guard bits.
    pub working_precision: Option<u32>,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            flags: StrategyFlags::PLANE | StrategyFlags::CONTINUED_FRACTION,
            precision: PrecisionSpec::default(),
            max_iterations: 64,
            working_precision: None,
        }
    }
}

impl SnapSettings {
    pub fn new(flags: StrategyFlags, precision: PrecisionSpec) -> Self {
        Self { flags, precision, ..Self::default() }
    }

    pub fn with_flags(mut self, flags: StrategyFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_significands(mut self, significands: u32) -> Self {
        self.precision = PrecisionSpec::Significands(significands);
        self
    }

    pub fn with_precision(mut self, precision: PrecisionSpec) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_working_precision(mut self, bits: u32) -> Self {
        self.working_precision = Some(bits);
        self
    }
}
