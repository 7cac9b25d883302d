//! Strategy selection bitmask.
//!
//! A [`StrategyFlags`] value picks the projection domain, the snapping
//! strategy, the guarantee mode for joint strategies and whether the input
//! is normalized first. Combine flags with `|`.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::error::{Result, SnapError};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StrategyFlags(u32);

impl StrategyFlags {
    pub const NONE: Self = Self(0);

    // -- Projection domain --

    /// Snap each sphere coordinate, then project through the plane to restore
    /// the unit norm.
    pub const SPHERE: Self = Self(1 << 0);
    /// Project first, snap the plane coordinates, project back. The precise path.
    pub const PLANE: Self = Self(1 << 1);

    // -- Per-coordinate strategies --

    pub const CONTINUED_FRACTION: Self = Self(1 << 2);
    pub const FIXED_POINT: Self = Self(1 << 3);
    pub const FLOAT_ROUND: Self = Self(1 << 4);

    // -- Joint (shared denominator) strategies --

    /// Two-dimensional simultaneous continued fraction.
    pub const JACOBI_PERRON: Self = Self(1 << 5);
    /// Lattice reduction with greedy doubling of the denominator bound.
    pub const LLL: Self = Self(1 << 6);
    /// Lattice reduction, single run with the bound derived from the precision.
    pub const LLL_FIXED: Self = Self(1 << 7);
    /// Lattice reduction, single run with the bound taken from Lagarias'
    /// theorem. Experimental.
    pub const LLL_SCALED: Self = Self(1 << 8);
    /// Exhaustive search over all denominators. Reference oracle only.
    pub const BRUTE_FORCE: Self = Self(1 << 9);

    /// Try every applicable strategy and keep the closest result.
    pub const AUTO: Self = Self(1 << 10);

    // -- Modifiers --

    /// Joint strategies bound the denominator instead of the distance.
    pub const BOUNDED_SIZE: Self = Self(1 << 11);
    /// Divide the input by its Euclidean norm before snapping.
    pub const NORMALIZE: Self = Self(1 << 12);

    const ALL: u32 = (1 << 13) - 1;

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Build from raw bits, rejecting unknown ones.
    pub fn from_bits(bits: u32) -> Result<Self> {
        if bits & !Self::ALL != 0 {
            return Err(SnapError::UnsupportedSnapType(format!("unknown flag bits {bits:#x}")));
        }
        Ok(Self(bits))
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn remove(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub const fn insert(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Same flags with every strategy bit (per-coordinate, joint and `AUTO`)
    /// cleared; the domain and modifier bits survive.
    pub const fn without_strategy(self) -> Self {
        self.remove(Self(
            Self::CONTINUED_FRACTION.0
                | Self::FIXED_POINT.0
                | Self::FLOAT_ROUND.0
                | Self::JACOBI_PERRON.0
                | Self::LLL.0
                | Self::LLL_FIXED.0
                | Self::LLL_SCALED.0
                | Self::BRUTE_FORCE.0
                | Self::AUTO.0,
        ))
    }

    /// Any of the joint strategies that share one denominator across coordinates.
    pub const fn is_joint(self) -> bool {
        self.intersects(Self(
            Self::JACOBI_PERRON.0
                | Self::LLL.0
                | Self::LLL_FIXED.0
                | Self::LLL_SCALED.0
                | Self::BRUTE_FORCE.0,
        ))
    }
}

impl BitOr for StrategyFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for StrategyFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for StrategyFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(StrategyFlags, &str); 13] = [
            (StrategyFlags::SPHERE, "SPHERE"),
            (StrategyFlags::PLANE, "PLANE"),
            (StrategyFlags::CONTINUED_FRACTION, "CONTINUED_FRACTION"),
            (StrategyFlags::FIXED_POINT, "FIXED_POINT"),
            (StrategyFlags::FLOAT_ROUND, "FLOAT_ROUND"),
            (StrategyFlags::JACOBI_PERRON, "JACOBI_PERRON"),
            (StrategyFlags::LLL, "LLL"),
            (StrategyFlags::LLL_FIXED, "LLL_FIXED"),
            (StrategyFlags::LLL_SCALED, "LLL_SCALED"),
            (StrategyFlags::BRUTE_FORCE, "BRUTE_FORCE"),
            (StrategyFlags::AUTO, "AUTO"),
            (StrategyFlags::BOUNDED_SIZE, "BOUNDED_SIZE"),
            (StrategyFlags::NORMALIZE, "NORMALIZE"),
        ];
        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            write!(f, "StrategyFlags(NONE)")
        } else {
            write!(f, "StrategyFlags({})", names.join(" | "))
        }
    }
}
