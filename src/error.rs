//! Error type shared by every snapping stage.

use num_rational::BigRational;

/// Result type for snapping operations.
pub type Result<T> = std::result::Result<T, SnapError>;

/// Errors that can occur while projecting or snapping a point.
///
/// All variants are fatal for the call that produced them; nothing is
/// retried or silently downgraded to an approximate result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SnapError {
    #[error("point has no coordinates")]
    EmptyPoint,

    #[error("{strategy} requires {expected} coordinates, got {found}")]
    DimensionMismatch {
        strategy: &'static str,
        expected: &'static str,
        found: usize,
    },

    #[error("unsupported snap type: {0}")]
    UnsupportedSnapType(String),

    #[error("no projection domain selected")]
    NoProjectionDomain,

    #[error("division by zero")]
    ZeroDenominator,

    #[error("invalid precision: {0}")]
    InvalidPrecision(String),

    #[error("non-finite input value: {0}")]
    NonFinite(f64),

    #[error("invalid pole {pole} for a point of dimension {dim}")]
    InvalidPole { pole: i64, dim: usize },

    #[error("square root of negative value {0}")]
    NegativeRadicand(BigRational),

    #[error("value {value} is outside the fixed-point range [-1, 1]")]
    FixedPointRange { value: BigRational },

    #[error("lattice reduction failed: {0}")]
    ReductionFailed(String),

    #[error("target precision not reached after {iterations} iterations")]
    PrecisionUnattainable { iterations: usize },

    /// Reserved for strategies that a build does not provide. Every strategy
    /// in this crate is always compiled in, so nothing returns it today.
    #[error("unimplemented configuration: {0}")]
    Unimplemented(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn messages_name_the_offending_value() {
        let value = BigRational::new(BigInt::from(5), BigInt::from(4));
        assert_eq!(
            SnapError::FixedPointRange { value }.to_string(),
            "value 5/4 is outside the fixed-point range [-1, 1]"
        );
        assert_eq!(
            SnapError::Unimplemented("lattice reduction".into()).to_string(),
            "unimplemented configuration: lattice reduction"
        );
    }
}
