//! Exact rational points on the unit n-sphere.
//!
//! `spheresnap` turns a real point on (or near) `S^(n-1)` into a rational
//! point whose squared coordinates sum to exactly 1, while bounding either
//! the distance moved or the size of the denominators.
//!
//! The pipeline: an optional normalization, a pole-adaptive stereographic
//! projection ([`projection`]), rational snapping of the plane coordinates
//! either independently ([`coordinate`]) or with one shared denominator
//! ([`simultaneous`]), and the inverse projection, which is exact on the
//! sphere by construction.
//!
//! ```no_run
//! use spheresnap::{snap_f64, SnapSettings, StrategyFlags};
//!
//! let settings = SnapSettings::default()
//!     .with_flags(StrategyFlags::PLANE | StrategyFlags::LLL)
//!     .with_significands(24);
//! let outcome = snap_f64(&[0.48, 0.6, 0.64], &settings).unwrap();
//! assert!(outcome.is_on_unit_sphere());
//! ```

pub mod coordinate;
pub mod error;
pub mod flags;
pub mod interval;
pub mod math;
pub mod projection;
pub mod real;
pub mod simultaneous;
pub mod snap;
pub mod types;

pub use error::{Result, SnapError};
pub use flags::StrategyFlags;
pub use projection::{plane_to_sphere, position_on_sphere, sphere_to_plane, SphereScalar};
pub use real::{Real, RoundingMode};
pub use snap::{approximate_point, snap, snap_f64, snap_points, snap_rational, Approximation, SnapOutcome};
pub use types::{PoleDescriptor, PrecisionSpec, SnapSettings};
