//! Parametric curve primitives for Gothic architectural profiles.
//!
//! This crate turns a handful of numeric parameters into deterministic,
//! tessellated curve paths that downstream crates extrude, loft and sweep
//! into meshes:
//!
//! - [`PointedArch`] - Two-centred pointed arch, scaled to a given rise
//! - [`LancetArch`] - Arch with blended curvature, semicircle to lancet
//! - [`CircularArc`] / [`Circle`] - Circular geometry
//! - [`CubicBezier`] - Cubic Bézier segment for flying arches and spouts
//! - [`CurvePath`] - The sampled, immutable output of every builder
//!
//! # Core Trait
//!
//! All curve types implement [`Curve`], which evaluates a point at
//! `t ∈ [0, 1]` and samples the curve into a [`CurvePath`].
//!
//! # Example
//!
//! ```
//! use curve_types::{lancet_arch, pointed_arch};
//!
//! // An equilateral-ish arch 2 wide and 1 high, tessellated into 8 points
//! let arch = pointed_arch(2.0, 1.0, 8).unwrap();
//! assert_eq!(arch.len(), 8);
//!
//! // Identical parameters always give bit-identical points
//! assert_eq!(arch, pointed_arch(2.0, 1.0, 8).unwrap());
//!
//! // Curvature 0 is a semicircle
//! let round = lancet_arch(2.0, 0.0, 9).unwrap();
//! assert!((round.points()[4].z - 1.0).abs() < 1e-12);
//! ```
//!
//! # Coordinate System
//!
//! Right-handed, X width, Y depth, Z height. Arch profiles lie in the
//! elevation plane `y = 0`.
//!
//! # Validation
//!
//! Builders fail with [`CurveError::InvalidParameters`] on non-finite or
//! non-positive dimensions, curvature outside `[0, 1]` and segment counts
//! below 3. Values are never clamped.
//!
//! # Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for all types

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![allow(clippy::many_single_char_names, clippy::suboptimal_flops)]

mod arc;
mod arch;
mod bezier;
mod error;
mod path;
mod traits;

pub use arc::{Circle, CircularArc, circle, circular_arc, plane_axes};
pub use arch::{
    LancetArch, PointedArch, equilateral_rise, lancet_arch, pointed_arch, pointed_arch_half,
};
pub use bezier::{CubicBezier, cubic_ease};
pub use error::CurveError;
pub use path::CurvePath;
pub use traits::Curve;

pub use nalgebra::{Point2, Point3, Vector3};

/// Result type for curve operations.
pub type Result<T> = std::result::Result<T, CurveError>;
