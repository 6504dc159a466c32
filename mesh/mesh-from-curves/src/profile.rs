//! Planar cross-section profiles for sweeping.
//!
//! Profiles are closed polygons in a local `(u, v)` plane, counter-clockwise.
//! [`Frame::place`](crate::Frame::place) maps `u` onto a frame's normal and
//! `v` onto its binormal.

use std::f64::consts::TAU;

use nalgebra::Point2;

use crate::error::{SweepError, SweepResult, require_positive};

/// Regular polygon of circumradius `radius`, first corner on `+u`.
///
/// # Errors
///
/// Returns [`SweepError::InvalidParameters`] for a non-positive radius or
/// fewer than 3 sides.
///
/// # Example
///
/// ```
/// use mesh_from_curves::polygon_profile;
///
/// let hexagon = polygon_profile(1.0, 6).unwrap();
/// assert_eq!(hexagon.len(), 6);
/// assert!((hexagon[0].x - 1.0).abs() < 1e-12);
/// ```
pub fn polygon_profile(radius: f64, sides: usize) -> SweepResult<Vec<Point2<f64>>> {
    require_positive("radius", radius)?;
    if sides < 3 {
        return Err(SweepError::invalid(
            "sides",
            format!("{sides} is below the minimum of 3"),
        ));
    }
    Ok((0..sides)
        .map(|i| {
            let (sin, cos) = (TAU * i as f64 / sides as f64).sin_cos();
            Point2::new(radius * cos, radius * sin)
        })
        .collect())
}

/// Axis-aligned rectangle centred on the origin, `width` along `u`.
///
/// # Errors
///
/// Returns [`SweepError::InvalidParameters`] for a non-positive size.
pub fn rectangle_profile(width: f64, height: f64) -> SweepResult<Vec<Point2<f64>>> {
    let hw = require_positive("width", width)? / 2.0;
    let hh = require_positive("height", height)? / 2.0;
    Ok(vec![
        Point2::new(-hw, -hh),
        Point2::new(hw, -hh),
        Point2::new(hw, hh),
        Point2::new(-hw, hh),
    ])
}

/// Twice the signed area (shoelace); positive when counter-clockwise.
pub(crate) fn signed_area2(profile: &[Point2<f64>]) -> f64 {
    let n = profile.len();
    (0..n)
        .map(|i| {
            let (a, b) = (profile[i], profile[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum()
}

/// Validate a profile and return it counter-clockwise.
pub(crate) fn counter_clockwise(profile: &[Point2<f64>]) -> SweepResult<Vec<Point2<f64>>> {
    if profile.len() < 3 {
        return Err(SweepError::invalid(
            "profile",
            format!("need at least 3 points, got {}", profile.len()),
        ));
    }
    if profile.iter().any(|p| !(p.x.is_finite() && p.y.is_finite())) {
        return Err(SweepError::invalid("profile", "non-finite coordinate"));
    }
    let area = signed_area2(profile);
    if area.abs() <= f64::EPSILON {
        return Err(SweepError::invalid("profile", "profile encloses no area"));
    }
    let mut out = profile.to_vec();
    if area < 0.0 {
        out.reverse();
    }
    Ok(out)
}
