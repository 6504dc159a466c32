//! Gothic arch profiles.
//!
//! Arches stand in the elevation plane: X runs across the opening, Z points
//! up and Y is zero. The opening is centred on the origin, so the left
//! springing point is `(-span/2, 0, 0)` and the right one `(span/2, 0, 0)`.
//! Curves run from left springing over the apex to right springing.

use crate::bezier::cubic_ease;
use crate::error::{require_positive, require_segments, require_unit};
use crate::{Curve, CurveError, CurvePath, Result};
use nalgebra::Point3;
use std::f64::consts::{FRAC_PI_3, PI};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rise of an equilateral pointed arch: `span * √3 / 2`.
#[must_use]
pub fn equilateral_rise(span: f64) -> f64 {
    span * 3.0_f64.sqrt() / 2.0
}

/// A two-centred pointed arch.
///
/// Each half is a circular arc of radius equal to the span, centred on the
/// opposite springing point; the two meet at the apex. The equilateral
/// profile is then scaled vertically so the apex sits at `rise`.
///
/// # Example
///
/// ```
/// use curve_types::{Curve, PointedArch};
///
/// let arch = PointedArch::new(2.0, 1.0).unwrap();
/// let apex = arch.point_at(0.5);
/// assert!(apex.x.abs() < 1e-12);
/// assert!((apex.z - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointedArch {
    span: f64,
    rise: f64,
}

impl PointedArch {
    /// Create a pointed arch.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidParameters`] unless both `span` and
    /// `rise` are finite and positive.
    pub fn new(span: f64, rise: f64) -> Result<Self> {
        Ok(Self {
            span: require_positive("span", span)?,
            rise: require_positive("rise", rise)?,
        })
    }

    /// An arch whose rise is the natural equilateral rise.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidParameters`] for a non-positive span.
    pub fn equilateral(span: f64) -> Result<Self> {
        let span = require_positive("span", span)?;
        Ok(Self {
            span,
            rise: equilateral_rise(span),
        })
    }

    /// Width of the opening.
    #[must_use]
    pub fn span(&self) -> f64 {
        self.span
    }

    /// Height of the apex above the springing line.
    #[must_use]
    pub fn rise(&self) -> f64 {
        self.rise
    }

    /// Sample only the rising half, springing to apex inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidParameters`] if `segments < 3`.
    pub fn sample_half(&self, segments: usize) -> Result<CurvePath> {
        require_segments(segments, 3)?;
        let divisor = (segments - 1) as f64;
        let points = (0..segments)
            .map(|i| self.point_at(0.5 * i as f64 / divisor))
            .collect();
        CurvePath::open(points)
    }
}

impl Curve for PointedArch {
    fn point_at(&self, t: f64) -> Point3<f64> {
        let half = self.span / 2.0;
        if t <= 0.0 {
            return Point3::new(-half, 0.0, 0.0);
        }
        if t >= 1.0 {
            return Point3::new(half, 0.0, 0.0);
        }
        let scale = self.rise / equilateral_rise(self.span);
        let (center_x, angle) = if t <= 0.5 {
            // Left half is centred on the right springing point
            (half, PI - 2.0 * t * FRAC_PI_3)
        } else {
            (-half, (2.0 - 2.0 * t) * FRAC_PI_3)
        };
        let (sin, cos) = angle.sin_cos();
        Point3::new(center_x + self.span * cos, 0.0, self.span * sin * scale)
    }

    fn sample(&self, count: usize) -> Result<CurvePath> {
        sample_through_apex(self, count)
    }
}

/// A lancet arch with blended curvature.
///
/// The two arc centres sit on the springing line, offset from the middle by
/// `span * ease(curvature)`. A curvature of 0 gives a semicircle, 0.5 the
/// equilateral arch and 1 a sharp lancet whose radius is 1.5 × span. The
/// easing is a cubic Bézier ramp (see [`cubic_ease`]) whose two inner
/// control values default to `(0, 1)` and can be tuned with
/// [`LancetArch::with_sharpness`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LancetArch {
    span: f64,
    curvature: f64,
    sharpness_in: f64,
    sharpness_out: f64,
}

impl LancetArch {
    /// Allowed range for the easing control values.
    pub const SHARPNESS_RANGE: std::ops::RangeInclusive<f64> = -2.0..=2.0;

    /// Create a lancet arch with the default easing.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidParameters`] for a non-positive span or a
    /// curvature outside `[0, 1]`.
    pub fn new(span: f64, curvature: f64) -> Result<Self> {
        Ok(Self {
            span: require_positive("span", span)?,
            curvature: require_unit("curvature", curvature)?,
            sharpness_in: 0.0,
            sharpness_out: 1.0,
        })
    }

    /// Replace the easing control values.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidParameters`] if either value lies outside
    /// [`Self::SHARPNESS_RANGE`] or the resulting centre offset is negative.
    pub fn with_sharpness(mut self, sharpness_in: f64, sharpness_out: f64) -> Result<Self> {
        for (name, value) in [("sharpness_in", sharpness_in), ("sharpness_out", sharpness_out)] {
            if !value.is_finite() || !Self::SHARPNESS_RANGE.contains(&value) {
                return Err(CurveError::invalid(name, format!("{value} is outside [-2, 2]")));
            }
        }
        self.sharpness_in = sharpness_in;
        self.sharpness_out = sharpness_out;
        if self.center_offset() < 0.0 {
            return Err(CurveError::invalid(
                "sharpness_in",
                "easing undershoots below a semicircle",
            ));
        }
        Ok(self)
    }

    /// Width of the opening.
    #[must_use]
    pub fn span(&self) -> f64 {
        self.span
    }

    /// Distance of each arc centre from the middle of the opening.
    #[must_use]
    pub fn center_offset(&self) -> f64 {
        self.span * cubic_ease(self.curvature, self.sharpness_in, self.sharpness_out)
    }

    /// Radius of both arcs.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.span / 2.0 + self.center_offset()
    }

    /// Natural apex height.
    #[must_use]
    pub fn rise(&self) -> f64 {
        let d = self.center_offset();
        (self.radius().powi(2) - d * d).sqrt()
    }
}

impl Curve for LancetArch {
    fn point_at(&self, t: f64) -> Point3<f64> {
        let half = self.span / 2.0;
        if t <= 0.0 {
            return Point3::new(-half, 0.0, 0.0);
        }
        if t >= 1.0 {
            return Point3::new(half, 0.0, 0.0);
        }
        let d = self.center_offset();
        let radius = self.radius();
        let apex_angle = self.rise().atan2(-d);
        let (center_x, angle) = if t <= 0.5 {
            (d, PI - 2.0 * t * (PI - apex_angle))
        } else {
            (-d, (2.0 - 2.0 * t) * (PI - apex_angle))
        };
        let (sin, cos) = angle.sin_cos();
        Point3::new(center_x + radius * cos, 0.0, radius * sin)
    }

    fn sample(&self, count: usize) -> Result<CurvePath> {
        sample_through_apex(self, count)
    }
}

/// Sample an arch so that the apex at `t = 0.5` is always one of the
/// `count` points.
///
/// The rising half gets `ceil(count / 2)` points, apex included, and the
/// falling half the rest. Odd counts come out evenly spaced in `t`; even
/// counts space the falling half slightly wider.
fn sample_through_apex(arch: &impl Curve, count: usize) -> Result<CurvePath> {
    require_segments(count, 3)?;
    let rising = count.div_ceil(2);
    let falling = count - rising;
    let up = (rising - 1) as f64;
    let down = falling as f64;
    let points = (0..rising)
        .map(|i| arch.point_at(0.5 * i as f64 / up))
        .chain((1..=falling).map(|j| arch.point_at(0.5 + 0.5 * j as f64 / down)))
        .collect();
    CurvePath::open(points)
}

/// Sample a pointed arch from left springing to right springing.
///
/// # Errors
///
/// Returns [`CurveError::InvalidParameters`] for non-positive dimensions or
/// fewer than 3 segments.
///
/// # Example
///
/// ```
/// use curve_types::pointed_arch;
///
/// let profile = pointed_arch(2.0, 1.0, 8).unwrap();
/// assert_eq!(profile.len(), 8);
/// assert!(!profile.is_closed());
/// ```
pub fn pointed_arch(span: f64, rise: f64, segments: usize) -> Result<CurvePath> {
    PointedArch::new(span, rise)?.sample(segments)
}

/// Sample the rising half of a pointed arch (springing to apex).
///
/// # Errors
///
/// See [`pointed_arch`].
pub fn pointed_arch_half(span: f64, rise: f64, segments: usize) -> Result<CurvePath> {
    PointedArch::new(span, rise)?.sample_half(segments)
}

/// Sample a lancet arch with the default easing.
///
/// # Errors
///
/// Returns [`CurveError::InvalidParameters`] for a non-positive span, a
/// curvature outside `[0, 1]` or fewer than 3 segments.
pub fn lancet_arch(span: f64, curvature: f64, segments: usize) -> Result<CurvePath> {
    LancetArch::new(span, curvature)?.sample(segments)
}
