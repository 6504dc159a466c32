//! Spires and pinnacles.

use std::f64::consts::TAU;

use curve_types::{CurvePath, circle};
use mesh_from_curves::{LoftOptions, loft};
use mesh_types::MeshGraph;
use nalgebra::{Point3, Vector3};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{
    GenerateError, GenerateResult, require_count, require_positive, require_unit,
};
use crate::structure::{Structure, StructureKind};

/// Parameters for [`generate_spire`].
///
/// # Example
///
/// ```
/// use mesh_gothic::SpireParams;
///
/// let params = SpireParams::new(1.5, 9.0)
///     .unwrap()
///     .with_pinnacles(4)
///     .with_apex_loop(0.2);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpireParams {
    /// Circumradius of the base polygon.
    pub base_radius: f64,
    /// Height of the tip above the base.
    pub height: f64,
    /// Sides of every section (≥ 3).
    pub sides: usize,
    /// Sections below the tip (≥ 1).
    pub tiers: usize,
    /// How concave the taper is, in `[0, 1]`; 0 is a straight cone.
    pub curvature: f64,
    /// Number of pinnacles around the base.
    pub pinnacles: usize,
    /// Circumradius of each pinnacle's base.
    pub pinnacle_radius: f64,
    /// Height of each pinnacle.
    pub pinnacle_height: f64,
    /// Cut an edge loop this fraction of the way down from the tip.
    pub apex_loop: Option<f64>,
}

impl Default for SpireParams {
    fn default() -> Self {
        Self {
            base_radius: 1.0,
            height: 6.0,
            sides: 8,
            tiers: 4,
            curvature: 0.5,
            pinnacles: 0,
            pinnacle_radius: 0.2,
            pinnacle_height: 1.5,
            apex_loop: None,
        }
    }
}

impl SpireParams {
    /// Spire of the given base radius and height.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidParameters`] for a non-positive
    /// radius or height.
    pub fn new(base_radius: f64, height: f64) -> GenerateResult<Self> {
        let params = Self {
            base_radius,
            height,
            ..Self::default()
        };
        params.validate()?;
        Ok(params)
    }

    /// Set the number of sides.
    #[must_use]
    pub fn with_sides(mut self, sides: usize) -> Self {
        self.sides = sides;
        self
    }

    /// Set the number of tiers and the taper curvature.
    #[must_use]
    pub fn with_profile(mut self, tiers: usize, curvature: f64) -> Self {
        self.tiers = tiers;
        self.curvature = curvature;
        self
    }

    /// Set the number of pinnacles.
    #[must_use]
    pub fn with_pinnacles(mut self, pinnacles: usize) -> Self {
        self.pinnacles = pinnacles;
        self
    }

    /// Set the pinnacle size.
    #[must_use]
    pub fn with_pinnacle_size(mut self, radius: f64, height: f64) -> Self {
        self.pinnacle_radius = radius;
        self.pinnacle_height = height;
        self
    }

    /// Cut an edge loop around the tip.
    #[must_use]
    pub fn with_apex_loop(mut self, fraction: f64) -> Self {
        self.apex_loop = Some(fraction);
        self
    }

    /// Check every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidParameters`] naming the first
    /// parameter out of range.
    pub fn validate(&self) -> GenerateResult<()> {
        require_positive("base_radius", self.base_radius)?;
        require_positive("height", self.height)?;
        require_count("sides", self.sides, 3)?;
        require_count("tiers", self.tiers, 1)?;
        require_unit("curvature", self.curvature)?;
        require_positive("pinnacle_radius", self.pinnacle_radius)?;
        require_positive("pinnacle_height", self.pinnacle_height)?;
        if let Some(fraction) = self.apex_loop {
            if !(fraction > 0.0 && fraction < 1.0) {
                return Err(GenerateError::invalid(
                    "apex_loop",
                    format!("{fraction} must lie strictly between 0 and 1"),
                ));
            }
        }
        Ok(())
    }

    /// Cross-sections of the spire body, base first.
    ///
    /// Section `k` sits at `height * k / tiers` with radius
    /// `base_radius * (1 - k / tiers)^(1 + curvature)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid.
    pub fn sections(&self) -> GenerateResult<Vec<CurvePath>> {
        self.validate()?;
        (0..self.tiers)
            .map(|k| {
                let t = k as f64 / self.tiers as f64;
                let radius = self.base_radius * (1.0 - t).powf(1.0 + self.curvature);
                Ok(circle(
                    Point3::new(0.0, 0.0, self.height * t),
                    radius,
                    Vector3::z(),
                    self.sides,
                )?)
            })
            .collect()
    }
}

/// Build a spire.
///
/// The sections are lofted into a capped body that closes in a fan at the
/// tip. With `apex_loop` set, an edge loop is cut around the tip. Pinnacles
/// are separate cones standing just outside the base, one per equal turn.
///
/// # Errors
///
/// Returns [`GenerateError::InvalidParameters`] for invalid parameters.
///
/// # Example
///
/// ```
/// use mesh_gothic::{SpireParams, generate_spire};
///
/// let spire = generate_spire(&SpireParams::default().with_pinnacles(4)).unwrap();
/// assert_eq!(spire.element_count(), 5);
/// assert!(spire.mesh.adjacency().is_watertight());
/// ```
pub fn generate_spire(params: &SpireParams) -> GenerateResult<Structure> {
    let sections = params.sections()?;
    let tip = Point3::new(0.0, 0.0, params.height);
    let mut body = loft(&sections, &LoftOptions::default().with_apex(tip))?;

    if let Some(fraction) = params.apex_loop {
        let tip_vertex = body.vertex_count() as u32 - 1;
        let ring = body.add_apex_edge_loop(Some(tip_vertex), fraction)?;
        debug!("Spire: {}-vertex edge loop cut at {fraction}", ring.len());
    }

    let mut structure = Structure::new(StructureKind::Spire);
    structure.add_part("spire", &body);
    for k in 0..params.pinnacles {
        let pinnacle = pinnacle(params, k)?;
        structure.add_part(format!("pinnacle-{k}"), &pinnacle);
    }

    debug!(
        "Spire: {} tiers, {} pinnacles, {} faces",
        params.tiers,
        params.pinnacles,
        structure.mesh.face_count()
    );
    Ok(structure)
}

fn pinnacle(params: &SpireParams, index: usize) -> GenerateResult<MeshGraph> {
    let angle = TAU * index as f64 / params.pinnacles as f64;
    let distance = params.base_radius + params.pinnacle_radius;
    let center = Point3::new(distance * angle.cos(), distance * angle.sin(), 0.0);
    let base = circle(center, params.pinnacle_radius, Vector3::z(), params.sides)?;
    let options = LoftOptions::default().with_apex(center + Vector3::z() * params.pinnacle_height);
    Ok(loft(&[base], &options)?)
}
