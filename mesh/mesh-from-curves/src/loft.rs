//! Lofting between corresponding cross-sections.

use curve_types::CurvePath;
use mesh_types::MeshGraph;
use nalgebra::{Point3, Vector3};
use tracing::debug;

use crate::error::{SweepError, SweepResult};
use crate::ribbon::{Caps, add_caps, add_polygon, bridge_rows};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Points closer than this (relative to the loft's extent) share a vertex.
const COINCIDENT_TOLERANCE: f64 = 1e-9;

/// Options for [`loft`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoftOptions {
    /// Caps on the first and last section (closed sections only).
    pub caps: Caps,
    /// Close the loft with a fan of triangles to this point instead of an
    /// end cap.
    pub apex: Option<Point3<f64>>,
}

impl Default for LoftOptions {
    fn default() -> Self {
        Self {
            caps: Caps::BOTH,
            apex: None,
        }
    }
}

impl LoftOptions {
    /// Set which ends get a cap.
    #[must_use]
    pub fn with_caps(mut self, caps: Caps) -> Self {
        self.caps = caps;
        self
    }

    /// Finish the loft at a single apex point.
    #[must_use]
    pub fn with_apex(mut self, apex: Point3<f64>) -> Self {
        self.apex = Some(apex);
        self
    }
}

/// Loft a surface through a sequence of sections.
///
/// All sections must have the same number of points and be either all
/// closed or all open. Point `i` of each section is joined to point `i` of
/// the next by quads. Closed sections make a tube wound outward (the
/// sections are reversed internally when their normal points back toward
/// the start), with optional caps and an optional apex fan replacing the end
/// cap. Open sections make a sheet in the given order.
///
/// Where a point coincides with the same point of the previous section the
/// vertex is shared and the adjoining quads collapse to triangles, so ribs
/// that converge on a crown loft cleanly.
///
/// Faces are the bridging quads first, then the start cap, then the end cap
/// or apex fan.
///
/// # Errors
///
/// - [`SweepError::TooFewSections`] for fewer than two sections, or none
///   when an apex is given
/// - [`SweepError::SectionMismatch`] if point counts differ
/// - [`SweepError::InvalidParameters`] for mixed open and closed sections,
///   or an apex on open sections
///
/// # Example
///
/// ```
/// use curve_types::{Point3, Vector3, circle};
/// use mesh_from_curves::{LoftOptions, loft};
///
/// let base = circle(Point3::origin(), 1.0, Vector3::z(), 6).unwrap();
/// let cone = loft(&[base], &LoftOptions::default().with_apex(Point3::new(0.0, 0.0, 2.0))).unwrap();
///
/// assert_eq!(cone.face_count(), 1 + 6);
/// assert!(cone.adjacency().is_watertight());
/// ```
pub fn loft(sections: &[CurvePath], options: &LoftOptions) -> SweepResult<MeshGraph> {
    let required = if options.apex.is_some() { 1 } else { 2 };
    let Some(first) = sections.first().filter(|_| sections.len() >= required) else {
        return Err(SweepError::TooFewSections {
            required,
            actual: sections.len(),
        });
    };

    let closed = first.is_closed();
    let count = first.len();
    for (index, section) in sections.iter().enumerate().skip(1) {
        if section.len() != count {
            return Err(SweepError::SectionMismatch {
                section: index,
                expected: count,
                actual: section.len(),
            });
        }
        if section.is_closed() != closed {
            return Err(SweepError::invalid(
                "sections",
                format!("section {index} is open while section 0 is closed, or vice versa"),
            ));
        }
    }
    if options.apex.is_some() && !closed {
        return Err(SweepError::invalid("apex", "an apex needs closed sections"));
    }

    let reverse = closed && points_backward(sections, options.apex);
    let tolerance = COINCIDENT_TOLERANCE * extent(sections, options.apex);

    let mut mesh = MeshGraph::with_capacity(count * sections.len() + 1, count * sections.len());
    let mut rows: Vec<Vec<u32>> = Vec::with_capacity(sections.len());
    for section in sections {
        let mut points = section.points().to_vec();
        if reverse {
            points.reverse();
        }
        let row = points
            .iter()
            .enumerate()
            .map(|(i, &p)| match rows.last() {
                Some(prev) => {
                    let shared: u32 = prev[i];
                    match mesh.position(shared) {
                        Some(q) if (q - p).norm() <= tolerance => shared,
                        _ => mesh.add_vertex(p),
                    }
                }
                None => mesh.add_vertex(p),
            })
            .collect();
        rows.push(row);
    }

    let sides = bridge_rows(&mut mesh, &rows, closed, false)?;
    let mut capped = 0;
    if closed {
        let caps = Caps {
            start: options.caps.start,
            end: options.caps.end && options.apex.is_none(),
        };
        capped = add_caps(&mut mesh, &rows, caps)?;
        if let (Some(apex), Some(last)) = (options.apex, rows.last()) {
            let tip = mesh.add_vertex(apex);
            for i in 0..count {
                add_polygon(&mut mesh, &[last[i], last[(i + 1) % count], tip])?;
            }
        }
    }

    debug!(
        "Lofted {} sections of {} points: {} side faces, {} caps",
        sections.len(),
        count,
        sides,
        capped
    );
    Ok(mesh)
}

/// Whether the sections' normal points away from where the loft is going.
fn points_backward(sections: &[CurvePath], apex: Option<Point3<f64>>) -> bool {
    let first = &sections[0];
    let target = apex.or_else(|| sections.last().map(CurvePath::centroid));
    let direction = target.map_or_else(Vector3::zeros, |t| t - first.centroid());
    first.newell_normal().dot(&direction) < 0.0
}

/// Largest coordinate magnitude involved, at least 1.
fn extent(sections: &[CurvePath], apex: Option<Point3<f64>>) -> f64 {
    sections
        .iter()
        .flat_map(CurvePath::points)
        .chain(apex.as_ref())
        .map(|p| p.coords.amax())
        .fold(1.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use curve_types::{circle, pointed_arch_half};
    use std::f64::consts::PI;

    fn ring(radius: f64, z: f64, sides: usize) -> CurvePath {
        circle(Point3::new(0.0, 0.0, z), radius, Vector3::z(), sides).unwrap()
    }

    #[test]
    fn test_frustum_is_closed_solid() {
        let sections = [ring(2.0, 0.0, 8), ring(1.0, 3.0, 8)];
        let mesh = loft(&sections, &LoftOptions::default()).unwrap();
        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.face_count(), 8 + 2);
        assert!(mesh.adjacency().is_watertight());
        assert!(mesh.signed_volume() > 0.0);
    }

    #[test]
    fn test_downward_loft_is_still_outward() {
        let sections = [ring(1.0, 3.0, 8), ring(2.0, 0.0, 8)];
        let mesh = loft(&sections, &LoftOptions::default()).unwrap();
        assert!(mesh.signed_volume() > 0.0);
    }

    #[test]
    fn test_apex_fan() {
        let sections = [ring(1.0, 0.0, 6), ring(0.5, 1.0, 6)];
        let options = LoftOptions::default().with_apex(Point3::new(0.0, 0.0, 2.0));
        let mesh = loft(&sections, &options).unwrap();
        assert_eq!(mesh.vertex_count(), 13);
        // 6 sides + start cap + 6 fan triangles, no end cap
        assert_eq!(mesh.face_count(), 13);
        assert!(mesh.adjacency().is_watertight());
        assert!(mesh.signed_volume() > 0.0);
    }

    #[test]
    fn test_cone_volume() {
        let options = LoftOptions::default().with_apex(Point3::new(0.0, 0.0, 3.0));
        let mesh = loft(&[ring(1.0, 0.0, 4)], &options).unwrap();
        // Square pyramid with base diagonal 2: area 2, height 3
        assert_relative_eq!(mesh.signed_volume(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_open_sections_share_converging_points() {
        let rib = pointed_arch_half(2.0, 1.5, 6).unwrap();
        let turn = nalgebra::Isometry3::rotation(Vector3::z() * (PI / 2.0));
        let other = rib.transformed(&turn);
        let mesh = loft(&[rib, other], &LoftOptions::default()).unwrap();

        // The crown is shared, so the top quad is a triangle
        assert_eq!(mesh.vertex_count(), 11);
        assert_eq!(mesh.face_count(), 5);
        assert_eq!(mesh.faces()[4].len(), 3);
        assert_eq!(mesh.adjacency().boundary_edge_count(), 5 + 5 + 1);
    }

    #[test]
    fn test_errors() {
        let options = LoftOptions::default();
        assert!(matches!(
            loft(&[ring(1.0, 0.0, 6)], &options),
            Err(SweepError::TooFewSections { required: 2, actual: 1 })
        ));
        assert!(matches!(
            loft(&[], &options.clone().with_apex(Point3::origin())),
            Err(SweepError::TooFewSections { required: 1, actual: 0 })
        ));
        assert!(matches!(
            loft(&[ring(1.0, 0.0, 6), ring(1.0, 1.0, 5)], &options),
            Err(SweepError::SectionMismatch { section: 1, expected: 6, actual: 5 })
        ));

        let open = CurvePath::open(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)]).unwrap();
        let open_up = open.translated(Vector3::z());
        assert!(loft(&[open.clone(), open_up], &options).is_ok());
        assert!(matches!(
            loft(&[open], &options.with_apex(Point3::new(0.0, 0.0, 1.0))),
            Err(SweepError::InvalidParameters { parameter: "apex", .. })
        ));
    }
}
