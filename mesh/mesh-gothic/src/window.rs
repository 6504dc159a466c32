//! Lancet windows and the walls that hold them.
//!
//! Window outlines stand in the wall's front plane (`y = 0`), centred on
//! `x = 0` with the sill at `z = sill`. A window is a recess open at the
//! front; [`wall_with_opening`] builds the slab it is merged into and
//! [`build_window_wall`] runs the whole path from curves to a repaired,
//! printable wall.

use curve_types::{CurvePath, LancetArch, lancet_arch, pointed_arch};
use mesh_assembly::{InsertionBoundary, MergeOptions, MergeReport, merge};
use mesh_from_curves::{Caps, extrude};
use mesh_types::MeshGraph;
use nalgebra::{Point2, Point3, Vector2, Vector3};
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{
    GenerateError, GenerateResult, require_count, require_non_negative, require_positive,
    require_unit,
};
use crate::structure::{Structure, StructureKind};

/// Shape of the window head above the springing line.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WindowHead {
    /// Two-centred pointed arch reaching exactly the window height.
    #[default]
    Pointed,
    /// Lancet arch of the given curvature in `[0, 1]`, scaled vertically to
    /// the window height.
    Lancet {
        /// 0 is a semicircle, 0.5 equilateral, 1 a sharp lancet.
        curvature: f64,
    },
}

/// Parameters for a lancet window.
///
/// # Example
///
/// ```
/// use mesh_gothic::{WindowHead, WindowParams};
///
/// let params = WindowParams::new(1.2, 3.0)
///     .unwrap()
///     .with_head(WindowHead::Lancet { curvature: 0.8 })
///     .with_start_fraction(0.5);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WindowParams {
    /// Width of the opening.
    pub width: f64,
    /// Height from sill to apex.
    pub height: f64,
    /// Fraction of the height taken by the straight jambs, in `[0, 1)`.
    /// Zero gives an opening that is all head.
    pub start_fraction: f64,
    /// Head shape.
    pub head: WindowHead,
    /// Points sampled along the head (≥ 3).
    pub segments: usize,
    /// How far the recess reaches into the wall.
    pub depth: f64,
    /// Height of the sill above the wall's base.
    pub sill: f64,
}

impl Default for WindowParams {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 2.5,
            start_fraction: 0.6,
            head: WindowHead::Pointed,
            segments: 8,
            depth: 0.3,
            sill: 0.5,
        }
    }
}

impl WindowParams {
    /// Window of the given opening size with default proportions.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidParameters`] for a non-positive
    /// width or height.
    pub fn new(width: f64, height: f64) -> GenerateResult<Self> {
        let params = Self {
            width,
            height,
            ..Self::default()
        };
        params.validate()?;
        Ok(params)
    }

    /// Set the jamb fraction.
    #[must_use]
    pub fn with_start_fraction(mut self, start_fraction: f64) -> Self {
        self.start_fraction = start_fraction;
        self
    }

    /// Set the head shape.
    #[must_use]
    pub fn with_head(mut self, head: WindowHead) -> Self {
        self.head = head;
        self
    }

    /// Set the number of head points.
    #[must_use]
    pub fn with_segments(mut self, segments: usize) -> Self {
        self.segments = segments;
        self
    }

    /// Set the recess depth.
    #[must_use]
    pub fn with_depth(mut self, depth: f64) -> Self {
        self.depth = depth;
        self
    }

    /// Set the sill height.
    #[must_use]
    pub fn with_sill(mut self, sill: f64) -> Self {
        self.sill = sill;
        self
    }

    /// Check every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidParameters`] naming the first
    /// parameter out of range.
    pub fn validate(&self) -> GenerateResult<()> {
        require_positive("width", self.width)?;
        require_positive("height", self.height)?;
        require_unit("start_fraction", self.start_fraction)?;
        if self.start_fraction >= 1.0 {
            return Err(GenerateError::invalid(
                "start_fraction",
                "jambs must leave room for the head",
            ));
        }
        if let WindowHead::Lancet { curvature } = self.head {
            require_unit("curvature", curvature)?;
        }
        require_count("segments", self.segments, 3)?;
        require_positive("depth", self.depth)?;
        require_non_negative("sill", self.sill)?;
        Ok(())
    }

    /// Height of the springing line above the wall's base.
    #[must_use]
    pub fn springing(&self) -> f64 {
        self.sill + self.height * self.start_fraction
    }
}

/// Closed outline of the window opening in the `y = 0` plane.
///
/// The head runs from the left springing over the apex to the right
/// springing. With jambs the outline continues down to the two sill
/// corners, giving `segments + 2` points; without them the head's own
/// chord closes the outline and it has exactly `segments` points.
///
/// # Errors
///
/// Returns [`GenerateError::InvalidParameters`] for invalid parameters.
pub fn window_outline(params: &WindowParams) -> GenerateResult<CurvePath> {
    params.validate()?;
    let rise = params.height * (1.0 - params.start_fraction);
    let head = match params.head {
        WindowHead::Pointed => pointed_arch(params.width, rise, params.segments)?,
        WindowHead::Lancet { curvature } => {
            let natural = LancetArch::new(params.width, curvature)?.rise();
            lancet_arch(params.width, curvature, params.segments)?
                .scaled_about(Point3::origin(), Vector3::new(1.0, 1.0, rise / natural))
        }
    };
    let head = head.translated(Vector3::z() * params.springing());

    let mut points = head.into_points();
    if params.start_fraction > 0.0 {
        let half = params.width / 2.0;
        points.push(Point3::new(half, 0.0, params.sill));
        points.push(Point3::new(-half, 0.0, params.sill));
    }
    Ok(CurvePath::closed(points)?)
}

/// Build a window recess.
///
/// The outline is extruded `depth` into the wall (+Y) with a glazing face
/// at the back and no front face. Faces point into the opening, as the
/// surface of a hole cut into a solid would, so the recess welds onto a
/// front-facing wall without flipping.
///
/// # Errors
///
/// Returns [`GenerateError::InvalidParameters`] for invalid parameters.
pub fn generate_window(params: &WindowParams) -> GenerateResult<Structure> {
    let outline = window_outline(params)?;
    let mut mesh = extrude(&outline, Vector3::y() * params.depth, Caps::END)?;
    mesh.flip_all();
    debug!(
        "Window recess: {} outline points, {} faces",
        outline.len(),
        mesh.face_count()
    );
    Ok(Structure::from_mesh(
        StructureKind::LancetWindow,
        mesh,
        vec!["recess".to_string()],
    ))
}

/// Parameters for the wall slab a window is set into.
///
/// The slab spans `x ∈ [-width/2, width/2]`, `z ∈ [0, height]` and
/// `y ∈ [0, thickness]`; its front face is the `y = 0` plane.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WallParams {
    /// Extent along X.
    pub width: f64,
    /// Extent along Z.
    pub height: f64,
    /// Extent along Y.
    pub thickness: f64,
}

impl Default for WallParams {
    fn default() -> Self {
        Self {
            width: 3.0,
            height: 4.0,
            thickness: 0.5,
        }
    }
}

impl WallParams {
    /// Wall of the given size.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidParameters`] for a non-positive
    /// dimension.
    pub fn new(width: f64, height: f64, thickness: f64) -> GenerateResult<Self> {
        let params = Self {
            width,
            height,
            thickness,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidParameters`] naming the first
    /// parameter out of range.
    pub fn validate(&self) -> GenerateResult<()> {
        require_positive("width", self.width)?;
        require_positive("height", self.height)?;
        require_positive("thickness", self.thickness)?;
        Ok(())
    }
}

/// A closed wall slab whose front face carries an opening loop.
#[derive(Debug, Clone)]
pub struct WallWithOpening {
    /// The slab.
    pub mesh: MeshGraph,
    /// Face filling the opening, always the last face.
    pub opening_face: usize,
    /// Vertices of the opening, counter-clockwise seen from the front.
    pub opening_loop: Vec<u32>,
}

/// Build a wall slab around an opening outline.
///
/// The front face is split into one sector per outline edge, each reaching
/// from that edge out to the wall's rim along rays from the outline's
/// centroid, so the opening itself is a single face whose loop is exactly
/// the outline. Removing that face (or using it as an
/// [`InsertionBoundary::Face`]) leaves a hole the matching window welds
/// into. The slab is closed and outward facing.
///
/// # Errors
///
/// Returns [`GenerateError::InvalidParameters`] if the outline is open, not
/// in the `y = 0` plane, not strictly inside the front face, without area,
/// or not star-shaped about its centroid.
///
/// # Example
///
/// ```
/// use mesh_gothic::{WallParams, WindowParams, wall_with_opening, window_outline};
///
/// let outline = window_outline(&WindowParams::default()).unwrap();
/// let wall = wall_with_opening(&WallParams::default(), &outline).unwrap();
/// assert_eq!(wall.opening_loop.len(), outline.len());
/// assert!(wall.mesh.adjacency().is_watertight());
/// ```
pub fn wall_with_opening(params: &WallParams, outline: &CurvePath) -> GenerateResult<WallWithOpening> {
    params.validate()?;
    if !outline.is_closed() {
        return Err(GenerateError::invalid("outline", "opening outline must be closed"));
    }
    let half = params.width / 2.0;
    let height = params.height;
    let eps = 1e-9 * params.width.max(height);

    // Work in the (x, z) plane of the front face
    let mut inner: Vec<Point2<f64>> = Vec::with_capacity(outline.len());
    for p in outline.points() {
        if p.y.abs() > eps {
            return Err(GenerateError::invalid(
                "outline",
                format!("point {p} is not in the wall's front plane"),
            ));
        }
        if p.x <= -half + eps || p.x >= half - eps || p.z <= eps || p.z >= height - eps {
            return Err(GenerateError::invalid(
                "outline",
                format!("point {p} is not strictly inside the wall"),
            ));
        }
        inner.push(Point2::new(p.x, p.z));
    }
    let n = inner.len();

    let doubled_area: f64 = (0..n).map(|i| cross(inner[i].coords, inner[(i + 1) % n].coords)).sum();
    if doubled_area.abs() <= eps * eps {
        return Err(GenerateError::invalid("outline", "opening has no area"));
    }
    if doubled_area < 0.0 {
        inner.reverse();
    }

    let center = Point2::from(inner.iter().map(|p| p.coords).sum::<Vector2<f64>>() / n as f64);
    let rays: Vec<Vector2<f64>> = inner.iter().map(|&p| p - center).collect();
    require_star_shaped(&rays)?;

    let corners = [
        Point2::new(-half, 0.0),
        Point2::new(half, 0.0),
        Point2::new(half, height),
        Point2::new(-half, height),
    ];

    // Project every outline point onto the rim, snapping onto nearby corners
    let mut rim: Vec<Point2<f64>> = rays
        .iter()
        .map(|ray| project_to_rim(center, *ray, half, height))
        .collect();
    let mut rim_corner: Vec<Option<usize>> = vec![None; n];
    let mut claimed = [false; 4];
    for (i, q) in rim.iter_mut().enumerate() {
        for (k, corner) in corners.iter().enumerate() {
            if (*q - *corner).norm() <= eps {
                if claimed[k] {
                    return Err(GenerateError::invalid(
                        "outline",
                        "two outline points project onto the same wall corner",
                    ));
                }
                claimed[k] = true;
                rim_corner[i] = Some(k);
                *q = *corner;
            }
        }
    }

    // Remaining corners go to the sector whose angle contains them
    let mut sector_corners: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (k, corner) in corners.iter().enumerate() {
        if claimed[k] {
            continue;
        }
        let v = *corner - center;
        let sector = (0..n)
            .find(|&i| cross(rays[i], v) > 0.0 && cross(v, rays[(i + 1) % n]) > 0.0)
            .ok_or_else(|| {
                GenerateError::invalid("outline", "a wall corner lies on an outline ray")
            })?;
        sector_corners[sector].push(k);
    }
    for (i, list) in sector_corners.iter_mut().enumerate() {
        let ray = rays[i];
        list.sort_by(|&a, &b| {
            let angle = |k: usize| {
                let v = corners[k] - center;
                cross(ray, v).atan2(ray.dot(&v))
            };
            angle(a).total_cmp(&angle(b))
        });
    }

    let lift = |p: Point2<f64>, y: f64| Point3::new(p.x, y, p.y);
    let mut mesh = MeshGraph::with_capacity(2 * n + 8, n + 6);
    let opening_loop: Vec<u32> = inner.iter().map(|&p| mesh.add_vertex(lift(p, 0.0))).collect();

    // Rim chain, counter-clockwise: each projection followed by its sector's corners
    let mut chain: Vec<u32> = Vec::with_capacity(n + 4);
    let mut outer_at = Vec::with_capacity(n);
    let mut corner_at = [0usize; 4];
    for i in 0..n {
        outer_at.push(chain.len());
        if let Some(k) = rim_corner[i] {
            corner_at[k] = chain.len();
        }
        chain.push(mesh.add_vertex(lift(rim[i], 0.0)));
        for &k in &sector_corners[i] {
            corner_at[k] = chain.len();
            chain.push(mesh.add_vertex(lift(corners[k], 0.0)));
        }
    }
    let back: Vec<u32> = corners
        .iter()
        .map(|&c| mesh.add_vertex(lift(c, params.thickness)))
        .collect();
    let m = chain.len();

    for i in 0..n {
        let j = (i + 1) % n;
        let mut face = vec![opening_loop[i]];
        let mut at = outer_at[i];
        loop {
            face.push(chain[at]);
            if at == outer_at[j] {
                break;
            }
            at = (at + 1) % m;
        }
        face.push(opening_loop[j]);
        mesh.add_face(&face)?;
    }

    for k in 0..4 {
        let next = (k + 1) % 4;
        let mut face = Vec::new();
        let mut at = corner_at[next];
        loop {
            face.push(chain[at]);
            if at == corner_at[k] {
                break;
            }
            at = (at + m - 1) % m;
        }
        face.push(back[k]);
        face.push(back[next]);
        mesh.add_face(&face)?;
    }

    mesh.add_face(&[back[3], back[2], back[1], back[0]])?;
    let opening_face = mesh.add_face(&opening_loop)?;

    debug!(
        "Wall: {n}-point opening, {} rim vertices, {} faces",
        m,
        mesh.face_count()
    );
    Ok(WallWithOpening {
        mesh,
        opening_face,
        opening_loop,
    })
}

/// Build a wall with a window merged into it.
///
/// Curves, wall and recess are generated, the recess is merged at the
/// wall's opening face, and the merge's repair pass checks the result. The
/// wall's volume ends up reduced by the opening area times the depth.
///
/// # Errors
///
/// - [`GenerateError::InvalidParameters`] for invalid parameters, or a
///   recess as deep as the wall
/// - [`GenerateError::Merge`] if the weld or repair fails
///
/// # Example
///
/// ```
/// use mesh_assembly::MergeOptions;
/// use mesh_gothic::{WallParams, WindowParams, build_window_wall};
///
/// let (wall, report) =
///     build_window_wall(&WallParams::default(), &WindowParams::default(), &MergeOptions::default())
///         .unwrap();
/// assert_eq!(wall.elements, ["wall", "window"]);
/// assert!(!report.weld.flipped);
/// ```
pub fn build_window_wall(
    wall: &WallParams,
    window: &WindowParams,
    options: &MergeOptions,
) -> GenerateResult<(Structure, MergeReport)> {
    wall.validate()?;
    window.validate()?;
    if window.depth >= wall.thickness {
        return Err(GenerateError::invalid(
            "depth",
            format!(
                "recess depth {} must be less than the wall thickness {}",
                window.depth, wall.thickness
            ),
        ));
    }

    let outline = window_outline(window)?;
    let mut slab = wall_with_opening(wall, &outline)?;
    let recess = generate_window(window)?;
    let report = merge(
        &mut slab.mesh,
        &recess.mesh,
        &InsertionBoundary::Face(slab.opening_face),
        options,
    )?;

    info!("Built window wall: {report}");
    let structure = Structure::from_mesh(
        StructureKind::WindowWall,
        slab.mesh,
        vec!["wall".to_string(), "window".to_string()],
    );
    Ok((structure, report))
}

fn cross(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Every edge must be seen strictly counter-clockwise from the centre,
/// winding around it exactly once.
fn require_star_shaped(rays: &[Vector2<f64>]) -> GenerateResult<()> {
    let n = rays.len();
    let mut turned = 0.0;
    for i in 0..n {
        let (a, b) = (rays[i], rays[(i + 1) % n]);
        let sin = cross(a, b);
        if sin <= 0.0 {
            return Err(GenerateError::invalid(
                "outline",
                "opening is not star-shaped about its centroid",
            ));
        }
        turned += sin.atan2(a.dot(&b));
    }
    if (turned - std::f64::consts::TAU).abs() > 1e-6 {
        return Err(GenerateError::invalid(
            "outline",
            "opening winds around its centroid more than once",
        ));
    }
    Ok(())
}

/// Where a ray from `center` leaves the rectangle `[-half, half] × [0, height]`.
fn project_to_rim(center: Point2<f64>, ray: Vector2<f64>, half: f64, height: f64) -> Point2<f64> {
    let exit = |origin: f64, direction: f64, low: f64, high: f64| {
        if direction > 0.0 {
            Some(((high - origin) / direction, high))
        } else if direction < 0.0 {
            Some(((low - origin) / direction, low))
        } else {
            None
        }
    };
    let across = exit(center.x, ray.x, -half, half);
    let up = exit(center.y, ray.y, 0.0, height);
    match (across, up) {
        (Some((tx, x)), Some((tz, _))) if tx <= tz => Point2::new(x, center.y + ray.y * tx),
        (_, Some((tz, z))) => Point2::new(center.x + ray.x * tz, z),
        (Some((tx, x)), None) => Point2::new(x, center.y),
        (None, None) => center,
    }
}
