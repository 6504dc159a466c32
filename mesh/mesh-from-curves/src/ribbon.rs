//! Quad strips between corresponding rows of vertices, plus end caps.

use mesh_types::MeshGraph;

use crate::error::SweepResult;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which ends of a closed surface get a polygon cap.
///
/// Caps only apply to closed profiles on open paths; they are ignored
/// everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Caps {
    /// Cap the first section.
    pub start: bool,
    /// Cap the last section.
    pub end: bool,
}

impl Caps {
    /// Cap both ends.
    pub const BOTH: Self = Self {
        start: true,
        end: true,
    };
    /// Leave both ends open.
    pub const NONE: Self = Self {
        start: false,
        end: false,
    };
    /// Cap only the first section.
    pub const START: Self = Self {
        start: true,
        end: false,
    };
    /// Cap only the last section.
    pub const END: Self = Self {
        start: false,
        end: true,
    };
}

impl Default for Caps {
    fn default() -> Self {
        Self::BOTH
    }
}

/// Add a polygon, collapsing consecutive repeated corners.
///
/// Corners that coincide (a loft section touching its neighbour, for
/// instance) turn a quad into a triangle; polygons with fewer than three
/// distinct corners left are skipped and `None` is returned.
pub(crate) fn add_polygon(mesh: &mut MeshGraph, corners: &[u32]) -> SweepResult<Option<usize>> {
    let mut face: Vec<u32> = Vec::with_capacity(corners.len());
    for &v in corners {
        if face.last() != Some(&v) {
            face.push(v);
        }
    }
    while face.len() > 1 && face.first() == face.last() {
        face.pop();
    }
    if face.len() < 3 {
        return Ok(None);
    }
    Ok(Some(mesh.add_face(&face)?))
}

/// Bridge each row to the next with quads `[a_i, a_i+1, b_i+1, b_i]`.
///
/// `closed_rows` adds the quad between the last and first column; `wrap`
/// bridges the last row back to the first. Returns the number of faces
/// added.
pub(crate) fn bridge_rows(
    mesh: &mut MeshGraph,
    rows: &[Vec<u32>],
    closed_rows: bool,
    wrap: bool,
) -> SweepResult<usize> {
    let row_count = rows.len();
    let pairs = if wrap { row_count } else { row_count.saturating_sub(1) };
    let mut added = 0;
    for k in 0..pairs {
        let (a, b) = (&rows[k], &rows[(k + 1) % row_count]);
        let m = a.len();
        let columns = if closed_rows { m } else { m.saturating_sub(1) };
        for i in 0..columns {
            let j = (i + 1) % m;
            if add_polygon(mesh, &[a[i], a[j], b[j], b[i]])?.is_some() {
                added += 1;
            }
        }
    }
    Ok(added)
}

/// Cap the first row facing backwards and the last row facing forwards.
pub(crate) fn add_caps(mesh: &mut MeshGraph, rows: &[Vec<u32>], caps: Caps) -> SweepResult<usize> {
    let mut added = 0;
    if caps.start {
        if let Some(first) = rows.first() {
            let reversed: Vec<u32> = first.iter().rev().copied().collect();
            added += usize::from(add_polygon(mesh, &reversed)?.is_some());
        }
    }
    if caps.end {
        if let Some(last) = rows.last() {
            added += usize::from(add_polygon(mesh, last)?.is_some());
        }
    }
    Ok(added)
}
