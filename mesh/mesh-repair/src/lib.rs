//! Topology classification and best-effort manifold repair.
//!
//! This crate provides tools for:
//! - Edge classification (manifold, boundary, non-manifold, isolated)
//! - Boundary walking into closed loops and open chains
//! - Duplicate vertex detection and collapse
//! - Hole filling (fan for convex loops, ear clipping otherwise)
//! - Winding unification and outward orientation
//! - Non-manifold edge resolution by detaching fragments
//! - Multi-pass repair with a detailed report
//!
//! Classification is read-only; repair mutates the mesh in place and
//! either succeeds with no non-manifold edges left, or fails with an error
//! carrying a report of everything it did.
//!
//! # Example
//!
//! ```
//! use mesh_types::unit_cube;
//! use mesh_repair::{classify, repair, RepairOptions};
//!
//! // A box missing its top face
//! let mut mesh = unit_cube();
//! mesh.remove_face(1).unwrap();
//!
//! let before = classify(&mesh).unwrap();
//! println!("{before}");
//! assert_eq!(before.boundary_loops.len(), 1);
//!
//! let report = repair(&mut mesh, &RepairOptions::default()).unwrap();
//! println!("{report}");
//! assert_eq!(mesh.face_count(), 7);
//! assert!(classify(&mesh).unwrap().is_printable());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod classify;
pub mod duplicates;
mod error;
pub mod holes;
pub mod nonmanifold;
mod repair;
pub mod winding;

pub use classify::{
    ClassificationReport, ClassifyOptions, EdgeClass, classify, classify_edge, classify_edges,
    classify_with_options, non_manifold_edges, non_manifold_vertices,
};
pub use error::{RepairError, RepairResult};
pub use repair::{RepairOptions, RepairReport, repair};

// Re-export commonly used items from submodules
pub use duplicates::{DuplicateVertexGroup, collapse_duplicate_groups, find_duplicate_groups};
pub use holes::{BoundaryLoop, BoundaryWalk, fill_holes, walk_boundaries};
pub use nonmanifold::{DetachedFragment, resolve_non_manifold_edges};
pub use winding::{find_flipped_faces, fix_winding_order, orient_outward};
