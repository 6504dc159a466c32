//! Core mesh graph for Gothic mesh processing.
//!
//! This crate provides the foundational polygon-mesh representation shared by
//! the repair, generation and merging crates:
//!
//! - [`MeshGraph`] - Indexed polygon mesh with lazily derived adjacency
//! - [`Face`] - Ordered loop of vertex indices (any number of corners ≥ 3)
//! - [`EdgeKey`] - Undirected edge as an unordered vertex pair
//! - [`Adjacency`] - Edge → faces and vertex → edges lookups
//! - [`Vertex`], [`Triangle`], [`Aabb`] - Geometry helpers
//!
//! # Ownership
//!
//! Vertices and faces are owned by flat arrays and reference each other by
//! integer index only. Adjacency is never updated incrementally: every
//! topological mutation drops the cached [`Adjacency`] and the next query
//! rebuilds it.
//!
//! # Units
//!
//! This library is **unit-agnostic**. All coordinates are `f64`.
//!
//! # Coordinate System
//!
//! Uses a **right-handed coordinate system**:
//! - X: width (left/right)
//! - Y: depth (front/back)
//! - Z: height (up/down)
//!
//! Face winding is **counter-clockwise (CCW) when viewed from outside**.
//! Normals point outward by the right-hand rule and are computed on demand.
//!
//! # Example
//!
//! ```
//! use mesh_types::{unit_cube, EdgeKey};
//!
//! let mut cube = unit_cube();
//! assert!(cube.adjacency().is_watertight());
//!
//! // Opening the lid leaves four boundary edges
//! cube.remove_face(1).unwrap();
//! assert_eq!(cube.adjacency().boundary_edge_count(), 4);
//! assert_eq!(cube.faces_on_edge(4, 5).len(), 1);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod adjacency;
mod bounds;
mod edit;
mod error;
mod face;
mod mesh;
mod triangle;
mod vertex;

pub use adjacency::Adjacency;
pub use bounds::Aabb;
pub use edit::InsetFace;
pub use error::{MeshError, MeshResult};
pub use face::{EdgeKey, Face};
pub use mesh::{MeshGraph, unit_cube};
pub use triangle::Triangle;
pub use vertex::Vertex;

// Re-export nalgebra types for convenience
pub use nalgebra::{Isometry3, Point3, UnitQuaternion, Vector3};
