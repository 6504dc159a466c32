//! Stitch generated fragments onto a host mesh.
//!
//! A fragment (a window recess, an arch ring, a buttress arch) is attached
//! to the target at an [`InsertionBoundary`]: either an open edge loop of
//! the target or a face that is removed to open one, typically the inner
//! face left by an inset.
//!
//! - [`weld`] pairs the fragment's matching open loop with the boundary,
//!   merges the paired vertices and appends the rest of the fragment
//! - [`merge`] is a weld followed by a repair pass, the generation path's
//!   final validity gate
//!
//! # Example
//!
//! ```
//! use mesh_assembly::{InsertionBoundary, MergeError, MergeOptions, merge};
//! use mesh_types::{unit_cube, Vector3};
//!
//! let mut host = unit_cube();
//! let mut storey = unit_cube();
//! storey.remove_face(0).unwrap();
//! storey.translate(Vector3::z());
//!
//! let report = merge(&mut host, &storey, &InsertionBoundary::Face(1), &MergeOptions::default())
//!     .unwrap();
//! println!("{report}");
//! assert!(host.adjacency().is_watertight());
//!
//! // A closed fragment has no loop to weld
//! let err = merge(&mut host, &unit_cube(), &InsertionBoundary::Face(0), &MergeOptions::default());
//! assert!(matches!(err, Err(MergeError::BoundaryMismatch { expected: 4, actual: 0 })));
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod boundary;
mod error;
mod merge;
mod weld;

pub use boundary::InsertionBoundary;
pub use error::{MergeError, MergeResult};
pub use merge::{MergeOptions, MergeReport, merge};
pub use weld::{WeldReport, weld};
