//! Build polygon meshes from curves.
//!
//! This crate turns sampled [`CurvePath`](curve_types::CurvePath)s and planar
//! profiles into [`MeshGraph`](mesh_types::MeshGraph) fragments:
//!
//! - **Extrusion**: a profile pushed along a straight offset ([`extrude`])
//! - **Lofting**: quads between corresponding sections, with optional caps
//!   and apex fan ([`loft`])
//! - **Sweeping**: a 2D profile carried along a path ([`sweep`])
//! - **Frames**: parallel transport and fixed-plane frames
//!
//! Closed results are always wound outward, so a generated fragment has a
//! positive signed volume without any further repair.
//!
//! # Quick Start
//!
//! ```
//! use curve_types::{Point3, Vector3, pointed_arch};
//! use mesh_from_curves::{SweepOptions, rectangle_profile, sweep};
//!
//! // An arch rib: a rectangular band carried along a pointed arch
//! let arch = pointed_arch(2.0, 1.5, 12).unwrap();
//! let band = rectangle_profile(0.2, 0.3).unwrap();
//! let options = SweepOptions::default().in_plane(Vector3::y());
//!
//! let rib = sweep(&band, &arch, &options).unwrap();
//! assert!(rib.adjacency().is_watertight());
//! assert!(rib.signed_volume() > 0.0);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod error;
mod extrude;
mod frame;
mod loft;
mod profile;
mod ribbon;
mod sweep;

pub use error::{SweepError, SweepResult};
pub use extrude::extrude;
pub use frame::{Frame, parallel_transport_frames, planar_frames, transport_frames};
pub use loft::{LoftOptions, loft};
pub use profile::{polygon_profile, rectangle_profile};
pub use ribbon::Caps;
pub use sweep::{SweepOptions, sweep};
