//! Parametric Gothic architecture.
//!
//! Each generator turns a parameter struct into a [`Structure`]: a mesh plus
//! the names of the elements it was built from. Curves come from
//! `curve-types`, surfaces from `mesh-from-curves`, and parts that must be
//! joined are welded with `mesh-assembly`.
//!
//! | Structure | Parameters | Generator |
//! |-----------|------------|-----------|
//! | Pointed arch ring | [`ArchParams`] | [`generate_arch`] |
//! | Window recess | [`WindowParams`] | [`generate_window`] |
//! | Wall with a window | [`WallParams`], [`WindowParams`] | [`build_window_wall`] |
//! | Rib vault | [`VaultParams`] | [`generate_vault`] |
//! | Flying buttress | [`FlyingButtressParams`] | [`generate_flying_buttress`] |
//! | Divine flying buttress | [`DivineButtressParams`] | [`generate_divine_buttress`] |
//! | Tracery | [`TraceryParams`] | [`generate_tracery`] |
//! | Gargoyles | [`GargoyleParams`] | [`generate_gargoyles`] |
//! | Spire | [`SpireParams`] | [`generate_spire`] |
//!
//! Parameters are validated before anything is built. Generators never run
//! the repairer; only [`build_window_wall`] does, through its merge.
//!
//! # Example
//!
//! ```
//! use mesh_gothic::{GenerationParameters, VaultParams, generate};
//!
//! let params = GenerationParameters::RibVault(VaultParams::new(6.0, 4.0).unwrap());
//! let vault = generate(&params).unwrap();
//! println!("{vault}");
//! assert_eq!(vault.elements[0], "panel-0");
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod arch;
mod buttress;
mod error;
mod gargoyle;
mod params;
mod spire;
mod structure;
mod tracery;
mod vault;
mod window;

pub use arch::{ArchParams, arch_outline, generate_arch};
pub use buttress::{
    DivineButtressParams, FlyingButtressParams, generate_divine_buttress, generate_flying_buttress,
};
pub use error::{GenerateError, GenerateResult};
pub use gargoyle::{GargoyleParams, generate_gargoyles};
pub use params::{GenerationParameters, generate};
pub use spire::{SpireParams, generate_spire};
pub use structure::{Structure, StructureKind};
pub use tracery::{TraceryParams, generate_tracery};
pub use vault::{VaultParams, generate_vault, vault_ribs};
pub use window::{
    WallParams, WallWithOpening, WindowHead, WindowParams, build_window_wall, generate_window,
    wall_with_opening, window_outline,
};
