//! One parameter set per structure, and dispatch over them.

use mesh_assembly::MergeOptions;
use tracing::info;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::arch::{ArchParams, generate_arch};
use crate::buttress::{
    DivineButtressParams, FlyingButtressParams, generate_divine_buttress, generate_flying_buttress,
};
use crate::error::GenerateResult;
use crate::gargoyle::{GargoyleParams, generate_gargoyles};
use crate::spire::{SpireParams, generate_spire};
use crate::structure::{Structure, StructureKind};
use crate::tracery::{TraceryParams, generate_tracery};
use crate::vault::{VaultParams, generate_vault};
use crate::window::{WallParams, WindowParams, build_window_wall, generate_window};

/// Parameters for any structure the generator can build.
///
/// With the `serde` feature the variants serialize with a `structure` tag,
/// so a host can store and reload slider values.
///
/// # Example
///
/// ```
/// use mesh_gothic::{GenerationParameters, SpireParams, StructureKind, generate};
///
/// let params = GenerationParameters::Spire(SpireParams::default());
/// assert_eq!(params.kind(), StructureKind::Spire);
/// let spire = generate(&params).unwrap();
/// assert_eq!(spire.kind, StructureKind::Spire);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "structure", rename_all = "snake_case"))]
pub enum GenerationParameters {
    /// A pointed arch ring.
    Arch(ArchParams),
    /// A free-standing window recess.
    LancetWindow(WindowParams),
    /// A wall with a window merged into it.
    WindowWall {
        /// The wall slab.
        wall: WallParams,
        /// The window set into it.
        window: WindowParams,
    },
    /// A rib vault.
    RibVault(VaultParams),
    /// A strut with a swept arch.
    FlyingButtress(FlyingButtressParams),
    /// A pier with an arch band.
    DivineButtress(DivineButtressParams),
    /// Foiled tracery.
    Tracery(TraceryParams),
    /// A ring of gargoyle spouts.
    Gargoyle(GargoyleParams),
    /// A spire with optional pinnacles.
    Spire(SpireParams),
}

impl GenerationParameters {
    /// Kind of structure these parameters build.
    #[must_use]
    pub fn kind(&self) -> StructureKind {
        match self {
            Self::Arch(_) => StructureKind::Arch,
            Self::LancetWindow(_) => StructureKind::LancetWindow,
            Self::WindowWall { .. } => StructureKind::WindowWall,
            Self::RibVault(_) => StructureKind::RibVault,
            Self::FlyingButtress(_) => StructureKind::FlyingButtress,
            Self::DivineButtress(_) => StructureKind::DivineButtress,
            Self::Tracery(_) => StructureKind::Tracery,
            Self::Gargoyle(_) => StructureKind::Gargoyle,
            Self::Spire(_) => StructureKind::Spire,
        }
    }

    /// Check the wrapped parameters.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidParameters`](crate::GenerateError)
    /// naming the first parameter out of range.
    pub fn validate(&self) -> GenerateResult<()> {
        match self {
            Self::Arch(p) => p.validate(),
            Self::LancetWindow(p) => p.validate(),
            Self::WindowWall { wall, window } => {
                wall.validate()?;
                window.validate()
            }
            Self::RibVault(p) => p.validate(),
            Self::FlyingButtress(p) => p.validate(),
            Self::DivineButtress(p) => p.validate(),
            Self::Tracery(p) => p.validate(),
            Self::Gargoyle(p) => p.validate(),
            Self::Spire(p) => p.validate(),
        }
    }
}

/// Build the structure described by `params`.
///
/// A window wall is merged with [`MergeOptions::default`]; call
/// [`build_window_wall`] directly to choose the options or see the merge
/// report.
///
/// # Errors
///
/// Whatever the selected generator returns.
pub fn generate(params: &GenerationParameters) -> GenerateResult<Structure> {
    let structure = match params {
        GenerationParameters::Arch(p) => generate_arch(p)?,
        GenerationParameters::LancetWindow(p) => generate_window(p)?,
        GenerationParameters::WindowWall { wall, window } => {
            build_window_wall(wall, window, &MergeOptions::default())?.0
        }
        GenerationParameters::RibVault(p) => generate_vault(p)?,
        GenerationParameters::FlyingButtress(p) => generate_flying_buttress(p)?,
        GenerationParameters::DivineButtress(p) => generate_divine_buttress(p)?,
        GenerationParameters::Tracery(p) => generate_tracery(p)?,
        GenerationParameters::Gargoyle(p) => generate_gargoyles(p)?,
        GenerationParameters::Spire(p) => generate_spire(p)?,
    };
    info!("Generated {structure}");
    Ok(structure)
}
