//! The output of every generator.

use std::fmt;

use mesh_types::MeshGraph;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which generator produced a [`Structure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StructureKind {
    /// Pointed arch ring.
    Arch,
    /// Window recess, open at the front.
    LancetWindow,
    /// Wall slab with a window merged into it.
    WindowWall,
    /// Rib vault panels.
    RibVault,
    /// Strut plus swept arch.
    FlyingButtress,
    /// Pier plus arch ring seated on its top.
    DivineButtress,
    /// Ring of foils inside an enclosing ring.
    Tracery,
    /// Radially instanced spouts.
    Gargoyle,
    /// Tapering spire with optional pinnacles.
    Spire,
}

impl StructureKind {
    /// Lower-case name, used in logs and element identifiers.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Arch => "arch",
            Self::LancetWindow => "lancet window",
            Self::WindowWall => "window wall",
            Self::RibVault => "rib vault",
            Self::FlyingButtress => "flying buttress",
            Self::DivineButtress => "divine flying buttress",
            Self::Tracery => "tracery",
            Self::Gargoyle => "gargoyle",
            Self::Spire => "spire",
        }
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A generated mesh fragment and the named elements it is made of.
///
/// Generators never repair their output. Closed elements come out wound
/// outward; open ones (vault panels, window recesses) are wound so they
/// weld cleanly onto a host.
#[derive(Debug, Clone)]
pub struct Structure {
    /// Generator that built this.
    pub kind: StructureKind,
    /// The geometry.
    pub mesh: MeshGraph,
    /// Identifiers of the parts, in the order they were added.
    pub elements: Vec<String>,
}

impl Structure {
    /// An empty structure.
    #[must_use]
    pub fn new(kind: StructureKind) -> Self {
        Self {
            kind,
            mesh: MeshGraph::new(),
            elements: Vec::new(),
        }
    }

    /// Wrap a finished mesh made of the given elements.
    #[must_use]
    pub fn from_mesh(kind: StructureKind, mesh: MeshGraph, elements: Vec<String>) -> Self {
        Self {
            kind,
            mesh,
            elements,
        }
    }

    /// Append a disjoint part. Returns the vertex offset applied to it.
    pub fn add_part(&mut self, name: impl Into<String>, part: &MeshGraph) -> u32 {
        self.elements.push(name.into());
        self.mesh.append(part)
    }

    /// Number of named elements.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} elements, {} vertices, {} faces",
            self.kind,
            self.elements.len(),
            self.mesh.vertex_count(),
            self.mesh.face_count()
        )
    }
}
