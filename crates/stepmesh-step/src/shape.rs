//! The face-level shape handed to tessellation.

use crate::entities::ShapeFace;

/// What kind of root entity a body came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// `MANIFOLD_SOLID_BREP` or `BREP_WITH_VOIDS`.
    Solid,
    /// `SHELL_BASED_SURFACE_MODEL`.
    SurfaceModel,
    /// A free-standing shell with no solid or surface model around it.
    Shell,
}

/// A top-level body found in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Root entity ID.
    pub id: u64,
    /// Root entity kind.
    pub kind: BodyKind,
    /// Shell entity IDs, outer shell first for solids.
    pub shells: Vec<u64>,
    /// Number of shell face references (before de-duplication across bodies).
    pub face_count: usize,
}

/// Everything the tessellator needs from a STEP file.
///
/// Faces are unique and sorted by entity ID, so two reads of the same bytes
/// always produce the same face order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepShape {
    /// Faces of all bodies, in entity ID order.
    pub faces: Vec<ShapeFace>,
    /// Bodies in entity ID order.
    pub bodies: Vec<Body>,
    /// Schemas declared in the header.
    pub schemas: Vec<String>,
}

impl StepShape {
    /// Number of faces.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// True when there are no faces to tessellate.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Face counts per surface kind, sorted by kind name.
    pub fn surface_histogram(&self) -> Vec<(String, usize)> {
        let mut counts = std::collections::BTreeMap::<String, usize>::new();
        for face in &self.faces {
            *counts.entry(face.surface.name().to_string()).or_default() += 1;
        }
        counts.into_iter().collect()
    }
}
