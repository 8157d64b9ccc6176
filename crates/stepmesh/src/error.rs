//! The unified conversion error.

use serde::Serialize;
use stepmesh_glb::EncodeError;
use stepmesh_mesh::MeshError;
use stepmesh_step::StepError;
use stepmesh_tessellate::TessellationError;
use thiserror::Error;

use crate::config::ConfigError;

/// Everything that can end a conversion. None of these are retried.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The input is not a readable STEP document.
    #[error("failed to parse STEP data: {0}")]
    Parse(#[from] StepError),

    /// Faceting failed under the requested tolerances.
    #[error("tessellation failed: {0}")]
    Tessellation(#[from] TessellationError),

    /// Faceting produced no usable vertices or triangles.
    #[error("no geometry found in STEP file")]
    NoGeometry,

    /// Every triangle collapsed during welding.
    #[error("mesh is degenerate: all {input_triangles} triangles collapsed during welding")]
    DegenerateMesh {
        /// Triangles before welding.
        input_triangles: usize,
    },

    /// Assembled geometry broke a mesh invariant (non-finite or too many vertices).
    #[error("invalid mesh: {0}")]
    Mesh(MeshError),

    /// The encoder hit an internal invariant violation.
    #[error("internal encoding error: {0}")]
    InternalEncoding(#[from] EncodeError),

    /// The converter's configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<MeshError> for ConvertError {
    fn from(e: MeshError) -> Self {
        match e {
            MeshError::NoGeometry => ConvertError::NoGeometry,
            MeshError::DegenerateMesh { input_triangles } => ConvertError::DegenerateMesh { input_triangles },
            other => ConvertError::Mesh(other),
        }
    }
}

/// Coarse classification of a [`ConvertError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// [`ConvertError::Parse`].
    Parse,
    /// [`ConvertError::Tessellation`] and [`ConvertError::Mesh`].
    Tessellation,
    /// [`ConvertError::NoGeometry`].
    NoGeometry,
    /// [`ConvertError::DegenerateMesh`].
    DegenerateMesh,
    /// [`ConvertError::InternalEncoding`].
    InternalEncoding,
    /// [`ConvertError::Config`].
    Config,
}

impl ConvertError {
    /// Which stage failed.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::Parse(_) => ErrorKind::Parse,
            ConvertError::Tessellation(_) | ConvertError::Mesh(_) => ErrorKind::Tessellation,
            ConvertError::NoGeometry => ErrorKind::NoGeometry,
            ConvertError::DegenerateMesh { .. } => ErrorKind::DegenerateMesh,
            ConvertError::InternalEncoding(_) => ErrorKind::InternalEncoding,
            ConvertError::Config(_) => ErrorKind::Config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_errors_map_to_kinds() {
        assert_eq!(ConvertError::from(MeshError::NoGeometry).kind(), ErrorKind::NoGeometry);
        assert_eq!(
            ConvertError::from(MeshError::DegenerateMesh { input_triangles: 3 }).kind(),
            ErrorKind::DegenerateMesh
        );
        assert_eq!(
            ConvertError::from(MeshError::TooManyVertices(usize::MAX)).kind(),
            ErrorKind::Tessellation
        );
    }

    #[test]
    fn test_messages_are_human_readable() {
        let e = ConvertError::from(StepError::NoShapes);
        assert_eq!(e.kind(), ErrorKind::Parse);
        assert!(e.to_string().starts_with("failed to parse STEP data"));
        assert_eq!(ConvertError::NoGeometry.to_string(), "no geometry found in STEP file");
    }
}
