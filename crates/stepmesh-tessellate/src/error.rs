//! Tessellation errors.

use stepmesh_mesh::FragmentError;
use thiserror::Error;

/// Errors raised while faceting a shape.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TessellationError {
    /// Deflection values must be positive and finite.
    #[error("invalid deflection: linear {linear}, angular {angular} (both must be positive and finite)")]
    InvalidDeflection {
        /// Linear deflection.
        linear: f64,
        /// Angular deflection in radians.
        angular: f64,
    },

    /// A face boundary could not be triangulated.
    #[error("face #{face_id}: {message}")]
    Face {
        /// Face entity ID.
        face_id: u64,
        /// What went wrong.
        message: String,
    },

    /// A face produced an invalid fragment.
    #[error("face #{face_id}: {source}")]
    Fragment {
        /// Face entity ID.
        face_id: u64,
        /// Fragment validation failure.
        #[source]
        source: FragmentError,
    },
}

impl TessellationError {
    /// Create a face error.
    pub fn face(face_id: u64, message: impl Into<String>) -> Self {
        Self::Face {
            face_id,
            message: message.into(),
        }
    }
}
