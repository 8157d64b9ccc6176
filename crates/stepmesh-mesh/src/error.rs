//! Error types for fragments and mesh stages.

use thiserror::Error;

/// A triangulation fragment that violates its own invariants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FragmentError {
    /// A triangle refers past the end of the point list.
    #[error("triangle {triangle} refers to point {index}, but the fragment has {len} points")]
    IndexOutOfRange {
        /// Triangle position in the fragment.
        triangle: usize,
        /// Offending index.
        index: u32,
        /// Number of points.
        len: usize,
    },

    /// A point coordinate is NaN or infinite.
    #[error("point {0} has a non-finite coordinate")]
    NonFinitePoint(usize),

    /// The placement is not a finite affine transform.
    #[error("placement is not a finite affine transform")]
    InvalidPlacement,

    /// More points than a `u32` index can address.
    #[error("fragment has {0} points, more than 32-bit indices can address")]
    TooManyPoints(usize),
}

/// Errors raised by assembly and normalization.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// Faceting produced no usable vertices or triangles.
    #[error("no geometry: tessellation produced no usable triangles")]
    NoGeometry,

    /// Welding and degenerate removal left nothing to encode.
    #[error("degenerate mesh: all {input_triangles} triangles collapsed during normalization")]
    DegenerateMesh {
        /// Triangles before normalization.
        input_triangles: usize,
    },

    /// A mesh index refers past the end of the vertex buffer.
    #[error("triangle {triangle} refers to vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        /// Triangle position.
        triangle: usize,
        /// Offending index.
        index: u32,
        /// Number of vertices.
        vertex_count: usize,
    },

    /// A vertex became non-finite after placement or narrowing to `f32`.
    #[error("fragment {fragment} point {point} is not finite in single precision")]
    NonFiniteVertex {
        /// Fragment position in the input sequence.
        fragment: usize,
        /// Point index within the fragment.
        point: usize,
    },

    /// The merged mesh needs more than 32-bit indices.
    #[error("mesh has {0} vertices, more than 32-bit indices can address")]
    TooManyVertices(usize),

    /// Weld tolerance is negative or not finite.
    #[error("invalid weld tolerance {0}")]
    InvalidTolerance(f64),
}
