#![warn(missing_docs)]

//! Mesh assembly and normalization for stepmesh.
//!
//! Per-face [`TriangulationFragment`]s are merged by [`assemble`] into one
//! [`GlobalMesh`], then [`normalize`] welds seams, drops collapsed triangles,
//! and computes the bounding box the encoder needs.
//!
//! ```
//! use stepmesh_math::Point3;
//! use stepmesh_mesh::{assemble, normalize, NormalizeParams, TriangulationFragment};
//!
//! let a = TriangulationFragment::new(
//!     vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
//!     vec![[0, 1, 2]],
//!     None,
//! )?;
//! let b = TriangulationFragment::new(
//!     vec![Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
//!     vec![[0, 1, 2]],
//!     None,
//! )?;
//! let (mesh, _) = assemble([a, b])?;
//! let normalized = normalize(mesh, &NormalizeParams::default())?;
//! assert_eq!(normalized.mesh.vertex_count(), 4);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod assemble;
mod error;
mod fragment;
mod mesh;
mod normalize;

pub use assemble::{assemble, assemble_with_options, AssembleOptions, AssemblyStats};
pub use error::{FragmentError, MeshError};
pub use fragment::TriangulationFragment;
pub use mesh::{Aabb, GlobalMesh};
pub use normalize::{normalize, NormalizeParams, NormalizeStats, NormalizedMesh, WeldTolerance};
