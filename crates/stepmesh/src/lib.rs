#![warn(missing_docs)]

//! stepmesh: STEP (ISO 10303-21) to binary glTF conversion.
//!
//! The pipeline reads a STEP file into a [`StepShape`], tessellates every
//! supported face into a [`TriangulationFragment`], merges the fragments into
//! one welded mesh, and writes a single-mesh GLB.
//!
//! # Example
//!
//! ```rust,no_run
//! use stepmesh::{ConvertConfig, Converter};
//!
//! let converter = Converter::new(ConvertConfig::default())?;
//! let out = converter.convert_bytes(&std::fs::read("part.step")?)?;
//! std::fs::write("part.glb", &out.bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod convert;
mod error;
pub mod service;

pub use config::{ConfigError, ConvertConfig, DEFAULT_MAX_UPLOAD_BYTES};
pub use convert::{Conversion, ConversionReport, Converter, OutputFormat};
pub use error::{ConvertError, ErrorKind};

pub use stepmesh_glb as glb;
pub use stepmesh_mesh as mesh;
pub use stepmesh_step as step;
pub use stepmesh_tessellate as tessellate;

pub use stepmesh_mesh::{GlobalMesh, TriangulationFragment, WeldTolerance};
pub use stepmesh_step::{read_step, read_step_from_buffer, StepShape};
pub use stepmesh_tessellate::{Deflection, FaceTessellator, Tessellator};

/// Convert STEP bytes to GLB with default settings.
pub fn convert_step_to_glb(data: &[u8]) -> Result<Vec<u8>, ConvertError> {
    Ok(Converter::default().convert_bytes(data)?.bytes)
}
