//! The conversion pipeline: tessellate → assemble → normalize → encode.

use std::path::Path;

use stepmesh_glb::{encode, encode_embedded_gltf};
use stepmesh_mesh::{assemble_with_options, normalize, Aabb, AssemblyStats, NormalizeStats};
use stepmesh_step::{read_step_from_buffer, StepShape};
use stepmesh_tessellate::{FaceTessellator, Tessellator};
use tracing::info;

use crate::config::ConvertConfig;
use crate::error::ConvertError;

/// Container to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Binary glTF.
    #[default]
    Glb,
    /// glTF JSON with the buffer embedded as a data URI.
    Gltf,
}

impl OutputFormat {
    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Glb => "glb",
            OutputFormat::Gltf => "gltf",
        }
    }

    /// MIME type.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Glb => "model/gltf-binary",
            OutputFormat::Gltf => "model/gltf+json",
        }
    }
}

/// What a conversion did.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    /// Faces in the input shape.
    pub faces: usize,
    /// Fragments the tessellator returned.
    pub fragments: usize,
    /// Assembly counters.
    pub assembly: AssemblyStats,
    /// Normalization counters.
    pub normalize: NormalizeStats,
    /// Vertices written.
    pub vertices: usize,
    /// Triangles written.
    pub triangles: usize,
    /// Bounds of the written mesh.
    pub bounds: Aabb,
    /// Size of the output.
    pub output_bytes: usize,
}

/// A finished conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    /// Encoded container.
    pub bytes: Vec<u8>,
    /// Statistics.
    pub report: ConversionReport,
}

/// Runs conversions with a fixed configuration.
///
/// Holds no per-conversion state: one converter can serve any number of
/// threads at once.
#[derive(Debug, Clone)]
pub struct Converter<T: Tessellator = FaceTessellator> {
    config: ConvertConfig,
    tessellator: T,
}

impl Default for Converter {
    fn default() -> Self {
        Self {
            config: ConvertConfig::default(),
            tessellator: FaceTessellator,
        }
    }
}

impl Converter {
    /// Converter using the built-in tessellator.
    pub fn new(config: ConvertConfig) -> Result<Self, ConvertError> {
        Self::with_tessellator(config, FaceTessellator)
    }
}

impl<T: Tessellator> Converter<T> {
    /// Converter using a custom tessellator.
    pub fn with_tessellator(config: ConvertConfig, tessellator: T) -> Result<Self, ConvertError> {
        config.validate()?;
        Ok(Self { config, tessellator })
    }

    /// Active configuration.
    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Convert a parsed shape to GLB.
    pub fn convert(&self, shape: &StepShape) -> Result<Conversion, ConvertError> {
        self.convert_to(shape, OutputFormat::Glb)
    }

    /// Parse STEP bytes and convert them to GLB.
    pub fn convert_bytes(&self, data: &[u8]) -> Result<Conversion, ConvertError> {
        let shape = read_step_from_buffer(data)?;
        self.convert(&shape)
    }

    /// Read a STEP file and convert it.
    pub fn convert_path(&self, path: impl AsRef<Path>, format: OutputFormat) -> Result<Conversion, ConvertError> {
        let shape = stepmesh_step::read_step(path)?;
        self.convert_to(&shape, format)
    }

    /// Convert a parsed shape to the given container.
    pub fn convert_to(&self, shape: &StepShape, format: OutputFormat) -> Result<Conversion, ConvertError> {
        let fragments = self.tessellator.tessellate(shape, &self.config.deflection())?;
        let fragment_count = fragments.len();

        let (mesh, assembly) = assemble_with_options(fragments, &self.config.assemble_options())?;
        let normalized = normalize(mesh, &self.config.normalize_params())?;

        let bytes = match format {
            OutputFormat::Glb => encode(&normalized.mesh, &normalized.bounds)?,
            OutputFormat::Gltf => encode_embedded_gltf(&normalized.mesh, &normalized.bounds)?.into_bytes(),
        };

        let report = ConversionReport {
            faces: shape.face_count(),
            fragments: fragment_count,
            assembly,
            normalize: normalized.stats,
            vertices: normalized.mesh.vertex_count(),
            triangles: normalized.mesh.triangle_count(),
            bounds: normalized.bounds,
            output_bytes: bytes.len(),
        };
        info!(
            faces = report.faces,
            vertices = report.vertices,
            triangles = report.triangles,
            bytes = report.output_bytes,
            format = format.extension(),
            "conversion done"
        );
        Ok(Conversion { bytes, report })
    }
}
