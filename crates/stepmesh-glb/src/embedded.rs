//! Self-contained `.gltf` output with the buffer inlined as a data URI.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use stepmesh_mesh::{Aabb, GlobalMesh};

use crate::error::EncodeError;
use crate::glb::pack_buffer;
use crate::json::Document;

/// Prefix of the buffer URI.
pub const DATA_URI_PREFIX: &str = "data:application/octet-stream;base64,";

/// Encode a mesh as a pretty-printed glTF JSON document whose single buffer
/// is embedded as base64. Same layout and failure modes as [`crate::encode`].
pub fn encode_embedded_gltf(mesh: &GlobalMesh, bounds: &Aabb) -> Result<String, EncodeError> {
    let (bin, layout) = pack_buffer(mesh, bounds)?;
    let uri = format!("{DATA_URI_PREFIX}{}", STANDARD.encode(&bin));
    let document = Document::single_mesh(&layout, bounds.min, bounds.max, Some(uri));
    serde_json::to_string_pretty(&document).map_err(|e| EncodeError::internal(format!("JSON: {e}")))
}
