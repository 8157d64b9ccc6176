//! GLB 2.0 byte layout.

use stepmesh_mesh::{Aabb, GlobalMesh};
use tracing::debug;

use crate::error::EncodeError;
use crate::json::{BufferLayout, Document};

/// `"glTF"` read as a little-endian `u32`.
pub const GLB_MAGIC: u32 = 0x4654_6C67;
/// Container version.
pub const GLB_VERSION: u32 = 2;
/// `"JSON"` chunk type.
pub const CHUNK_JSON: u32 = 0x4E4F_534A;
/// `"BIN\0"` chunk type.
pub const CHUNK_BIN: u32 = 0x004E_4942;
/// Magic, version, length.
pub const HEADER_LENGTH: usize = 12;
/// Chunk length and type.
pub const CHUNK_HEADER_LENGTH: usize = 8;

/// Round `n` up to a multiple of four.
pub fn padded_length(n: usize) -> usize {
    (n + 3) & !3
}

/// Encode a normalized mesh as a GLB container.
///
/// `bounds` becomes the position accessor's `min`/`max`. The only failure is
/// [`EncodeError::Internal`], raised when the mesh or bounds break an
/// invariant that normalization guarantees.
pub fn encode(mesh: &GlobalMesh, bounds: &Aabb) -> Result<Vec<u8>, EncodeError> {
    let (bin, layout) = pack_buffer(mesh, bounds)?;
    let document = Document::single_mesh(&layout, bounds.min, bounds.max, None);
    let json = serde_json::to_vec(&document).map_err(|e| EncodeError::internal(format!("JSON: {e}")))?;

    let bytes = write_container(&json, &bin)?;
    debug!(
        vertices = layout.vertex_count,
        indices = layout.index_count,
        json = json.len(),
        bin = bin.len(),
        total = bytes.len(),
        "encoded GLB"
    );
    Ok(bytes)
}

/// Positions then indices, little-endian, each region padded to four bytes.
pub(crate) fn pack_buffer(mesh: &GlobalMesh, bounds: &Aabb) -> Result<(Vec<u8>, BufferLayout), EncodeError> {
    check_invariants(mesh, bounds)?;

    let positions_length = mesh.vertex_count() * 12;
    let indices_offset = padded_length(positions_length);
    let indices_length = mesh.triangle_count() * 12;
    let total_length = indices_offset + padded_length(indices_length);

    let mut bin = Vec::with_capacity(total_length);
    for v in mesh.vertices() {
        for c in v {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    bin.resize(indices_offset, 0);
    for tri in mesh.indices() {
        for i in tri {
            bin.extend_from_slice(&i.to_le_bytes());
        }
    }
    bin.resize(total_length, 0);

    let layout = BufferLayout {
        vertex_count: mesh.vertex_count(),
        index_count: mesh.triangle_count() * 3,
        positions_length,
        indices_offset,
        indices_length,
        total_length,
    };
    Ok((bin, layout))
}

fn check_invariants(mesh: &GlobalMesh, bounds: &Aabb) -> Result<(), EncodeError> {
    if mesh.vertex_count() == 0 || mesh.triangle_count() == 0 {
        return Err(EncodeError::internal("mesh is empty"));
    }
    let n = mesh.vertex_count();
    if let Some(i) = mesh.indices().iter().flatten().find(|&&i| i as usize >= n) {
        return Err(EncodeError::internal(format!("index {i} out of range for {n} vertices")));
    }
    let finite = bounds.min.iter().chain(&bounds.max).all(|c| c.is_finite());
    if !finite || bounds.is_empty() {
        return Err(EncodeError::internal("bounding box is empty or not finite"));
    }
    Ok(())
}

/// Header, JSON chunk padded with spaces, BIN chunk padded with zeros.
pub(crate) fn write_container(json: &[u8], bin: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let json_length = padded_length(json.len());
    let bin_length = padded_length(bin.len());
    let total = HEADER_LENGTH + CHUNK_HEADER_LENGTH + json_length + CHUNK_HEADER_LENGTH + bin_length;
    let to_u32 = |n: usize| u32::try_from(n).map_err(|_| EncodeError::internal(format!("{n} bytes exceed the GLB size limit")));

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&GLB_VERSION.to_le_bytes());
    out.extend_from_slice(&to_u32(total)?.to_le_bytes());

    out.extend_from_slice(&to_u32(json_length)?.to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(json);
    out.resize(out.len() + json_length - json.len(), b' ');

    out.extend_from_slice(&to_u32(bin_length)?.to_le_bytes());
    out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
    out.extend_from_slice(bin);
    out.resize(out.len() + bin_length - bin.len(), 0);

    if out.len() != total {
        return Err(EncodeError::internal(format!("wrote {} bytes, header says {total}", out.len())));
    }
    Ok(out)
}

/// A GLB container read back: header fields, chunk sizes, and the document.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerLayout {
    /// Header version.
    pub version: u32,
    /// Header length field.
    pub total_length: u32,
    /// JSON chunk length, padding included.
    pub json_length: u32,
    /// BIN chunk length, padding included; zero when there is no BIN chunk.
    pub bin_length: u32,
    /// Parsed JSON chunk.
    pub document: Document,
}

impl ContainerLayout {
    /// Vertex count declared by the position accessor.
    pub fn vertex_count(&self) -> Option<u64> {
        self.document.accessors.first().map(|a| a.count)
    }

    /// Triangle count declared by the index accessor.
    pub fn triangle_count(&self) -> Option<u64> {
        self.document.accessors.get(1).map(|a| a.count / 3)
    }
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32, EncodeError> {
    bytes
        .get(at..at + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| EncodeError::malformed(format!("truncated at byte {at}")))
}

/// Parse a container's header and chunk table.
pub fn inspect(bytes: &[u8]) -> Result<ContainerLayout, EncodeError> {
    if read_u32(bytes, 0)? != GLB_MAGIC {
        return Err(EncodeError::malformed("bad magic"));
    }
    let version = read_u32(bytes, 4)?;
    if version != GLB_VERSION {
        return Err(EncodeError::malformed(format!("unsupported version {version}")));
    }
    let total_length = read_u32(bytes, 8)?;
    if total_length as usize != bytes.len() {
        return Err(EncodeError::malformed(format!(
            "header length {total_length} but {} bytes present",
            bytes.len()
        )));
    }

    let json_length = read_u32(bytes, HEADER_LENGTH)?;
    if read_u32(bytes, HEADER_LENGTH + 4)? != CHUNK_JSON {
        return Err(EncodeError::malformed("first chunk is not JSON"));
    }
    let json_start = HEADER_LENGTH + CHUNK_HEADER_LENGTH;
    let json_end = json_start + json_length as usize;
    let json = bytes
        .get(json_start..json_end)
        .ok_or_else(|| EncodeError::malformed("JSON chunk runs past the end"))?;
    let document: Document =
        serde_json::from_slice(json).map_err(|e| EncodeError::malformed(format!("JSON chunk: {e}")))?;

    let bin_length = if json_end < bytes.len() {
        let length = read_u32(bytes, json_end)?;
        if read_u32(bytes, json_end + 4)? != CHUNK_BIN {
            return Err(EncodeError::malformed("second chunk is not BIN"));
        }
        if json_end + CHUNK_HEADER_LENGTH + length as usize > bytes.len() {
            return Err(EncodeError::malformed("BIN chunk runs past the end"));
        }
        length
    } else {
        0
    };

    Ok(ContainerLayout {
        version,
        total_length,
        json_length,
        bin_length,
        document,
    })
}
