//! The glTF JSON document, limited to what a single indexed mesh needs.

use serde::{Deserialize, Serialize};

/// `componentType` for `f32`.
pub const FLOAT: u32 = 5126;
/// `componentType` for `u32`.
pub const UNSIGNED_INT: u32 = 5125;
/// Buffer view target for vertex attributes.
pub const ARRAY_BUFFER: u32 = 34962;
/// Buffer view target for indices.
pub const ELEMENT_ARRAY_BUFFER: u32 = 34963;
/// Primitive mode for triangle lists.
pub const TRIANGLES: u32 = 4;

/// Root glTF object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Version and generator.
    pub asset: Asset,
    /// Default scene.
    pub scene: u32,
    /// Scenes.
    pub scenes: Vec<Scene>,
    /// Nodes.
    pub nodes: Vec<Node>,
    /// Meshes.
    pub meshes: Vec<Mesh>,
    /// Accessors.
    pub accessors: Vec<Accessor>,
    /// Buffer views.
    pub buffer_views: Vec<BufferView>,
    /// Buffers.
    pub buffers: Vec<Buffer>,
}

/// `asset` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// glTF version, always `"2.0"`.
    pub version: String,
    /// Producing tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
}

/// A scene: root node indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Root nodes.
    pub nodes: Vec<u32>,
}

/// A node referencing one mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Mesh index.
    pub mesh: u32,
}

/// A mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Primitives.
    pub primitives: Vec<Primitive>,
}

/// A draw call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    /// Vertex attributes.
    pub attributes: Attributes,
    /// Index accessor.
    pub indices: u32,
    /// Topology.
    pub mode: u32,
}

/// Vertex attribute accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    /// Position accessor.
    #[serde(rename = "POSITION")]
    pub position: u32,
}

/// Typed view over a buffer view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessor {
    /// Buffer view index.
    pub buffer_view: u32,
    /// Offset within the buffer view.
    #[serde(default)]
    pub byte_offset: u64,
    /// Component type.
    pub component_type: u32,
    /// Element count.
    pub count: u64,
    /// Element shape (`"VEC3"`, `"SCALAR"`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Per-component minimum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Vec<f32>>,
    /// Per-component maximum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Vec<f32>>,
}

/// A byte range of a buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    /// Buffer index.
    pub buffer: u32,
    /// Start of the range.
    #[serde(default)]
    pub byte_offset: u64,
    /// Length of the range.
    pub byte_length: u64,
    /// GPU binding hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
}

/// Raw bytes. A buffer without a URI lives in the GLB binary chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buffer {
    /// Length in bytes.
    pub byte_length: u64,
    /// External or data URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// Where positions and indices sit in the binary buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BufferLayout {
    pub vertex_count: usize,
    pub index_count: usize,
    pub positions_length: usize,
    pub indices_offset: usize,
    pub indices_length: usize,
    pub total_length: usize,
}

impl Document {
    /// One scene → one node → one mesh → one triangle primitive.
    pub(crate) fn single_mesh(layout: &BufferLayout, min: [f32; 3], max: [f32; 3], uri: Option<String>) -> Self {
        Document {
            asset: Asset {
                version: "2.0".into(),
                generator: Some(format!("stepmesh {}", env!("CARGO_PKG_VERSION"))),
            },
            scene: 0,
            scenes: vec![Scene { nodes: vec![0] }],
            nodes: vec![Node { mesh: 0 }],
            meshes: vec![Mesh {
                primitives: vec![Primitive {
                    attributes: Attributes { position: 0 },
                    indices: 1,
                    mode: TRIANGLES,
                }],
            }],
            accessors: vec![
                Accessor {
                    buffer_view: 0,
                    byte_offset: 0,
                    component_type: FLOAT,
                    count: layout.vertex_count as u64,
                    kind: "VEC3".into(),
                    min: Some(min.to_vec()),
                    max: Some(max.to_vec()),
                },
                Accessor {
                    buffer_view: 1,
                    byte_offset: 0,
                    component_type: UNSIGNED_INT,
                    count: layout.index_count as u64,
                    kind: "SCALAR".into(),
                    min: None,
                    max: None,
                },
            ],
            buffer_views: vec![
                BufferView {
                    buffer: 0,
                    byte_offset: 0,
                    byte_length: layout.positions_length as u64,
                    target: Some(ARRAY_BUFFER),
                },
                BufferView {
                    buffer: 0,
                    byte_offset: layout.indices_offset as u64,
                    byte_length: layout.indices_length as u64,
                    target: Some(ELEMENT_ARRAY_BUFFER),
                },
            ],
            buffers: vec![Buffer {
                byte_length: layout.total_length as u64,
                uri,
            }],
        }
    }
}
