#![warn(missing_docs)]

//! GLB 2.0 container encoding for stepmesh.
//!
//! [`encode`] writes a normalized [`stepmesh_mesh::GlobalMesh`] as one
//! binary glTF: a 12-byte header, a space-padded JSON chunk describing one
//! mesh with one triangle primitive, and a zero-padded BIN chunk holding
//! `f32` positions followed by `u32` indices. [`inspect`] reads the header
//! and chunk table back.

mod embedded;
mod error;
mod glb;
pub mod json;

pub use embedded::{encode_embedded_gltf, DATA_URI_PREFIX};
pub use error::EncodeError;
pub use glb::{
    encode, inspect, padded_length, ContainerLayout, CHUNK_BIN, CHUNK_HEADER_LENGTH, CHUNK_JSON,
    GLB_MAGIC, GLB_VERSION, HEADER_LENGTH,
};
