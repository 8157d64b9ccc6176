//! Property-based tests for the GLB container layout.
//!
//! Run with: cargo test -p stepmesh-glb --test properties

use proptest::prelude::*;
use stepmesh_glb::{encode, inspect, CHUNK_BIN, CHUNK_HEADER_LENGTH, CHUNK_JSON, GLB_MAGIC, HEADER_LENGTH};
use stepmesh_mesh::GlobalMesh;

fn arb_vertex() -> impl Strategy<Value = [f32; 3]> {
    prop::array::uniform3(prop_oneof![
        -1.0e6f32..1.0e6,
        -1.0f32..1.0,
        Just(0.0f32),
        any::<i16>().prop_map(f32::from),
    ])
}

/// Meshes of varied size and coordinate text length, so the JSON chunk
/// lands on every padding remainder.
fn arb_mesh() -> impl Strategy<Value = GlobalMesh> {
    (1usize..64).prop_flat_map(|n| {
        (
            prop::collection::vec(arb_vertex(), n),
            prop::collection::vec(prop::array::uniform3(0..n as u32), 1..48),
        )
            .prop_map(|(vertices, indices)| GlobalMesh::new(vertices, indices).unwrap())
    })
}

fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
}

proptest! {
    /// Header length is exactly the header plus both padded chunks.
    #[test]
    fn total_length_matches_padded_chunks(mesh in arb_mesh()) {
        let bytes = encode(&mesh, &mesh.bounds()).unwrap();

        prop_assert_eq!(u32_at(&bytes, 0), GLB_MAGIC);
        prop_assert_eq!(bytes.len() % 4, 0);
        prop_assert_eq!(u32_at(&bytes, 8) as usize, bytes.len());

        let json_length = u32_at(&bytes, HEADER_LENGTH) as usize;
        prop_assert_eq!(u32_at(&bytes, HEADER_LENGTH + 4), CHUNK_JSON);
        prop_assert_eq!(json_length % 4, 0);

        let bin_header = HEADER_LENGTH + CHUNK_HEADER_LENGTH + json_length;
        let bin_length = u32_at(&bytes, bin_header) as usize;
        prop_assert_eq!(u32_at(&bytes, bin_header + 4), CHUNK_BIN);
        prop_assert_eq!(bin_length % 4, 0);
        prop_assert_eq!(bin_length, mesh.vertex_count() * 12 + mesh.triangle_count() * 12);

        prop_assert_eq!(
            bytes.len(),
            HEADER_LENGTH + CHUNK_HEADER_LENGTH + json_length + CHUNK_HEADER_LENGTH + bin_length
        );

        // JSON padding is spaces only.
        let json = &bytes[HEADER_LENGTH + CHUNK_HEADER_LENGTH..bin_header];
        let text_end = json.iter().rposition(|&b| b != b' ').map_or(0, |i| i + 1);
        prop_assert!(json.len() - text_end < 4);
    }

    /// `inspect` reads back the sizes, counts, and bounds that were written.
    #[test]
    fn inspect_reads_back_layout(mesh in arb_mesh()) {
        let bounds = mesh.bounds();
        let bytes = encode(&mesh, &bounds).unwrap();
        let layout = inspect(&bytes).unwrap();

        prop_assert_eq!(layout.total_length as usize, bytes.len());
        prop_assert_eq!(
            layout.total_length as usize,
            HEADER_LENGTH
                + CHUNK_HEADER_LENGTH
                + layout.json_length as usize
                + CHUNK_HEADER_LENGTH
                + layout.bin_length as usize
        );
        prop_assert_eq!(layout.vertex_count(), Some(mesh.vertex_count() as u64));
        prop_assert_eq!(layout.triangle_count(), Some(mesh.triangle_count() as u64));

        let positions = &layout.document.accessors[0];
        prop_assert_eq!(positions.min.as_deref(), Some(&bounds.min[..]));
        prop_assert_eq!(positions.max.as_deref(), Some(&bounds.max[..]));

        let views = &layout.document.buffer_views;
        prop_assert_eq!(views[1].byte_offset, views[0].byte_length);
        prop_assert_eq!(layout.document.buffers[0].byte_length, layout.bin_length as u64);
    }
}
