//! Property-based tests for assembly and normalization.
//!
//! Run with: cargo test -p stepmesh-mesh --test properties

use proptest::prelude::*;
use stepmesh_math::{Point3, Transform};
use stepmesh_mesh::{
    assemble, normalize, GlobalMesh, MeshError, NormalizeParams, TriangulationFragment,
};

// =============================================================================
// Strategies
// =============================================================================

fn arb_point() -> impl Strategy<Value = Point3> {
    prop::array::uniform3(-100.0..100.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

fn arb_placement() -> impl Strategy<Value = Option<Transform>> {
    prop::option::of(
        (prop::array::uniform3(-50.0..50.0f64), -3.2..3.2f64).prop_map(|([x, y, z], angle)| {
            Transform::translation(x, y, z).then(&Transform::rotation_z(angle))
        }),
    )
}

/// A fragment with valid indices; some triangles may be index-degenerate.
fn arb_fragment() -> impl Strategy<Value = TriangulationFragment> {
    (3usize..12).prop_flat_map(|n| {
        (
            prop::collection::vec(arb_point(), n),
            prop::collection::vec(prop::array::uniform3(0..n as u32), 0..10),
            arb_placement(),
        )
            .prop_map(|(points, triangles, placement)| {
                TriangulationFragment::new(points, triangles, placement).unwrap()
            })
    })
}

fn arb_fragments() -> impl Strategy<Value = Vec<TriangulationFragment>> {
    prop::collection::vec(arb_fragment(), 1..6)
}

fn is_degenerate(&[a, b, c]: &[u32; 3]) -> bool {
    a == b || b == c || a == c
}

// =============================================================================
// Assembly
// =============================================================================

proptest! {
    /// Every global index is in range and resolves to the placed point its
    /// source fragment contributed.
    #[test]
    fn assembled_indices_resolve_to_source_points(fragments in arb_fragments()) {
        let expected_triangles: usize = fragments
            .iter()
            .map(|f| f.triangles().iter().filter(|t| !is_degenerate(t)).count())
            .sum();

        match assemble(fragments.clone()) {
            Ok((mesh, stats)) => {
                prop_assert_eq!(mesh.triangle_count(), expected_triangles);
                prop_assert_eq!(stats.triangles, expected_triangles);

                let mut global = mesh.indices().iter();
                for fragment in &fragments {
                    for local in fragment.triangles().iter().filter(|t| !is_degenerate(t)) {
                        let emitted = global.next().unwrap();
                        for k in 0..3 {
                            prop_assert!((emitted[k] as usize) < mesh.vertex_count());
                            let p = fragment.model_point(local[k] as usize).unwrap();
                            let v = mesh.vertices()[emitted[k] as usize];
                            prop_assert_eq!(v, [p.x as f32, p.y as f32, p.z as f32]);
                        }
                    }
                }
            }
            Err(e) => {
                prop_assert_eq!(e, MeshError::NoGeometry);
                prop_assert_eq!(expected_triangles, 0);
            }
        }
    }

    /// Vertex count is the sum of fragment point counts.
    #[test]
    fn assembled_vertex_count_is_sum_of_points(fragments in arb_fragments()) {
        let total: usize = fragments.iter().map(|f| f.points().len()).sum();
        if let Ok((mesh, _)) = assemble(fragments) {
            prop_assert_eq!(mesh.vertex_count(), total);
        }
    }
}

// =============================================================================
// Normalization
// =============================================================================

proptest! {
    /// normalize(normalize(m)) == normalize(m).
    #[test]
    fn normalize_is_idempotent(fragments in arb_fragments()) {
        let Ok((mesh, _)) = assemble(fragments) else {
            return Ok(());
        };
        let params = NormalizeParams::default();
        let Ok(once) = normalize(mesh, &params) else {
            return Ok(());
        };
        let twice = normalize(once.mesh.clone(), &params).unwrap();
        prop_assert_eq!(&once.mesh, &twice.mesh);
        prop_assert_eq!(once.bounds, twice.bounds);
    }

    /// Normalized meshes have in-range indices, no collapsed triangles, and
    /// bounds that contain every vertex.
    #[test]
    fn normalized_mesh_is_valid(fragments in arb_fragments()) {
        let Ok((mesh, _)) = assemble(fragments) else {
            return Ok(());
        };
        let Ok(n) = normalize(mesh, &NormalizeParams::default()) else {
            return Ok(());
        };
        for tri in n.mesh.indices() {
            prop_assert!(!is_degenerate(tri));
            prop_assert!(tri.iter().all(|&i| (i as usize) < n.mesh.vertex_count()));
        }
        for v in n.mesh.vertices() {
            prop_assert!(n.bounds.contains(v));
        }
    }

    /// Exact copies of a fragment weld onto the first one.
    #[test]
    fn duplicated_fragments_weld_away(fragment in arb_fragment(), copies in 1usize..4) {
        let Ok((single, _)) = assemble([fragment.clone()]) else {
            return Ok(());
        };
        let Ok(expected) = normalize(single, &NormalizeParams::default()) else {
            return Ok(());
        };
        let (mesh, _) = assemble(std::iter::repeat(fragment).take(copies + 1)).unwrap();
        let welded = normalize(mesh, &NormalizeParams::default()).unwrap();
        prop_assert_eq!(welded.mesh.vertex_count(), expected.mesh.vertex_count());
        prop_assert_eq!(welded.mesh.triangle_count(), expected.mesh.triangle_count() * (copies + 1));
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn two_triangles_sharing_an_edge() {
    let a = TriangulationFragment::new(
        vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
        vec![[0, 1, 2]],
        None,
    )
    .unwrap();
    let b = TriangulationFragment::new(
        vec![Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
        vec![[0, 1, 2]],
        None,
    )
    .unwrap();

    let (mesh, _) = assemble([a, b]).unwrap();
    assert_eq!(mesh.vertex_count(), 6);

    let n = normalize(mesh, &NormalizeParams::default()).unwrap();
    assert_eq!(n.mesh.vertex_count(), 4);
    assert_eq!(n.mesh.triangle_count(), 2);
    assert!(n.mesh.indices().iter().flatten().all(|&i| i < 4));
}

#[test]
fn single_degenerate_triangle() {
    let f = TriangulationFragment::new(
        vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)],
        vec![[0, 1, 2]],
        None,
    )
    .unwrap();
    let (mesh, _) = assemble([f]).unwrap();
    assert!(matches!(
        normalize(mesh, &NormalizeParams::default()),
        Err(MeshError::DegenerateMesh { .. })
    ));
}

#[test]
fn all_empty_fragments() {
    let fragments = vec![TriangulationFragment::empty(); 3];
    assert_eq!(assemble(fragments).unwrap_err(), MeshError::NoGeometry);
    assert!(GlobalMesh::new(Vec::new(), Vec::new()).is_err());
}
