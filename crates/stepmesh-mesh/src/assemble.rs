//! Merge per-face fragments into one globally indexed mesh.

use tracing::debug;

use crate::error::MeshError;
use crate::fragment::TriangulationFragment;
use crate::mesh::GlobalMesh;

/// Assembly options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssembleOptions {
    /// Apply each fragment's placement before merging. Turning this off
    /// leaves points in their local frames.
    pub apply_placements: bool,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            apply_placements: true,
        }
    }
}

/// Counters collected while assembling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    /// Fragments consumed.
    pub fragments: usize,
    /// Fragments with no points or no triangles.
    pub empty_fragments: usize,
    /// Vertices appended to the global buffer.
    pub raw_vertices: usize,
    /// Triangles emitted.
    pub triangles: usize,
    /// Triangles skipped because two of their indices were equal.
    pub degenerate_triangles: usize,
}

/// Assemble with default options.
pub fn assemble<I>(fragments: I) -> Result<(GlobalMesh, AssemblyStats), MeshError>
where
    I: IntoIterator<Item = TriangulationFragment>,
{
    assemble_with_options(fragments, &AssembleOptions::default())
}

/// Merge fragments, in order, into one [`GlobalMesh`].
///
/// Each fragment's points are placed into the model frame in double
/// precision and narrowed to `f32` only on insertion. Local indices are
/// offset by the number of vertices already in the buffer when the fragment
/// starts. Fails with [`MeshError::NoGeometry`] when nothing survives.
pub fn assemble_with_options<I>(
    fragments: I,
    options: &AssembleOptions,
) -> Result<(GlobalMesh, AssemblyStats), MeshError>
where
    I: IntoIterator<Item = TriangulationFragment>,
{
    let mut vertices: Vec<[f32; 3]> = Vec::new();
    let mut indices: Vec<[u32; 3]> = Vec::new();
    let mut stats = AssemblyStats::default();

    for (fragment_idx, fragment) in fragments.into_iter().enumerate() {
        stats.fragments += 1;
        if fragment.is_empty() {
            stats.empty_fragments += 1;
        }

        let end = vertices.len() + fragment.points().len();
        if u32::try_from(end).is_err() {
            return Err(MeshError::TooManyVertices(end));
        }
        let base = vertices.len() as u32;

        let placement = fragment.placement().filter(|_| options.apply_placements);
        vertices.reserve(fragment.points().len());
        for (point_idx, p) in fragment.points().iter().enumerate() {
            let p = match placement {
                Some(t) => t.apply_point(p),
                None => *p,
            };
            let v = [p.x as f32, p.y as f32, p.z as f32];
            if !v.iter().all(|c| c.is_finite()) {
                return Err(MeshError::NonFiniteVertex {
                    fragment: fragment_idx,
                    point: point_idx,
                });
            }
            vertices.push(v);
        }

        for &[a, b, c] in fragment.triangles() {
            if a == b || b == c || a == c {
                stats.degenerate_triangles += 1;
                continue;
            }
            indices.push([a + base, b + base, c + base]);
        }
    }

    stats.raw_vertices = vertices.len();
    stats.triangles = indices.len();
    debug!(
        fragments = stats.fragments,
        vertices = stats.raw_vertices,
        triangles = stats.triangles,
        degenerate = stats.degenerate_triangles,
        "assembled fragments"
    );

    if vertices.is_empty() || indices.is_empty() {
        return Err(MeshError::NoGeometry);
    }
    Ok((GlobalMesh::from_parts_unchecked(vertices, indices), stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepmesh_math::{Point3, Transform};

    fn fragment(points: &[[f64; 3]], triangles: &[[u32; 3]], placement: Option<Transform>) -> TriangulationFragment {
        TriangulationFragment::new(
            points.iter().map(|&[x, y, z]| Point3::new(x, y, z)).collect(),
            triangles.to_vec(),
            placement,
        )
        .unwrap()
    }

    #[test]
    fn test_offsets_follow_fragment_order() {
        let a = fragment(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], &[[0, 1, 2]], None);
        let b = fragment(&[[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]], &[[0, 1, 2]], None);
        let (mesh, stats) = assemble([a, b]).unwrap();
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.indices(), &[[0, 1, 2], [3, 4, 5]]);
        assert_eq!(stats.fragments, 2);
        assert_eq!(stats.raw_vertices, 6);
    }

    #[test]
    fn test_placement_applied_in_double_precision() {
        // Narrowing before the placement would round 1e8 + 0.25 to 1e8.
        let t = Transform::translation(-1e8, 0.0, 2.0);
        let f = fragment(
            &[[1e8 + 0.25, 0.0, 0.0], [1e8, 0.0, 0.0], [1e8, 1.0, 0.0]],
            &[[0, 1, 2]],
            Some(t),
        );
        let (mesh, _) = assemble([f]).unwrap();
        assert_eq!(mesh.vertices()[0], [0.25, 0.0, 2.0]);
    }

    #[test]
    fn test_placements_can_be_disabled() {
        let f = fragment(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[[0, 1, 2]],
            Some(Transform::translation(0.0, 0.0, 9.0)),
        );
        let options = AssembleOptions {
            apply_placements: false,
        };
        let (mesh, _) = assemble_with_options([f], &options).unwrap();
        assert_eq!(mesh.vertices()[0], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_index_degenerate_triangles_are_skipped() {
        let f = fragment(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[[0, 1, 2], [0, 0, 1], [2, 1, 2]],
            None,
        );
        let (mesh, stats) = assemble([f]).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(stats.degenerate_triangles, 2);
    }

    #[test]
    fn test_no_geometry() {
        assert_eq!(assemble(Vec::new()), Err(MeshError::NoGeometry));
        assert_eq!(
            assemble([TriangulationFragment::empty(), TriangulationFragment::empty()]),
            Err(MeshError::NoGeometry)
        );
        let only_degenerate = fragment(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]], &[[0, 1, 1]], None);
        assert_eq!(assemble([only_degenerate]), Err(MeshError::NoGeometry));
    }

    #[test]
    fn test_overflow_to_f32_is_rejected() {
        let f = fragment(&[[1e300, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], &[[0, 1, 2]], None);
        assert_eq!(
            assemble([f]),
            Err(MeshError::NonFiniteVertex { fragment: 0, point: 0 })
        );
    }
}
