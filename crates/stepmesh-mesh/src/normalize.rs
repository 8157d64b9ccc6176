//! Vertex welding, degenerate removal, compaction, and bounds.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MeshError;
use crate::mesh::{Aabb, GlobalMesh};

/// How close two vertices must be to weld.
///
/// Serializes externally tagged, e.g. `{ relative = 1e-6 }` in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeldTolerance {
    /// Fraction of the input bounding-box diagonal.
    Relative(f64),
    /// Distance in model units.
    Absolute(f64),
}

impl Default for WeldTolerance {
    fn default() -> Self {
        WeldTolerance::Relative(1e-6)
    }
}

impl WeldTolerance {
    /// Resolve to a distance for a mesh with the given bounds.
    pub fn epsilon(&self, bounds: &Aabb) -> Result<f64, MeshError> {
        let (value, eps) = match *self {
            WeldTolerance::Relative(f) => (f, f * bounds.diagonal()),
            WeldTolerance::Absolute(d) => (d, d),
        };
        if value < 0.0 || !value.is_finite() {
            return Err(MeshError::InvalidTolerance(value));
        }
        Ok(eps)
    }
}

/// Normalization parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NormalizeParams {
    /// Weld distance.
    pub weld: WeldTolerance,
}

/// Counters collected while normalizing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NormalizeStats {
    /// Resolved weld distance.
    pub epsilon: f64,
    /// Vertices in.
    pub input_vertices: usize,
    /// Triangles in.
    pub input_triangles: usize,
    /// Vertices merged into an earlier one.
    pub welded_vertices: usize,
    /// Triangles dropped after welding.
    pub degenerate_triangles: usize,
    /// Vertices dropped because no triangle used them.
    pub unreferenced_vertices: usize,
}

/// A mesh ready for encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMesh {
    /// Welded, compacted mesh.
    pub mesh: GlobalMesh,
    /// Bounds of `mesh`.
    pub bounds: Aabb,
    /// What normalization did.
    pub stats: NormalizeStats,
}

/// Weld near-duplicate vertices, drop collapsed triangles and unused
/// vertices, and compute bounds.
///
/// Welding keeps the first vertex (in buffer order) of every cluster and never
/// moves it, so normalizing a normalized mesh changes nothing. Fails with
/// [`MeshError::DegenerateMesh`] when no triangle survives.
pub fn normalize(mesh: GlobalMesh, params: &NormalizeParams) -> Result<NormalizedMesh, MeshError> {
    let epsilon = params.weld.epsilon(&mesh.bounds())?;
    let (vertices, indices) = mesh.into_parts();
    let mut stats = NormalizeStats {
        epsilon,
        input_vertices: vertices.len(),
        input_triangles: indices.len(),
        ..Default::default()
    };

    let remap = weld_remap(&vertices, epsilon);
    stats.welded_vertices = remap.iter().enumerate().filter(|&(i, &r)| r as usize != i).count();

    let mut welded: Vec<[u32; 3]> = Vec::with_capacity(indices.len());
    for tri in &indices {
        let [a, b, c] = tri.map(|i| remap[i as usize]);
        if a == b || b == c || a == c {
            stats.degenerate_triangles += 1;
        } else {
            welded.push([a, b, c]);
        }
    }
    if welded.is_empty() {
        return Err(MeshError::DegenerateMesh {
            input_triangles: stats.input_triangles,
        });
    }

    // Compact: keep referenced vertices in their original order.
    let mut referenced = vec![false; vertices.len()];
    for &i in welded.iter().flatten() {
        referenced[i as usize] = true;
    }
    let mut compact = vec![u32::MAX; vertices.len()];
    let mut kept = Vec::with_capacity(vertices.len());
    for (i, v) in vertices.iter().enumerate() {
        if referenced[i] {
            compact[i] = kept.len() as u32;
            kept.push(*v);
        }
    }
    stats.unreferenced_vertices = vertices.len() - kept.len() - stats.welded_vertices;
    for tri in &mut welded {
        *tri = tri.map(|i| compact[i as usize]);
    }

    let mesh = GlobalMesh::from_parts_unchecked(kept, welded);
    let bounds = mesh.bounds();
    debug!(
        epsilon,
        welded = stats.welded_vertices,
        degenerate = stats.degenerate_triangles,
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "normalized mesh"
    );
    Ok(NormalizedMesh {
        mesh,
        bounds,
        stats,
    })
}

/// Old index → representative index. Representatives map to themselves.
fn weld_remap(vertices: &[[f32; 3]], epsilon: f64) -> Vec<u32> {
    if epsilon > 0.0 {
        weld_within(vertices, epsilon)
    } else {
        weld_exact(vertices)
    }
}

fn weld_exact(vertices: &[[f32; 3]]) -> Vec<u32> {
    let mut seen: HashMap<[u32; 3], u32> = HashMap::with_capacity(vertices.len());
    vertices
        .iter()
        .enumerate()
        // `+ 0.0` folds -0.0 into 0.0 so both hash alike.
        .map(|(i, v)| *seen.entry(v.map(|c| (c + 0.0).to_bits())).or_insert(i as u32))
        .collect()
}

/// Largest cell coordinate magnitude: keeps `p / cell_size` exact enough to
/// floor and far from the `i64` range.
const MAX_CELL_INDEX: f64 = (1u64 << 40) as f64;

fn weld_within(vertices: &[[f32; 3]], epsilon: f64) -> Vec<u32> {
    // Cells never shrink below epsilon, so neighbors within reach stay in
    // the surrounding 3x3x3 block.
    let max_abs = vertices
        .iter()
        .flatten()
        .fold(0.0f64, |m, &c| m.max(f64::from(c).abs()));
    let cell_size = epsilon.max(max_abs / MAX_CELL_INDEX);

    let mut grid: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
    let mut remap = Vec::with_capacity(vertices.len());

    for (idx, v) in vertices.iter().enumerate() {
        let p = v.map(f64::from);
        let cell = pos_to_cell(&p, cell_size);

        // The earliest representative within reach wins.
        let mut found: Option<u32> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let neighbor = (
                        cell.0.saturating_add(dx),
                        cell.1.saturating_add(dy),
                        cell.2.saturating_add(dz),
                    );
                    let Some(candidates) = grid.get(&neighbor) else {
                        continue;
                    };
                    for &rep in candidates {
                        if found.is_some_and(|f| f <= rep) {
                            continue;
                        }
                        let q = vertices[rep as usize].map(f64::from);
                        let d2 = (p[0] - q[0]).powi(2) + (p[1] - q[1]).powi(2) + (p[2] - q[2]).powi(2);
                        if d2.sqrt() <= epsilon {
                            found = Some(rep);
                        }
                    }
                }
            }
        }

        match found {
            Some(rep) => remap.push(rep),
            None => {
                grid.entry(cell).or_default().push(idx as u32);
                remap.push(idx as u32);
            }
        }
    }
    remap
}

fn pos_to_cell(p: &[f64; 3], cell_size: f64) -> (i64, i64, i64) {
    (
        (p[0] / cell_size).floor() as i64,
        (p[1] / cell_size).floor() as i64,
        (p[2] / cell_size).floor() as i64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mesh(vertices: &[[f32; 3]], indices: &[[u32; 3]]) -> GlobalMesh {
        GlobalMesh::new(vertices.to_vec(), indices.to_vec()).unwrap()
    }

    #[test]
    fn test_shared_edge_is_welded() {
        let m = mesh(
            &[
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            &[[0, 1, 2], [3, 4, 5]],
        );
        let n = normalize(m, &NormalizeParams::default()).unwrap();
        assert_eq!(n.mesh.vertex_count(), 4);
        assert_eq!(n.mesh.indices(), &[[0, 1, 2], [1, 3, 2]]);
        assert_eq!(n.stats.welded_vertices, 2);
        assert_eq!(n.bounds.min, [0.0, 0.0, 0.0]);
        assert_eq!(n.bounds.max, [1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_near_duplicates_weld_to_first() {
        let m = mesh(
            &[[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [0.0, 10.0, 0.0], [10.000001, 0.0, 0.0], [10.0, 10.0, 0.0]],
            &[[0, 1, 2], [3, 4, 2]],
        );
        let n = normalize(m, &NormalizeParams::default()).unwrap();
        assert_eq!(n.mesh.vertex_count(), 4);
        assert_eq!(n.mesh.vertices()[1], [10.0, 0.0, 0.0]);
        assert_eq!(n.mesh.indices()[1], [1, 3, 2]);
    }

    #[test]
    fn test_relative_epsilon() {
        let m = mesh(&[[0.0, 0.0, 0.0], [3.0, 0.0, 0.0], [0.0, 4.0, 0.0]], &[[0, 1, 2]]);
        let n = normalize(m, &NormalizeParams::default()).unwrap();
        assert_relative_eq!(n.stats.epsilon, 5e-6, epsilon = 1e-12);
    }

    #[test]
    fn test_far_from_origin_with_relative_tolerance() {
        let m = mesh(
            &[[0.0, 0.0, 1e20], [1.0, 0.0, 1e20], [0.0, 1.0, 1e20], [0.0, 0.0, 1e20]],
            &[[0, 1, 2], [3, 1, 2]],
        );
        let n = normalize(m, &NormalizeParams::default()).unwrap();
        assert_eq!(n.mesh.vertex_count(), 3);
        assert_eq!(n.mesh.indices(), &[[0, 1, 2], [0, 1, 2]]);
        assert_eq!(n.stats.welded_vertices, 1);
    }

    #[test]
    fn test_tiny_absolute_tolerance_at_large_coordinates() {
        let m = mesh(&[[1e7, 0.0, 0.0], [1e7 + 1.0, 0.0, 0.0], [1e7, 1.0, 0.0]], &[[0, 1, 2]]);
        let params = NormalizeParams {
            weld: WeldTolerance::Absolute(1e-12),
        };
        let n = normalize(m, &params).unwrap();
        assert_eq!(n.mesh.vertex_count(), 3);
        assert_eq!(n.stats.welded_vertices, 0);
        assert_eq!(normalize(n.mesh.clone(), &params).unwrap().mesh, n.mesh);
    }

    #[test]
    fn test_degenerate_mesh() {
        let m = mesh(&[[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]], &[[0, 1, 2]]);
        assert_eq!(
            normalize(m, &NormalizeParams::default()),
            Err(MeshError::DegenerateMesh { input_triangles: 1 })
        );
    }

    #[test]
    fn test_unreferenced_vertices_are_dropped() {
        let m = mesh(
            &[[5.0, 5.0, 5.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[[1, 2, 3]],
        );
        let n = normalize(m, &NormalizeParams::default()).unwrap();
        assert_eq!(n.mesh.vertex_count(), 3);
        assert_eq!(n.mesh.indices(), &[[0, 1, 2]]);
        assert_eq!(n.stats.unreferenced_vertices, 1);
        assert_eq!(n.bounds.max, [1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_zero_tolerance_welds_exact_duplicates_only() {
        let m = mesh(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [-0.0, 0.0, 0.0], [1.0, 1e-7, 0.0]],
            &[[0, 1, 2], [3, 4, 2]],
        );
        let params = NormalizeParams {
            weld: WeldTolerance::Absolute(0.0),
        };
        let n = normalize(m, &params).unwrap();
        assert_eq!(n.mesh.vertex_count(), 4);
        assert_eq!(n.mesh.indices()[1], [0, 3, 2]);
    }

    #[test]
    fn test_invalid_tolerance() {
        let m = mesh(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], &[[0, 1, 2]]);
        let params = NormalizeParams {
            weld: WeldTolerance::Absolute(-1.0),
        };
        assert_eq!(normalize(m, &params), Err(MeshError::InvalidTolerance(-1.0)));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let m = mesh(
            &[
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0],
            ],
            &[[0, 1, 2], [3, 4, 5], [6, 0, 1]],
        );
        let once = normalize(m, &NormalizeParams::default()).unwrap();
        let twice = normalize(once.mesh.clone(), &NormalizeParams::default()).unwrap();
        assert_eq!(once.mesh, twice.mesh);
        assert_eq!(once.bounds, twice.bounds);
        assert_eq!(twice.stats.welded_vertices, 0);
        assert_eq!(twice.stats.degenerate_triangles, 0);
    }
}
