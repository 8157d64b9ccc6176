//! The merged, globally indexed mesh and its bounding box.

use crate::error::MeshError;

/// One vertex buffer plus one triangle index buffer.
///
/// Every index is in range and there is at least one triangle; both are
/// checked on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalMesh {
    vertices: Vec<[f32; 3]>,
    indices: Vec<[u32; 3]>,
}

impl GlobalMesh {
    /// Build a mesh, validating its invariants.
    pub fn new(vertices: Vec<[f32; 3]>, indices: Vec<[u32; 3]>) -> Result<Self, MeshError> {
        if vertices.is_empty() || indices.is_empty() {
            return Err(MeshError::NoGeometry);
        }
        if u32::try_from(vertices.len()).is_err() {
            return Err(MeshError::TooManyVertices(vertices.len()));
        }
        for (triangle, tri) in indices.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= vertices.len()) {
                return Err(MeshError::IndexOutOfRange {
                    triangle,
                    index,
                    vertex_count: vertices.len(),
                });
            }
        }
        Ok(Self { vertices, indices })
    }

    /// Skip validation; callers guarantee the invariants.
    pub(crate) fn from_parts_unchecked(vertices: Vec<[f32; 3]>, indices: Vec<[u32; 3]>) -> Self {
        Self { vertices, indices }
    }

    /// Vertex positions.
    pub fn vertices(&self) -> &[[f32; 3]] {
        &self.vertices
    }

    /// Triangle index triples.
    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Consume the mesh into its buffers.
    pub fn into_parts(self) -> (Vec<[f32; 3]>, Vec<[u32; 3]>) {
        (self.vertices, self.indices)
    }

    /// Bounding box of the vertex buffer.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.vertices)
    }
}

/// Axis-aligned bounding box in single precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: [f32; 3],
    /// Maximum corner.
    pub max: [f32; 3],
}

impl Aabb {
    /// Box around `points`; an inverted (empty) box for no points.
    pub fn from_points(points: &[[f32; 3]]) -> Self {
        let mut aabb = Aabb {
            min: [f32::INFINITY; 3],
            max: [f32::NEG_INFINITY; 3],
        };
        for p in points {
            for axis in 0..3 {
                aabb.min[axis] = aabb.min[axis].min(p[axis]);
                aabb.max[axis] = aabb.max[axis].max(p[axis]);
            }
        }
        aabb
    }

    /// True when the box contains no points.
    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| self.min[axis] > self.max[axis])
    }

    /// Extent along each axis.
    pub fn size(&self) -> [f64; 3] {
        if self.is_empty() {
            return [0.0; 3];
        }
        [0, 1, 2].map(|axis| f64::from(self.max[axis]) - f64::from(self.min[axis]))
    }

    /// Length of the diagonal, `0` for empty boxes.
    pub fn diagonal(&self) -> f64 {
        let [x, y, z] = self.size();
        (x * x + y * y + z * z).sqrt()
    }

    /// True when `p` lies inside or on the box.
    pub fn contains(&self, p: &[f32; 3]) -> bool {
        (0..3).all(|axis| self.min[axis] <= p[axis] && p[axis] <= self.max[axis])
    }
}
