//! Per-face triangulation output.

use stepmesh_math::{Point3, Transform};

use crate::error::FragmentError;

/// One surface patch's triangle soup, indexed locally.
///
/// Points may live in the patch's own frame; `placement` maps them into the
/// model frame. Construction checks that every index is in range, so a
/// fragment that exists is always safe to merge.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangulationFragment {
    points: Vec<Point3>,
    triangles: Vec<[u32; 3]>,
    placement: Option<Transform>,
}

impl TriangulationFragment {
    /// Build a fragment, validating indices, coordinates, and placement.
    pub fn new(
        points: Vec<Point3>,
        triangles: Vec<[u32; 3]>,
        placement: Option<Transform>,
    ) -> Result<Self, FragmentError> {
        if u32::try_from(points.len()).is_err() {
            return Err(FragmentError::TooManyPoints(points.len()));
        }
        if let Some(i) = points.iter().position(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return Err(FragmentError::NonFinitePoint(i));
        }
        for (triangle, tri) in triangles.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= points.len()) {
                return Err(FragmentError::IndexOutOfRange {
                    triangle,
                    index,
                    len: points.len(),
                });
            }
        }
        if placement.as_ref().is_some_and(|t| !t.is_affine()) {
            return Err(FragmentError::InvalidPlacement);
        }
        Ok(Self {
            points,
            triangles,
            placement,
        })
    }

    /// An empty fragment, for faces that produced nothing.
    pub fn empty() -> Self {
        Self {
            points: Vec::new(),
            triangles: Vec::new(),
            placement: None,
        }
    }

    /// Points in the fragment's local frame.
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Local index triples.
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Local-to-model transform, if any.
    pub fn placement(&self) -> Option<&Transform> {
        self.placement.as_ref()
    }

    /// True when there are no points or no triangles.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() || self.triangles.is_empty()
    }

    /// Point `i` in the model frame.
    pub fn model_point(&self, i: usize) -> Option<Point3> {
        let p = self.points.get(i)?;
        Some(match &self.placement {
            Some(t) => t.apply_point(p),
            None => *p,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri() -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_valid_fragment() {
        let f = TriangulationFragment::new(tri(), vec![[0, 1, 2]], None).unwrap();
        assert_eq!(f.points().len(), 3);
        assert!(!f.is_empty());
        assert_eq!(f.model_point(1), Some(Point3::new(1.0, 0.0, 0.0)));
        assert_eq!(f.model_point(3), None);
    }

    #[test]
    fn test_placement_moves_model_points() {
        let f = TriangulationFragment::new(
            tri(),
            vec![[0, 1, 2]],
            Some(Transform::translation(0.0, 0.0, 5.0)),
        )
        .unwrap();
        assert_eq!(f.model_point(0), Some(Point3::new(0.0, 0.0, 5.0)));
    }

    #[test]
    fn test_rejects_out_of_range_index() {
        let err = TriangulationFragment::new(tri(), vec![[0, 1, 2], [0, 3, 1]], None).unwrap_err();
        assert_eq!(
            err,
            FragmentError::IndexOutOfRange {
                triangle: 1,
                index: 3,
                len: 3
            }
        );
    }

    #[test]
    fn test_rejects_bad_points_and_placements() {
        let mut points = tri();
        points[2].y = f64::NAN;
        assert_eq!(
            TriangulationFragment::new(points, vec![], None).unwrap_err(),
            FragmentError::NonFinitePoint(2)
        );

        let mut projective = Transform::identity();
        projective.matrix[(3, 0)] = 1.0;
        assert_eq!(
            TriangulationFragment::new(tri(), vec![[0, 1, 2]], Some(projective)).unwrap_err(),
            FragmentError::InvalidPlacement
        );
    }

    #[test]
    fn test_empty() {
        assert!(TriangulationFragment::empty().is_empty());
        assert!(TriangulationFragment::new(tri(), vec![], None).unwrap().is_empty());
    }
}
