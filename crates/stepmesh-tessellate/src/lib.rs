#![warn(missing_docs)]

//! Deflection-controlled tessellation of STEP B-rep faces.
//!
//! A [`Tessellator`] turns a [`StepShape`] into one [`TriangulationFragment`]
//! per face. [`FaceTessellator`] handles planes, cylinders, cones, and
//! spheres; it facets each face in its surface's local frame and attaches
//! the local→model transform as the fragment's placement.
//!
//! ```no_run
//! use stepmesh_tessellate::{Deflection, FaceTessellator, Tessellator};
//!
//! let shape = stepmesh_step::read_step("part.step")?;
//! let fragments = FaceTessellator.tessellate(&shape, &Deflection::default())?;
//! println!("{} fragments", fragments.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod boundary;
mod deflection;
mod error;
mod polygon;
mod surfaces;

pub use boundary::{angular_trace, sample_loop, AngularTrace, LocalFrame};
pub use deflection::{arc_segments, Deflection, MAX_ARC_SEGMENTS};
pub use error::TessellationError;
pub use polygon::{triangulate, PolygonError, Triangulation};

use stepmesh_mesh::TriangulationFragment;
use stepmesh_step::{ShapeFace, StepShape, SurfaceKind};
use tracing::{debug, info, warn};

use surfaces::{LocalLoop, LocalMesh};

/// Anything that can facet a shape.
pub trait Tessellator {
    /// Produce fragments for every facetable face, in face order.
    fn tessellate(
        &self,
        shape: &StepShape,
        deflection: &Deflection,
    ) -> Result<Vec<TriangulationFragment>, TessellationError>;
}

/// The built-in analytic-surface tessellator.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaceTessellator;

impl Tessellator for FaceTessellator {
    fn tessellate(
        &self,
        shape: &StepShape,
        deflection: &Deflection,
    ) -> Result<Vec<TriangulationFragment>, TessellationError> {
        deflection.validate()?;

        let mut fragments = Vec::with_capacity(shape.faces.len());
        let mut skipped = 0usize;
        for face in &shape.faces {
            match tessellate_face(face, deflection)? {
                Some(fragment) => fragments.push(fragment),
                None => skipped += 1,
            }
        }

        info!(
            faces = shape.faces.len(),
            fragments = fragments.len(),
            skipped,
            linear = deflection.linear,
            angular = deflection.angular,
            "tessellated shape"
        );
        Ok(fragments)
    }
}

/// Facet one face. Returns `Ok(None)` for surfaces this tessellator cannot
/// handle.
pub fn tessellate_face(
    face: &ShapeFace,
    deflection: &Deflection,
) -> Result<Option<TriangulationFragment>, TessellationError> {
    let Some(placement) = face.surface.placement() else {
        warn!(face = face.id, surface = face.surface.name(), "skipping unsupported surface");
        return Ok(None);
    };

    let frame = LocalFrame::new(placement);
    let loops: Vec<LocalLoop> = face
        .loops
        .iter()
        .map(|lp| LocalLoop {
            is_outer: lp.is_outer,
            points: sample_loop(lp, deflection).iter().map(|p| frame.to_local(p)).collect(),
        })
        .collect();

    let LocalMesh { points, triangles } = match &face.surface {
        SurfaceKind::Plane { .. } => surfaces::plane(face.id, &loops, face.same_sense)?,
        SurfaceKind::Cylinder { radius, .. } => {
            surfaces::cylinder(face.id, *radius, &loops, face.same_sense, deflection)?
        }
        SurfaceKind::Cone {
            radius, semi_angle, ..
        } => surfaces::cone(face.id, *radius, *semi_angle, &loops, face.same_sense, deflection)?,
        SurfaceKind::Sphere { radius, .. } => {
            surfaces::sphere(face.id, *radius, &loops, face.same_sense, deflection)?
        }
        SurfaceKind::Unsupported(_) => return Ok(None),
    };

    debug!(
        face = face.id,
        surface = face.surface.name(),
        points = points.len(),
        triangles = triangles.len(),
        "tessellated face"
    );

    TriangulationFragment::new(points, triangles, Some(placement.to_transform()))
        .map(Some)
        .map_err(|source| TessellationError::Fragment {
            face_id: face.id,
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepmesh_math::Point3;
    use stepmesh_step::{AxisPlacement, BoundaryLoop, EdgeGeometry, LoopSegment};

    fn square_face(id: u64, surface: SurfaceKind) -> ShapeFace {
        let corners = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let segments = (0..4)
            .map(|i| LoopSegment {
                start: corners[i],
                end: corners[(i + 1) % 4],
                curve: EdgeGeometry::Line,
                forward: true,
            })
            .collect();
        ShapeFace {
            id,
            surface,
            same_sense: true,
            loops: vec![BoundaryLoop {
                is_outer: true,
                segments,
            }],
        }
    }

    #[test]
    fn test_plane_face_fragment() {
        let face = square_face(
            10,
            SurfaceKind::Plane {
                placement: AxisPlacement::world(),
            },
        );
        let fragment = tessellate_face(&face, &Deflection::default()).unwrap().unwrap();
        assert_eq!(fragment.points().len(), 4);
        assert_eq!(fragment.triangles().len(), 2);
        assert!(fragment.placement().is_some());
    }

    #[test]
    fn test_unsupported_faces_are_skipped() {
        let shape = StepShape {
            faces: vec![
                square_face(1, SurfaceKind::Unsupported("TOROIDAL_SURFACE".into())),
                square_face(
                    2,
                    SurfaceKind::Plane {
                        placement: AxisPlacement::world(),
                    },
                ),
            ],
            ..Default::default()
        };
        let fragments = FaceTessellator.tessellate(&shape, &Deflection::default()).unwrap();
        assert_eq!(fragments.len(), 1);
    }

    #[test]
    fn test_invalid_deflection_is_rejected_up_front() {
        let shape = StepShape::default();
        let bad = Deflection {
            linear: 0.0,
            angular: 0.5,
        };
        assert!(matches!(
            FaceTessellator.tessellate(&shape, &bad),
            Err(TessellationError::InvalidDeflection { .. })
        ));
    }

    #[test]
    fn test_face_error_carries_face_id() {
        let mut face = square_face(
            42,
            SurfaceKind::Plane {
                placement: AxisPlacement::world(),
            },
        );
        face.loops[0].segments.truncate(2);
        face.loops[0].segments[1].end = face.loops[0].segments[0].start;
        let err = tessellate_face(&face, &Deflection::default()).unwrap_err();
        assert!(matches!(err, TessellationError::Face { face_id: 42, .. }));
        assert!(err.to_string().starts_with("face #42"));
    }
}
