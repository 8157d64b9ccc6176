//! Topology entities: vertices, edges, loops, faces, shells, and solids.
//!
//! Loops are resolved eagerly into [`BoundaryLoop`]s whose segments already
//! run in loop order, so consumers never have to look at edge orientation
//! flags again.

use super::{parse_cartesian_point, parse_edge_geometry, parse_surface, require_type};
use super::{EdgeGeometry, EntityArgs, SurfaceKind};
use crate::error::StepError;
use crate::parser::StepFile;
use stepmesh_math::Point3;

/// Parsed `EDGE_CURVE`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepEdge {
    /// Start vertex position.
    pub start: Point3,
    /// End vertex position.
    pub end: Point3,
    /// Curve geometry.
    pub geometry: EdgeGeometry,
    /// Whether the curve's direction matches the edge's.
    pub same_sense: bool,
}

/// One edge of a boundary loop, in loop order.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopSegment {
    /// Where the loop enters this segment.
    pub start: Point3,
    /// Where the loop leaves this segment.
    pub end: Point3,
    /// Curve the segment follows.
    pub curve: EdgeGeometry,
    /// True when the loop runs along the curve's parametric direction.
    pub forward: bool,
}

impl LoopSegment {
    /// The same segment walked the other way.
    pub fn reversed(&self) -> Self {
        Self {
            start: self.end,
            end: self.start,
            curve: self.curve.clone(),
            forward: !self.forward,
        }
    }
}

/// A closed boundary of a face.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryLoop {
    /// Outer bound (`FACE_OUTER_BOUND`) or hole.
    pub is_outer: bool,
    /// Segments in traversal order. A `VERTEX_LOOP` is one zero-length segment.
    pub segments: Vec<LoopSegment>,
}

impl BoundaryLoop {
    /// True for loops that collapse to a single point, like a cone apex.
    pub fn is_point(&self) -> bool {
        self.segments
            .iter()
            .all(|s| s.start == s.end && matches!(s.curve, EdgeGeometry::Line))
    }
}

/// A face: surface geometry plus its bounding loops.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeFace {
    /// Face entity ID.
    pub id: u64,
    /// Underlying surface.
    pub surface: SurfaceKind,
    /// Whether the face normal agrees with the surface normal.
    pub same_sense: bool,
    /// Bounding loops.
    pub loops: Vec<BoundaryLoop>,
}

/// Parsed `CLOSED_SHELL` / `OPEN_SHELL`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepShell {
    /// Shell entity ID.
    pub id: u64,
    /// Face references; `reversed` is set for `ORIENTED_FACE(.F.)` members.
    pub faces: Vec<FaceRef>,
    /// Whether the shell is closed.
    pub is_closed: bool,
}

/// A shell member face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceRef {
    /// Face entity ID.
    pub id: u64,
    /// The shell uses the face with flipped orientation.
    pub reversed: bool,
}

/// Parse a `VERTEX_POINT` into its position.
pub fn parse_vertex_point(file: &StepFile, id: u64) -> Result<Point3, StepError> {
    let entity = require_type(file, id, &["VERTEX_POINT"])?;
    parse_cartesian_point(file, entity.entity_ref(1)?)
}

/// Parse an `EDGE_CURVE(name, start, end, curve, same_sense)`.
pub fn parse_edge_curve(file: &StepFile, id: u64) -> Result<StepEdge, StepError> {
    let entity = require_type(file, id, &["EDGE_CURVE"])?;
    Ok(StepEdge {
        start: parse_vertex_point(file, entity.entity_ref(1)?)?,
        end: parse_vertex_point(file, entity.entity_ref(2)?)?,
        geometry: parse_edge_geometry(file, entity.entity_ref(3)?)?,
        same_sense: entity.boolean(4)?,
    })
}

/// Parse an `ORIENTED_EDGE(name, *, *, edge, orientation)` into a segment.
pub fn parse_oriented_edge(file: &StepFile, id: u64) -> Result<LoopSegment, StepError> {
    let entity = require_type(file, id, &["ORIENTED_EDGE"])?;
    let edge = parse_edge_curve(file, entity.entity_ref(3)?)?;
    let orientation = entity.boolean(4)?;
    let (start, end) = if orientation {
        (edge.start, edge.end)
    } else {
        (edge.end, edge.start)
    };
    Ok(LoopSegment {
        start,
        end,
        curve: edge.geometry,
        forward: orientation == edge.same_sense,
    })
}

/// Parse any loop entity into segments in traversal order.
pub fn parse_loop(file: &StepFile, id: u64) -> Result<Vec<LoopSegment>, StepError> {
    let entity = require_type(file, id, &["EDGE_LOOP", "POLY_LOOP", "VERTEX_LOOP"])?;
    match entity.type_name.as_str() {
        "EDGE_LOOP" => entity
            .entity_ref_list(1)?
            .into_iter()
            .map(|oe| parse_oriented_edge(file, oe))
            .collect(),
        "POLY_LOOP" => {
            let points = entity
                .entity_ref_list(1)?
                .into_iter()
                .map(|p| parse_cartesian_point(file, p))
                .collect::<Result<Vec<_>, _>>()?;
            if points.len() < 3 {
                return Err(StepError::topology(id, "POLY_LOOP needs at least 3 points"));
            }
            Ok(points
                .iter()
                .zip(points.iter().cycle().skip(1))
                .map(|(a, b)| LoopSegment {
                    start: *a,
                    end: *b,
                    curve: EdgeGeometry::Line,
                    forward: true,
                })
                .collect())
        }
        _ => {
            let p = parse_vertex_point(file, entity.entity_ref(1)?)?;
            Ok(vec![LoopSegment {
                start: p,
                end: p,
                curve: EdgeGeometry::Line,
                forward: true,
            }])
        }
    }
}

/// Parse a `FACE_BOUND` / `FACE_OUTER_BOUND`.
///
/// A bound with `.F.` orientation uses its loop reversed.
pub fn parse_face_bound(file: &StepFile, id: u64) -> Result<BoundaryLoop, StepError> {
    let entity = require_type(file, id, &["FACE_BOUND", "FACE_OUTER_BOUND"])?;
    let mut segments = parse_loop(file, entity.entity_ref(1)?)?;
    if segments.is_empty() {
        return Err(StepError::topology(id, "face bound has an empty loop"));
    }
    if !entity.boolean(2)? {
        segments = segments.iter().rev().map(LoopSegment::reversed).collect();
    }
    Ok(BoundaryLoop {
        is_outer: entity.type_name == "FACE_OUTER_BOUND",
        segments,
    })
}

/// Parse an `ADVANCED_FACE` or `FACE_SURFACE(name, bounds, surface, same_sense)`.
pub fn parse_face(file: &StepFile, id: u64) -> Result<ShapeFace, StepError> {
    let entity = require_type(file, id, &["ADVANCED_FACE", "FACE_SURFACE"])?;
    let loops = entity
        .entity_ref_list(1)?
        .into_iter()
        .map(|b| parse_face_bound(file, b))
        .collect::<Result<Vec<_>, _>>()?;
    if loops.is_empty() {
        return Err(StepError::topology(id, "face has no bounds"));
    }
    Ok(ShapeFace {
        id,
        surface: parse_surface(file, entity.entity_ref(2)?)?,
        same_sense: entity.boolean(3)?,
        loops,
    })
}

/// Parse a `CLOSED_SHELL` / `OPEN_SHELL` (or an `ORIENTED_CLOSED_SHELL`).
pub fn parse_shell(file: &StepFile, id: u64) -> Result<StepShell, StepError> {
    let entity = require_type(
        file,
        id,
        &["CLOSED_SHELL", "OPEN_SHELL", "ORIENTED_CLOSED_SHELL"],
    )?;
    if entity.type_name == "ORIENTED_CLOSED_SHELL" {
        // (name, *, closed_shell_element, orientation)
        let mut shell = parse_shell(file, entity.entity_ref(2)?)?;
        if !entity.boolean(3)? {
            for face in &mut shell.faces {
                face.reversed = !face.reversed;
            }
        }
        shell.id = id;
        return Ok(shell);
    }

    let mut faces = Vec::new();
    for face_id in entity.entity_ref_list(1)? {
        let face = file.require(face_id)?;
        if face.type_name == "ORIENTED_FACE" {
            // (name, *, face_element, orientation)
            faces.push(FaceRef {
                id: face.entity_ref(2)?,
                reversed: !face.boolean(3)?,
            });
        } else {
            faces.push(FaceRef {
                id: face_id,
                reversed: false,
            });
        }
    }
    Ok(StepShell {
        id,
        faces,
        is_closed: entity.type_name != "OPEN_SHELL",
    })
}

/// Shell IDs of a `MANIFOLD_SOLID_BREP` or `BREP_WITH_VOIDS`: outer first, then voids.
pub fn parse_solid_shells(file: &StepFile, id: u64) -> Result<Vec<u64>, StepError> {
    let entity = require_type(file, id, &["MANIFOLD_SOLID_BREP", "BREP_WITH_VOIDS"])?;
    let mut shells = vec![entity.entity_ref(1)?];
    if entity.type_name == "BREP_WITH_VOIDS" {
        shells.extend(entity.entity_ref_list(2)?);
    }
    Ok(shells)
}

/// Shell IDs of a `SHELL_BASED_SURFACE_MODEL`.
pub fn parse_surface_model_shells(file: &StepFile, id: u64) -> Result<Vec<u64>, StepError> {
    let entity = require_type(file, id, &["SHELL_BASED_SURFACE_MODEL"])?;
    entity.entity_ref_list(1)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::parse_data;
    use super::*;

    // Unit square in z = 0 with one circular and three straight edges.
    const DATA: &str = "
#1 = CARTESIAN_POINT('', (0.0, 0.0, 0.0));
#2 = CARTESIAN_POINT('', (1.0, 0.0, 0.0));
#3 = CARTESIAN_POINT('', (1.0, 1.0, 0.0));
#4 = CARTESIAN_POINT('', (0.0, 1.0, 0.0));
#11 = VERTEX_POINT('', #1);
#12 = VERTEX_POINT('', #2);
#13 = VERTEX_POINT('', #3);
#14 = VERTEX_POINT('', #4);
#20 = DIRECTION('', (0.0, 0.0, 1.0));
#21 = DIRECTION('', (1.0, 0.0, 0.0));
#22 = VECTOR('', #21, 1.0);
#23 = LINE('', #1, #22);
#24 = AXIS2_PLACEMENT_3D('', #1, #20, #21);
#25 = PLANE('', #24);
#26 = CIRCLE('', #24, 1.0);
#30 = EDGE_CURVE('', #11, #12, #23, .T.);
#31 = EDGE_CURVE('', #12, #13, #23, .T.);
#32 = EDGE_CURVE('', #14, #13, #23, .T.);
#33 = EDGE_CURVE('', #11, #14, #26, .F.);
#40 = ORIENTED_EDGE('', *, *, #30, .T.);
#41 = ORIENTED_EDGE('', *, *, #31, .T.);
#42 = ORIENTED_EDGE('', *, *, #32, .F.);
#43 = ORIENTED_EDGE('', *, *, #33, .F.);
#50 = EDGE_LOOP('', (#40, #41, #42, #43));
#51 = FACE_OUTER_BOUND('', #50, .T.);
#52 = FACE_BOUND('', #50, .F.);
#60 = ADVANCED_FACE('', (#51), #25, .T.);
#61 = POLY_LOOP('', (#1, #2, #3));
#62 = FACE_OUTER_BOUND('', #61, .T.);
#63 = FACE_SURFACE('', (#62), #25, .F.);
#64 = VERTEX_LOOP('', #11);
#70 = ORIENTED_FACE('', *, #60, .F.);
#71 = OPEN_SHELL('', (#70, #63));
#72 = MANIFOLD_SOLID_BREP('', #71);
#73 = ADVANCED_FACE('', (), #25, .T.);
";

    #[test]
    fn test_oriented_edges_follow_loop_order() {
        let file = parse_data(DATA);
        let segments = parse_loop(&file, 50).unwrap();
        assert_eq!(segments.len(), 4);
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(segments[3].end, segments[0].start);

        // Reversed edge whose curve runs against the edge: traversal matches the curve.
        assert_eq!(segments[2].start, Point3::new(1.0, 1.0, 0.0));
        assert!(!segments[2].forward);
        assert!(segments[3].forward);
        assert!(matches!(segments[3].curve, EdgeGeometry::Circle(_)));
    }

    #[test]
    fn test_reversed_bound() {
        let file = parse_data(DATA);
        let outer = parse_face_bound(&file, 51).unwrap();
        let inner = parse_face_bound(&file, 52).unwrap();
        assert!(outer.is_outer);
        assert!(!inner.is_outer);
        assert_eq!(inner.segments[0], outer.segments[3].reversed());
        assert_eq!(inner.segments[0].start, Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_poly_and_vertex_loops() {
        let file = parse_data(DATA);
        let tri = parse_loop(&file, 61).unwrap();
        assert_eq!(tri.len(), 3);
        assert_eq!(tri[2].end, tri[0].start);

        let apex = BoundaryLoop {
            is_outer: false,
            segments: parse_loop(&file, 64).unwrap(),
        };
        assert!(apex.is_point());
    }

    #[test]
    fn test_faces_and_shells() {
        let file = parse_data(DATA);
        let face = parse_face(&file, 60).unwrap();
        assert!(face.same_sense);
        assert!(matches!(face.surface, SurfaceKind::Plane { .. }));
        assert_eq!(face.loops.len(), 1);

        let face = parse_face(&file, 63).unwrap();
        assert!(!face.same_sense);

        let shell = parse_shell(&file, 71).unwrap();
        assert!(!shell.is_closed);
        assert_eq!(
            shell.faces,
            vec![
                FaceRef { id: 60, reversed: true },
                FaceRef { id: 63, reversed: false }
            ]
        );
        assert_eq!(parse_solid_shells(&file, 72).unwrap(), vec![71]);

        assert!(matches!(
            parse_face(&file, 73),
            Err(StepError::InvalidTopology { entity_id: 73, .. })
        ));
    }
}
