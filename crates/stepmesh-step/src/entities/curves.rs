//! Edge curve geometry: lines and circles.

use std::f64::consts::TAU;

use super::{parse_axis_placement, require_type, AxisPlacement, EntityArgs};
use crate::error::StepError;
use crate::parser::StepFile;
use stepmesh_math::Point3;

/// A circle in its own placement frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    /// Center and orientation; the circle lies in the placement's XY plane.
    pub placement: AxisPlacement,
    /// Radius.
    pub radius: f64,
}

impl Circle {
    /// Point at parametric angle `t` (radians from the X axis).
    pub fn point_at(&self, t: f64) -> Point3 {
        let (s, c) = t.sin_cos();
        self.placement.location
            + self.radius * (c * self.placement.x_axis().into_inner() + s * self.placement.y_axis().into_inner())
    }

    /// Parametric angle of a point projected onto the circle plane, in `[0, 2π)`.
    pub fn angle_of(&self, p: &Point3) -> f64 {
        let d = p - self.placement.location;
        let a = d.dot(self.placement.y_axis().as_ref()).atan2(d.dot(self.placement.x_axis().as_ref()));
        a.rem_euclid(TAU)
    }
}

/// Geometry attached to an edge.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeGeometry {
    /// Straight segment between the edge's vertices.
    Line,
    /// Circular arc (or full circle when the vertices coincide).
    Circle(Circle),
    /// Any other curve; approximated by its chord.
    Other(String),
}

/// Parse a `CIRCLE(name, position, radius)`.
pub fn parse_circle(file: &StepFile, id: u64) -> Result<Circle, StepError> {
    let entity = require_type(file, id, &["CIRCLE"])?;
    let placement = parse_axis_placement(file, entity.entity_ref(1)?)?;
    let radius = entity.real(2)?;
    if !(radius > 0.0) {
        return Err(StepError::geometry(id, format!("circle radius {radius} must be positive")));
    }
    Ok(Circle { placement, radius })
}

/// Resolve the geometry of an edge curve entity.
///
/// `SURFACE_CURVE` and `SEAM_CURVE` wrap a 3D curve in their second argument.
pub fn parse_edge_geometry(file: &StepFile, id: u64) -> Result<EdgeGeometry, StepError> {
    let entity = file.require(id)?;
    match entity.type_name.as_str() {
        "LINE" | "POLYLINE" => Ok(EdgeGeometry::Line),
        "CIRCLE" => parse_circle(file, id).map(EdgeGeometry::Circle),
        "SURFACE_CURVE" | "SEAM_CURVE" => parse_edge_geometry(file, entity.entity_ref(1)?),
        other => Ok(EdgeGeometry::Other(other.to_string())),
    }
}
