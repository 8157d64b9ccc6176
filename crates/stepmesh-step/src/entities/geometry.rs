//! Points, directions, vectors, and axis placements.

use super::{require_type, EntityArgs};
use crate::error::StepError;
use crate::parser::StepFile;
use stepmesh_math::{any_perpendicular, Dir3, Point3, Transform, Vec3};

/// Parse a `CARTESIAN_POINT(name, (x, y, z))`.
///
/// Two-coordinate points get `z = 0`.
pub fn parse_cartesian_point(file: &StepFile, id: u64) -> Result<Point3, StepError> {
    let entity = require_type(file, id, &["CARTESIAN_POINT"])?;
    match entity.real_list(1)?.as_slice() {
        [x, y, z, ..] => Ok(Point3::new(*x, *y, *z)),
        [x, y] => Ok(Point3::new(*x, *y, 0.0)),
        other => Err(StepError::entity(
            id,
            format!("CARTESIAN_POINT needs 2 or 3 coordinates, got {}", other.len()),
        )),
    }
}

/// Parse a `DIRECTION(name, (x, y, z))` and normalize it.
pub fn parse_direction(file: &StepFile, id: u64) -> Result<Dir3, StepError> {
    let entity = require_type(file, id, &["DIRECTION"])?;
    let v = match entity.real_list(1)?.as_slice() {
        [x, y, z, ..] => Vec3::new(*x, *y, *z),
        [x, y] => Vec3::new(*x, *y, 0.0),
        other => {
            return Err(StepError::entity(
                id,
                format!("DIRECTION needs 2 or 3 components, got {}", other.len()),
            ));
        }
    };
    if v.norm() < 1e-15 {
        return Err(StepError::geometry(id, "zero-length direction"));
    }
    Ok(Dir3::new_normalize(v))
}

/// Parse a `VECTOR(name, direction, magnitude)`.
pub fn parse_vector(file: &StepFile, id: u64) -> Result<Vec3, StepError> {
    let entity = require_type(file, id, &["VECTOR"])?;
    let dir = parse_direction(file, entity.entity_ref(1)?)?;
    Ok(entity.real(2)? * dir.into_inner())
}

/// Axis placement: an origin plus optional axis and reference direction.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisPlacement {
    /// Location point.
    pub location: Point3,
    /// Z axis, `+Z` when unset.
    pub axis: Option<Dir3>,
    /// X axis hint, derived from the Z axis when unset.
    pub ref_direction: Option<Dir3>,
}

impl AxisPlacement {
    /// Placement at the world origin with world axes.
    pub fn world() -> Self {
        Self {
            location: Point3::origin(),
            axis: None,
            ref_direction: None,
        }
    }

    /// Z axis direction.
    pub fn z_axis(&self) -> Dir3 {
        self.axis.unwrap_or_else(|| Dir3::new_normalize(Vec3::z()))
    }

    /// X axis direction: the reference direction projected perpendicular to Z.
    pub fn x_axis(&self) -> Dir3 {
        let z = self.z_axis();
        match self.ref_direction {
            Some(r) => {
                let projected = r.as_ref() - r.dot(z.as_ref()) * z.as_ref();
                if projected.norm() < 1e-12 {
                    any_perpendicular(&z)
                } else {
                    Dir3::new_normalize(projected)
                }
            }
            None => any_perpendicular(&z),
        }
    }

    /// Y axis direction (Z × X).
    pub fn y_axis(&self) -> Dir3 {
        Dir3::new_normalize(self.z_axis().cross(self.x_axis().as_ref()))
    }

    /// Local-to-model transform of this frame.
    pub fn to_transform(&self) -> Transform {
        Transform::from_frame(&self.location, &self.x_axis(), &self.y_axis(), &self.z_axis())
    }
}

/// Parse an `AXIS1_PLACEMENT` or `AXIS2_PLACEMENT_3D`.
pub fn parse_axis_placement(file: &StepFile, id: u64) -> Result<AxisPlacement, StepError> {
    let entity = require_type(file, id, &["AXIS1_PLACEMENT", "AXIS2_PLACEMENT_3D"])?;
    let location = parse_cartesian_point(file, entity.entity_ref(1)?)?;
    let axis = entity
        .optional_ref(2)?
        .map(|d| parse_direction(file, d))
        .transpose()?;
    let ref_direction = if entity.type_name == "AXIS2_PLACEMENT_3D" {
        entity
            .optional_ref(3)?
            .map(|d| parse_direction(file, d))
            .transpose()?
    } else {
        None
    };
    Ok(AxisPlacement {
        location,
        axis,
        ref_direction,
    })
}
