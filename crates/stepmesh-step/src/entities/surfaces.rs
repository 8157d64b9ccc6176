//! Elementary surfaces.

use std::f64::consts::FRAC_PI_2;

use super::{parse_axis_placement, AxisPlacement, EntityArgs};
use crate::error::StepError;
use crate::parser::StepFile;

/// Surface geometry carried by a face.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceKind {
    /// Plane through the placement origin, normal along its Z axis.
    Plane {
        /// Plane frame.
        placement: AxisPlacement,
    },
    /// Cylinder around the placement Z axis.
    Cylinder {
        /// Axis frame.
        placement: AxisPlacement,
        /// Radius.
        radius: f64,
    },
    /// Cone around the placement Z axis; `radius` is measured at the placement origin.
    Cone {
        /// Axis frame.
        placement: AxisPlacement,
        /// Radius at `z = 0`.
        radius: f64,
        /// Half-angle at the apex, in radians.
        semi_angle: f64,
    },
    /// Sphere centered at the placement origin.
    Sphere {
        /// Center frame.
        placement: AxisPlacement,
        /// Radius.
        radius: f64,
    },
    /// Surface type the tessellator does not handle.
    Unsupported(String),
}

impl SurfaceKind {
    /// Placement of the surface, if it is an elementary one.
    pub fn placement(&self) -> Option<&AxisPlacement> {
        match self {
            SurfaceKind::Plane { placement }
            | SurfaceKind::Cylinder { placement, .. }
            | SurfaceKind::Cone { placement, .. }
            | SurfaceKind::Sphere { placement, .. } => Some(placement),
            SurfaceKind::Unsupported(_) => None,
        }
    }

    /// Short name for logs and reports.
    pub fn name(&self) -> &str {
        match self {
            SurfaceKind::Plane { .. } => "plane",
            SurfaceKind::Cylinder { .. } => "cylinder",
            SurfaceKind::Cone { .. } => "cone",
            SurfaceKind::Sphere { .. } => "sphere",
            SurfaceKind::Unsupported(name) => name,
        }
    }
}

fn positive(id: u64, what: &str, value: f64) -> Result<f64, StepError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(StepError::geometry(id, format!("{what} {value} must be positive")))
    }
}

/// Parse a surface entity.
///
/// Unknown surface types are not an error; they come back as
/// [`SurfaceKind::Unsupported`].
pub fn parse_surface(file: &StepFile, id: u64) -> Result<SurfaceKind, StepError> {
    let entity = file.require(id)?;
    let kind = match entity.type_name.as_str() {
        "PLANE" => SurfaceKind::Plane {
            placement: parse_axis_placement(file, entity.entity_ref(1)?)?,
        },
        "CYLINDRICAL_SURFACE" => SurfaceKind::Cylinder {
            placement: parse_axis_placement(file, entity.entity_ref(1)?)?,
            radius: positive(id, "cylinder radius", entity.real(2)?)?,
        },
        "CONICAL_SURFACE" => {
            let radius = entity.real(2)?;
            if radius < 0.0 {
                return Err(StepError::geometry(id, format!("cone radius {radius} is negative")));
            }
            // Files written with degree plane-angle units carry the
            // semi-angle in degrees.
            let mut semi_angle = entity.real(3)?;
            if semi_angle >= FRAC_PI_2 {
                semi_angle = semi_angle.to_radians();
            }
            SurfaceKind::Cone {
                placement: parse_axis_placement(file, entity.entity_ref(1)?)?,
                radius,
                semi_angle: positive(id, "cone semi-angle", semi_angle)?,
            }
        }
        "SPHERICAL_SURFACE" => SurfaceKind::Sphere {
            placement: parse_axis_placement(file, entity.entity_ref(1)?)?,
            radius: positive(id, "sphere radius", entity.real(2)?)?,
        },
        other => SurfaceKind::Unsupported(other.to_string()),
    };
    Ok(kind)
}
