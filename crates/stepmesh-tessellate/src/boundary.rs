//! Boundary sampling and parametric ranges.

use std::f64::consts::{PI, TAU};

use stepmesh_math::{Point3, Tolerance, Vec3};
use stepmesh_step::{AxisPlacement, BoundaryLoop, EdgeGeometry, LoopSegment};

use crate::deflection::{arc_segments, Deflection};

/// Orthonormal frame of a surface, for moving model points into local coordinates.
#[derive(Debug, Clone)]
pub struct LocalFrame {
    origin: Point3,
    x: Vec3,
    y: Vec3,
    z: Vec3,
}

impl LocalFrame {
    /// Frame of an axis placement.
    pub fn new(placement: &AxisPlacement) -> Self {
        Self {
            origin: placement.location,
            x: placement.x_axis().into_inner(),
            y: placement.y_axis().into_inner(),
            z: placement.z_axis().into_inner(),
        }
    }

    /// Model point → local coordinates.
    pub fn to_local(&self, p: &Point3) -> Point3 {
        let d = p - self.origin;
        Point3::new(d.dot(&self.x), d.dot(&self.y), d.dot(&self.z))
    }
}

/// Sample a boundary loop into a closed polyline (last point not repeated).
///
/// Circle segments are subdivided with [`arc_segments`]; every other curve
/// contributes only its start point. Consecutive duplicates are removed.
pub fn sample_loop(lp: &BoundaryLoop, deflection: &Deflection) -> Vec<Point3> {
    let mut points = Vec::new();
    for seg in &lp.segments {
        sample_segment(seg, deflection, &mut points);
    }

    let tol = Tolerance::DEFAULT;
    points.dedup_by(|b, a| tol.points_equal(a, b));
    while points.len() > 1 && tol.points_equal(&points[0], &points[points.len() - 1]) {
        points.pop();
    }
    points
}

fn sample_segment(seg: &LoopSegment, deflection: &Deflection, out: &mut Vec<Point3>) {
    out.push(seg.start);
    let EdgeGeometry::Circle(circle) = &seg.curve else {
        return;
    };

    let a0 = circle.angle_of(&seg.start);
    let sweep = if Tolerance::DEFAULT.points_equal(&seg.start, &seg.end) {
        TAU
    } else if seg.forward {
        (circle.angle_of(&seg.end) - a0).rem_euclid(TAU)
    } else {
        (a0 - circle.angle_of(&seg.end)).rem_euclid(TAU)
    };
    let sweep = if seg.forward { sweep } else { -sweep };

    let n = arc_segments(circle.radius, sweep, deflection);
    for i in 1..n {
        out.push(circle.point_at(a0 + sweep * i as f64 / n as f64));
    }
}

/// Unwrapped angular extent of a loop around the local Z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngularTrace {
    /// Smallest unwrapped angle visited.
    pub min: f64,
    /// Largest unwrapped angle visited.
    pub max: f64,
    /// Net turn around the axis over the closed loop (a multiple of 2π).
    pub winding: f64,
}

impl AngularTrace {
    /// `max - min`.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// True when the loop goes once around the axis.
    pub fn encircles_axis(&self) -> bool {
        self.winding.abs() > PI
    }
}

/// Follow a local-frame loop around the Z axis, unwrapping the polar angle.
///
/// Points on the axis carry no angle and are skipped. Returns `None` when no
/// point is off the axis.
pub fn angular_trace(points: &[Point3]) -> Option<AngularTrace> {
    let mut angles = points
        .iter()
        .filter(|p| p.x.hypot(p.y) > Tolerance::DEFAULT.linear)
        .map(|p| p.y.atan2(p.x).rem_euclid(TAU));

    let first = angles.next()?;
    let mut current = first;
    let mut previous = first;
    let mut trace = AngularTrace {
        min: first,
        max: first,
        winding: 0.0,
    };
    for a in angles.chain(std::iter::once(first)) {
        let delta = wrap_pi(a - previous);
        current += delta;
        previous = a;
        trace.min = trace.min.min(current);
        trace.max = trace.max.max(current);
    }
    trace.winding = current - first;
    Some(trace)
}

/// Map an angle difference into `(-π, π]`.
fn wrap_pi(d: f64) -> f64 {
    let d = d.rem_euclid(TAU);
    if d > PI {
        d - TAU
    } else {
        d
    }
}

/// Start angle and span to grid over, from the traces of a face's loops.
///
/// The widest trace decides. Loops that go all the way around, or that never
/// leave a single meridian (a seam), give the full circle.
pub fn angular_range(traces: &[AngularTrace]) -> (f64, f64) {
    let Some(widest) = traces.iter().max_by(|a, b| a.span().total_cmp(&b.span())) else {
        return (0.0, TAU);
    };
    let span = widest.span();
    if span >= TAU - 1e-9 || span < 1e-9 || traces.iter().any(AngularTrace::encircles_axis) {
        (widest.min.rem_euclid(TAU), TAU)
    } else {
        (widest.min, span)
    }
}
