//! Per-surface faceting in the surface's local frame.
//!
//! Every function here takes boundary loops already moved into the local
//! frame and returns points plus triangles in that same frame. Triangles wind
//! counter-clockwise about the surface normal, flipped when the face sense
//! is reversed.

use std::f64::consts::FRAC_PI_2;

use stepmesh_math::{Point3, Tolerance};

use crate::boundary::{angular_range, angular_trace, AngularTrace};
use crate::deflection::{arc_segments, Deflection};
use crate::error::TessellationError;
use crate::polygon::{signed_area, triangulate, Point2};

/// A boundary loop in local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalLoop {
    /// Whether the STEP bound was a `FACE_OUTER_BOUND`.
    pub is_outer: bool,
    /// Sampled polyline, not closed.
    pub points: Vec<Point3>,
}

/// Points and triangles of one face, in local coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalMesh {
    /// Local points.
    pub points: Vec<Point3>,
    /// Triangles over `points`.
    pub triangles: Vec<[u32; 3]>,
}

impl LocalMesh {
    fn oriented(mut self, same_sense: bool) -> Self {
        if !same_sense {
            for tri in &mut self.triangles {
                tri.swap(1, 2);
            }
        }
        self
    }
}

/// Regular grid over `(nu + 1) × (nv + 1)` samples; `eval(i, j)` gives the
/// point in column `i`, row `j`.
fn grid(nu: usize, nv: usize, eval: impl Fn(usize, usize) -> Point3) -> LocalMesh {
    let row = nu + 1;
    let mut points = Vec::with_capacity(row * (nv + 1));
    for j in 0..=nv {
        for i in 0..=nu {
            points.push(eval(i, j));
        }
    }

    let mut triangles = Vec::with_capacity(nu * nv * 2);
    for j in 0..nv {
        for i in 0..nu {
            let bl = (j * row + i) as u32;
            let br = bl + 1;
            let tl = bl + row as u32;
            let tr = tl + 1;
            triangles.push([bl, br, tl]);
            triangles.push([br, tr, tl]);
        }
    }
    LocalMesh { points, triangles }
}

fn lerp(a: f64, b: f64, i: usize, n: usize) -> f64 {
    if i == n {
        b
    } else {
        a + (b - a) * i as f64 / n as f64
    }
}

fn z_range(loops: &[LocalLoop]) -> Option<(f64, f64)> {
    loops
        .iter()
        .flat_map(|l| &l.points)
        .map(|p| p.z)
        .fold(None, |acc, z| match acc {
            None => Some((z, z)),
            Some((lo, hi)) => Some((lo.min(z), hi.max(z))),
        })
}

fn traces(loops: &[LocalLoop]) -> Vec<AngularTrace> {
    loops.iter().filter_map(|l| angular_trace(&l.points)).collect()
}

/// Planar face: ear clipping over the projected boundary.
pub fn plane(face_id: u64, loops: &[LocalLoop], same_sense: bool) -> Result<LocalMesh, TessellationError> {
    let project = |l: &LocalLoop| -> Vec<Point2> { l.points.iter().map(|p| (p.x, p.y)).collect() };
    let area = |l: &LocalLoop| signed_area(&project(l)).abs();

    let outer = loops
        .iter()
        .position(|l| l.is_outer)
        .or_else(|| {
            (0..loops.len())
                .filter(|&i| loops[i].points.len() >= 3)
                .max_by(|&a, &b| area(&loops[a]).total_cmp(&area(&loops[b])))
        })
        .ok_or_else(|| TessellationError::face(face_id, "no boundary loop to triangulate"))?;

    let holes: Vec<Vec<Point2>> = loops
        .iter()
        .enumerate()
        .filter(|&(i, l)| i != outer && l.points.len() >= 3)
        .map(|(_, l)| project(l))
        .collect();

    let t = triangulate(&project(&loops[outer]), &holes)
        .map_err(|e| TessellationError::face(face_id, e.to_string()))?;

    let mesh = LocalMesh {
        points: t.vertices.iter().map(|&(u, v)| Point3::new(u, v, 0.0)).collect(),
        triangles: t.triangles,
    };
    Ok(mesh.oriented(same_sense))
}

/// Cylindrical face: one band of quads between the lowest and highest
/// boundary heights. Rulings are straight, so a single row is exact.
pub fn cylinder(
    face_id: u64,
    radius: f64,
    loops: &[LocalLoop],
    same_sense: bool,
    deflection: &Deflection,
) -> Result<LocalMesh, TessellationError> {
    let (theta0, span) = angular_range(&traces(loops));
    let (z0, z1) = z_range(loops).ok_or_else(|| TessellationError::face(face_id, "empty boundary"))?;
    if Tolerance::DEFAULT.is_zero(z1 - z0) {
        return Err(TessellationError::face(face_id, "cylindrical face has no height"));
    }

    let nu = arc_segments(radius, span, deflection);
    let mesh = grid(nu, 1, |i, j| {
        let theta = lerp(theta0, theta0 + span, i, nu);
        let z = if j == 0 { z0 } else { z1 };
        Point3::new(radius * theta.cos(), radius * theta.sin(), z)
    });
    Ok(mesh.oriented(same_sense))
}

/// Conical face. The radius at height `z` is `radius + z·tan(semi_angle)`.
///
/// A face bounded by a single circle runs to the apex.
pub fn cone(
    face_id: u64,
    radius: f64,
    semi_angle: f64,
    loops: &[LocalLoop],
    same_sense: bool,
    deflection: &Deflection,
) -> Result<LocalMesh, TessellationError> {
    let tan = semi_angle.tan();
    let traces = traces(loops);
    let (theta0, span) = angular_range(&traces);
    let (mut z0, mut z1) = z_range(loops).ok_or_else(|| TessellationError::face(face_id, "empty boundary"))?;

    let encircling = traces.iter().filter(|t| t.encircles_axis()).count();
    if encircling == 1 && tan.abs() > 1e-12 {
        let apex = -radius / tan;
        z0 = z0.min(apex);
        z1 = z1.max(apex);
    }
    if Tolerance::DEFAULT.is_zero(z1 - z0) {
        return Err(TessellationError::face(face_id, "conical face has no height"));
    }

    let rho = |z: f64| radius + z * tan;
    let widest = rho(z0).abs().max(rho(z1).abs());
    let nu = arc_segments(widest, span, deflection);
    let mesh = grid(nu, 1, |i, j| {
        let theta = lerp(theta0, theta0 + span, i, nu);
        let z = if j == 0 { z0 } else { z1 };
        let r = rho(z);
        Point3::new(r * theta.cos(), r * theta.sin(), z)
    });
    Ok(mesh.oriented(same_sense))
}

/// Spherical face over longitude θ and latitude φ.
///
/// When exactly one loop circles the axis, the face is a cap and the latitude
/// range runs on to the pole the loop's orientation encloses.
pub fn sphere(
    face_id: u64,
    radius: f64,
    loops: &[LocalLoop],
    same_sense: bool,
    deflection: &Deflection,
) -> Result<LocalMesh, TessellationError> {
    let traces = traces(loops);
    let (theta0, span) = angular_range(&traces);

    let latitude = |p: &Point3| (p.z / p.coords.norm().max(f64::MIN_POSITIVE)).clamp(-1.0, 1.0).asin();
    let (mut phi0, mut phi1) = loops
        .iter()
        .flat_map(|l| &l.points)
        .map(latitude)
        .fold(None, |acc: Option<(f64, f64)>, phi| match acc {
            None => Some((phi, phi)),
            Some((lo, hi)) => Some((lo.min(phi), hi.max(phi))),
        })
        .ok_or_else(|| TessellationError::face(face_id, "empty boundary"))?;

    let mut encircling = traces.iter().filter(|t| t.encircles_axis());
    if let (Some(cap), None) = (encircling.next(), encircling.next()) {
        if (cap.winding > 0.0) == same_sense {
            phi1 = FRAC_PI_2;
        } else {
            phi0 = -FRAC_PI_2;
        }
    }
    if phi1 - phi0 < 1e-9 {
        return Err(TessellationError::face(face_id, "spherical face has no latitude extent"));
    }

    let nu = arc_segments(radius, span, deflection);
    let nv = arc_segments(radius, phi1 - phi0, deflection);
    let mesh = grid(nu, nv, |i, j| {
        let theta = lerp(theta0, theta0 + span, i, nu);
        let phi = lerp(phi0, phi1, j, nv);
        let r = radius * phi.cos();
        Point3::new(r * theta.cos(), r * theta.sin(), radius * phi.sin())
    });
    Ok(mesh.oriented(same_sense))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    fn ring(radius: f64, z: f64, n: usize, ccw: bool) -> LocalLoop {
        let sign = if ccw { 1.0 } else { -1.0 };
        LocalLoop {
            is_outer: true,
            points: (0..n)
                .map(|i| {
                    let a = sign * i as f64 / n as f64 * TAU;
                    Point3::new(radius * a.cos(), radius * a.sin(), z)
                })
                .collect(),
        }
    }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64, is_outer: bool) -> LocalLoop {
        LocalLoop {
            is_outer,
            points: vec![
                Point3::new(x0, y0, 0.0),
                Point3::new(x1, y0, 0.0),
                Point3::new(x1, y1, 0.0),
                Point3::new(x0, y1, 0.0),
            ],
        }
    }

    /// Unnormalised normal of triangle `t`.
    fn normal(m: &LocalMesh, t: usize) -> stepmesh_math::Vec3 {
        let [a, b, c] = m.triangles[t].map(|i| m.points[i as usize]);
        (b - a).cross(&(c - a))
    }

    #[test]
    fn test_plane_winding_follows_sense() {
        let loops = [rect(0.0, 0.0, 2.0, 1.0, true)];
        let m = plane(1, &loops, true).unwrap();
        assert_eq!(m.triangles.len(), 2);
        assert!((0..2).all(|t| normal(&m, t).z > 0.0));

        let flipped = plane(1, &loops, false).unwrap();
        assert!((0..2).all(|t| normal(&flipped, t).z < 0.0));
    }

    #[test]
    fn test_plane_with_hole() {
        let loops = [rect(0.0, 0.0, 10.0, 10.0, true), rect(4.0, 4.0, 6.0, 6.0, false)];
        let m = plane(7, &loops, true).unwrap();
        assert_eq!(m.points.len(), 8);
        let area: f64 = (0..m.triangles.len()).map(|t| normal(&m, t).z / 2.0).sum();
        assert_relative_eq!(area, 96.0, epsilon = 1e-9);
    }

    #[test]
    fn test_plane_degenerate_outer_fails() {
        let loops = [LocalLoop {
            is_outer: true,
            points: vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
        }];
        assert!(matches!(plane(3, &loops, true), Err(TessellationError::Face { face_id: 3, .. })));
    }

    #[test]
    fn test_full_cylinder() {
        let d = Deflection::default();
        let loops = [ring(5.0, 0.0, 16, true), ring(5.0, 10.0, 16, false)];
        let m = cylinder(1, 5.0, &loops, true, &d).unwrap();
        let nu = arc_segments(5.0, TAU, &d);
        assert_eq!(m.points.len(), 2 * (nu + 1));
        assert_eq!(m.triangles.len(), 2 * nu);
        for p in &m.points {
            assert_relative_eq!(p.x.hypot(p.y), 5.0, epsilon = 1e-9);
            assert!(p.z == 0.0 || p.z == 10.0);
        }
        // Outward normals.
        for t in 0..m.triangles.len() {
            let [a, ..] = m.triangles[t].map(|i| m.points[i as usize]);
            assert!(normal(&m, t).dot(&stepmesh_math::Vec3::new(a.x, a.y, 0.0)) > 0.0);
        }
    }

    #[test]
    fn test_half_cylinder() {
        let d = Deflection::default();
        // 0..π at z = 0, back along z = 4.
        let arc = |z: f64, rev: bool| -> Vec<Point3> {
            let mut v: Vec<Point3> = (0..=8)
                .map(|i| {
                    let a = i as f64 / 8.0 * std::f64::consts::PI;
                    Point3::new(2.0 * a.cos(), 2.0 * a.sin(), z)
                })
                .collect();
            if rev {
                v.reverse();
            }
            v
        };
        let mut points = arc(0.0, false);
        points.extend(arc(4.0, true));
        let loops = [LocalLoop { is_outer: true, points }];
        let m = cylinder(1, 2.0, &loops, true, &d).unwrap();
        assert!(m.points.iter().all(|p| p.y >= -1e-9));
        assert_eq!(m.triangles.len(), 2 * arc_segments(2.0, std::f64::consts::PI, &d));
    }

    #[test]
    fn test_flat_cylinder_fails() {
        let loops = [ring(1.0, 0.0, 8, true)];
        assert!(cylinder(9, 1.0, &loops, true, &Deflection::default()).is_err());
    }

    #[test]
    fn test_cone_runs_to_apex() {
        // Radius 2 at z = 0, 45°: apex at z = -2.
        let semi = std::f64::consts::FRAC_PI_4;
        let loops = [ring(2.0, 0.0, 16, false)];
        let m = cone(1, 2.0, semi, &loops, true, &Deflection::default()).unwrap();
        let zmin = m.points.iter().map(|p| p.z).fold(f64::MAX, f64::min);
        assert_relative_eq!(zmin, -2.0, epsilon = 1e-9);
        for p in &m.points {
            assert_relative_eq!(p.x.hypot(p.y), (2.0 + p.z).abs(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_hemisphere_cap() {
        let d = Deflection::default();
        let loops = [ring(3.0, 0.0, 24, true)];
        let north = sphere(1, 3.0, &loops, true, &d).unwrap();
        let zmax = north.points.iter().map(|p| p.z).fold(f64::MIN, f64::max);
        let zmin = north.points.iter().map(|p| p.z).fold(f64::MAX, f64::min);
        assert_relative_eq!(zmax, 3.0, epsilon = 1e-9);
        assert_relative_eq!(zmin, 0.0, epsilon = 1e-9);
        for p in &north.points {
            assert_relative_eq!(p.coords.norm(), 3.0, epsilon = 1e-9);
        }

        let loops = [ring(3.0, 0.0, 24, false)];
        let south = sphere(1, 3.0, &loops, true, &d).unwrap();
        let zmin = south.points.iter().map(|p| p.z).fold(f64::MAX, f64::min);
        assert_relative_eq!(zmin, -3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sphere_zone_between_two_rings() {
        let d = Deflection::default();
        let r: f64 = 2.0;
        let (z_lo, z_hi) = (-1.0, 1.0);
        let rho = |z: f64| (r * r - z * z).sqrt();
        let loops = [ring(rho(z_lo), z_lo, 24, true), ring(rho(z_hi), z_hi, 24, false)];
        let m = sphere(1, r, &loops, true, &d).unwrap();
        for p in &m.points {
            assert!(p.z >= z_lo - 1e-9 && p.z <= z_hi + 1e-9);
        }
    }
}
