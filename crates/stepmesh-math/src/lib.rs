#![warn(missing_docs)]

//! Math types for the stepmesh pipeline.
//!
//! Thin wrappers around nalgebra: points, vectors, directions, and the
//! affine [`Transform`] used to carry a surface patch from its local frame
//! into the model frame.

use nalgebra::{Matrix4, Unit, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A 4x4 affine transformation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 1)] = -s;
        m[(1, 0)] = s;
        m[(1, 1)] = c;
        Self { matrix: m }
    }

    /// Wrap an arbitrary 4x4 matrix.
    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// Build from a 3x4 row-major affine matrix (`[R | t]`), with an implicit
    /// `(0, 0, 0, 1)` bottom row.
    pub fn from_rows_3x4(rows: [[f64; 4]; 3]) -> Self {
        let mut m = Matrix4::identity();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                m[(r, c)] = *value;
            }
        }
        Self { matrix: m }
    }

    /// Local-to-world transform of a frame with the given origin and axes.
    ///
    /// The axes become the matrix columns, so local `(1, 0, 0)` maps to
    /// `origin + x`.
    pub fn from_frame(origin: &Point3, x: &Dir3, y: &Dir3, z: &Dir3) -> Self {
        let mut m = Matrix4::identity();
        for (c, axis) in [x, y, z].iter().enumerate() {
            m[(0, c)] = axis.x;
            m[(1, c)] = axis.y;
            m[(2, c)] = axis.z;
        }
        m[(0, 3)] = origin.x;
        m[(1, 3)] = origin.y;
        m[(2, 3)] = origin.z;
        Self { matrix: m }
    }

    /// Compose as `self * other`: `other` is applied first.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }

    /// True when the matrix is exactly the identity.
    pub fn is_identity(&self) -> bool {
        self.matrix == Matrix4::identity()
    }

    /// True when every entry is finite and the bottom row is `(0, 0, 0, 1)`.
    pub fn is_affine(&self) -> bool {
        self.matrix.iter().all(|v| v.is_finite())
            && self.matrix[(3, 0)] == 0.0
            && self.matrix[(3, 1)] == 0.0
            && self.matrix[(3, 2)] == 0.0
            && self.matrix[(3, 3)] == 1.0
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Pick a unit vector perpendicular to `z`.
pub fn any_perpendicular(z: &Dir3) -> Dir3 {
    let arbitrary = if z.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
    Dir3::new_normalize(arbitrary - arbitrary.dot(z.as_ref()) * z.as_ref())
}

/// Distance tolerance for geometric comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Linear distance tolerance in model units.
    pub linear: f64,
}

impl Tolerance {
    /// Default tolerance used when sampling boundaries (1e-9 model units).
    pub const DEFAULT: Self = Self { linear: 1e-9 };

    /// True when two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() <= self.linear
    }

    /// True when a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() <= self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_tolerance() {
        let tol = Tolerance::DEFAULT;
        assert!(tol.points_equal(&Point3::origin(), &Point3::new(0.0, 0.0, 1e-10)));
        assert!(!tol.points_equal(&Point3::origin(), &Point3::new(0.0, 0.0, 1e-6)));
        assert!(tol.is_zero(-1e-12));
    }

    #[test]
    fn test_identity_transform() {
        let t = Transform::identity();
        let p = Point3::new(1.0, 2.0, 3.0);
        assert!((t.apply_point(&p) - p).norm() < 1e-12);
        assert!(t.is_identity());
    }

    #[test]
    fn test_translation() {
        let t = Transform::translation(10.0, 20.0, 30.0);
        let result = t.apply_point(&Point3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(result.x, 11.0, epsilon = 1e-12);
        assert_relative_eq!(result.y, 22.0, epsilon = 1e-12);
        assert_relative_eq!(result.z, 33.0, epsilon = 1e-12);
        assert!(!t.is_identity());
    }

    #[test]
    fn test_rotation_z_90() {
        let t = Transform::rotation_z(PI / 2.0);
        let result = t.apply_point(&Point3::new(1.0, 0.0, 0.0));
        assert!(result.x.abs() < 1e-12);
        assert_relative_eq!(result.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rows_3x4_matches_translation() {
        let t = Transform::from_rows_3x4([
            [1.0, 0.0, 0.0, 5.0],
            [0.0, 1.0, 0.0, -2.0],
            [0.0, 0.0, 1.0, 0.5],
        ]);
        assert_eq!(t, Transform::translation(5.0, -2.0, 0.5));
        assert!(t.is_affine());
    }

    #[test]
    fn test_frame_maps_local_axes() {
        let origin = Point3::new(1.0, 2.0, 3.0);
        let x = Dir3::new_normalize(Vec3::y());
        let y = Dir3::new_normalize(-Vec3::x());
        let z = Dir3::new_normalize(Vec3::z());
        let t = Transform::from_frame(&origin, &x, &y, &z);

        let p = t.apply_point(&Point3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 4.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, 3.0, epsilon = 1e-12);

        let back = t.inverse().unwrap().apply_point(&p);
        assert_relative_eq!(back.x, 2.0, epsilon = 1e-12);
        assert!(back.y.abs() < 1e-12);
    }

    #[test]
    fn test_compose_applies_right_first() {
        let translate = Transform::translation(1.0, 0.0, 0.0);
        let rotate = Transform::rotation_z(PI / 2.0);
        // rotate.then(translate) = rotate * translate: translate first, then rotate
        let p = rotate.then(&translate).apply_point(&Point3::origin());
        assert!(p.x.abs() < 1e-12);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_non_affine_detected() {
        let mut m = Matrix4::identity();
        m[(3, 0)] = 0.25;
        assert!(!Transform::from_matrix(m).is_affine());
    }

    #[test]
    fn test_any_perpendicular() {
        for v in [Vec3::x(), Vec3::y(), Vec3::z(), Vec3::new(1.0, 1.0, 1.0)] {
            let z = Dir3::new_normalize(v);
            let p = any_perpendicular(&z);
            assert!(p.dot(z.as_ref()).abs() < 1e-12);
        }
    }
}
