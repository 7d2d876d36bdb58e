use std::ops::{Add, Mul, Sub};

// ─────────────────────────────────────────────────────────────────────────────
// Vec3
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    #[must_use]
    pub const fn length_squared(self) -> f64 {
        self.dot(self)
    }

    #[must_use]
    pub const fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[must_use]
    pub const fn cross(self, rhs: Self) -> Self {
        Self {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Point3
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    #[must_use]
    pub const fn add_vec(self, v: Vec3) -> Self {
        Self::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }

    #[must_use]
    pub const fn sub_point(self, rhs: Self) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    /// Returns `self * (1 - t) + rhs * t`.
    #[must_use]
    pub fn lerp(self, rhs: Self, t: f64) -> Self {
        Self::new(
            self.x + (rhs.x - self.x) * t,
            self.y + (rhs.y - self.y) * t,
            self.z + (rhs.z - self.z) * t,
        )
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        self.sub_point(other).length()
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Default for Point3 {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(arr: [f64; 3]) -> Self {
        Self::from_array(arr)
    }
}

impl From<Point3> for [f64; 3] {
    fn from(p: Point3) -> Self {
        p.to_array()
    }
}

impl Add<Vec3> for Point3 {
    type Output = Self;
    fn add(self, rhs: Vec3) -> Self::Output {
        self.add_vec(rhs)
    }
}

impl Sub for Point3 {
    type Output = Vec3;
    fn sub(self, rhs: Self) -> Self::Output {
        self.sub_point(rhs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transform
// ─────────────────────────────────────────────────────────────────────────────

/// Affine 4x4 transform. Kernels use it as the location that maps
/// triangulation nodes from face-local space into world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    m: [[f64; 4]; 4],
}

impl Transform {
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    #[must_use]
    pub const fn translate(offset: Vec3) -> Self {
        Self {
            m: [
                [1.0, 0.0, 0.0, offset.x],
                [0.0, 1.0, 0.0, offset.y],
                [0.0, 0.0, 1.0, offset.z],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    #[must_use]
    pub const fn uniform_scale(s: f64) -> Self {
        Self {
            m: [
                [s, 0.0, 0.0, 0.0],
                [0.0, s, 0.0, 0.0],
                [0.0, 0.0, s, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    #[must_use]
    pub fn compose(self, other: Self) -> Self {
        let mut result = Self::identity();
        for i in 0..4 {
            for j in 0..4 {
                result.m[i][j] = (0..4).map(|k| self.m[i][k] * other.m[k][j]).sum();
            }
        }
        result
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    #[must_use]
    pub fn apply_point(self, p: Point3) -> Point3 {
        let row = |r: [f64; 4]| r[0] * p.x + r[1] * p.y + r[2] * p.z + r[3];
        Point3::new(row(self.m[0]), row(self.m[1]), row(self.m[2]))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Transform {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(rhs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tolerance
// ─────────────────────────────────────────────────────────────────────────────

/// Geometric tolerance used for coincidence checks.
///
/// - `Tolerance::DEFAULT` - point comparisons (1e-9)
/// - `Tolerance::FACE` - face tolerance of a constructed surface, also used to
///   merge coincident tessellation nodes (1e-6)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub eps: f64,
}

impl Tolerance {
    pub const DEFAULT: Self = Self { eps: 1e-9 };
    pub const FACE: Self = Self { eps: 1e-6 };

    #[must_use]
    pub const fn new(eps: f64) -> Self {
        Self { eps }
    }

    #[must_use]
    pub const fn eps_squared(self) -> f64 {
        self.eps * self.eps
    }

    #[must_use]
    pub fn approx_eq_point3(self, a: Point3, b: Point3) -> bool {
        a.sub_point(b).length_squared() <= self.eps_squared()
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point3_operators() {
        let p = Point3::new(1.0, 2.0, 3.0);
        let v = Vec3::new(1.0, 1.0, 1.0);

        assert_eq!(p + v, Point3::new(2.0, 3.0, 4.0));

        let q = Point3::new(4.0, 5.0, 6.0);
        assert_eq!(q - p, Vec3::new(3.0, 3.0, 3.0));
        assert!((p.distance_to(q) - 27.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_point3_lerp() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(10.0, 20.0, 30.0);

        assert_eq!(a.lerp(b, 0.5), Point3::new(5.0, 10.0, 15.0));
    }

    #[test]
    fn test_transform_apply_and_compose() {
        let t = Transform::translate(Vec3::new(1.0, 2.0, 3.0));
        let s = Transform::uniform_scale(2.0);
        let p = Point3::new(1.0, 1.0, 1.0);

        assert_eq!((t * s).apply_point(p), Point3::new(3.0, 4.0, 5.0));
        assert_eq!((s * t).apply_point(p), Point3::new(4.0, 6.0, 8.0));
        assert!(Transform::default().is_identity());
        assert!(!t.is_identity());
    }

    #[test]
    fn test_tolerance_point_comparison() {
        let tol = Tolerance::new(1e-9);
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(1.0 + 1e-10, 2.0, 3.0);
        let c = Point3::new(1.0 + 1e-8, 2.0, 3.0);

        assert!(tol.approx_eq_point3(a, b));
        assert!(!tol.approx_eq_point3(a, c));
    }

    #[test]
    fn test_non_finite_point_detected() {
        assert!(Point3::new(0.0, 1.0, 2.0).is_finite());
        assert!(!Point3::new(f64::NAN, 1.0, 2.0).is_finite());
        assert!(!Point3::new(0.0, f64::INFINITY, 2.0).is_finite());
    }
}
