// geometry.rs - vector and triangle primitives for walkmesh faces

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Relative tolerance for vertex identity. Vertices survive an f32 round trip
/// through the file, so anything tighter than f32 precision would split shared corners.
pub const VERTEX_EPSILON: f64 = 1e-6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn from_f32(v: [f32; 3]) -> Self {
        Self::new(v[0] as f64, v[1] as f64, v[2] as f64)
    }

    pub fn to_f32(self) -> [f32; 3] {
        [self.x as f32, self.y as f32, self.z as f32]
    }

    /// Component by axis index: 0=x, 1=y, anything else=z
    pub fn axis(self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn magnitude(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction.
    /// The caller guarantees a non-zero magnitude; a zero vector yields NaN components.
    pub fn normalize(self) -> Self {
        self / self.magnitude()
    }

    pub fn distance(self, other: Self) -> f64 {
        (self - other).magnitude()
    }

    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    /// Component-wise equality within `VERTEX_EPSILON`, relative to the larger magnitude
    pub fn approx_eq(self, other: Self) -> bool {
        fn close(a: f64, b: f64) -> bool {
            (a - b).abs() <= VERTEX_EPSILON * a.abs().max(b.abs()).max(1.0)
        }
        close(self.x, other.x) && close(self.y, other.y) && close(self.z, other.z)
    }
}

impl Add for Vector3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vector3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vector3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Self;
    fn mul(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Div<f64> for Vector3 {
    type Output = Self;
    fn div(self, s: f64) -> Self {
        Self::new(self.x / s, self.y / s, self.z / s)
    }
}

/// Face normal (v2 - v1) x (v3 - v2), normalized; counter-clockwise faces point up
pub fn triangle_normal(v1: Vector3, v2: Vector3, v3: Vector3) -> Vector3 {
    (v2 - v1).cross(v3 - v2).normalize()
}

/// D coefficient of the plane N.P + D = 0
pub fn triangle_planar_distance(v1: Vector3, v2: Vector3, v3: Vector3) -> f64 {
    -triangle_normal(v1, v2, v3).dot(v1)
}

pub fn triangle_centre(v1: Vector3, v2: Vector3, v3: Vector3) -> Vector3 {
    (v1 + v2 + v3) / 3.0
}

/// Heron's formula over the three side lengths
pub fn triangle_area(v1: Vector3, v2: Vector3, v3: Vector3) -> f64 {
    let a = v1.distance(v2);
    let b = v2.distance(v3);
    let c = v3.distance(v1);
    let s = (a + b + c) / 2.0;
    // rounding can push a sliver triangle slightly negative
    (s * (s - a) * (s - b) * (s - c)).max(0.0).sqrt()
}

/// XY containment: the point is inside when the three edge cross products
/// never disagree in sign. Points on an edge count as inside.
pub fn triangle_contains_xy(v1: Vector3, v2: Vector3, v3: Vector3, x: f64, y: f64) -> bool {
    let side = |a: Vector3, b: Vector3| (b.x - a.x) * (y - a.y) - (b.y - a.y) * (x - a.x);
    let d1 = side(v1, v2);
    let d2 = side(v2, v3);
    let d3 = side(v3, v1);

    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}
