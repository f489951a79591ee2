//! Fixed-size float vectors and view angles
//!
//! `Vector<N>` has the same layout as the engine's `Vector2D`, `Vector` and
//! `Vector4D` (N packed `f32`), so it can be read straight out of entity
//! memory.

use std::ops::{
    Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign,
};

/// N-dimensional float vector
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector<const N: usize>(pub [f32; N]);

/// 2D vector (`Vector2D`)
pub type Vector2D = Vector<2>;

/// 3D vector (`Vector`)
pub type Vector3 = Vector<3>;

/// 4D vector (`Vector4D`)
pub type Vector4D = Vector<4>;

impl<const N: usize> Vector<N> {
    /// Create a vector from its components
    #[inline]
    pub const fn from_array(components: [f32; N]) -> Self {
        Self(components)
    }

    /// All components set to `value`
    #[inline]
    pub const fn splat(value: f32) -> Self {
        Self([value; N])
    }

    /// The zero vector
    #[inline]
    pub const fn zero() -> Self {
        Self::splat(0.0)
    }

    /// Component array
    #[inline]
    pub const fn as_array(&self) -> &[f32; N] {
        &self.0
    }

    /// Dot product
    pub fn dot(&self, rhs: &Self) -> f32 {
        self.0.iter().zip(rhs.0.iter()).map(|(a, b)| a * b).sum()
    }

    /// Squared length
    #[inline]
    pub fn length_sqr(&self) -> f32 {
        self.dot(self)
    }

    /// Euclidean length
    #[inline]
    pub fn length(&self) -> f32 {
        self.length_sqr().sqrt()
    }

    /// Distance between two points
    #[inline]
    pub fn distance_to(&self, other: &Self) -> f32 {
        (*self - *other).length()
    }

    /// Unit vector in the same direction
    ///
    /// A zero-length vector is returned unchanged.
    pub fn normalized(&self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            *self
        } else {
            *self / len
        }
    }

    /// True if every component is (almost) zero
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|c| c.abs() <= 0.01)
    }

    /// Component-wise product
    pub fn mul_elem(&self, rhs: &Self) -> Self {
        let mut out = *self;
        for (a, b) in out.0.iter_mut().zip(rhs.0.iter()) {
            *a *= b;
        }
        out
    }

    /// Linear interpolation, `t` is not clamped
    pub fn lerp(&self, to: &Self, t: f32) -> Self {
        *self + (*to - *self) * t
    }
}

impl Vector<2> {
    /// Create a 2D vector
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self([x, y])
    }

    #[inline]
    pub const fn x(&self) -> f32 {
        self.0[0]
    }

    #[inline]
    pub const fn y(&self) -> f32 {
        self.0[1]
    }
}

impl Vector<3> {
    /// Create a 3D vector
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self([x, y, z])
    }

    #[inline]
    pub const fn x(&self) -> f32 {
        self.0[0]
    }

    #[inline]
    pub const fn y(&self) -> f32 {
        self.0[1]
    }

    #[inline]
    pub const fn z(&self) -> f32 {
        self.0[2]
    }

    /// Cross product
    pub fn cross(&self, rhs: &Self) -> Self {
        let [ax, ay, az] = self.0;
        let [bx, by, bz] = rhs.0;
        Self::new(ay * bz - az * by, az * bx - ax * bz, ax * by - ay * bx)
    }

    /// Length of the XY projection
    pub fn length_2d(&self) -> f32 {
        (self.0[0] * self.0[0] + self.0[1] * self.0[1]).sqrt()
    }
}

impl Vector<4> {
    /// Create a 4D vector
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self([x, y, z, w])
    }
}

impl<const N: usize> Default for Vector<N> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const N: usize> From<[f32; N]> for Vector<N> {
    fn from(components: [f32; N]) -> Self {
        Self(components)
    }
}

impl<const N: usize> Index<usize> for Vector<N> {
    type Output = f32;

    #[inline]
    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}

impl<const N: usize> IndexMut<usize> for Vector<N> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut f32 {
        &mut self.0[index]
    }
}

macro_rules! impl_elementwise {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $op:tt) => {
        impl<const N: usize> $trait for Vector<N> {
            type Output = Self;

            fn $method(mut self, rhs: Self) -> Self {
                for (a, b) in self.0.iter_mut().zip(rhs.0.iter()) {
                    *a = *a $op *b;
                }
                self
            }
        }

        impl<const N: usize> $assign_trait for Vector<N> {
            fn $assign_method(&mut self, rhs: Self) {
                *self = *self $op rhs;
            }
        }
    };
}

macro_rules! impl_scalar {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $op:tt) => {
        impl<const N: usize> $trait<f32> for Vector<N> {
            type Output = Self;

            fn $method(mut self, rhs: f32) -> Self {
                for a in self.0.iter_mut() {
                    *a = *a $op rhs;
                }
                self
            }
        }

        impl<const N: usize> $assign_trait<f32> for Vector<N> {
            fn $assign_method(&mut self, rhs: f32) {
                *self = *self $op rhs;
            }
        }
    };
}

impl_elementwise!(Add, add, AddAssign, add_assign, +);
impl_elementwise!(Sub, sub, SubAssign, sub_assign, -);
impl_scalar!(Mul, mul, MulAssign, mul_assign, *);
impl_scalar!(Div, div, DivAssign, div_assign, /);

impl<const N: usize> Neg for Vector<N> {
    type Output = Self;

    fn neg(self) -> Self {
        self * -1.0
    }
}

/// Euler view angles in degrees (`QAngle`)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QAngle {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl QAngle {
    pub const fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Forward, right and up vectors for these angles (`AngleVectors`)
    pub fn to_vectors(&self) -> (Vector3, Vector3, Vector3) {
        let (sp, cp) = self.pitch.to_radians().sin_cos();
        let (sy, cy) = self.yaw.to_radians().sin_cos();
        let (sr, cr) = self.roll.to_radians().sin_cos();

        let forward = Vector3::new(cp * cy, cp * sy, -sp);
        let right = Vector3::new(
            -sr * sp * cy + cr * sy,
            -sr * sp * sy - cr * cy,
            -sr * cp,
        );
        let up = Vector3::new(cr * sp * cy + sr * sy, cr * sp * sy - sr * cy, cr * cp);

        (forward, right, up)
    }

    /// Forward vector only
    pub fn forward(&self) -> Vector3 {
        self.to_vectors().0
    }

    /// Angles pointing along `forward` (`VectorAngles`), roll is zero
    pub fn from_vector(forward: &Vector3) -> Self {
        let [x, y, z] = forward.0;

        if x == 0.0 && y == 0.0 {
            let pitch = if z > 0.0 { 270.0 } else { 90.0 };
            return Self::new(pitch, 0.0, 0.0);
        }

        let mut yaw = y.atan2(x).to_degrees();
        if yaw < 0.0 {
            yaw += 360.0;
        }

        let tmp = (x * x + y * y).sqrt();
        let mut pitch = (-z).atan2(tmp).to_degrees();
        if pitch < 0.0 {
            pitch += 360.0;
        }

        Self::new(pitch, yaw, 0.0)
    }

    /// Pitch, yaw and roll wrapped into (-180, 180]
    pub fn normalized(&self) -> Self {
        Self::new(
            normalize_angle(self.pitch),
            normalize_angle(self.yaw),
            normalize_angle(self.roll),
        )
    }
}

/// Wrap an angle in degrees into (-180, 180]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    a
}
