//! Row-major float matrices
//!
//! `Matrix3x4` is the engine's `matrix3x4_t` (bone-to-world transforms),
//! `VMatrix` the 4x4 view/projection matrix returned by
//! `IVEngineClient::WorldToScreenMatrix`.

use std::ops::{Index, IndexMut, Mul};

use super::vector::{Vector, Vector3};

/// R x C row-major matrix
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix<const R: usize, const C: usize>(pub [[f32; C]; R]);

/// Bone transform (`matrix3x4_t`)
pub type Matrix3x4 = Matrix<3, 4>;

/// 4x4 matrix (`VMatrix`)
pub type VMatrix = Matrix<4, 4>;

impl<const R: usize, const C: usize> Matrix<R, C> {
    /// All-zero matrix
    pub const fn zero() -> Self {
        Self([[0.0; C]; R])
    }

    /// Row `r` as a vector
    pub fn row(&self, r: usize) -> Vector<C> {
        Vector(self.0[r])
    }

    /// Column `c` as a vector
    pub fn column(&self, c: usize) -> Vector<R> {
        let mut out = [0.0; R];
        for (r, value) in out.iter_mut().enumerate() {
            *value = self.0[r][c];
        }
        Vector(out)
    }

    /// Transposed copy
    pub fn transpose(&self) -> Matrix<C, R> {
        let mut out = Matrix::<C, R>::zero();
        for r in 0..R {
            for c in 0..C {
                out.0[c][r] = self.0[r][c];
            }
        }
        out
    }
}

impl<const N: usize> Matrix<N, N> {
    /// Identity matrix
    pub fn identity() -> Self {
        let mut out = Self::zero();
        for i in 0..N {
            out.0[i][i] = 1.0;
        }
        out
    }
}

impl Matrix3x4 {
    /// Translation column
    pub fn origin(&self) -> Vector3 {
        Vector3::new(self.0[0][3], self.0[1][3], self.0[2][3])
    }

    /// Transform a point by rotation and translation (`VectorTransform`)
    pub fn transform_point(&self, point: &Vector3) -> Vector3 {
        let p = point.as_array();
        let mut out = [0.0; 3];
        for (r, value) in out.iter_mut().enumerate() {
            let row = &self.0[r];
            *value = p[0] * row[0] + p[1] * row[1] + p[2] * row[2] + row[3];
        }
        Vector3::from_array(out)
    }
}

impl VMatrix {
    /// Project a world point; returns clip-space x, y and w
    pub fn project(&self, point: &Vector3) -> (f32, f32, f32) {
        let p = point.as_array();
        let dot = |row: &[f32; 4]| p[0] * row[0] + p[1] * row[1] + p[2] * row[2] + row[3];
        (dot(&self.0[0]), dot(&self.0[1]), dot(&self.0[3]))
    }
}

impl<const R: usize, const C: usize> Default for Matrix<R, C> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const R: usize, const C: usize> Index<usize> for Matrix<R, C> {
    type Output = [f32; C];

    fn index(&self, row: usize) -> &[f32; C] {
        &self.0[row]
    }
}

impl<const R: usize, const C: usize> IndexMut<usize> for Matrix<R, C> {
    fn index_mut(&mut self, row: usize) -> &mut [f32; C] {
        &mut self.0[row]
    }
}

impl<const R: usize, const K: usize, const C: usize> Mul<Matrix<K, C>> for Matrix<R, K> {
    type Output = Matrix<R, C>;

    fn mul(self, rhs: Matrix<K, C>) -> Matrix<R, C> {
        let mut out = Matrix::<R, C>::zero();
        for r in 0..R {
            for c in 0..C {
                let mut sum = 0.0;
                for k in 0..K {
                    sum += self.0[r][k] * rhs.0[k][c];
                }
                out.0[r][c] = sum;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        assert_eq!(std::mem::size_of::<Matrix3x4>(), 48);
        assert_eq!(std::mem::size_of::<VMatrix>(), 64);
    }

    #[test]
    fn test_identity_multiplication() {
        let m = Matrix::<2, 3>([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(Matrix::<2, 2>::identity() * m, m);
        assert_eq!(m * Matrix::<3, 3>::identity(), m);
    }

    #[test]
    fn test_multiplication_shape() {
        let a = Matrix::<2, 3>([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let b = a.transpose();
        let c = a * b;
        assert_eq!(c.0, [[14.0, 32.0], [32.0, 77.0]]);
    }

    #[test]
    fn test_rows_and_columns() {
        let m = Matrix::<2, 3>([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(m.row(1), Vector::<3>([4.0, 5.0, 6.0]));
        assert_eq!(m.column(2), Vector::<2>([3.0, 6.0]));
        assert_eq!(m[0][1], 2.0);
    }

    #[test]
    fn test_bone_transform() {
        let bone = Matrix::<3, 4>([
            [1.0, 0.0, 0.0, 10.0],
            [0.0, 1.0, 0.0, 20.0],
            [0.0, 0.0, 1.0, 30.0],
        ]);
        assert_eq!(bone.origin(), Vector3::new(10.0, 20.0, 30.0));
        assert_eq!(
            bone.transform_point(&Vector3::new(1.0, 2.0, 3.0)),
            Vector3::new(11.0, 22.0, 33.0)
        );
    }
}
