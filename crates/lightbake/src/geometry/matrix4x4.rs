use std::ops::{Index, IndexMut};

use super::Vec3;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix4x4 {
    // row-major, column vectors; translation lives in the last column
    pub data: [[f32; 4]; 4],
}

impl Index<usize> for Matrix4x4 {
    type Output = f32;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index / 4][index % 4]
    }
}

impl IndexMut<usize> for Matrix4x4 {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index / 4][index % 4]
    }
}

impl Default for Matrix4x4 {
    fn default() -> Self {
        Matrix4x4::identity()
    }
}

impl Matrix4x4 {
    pub fn identity() -> Self {
        Matrix4x4 {
            data: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn translation(direction: Vec3) -> Matrix4x4 {
        let mut me = Self::identity();
        me.data[0][3] = direction.0;
        me.data[1][3] = direction.1;
        me.data[2][3] = direction.2;

        me
    }

    pub fn scale(scale: Vec3) -> Matrix4x4 {
        let mut me = Self::identity();
        me.data[0][0] = scale.0;
        me.data[1][1] = scale.1;
        me.data[2][2] = scale.2;

        me
    }

    pub fn matmul(a: Matrix4x4, b: Matrix4x4) -> Self {
        let mut m = Matrix4x4::identity();
        for i in 0..4 {
            for j in 0..4 {
                let mut dot = 0.0;
                for k in 0..4 {
                    dot += a.data[i][k] * b.data[k][j]
                }
                m.data[i][j] = dot;
            }
        }
        m
    }

    pub fn column(&self, index: usize) -> Vec3 {
        Vec3(self.data[0][index], self.data[1][index], self.data[2][index])
    }

    pub fn origin(&self) -> Vec3 {
        self.column(3)
    }

    /// Length of each basis axis.
    pub fn scale_vector(&self) -> Vec3 {
        Vec3(self.column(0).length(), self.column(1).length(), self.column(2).length())
    }

    /// Inverse of an affine matrix (bottom row 0 0 0 1). None when the linear part is singular.
    pub fn invert_affine(&self) -> Option<Matrix4x4> {
        let m = &self.data;
        let c00 = m[1][1] * m[2][2] - m[1][2] * m[2][1];
        let c01 = m[1][2] * m[2][0] - m[1][0] * m[2][2];
        let c02 = m[1][0] * m[2][1] - m[1][1] * m[2][0];
        let det = m[0][0] * c00 + m[0][1] * c01 + m[0][2] * c02;
        if det.abs() < f32::MIN_POSITIVE {
            return None;
        }
        let inv_det = 1.0 / det;

        let mut inv = Matrix4x4::identity();
        inv.data[0][0] = c00 * inv_det;
        inv.data[1][0] = c01 * inv_det;
        inv.data[2][0] = c02 * inv_det;
        inv.data[0][1] = (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det;
        inv.data[1][1] = (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det;
        inv.data[2][1] = (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det;
        inv.data[0][2] = (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det;
        inv.data[1][2] = (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det;
        inv.data[2][2] = (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det;

        let translation = inv.apply_vector(self.origin());
        inv.data[0][3] = -translation.0;
        inv.data[1][3] = -translation.1;
        inv.data[2][3] = -translation.2;
        Some(inv)
    }

    pub fn apply_point(&self, p: Vec3) -> Vec3 {
        self.apply_vector(p) + self.origin()
    }

    pub fn apply_vector(&self, v: Vec3) -> Vec3 {
        let a = self.data[0][0] * v.0 + self.data[0][1] * v.1 + self.data[0][2] * v.2;
        let b = self.data[1][0] * v.0 + self.data[1][1] * v.1 + self.data[1][2] * v.2;
        let c = self.data[2][0] * v.0 + self.data[2][1] * v.1 + self.data[2][2] * v.2;
        Vec3(a, b, c)
    }

    pub fn apply_vector_transposed(&self, v: Vec3) -> Vec3 {
        let a = self.data[0][0] * v.0 + self.data[1][0] * v.1 + self.data[2][0] * v.2;
        let b = self.data[0][1] * v.0 + self.data[1][1] * v.1 + self.data[2][1] * v.2;
        let c = self.data[0][2] * v.0 + self.data[1][2] * v.1 + self.data[2][2] * v.2;
        Vec3(a, b, c)
    }
}

// assumes row major
impl From<[f32; 16]> for Matrix4x4 {
    fn from(value: [f32; 16]) -> Self {
        let mut m = Matrix4x4::identity();
        for (i, v) in value.into_iter().enumerate() {
            m[i] = v;
        }
        m
    }
}
