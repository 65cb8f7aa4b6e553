use super::{Matrix4x4, Vec3};

/// Affine local-to-world transform with its cached inverse.
#[derive(Clone, Copy, Debug)]
pub struct Transform {
    forward: Matrix4x4,
    inverse: Matrix4x4
}

impl Transform {
    pub fn identity() -> Self {
        Transform { forward: Matrix4x4::identity(), inverse: Matrix4x4::identity() }
    }

    /// None when the matrix has no inverse.
    pub fn from_matrix(matrix: Matrix4x4) -> Option<Self> {
        let inverse = matrix.invert_affine()?;
        Some(Transform { forward: matrix, inverse })
    }

    pub fn matrix(&self) -> &Matrix4x4 {
        &self.forward
    }

    pub fn apply_point(&self, point: Vec3) -> Vec3 {
        self.forward.apply_point(point)
    }

    pub fn apply_vector(&self, vector: Vec3) -> Vec3 {
        self.forward.apply_vector(vector)
    }

    // normals go through the inverse transpose
    pub fn apply_normal(&self, normal: Vec3) -> Vec3 {
        Vec3::safe_normalized(self.inverse.apply_vector_transposed(normal))
    }

    pub fn invert(&self) -> Transform {
        Transform { forward: self.inverse, inverse: self.forward }
    }
}
