use crate::geometry::Vec3;

use super::LinearColor;

/// Third order (9 coefficient) real spherical harmonic vector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SHVector3 {
    pub v: [f32; 9],
}

impl SHVector3 {
    /// The basis evaluated in a unit direction.
    pub fn basis_function(direction: Vec3) -> SHVector3 {
        let Vec3(x, y, z) = direction;
        SHVector3 {
            v: [
                0.282095,
                -0.488603 * y,
                0.488603 * z,
                -0.488603 * x,
                1.092548 * x * y,
                -1.092548 * y * z,
                0.315392 * (3.0 * z * z - 1.0),
                -1.092548 * x * z,
                0.546274 * (x * x - y * y),
            ],
        }
    }

    pub fn dot(a: &SHVector3, b: &SHVector3) -> f32 {
        a.v.iter().zip(b.v.iter()).map(|(a, b)| a * b).sum()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SHVectorRGB3 {
    pub r: SHVector3,
    pub g: SHVector3,
    pub b: SHVector3,
}

impl SHVectorRGB3 {
    pub fn dot(&self, sh: &SHVector3) -> LinearColor {
        LinearColor::rgb(
            SHVector3::dot(&self.r, sh),
            SHVector3::dot(&self.g, sh),
            SHVector3::dot(&self.b, sh),
        )
    }
}

/// Second order (4 coefficient) basis, the layout gathered light map samples use.
pub fn sh2_basis_function(direction: Vec3) -> [f32; 4] {
    let Vec3(x, y, z) = direction;
    [0.282095, -0.488603 * y, 0.488603 * z, -0.488603 * x]
}
