use super::Vec3;

/// Plane `x*X + y*Y + z*Z = w`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub w: f32,
}

impl Plane {
    pub fn new(normal: Vec3, w: f32) -> Plane {
        Plane { normal, w }
    }

    /// Signed distance scaled by the normal's length; negative on the back side.
    pub fn plane_dot(&self, p: Vec3) -> f32 {
        Vec3::dot(self.normal, p) - self.w
    }
}
