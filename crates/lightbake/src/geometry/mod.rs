mod aabb;
mod bounds;
mod matrix4x4;
mod plane;
mod transform;
mod vec2;
mod vec3;


pub use aabb::AABB;
pub use bounds::{BoxSphereBounds, Sphere};
pub use matrix4x4::Matrix4x4;
pub use plane::Plane;
pub use transform::Transform;
pub use vec2::Vec2;
pub use vec3::Vec3;

pub const SMALL_NUMBER: f32 = 1.0e-8;
pub const KINDA_SMALL_NUMBER: f32 = 1.0e-4;
pub const DELTA: f32 = 0.00001;
/// Radius used for lights without a finite extent.
pub const WORLD_MAX: f32 = 2_097_152.0;

pub fn triangle_area(p0: Vec3, p1: Vec3, p2: Vec3) -> f32 {
    0.5 * Vec3::cross(p1 - p0, p2 - p0).length()
}
