use super::{Vec3, AABB};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Sphere {
        Sphere { center, radius }
    }
}

/// Box and enclosing sphere sharing one origin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxSphereBounds {
    pub origin: Vec3,
    pub box_extent: Vec3,
    pub sphere_radius: f32,
}

impl BoxSphereBounds {
    pub fn new(origin: Vec3, box_extent: Vec3, sphere_radius: f32) -> BoxSphereBounds {
        BoxSphereBounds { origin, box_extent, sphere_radius }
    }
}

impl From<AABB> for BoxSphereBounds {
    fn from(value: AABB) -> Self {
        if !value.is_valid() {
            return BoxSphereBounds::default();
        }
        let box_extent = value.extent();
        BoxSphereBounds {
            origin: value.center(),
            box_extent,
            sphere_radius: box_extent.length(),
        }
    }
}
