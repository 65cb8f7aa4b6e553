use super::vec3::Vec3;

/// Axis-aligned bounding box
/// Defined by 2 points
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AABB {
    pub minimum: Vec3,
    pub maximum: Vec3
}

impl Default for AABB {
    fn default() -> Self {
        AABB::empty()
    }
}

impl AABB {
    pub fn new(minimum: Vec3, maximum: Vec3) -> AABB {
        AABB { minimum, maximum }
    }

    /// A box that contains nothing; adding anything to it yields that thing's bounds.
    pub fn empty() -> AABB {
        AABB {
            minimum: Vec3(f32::MAX, f32::MAX, f32::MAX),
            maximum: Vec3(f32::MIN, f32::MIN, f32::MIN),
        }
    }

    pub fn zero() -> AABB {
        AABB { minimum: Vec3::ZERO, maximum: Vec3::ZERO }
    }

    pub fn is_valid(&self) -> bool {
        self.minimum.0 <= self.maximum.0
            && self.minimum.1 <= self.maximum.1
            && self.minimum.2 <= self.maximum.2
    }

    pub fn from_points(points: &[Vec3]) -> AABB {
        points.iter().fold(AABB::empty(), |bounds, p| bounds.add_point(*p))
    }

    pub fn add_point(&self, p: Vec3) -> AABB {
        AABB {
            minimum: Vec3::elementwise_min(self.minimum, p),
            maximum: Vec3::elementwise_max(self.maximum, p),
        }
    }

    /// Returns a box which surrounds both a and b
    pub fn surrounding_box(a: AABB, b: AABB) -> AABB {
        AABB {
            minimum: Vec3::elementwise_min(a.minimum, b.minimum),
            maximum: Vec3::elementwise_max(a.maximum, b.maximum),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.minimum + self.maximum) * 0.5
    }

    /// Half size along each axis.
    pub fn extent(&self) -> Vec3 {
        (self.maximum - self.minimum) * 0.5
    }

    /// Closed-interval overlap test.
    pub fn intersects(&self, other: &AABB) -> bool {
        !(self.minimum.0 > other.maximum.0 || other.minimum.0 > self.maximum.0
            || self.minimum.1 > other.maximum.1 || other.minimum.1 > self.maximum.1
            || self.minimum.2 > other.maximum.2 || other.minimum.2 > self.maximum.2)
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.0 >= self.minimum.0 && p.0 <= self.maximum.0
            && p.1 >= self.minimum.1 && p.1 <= self.maximum.1
            && p.2 >= self.minimum.2 && p.2 <= self.maximum.2
    }
}
