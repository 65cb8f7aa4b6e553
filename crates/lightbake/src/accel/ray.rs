use bitflags::bitflags;

use crate::color::LinearColor;
use crate::geometry::{Vec2, Vec3};
use crate::scene::{MappingId, MeshId};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TraceFlags: u32 {
        /// Ignore masked and translucent triangles.
        const STATIC_AND_OPAQUE_ONLY = 1 << 0;
        /// Hit back faces as well as front faces.
        const TWO_SIDED_COLLISION = 1 << 1;
        /// Treat back faces as front faces.
        const FLIP_SIDEDNESS = 1 << 2;
        /// Only triangles flagged indirectly shadowed only block the ray.
        const INDIRECT_SHADOWING_ONLY = 1 << 3;
    }
}

/// A segment tested against the aggregate mesh.
///
/// `direction` spans the whole segment, so hit distances are fractions in [0, 1].
#[derive(Clone, Debug)]
pub struct LightRay {
    pub start: Vec3,
    pub end: Vec3,
    pub direction: Vec3,
    pub length: f32,
    /// Mesh whose shadowing is being computed; drives the self shadow rules.
    pub shadow_mesh: Option<MeshId>,
    /// Mesh the ray leaves from; drives the LOD and HLOD rules.
    pub mapping_mesh: Option<MeshId>,
    pub trace_flags: TraceFlags,
}

impl LightRay {
    pub fn new(start: Vec3, end: Vec3) -> LightRay {
        let direction = end - start;
        LightRay {
            start,
            end,
            direction,
            length: direction.length(),
            shadow_mesh: None,
            mapping_mesh: None,
            trace_flags: TraceFlags::empty(),
        }
    }

    pub fn with_context(mut self, context: RayContext) -> LightRay {
        self.shadow_mesh = context.shadow_mesh;
        self.mapping_mesh = context.mapping_mesh;
        self.trace_flags = context.trace_flags;
        self
    }

    pub fn context(&self) -> RayContext {
        RayContext {
            shadow_mesh: self.shadow_mesh,
            mapping_mesh: self.mapping_mesh,
            trace_flags: self.trace_flags,
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.start + self.direction * t
    }
}

/// The part of a ray that every lane of a batch shares.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RayContext {
    pub shadow_mesh: Option<MeshId>,
    pub mapping_mesh: Option<MeshId>,
    pub trace_flags: TraceFlags,
}

/// Candidate triangle reported by the traversal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaneHit {
    pub geometry: u32,
    pub primitive: u32,
    pub u: f32,
    pub v: f32,
    pub t: f32,
    /// Unnormalized (v1 - v0) x (v2 - v0).
    pub geometric_normal: Vec3,
}

/// One ray in the shape the traversal works on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayLane {
    pub origin: Vec3,
    pub direction: Vec3,
    pub t_near: f32,
    pub t_far: f32,
    pub hit: Option<LaneHit>,
}

impl RayLane {
    pub fn from_light_ray(ray: &LightRay) -> RayLane {
        RayLane { origin: ray.start, direction: ray.direction, t_near: 0.0, t_far: 1.0, hit: None }
    }
}

/// Structure of arrays form of `N` rays and their hits.
#[derive(Clone, Debug)]
pub struct RayBatch<const N: usize> {
    pub origin_x: [f32; N],
    pub origin_y: [f32; N],
    pub origin_z: [f32; N],
    pub direction_x: [f32; N],
    pub direction_y: [f32; N],
    pub direction_z: [f32; N],
    pub t_near: [f32; N],
    pub t_far: [f32; N],
    pub u: [f32; N],
    pub v: [f32; N],
    pub normal_x: [f32; N],
    pub normal_y: [f32; N],
    pub normal_z: [f32; N],
    /// `u32::MAX` where the lane has no hit.
    pub geometry: [u32; N],
    pub primitive: [u32; N],
}

impl<const N: usize> RayBatch<N> {
    pub const INVALID_ID: u32 = u32::MAX;

    pub fn new() -> Self {
        RayBatch {
            origin_x: [0.0; N],
            origin_y: [0.0; N],
            origin_z: [0.0; N],
            direction_x: [0.0; N],
            direction_y: [0.0; N],
            direction_z: [0.0; N],
            t_near: [0.0; N],
            t_far: [0.0; N],
            u: [0.0; N],
            v: [0.0; N],
            normal_x: [0.0; N],
            normal_y: [0.0; N],
            normal_z: [0.0; N],
            geometry: [Self::INVALID_ID; N],
            primitive: [Self::INVALID_ID; N],
        }
    }

    pub fn from_rays(rays: &[LightRay; N]) -> Self {
        let mut batch = RayBatch::new();
        for (lane, ray) in rays.iter().enumerate() {
            batch.set_lane(lane, &RayLane::from_light_ray(ray));
        }
        batch
    }

    pub fn get_lane(&self, lane: usize) -> RayLane {
        let hit = (self.geometry[lane] != Self::INVALID_ID).then(|| LaneHit {
            geometry: self.geometry[lane],
            primitive: self.primitive[lane],
            u: self.u[lane],
            v: self.v[lane],
            t: self.t_far[lane],
            geometric_normal: Vec3(self.normal_x[lane], self.normal_y[lane], self.normal_z[lane]),
        });
        RayLane {
            origin: Vec3(self.origin_x[lane], self.origin_y[lane], self.origin_z[lane]),
            direction: Vec3(self.direction_x[lane], self.direction_y[lane], self.direction_z[lane]),
            t_near: self.t_near[lane],
            t_far: self.t_far[lane],
            hit,
        }
    }

    /// A hit lane stores its hit distance in `t_far`, as the traversal shortens the ray.
    pub fn set_lane(&mut self, lane: usize, ray: &RayLane) {
        self.origin_x[lane] = ray.origin.0;
        self.origin_y[lane] = ray.origin.1;
        self.origin_z[lane] = ray.origin.2;
        self.direction_x[lane] = ray.direction.0;
        self.direction_y[lane] = ray.direction.1;
        self.direction_z[lane] = ray.direction.2;
        self.t_near[lane] = ray.t_near;
        self.t_far[lane] = ray.t_far;

        match ray.hit {
            Some(hit) => {
                self.t_far[lane] = hit.t;
                self.u[lane] = hit.u;
                self.v[lane] = hit.v;
                self.normal_x[lane] = hit.geometric_normal.0;
                self.normal_y[lane] = hit.geometric_normal.1;
                self.normal_z[lane] = hit.geometric_normal.2;
                self.geometry[lane] = hit.geometry;
                self.primitive[lane] = hit.primitive;
            }
            None => {
                self.geometry[lane] = Self::INVALID_ID;
                self.primitive[lane] = Self::INVALID_ID;
            }
        }
    }
}

impl<const N: usize> Default for RayBatch<N> {
    fn default() -> Self {
        RayBatch::new()
    }
}

/// Result of a light ray query.
#[derive(Clone, Debug, PartialEq)]
pub struct LightRayIntersection {
    pub hit: bool,
    pub position: Vec3,
    /// Faces the ray origin.
    pub geometric_normal: Vec3,
    pub shading_normal: Vec3,
    pub uv: Vec2,
    pub lightmap_uv: Vec2,
    pub element_index: usize,
    pub mesh: Option<MeshId>,
    pub mapping: Option<MappingId>,
    /// Fraction of the ray travelled before the hit.
    pub t: f32,
    /// Product of the transmission of every translucent surface crossed before the hit.
    pub transmission: LinearColor,
}

impl LightRayIntersection {
    pub fn miss(transmission: LinearColor) -> LightRayIntersection {
        LightRayIntersection {
            hit: false,
            position: Vec3::ZERO,
            geometric_normal: Vec3::ZERO,
            shading_normal: Vec3::ZERO,
            uv: Vec2::default(),
            lightmap_uv: Vec2::default(),
            element_index: 0,
            mesh: None,
            mapping: None,
            t: 1.0,
            transmission,
        }
    }
}
