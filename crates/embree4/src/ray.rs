use embree4_sys::{RTCHit, RTCHit4, RTCRay, RTCRay4, RTCRayHit, RTCRayHit4};

pub(crate) const INVALID_ID: u32 = u32::MAX;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: [f32; 3],
    pub direction: [f32; 3],
    pub t_near: f32,
    pub t_far: f32,
}

/// An accepted intersection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub geometry: u32,
    pub primitive: u32,
    pub u: f32,
    pub v: f32,
    pub t: f32,
    /// Unnormalized geometric normal.
    pub normal: [f32; 3],
}

/// A potential intersection handed to the query's filter before Embree accepts it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterCandidate {
    /// Lane of the ray within its packet; always 0 for single rays.
    pub lane: usize,
    pub origin: [f32; 3],
    pub direction: [f32; 3],
    pub hit: Hit,
}

impl Ray {
    pub(crate) fn to_rtc(&self) -> RTCRay {
        RTCRay {
            org_x: self.origin[0],
            org_y: self.origin[1],
            org_z: self.origin[2],
            tnear: self.t_near,
            dir_x: self.direction[0],
            dir_y: self.direction[1],
            dir_z: self.direction[2],
            time: 0.0,
            tfar: self.t_far,
            mask: u32::MAX,
            id: 0,
            flags: 0,
        }
    }

    pub(crate) fn to_rtc_ray_hit(&self) -> RTCRayHit {
        // SAFETY: RTCHit is plain data
        let mut hit: RTCHit = unsafe { std::mem::zeroed() };
        hit.geomID = INVALID_ID;
        hit.primID = INVALID_ID;
        hit.instID.fill(INVALID_ID);
        RTCRayHit { ray: self.to_rtc(), hit }
    }
}

impl Hit {
    pub(crate) fn from_rtc(ray_hit: &RTCRayHit) -> Option<Hit> {
        let hit = &ray_hit.hit;
        (hit.geomID != INVALID_ID).then(|| Hit {
            geometry: hit.geomID,
            primitive: hit.primID,
            u: hit.u,
            v: hit.v,
            t: ray_hit.ray.tfar,
            normal: [hit.Ng_x, hit.Ng_y, hit.Ng_z],
        })
    }
}

/// Four rays and their hits in the packet layout Embree traverses.
pub struct RayHit4 {
    pub(crate) raw: RTCRayHit4,
    pub(crate) valid: [i32; 4],
}

impl RayHit4 {
    pub fn new(rays: &[Ray; 4]) -> RayHit4 {
        // SAFETY: RTCRayHit4 is plain data
        let mut raw: RTCRayHit4 = unsafe { std::mem::zeroed() };
        for (lane, ray) in rays.iter().enumerate() {
            raw.ray.org_x[lane] = ray.origin[0];
            raw.ray.org_y[lane] = ray.origin[1];
            raw.ray.org_z[lane] = ray.origin[2];
            raw.ray.dir_x[lane] = ray.direction[0];
            raw.ray.dir_y[lane] = ray.direction[1];
            raw.ray.dir_z[lane] = ray.direction[2];
            raw.ray.tnear[lane] = ray.t_near;
            raw.ray.tfar[lane] = ray.t_far;
            raw.ray.mask[lane] = u32::MAX;
            raw.ray.id[lane] = lane as u32;
            raw.hit.geomID[lane] = INVALID_ID;
            raw.hit.primID[lane] = INVALID_ID;
        }
        for level in raw.hit.instID.iter_mut() {
            level.fill(INVALID_ID);
        }
        RayHit4 { raw, valid: [-1; 4] }
    }

    pub(crate) fn rays_mut(&mut self) -> &mut RTCRay4 {
        &mut self.raw.ray
    }

    /// Occluded queries mark blocked lanes with a negative infinite `t_far`.
    pub fn is_occluded(&self, lane: usize) -> bool {
        self.raw.ray.tfar[lane] == f32::NEG_INFINITY
    }

    pub fn hit(&self, lane: usize) -> Option<Hit> {
        let hit: &RTCHit4 = &self.raw.hit;
        (hit.geomID[lane] != INVALID_ID).then(|| Hit {
            geometry: hit.geomID[lane],
            primitive: hit.primID[lane],
            u: hit.u[lane],
            v: hit.v[lane],
            t: self.raw.ray.tfar[lane],
            normal: [hit.Ng_x[lane], hit.Ng_y[lane], hit.Ng_z[lane]],
        })
    }
}
