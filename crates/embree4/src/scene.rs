use embree4_sys::{
    RTCBuildQuality, RTCFeatureFlags, RTCFilterFunctionNArguments, RTCIntersectArguments, RTCOccludedArguments,
    RTCRayQueryContext, RTCRayQueryFlags, RTCScene, RTCSceneFlags, rtcAttachGeometryByID, rtcCommitScene,
    rtcIntersect1, rtcIntersect4, rtcNewScene, rtcOccluded1, rtcOccluded4, rtcReleaseScene, rtcSetSceneBuildQuality,
    rtcSetSceneFlags,
};

use crate::ray::{FilterCandidate, Hit, INVALID_ID, Ray, RayHit4};
use crate::{Device, EmbreeError, TriangleGeometry};

/// Decides whether a candidate hit counts. Returning false makes Embree keep traversing.
pub type HitFilter<'a> = dyn FnMut(&FilterCandidate) -> bool + 'a;

/// Query context handed through Embree to the filter callbacks.
///
/// `base` must stay the first field; the callbacks cast the context pointer back to this type.
#[repr(C)]
struct FilterContext<'f, 'a> {
    base: RTCRayQueryContext,
    filter: &'f mut HitFilter<'a>,
}

impl<'f, 'a> FilterContext<'f, 'a> {
    fn new(filter: &'f mut HitFilter<'a>) -> Self {
        // SAFETY: RTCRayQueryContext is plain data
        let mut base: RTCRayQueryContext = unsafe { std::mem::zeroed() };
        base.instID.fill(INVALID_ID);
        FilterContext { base, filter }
    }

    fn intersect_arguments(&mut self) -> RTCIntersectArguments {
        // SAFETY: RTCIntersectArguments is plain data; null callbacks are valid
        let mut arguments: RTCIntersectArguments = unsafe { std::mem::zeroed() };
        arguments.flags = RTCRayQueryFlags::RTC_RAY_QUERY_FLAG_INCOHERENT;
        arguments.feature_mask = RTCFeatureFlags::RTC_FEATURE_FLAG_ALL;
        arguments.context = &mut self.base;
        arguments
    }

    fn occluded_arguments(&mut self) -> RTCOccludedArguments {
        // SAFETY: RTCOccludedArguments is plain data; null callbacks are valid
        let mut arguments: RTCOccludedArguments = unsafe { std::mem::zeroed() };
        arguments.flags = RTCRayQueryFlags::RTC_RAY_QUERY_FLAG_INCOHERENT;
        arguments.feature_mask = RTCFeatureFlags::RTC_FEATURE_FLAG_ALL;
        arguments.context = &mut self.base;
        arguments
    }
}

/// Shared by the intersect and occluded filters of every geometry, for 1 and 4 wide queries.
pub(crate) unsafe extern "C" fn filter_trampoline(args: *const RTCFilterFunctionNArguments) {
    // SAFETY: embree passes valid arguments for the duration of the call, and every query
    // issued by this crate passes a FilterContext as its context
    unsafe {
        let args = &*args;
        let context = &mut *(args.context as *mut FilterContext);
        let width = args.N as usize;
        let ray = args.ray as *const f32;
        let hit = args.hit as *const f32;
        let ray_u32 = args.ray as *const u32;
        let hit_u32 = args.hit as *const u32;

        // RTCRayN and RTCHitN are structures of arrays of `width` lanes
        let ray_field = |field: usize, lane: usize| *ray.add(field * width + lane);
        let hit_field = |field: usize, lane: usize| *hit.add(field * width + lane);

        for lane in 0..width {
            let valid = args.valid.add(lane);
            if *valid == 0 {
                continue;
            }
            let candidate = FilterCandidate {
                lane: *ray_u32.add(10 * width + lane) as usize,
                origin: [ray_field(0, lane), ray_field(1, lane), ray_field(2, lane)],
                direction: [ray_field(4, lane), ray_field(5, lane), ray_field(6, lane)],
                hit: Hit {
                    geometry: *hit_u32.add(6 * width + lane),
                    primitive: *hit_u32.add(5 * width + lane),
                    u: hit_field(3, lane),
                    v: hit_field(4, lane),
                    t: ray_field(8, lane),
                    normal: [hit_field(0, lane), hit_field(1, lane), hit_field(2, lane)],
                },
            };
            if !(context.filter)(&candidate) {
                *valid = 0;
            }
        }
    }
}

pub struct Scene {
    handle: RTCScene,
    geometries: Vec<TriangleGeometry>,
}

// SAFETY: a committed scene may be traversed from any number of threads at once, and it is
// only mutated through `&mut self`
unsafe impl Send for Scene {}
unsafe impl Sync for Scene {}

impl Scene {
    pub fn new(device: &Device) -> Result<Scene, EmbreeError> {
        let handle = unsafe { rtcNewScene(device.handle) };
        if handle.is_null() {
            return Err(device.error().err().unwrap_or(EmbreeError::NullHandle("scene")));
        }
        unsafe {
            rtcSetSceneFlags(handle, RTCSceneFlags::RTC_SCENE_FLAG_ROBUST);
            rtcSetSceneBuildQuality(handle, RTCBuildQuality::RTC_BUILD_QUALITY_HIGH);
        }
        Ok(Scene { handle, geometries: Vec::new() })
    }

    /// Attaches `geometry` under `id`, the geometry id reported in hits.
    pub fn attach(&mut self, geometry: TriangleGeometry, id: u32) {
        unsafe {
            rtcAttachGeometryByID(self.handle, geometry.handle, id);
        }
        self.geometries.push(geometry);
    }

    pub fn commit(&mut self, device: &Device) -> Result<(), EmbreeError> {
        unsafe {
            rtcCommitScene(self.handle);
        }
        device.error()
    }

    /// Closest hit accepted by `filter`.
    pub fn intersect1(&self, ray: &Ray, filter: &mut HitFilter<'_>) -> Option<Hit> {
        let mut context = FilterContext::new(filter);
        let mut arguments = context.intersect_arguments();
        let mut ray_hit = ray.to_rtc_ray_hit();
        unsafe {
            rtcIntersect1(self.handle, &mut ray_hit, &mut arguments);
        }
        Hit::from_rtc(&ray_hit)
    }

    /// Whether any hit is accepted by `filter`. Traversal stops at the first accepted hit.
    pub fn occluded1(&self, ray: &Ray, filter: &mut HitFilter<'_>) -> bool {
        let mut context = FilterContext::new(filter);
        let mut arguments = context.occluded_arguments();
        let mut rtc_ray = ray.to_rtc();
        unsafe {
            rtcOccluded1(self.handle, &mut rtc_ray, &mut arguments);
        }
        rtc_ray.tfar == f32::NEG_INFINITY
    }

    pub fn intersect4(&self, rays: &mut RayHit4, filter: &mut HitFilter<'_>) {
        let mut context = FilterContext::new(filter);
        let mut arguments = context.intersect_arguments();
        unsafe {
            rtcIntersect4(rays.valid.as_ptr(), self.handle, &mut rays.raw, &mut arguments);
        }
    }

    pub fn occluded4(&self, rays: &mut RayHit4, filter: &mut HitFilter<'_>) {
        let mut context = FilterContext::new(filter);
        let mut arguments = context.occluded_arguments();
        let valid = rays.valid;
        unsafe {
            rtcOccluded4(valid.as_ptr(), self.handle, rays.rays_mut(), &mut arguments);
        }
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        unsafe {
            rtcReleaseScene(self.handle);
        }
        self.geometries.clear();
    }
}

