use std::sync::Arc;

use tracing::info;

use crate::geometry::{Vec3, AABB};
use crate::materials::Material;
use crate::scene::{MappingId, MeshId, MeshInstance};

use super::filter::{accept_hit, FilterQuery};
use super::geometry::GeometryStore;
use super::ray::{LaneHit, LightRay, LightRayIntersection, RayBatch, RayLane};
use super::transmission::TransmissionAccumulator;
use super::AggregateMesh;

/// Möller-Trumbore without culling. Returns (t, u, v); sidedness is left to the filter.
pub(crate) fn ray_triangle_intersect(p0: Vec3, p1: Vec3, p2: Vec3, origin: Vec3, direction: Vec3) -> Option<Vec3> {
    let e1 = p1 - p0;
    let e2 = p2 - p0;

    let p = Vec3::cross(direction, e2);
    let denom = Vec3::dot(p, e1);
    if denom == 0.0 {
        return None;
    }

    let t_vec = origin - p0;
    let u = Vec3::dot(p, t_vec) / denom;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = Vec3::cross(t_vec, e1);
    let v = Vec3::dot(q, direction) / denom;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = Vec3::dot(q, e2) / denom;
    Some(Vec3(t, u, v))
}

/// Brute force aggregate mesh that tests every triangle against every ray.
///
/// Slow, but the only backend available without the native kernel library, and the baseline
/// the accelerated backend is checked against.
#[derive(Clone, Debug)]
pub struct DefaultAggregateMesh {
    store: GeometryStore,
    prepared: bool,
}

impl DefaultAggregateMesh {
    pub fn new(importance_volumes: Vec<AABB>) -> DefaultAggregateMesh {
        DefaultAggregateMesh { store: GeometryStore::new(importance_volumes), prepared: false }
    }

    /// Runs the filter over every candidate in (t_near, t_far), shortening the lane on each
    /// accepted hit. Stops at the first accepted hit unless `find_closest` is set.
    fn traverse(&self, lane: &mut RayLane, query: &FilterQuery, transmission: &mut TransmissionAccumulator) {
        for (geometry_index, geometry) in self.store.geometries.iter().enumerate() {
            for primitive in 0..geometry.indices.len() {
                let [p0, p1, p2] = geometry.triangle(primitive as u32);
                let Some(Vec3(t, u, v)) = ray_triangle_intersect(p0, p1, p2, lane.origin, lane.direction) else {
                    continue;
                };
                if t <= lane.t_near || t >= lane.t_far {
                    continue;
                }

                let candidate = LaneHit {
                    geometry: geometry_index as u32,
                    primitive: primitive as u32,
                    u,
                    v,
                    t,
                    geometric_normal: Vec3::cross(p1 - p0, p2 - p0),
                };
                if accept_hit(&self.store, query, lane.direction, &candidate, transmission) {
                    lane.t_far = t;
                    lane.hit = Some(candidate);
                    if !query.find_closest {
                        return;
                    }
                }
            }
        }
    }
}

impl AggregateMesh for DefaultAggregateMesh {
    fn add_mesh(
        &mut self,
        mesh_id: MeshId,
        mesh: &MeshInstance,
        materials: &[Arc<Material>],
        mapping: Option<MappingId>,
    ) {
        assert!(!self.prepared, "mesh added after prepare_for_raytracing");
        self.store.add_mesh(mesh_id, mesh, materials, mapping);
    }

    fn prepare_for_raytracing(&mut self) {
        self.prepared = true;
        info!(
            geometries = self.store.geometries.len(),
            surface_area = self.store.surface_area,
            "reference aggregate mesh ready"
        );
    }

    fn store(&self) -> &GeometryStore {
        &self.store
    }

    fn intersect_light_ray(
        &self,
        ray: &LightRay,
        find_closest: bool,
        calculate_transmission: bool,
        direct_shadowing_ray: bool,
    ) -> LightRayIntersection {
        let query = FilterQuery {
            context: ray.context(),
            find_closest,
            calculate_transmission,
            direct_shadowing: direct_shadowing_ray,
        };
        let mut transmission = TransmissionAccumulator::new();
        let mut lane = RayLane::from_light_ray(ray);
        self.traverse(&mut lane, &query, &mut transmission);
        self.store.resolve_lane(ray, &lane, find_closest, &transmission)
    }

    fn intersect_light_rays4(
        &self,
        rays: &[LightRay; 4],
        find_closest: bool,
        calculate_transmission: bool,
        direct_shadowing_ray: bool,
    ) -> [LightRayIntersection; 4] {
        let query = FilterQuery {
            context: super::shared_context(rays),
            find_closest,
            calculate_transmission,
            direct_shadowing: direct_shadowing_ray,
        };

        let mut batch = RayBatch::<4>::from_rays(rays);
        let mut transmission: [TransmissionAccumulator; 4] = Default::default();
        for (index, accumulator) in transmission.iter_mut().enumerate() {
            let mut lane = batch.get_lane(index);
            self.traverse(&mut lane, &query, accumulator);
            batch.set_lane(index, &lane);
        }

        std::array::from_fn(|index| {
            self.store.resolve_lane(&rays[index], &batch.get_lane(index), find_closest, &transmission[index])
        })
    }
}
