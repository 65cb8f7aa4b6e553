use std::sync::Arc;

use embree4::{Device, EmbreeError, FilterCandidate, Hit, Ray, RayHit4, TriangleGeometry};
use tracing::{error, info};

use crate::geometry::{Vec3, AABB};
use crate::materials::Material;
use crate::scene::{MappingId, MeshId, MeshInstance};

use super::filter::{accept_hit, FilterQuery};
use super::geometry::GeometryStore;
use super::ray::{LaneHit, LightRay, LightRayIntersection, RayBatch, RayLane};
use super::transmission::TransmissionAccumulator;
use super::{shared_context, AggregateMesh};

fn to_array(v: Vec3) -> [f32; 3] {
    [v.0, v.1, v.2]
}

fn embree_ray(ray: &LightRay) -> Ray {
    Ray { origin: to_array(ray.start), direction: to_array(ray.direction), t_near: 0.0, t_far: 1.0 }
}

/// Embree reports `(v0 - v1) x (v2 - v0)`; the filter expects `(v1 - v0) x (v2 - v0)`.
fn lane_hit(hit: &Hit) -> LaneHit {
    LaneHit {
        geometry: hit.geometry,
        primitive: hit.primitive,
        u: hit.u,
        v: hit.v,
        t: hit.t,
        geometric_normal: -Vec3::from(hit.normal),
    }
}

/// Aggregate mesh traversed by Embree, with the filter run from Embree's filter callbacks.
pub struct EmbreeAggregateMesh {
    store: GeometryStore,
    scene: embree4::Scene,
    // declared last so the scene is released before the device
    device: Device,
    prepared: bool,
}

impl EmbreeAggregateMesh {
    pub fn new(importance_volumes: Vec<AABB>) -> Result<EmbreeAggregateMesh, EmbreeError> {
        let device = Device::new()?;
        let scene = embree4::Scene::new(&device)?;
        Ok(EmbreeAggregateMesh { store: GeometryStore::new(importance_volumes), scene, device, prepared: false })
    }
}

impl AggregateMesh for EmbreeAggregateMesh {
    fn add_mesh(
        &mut self,
        mesh_id: MeshId,
        mesh: &MeshInstance,
        materials: &[Arc<Material>],
        mapping: Option<MappingId>,
    ) {
        assert!(!self.prepared, "mesh added after prepare_for_raytracing");
        let Some(geometry_index) = self.store.add_mesh(mesh_id, mesh, materials, mapping) else {
            return;
        };

        let geometry = self.store.geometry(geometry_index);
        let positions: Vec<[f32; 3]> = geometry.positions.iter().copied().map(to_array).collect();
        match TriangleGeometry::new(&self.device, &positions, &geometry.indices) {
            Ok(triangles) => self.scene.attach(triangles, geometry_index),
            Err(err) => error!(guid = %mesh.guid, %err, "embree rejected mesh geometry; it casts no shadows"),
        }
    }

    fn prepare_for_raytracing(&mut self) {
        self.prepared = true;
        if let Err(err) = self.scene.commit(&self.device) {
            error!(%err, "embree scene commit failed");
        }
        info!(
            geometries = self.store.geometries.len(),
            surface_area = self.store.surface_area,
            "embree aggregate mesh ready"
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
        let mut accepted = None;

        let hit = {
            let mut filter = |candidate: &FilterCandidate| {
                let hit = lane_hit(&candidate.hit);
                let accept = accept_hit(&self.store, &query, ray.direction, &hit, &mut transmission);
                if accept {
                    accepted = Some(hit);
                }
                accept
            };
            if find_closest {
                self.scene.intersect1(&embree_ray(ray), &mut filter).map(|hit| lane_hit(&hit))
            } else if self.scene.occluded1(&embree_ray(ray), &mut filter) {
                accepted
            } else {
                None
            }
        };

        let lane = RayLane { hit, ..RayLane::from_light_ray(ray) };
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
            context: shared_context(rays),
            find_closest,
            calculate_transmission,
            direct_shadowing: direct_shadowing_ray,
        };
        let mut packet = RayHit4::new(&rays.each_ref().map(embree_ray));
        let mut transmission: [TransmissionAccumulator; 4] = Default::default();
        let mut accepted: [Option<LaneHit>; 4] = [None; 4];

        {
            let mut filter = |candidate: &FilterCandidate| {
                let lane = candidate.lane;
                let hit = lane_hit(&candidate.hit);
                let accept = accept_hit(&self.store, &query, rays[lane].direction, &hit, &mut transmission[lane]);
                if accept {
                    accepted[lane] = Some(hit);
                }
                accept
            };
            if find_closest {
                self.scene.intersect4(&mut packet, &mut filter);
            } else {
                self.scene.occluded4(&mut packet, &mut filter);
            }
        }

        let mut batch = RayBatch::<4>::from_rays(rays);
        for lane in 0..4 {
            let hit = if find_closest {
                packet.hit(lane).map(|hit| lane_hit(&hit))
            } else if packet.is_occluded(lane) {
                accepted[lane]
            } else {
                None
            };
            let ray_lane = RayLane { hit, ..batch.get_lane(lane) };
            batch.set_lane(lane, &ray_lane);
        }

        std::array::from_fn(|lane| {
            self.store.resolve_lane(&rays[lane], &batch.get_lane(lane), find_closest, &transmission[lane])
        })
    }
}
