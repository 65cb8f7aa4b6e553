//! Visibility queries against all shadow casting geometry of a scene.

#[cfg(feature = "embree")]
mod embree;
mod filter;
mod geometry;
mod ray;
mod reference;
mod transmission;


#[cfg(feature = "embree")]
pub use embree::EmbreeAggregateMesh;
pub use filter::{accept_hit, FilterQuery};
pub use geometry::{
    barycentric_weights, GeometryStore, MeshGeometry, MeshInfo, TriangleDescriptor, TriangleFlags,
    TRIANGLE_AREA_THRESHOLD,
};
pub use ray::{LaneHit, LightRay, LightRayIntersection, RayBatch, RayContext, RayLane, TraceFlags};
pub use reference::DefaultAggregateMesh;
pub use transmission::TransmissionAccumulator;

use std::sync::Arc;

use crate::geometry::AABB;
use crate::materials::Material;
use crate::scene::{MappingId, MeshId, MeshInstance, Scene};

/// Built once from the scene, then queried read only from any number of threads.
pub trait AggregateMesh: Send + Sync {
    /// Registers `mesh` for LOD and self shadow filtering and adds its triangles when it
    /// casts shadows. `materials` is indexed by the mesh elements.
    fn add_mesh(&mut self, mesh_id: MeshId, mesh: &MeshInstance, materials: &[Arc<Material>], mapping: Option<MappingId>);

    /// Freezes the geometry. No meshes may be added afterwards.
    fn prepare_for_raytracing(&mut self);

    fn store(&self) -> &GeometryStore;

    /// Bounds of every shadow casting triangle.
    fn bounds(&self) -> AABB {
        self.store().bounds
    }

    fn surface_area(&self) -> f32 {
        self.store().surface_area
    }

    /// Area of the shadow casting triangles whose bounds touch an importance volume.
    fn surface_area_within_importance_volume(&self) -> f32 {
        self.store().surface_area_within_importance_volume
    }

    /// Traces `ray` from its start to its end.
    ///
    /// Without `find_closest` the first accepted hit ends the query and only the element index
    /// and position are meaningful.
    fn intersect_light_ray(
        &self,
        ray: &LightRay,
        find_closest: bool,
        calculate_transmission: bool,
        direct_shadowing_ray: bool,
    ) -> LightRayIntersection;

    /// Four independent queries. The rays must share their [`RayContext`].
    fn intersect_light_rays4(
        &self,
        rays: &[LightRay; 4],
        find_closest: bool,
        calculate_transmission: bool,
        direct_shadowing_ray: bool,
    ) -> [LightRayIntersection; 4];
}

/// Context common to a batch of rays. Panics if the rays disagree.
pub(crate) fn shared_context(rays: &[LightRay]) -> RayContext {
    let context = rays[0].context();
    assert!(
        rays.iter().all(|ray| ray.context() == context),
        "rays traced together must share shadow mesh, mapping mesh and trace flags"
    );
    context
}

/// Adds every mesh of `scene`, each paired with the first mapping that lights it.
pub fn add_scene_meshes(aggregate: &mut dyn AggregateMesh, scene: &Scene) {
    for (index, mesh) in scene.meshes.iter().enumerate() {
        let mesh_id = MeshId(index as u32);
        let mapping = scene
            .mappings
            .iter()
            .position(|mapping| mapping.mesh == mesh_id)
            .map(|index| MappingId(index as u32));
        aggregate.add_mesh(mesh_id, mesh, &scene.materials, mapping);
    }
}
