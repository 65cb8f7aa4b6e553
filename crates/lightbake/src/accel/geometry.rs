use std::collections::HashMap;
use std::sync::Arc;

use bitflags::bitflags;
use tracing::{debug, warn};

use crate::color::LinearColor;
use crate::geometry::{triangle_area, Vec2, Vec3, AABB};
use crate::materials::Material;
use crate::scene::{MappingId, MeshId, MeshInstance, MeshLightingFlags, MeshLodInfo};

use super::ray::{LaneHit, LightRay, LightRayIntersection, RayLane};
use super::transmission::TransmissionAccumulator;

/// Triangles below this area never cast shadows.
pub const TRIANGLE_AREA_THRESHOLD: f32 = 1e-8;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TriangleFlags: u8 {
        const CAST_SHADOW = 1 << 0;
        /// Opaque blend mode.
        const STATIC_AND_OPAQUE = 1 << 1;
        const TWO_SIDED = 1 << 2;
        const TRANSLUCENT = 1 << 3;
        const INDIRECTLY_SHADOWED_ONLY = 1 << 4;
        const MASKED = 1 << 5;
        const CAST_SHADOW_AS_MASKED = 1 << 6;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TriangleDescriptor {
    pub element: u32,
    pub flags: TriangleFlags,
}

impl TriangleDescriptor {
    pub fn new(element: u32, material: &Material, casts_shadow: bool, indirectly_shadowed_only: bool) -> Self {
        let mut flags = TriangleFlags::empty();
        flags.set(TriangleFlags::CAST_SHADOW, casts_shadow);
        flags.set(TriangleFlags::STATIC_AND_OPAQUE, !material.is_masked() && !material.is_translucent());
        flags.set(TriangleFlags::TWO_SIDED, material.two_sided);
        flags.set(TriangleFlags::TRANSLUCENT, material.is_translucent());
        flags.set(TriangleFlags::INDIRECTLY_SHADOWED_ONLY, indirectly_shadowed_only);
        flags.set(TriangleFlags::MASKED, material.is_masked());
        flags.set(TriangleFlags::CAST_SHADOW_AS_MASKED, material.cast_shadow_as_masked);
        TriangleDescriptor { element, flags }
    }
}

/// Per mesh data the filter needs about the mesh a ray comes from or hits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshInfo {
    pub mesh_id: MeshId,
    pub mesh_index: i32,
    pub lod: MeshLodInfo,
    pub lighting_flags: MeshLightingFlags,
}

impl MeshInfo {
    pub fn from_mesh(mesh_id: MeshId, mesh: &MeshInstance) -> MeshInfo {
        MeshInfo { mesh_id, mesh_index: mesh.mesh_index, lod: mesh.lod, lighting_flags: mesh.lighting_flags }
    }
}

/// One shadow casting mesh as handed to the traversal.
///
/// Triangles that do not cast shadows keep their slot with all three indices equal, so the
/// traversal's primitive index is always the mesh triangle index.
#[derive(Clone, Debug)]
pub struct MeshGeometry {
    pub info: MeshInfo,
    pub mapping: Option<MappingId>,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub lightmap_uvs: Vec<Vec2>,
    pub indices: Vec<[u32; 3]>,
    pub descriptors: Vec<TriangleDescriptor>,
    /// Material of each mesh element.
    pub materials: Vec<Arc<Material>>,
}

impl MeshGeometry {
    pub fn triangle(&self, primitive: u32) -> [Vec3; 3] {
        self.indices[primitive as usize].map(|index| self.positions[index as usize])
    }

    pub fn material(&self, primitive: u32) -> &Material {
        &self.materials[self.descriptors[primitive as usize].element as usize]
    }

    pub fn interpolate_uv(&self, primitive: u32, weights: [f32; 3]) -> Vec2 {
        interpolate(&self.uvs, self.indices[primitive as usize], weights)
    }

    pub fn interpolate_lightmap_uv(&self, primitive: u32, weights: [f32; 3]) -> Vec2 {
        interpolate(&self.lightmap_uvs, self.indices[primitive as usize], weights)
    }

    pub fn interpolate_normal(&self, primitive: u32, weights: [f32; 3]) -> Vec3 {
        let [i0, i1, i2] = self.indices[primitive as usize].map(|index| index as usize);
        Vec3::safe_normalized(
            self.normals[i0] * weights[0] + self.normals[i1] * weights[1] + self.normals[i2] * weights[2],
        )
    }
}

fn interpolate(values: &[Vec2], indices: [u32; 3], weights: [f32; 3]) -> Vec2 {
    let [i0, i1, i2] = indices.map(|index| index as usize);
    values[i0] * weights[0] + values[i1] * weights[1] + values[i2] * weights[2]
}

/// Barycentric weights (1 - u - v, u, v) of a hit.
pub fn barycentric_weights(u: f32, v: f32) -> [f32; 3] {
    [1.0 - u - v, u, v]
}

/// Geometry and bookkeeping shared by every aggregate mesh backend.
#[derive(Clone, Debug, Default)]
pub struct GeometryStore {
    importance_volumes: Vec<AABB>,
    pub geometries: Vec<MeshGeometry>,
    pub mesh_infos: HashMap<MeshId, MeshInfo>,
    pub bounds: AABB,
    pub surface_area: f32,
    pub surface_area_within_importance_volume: f32,
}

impl GeometryStore {
    pub fn new(importance_volumes: Vec<AABB>) -> GeometryStore {
        GeometryStore { importance_volumes, bounds: AABB::empty(), ..GeometryStore::default() }
    }

    /// Registers the mesh for filtering and, when it casts shadows, stores its triangles.
    ///
    /// Returns the geometry index of the stored mesh.
    pub fn add_mesh(
        &mut self,
        mesh_id: MeshId,
        mesh: &MeshInstance,
        materials: &[Arc<Material>],
        mapping: Option<MappingId>,
    ) -> Option<u32> {
        let info = MeshInfo::from_mesh(mesh_id, mesh);
        self.mesh_infos.insert(mesh_id, info);

        if !mesh.casts_shadow() {
            return None;
        }

        let element_materials: Vec<Arc<Material>> = mesh
            .elements
            .iter()
            .map(|element| {
                assert!(element.material < materials.len(), "mesh element material out of range");
                Arc::clone(&materials[element.material])
            })
            .collect();

        let mut indices = Vec::with_capacity(mesh.triangles.len());
        let mut descriptors = Vec::with_capacity(mesh.triangles.len());
        let mut casting_triangles = 0;

        for (triangle_index, triangle) in mesh.triangles.iter().enumerate() {
            let element = &mesh.elements[triangle.element];
            let [p0, p1, p2] = triangle.indices.map(|index| mesh.vertices[index as usize].position);
            let area = triangle_area(p0, p1, p2);

            let mut casts_shadow = element.casts_shadow;
            if casts_shadow && area < TRIANGLE_AREA_THRESHOLD {
                debug!(guid = %mesh.guid, triangle_index, area, "zero area triangle does not cast shadows");
                casts_shadow = false;
            }

            descriptors.push(TriangleDescriptor::new(
                triangle.element as u32,
                &element_materials[triangle.element],
                casts_shadow,
                element.indirectly_shadowed_only,
            ));

            if casts_shadow {
                casting_triangles += 1;
                indices.push(triangle.indices);

                let triangle_bounds = AABB::from_points(&[p0, p1, p2]);
                self.bounds = AABB::surrounding_box(self.bounds, triangle_bounds);
                self.surface_area += area;
                if self.importance_volumes.is_empty()
                    || self.importance_volumes.iter().any(|volume| volume.intersects(&triangle_bounds))
                {
                    self.surface_area_within_importance_volume += area;
                }
            } else {
                let first = triangle.indices[0];
                indices.push([first; 3]);
            }
        }

        if casting_triangles == 0 {
            warn!(guid = %mesh.guid, "mesh casts shadows but has no shadow casting triangles");
        }

        let geometry_index = self.geometries.len() as u32;
        self.geometries.push(MeshGeometry {
            info,
            mapping,
            positions: mesh.vertices.iter().map(|vertex| vertex.position).collect(),
            normals: mesh.vertices.iter().map(|vertex| vertex.normal).collect(),
            uvs: mesh.vertices.iter().map(|vertex| vertex.uv).collect(),
            lightmap_uvs: mesh.vertices.iter().map(|vertex| vertex.lightmap_uv).collect(),
            indices,
            descriptors,
            materials: element_materials,
        });
        Some(geometry_index)
    }

    pub fn geometry(&self, geometry: u32) -> &MeshGeometry {
        &self.geometries[geometry as usize]
    }

    pub fn mesh_info(&self, mesh: Option<MeshId>) -> Option<&MeshInfo> {
        mesh.and_then(|mesh| self.mesh_infos.get(&mesh))
    }

    /// Builds the reported intersection for an accepted hit.
    pub fn finish_hit(
        &self,
        ray: &LightRay,
        hit: &LaneHit,
        find_closest: bool,
        transmission: LinearColor,
    ) -> LightRayIntersection {
        let geometry = self.geometry(hit.geometry);
        let weights = barycentric_weights(hit.u, hit.v);

        let mut geometric_normal = Vec3::safe_normalized(hit.geometric_normal);
        if Vec3::dot(geometric_normal, ray.direction) > 0.0 {
            geometric_normal = -geometric_normal;
        }

        let (uv, lightmap_uv) = if find_closest {
            (geometry.interpolate_uv(hit.primitive, weights), geometry.interpolate_lightmap_uv(hit.primitive, weights))
        } else {
            (Vec2::default(), Vec2::default())
        };

        LightRayIntersection {
            hit: true,
            position: ray.at(hit.t),
            geometric_normal,
            shading_normal: geometry.interpolate_normal(hit.primitive, weights),
            uv,
            lightmap_uv,
            element_index: geometry.descriptors[hit.primitive as usize].element as usize,
            mesh: Some(geometry.info.mesh_id),
            mapping: geometry.mapping,
            t: hit.t,
            transmission,
        }
    }

    /// Turns a traversed lane into the reported result.
    pub fn resolve_lane(
        &self,
        ray: &LightRay,
        lane: &RayLane,
        find_closest: bool,
        transmission: &TransmissionAccumulator,
    ) -> LightRayIntersection {
        match &lane.hit {
            Some(hit) => self.finish_hit(ray, hit, find_closest, transmission.resolve_before(LinearColor::WHITE, hit.t)),
            None => LightRayIntersection::miss(transmission.resolve(LinearColor::WHITE)),
        }
    }
}
