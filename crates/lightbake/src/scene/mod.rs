//! Everything the exporter hands over for one bake, read once and then shared read only.

mod guid;
mod header;
pub mod import;
mod mapping;
mod mesh;
mod settings;
mod stream;

#[cfg(test)]
pub(crate) mod testing;

pub use guid::{Guid, MappingId, MeshId};
pub use header::{SceneCounts, SceneFileHeader, SCENE_COOKIE};
pub use import::load_scene_file;
pub use mapping::{Mapping, MappingKind};
pub use mesh::{MeshElement, MeshInstance, MeshKind, MeshLightingFlags, MeshLodInfo, MeshTriangle, MeshVertex};
pub use settings::{
    AmbientOcclusionSettings, DebugInput, DynamicObjectSettings, GeneralSettings, ImportanceTracingSettings,
    IrradianceCachingSettings, MaterialSettings, MeshAreaLightSettings, PhotonMappingSettings,
    PrecomputedVisibilitySettings, SceneConstants, ShadowSettings, VolumeDistanceFieldSettings,
    VolumetricLightmapSettings,
};
pub use stream::SceneReader;

use std::sync::Arc;

use crate::geometry::{BoxSphereBounds, Plane, Sphere, Vec3, AABB};
use crate::lights::{DirectionalLightSetup, Light, MeshAreaLight};
use crate::materials::Material;

/// Convex region bounded by planes; used for precomputed visibility cells.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisibilityVolume {
    pub bounds: AABB,
    pub planes: Vec<Plane>,
}

/// Region forcing primitives visible or invisible regardless of the computed visibility.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisibilityOverrideVolume {
    pub bounds: AABB,
    pub visibility_ids: Vec<i32>,
    pub invisibility_ids: Vec<i32>,
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub header: SceneFileHeader,

    pub instigator_user_name: String,
    pub persistent_level_name: String,

    pub importance_volumes: Vec<AABB>,
    /// Union of `importance_volumes`, or a zero box when there are none.
    pub importance_bounding_box: AABB,
    pub character_indirect_detail_volumes: Vec<AABB>,
    pub portals: Vec<Sphere>,
    pub visibility_bucket_guids: Vec<Guid>,
    pub visibility_volumes: Vec<VisibilityVolume>,
    pub visibility_override_volumes: Vec<VisibilityOverrideVolume>,
    pub camera_track_positions: Vec<Vec3>,
    pub volumetric_lightmap_task_guids: Vec<Guid>,

    pub materials: Vec<Arc<Material>>,
    /// Directional, point, spot and then sky lights, each in stream order.
    pub lights: Vec<Light>,
    pub meshes: Vec<MeshInstance>,
    /// BSP, static mesh texture, fluid surface and then landscape mappings.
    pub mappings: Vec<Mapping>,
    pub debug_mapping: Option<MappingId>,
}

impl Scene {
    pub fn importance_bounds(&self) -> BoxSphereBounds {
        BoxSphereBounds::from(self.importance_bounding_box)
    }

    /// Importance bounds shrunk or disabled so that they never reach outside the scene sphere.
    pub fn clamp_importance_to_scene(&self, scene_bounds: &BoxSphereBounds) -> BoxSphereBounds {
        let mut importance = self.importance_bounds();
        let distance_squared = (importance.origin - scene_bounds.origin).square_magnitude();
        let scene_radius = scene_bounds.sphere_radius;

        if distance_squared > scene_radius * scene_radius {
            // centre outside the scene
            importance.sphere_radius = 0.0;
        } else if distance_squared > (scene_radius - importance.sphere_radius).powi(2) {
            importance.sphere_radius = scene_radius - distance_squared.sqrt();
        } else if scene_radius <= importance.sphere_radius {
            importance.sphere_radius = 0.0;
        }
        importance
    }

    /// Longest distance any ray needs to travel: the importance or else the scene diameter.
    pub fn max_ray_distance(&self, scene_bounds: &BoxSphereBounds) -> f32 {
        let importance = self.clamp_importance_to_scene(scene_bounds);
        if importance.sphere_radius > 0.0 {
            2.0 * importance.sphere_radius
        } else {
            2.0 * scene_bounds.sphere_radius
        }
    }

    /// Derives the scene dependent light parameters. Runs once the aggregate mesh bounds are known.
    pub fn initialize_lights(&mut self, scene_bounds: BoxSphereBounds, mesh_area_lights: &mut [MeshAreaLight]) {
        let importance_bounds = self.clamp_importance_to_scene(&scene_bounds);
        let photon = &self.header.photon_mapping_settings;

        let directional_setup = DirectionalLightSetup {
            scene_bounds,
            importance_bounds,
            emit_photons_outside_importance_volume: photon.emit_photons_outside_importance_volume,
            indirect_disk_radius: photon.indirect_photon_emit_disk_radius,
            grid_size: self.header.scene_constants.light_grid_size.max(1) as usize,
            direct_photon_density: photon.direct_photon_density,
            outside_importance_volume_density: photon.direct_photon_density
                * photon.outside_importance_volume_density_scale,
        };
        let cone_angle = photon.indirect_photon_emit_cone_angle;

        for light in self.lights.iter_mut() {
            match light {
                Light::Directional(light) => light.initialize(&directional_setup),
                Light::Point(light) => light.initialize(cone_angle),
                Light::Spot(light) => light.initialize(cone_angle),
                Light::Sky(_) | Light::MeshArea(_) => {}
            }
        }

        let effective_bounds = if importance_bounds.sphere_radius > 0.0 { importance_bounds } else { scene_bounds };
        for light in mesh_area_lights.iter_mut() {
            light.initialize(cone_angle, effective_bounds);
        }
    }

    pub fn find_light_by_guid(&self, guid: Guid) -> Option<&Light> {
        self.lights.iter().find(|light| light.guid() == guid)
    }

    /// A zero guid is a valid key; deterministic lighting can override mapping guids.
    pub fn find_mapping_by_guid(&self, guid: Guid) -> Option<MappingId> {
        self.mappings
            .iter()
            .position(|mapping| mapping.guid == guid)
            .map(|index| MappingId(index as u32))
    }

    pub fn find_mesh_by_guid(&self, guid: Guid) -> Option<MeshId> {
        self.meshes.iter().position(|mesh| mesh.guid == guid).map(|index| MeshId(index as u32))
    }

    pub fn mesh(&self, id: MeshId) -> &MeshInstance {
        &self.meshes[id.0 as usize]
    }

    pub fn mapping(&self, id: MappingId) -> &Mapping {
        &self.mappings[id.0 as usize]
    }

    /// Open interval test against every importance volume, widened by `tolerance`.
    pub fn is_point_in_importance_volume(&self, position: Vec3, tolerance: f32) -> bool {
        self.importance_volumes.iter().any(|volume| {
            position.0 + tolerance > volume.minimum.0
                && position.0 - tolerance < volume.maximum.0
                && position.1 + tolerance > volume.minimum.1
                && position.1 - tolerance < volume.maximum.1
                && position.2 + tolerance > volume.minimum.2
                && position.2 - tolerance < volume.maximum.2
        })
    }

    pub fn is_box_in_importance_volume(&self, query: &AABB) -> bool {
        self.importance_volumes.iter().any(|volume| volume.intersects(query))
    }

    pub fn is_point_in_visibility_volume(&self, position: Vec3) -> bool {
        self.visibility_volumes
            .iter()
            .any(|volume| volume.planes.iter().all(|plane| plane.plane_dot(position) < 0.0))
    }

    pub fn does_box_intersect_visibility_volume(&self, bounds: &AABB) -> bool {
        self.visibility_volumes.iter().any(|volume| volume.bounds.intersects(bounds))
    }

    /// Union of the visibility volumes with X and Y rounded up to whole cells.
    pub fn visibility_volume_bounds(&self) -> AABB {
        if self.visibility_volumes.is_empty() {
            return AABB::zero();
        }

        let bounds = self
            .visibility_volumes
            .iter()
            .fold(AABB::empty(), |bounds, volume| AABB::surrounding_box(bounds, volume.bounds));
        let cell_size = self.header.precomputed_visibility_settings.cell_size;
        let mut double_extent = bounds.extent() * 2.0;
        double_extent.0 = double_extent.0 - double_extent.0 % cell_size + cell_size;
        double_extent.1 = double_extent.1 - double_extent.1 % cell_size + cell_size;
        AABB::new(bounds.minimum, bounds.minimum + double_extent)
    }
}
