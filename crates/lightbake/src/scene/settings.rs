//! Tunables exported with the scene header.
//!
//! Every block is read field by field, in declaration order.

use std::io::Read;

use crate::error::ImportResult;
use crate::geometry::Vec3;

use super::stream::{SceneReader, StreamValue};
use super::Guid;

#[cfg(test)]
use super::testing::SceneWriter;

macro_rules! settings_block {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $($(#[$field_meta:meta])* pub $field:ident: $ty:ty = $default:expr,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name {
            $($(#[$field_meta])* pub $field: $ty,)*
        }

        impl Default for $name {
            fn default() -> Self {
                $name { $($field: $default,)* }
            }
        }

        impl StreamValue for $name {
            fn read<R: Read>(reader: &mut SceneReader<R>) -> ImportResult<Self> {
                Ok($name { $($field: <$ty as StreamValue>::read(reader)?,)* })
            }

            #[cfg(test)]
            fn write(&self, writer: &mut SceneWriter) {
                $(StreamValue::write(&self.$field, writer);)*
            }
        }
    };
}

settings_block! {
    pub struct GeneralSettings {
        pub num_indirect_lighting_bounces: i32 = 3,
        pub num_sky_lighting_bounces: i32 = 1,
        pub indirect_lighting_quality: f32 = 1.0,
        pub indirect_lighting_smoothness: f32 = 1.0,
        pub use_embree: bool = true,
        /// Cross checks the accelerated backend against the reference one.
        pub verify_embree: bool = false,
    }
}

settings_block! {
    pub struct SceneConstants {
        /// World units per engine unit; scales every distance setting.
        pub static_lighting_level_scale: f32 = 1.0,
        pub visibility_ray_offset_distance: f32 = 0.1,
        pub visibility_normal_offset_distance: f32 = 3.0,
        pub visibility_tangent_offset_distance_fraction: f32 = 0.01,
        pub smallest_texel_radius: f32 = 0.1,
        /// Cells per side of the directional light path ray grid.
        pub light_grid_size: i32 = 100,
    }
}

settings_block! {
    pub struct DynamicObjectSettings {
        pub visualize_volume_light_samples: bool = false,
        pub first_surface_sample_layer_height: f32 = 50.0,
        pub surface_light_sample_spacing: f32 = 300.0,
        pub surface_sample_layer_height_spacing: f32 = 250.0,
        pub num_surface_sample_layers: i32 = 2,
        pub detail_volume_sample_spacing: f32 = 300.0,
        pub volume_light_sample_spacing: f32 = 3000.0,
        pub max_volume_samples: i32 = 250_000,
    }
}

settings_block! {
    pub struct VolumetricLightmapSettings {
        pub brick_size: i32 = 4,
        pub max_refinement_levels: i32 = 3,
        pub voxelization_cell_expansion_for_surface_geometry: f32 = 0.1,
        pub target_num_volumetric_lightmap_tasks: i32 = 800,
    }
}

settings_block! {
    pub struct PrecomputedVisibilitySettings {
        pub cell_size: f32 = 200.0,
        pub num_cell_distribution_buckets: i32 = 800,
        pub play_area_height: f32 = 220.0,
        pub mesh_bounds_scale: f32 = 1.2,
    }
}

settings_block! {
    pub struct VolumeDistanceFieldSettings {
        pub voxel_size: f32 = 75.0,
        pub volume_max_distance: f32 = 900.0,
        pub num_voxel_distance_samples: i32 = 800,
        pub max_voxels: i32 = 3_992_160,
    }
}

settings_block! {
    pub struct MeshAreaLightSettings {
        pub visualize_mesh_area_light_primitives: bool = false,
        pub emissive_intensity_threshold: f32 = 0.01,
        pub mesh_area_light_grid_size: i32 = 100,
        pub mesh_area_light_simplify_normal_angle_threshold: f32 = 0.25,
        pub mesh_area_light_simplify_corner_distance_threshold: f32 = 0.5,
        pub mesh_area_light_simplify_mesh_bounding_radius_fraction_threshold: f32 = 0.1,
        pub mesh_area_light_generated_dynamic_light_surface_offset: f32 = 30.0,
    }
}

settings_block! {
    pub struct AmbientOcclusionSettings {
        pub use_ambient_occlusion: bool = false,
        pub generate_ambient_occlusion_material_mask: bool = false,
        pub direct_illumination_occlusion_fraction: f32 = 0.5,
        pub indirect_illumination_occlusion_fraction: f32 = 1.0,
        pub occlusion_exponent: f32 = 1.0,
        pub fully_occluded_samples_fraction: f32 = 1.0,
        pub max_occlusion_distance: f32 = 200.0,
    }
}

settings_block! {
    pub struct ShadowSettings {
        pub use_zero_area_lightmap_space_filtered_shadows: bool = true,
        pub max_transition_distance_world_space: f32 = 50.0,
        pub static_shadow_depth_map_transition_sample_distance_x: f32 = 100.0,
        pub static_shadow_depth_map_transition_sample_distance_y: f32 = 100.0,
        pub num_shadow_rays: i32 = 8,
        pub num_penumbra_shadow_rays: i32 = 8,
        pub num_bounce_shadow_rays: i32 = 1,
    }
}

settings_block! {
    pub struct ImportanceTracingSettings {
        pub num_hemisphere_samples: i32 = 16,
        pub num_adaptive_refinement_levels: i32 = 2,
        pub adaptive_brightness_threshold: f32 = 1.0,
        pub adaptive_first_bounce_photon_cone_angle: f32 = 4.0,
    }
}

settings_block! {
    pub struct PhotonMappingSettings {
        pub use_photon_mapping: bool = true,
        pub use_final_gathering: bool = true,
        pub emit_photons_outside_importance_volume: bool = false,
        /// Photons per million square units.
        pub direct_photon_density: f32 = 350.0,
        pub direct_irradiance_photon_density: f32 = 350.0,
        pub direct_photon_search_distance: f32 = 200.0,
        pub indirect_photon_path_density: f32 = 5.0,
        pub indirect_photon_density: f32 = 600.0,
        pub indirect_irradiance_photon_density: f32 = 300.0,
        pub indirect_photon_search_distance: f32 = 200.0,
        pub indirect_photon_emit_disk_radius: f32 = 200.0,
        /// Radians.
        pub indirect_photon_emit_cone_angle: f32 = 0.1745,
        pub max_importance_photon_search_distance: f32 = 2000.0,
        pub min_importance_photon_search_distance: f32 = 20.0,
        pub outside_importance_volume_density_scale: f32 = 0.0005,
    }
}

settings_block! {
    pub struct IrradianceCachingSettings {
        pub allow_irradiance_caching: bool = true,
        pub record_radius_scale: f32 = 1.0,
        pub max_record_radius: f32 = 1024.0,
        pub interpolation_max_angle: f32 = 20.0,
        pub point_behind_record_max_angle: f32 = 10.0,
    }
}

settings_block! {
    pub struct MaterialSettings {
        pub use_normal_maps_for_lighting: bool = true,
        pub emissive_size: i32 = 128,
        pub diffuse_size: i32 = 128,
        pub transmission_size: i32 = 64,
    }
}

settings_block! {
    /// Texel picked in the editor for step by step inspection.
    pub struct DebugInput {
        pub relay_solver_stats: bool = false,
        pub mapping_guid: Guid = Guid::default(),
        pub node_index: i32 = -1,
        pub position: Vec3 = Vec3::ZERO,
        pub local_x: i32 = 0,
        pub local_y: i32 = 0,
        pub mapping_size_x: i32 = 0,
        pub mapping_size_y: i32 = 0,
        pub camera_position: Vec3 = Vec3::ZERO,
    }
}
