use std::io::Read;

use crate::error::{ImportError, ImportResult};

use super::settings::{
    AmbientOcclusionSettings, DebugInput, DynamicObjectSettings, GeneralSettings, ImportanceTracingSettings,
    IrradianceCachingSettings, MaterialSettings, MeshAreaLightSettings, PhotonMappingSettings,
    PrecomputedVisibilitySettings, SceneConstants, ShadowSettings, VolumeDistanceFieldSettings,
    VolumetricLightmapSettings,
};
use super::stream::{SceneReader, StreamValue};
use super::Guid;

/// 'SCEN'
pub const SCENE_COOKIE: u32 = 0x4E45_4353;

/// Number of records of every kind in the scene body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneCounts {
    pub importance_volumes: usize,
    pub character_indirect_detail_volumes: usize,
    pub portals: usize,
    pub precomputed_visibility_buckets: usize,
    pub volumetric_lightmap_tasks: usize,
    pub materials: usize,
    pub directional_lights: usize,
    pub point_lights: usize,
    pub spot_lights: usize,
    pub sky_lights: usize,
    pub static_mesh_instances: usize,
    pub fluid_surface_instances: usize,
    pub landscape_instances: usize,
    pub bsp_mappings: usize,
    pub static_mesh_texture_mappings: usize,
    pub fluid_surface_texture_mappings: usize,
    pub landscape_texture_mappings: usize,
    pub speed_tree_mappings: usize,
}

/// Fixed part at the start of every scene stream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneFileHeader {
    pub cookie: u32,
    pub format_version: Guid,
    pub guid: Guid,

    pub general_settings: GeneralSettings,
    pub scene_constants: SceneConstants,
    pub dynamic_object_settings: DynamicObjectSettings,
    pub volumetric_lightmap_settings: VolumetricLightmapSettings,
    pub precomputed_visibility_settings: PrecomputedVisibilitySettings,
    pub volume_distance_field_settings: VolumeDistanceFieldSettings,
    pub mesh_area_light_settings: MeshAreaLightSettings,
    pub ambient_occlusion_settings: AmbientOcclusionSettings,
    pub shadow_settings: ShadowSettings,
    pub importance_tracing_settings: ImportanceTracingSettings,
    pub photon_mapping_settings: PhotonMappingSettings,
    pub irradiance_caching_settings: IrradianceCachingSettings,
    pub material_settings: MaterialSettings,
    pub debug_input: DebugInput,

    /// Shrink mappings by one texel on each side and pad them afterwards.
    pub pad_mappings: bool,
    pub debug_padding: bool,
    pub only_calc_debug_texel_mappings: bool,
    pub color_borders_green: bool,
    pub use_random_colors: bool,
    pub color_by_execution_time: bool,
    pub execution_time_divisor: f32,

    pub counts: SceneCounts,
}

impl SceneFileHeader {
    pub fn read<R: Read>(reader: &mut SceneReader<R>) -> ImportResult<SceneFileHeader> {
        let cookie = reader.read_u32()?;
        if cookie != SCENE_COOKIE {
            return Err(ImportError::BadCookie(cookie));
        }

        Ok(SceneFileHeader {
            cookie,
            format_version: reader.read_guid()?,
            guid: reader.read_guid()?,
            general_settings: StreamValue::read(reader)?,
            scene_constants: StreamValue::read(reader)?,
            dynamic_object_settings: StreamValue::read(reader)?,
            volumetric_lightmap_settings: StreamValue::read(reader)?,
            precomputed_visibility_settings: StreamValue::read(reader)?,
            volume_distance_field_settings: StreamValue::read(reader)?,
            mesh_area_light_settings: StreamValue::read(reader)?,
            ambient_occlusion_settings: StreamValue::read(reader)?,
            shadow_settings: StreamValue::read(reader)?,
            importance_tracing_settings: StreamValue::read(reader)?,
            photon_mapping_settings: StreamValue::read(reader)?,
            irradiance_caching_settings: StreamValue::read(reader)?,
            material_settings: StreamValue::read(reader)?,
            debug_input: StreamValue::read(reader)?,
            pad_mappings: reader.read_bool()?,
            debug_padding: reader.read_bool()?,
            only_calc_debug_texel_mappings: reader.read_bool()?,
            color_borders_green: reader.read_bool()?,
            use_random_colors: reader.read_bool()?,
            color_by_execution_time: reader.read_bool()?,
            execution_time_divisor: reader.read_f32()?,
            counts: SceneCounts {
                importance_volumes: reader.read_count("importance volume")?,
                character_indirect_detail_volumes: reader.read_count("character indirect detail volume")?,
                portals: reader.read_count("portal")?,
                precomputed_visibility_buckets: reader.read_count("precomputed visibility bucket")?,
                volumetric_lightmap_tasks: reader.read_count("volumetric lightmap task")?,
                materials: reader.read_count("material")?,
                directional_lights: reader.read_count("directional light")?,
                point_lights: reader.read_count("point light")?,
                spot_lights: reader.read_count("spot light")?,
                sky_lights: reader.read_count("sky light")?,
                static_mesh_instances: reader.read_count("static mesh instance")?,
                fluid_surface_instances: reader.read_count("fluid surface instance")?,
                landscape_instances: reader.read_count("landscape instance")?,
                bsp_mappings: reader.read_count("BSP mapping")?,
                static_mesh_texture_mappings: reader.read_count("static mesh texture mapping")?,
                fluid_surface_texture_mappings: reader.read_count("fluid surface texture mapping")?,
                landscape_texture_mappings: reader.read_count("landscape texture mapping")?,
                speed_tree_mappings: reader.read_count("speed tree mapping")?,
            },
        })
    }

    /// Scales every distance setting by the level scale.
    ///
    /// Photon densities and search distances stay unscaled; photon mapping does not survive rescaling.
    pub fn apply_static_lighting_scale(&mut self) {
        let scale = self.scene_constants.static_lighting_level_scale;

        let constants = &mut self.scene_constants;
        constants.visibility_ray_offset_distance *= scale;
        constants.visibility_normal_offset_distance *= scale;
        constants.smallest_texel_radius *= scale;

        let mesh_area_light = &mut self.mesh_area_light_settings;
        mesh_area_light.mesh_area_light_simplify_corner_distance_threshold *= scale;
        mesh_area_light.mesh_area_light_generated_dynamic_light_surface_offset *= scale;

        let dynamic_object = &mut self.dynamic_object_settings;
        dynamic_object.first_surface_sample_layer_height *= scale;
        dynamic_object.surface_light_sample_spacing *= scale;
        dynamic_object.surface_sample_layer_height_spacing *= scale;
        dynamic_object.detail_volume_sample_spacing *= scale;
        dynamic_object.volume_light_sample_spacing *= scale;

        self.volume_distance_field_settings.voxel_size *= scale;
        self.volume_distance_field_settings.volume_max_distance *= scale;

        let shadow = &mut self.shadow_settings;
        shadow.max_transition_distance_world_space *= scale;
        shadow.static_shadow_depth_map_transition_sample_distance_x *= scale;
        shadow.static_shadow_depth_map_transition_sample_distance_y *= scale;

        self.irradiance_caching_settings.record_radius_scale *= scale;
        self.irradiance_caching_settings.max_record_radius *= scale;
    }
}
