//! In memory scene streams for tests.

use crate::color::LinearColor;
use crate::error::ImportResult;
use crate::geometry::{Matrix4x4, Plane, Vec2, Vec3, AABB};
use crate::materials::{Material, Texture};

use super::stream::StreamValue;
use super::{
    Guid, MappingKind, MeshKind, MeshVertex, Scene, SceneCounts, SceneFileHeader, SceneReader,
    VisibilityOverrideVolume, VisibilityVolume, SCENE_COOKIE,
};

/// Writes the little endian encoding [`SceneReader`] expects.
#[derive(Default)]
pub(crate) struct SceneWriter {
    bytes: Vec<u8>,
}

impl SceneWriter {
    pub fn new() -> Self {
        SceneWriter::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn write_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(value as u8);
    }

    pub fn write_count(&mut self, count: usize) {
        self.write_i32(count as i32);
    }

    pub fn write_guid(&mut self, guid: Guid) {
        for part in [guid.a, guid.b, guid.c, guid.d] {
            self.write_u32(part);
        }
    }

    pub fn write_vec2(&mut self, value: Vec2) {
        self.write_f32(value.0);
        self.write_f32(value.1);
    }

    pub fn write_vec3(&mut self, value: Vec3) {
        self.write_f32(value.0);
        self.write_f32(value.1);
        self.write_f32(value.2);
    }

    pub fn write_box(&mut self, value: &AABB) {
        self.write_vec3(value.minimum);
        self.write_vec3(value.maximum);
    }

    pub fn write_matrix(&mut self, value: &Matrix4x4) {
        for row in value.data {
            for element in row {
                self.write_f32(element);
            }
        }
    }

    pub fn write_plane(&mut self, value: &Plane) {
        self.write_vec3(value.normal);
        self.write_f32(value.w);
    }

    pub fn write_f16_color(&mut self, value: LinearColor) {
        for bits in value.to_f16_bits() {
            self.write_u16(bits);
        }
    }

    pub fn write_string(&mut self, value: &str) {
        let units: Vec<u16> = value.encode_utf16().collect();
        self.write_count(units.len());
        for unit in units {
            self.write_u16(unit);
        }
    }

    pub fn write_texture(&mut self, texture: &Texture) {
        self.write_count(texture.size_x);
        self.write_count(texture.size_y);
        for texel in texture.texels() {
            self.write_f16_color(*texel);
        }
    }

    pub fn write_header(&mut self, header: &SceneFileHeader) {
        self.write_u32(header.cookie);
        self.write_guid(header.format_version);
        self.write_guid(header.guid);

        header.general_settings.write(self);
        header.scene_constants.write(self);
        header.dynamic_object_settings.write(self);
        header.volumetric_lightmap_settings.write(self);
        header.precomputed_visibility_settings.write(self);
        header.volume_distance_field_settings.write(self);
        header.mesh_area_light_settings.write(self);
        header.ambient_occlusion_settings.write(self);
        header.shadow_settings.write(self);
        header.importance_tracing_settings.write(self);
        header.photon_mapping_settings.write(self);
        header.irradiance_caching_settings.write(self);
        header.material_settings.write(self);
        header.debug_input.write(self);

        self.write_bool(header.pad_mappings);
        self.write_bool(header.debug_padding);
        self.write_bool(header.only_calc_debug_texel_mappings);
        self.write_bool(header.color_borders_green);
        self.write_bool(header.use_random_colors);
        self.write_bool(header.color_by_execution_time);
        self.write_f32(header.execution_time_divisor);

        let counts = &header.counts;
        for count in [
            counts.importance_volumes,
            counts.character_indirect_detail_volumes,
            counts.portals,
            counts.precomputed_visibility_buckets,
            counts.volumetric_lightmap_tasks,
            counts.materials,
            counts.directional_lights,
            counts.point_lights,
            counts.spot_lights,
            counts.sky_lights,
            counts.static_mesh_instances,
            counts.fluid_surface_instances,
            counts.landscape_instances,
            counts.bsp_mappings,
            counts.static_mesh_texture_mappings,
            counts.fluid_surface_texture_mappings,
            counts.landscape_texture_mappings,
            counts.speed_tree_mappings,
        ] {
            self.write_count(count);
        }
    }

    pub fn write_material(&mut self, material: &Material) {
        self.write_guid(material.guid);
        self.write_u8(material.blend_mode.into());
        self.write_bool(material.two_sided);
        self.write_bool(material.cast_shadow_as_masked);
        self.write_f32(material.opacity_mask_clip_value);
        self.write_f32(material.emissive_boost);
        self.write_f32(material.diffuse_boost);
        self.write_texture(&material.transmission);
        self.write_texture(&material.opacity_mask);
    }

    pub fn write_light(&mut self, light: &LightRecord) {
        self.write_guid(light.guid);
        self.write_u32(light.flags);
        for channel in light.color {
            self.write_u8(channel);
        }
        self.write_f32(light.brightness);
        self.write_f32(light.indirect_lighting_scale);
        self.write_f32(light.indirect_lighting_saturation);
        self.write_f32(light.shadow_exponent);
        self.write_vec3(light.position);
        self.write_vec3(light.direction);
        self.write_f32(light.light_source_radius);
        self.write_f32(light.soft_source_radius);
        self.write_f32(light.light_source_length);
        self.write_count(light.light_profile.len());
        for sample in &light.light_profile {
            self.write_u8(*sample);
        }

        match &light.kind {
            LightRecordKind::Directional { light_source_angle } => self.write_f32(*light_source_angle),
            LightRecordKind::Point { radius, falloff_exponent, light_tangent } => {
                self.write_f32(*radius);
                self.write_f32(*falloff_exponent);
                self.write_vec3(*light_tangent);
            }
            LightRecordKind::Spot { radius, falloff_exponent, light_tangent, inner_cone_angle, outer_cone_angle } => {
                self.write_f32(*radius);
                self.write_f32(*falloff_exponent);
                self.write_vec3(*light_tangent);
                self.write_f32(*inner_cone_angle);
                self.write_f32(*outer_cone_angle);
            }
            LightRecordKind::Sky { use_filtered_cubemap, radiance, irradiance } => {
                self.write_bool(*use_filtered_cubemap);
                self.write_count(radiance.len());
                for texel in radiance {
                    self.write_f16_color(*texel);
                }
                for coefficient in irradiance {
                    self.write_f32(*coefficient);
                }
            }
        }
    }

    pub fn write_mesh(&mut self, mesh: &MeshRecord) {
        self.write_guid(mesh.guid);
        self.write_i32(mesh.mesh_index);
        self.write_u32(mesh.lod_indices);
        self.write_u32(mesh.hlod_range);
        self.write_u32(mesh.lighting_flags);
        self.write_matrix(&mesh.local_to_world);

        self.write_count(mesh.elements.len());
        for element in &mesh.elements {
            self.write_guid(element.material);
            self.write_bool(element.casts_shadow);
            self.write_bool(element.indirectly_shadowed_only);
        }

        self.write_count(mesh.vertices.len());
        for vertex in &mesh.vertices {
            self.write_vec3(vertex.position);
            self.write_vec3(vertex.normal);
            self.write_vec2(vertex.uv);
            self.write_vec2(vertex.lightmap_uv);
        }

        self.write_count(mesh.triangles.len());
        for (indices, element) in &mesh.triangles {
            for index in indices {
                self.write_u32(*index);
            }
            self.write_i32(*element);
        }
    }

    pub fn write_mapping(&mut self, mapping: &MappingRecord) {
        self.write_guid(mapping.guid);
        self.write_guid(mapping.mesh_guid);
        self.write_i32(mapping.size_x);
        self.write_i32(mapping.size_y);
        self.write_i32(mapping.lightmap_uv_index);
        self.write_bool(mapping.bilinear_filter);
    }
}

#[derive(Clone, Debug)]
pub(crate) enum LightRecordKind {
    Directional { light_source_angle: f32 },
    Point { radius: f32, falloff_exponent: f32, light_tangent: Vec3 },
    Spot { radius: f32, falloff_exponent: f32, light_tangent: Vec3, inner_cone_angle: f32, outer_cone_angle: f32 },
    Sky { use_filtered_cubemap: bool, radiance: Vec<LinearColor>, irradiance: [f32; 27] },
}

#[derive(Clone, Debug)]
pub(crate) struct LightRecord {
    pub guid: Guid,
    pub flags: u32,
    /// sRGB bytes.
    pub color: [u8; 4],
    pub brightness: f32,
    pub indirect_lighting_scale: f32,
    pub indirect_lighting_saturation: f32,
    pub shadow_exponent: f32,
    pub position: Vec3,
    pub direction: Vec3,
    pub light_source_radius: f32,
    pub soft_source_radius: f32,
    pub light_source_length: f32,
    pub light_profile: Vec<u8>,
    pub kind: LightRecordKind,
}

impl LightRecord {
    pub fn new(guid: Guid, kind: LightRecordKind) -> LightRecord {
        LightRecord {
            guid,
            flags: 1,
            color: [255, 255, 255, 255],
            brightness: 1.0,
            indirect_lighting_scale: 1.0,
            indirect_lighting_saturation: 1.0,
            shadow_exponent: 2.0,
            position: Vec3::ZERO,
            direction: Vec3(0.0, 0.0, -1.0),
            light_source_radius: 0.0,
            soft_source_radius: 0.0,
            light_source_length: 0.0,
            light_profile: Vec::new(),
            kind,
        }
    }

    fn order(&self) -> usize {
        match self.kind {
            LightRecordKind::Directional { .. } => 0,
            LightRecordKind::Point { .. } => 1,
            LightRecordKind::Spot { .. } => 2,
            LightRecordKind::Sky { .. } => 3,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ElementRecord {
    pub material: Guid,
    pub casts_shadow: bool,
    pub indirectly_shadowed_only: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct MeshRecord {
    pub guid: Guid,
    pub kind: MeshKind,
    pub mesh_index: i32,
    pub lod_indices: u32,
    pub hlod_range: u32,
    pub lighting_flags: u32,
    pub local_to_world: Matrix4x4,
    pub elements: Vec<ElementRecord>,
    pub vertices: Vec<MeshVertex>,
    pub triangles: Vec<([u32; 3], i32)>,
}

impl MeshRecord {
    /// A shadow casting mesh of one element using `material`, placed at the origin.
    pub fn new(guid: Guid, material: Guid, vertices: Vec<MeshVertex>, triangles: Vec<[u32; 3]>) -> MeshRecord {
        MeshRecord {
            guid,
            kind: MeshKind::StaticMesh,
            mesh_index: 0,
            lod_indices: 0,
            hlod_range: 0,
            lighting_flags: 1,
            local_to_world: Matrix4x4::identity(),
            elements: vec![ElementRecord { material, casts_shadow: true, indirectly_shadowed_only: false }],
            vertices,
            triangles: triangles.into_iter().map(|indices| (indices, 0)).collect(),
        }
    }

    fn order(&self) -> usize {
        match self.kind {
            MeshKind::StaticMesh => 0,
            MeshKind::FluidSurface => 1,
            MeshKind::Landscape => 2,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct MappingRecord {
    pub guid: Guid,
    pub kind: MappingKind,
    pub mesh_guid: Guid,
    pub size_x: i32,
    pub size_y: i32,
    pub lightmap_uv_index: i32,
    pub bilinear_filter: bool,
}

impl MappingRecord {
    pub fn new(guid: Guid, kind: MappingKind, mesh_guid: Guid, size_x: i32, size_y: i32) -> MappingRecord {
        MappingRecord { guid, kind, mesh_guid, size_x, size_y, lightmap_uv_index: 1, bilinear_filter: true }
    }

    fn order(&self) -> usize {
        match self.kind {
            MappingKind::Bsp => 0,
            MappingKind::StaticMeshTexture => 1,
            MappingKind::FluidSurface => 2,
            MappingKind::Landscape => 3,
        }
    }
}

/// A whole scene, serialised with counts derived from its contents.
///
/// Records are written grouped by kind, in stream order, whatever order they were pushed in.
#[derive(Clone, Debug)]
pub(crate) struct SceneFixture {
    pub header: SceneFileHeader,
    pub instigator_user_name: String,
    pub persistent_level_name: String,
    pub importance_volumes: Vec<AABB>,
    pub character_indirect_detail_volumes: Vec<AABB>,
    pub portals: Vec<Matrix4x4>,
    pub visibility_bucket_guids: Vec<Guid>,
    pub visibility_volumes: Vec<VisibilityVolume>,
    pub visibility_override_volumes: Vec<VisibilityOverrideVolume>,
    pub camera_track_positions: Vec<Vec3>,
    pub volumetric_lightmap_task_guids: Vec<Guid>,
    pub materials: Vec<Material>,
    pub lights: Vec<LightRecord>,
    pub meshes: Vec<MeshRecord>,
    pub mappings: Vec<MappingRecord>,
}

impl SceneFixture {
    pub fn new() -> SceneFixture {
        SceneFixture {
            header: SceneFileHeader { cookie: SCENE_COOKIE, ..SceneFileHeader::default() },
            instigator_user_name: "builder".to_string(),
            persistent_level_name: "Level".to_string(),
            importance_volumes: Vec::new(),
            character_indirect_detail_volumes: Vec::new(),
            portals: Vec::new(),
            visibility_bucket_guids: Vec::new(),
            visibility_volumes: Vec::new(),
            visibility_override_volumes: Vec::new(),
            camera_track_positions: Vec::new(),
            volumetric_lightmap_task_guids: Vec::new(),
            materials: Vec::new(),
            lights: Vec::new(),
            meshes: Vec::new(),
            mappings: Vec::new(),
        }
    }

    /// The header as written, with counts filled in.
    pub fn counted_header(&self) -> SceneFileHeader {
        let count_lights = |order| self.lights.iter().filter(|light| light.order() == order).count();
        let count_meshes = |order| self.meshes.iter().filter(|mesh| mesh.order() == order).count();
        let count_mappings = |order| self.mappings.iter().filter(|mapping| mapping.order() == order).count();

        let mut header = self.header.clone();
        header.counts = SceneCounts {
            importance_volumes: self.importance_volumes.len(),
            character_indirect_detail_volumes: self.character_indirect_detail_volumes.len(),
            portals: self.portals.len(),
            precomputed_visibility_buckets: self.visibility_bucket_guids.len(),
            volumetric_lightmap_tasks: self.volumetric_lightmap_task_guids.len(),
            materials: self.materials.len(),
            directional_lights: count_lights(0),
            point_lights: count_lights(1),
            spot_lights: count_lights(2),
            sky_lights: count_lights(3),
            static_mesh_instances: count_meshes(0),
            fluid_surface_instances: count_meshes(1),
            landscape_instances: count_meshes(2),
            bsp_mappings: count_mappings(0),
            static_mesh_texture_mappings: count_mappings(1),
            fluid_surface_texture_mappings: count_mappings(2),
            landscape_texture_mappings: count_mappings(3),
            speed_tree_mappings: self.header.counts.speed_tree_mappings,
        };
        header
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = SceneWriter::new();
        writer.write_header(&self.counted_header());

        writer.write_string(&self.instigator_user_name);
        writer.write_string(&self.persistent_level_name);
        for volume in &self.importance_volumes {
            writer.write_box(volume);
        }
        for volume in &self.character_indirect_detail_volumes {
            writer.write_box(volume);
        }
        for portal in &self.portals {
            writer.write_matrix(portal);
        }
        for guid in &self.visibility_bucket_guids {
            writer.write_guid(*guid);
        }

        writer.write_count(self.visibility_volumes.len());
        for volume in &self.visibility_volumes {
            writer.write_box(&volume.bounds);
            writer.write_count(volume.planes.len());
            for plane in &volume.planes {
                writer.write_plane(plane);
            }
        }

        writer.write_count(self.visibility_override_volumes.len());
        for volume in &self.visibility_override_volumes {
            writer.write_box(&volume.bounds);
            for ids in [&volume.visibility_ids, &volume.invisibility_ids] {
                writer.write_count(ids.len());
                for id in ids {
                    writer.write_i32(*id);
                }
            }
        }

        writer.write_count(self.camera_track_positions.len());
        for position in &self.camera_track_positions {
            writer.write_vec3(*position);
        }
        for guid in &self.volumetric_lightmap_task_guids {
            writer.write_guid(*guid);
        }

        for material in &self.materials {
            writer.write_material(material);
        }
        for order in 0..4 {
            for light in self.lights.iter().filter(|light| light.order() == order) {
                writer.write_light(light);
            }
        }
        for order in 0..3 {
            for mesh in self.meshes.iter().filter(|mesh| mesh.order() == order) {
                writer.write_mesh(mesh);
            }
        }
        for order in 0..4 {
            for mapping in self.mappings.iter().filter(|mapping| mapping.order() == order) {
                writer.write_mapping(mapping);
            }
        }
        writer.into_bytes()
    }

    pub fn import(&self) -> ImportResult<Scene> {
        let bytes = self.to_bytes();
        Scene::import(&mut SceneReader::new(bytes.as_slice()))
    }
}

pub(crate) fn vertex(position: Vec3) -> MeshVertex {
    MeshVertex {
        position,
        normal: Vec3::UP,
        uv: Vec2(position.0, position.1),
        lightmap_uv: Vec2(position.0, position.1),
    }
}
