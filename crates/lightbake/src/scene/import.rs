//! Decoding of the exported scene stream.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::color::{SHVector3, SHVectorRGB3};
use crate::error::{ImportError, ImportResult};
use crate::geometry::{Sphere, Vec2, AABB};
use crate::lights::{DirectionalLight, Light, LightData, LightFlags, PointLight, SkyLight, SpotLight};
use crate::materials::{BlendMode, Material, Texture};

use super::{
    Guid, Mapping, MappingId, MappingKind, MeshElement, MeshId, MeshInstance, MeshKind, MeshLightingFlags,
    MeshLodInfo, MeshTriangle, MeshVertex, Scene, SceneFileHeader, SceneReader, VisibilityOverrideVolume,
    VisibilityVolume,
};

/// Reads a scene file from disk.
pub fn load_scene_file(path: impl AsRef<Path>) -> anyhow::Result<Scene> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open scene file {}", path.display()))?;
    let mut reader = SceneReader::new(BufReader::new(file));
    let scene = Scene::import(&mut reader).with_context(|| format!("failed to import scene {}", path.display()))?;
    Ok(scene)
}

impl Scene {
    /// Reads the header and then the body, in stream order.
    ///
    /// Header fields are copied out one by one; every body array starts empty and is filled only
    /// from the data following the header.
    pub fn import<R: Read>(reader: &mut SceneReader<R>) -> ImportResult<Scene> {
        let header = SceneFileHeader::read(reader)?;
        let mut scene = Scene { header, ..Scene::default() };
        scene.header.apply_static_lighting_scale();

        scene.read_volumes(reader)?;
        scene.read_materials(reader)?;
        scene.read_lights(reader)?;
        scene.read_meshes(reader)?;
        scene.read_mappings(reader)?;

        if scene.header.pad_mappings {
            for mapping in scene.mappings.iter_mut() {
                mapping.apply_padding();
            }
        }
        scene.locate_debug_mapping();

        info!(
            lights = scene.lights.len(),
            meshes = scene.meshes.len(),
            mappings = scene.mappings.len(),
            materials = scene.materials.len(),
            importance_bounds = ?scene.importance_bounds(),
            "imported scene"
        );
        Ok(scene)
    }

    fn read_volumes<R: Read>(&mut self, reader: &mut SceneReader<R>) -> ImportResult<()> {
        let counts = self.header.counts;

        self.instigator_user_name = reader.read_string()?;
        self.persistent_level_name = reader.read_string()?;

        self.importance_volumes = reader.read_vec(counts.importance_volumes, SceneReader::read_box)?;
        self.importance_bounding_box = if self.importance_volumes.is_empty() {
            AABB::zero()
        } else {
            self.importance_volumes.iter().fold(AABB::empty(), |bounds, volume| AABB::surrounding_box(bounds, *volume))
        };

        self.character_indirect_detail_volumes =
            reader.read_vec(counts.character_indirect_detail_volumes, SceneReader::read_box)?;

        self.portals = reader.read_vec(counts.portals, |reader| {
            let matrix = reader.read_matrix()?;
            let scale = matrix.scale_vector();
            Ok(Sphere::new(matrix.origin(), Vec2(scale.1, scale.2).length()))
        })?;

        self.visibility_bucket_guids = reader.read_vec(counts.precomputed_visibility_buckets, SceneReader::read_guid)?;

        let volume_count = reader.read_count("visibility volume")?;
        self.visibility_volumes = reader.read_vec(volume_count, |reader| {
            let bounds = reader.read_box()?;
            let plane_count = reader.read_count("visibility volume plane")?;
            let planes = reader.read_vec(plane_count, SceneReader::read_plane)?;
            Ok(VisibilityVolume { bounds, planes })
        })?;

        let override_count = reader.read_count("visibility override volume")?;
        self.visibility_override_volumes = reader.read_vec(override_count, |reader| {
            let bounds = reader.read_box()?;
            let visibility_count = reader.read_count("visibility id")?;
            let visibility_ids = reader.read_vec(visibility_count, SceneReader::read_i32)?;
            let invisibility_count = reader.read_count("invisibility id")?;
            let invisibility_ids = reader.read_vec(invisibility_count, SceneReader::read_i32)?;
            Ok(VisibilityOverrideVolume { bounds, visibility_ids, invisibility_ids })
        })?;

        let camera_track_count = reader.read_count("camera track position")?;
        self.camera_track_positions = reader.read_vec(camera_track_count, SceneReader::read_vec3)?;
        self.volumetric_lightmap_task_guids =
            reader.read_vec(counts.volumetric_lightmap_tasks, SceneReader::read_guid)?;
        Ok(())
    }

    fn read_materials<R: Read>(&mut self, reader: &mut SceneReader<R>) -> ImportResult<()> {
        self.materials = reader.read_vec(self.header.counts.materials, |reader| {
            let guid = reader.read_guid()?;
            let blend_mode = BlendMode::try_from(reader.read_u8()?)?;
            let mut material = Material::new(guid, blend_mode);
            material.two_sided = reader.read_bool()?;
            material.cast_shadow_as_masked = reader.read_bool()?;
            material.opacity_mask_clip_value = reader.read_f32()?;
            material.emissive_boost = reader.read_f32()?;
            material.diffuse_boost = reader.read_f32()?;
            material.transmission = read_texture(reader)?;
            material.opacity_mask = read_texture(reader)?;
            Ok(Arc::new(material))
        })?;
        Ok(())
    }

    fn read_lights<R: Read>(&mut self, reader: &mut SceneReader<R>) -> ImportResult<()> {
        // header counts are untrusted, so grow as records arrive
        let counts = self.header.counts;

        for _ in 0..counts.directional_lights {
            let data = read_light_data(reader)?;
            let light_source_angle = reader.read_f32()?;
            self.lights.push(Light::Directional(DirectionalLight::new(data, light_source_angle)));
        }
        for _ in 0..counts.point_lights {
            let data = read_light_data(reader)?;
            self.lights.push(Light::Point(read_point_light(reader, data)?));
        }
        for _ in 0..counts.spot_lights {
            let data = read_light_data(reader)?;
            let point = read_point_light(reader, data)?;
            let inner_cone_angle = reader.read_f32()?;
            let outer_cone_angle = reader.read_f32()?;
            self.lights.push(Light::Spot(SpotLight::new(point, inner_cone_angle, outer_cone_angle)));
        }
        for _ in 0..counts.sky_lights {
            let data = read_light_data(reader)?;
            self.lights.push(Light::Sky(read_sky_light(reader, data)?));
        }
        Ok(())
    }

    fn read_meshes<R: Read>(&mut self, reader: &mut SceneReader<R>) -> ImportResult<()> {
        let counts = self.header.counts;
        let kinds = [
            (MeshKind::StaticMesh, counts.static_mesh_instances),
            (MeshKind::FluidSurface, counts.fluid_surface_instances),
            (MeshKind::Landscape, counts.landscape_instances),
        ];

        for (kind, count) in kinds {
            for _ in 0..count {
                let mesh = self.read_mesh(reader, kind)?;
                self.meshes.push(mesh);
            }
        }
        Ok(())
    }

    fn read_mesh<R: Read>(&self, reader: &mut SceneReader<R>, kind: MeshKind) -> ImportResult<MeshInstance> {
        let guid = reader.read_guid()?;
        let mesh_index = reader.read_i32()?;
        let lod_indices = reader.read_u32()?;
        let hlod_range = reader.read_u32()?;
        let lighting_flags = MeshLightingFlags::from_bits_retain(reader.read_u32()?);
        let local_to_world = reader.read_matrix()?;

        let element_count = reader.read_count("mesh element")?;
        let elements = reader.read_vec(element_count, |reader| {
            let material_guid = reader.read_guid()?;
            let material = self
                .materials
                .iter()
                .position(|material| material.guid == material_guid)
                .ok_or(ImportError::UnknownGuid { what: "material", guid: material_guid })?;
            Ok(MeshElement {
                material,
                casts_shadow: reader.read_bool()?,
                indirectly_shadowed_only: reader.read_bool()?,
            })
        })?;

        let vertex_count = reader.read_count("mesh vertex")?;
        let vertices = reader.read_vec(vertex_count, |reader| {
            Ok(MeshVertex {
                position: reader.read_vec3()?,
                normal: reader.read_vec3()?,
                uv: reader.read_vec2()?,
                lightmap_uv: reader.read_vec2()?,
            })
        })?;

        let triangle_count = reader.read_count("mesh triangle")?;
        let triangles = reader.read_vec(triangle_count, |reader| {
            let indices = [reader.read_u32()?, reader.read_u32()?, reader.read_u32()?];
            if let Some(&index) = indices.iter().find(|&&index| index as usize >= vertex_count) {
                return Err(ImportError::IndexOutOfRange { what: "vertex", index: index.into(), len: vertex_count });
            }
            let element = reader.read_i32()?;
            let element = usize::try_from(element)
                .ok()
                .filter(|&element| element < element_count)
                .ok_or(ImportError::IndexOutOfRange { what: "element", index: element.into(), len: element_count })?;
            Ok(MeshTriangle { indices, element })
        })?;

        let mut mesh = MeshInstance {
            guid,
            kind,
            mesh_index,
            lod: MeshLodInfo::from_packed(lod_indices, hlod_range),
            lighting_flags,
            local_to_world,
            elements,
            vertices,
            triangles,
        };
        mesh.transform_to_world();
        Ok(mesh)
    }

    fn read_mappings<R: Read>(&mut self, reader: &mut SceneReader<R>) -> ImportResult<()> {
        let counts = self.header.counts;
        let kinds = [
            (MappingKind::Bsp, counts.bsp_mappings),
            (MappingKind::StaticMeshTexture, counts.static_mesh_texture_mappings),
            (MappingKind::FluidSurface, counts.fluid_surface_texture_mappings),
            (MappingKind::Landscape, counts.landscape_texture_mappings),
        ];

        for (kind, count) in kinds {
            for _ in 0..count {
                let mapping = self.read_mapping(reader, kind)?;
                self.mappings.push(mapping);
            }
        }
        Ok(())
    }

    fn read_mapping<R: Read>(&self, reader: &mut SceneReader<R>, kind: MappingKind) -> ImportResult<Mapping> {
        let guid = reader.read_guid()?;
        let mesh_guid = reader.read_guid()?;
        let mesh: MeshId = self
            .find_mesh_by_guid(mesh_guid)
            .ok_or(ImportError::UnknownGuid { what: "mesh", guid: mesh_guid })?;
        let size_x = reader.read_count("mapping size")?;
        let size_y = reader.read_count("mapping size")?;

        Ok(Mapping {
            guid,
            kind,
            mesh,
            size_x,
            size_y,
            cached_size_x: size_x,
            cached_size_y: size_y,
            padded: false,
            lightmap_uv_index: reader.read_i32()?,
            bilinear_filter: reader.read_bool()?,
        })
    }

    fn locate_debug_mapping(&mut self) {
        let debug_input = &self.header.debug_input;
        self.debug_mapping = self.find_mapping_by_guid(debug_input.mapping_guid);

        let Some(MappingId(index)) = self.debug_mapping else {
            return;
        };
        let mapping = &self.mappings[index as usize];
        let inside = usize::try_from(debug_input.local_x).is_ok_and(|x| x < mapping.cached_size_x)
            && usize::try_from(debug_input.local_y).is_ok_and(|y| y < mapping.cached_size_y);
        if !inside {
            warn!(
                mapping = %mapping.guid,
                local_x = debug_input.local_x,
                local_y = debug_input.local_y,
                cached_size_x = mapping.cached_size_x,
                cached_size_y = mapping.cached_size_y,
                "debug texel lies outside its mapping"
            );
        }
    }
}

fn read_texture<R: Read>(reader: &mut SceneReader<R>) -> ImportResult<Texture> {
    let size_x = reader.read_count("texture size")?;
    let size_y = reader.read_count("texture size")?;
    let texels = reader.read_vec(size_x * size_y, SceneReader::read_f16_color)?;
    Ok(Texture::new(size_x, size_y, texels))
}

fn read_light_data<R: Read>(reader: &mut SceneReader<R>) -> ImportResult<LightData> {
    let guid: Guid = reader.read_guid()?;
    let flags = LightFlags::from_bits_retain(reader.read_u32()?);
    let color = reader.read_color()?;
    let brightness = reader.read_f32()?;

    let mut data = LightData::new(guid, color, brightness);
    data.flags = flags;
    data.indirect_lighting_scale = reader.read_f32()?;
    data.indirect_lighting_saturation = reader.read_f32()?;
    data.shadow_exponent = reader.read_f32()?;
    data.position = reader.read_vec3()?;
    data.direction = reader.read_vec3()?;
    data.light_source_radius = reader.read_f32()?;
    data.soft_source_radius = reader.read_f32()?;
    data.light_source_length = reader.read_f32()?;
    let profile_length = reader.read_count("light profile sample")?;
    data.light_profile = reader.read_vec(profile_length, SceneReader::read_u8)?;
    data.update_indirect_color();
    Ok(data)
}

fn read_point_light<R: Read>(reader: &mut SceneReader<R>, data: LightData) -> ImportResult<PointLight> {
    let radius = reader.read_f32()?;
    let falloff_exponent = reader.read_f32()?;
    let mut light = PointLight::new(data, radius, falloff_exponent);
    light.light_tangent = reader.read_vec3()?;
    Ok(light)
}

fn read_sky_light<R: Read>(reader: &mut SceneReader<R>, data: LightData) -> ImportResult<SkyLight> {
    let use_filtered_cubemap = reader.read_bool()?;
    let texel_count = reader.read_count("sky radiance texel")?;
    if SkyLight::cubemap_size_for(texel_count).is_none() {
        return Err(ImportError::InvalidCubemap { texels: texel_count });
    }
    let radiance = reader.read_vec(texel_count, SceneReader::read_f16_color)?;

    let mut read_channel = || -> ImportResult<SHVector3> {
        let mut v = [0.0; 9];
        for coefficient in v.iter_mut() {
            *coefficient = reader.read_f32()?;
        }
        Ok(SHVector3 { v })
    };
    let irradiance = SHVectorRGB3 { r: read_channel()?, g: read_channel()?, b: read_channel()? };

    Ok(SkyLight::new(data, use_filtered_cubemap, radiance, irradiance))
}
