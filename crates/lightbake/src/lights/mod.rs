//! Emission models for every light kind the baker understands.
//!
//! Lights are plain data once imported and initialized. All sampling takes an explicit
//! [`RandomStream`] and, where a calibration constant applies, a [`LightingCalibration`].

mod cache;
mod directional;
mod mesh_area;
mod point;
mod sky;
mod spot;

#[cfg(test)]
mod tests;

pub use cache::LightSurfaceSampleCache;
pub use directional::{DirectionalLight, DirectionalLightSetup};
pub use mesh_area::{MeshAreaLight, MeshLightPrimitive, TexelCorners, NUM_TEXEL_CORNERS};
pub use point::PointLight;
pub use sky::SkyLight;
pub use spot::SpotLight;

use std::f32::consts::PI;

use bitflags::bitflags;

use crate::accel::LightRay;
use crate::color::LinearColor;
use crate::geometry::{BoxSphereBounds, Sphere, Vec2, Vec3};
use crate::sampling::RandomStream;
use crate::scene::Guid;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct LightFlags: u32 {
        const CAST_SHADOWS = 1 << 0;
        const HAS_STATIC_LIGHTING = 1 << 1;
        const HAS_STATIC_SHADOWING = 1 << 2;
        const CAST_STATIC_SHADOWS = 1 << 3;
        const STORE_SEPARATE_SHADOW_FACTOR = 1 << 4;
        const INVERSE_SQUARED = 1 << 5;
        const USE_AREA_SHADOWS_FOR_SEPARATE_SHADOW_FACTOR = 1 << 6;
        const USE_LIGHT_PROFILE = 1 << 7;
    }
}

/// Fudge factors matching photon power to direct lighting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightingCalibration {
    pub point_light_intensity_scale: f32,
    pub mesh_area_light_intensity_scale: f32,
    /// Upper bound on rejection loops in mesh area light sampling.
    pub mesh_area_light_max_direction_retries: u32,
}

impl Default for LightingCalibration {
    fn default() -> Self {
        LightingCalibration {
            point_light_intensity_scale: 1.5,
            mesh_area_light_intensity_scale: 2.5,
            mesh_area_light_max_direction_retries: 256,
        }
    }
}

/// Parameters shared by every light kind.
#[derive(Clone, Debug, PartialEq)]
pub struct LightData {
    pub guid: Guid,
    pub flags: LightFlags,
    pub color: LinearColor,
    pub brightness: f32,
    pub indirect_lighting_scale: f32,
    pub indirect_lighting_saturation: f32,
    pub shadow_exponent: f32,
    pub position: Vec3,
    pub direction: Vec3,
    pub light_source_radius: f32,
    pub soft_source_radius: f32,
    pub light_source_length: f32,
    /// Light profile (IES) samples over the normalized angle to `direction`.
    pub light_profile: Vec<u8>,
    indirect_color: LinearColor,
}

impl LightData {
    pub fn new(guid: Guid, color: LinearColor, brightness: f32) -> LightData {
        let mut data = LightData {
            guid,
            flags: LightFlags::CAST_SHADOWS | LightFlags::HAS_STATIC_LIGHTING,
            color,
            brightness,
            indirect_lighting_scale: 1.0,
            indirect_lighting_saturation: 1.0,
            shadow_exponent: 2.0,
            position: Vec3::ZERO,
            direction: Vec3(0.0, 0.0, -1.0),
            light_source_radius: 0.0,
            soft_source_radius: 0.0,
            light_source_length: 0.0,
            light_profile: Vec::new(),
            indirect_color: LinearColor::BLACK,
        };
        data.update_indirect_color();
        data
    }

    /// Recomputes the cached indirect color. Call after editing color or the indirect terms.
    pub fn update_indirect_color(&mut self) {
        self.indirect_color =
            self.color.adjust_saturation(self.indirect_lighting_saturation) * self.indirect_lighting_scale;
    }

    pub fn indirect_color(&self) -> LinearColor {
        self.indirect_color
    }

    pub fn is_inverse_squared(&self) -> bool {
        self.flags.contains(LightFlags::INVERSE_SQUARED)
    }

    pub fn light_profile_multiplier(&self, cos_angle: f32) -> f32 {
        if self.light_profile.is_empty() || !self.flags.contains(LightFlags::USE_LIGHT_PROFILE) {
            return 1.0;
        }
        let normalized_angle = cos_angle.clamp(-1.0, 1.0).acos() / PI;
        let position = normalized_angle * (self.light_profile.len() - 1) as f32;
        let index = (position.floor() as usize).min(self.light_profile.len() - 1);
        let next = (index + 1).min(self.light_profile.len() - 1);
        let fraction = position - index as f32;
        let low = self.light_profile[index] as f32;
        let high = self.light_profile[next] as f32;
        (low + (high - low) * fraction) / 255.0
    }

    /// Unattenuated intensity towards `point`, including the light profile.
    pub fn direct_intensity(&self, point: Vec3, for_indirect: bool) -> LinearColor {
        let neg_light_vector = Vec3::safe_normalized(self.position - point);
        let profile = self.light_profile_multiplier(Vec3::dot(neg_light_vector, self.direction));
        let color = if for_indirect { self.indirect_color } else { self.color };
        color * (profile * self.brightness)
    }
}

/// A point on the emitting surface of a light.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LightSurfaceSample {
    pub position: Vec3,
    pub normal: Vec3,
    /// Position on the unit disk for disk parameterized lights.
    pub disk_position: Vec2,
    pub pdf: f32,
}

impl LightSurfaceSample {
    pub fn new(position: Vec3, normal: Vec3, disk_position: Vec2, pdf: f32) -> LightSurfaceSample {
        LightSurfaceSample { position, normal, disk_position, pdf }
    }
}

/// A previously successful indirect path used to condition emission.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct IndirectPathRay {
    pub start: Vec3,
    pub unit_direction: Vec3,
    pub light_source_normal: Vec3,
    pub light_surface_position: Vec2,
    pub length: f32,
}

impl IndirectPathRay {
    pub fn new(
        start: Vec3,
        unit_direction: Vec3,
        light_source_normal: Vec3,
        light_surface_position: Vec2,
        length: f32,
    ) -> IndirectPathRay {
        IndirectPathRay { start, unit_direction, light_source_normal, light_surface_position, length }
    }
}

/// Unconditioned emission sample.
#[derive(Clone, Debug)]
pub struct DirectionSample {
    pub ray: LightRay,
    pub light_source_normal: Vec3,
    pub light_surface_position: Vec2,
    pub pdf: f32,
    pub power: LinearColor,
}

/// Emission sample conditioned on cached indirect paths.
#[derive(Clone, Debug)]
pub struct PathDirectionSample {
    pub ray: LightRay,
    pub pdf: f32,
    pub power: LinearColor,
}

/// Photon count for a density in photons per million square units, saturating instead of wrapping.
pub(crate) fn photon_count(area_millions_times_density: f32) -> i32 {
    let count = area_millions_times_density.trunc();
    if !count.is_finite() || count >= i32::MAX as f32 || count <= i32::MIN as f32 {
        i32::MAX
    } else {
        count as i32
    }
}

#[derive(Clone, Debug)]
pub enum Light {
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(SpotLight),
    Sky(SkyLight),
    MeshArea(MeshAreaLight),
}

impl Light {
    pub fn data(&self) -> &LightData {
        match self {
            Light::Directional(light) => &light.data,
            Light::Point(light) => &light.data,
            Light::Spot(light) => &light.point.data,
            Light::Sky(light) => &light.data,
            Light::MeshArea(light) => &light.data,
        }
    }

    pub fn guid(&self) -> Guid {
        self.data().guid
    }

    pub fn get_num_direct_photons(&self, direct_photon_density: f32) -> i32 {
        match self {
            Light::Directional(light) => light.get_num_direct_photons(direct_photon_density),
            Light::Point(light) => light.get_num_direct_photons(direct_photon_density),
            Light::Spot(light) => light.get_num_direct_photons(direct_photon_density),
            Light::Sky(_) => 0,
            Light::MeshArea(light) => light.get_num_direct_photons(direct_photon_density),
        }
    }

    /// # Panics
    /// Sky lights are not point sampled.
    pub fn sample_direction(&self, rng: &mut RandomStream, calibration: &LightingCalibration) -> DirectionSample {
        match self {
            Light::Directional(light) => light.sample_direction(rng),
            Light::Point(light) => light.sample_direction(rng, calibration),
            Light::Spot(light) => light.sample_direction(rng, calibration),
            Light::Sky(_) => panic!("sky lights do not support direction sampling"),
            Light::MeshArea(light) => light.sample_direction(rng, calibration),
        }
    }

    /// # Panics
    /// When `paths` is empty, or for sky lights.
    pub fn sample_direction_from_paths(
        &self,
        paths: &[IndirectPathRay],
        rng: &mut RandomStream,
        calibration: &LightingCalibration,
    ) -> PathDirectionSample {
        assert!(!paths.is_empty(), "conditioned sampling needs at least one indirect path");
        match self {
            Light::Directional(light) => light.sample_direction_from_paths(paths, rng),
            Light::Point(light) => light.sample_direction_from_paths(paths, rng, calibration),
            Light::Spot(light) => light.sample_direction_from_paths(paths, rng, calibration),
            Light::Sky(_) => panic!("sky lights do not support direction sampling"),
            Light::MeshArea(light) => light.sample_direction_from_paths(paths, rng, calibration),
        }
    }

    pub fn cache_path_rays(&mut self, paths: &[IndirectPathRay]) {
        if let Light::Directional(light) = self {
            light.cache_path_rays(paths);
        }
    }

    pub fn get_direct_intensity(&self, point: Vec3, for_indirect: bool) -> LinearColor {
        match self {
            Light::Directional(light) => light.data.direct_intensity(point, for_indirect),
            Light::Point(light) => light.get_direct_intensity(point, for_indirect),
            Light::Spot(light) => light.get_direct_intensity(point, for_indirect),
            Light::Sky(light) => light.data.direct_intensity(point, for_indirect),
            Light::MeshArea(light) => light.get_direct_intensity(point, for_indirect),
        }
    }

    pub fn custom_attenuation(&self, point: Vec3, rng: &mut RandomStream) -> f32 {
        match self {
            Light::Point(light) => light.custom_attenuation(point, rng),
            Light::Spot(light) => light.point.custom_attenuation(point, rng),
            Light::MeshArea(light) => light.custom_attenuation(point, rng),
            Light::Directional(_) | Light::Sky(_) => 1.0,
        }
    }

    pub fn affects_bounds(&self, bounds: &BoxSphereBounds) -> bool {
        match self {
            Light::Point(light) => light.affects_bounds(bounds),
            Light::Spot(light) => light.affects_bounds(bounds),
            Light::MeshArea(light) => light.affects_bounds(bounds),
            Light::Directional(_) | Light::Sky(_) => true,
        }
    }

    pub fn get_bounding_sphere(&self) -> Sphere {
        match self {
            Light::Point(light) => light.get_bounding_sphere(),
            Light::Spot(light) => light.get_bounding_sphere(),
            Light::MeshArea(light) => light.get_bounding_sphere(),
            Light::Directional(_) | Light::Sky(_) => Sphere::new(Vec3::ZERO, crate::geometry::WORLD_MAX),
        }
    }

    pub fn behind_surface(&self, point: Vec3, normal: Vec3) -> bool {
        match self {
            Light::Sky(_) => false,
            _ => Vec3::dot(normal, self.get_direct_lighting_direction(point, normal)) < 0.0,
        }
    }

    pub fn get_direct_lighting_direction(&self, point: Vec3, normal: Vec3) -> Vec3 {
        match self {
            Light::Directional(light) => light.get_direct_lighting_direction(point, normal),
            Light::Point(light) => light.get_direct_lighting_direction(point, normal),
            Light::Spot(light) => light.point.get_direct_lighting_direction(point, normal),
            Light::Sky(_) => normal,
            Light::MeshArea(light) => light.get_direct_lighting_direction(point, normal),
        }
    }

    pub fn power(&self) -> f32 {
        match self {
            Light::Directional(light) => light.power(),
            Light::Point(light) => light.power(),
            Light::Spot(light) => light.point.power(),
            Light::Sky(_) => 0.0,
            Light::MeshArea(light) => light.power(),
        }
    }

    pub fn validate_surface_sample(&self, point: Vec3, sample: &mut LightSurfaceSample) {
        match self {
            Light::Directional(light) => light.validate_surface_sample(point, sample),
            Light::Point(light) => light.validate_surface_sample(point, sample),
            Light::Spot(light) => light.point.validate_surface_sample(point, sample),
            Light::Sky(_) | Light::MeshArea(_) => {}
        }
    }

    /// # Panics
    /// Sky lights have no sampleable surface.
    pub fn sample_light_surface(&self, rng: &mut RandomStream) -> LightSurfaceSample {
        match self {
            Light::Directional(light) => light.sample_light_surface(rng),
            Light::Point(light) => light.sample_light_surface(rng),
            Light::Spot(light) => light.sample_light_surface(rng),
            Light::Sky(_) => panic!("sky lights have no emitting surface to sample"),
            Light::MeshArea(light) => light.sample_light_surface(rng),
        }
    }
}
