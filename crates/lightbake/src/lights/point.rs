use std::f32::consts::PI;

use crate::accel::LightRay;
use crate::color::LinearColor;
use crate::geometry::{BoxSphereBounds, Sphere, Vec2, Vec3, DELTA};
use crate::sampling::{
    generate_coordinate_system, uniform_cone_pdf, uniform_sample_cone, unit_vector, RandomStream,
};

use super::{
    photon_count, DirectionSample, IndirectPathRay, LightData, LightSurfaceSample, LightingCalibration,
    PathDirectionSample,
};

/// Omni light with a spherical, or capsule shaped when it has a length, emitting surface.
#[derive(Clone, Debug)]
pub struct PointLight {
    pub data: LightData,
    /// Influence radius.
    pub radius: f32,
    pub falloff_exponent: f32,
    pub light_tangent: Vec3,
    cos_indirect_photon_emit_cone_angle: f32,
}

impl PointLight {
    pub fn new(data: LightData, radius: f32, falloff_exponent: f32) -> PointLight {
        let light_tangent = data.direction;
        PointLight {
            data,
            radius,
            falloff_exponent,
            light_tangent,
            cos_indirect_photon_emit_cone_angle: 1.0,
        }
    }

    pub fn initialize(&mut self, indirect_photon_emit_cone_angle: f32) {
        self.cos_indirect_photon_emit_cone_angle = indirect_photon_emit_cone_angle.cos();
    }

    pub(crate) fn cos_indirect_photon_emit_cone_angle(&self) -> f32 {
        self.cos_indirect_photon_emit_cone_angle
    }

    pub fn get_num_direct_photons(&self, direct_photon_density: f32) -> i32 {
        let influence_sphere_area_millions = 4.0 * PI * self.radius * self.radius / 1_000_000.0;
        photon_count(influence_sphere_area_millions * direct_photon_density)
    }

    pub fn affects_bounds(&self, bounds: &BoxSphereBounds) -> bool {
        let reach = self.radius + bounds.sphere_radius;
        (bounds.origin - self.data.position).square_magnitude() <= reach * reach
    }

    pub fn get_bounding_sphere(&self) -> Sphere {
        Sphere::new(self.data.position, self.radius)
    }

    /// `16 / (d² + 1)` or its line segment equivalent, masked to zero at the radius.
    pub(crate) fn inverse_squared_attenuation(&self, point: Vec3, segment_normalization: bool) -> f32 {
        let to_light = self.data.position - point;
        let distance_squared = to_light.square_magnitude();

        let mut attenuation = if self.data.light_source_length > 0.0 {
            let l01 = self.data.direction * self.data.light_source_length;
            let l0 = to_light - 0.5 * l01;
            let l1 = to_light + 0.5 * l01;
            let length_l0 = l0.length();
            let length_l1 = l1.length();
            let mut segment = 1.0 / ((length_l0 * length_l1 + Vec3::dot(l0, l1)) * 0.5 + 1.0);
            if segment_normalization {
                segment *= 0.5 * (l0 / length_l0 + l1 / length_l1).length();
            }
            segment
        } else {
            1.0 / (distance_squared + 1.0)
        };

        attenuation *= 16.0;
        attenuation * self.radius_mask(distance_squared)
    }

    fn radius_mask(&self, distance_squared: f32) -> f32 {
        let ratio = distance_squared / (self.radius * self.radius);
        let mask = (1.0 - ratio * ratio).max(0.0);
        mask * mask
    }

    /// `pow(max(1 - (d/r)², 0), falloff_exponent)`
    pub(crate) fn radial_attenuation(&self, point: Vec3) -> f32 {
        let normalized = (self.data.position - point) / self.radius;
        (1.0 - normalized.square_magnitude()).max(0.0).powf(self.falloff_exponent)
    }

    pub fn get_direct_intensity(&self, point: Vec3, for_indirect: bool) -> LinearColor {
        let attenuation = if self.data.is_inverse_squared() {
            self.inverse_squared_attenuation(point, true)
        } else {
            self.radial_attenuation(point)
        };
        self.data.direct_intensity(point, for_indirect) * attenuation
    }

    /// Swaps physical 1/d² falloff for the light's own falloff and thins photons near the source.
    ///
    /// Surviving photons are reweighted by the deposit probability so the expectation is unchanged.
    pub fn custom_attenuation(&self, point: Vec3, rng: &mut RandomStream) -> f32 {
        let distance_squared = (self.data.position - point).square_magnitude();
        let physical_attenuation = 1.0 / (distance_squared + 0.0001);

        let mut attenuation = if self.data.is_inverse_squared() {
            16.0 * physical_attenuation * self.radius_mask(distance_squared)
        } else {
            self.radial_attenuation(point)
        };

        let neg_light_vector = Vec3::safe_normalized(self.data.position - point);
        attenuation *= self
            .data
            .light_profile_multiplier(Vec3::dot(neg_light_vector, self.data.direction));

        let full_probability_distance = 0.5 * self.radius;
        let deposit_probability =
            (distance_squared / (full_probability_distance * full_probability_distance)).clamp(0.0, 1.0);

        if rng.fraction() < deposit_probability {
            attenuation / (physical_attenuation * deposit_probability)
        } else {
            0.0
        }
    }

    /// Mirrors a surface sample through the light center into the hemisphere facing `direction`.
    fn face_sample_towards(&self, mut sample: LightSurfaceSample, direction: Vec3) -> LightSurfaceSample {
        if Vec3::dot(sample.position - self.data.position, direction) < 0.0 {
            sample.position = self.data.position - (sample.position - self.data.position);
        }
        sample
    }

    pub fn sample_direction(&self, rng: &mut RandomStream, calibration: &LightingCalibration) -> DirectionSample {
        let direction = unit_vector(rng);
        let surface_sample = self.face_sample_towards(self.sample_light_surface(rng), direction);
        let reach = (self.radius - self.data.light_source_radius).max(0.0);

        DirectionSample {
            ray: LightRay::new(surface_sample.position, surface_sample.position + direction * reach),
            light_source_normal: Vec3::safe_normalized(surface_sample.position - self.data.position),
            light_surface_position: Vec2::default(),
            // uniform over the sphere of directions; not exact for receivers inside the source
            pdf: 1.0 / (4.0 * PI),
            power: self.emitted_power(calibration),
        }
    }

    pub fn sample_direction_from_paths(
        &self,
        paths: &[IndirectPathRay],
        rng: &mut RandomStream,
        calibration: &LightingCalibration,
    ) -> PathDirectionSample {
        self.sample_cone_from_paths(paths, rng, calibration, self.data.direction)
    }

    /// Shared by spot lights, which sample their surface around their own tangent.
    pub(crate) fn sample_cone_from_paths(
        &self,
        paths: &[IndirectPathRay],
        rng: &mut RandomStream,
        calibration: &LightingCalibration,
        tangent: Vec3,
    ) -> PathDirectionSample {
        assert!(!paths.is_empty());
        let ray_index = ((rng.fraction() * paths.len() as f32) as usize).min(paths.len() - 1);
        let path_direction = paths[ray_index].unit_direction;

        let (x_axis, y_axis) = generate_coordinate_system(path_direction);
        let cos_cone = self.cos_indirect_photon_emit_cone_angle;
        let cone_direction = uniform_sample_cone(rng, cos_cone, x_axis, y_axis, path_direction);

        let surface_sample = self.face_sample_towards(self.sample_surface_along(tangent, rng), cone_direction);
        let reach = (self.radius - self.data.light_source_radius).max(0.0);
        let ray = LightRay::new(surface_sample.position, surface_sample.position + cone_direction * reach);

        let cone_pdf = uniform_cone_pdf(cos_cone);
        let covering = paths
            .iter()
            .filter(|path| Vec3::dot(path.unit_direction, cone_direction) > (1.0 - DELTA) * cos_cone)
            .count();
        let pdf = cone_pdf * covering as f32 / paths.len() as f32;
        assert!(pdf > 0.0);

        PathDirectionSample { ray, pdf, power: self.emitted_power(calibration) }
    }

    pub(crate) fn emitted_power(&self, calibration: &LightingCalibration) -> LinearColor {
        self.data.indirect_color() * self.data.brightness * calibration.point_light_intensity_scale
    }

    pub fn validate_surface_sample(&self, point: Vec3, sample: &mut LightSurfaceSample) {
        // capsules are not radially symmetric
        if self.data.light_source_length > 0.0 {
            return;
        }
        let light_to_point = point - self.data.position;
        let distance_squared = light_to_point.square_magnitude();
        let source_radius = self.data.light_source_radius;
        if distance_squared < (2.0 * source_radius) * (2.0 * source_radius) {
            // shrink the source to half the distance to the receiver
            let local = (sample.position - self.data.position) * (distance_squared.sqrt() / (2.0 * source_radius));
            sample.position = local + self.data.position;
        }
        *sample = self.face_sample_towards(*sample, light_to_point);
    }

    /// Radiant power through a sphere at half the influence radius.
    pub fn power(&self) -> f32 {
        let mut incident_power = self.data.color * self.data.brightness * self.data.indirect_lighting_scale;
        let radius_fraction = 0.5;
        let distance = radius_fraction * self.radius;

        if self.data.is_inverse_squared() {
            incident_power = incident_power * 16.0 / (distance * distance);
        } else {
            let attenuation = (1.0 - radius_fraction * radius_fraction).max(0.0).powf(self.falloff_exponent);
            incident_power *= attenuation;
        }

        let light_power = incident_power * (4.0 * PI * distance * distance);
        light_power.linear_rgb_to_xyz().g
    }

    pub fn get_direct_lighting_direction(&self, point: Vec3, normal: Vec3) -> Vec3 {
        if self.data.light_source_length > 0.0 {
            let to_light = self.data.position - point;
            let l01 = self.data.direction * self.data.light_source_length;
            let l0 = to_light - 0.5 * l01;
            let l1 = to_light + 0.5 * l01;
            let length_l0 = l0.length();
            let length_l1 = l1.length();
            (l0 * length_l1 + l1 * length_l0) / (length_l0 + length_l1)
        } else {
            let first_visible_light_point = self.data.position + normal * self.data.light_source_radius;
            first_visible_light_point - point
        }
    }

    pub fn sample_light_surface(&self, rng: &mut RandomStream) -> LightSurfaceSample {
        self.sample_surface_along(self.data.direction, rng)
    }

    /// Sphere sample, or capsule sample around `tangent` when the light has a length.
    pub(crate) fn sample_surface_along(&self, tangent: Vec3, rng: &mut RandomStream) -> LightSurfaceSample {
        let position = self.data.position;
        let length = self.data.light_source_length;

        if length <= 0.0 {
            let radius = self.data.light_source_radius;
            let unit = unit_vector(rng);
            return LightSurfaceSample {
                position: unit * radius + position,
                normal: unit,
                disk_position: Vec2::default(),
                pdf: 1.0 / (4.0 * PI * radius * radius),
            };
        }

        let radius = self.data.light_source_radius.max(DELTA);
        let cylinder_area = 2.0 * PI * radius * length;
        let sphere_area = 4.0 * PI * radius * radius;
        let total_area = cylinder_area + sphere_area;

        let (sample_position, normal) = if rng.fraction() < sphere_area / total_area {
            // end caps
            let unit = unit_vector(rng);
            let cap_offset = if Vec3::dot(unit, tangent) > 0.0 { tangent } else { -tangent } * (0.5 * length);
            (unit * radius + position + cap_offset, unit)
        } else {
            let center_line = position + tangent * (length * (rng.fraction() - 0.5));
            let theta = 2.0 * PI * rng.fraction();
            let (x_axis, y_axis) = generate_coordinate_system(tangent);
            let edge = theta.cos() * x_axis + theta.sin() * y_axis;
            (edge * radius + center_line, edge)
        };

        LightSurfaceSample {
            position: sample_position,
            normal,
            disk_position: Vec2::default(),
            pdf: 1.0 / total_area,
        }
    }
}
