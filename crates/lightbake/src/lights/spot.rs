use std::f32::consts::PI;

use crate::accel::LightRay;
use crate::color::LinearColor;
use crate::geometry::{BoxSphereBounds, Sphere, Vec2, Vec3};
use crate::sampling::{generate_coordinate_system, uniform_cone_pdf, uniform_sample_cone, RandomStream};

use super::{
    photon_count, DirectionSample, IndirectPathRay, LightSurfaceSample, LightingCalibration, PathDirectionSample,
    PointLight,
};

/// A point light restricted to a cone around its direction.
#[derive(Clone, Debug)]
pub struct SpotLight {
    pub point: PointLight,
    /// Degrees.
    pub inner_cone_angle: f32,
    /// Degrees.
    pub outer_cone_angle: f32,
    sin_outer_cone_angle: f32,
    cos_outer_cone_angle: f32,
    cos_inner_cone_angle: f32,
}

impl SpotLight {
    pub fn new(point: PointLight, inner_cone_angle: f32, outer_cone_angle: f32) -> SpotLight {
        let mut light = SpotLight {
            point,
            inner_cone_angle,
            outer_cone_angle,
            sin_outer_cone_angle: 0.0,
            cos_outer_cone_angle: 0.0,
            cos_inner_cone_angle: 0.0,
        };
        light.update_cone();
        light
    }

    pub fn initialize(&mut self, indirect_photon_emit_cone_angle: f32) {
        self.point.initialize(indirect_photon_emit_cone_angle);
        self.update_cone();
    }

    fn update_cone(&mut self) {
        // a NaN angle falls back to the bound
        let inner = self.inner_cone_angle.max(0.0).min(89.0).to_radians();
        let outer = self
            .outer_cone_angle
            .to_radians()
            .max(inner + 0.001)
            .min(89.0f32.to_radians() + 0.001);
        self.sin_outer_cone_angle = outer.sin();
        self.cos_outer_cone_angle = outer.cos();
        self.cos_inner_cone_angle = inner.cos();
    }

    pub fn cos_outer_cone_angle(&self) -> f32 {
        self.cos_outer_cone_angle
    }

    pub fn cos_inner_cone_angle(&self) -> f32 {
        self.cos_inner_cone_angle
    }

    pub fn affects_bounds(&self, bounds: &BoxSphereBounds) -> bool {
        if !self.point.affects_bounds(bounds) {
            return false;
        }

        let position = self.point.data.position;
        let direction = self.point.data.direction;

        // apex pulled back so the cone just touches a sphere of the bounds radius
        let apex = position - (bounds.sphere_radius / self.sin_outer_cone_angle) * direction;
        let d = bounds.origin - apex;
        let d_squared = Vec3::dot(d, d);
        let e = Vec3::dot(direction, d);
        if e > 0.0 && e * e >= d_squared * self.cos_outer_cone_angle * self.cos_outer_cone_angle {
            let d = bounds.origin - position;
            let d_squared = Vec3::dot(d, d);
            let e = -Vec3::dot(direction, d);
            if e > 0.0 && e * e >= d_squared * self.sin_outer_cone_angle * self.sin_outer_cone_angle {
                return d_squared <= bounds.sphere_radius * bounds.sphere_radius;
            }
            return true;
        }
        false
    }

    /// Sphere around the cone from a center halfway down the axis, by the law of cosines.
    pub fn get_bounding_sphere(&self) -> Sphere {
        let radius = self.point.radius;
        let bounds_radius = (1.25 * radius * radius - radius * radius * self.cos_outer_cone_angle).sqrt();
        Sphere::new(self.point.data.position + 0.5 * self.point.data.direction * radius, bounds_radius)
    }

    pub fn spot_attenuation(&self, point: Vec3) -> f32 {
        let light_vector = Vec3::safe_normalized(point - self.point.data.position);
        let falloff = ((Vec3::dot(light_vector, self.point.data.direction) - self.cos_outer_cone_angle)
            / (self.cos_inner_cone_angle - self.cos_outer_cone_angle))
            .clamp(0.0, 1.0);
        falloff * falloff
    }

    pub fn get_direct_intensity(&self, point: Vec3, for_indirect: bool) -> LinearColor {
        let attenuation = if self.point.data.is_inverse_squared() {
            self.point.inverse_squared_attenuation(point, false)
        } else {
            self.point.radial_attenuation(point)
        };
        self.point.data.direct_intensity(point, for_indirect) * (attenuation * self.spot_attenuation(point))
    }

    /// Photons for the spherical cap of the influence sphere inside the outer cone.
    pub fn get_num_direct_photons(&self, direct_photon_density: f32) -> i32 {
        let radius = self.point.radius;
        let influence_sphere_area_millions = 4.0 * PI * radius * radius / 1_000_000.0;
        let cone_solid_angle = 2.0 * PI * (1.0 - self.cos_outer_cone_angle);
        let sphere_fraction = cone_solid_angle / (4.0 * PI);
        photon_count(influence_sphere_area_millions * sphere_fraction * direct_photon_density)
    }

    pub fn sample_direction(&self, rng: &mut RandomStream, calibration: &LightingCalibration) -> DirectionSample {
        let position = self.point.data.position;
        let direction = self.point.data.direction;
        let (x_axis, y_axis) = generate_coordinate_system(direction);
        let cone_direction = uniform_sample_cone(rng, self.cos_outer_cone_angle, x_axis, y_axis, direction);

        let pdf = uniform_cone_pdf(self.cos_outer_cone_angle);
        debug_assert!(pdf > 0.0);
        DirectionSample {
            ray: LightRay::new(position, position + cone_direction * self.point.radius),
            light_source_normal: direction,
            light_surface_position: Vec2::default(),
            pdf,
            power: self.point.emitted_power(calibration),
        }
    }

    pub fn sample_direction_from_paths(
        &self,
        paths: &[IndirectPathRay],
        rng: &mut RandomStream,
        calibration: &LightingCalibration,
    ) -> PathDirectionSample {
        self.point.sample_cone_from_paths(paths, rng, calibration, self.point.light_tangent)
    }

    pub fn sample_light_surface(&self, rng: &mut RandomStream) -> LightSurfaceSample {
        self.point.sample_surface_along(self.point.light_tangent, rng)
    }
}
