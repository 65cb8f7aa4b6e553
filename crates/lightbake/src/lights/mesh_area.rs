use std::f32::consts::PI;

use tracing::warn;

use crate::accel::LightRay;
use crate::color::LinearColor;
use crate::geometry::{BoxSphereBounds, Sphere, Vec2, Vec3, AABB, DELTA, SMALL_NUMBER};
use crate::sampling::{
    generate_coordinate_system, uniform_cone_pdf, uniform_sample_cone, unit_vector, RandomStream, Step1dCdf,
};
use crate::scene::Guid;

use super::{
    photon_count, DirectionSample, IndirectPathRay, LightData, LightSurfaceSample, LightingCalibration,
    PathDirectionSample,
};

pub const NUM_TEXEL_CORNERS: usize = 4;

/// Directions in texture space matching the corner order of [`TexelCorners`].
const CORNER_DIRECTIONS: [(i32, i32); NUM_TEXEL_CORNERS] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

/// |cos| below which a direction counts as tangent to the emitting surface (about 0.1 degrees).
const MIN_EMISSION_COSINE: f32 = 0.0017;

/// Irradiance at which the automatic influence radius is placed.
const IRRADIANCE_CUTOFF: f32 = 0.002;

/// World space corners of one emissive texel and its normal.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TexelCorners {
    pub corners: [Vec3; NUM_TEXEL_CORNERS],
    pub world_tangent_z: Vec3,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct PrimitiveCorner {
    world_position: Vec3,
    furthest_coordinates: (i32, i32),
}

/// Simplified quad standing in for a group of emissive texels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshLightPrimitive {
    corners: [PrimitiveCorner; NUM_TEXEL_CORNERS],
    pub surface_normal: Vec3,
    pub power: LinearColor,
    pub surface_area: f32,
    pub num_sub_primitives: u32,
}

impl MeshLightPrimitive {
    pub fn new() -> MeshLightPrimitive {
        MeshLightPrimitive {
            power: LinearColor::new(0.0, 0.0, 0.0, 0.0),
            ..Default::default()
        }
    }

    pub fn corner(&self, index: usize) -> Vec3 {
        self.corners[index].world_position
    }

    /// Merges a texel into the primitive. `texel_power` is power per unit area.
    pub fn add_sub_primitive(
        &mut self,
        texel: &TexelCorners,
        coordinates: (i32, i32),
        texel_power: LinearColor,
        normal_offset: f32,
    ) {
        let c = &texel.corners;
        let first_area = 0.5 * Vec3::cross(c[0] - c[1], c[2] - c[1]).length();
        let second_area = 0.5 * Vec3::cross(c[2] - c[1], c[2] - c[3]).length();
        let area = first_area + second_area;
        let power = texel_power * area;
        let offset = normal_offset * texel.world_tangent_z;

        if self.num_sub_primitives == 0 {
            self.surface_normal = texel.world_tangent_z;
            for (corner, position) in self.corners.iter_mut().zip(c.iter()) {
                corner.world_position = *position + offset;
                corner.furthest_coordinates = coordinates;
            }
            self.surface_area = area;
            self.power = power;
        } else {
            self.surface_normal += texel.world_tangent_z;
            for ((corner, position), direction) in self.corners.iter_mut().zip(c.iter()).zip(CORNER_DIRECTIONS) {
                let furthest = corner.furthest_coordinates;
                // keep the texel furthest along this corner's texture space direction
                if direction.0 * (coordinates.0 - furthest.0) >= 0 && direction.1 * (coordinates.1 - furthest.1) >= 0 {
                    corner.world_position = *position + offset;
                    corner.furthest_coordinates = coordinates;
                }
            }
            self.surface_area += area;
            self.power += power;
        }
        self.num_sub_primitives += 1;
    }

    pub fn finalize(&mut self) {
        self.surface_normal = if self.surface_normal.square_magnitude() > SMALL_NUMBER {
            Vec3::normalized(self.surface_normal)
        } else {
            Vec3::UP
        };
    }

    fn center(&self) -> Vec3 {
        self.corners
            .iter()
            .fold(Vec3::ZERO, |sum, corner| sum + corner.world_position / 4.0)
    }
}

/// Emissive geometry approximated by a set of [`MeshLightPrimitive`]s.
#[derive(Clone, Debug)]
pub struct MeshAreaLight {
    pub data: LightData,
    pub level_guid: Guid,
    primitives: Vec<MeshLightPrimitive>,
    primitive_cdf: Step1dCdf,
    total_surface_area: f32,
    total_power: LinearColor,
    source_bounds: BoxSphereBounds,
    influence_radius: f32,
    falloff_exponent: f32,
    /// Primitive normals bucketed by (theta, phi) for pdf evaluation.
    grid_size: usize,
    cached_primitive_normals: Vec<Vec<Vec3>>,
    occupied_cells: Vec<(usize, usize)>,
    cos_indirect_photon_emit_cone_angle: f32,
    importance_bounds: BoxSphereBounds,
}

impl MeshAreaLight {
    /// # Panics
    /// On an empty primitive list, zero total area or zero total power.
    pub fn new(
        level_guid: Guid,
        primitives: Vec<MeshLightPrimitive>,
        falloff_exponent: f32,
        explicit_influence_radius: f32,
        grid_size: usize,
    ) -> MeshAreaLight {
        assert!(!primitives.is_empty(), "mesh area light without primitives");
        assert!(grid_size > 0);

        let mut total_surface_area = 0.0;
        let mut total_power = LinearColor::new(0.0, 0.0, 0.0, 0.0);
        let mut bounds = AABB::empty();
        let mut cached_primitive_normals = vec![Vec::new(); grid_size * grid_size];

        for primitive in &primitives {
            total_surface_area += primitive.surface_area;
            total_power += primitive.power;
            for corner in &primitive.corners {
                bounds = bounds.add_point(corner.world_position);
            }
            let (theta, phi) = primitive.surface_normal.unit_cartesian_to_spherical();
            let cell_x = grid_cell(theta / PI, grid_size);
            let cell_y = grid_cell((phi + PI) / (2.0 * PI), grid_size);
            cached_primitive_normals[cell_y * grid_size + cell_x].push(primitive.surface_normal);
        }

        let mut occupied_cells = Vec::new();
        for phi_step in 0..grid_size {
            for theta_step in 0..grid_size {
                if !cached_primitive_normals[phi_step * grid_size + theta_step].is_empty() {
                    occupied_cells.push((theta_step, phi_step));
                }
            }
        }

        let primitive_cdf = Step1dCdf::new(primitives.iter().map(|p| p.surface_area).collect());
        let source_bounds = BoxSphereBounds::from(bounds);

        assert!(total_surface_area > 0.0, "mesh area light without surface area");
        assert!(
            total_power.r > 0.0 || total_power.g > 0.0 || total_power.b > 0.0,
            "mesh area light without power"
        );

        let influence_radius = if explicit_influence_radius > DELTA {
            explicit_influence_radius
        } else {
            (total_power.linear_rgb_to_xyz().g / IRRADIANCE_CUTOFF).sqrt()
        };

        let mut data = LightData::new(level_guid, LinearColor::WHITE, 1.0);
        data.position = source_bounds.origin;

        MeshAreaLight {
            data,
            level_guid,
            primitives,
            primitive_cdf,
            total_surface_area,
            total_power,
            source_bounds,
            influence_radius,
            falloff_exponent,
            grid_size,
            cached_primitive_normals,
            occupied_cells,
            cos_indirect_photon_emit_cone_angle: 1.0,
            importance_bounds: BoxSphereBounds::default(),
        }
    }

    pub fn initialize(&mut self, indirect_photon_emit_cone_angle: f32, importance_bounds: BoxSphereBounds) {
        self.cos_indirect_photon_emit_cone_angle = indirect_photon_emit_cone_angle.cos();
        self.importance_bounds = importance_bounds;
    }

    pub fn primitives(&self) -> &[MeshLightPrimitive] {
        &self.primitives
    }

    pub fn influence_radius(&self) -> f32 {
        self.influence_radius
    }

    pub fn total_surface_area(&self) -> f32 {
        self.total_surface_area
    }

    pub fn source_bounds(&self) -> BoxSphereBounds {
        self.source_bounds
    }

    /// Photons at the influence radius, clamped to the importance radius.
    pub fn get_num_direct_photons(&self, direct_photon_density: f32) -> i32 {
        let radius = f32::min(self.importance_bounds.sphere_radius, self.influence_radius);
        photon_count(4.0 * PI * radius * radius / 1_000_000.0 * direct_photon_density)
    }

    pub fn affects_bounds(&self, bounds: &BoxSphereBounds) -> bool {
        let reach = self.influence_radius + bounds.sphere_radius + self.source_bounds.sphere_radius;
        (bounds.origin - self.data.position).square_magnitude() <= reach * reach
    }

    pub fn get_bounding_sphere(&self) -> Sphere {
        Sphere::new(self.data.position, self.influence_radius)
    }

    fn radial_attenuation(&self, center: Vec3, point: Vec3) -> f32 {
        let normalized = (center - point) / self.influence_radius;
        (1.0 - normalized.square_magnitude()).max(0.0).powf(self.falloff_exponent)
    }

    pub fn get_direct_intensity(&self, point: Vec3, for_indirect: bool) -> LinearColor {
        let mut accumulated = LinearColor::new(0.0, 0.0, 0.0, 0.0);
        for primitive in &self.primitives {
            let center = primitive.center();
            let n_dot_l = Vec3::dot(Vec3::safe_normalized(point - center), primitive.surface_normal);
            if n_dot_l >= 0.0 {
                accumulated += primitive.power * (self.radial_attenuation(center, point) * n_dot_l);
            }
        }
        let scale = if for_indirect { self.data.indirect_lighting_scale } else { 1.0 };
        accumulated / self.total_surface_area * scale
    }

    /// Power weighted falloff over primitives, with photon thinning near the surface.
    pub fn custom_attenuation(&self, point: Vec3, rng: &mut RandomStream) -> f32 {
        let full_probability_distance = 0.5 * self.influence_radius;
        let mut weighted_attenuation = 0.0;
        let mut weighted_physical_attenuation = 0.0;
        let mut deposit_probability = 0.0;

        for primitive in &self.primitives {
            let center = primitive.center();
            if Vec3::dot(point - center, primitive.surface_normal) >= 0.0 {
                let power_weight = primitive.power.linear_rgb_to_xyz().g;
                weighted_attenuation += power_weight * self.radial_attenuation(center, point);
                let distance_squared = (center - point).square_magnitude();
                weighted_physical_attenuation += power_weight / distance_squared;
                deposit_probability += primitive.surface_area / self.total_surface_area
                    * f32::min(distance_squared / (full_probability_distance * full_probability_distance), 1.0);
            }
        }

        let deposit_probability = deposit_probability.clamp(0.0, 1.0);
        if rng.fraction() < deposit_probability {
            weighted_attenuation / (weighted_physical_attenuation * deposit_probability)
        } else {
            0.0
        }
    }

    fn emitted_power(&self, calibration: &LightingCalibration) -> LinearColor {
        self.total_power / self.total_surface_area * calibration.mesh_area_light_intensity_scale
    }

    pub fn sample_direction(&self, rng: &mut RandomStream, calibration: &LightingCalibration) -> DirectionSample {
        let surface_sample = self.sample_light_surface(rng);
        let distance_from_center = (surface_sample.position - self.data.position).length();

        let mut direction = None;
        for _ in 0..calibration.mesh_area_light_max_direction_retries {
            let candidate = unit_vector(rng);
            if Vec3::dot(candidate, surface_sample.normal).abs() >= MIN_EMISSION_COSINE {
                direction = Some(candidate);
                break;
            }
        }
        let mut direction = direction.unwrap_or_else(|| {
            warn!(
                retries = calibration.mesh_area_light_max_direction_retries,
                "mesh area light direction sampling exhausted its retries, emitting along the normal"
            );
            surface_sample.normal
        });
        if Vec3::dot(direction, surface_sample.normal) < 0.0 {
            direction = -direction;
        }

        let reach = (self.influence_radius - distance_from_center).max(0.0);
        let pdf = self.hemisphere_pdf(direction);
        debug_assert!(pdf > 0.0);

        DirectionSample {
            ray: LightRay::new(surface_sample.position, surface_sample.position + direction * reach),
            light_source_normal: surface_sample.normal,
            light_surface_position: Vec2::default(),
            pdf,
            power: self.emitted_power(calibration),
        }
    }

    /// Probability of `direction` under uniform hemisphere emission from a uniformly chosen primitive.
    pub fn hemisphere_pdf(&self, direction: Vec3) -> f32 {
        let hemisphere_pdf = 1.0 / (2.0 * PI);
        let grid_size = self.grid_size as f32;
        let mut pdf = 0.0;

        for &(theta_step, phi_step) in &self.occupied_cells {
            let normals = &self.cached_primitive_normals[phi_step * self.grid_size + theta_step];
            let mut all_same_hemisphere = true;
            let mut all_opposite_hemisphere = true;
            for (corner_x, corner_y) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
                let theta = (theta_step + corner_x) as f32 / grid_size * PI;
                let phi = (phi_step + corner_y) as f32 / grid_size * 2.0 * PI - PI;
                let corner_direction = Vec3::spherical_to_unit_cartesian(theta, phi);
                let cos = Vec3::dot(corner_direction, direction);
                all_same_hemisphere &= cos > 0.0;
                all_opposite_hemisphere &= cos < 0.0;
            }

            if all_same_hemisphere {
                pdf += normals.len() as f32 * hemisphere_pdf;
            } else if !all_opposite_hemisphere {
                let facing = normals.iter().filter(|n| Vec3::dot(**n, direction) > 0.0).count();
                pdf += facing as f32 * hemisphere_pdf;
            }
        }
        pdf / self.primitives.len() as f32
    }

    pub fn sample_direction_from_paths(
        &self,
        paths: &[IndirectPathRay],
        rng: &mut RandomStream,
        calibration: &LightingCalibration,
    ) -> PathDirectionSample {
        assert!(!paths.is_empty());
        let ray_index = ((rng.fraction() * paths.len() as f32) as usize).min(paths.len() - 1);
        let chosen = &paths[ray_index];
        let path_direction = chosen.unit_direction;
        let (x_axis, y_axis) = generate_coordinate_system(path_direction);

        let direction_dot_normal = Vec3::dot(path_direction, chosen.light_source_normal);
        debug_assert!(direction_dot_normal > 0.0);
        let cos_direction_normal_plane = (1.0 - direction_dot_normal * direction_dot_normal).max(0.0).sqrt();
        // keep the cone inside the hemisphere of the normal that emitted the path
        let cos_emit_cone = f32::max(
            self.cos_indirect_photon_emit_cone_angle,
            f32::min(cos_direction_normal_plane + DELTA, 1.0),
        );
        let cone_direction = uniform_sample_cone(rng, cos_emit_cone, x_axis, y_axis, path_direction);

        let mut surface_sample = self.sample_light_surface(rng);
        let mut retries = 0;
        while Vec3::dot(surface_sample.normal, cone_direction) < 0.0 {
            if retries == calibration.mesh_area_light_max_direction_retries {
                warn!(retries, "no mesh area light primitive faces the sampled direction, keeping the last sample");
                break;
            }
            surface_sample = self.sample_light_surface(rng);
            retries += 1;
        }

        let distance_from_center = (surface_sample.position - self.data.position).length();
        let reach = (self.influence_radius - distance_from_center).max(0.0);
        let ray = LightRay::new(surface_sample.position, surface_sample.position + cone_direction * reach);

        let cone_pdf = uniform_cone_pdf(cos_emit_cone);
        let covering = paths
            .iter()
            .filter(|path| Vec3::dot(path.unit_direction, cone_direction) > (1.0 - DELTA) * cos_emit_cone)
            .count();
        let pdf = cone_pdf * covering as f32 / paths.len() as f32;
        assert!(pdf > 0.0);

        PathDirectionSample { ray, pdf, power: self.emitted_power(calibration) }
    }

    pub fn power(&self) -> f32 {
        let light_power =
            self.total_power / self.total_surface_area * (2.0 * PI * self.influence_radius * self.influence_radius);
        light_power.linear_rgb_to_xyz().g
    }

    /// Picks a primitive proportionally to its area, then a bilinear point on its corners.
    pub fn sample_light_surface(&self, rng: &mut RandomStream) -> LightSurfaceSample {
        let picked = self.primitive_cdf.sample(rng);
        let primitive = &self.primitives[picked.index];

        let alpha1 = rng.fraction();
        let edge1 = Vec3::lerp(primitive.corner(0), primitive.corner(1), alpha1);
        let edge2 = Vec3::lerp(primitive.corner(2), primitive.corner(3), alpha1);
        let alpha2 = rng.fraction();
        let position = Vec3::lerp(edge1, edge2, alpha2);

        LightSurfaceSample::new(
            position,
            primitive.surface_normal,
            Vec2::default(),
            picked.probability / primitive.surface_area,
        )
    }

    pub fn get_direct_lighting_direction(&self, point: Vec3, normal: Vec3) -> Vec3 {
        let first_visible_light_point = self.data.position + normal * self.source_bounds.sphere_radius;
        first_visible_light_point - point
    }
}

fn grid_cell(fraction: f32, grid_size: usize) -> usize {
    ((fraction * grid_size as f32) as i64).clamp(0, grid_size as i64 - 1) as usize
}
