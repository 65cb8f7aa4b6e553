use std::f32::consts::PI;

use crate::accel::LightRay;
use crate::color::LinearColor;
use crate::geometry::{BoxSphereBounds, Vec2, Vec3, DELTA};
use crate::sampling::{generate_coordinate_system, uniform_unit_disk_position, RandomStream};

use super::{photon_count, DirectionSample, IndirectPathRay, LightData, LightSurfaceSample, PathDirectionSample};

/// Scene dependent inputs of [`DirectionalLight::initialize`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DirectionalLightSetup {
    pub scene_bounds: BoxSphereBounds,
    pub importance_bounds: BoxSphereBounds,
    pub emit_photons_outside_importance_volume: bool,
    pub indirect_disk_radius: f32,
    pub grid_size: usize,
    pub direct_photon_density: f32,
    pub outside_importance_volume_density: f32,
}

/// Parallel light through a disk covering the scene, centered on the scene bounds.
///
/// Disk positions live in a [-1, 1] light space scaled by the scene radius.
#[derive(Clone, Debug)]
pub struct DirectionalLight {
    pub data: LightData,
    /// Angular radius of the light source, in radians.
    pub light_source_angle: f32,

    x_axis: Vec3,
    y_axis: Vec3,
    scene_bounds: BoxSphereBounds,
    importance_bounds: BoxSphereBounds,
    importance_disk_origin: Vec2,
    light_space_importance_disk_radius: f32,
    importance_bounds_sample_probability: f32,
    indirect_disk_radius: f32,
    grid_size: usize,
    outside_importance_volume_density: f32,
    light_source_radius: f32,

    grid_center: Vec2,
    grid_extent: f32,
    path_ray_grid: Vec<Vec<usize>>,
}

impl DirectionalLight {
    pub fn new(data: LightData, light_source_angle: f32) -> DirectionalLight {
        DirectionalLight {
            data,
            light_source_angle,
            x_axis: Vec3::ZERO,
            y_axis: Vec3::ZERO,
            scene_bounds: BoxSphereBounds::default(),
            importance_bounds: BoxSphereBounds::default(),
            importance_disk_origin: Vec2::default(),
            light_space_importance_disk_radius: 0.0,
            importance_bounds_sample_probability: 0.0,
            indirect_disk_radius: 0.0,
            grid_size: 0,
            outside_importance_volume_density: 0.0,
            light_source_radius: 0.0,
            grid_center: Vec2::default(),
            grid_extent: 0.0,
            path_ray_grid: Vec::new(),
        }
    }

    pub fn initialize(&mut self, setup: &DirectionalLightSetup) {
        let direction = self.data.direction;
        (self.x_axis, self.y_axis) = generate_coordinate_system(direction);

        self.scene_bounds = setup.scene_bounds;
        self.importance_bounds = setup.importance_bounds;
        let scene_radius = self.scene_bounds.sphere_radius;
        let importance_radius = self.importance_bounds.sphere_radius;
        assert!(
            scene_radius >= importance_radius,
            "importance bounds must fit inside the scene bounds"
        );

        // project the importance origin onto the scene axis along the light direction
        let axis_start = self.scene_bounds.origin - direction * scene_radius;
        let scene_axis = direction * (2.0 * scene_radius);
        let scene_axis_length = 2.0 * scene_radius;
        let to_importance_origin = self.importance_bounds.origin - axis_start;
        let closest_on_axis = Vec3::dot(scene_axis, to_importance_origin)
            / (scene_axis_length * scene_axis_length)
            * scene_axis
            + axis_start;

        let disk_offset = (self.importance_bounds.origin - closest_on_axis) / scene_radius;
        self.importance_disk_origin =
            Vec2(Vec3::dot(self.x_axis, disk_offset), Vec3::dot(self.y_axis, disk_offset));
        self.light_space_importance_disk_radius = importance_radius / scene_radius;

        self.indirect_disk_radius = setup.indirect_disk_radius;
        self.grid_size = setup.grid_size;
        self.outside_importance_volume_density = setup.outside_importance_volume_density;

        let importance_disk_area_millions = PI * importance_radius * importance_radius / 1_000_000.0;
        let outside_disk_area_millions =
            PI * (scene_radius * scene_radius - importance_radius * importance_radius) / 1_000_000.0;
        let inside = importance_disk_area_millions * setup.direct_photon_density;
        self.importance_bounds_sample_probability =
            inside / (inside + outside_disk_area_millions * self.outside_importance_volume_density);

        self.light_source_radius = 2.0 * scene_radius * self.light_source_angle.tan();

        if !setup.emit_photons_outside_importance_volume && importance_radius > DELTA {
            self.importance_bounds_sample_probability = 1.0;
            self.outside_importance_volume_density = 0.0;
        }
    }

    pub fn x_axis(&self) -> Vec3 {
        self.x_axis
    }

    pub fn y_axis(&self) -> Vec3 {
        self.y_axis
    }

    /// Probability mass given to samples inside the importance disk.
    pub fn importance_bounds_sample_probability(&self) -> f32 {
        self.importance_bounds_sample_probability
    }

    pub fn importance_disk_origin(&self) -> Vec2 {
        self.importance_disk_origin
    }

    pub fn light_space_importance_disk_radius(&self) -> f32 {
        self.light_space_importance_disk_radius
    }

    pub fn light_source_radius(&self) -> f32 {
        self.light_source_radius
    }

    fn has_importance_volume(&self) -> bool {
        self.importance_bounds.sphere_radius > DELTA
    }

    fn disk_to_world(&self, disk_position: Vec2) -> Vec3 {
        self.scene_bounds.origin
            + self.scene_bounds.sphere_radius * (disk_position.0 * self.x_axis + disk_position.1 * self.y_axis)
    }

    pub fn get_num_direct_photons(&self, direct_photon_density: f32) -> i32 {
        let scene_radius = self.scene_bounds.sphere_radius;
        if self.has_importance_volume() {
            let importance_radius = self.importance_bounds.sphere_radius;
            let importance_disk_area_millions = PI * importance_radius * importance_radius / 1_000_000.0;
            let outside_disk_area_millions =
                PI * (scene_radius * scene_radius - importance_radius * importance_radius) / 1_000_000.0;
            photon_count(
                importance_disk_area_millions * direct_photon_density
                    + outside_disk_area_millions * self.outside_importance_volume_density,
            )
        } else {
            let scene_disk_area_millions = PI * scene_radius * scene_radius / 1_000_000.0;
            photon_count(scene_disk_area_millions * direct_photon_density)
        }
    }

    pub fn sample_direction(&self, rng: &mut RandomStream) -> DirectionSample {
        let scene_radius = self.scene_bounds.sphere_radius;
        let importance_radius = self.importance_bounds.sphere_radius;

        let (light_surface_position, pdf) =
            if self.has_importance_volume() && rng.fraction() < self.importance_bounds_sample_probability {
                let disk_position = uniform_unit_disk_position(rng);
                let position =
                    self.importance_disk_origin + disk_position * self.light_space_importance_disk_radius;
                let pdf = self.importance_bounds_sample_probability / (PI * importance_radius * importance_radius);
                (position, pdf)
            } else {
                // rejection sample the part of the disk outside the importance disk
                let radius_squared = self.light_space_importance_disk_radius * self.light_space_importance_disk_radius;
                let position = loop {
                    let candidate = uniform_unit_disk_position(rng);
                    if (candidate - self.importance_disk_origin).square_magnitude() >= radius_squared {
                        break candidate;
                    }
                };
                let pdf = (1.0 - self.importance_bounds_sample_probability)
                    / (PI * (scene_radius * scene_radius - importance_radius * importance_radius));
                (position, pdf)
            };

        let disk_position = self.disk_to_world(light_surface_position);
        let direction = self.data.direction;
        debug_assert!(pdf > 0.0);

        DirectionSample {
            ray: LightRay::new(disk_position - scene_radius * direction, disk_position + scene_radius * direction),
            light_source_normal: direction,
            light_surface_position,
            pdf,
            power: self.data.indirect_color() * self.data.brightness,
        }
    }

    /// Builds the grid of paths whose disks may cover each cell of light space.
    ///
    /// The cell test is conservative: a path may be listed in a cell its disk does not touch.
    pub fn cache_path_rays(&mut self, paths: &[IndirectPathRay]) {
        if paths.is_empty() {
            return;
        }
        let scene_radius = self.scene_bounds.sphere_radius;
        let light_space_disk_radius = self.indirect_disk_radius / scene_radius;

        let mut grid_min = Vec2(1.0, 1.0);
        let mut grid_max = Vec2(-1.0, -1.0);
        for path in paths {
            let disk = Vec2(light_space_disk_radius, light_space_disk_radius);
            grid_min = Vec2::elementwise_min(grid_min, path.light_surface_position - disk);
            grid_max = Vec2::elementwise_max(grid_max, path.light_surface_position + disk);
        }
        grid_min = Vec2::elementwise_min(grid_min, Vec2(1.0, 1.0));
        grid_max = Vec2::elementwise_max(grid_max, Vec2(-1.0, -1.0));
        assert!(Vec2::all_greater(grid_max, grid_min), "degenerate path ray grid");

        let half_extent = 0.5 * (grid_max - grid_min);
        self.grid_extent = f32::max(half_extent.0, half_extent.1);
        self.grid_center = 0.5 * (grid_min + grid_max);

        let grid_size = self.grid_size;
        self.path_ray_grid = vec![Vec::new(); grid_size * grid_size];

        let inv_grid_size = 1.0 / grid_size as f32;
        let disk_radius_squared = self.indirect_disk_radius * self.indirect_disk_radius;
        let extent = Vec2(self.grid_extent, self.grid_extent);

        for y in 0..grid_size {
            for x in 0..grid_size {
                let box_center = Vec2((x as f32 + 0.5) * inv_grid_size, (y as f32 + 0.5) * inv_grid_size);
                let box_extent = 0.5 * inv_grid_size;
                let corners = [
                    box_center + Vec2(box_extent, box_extent),
                    box_center + Vec2(-box_extent, box_extent),
                    box_center + Vec2(box_extent, -box_extent),
                    box_center + Vec2(-box_extent, -box_extent),
                ];
                let world_corners = corners.map(|corner| {
                    let light_corner = 2.0 * self.grid_extent * corner + self.grid_center - extent;
                    self.disk_to_world(light_corner) - scene_radius * self.data.direction
                });

                let diagonal = (world_corners[0] - world_corners[3]).length();
                let diagonal_and_radius_squared =
                    (diagonal + self.indirect_disk_radius) * (diagonal + self.indirect_disk_radius);

                let cell = &mut self.path_ray_grid[y * grid_size + x];
                for (path_index, path) in paths.iter().enumerate() {
                    let distances = world_corners.map(|corner| (corner - path.start).square_magnitude());
                    let any_corner_in_disk = distances.iter().any(|d| *d < disk_radius_squared);
                    let within_diagonal = distances.iter().all(|d| *d < diagonal_and_radius_squared);
                    if any_corner_in_disk || within_diagonal {
                        cell.push(path_index);
                    }
                }
            }
        }
    }

    /// Samples a disk around a random cached path. Requires [`Self::cache_path_rays`] with the same paths.
    pub fn sample_direction_from_paths(&self, paths: &[IndirectPathRay], rng: &mut RandomStream) -> PathDirectionSample {
        assert!(!paths.is_empty());
        assert!(!self.path_ray_grid.is_empty(), "path rays were not cached");

        let disk_position_2d = uniform_unit_disk_position(rng);
        let ray_index = ((rng.fraction() * paths.len() as f32) as usize).min(paths.len() - 1);
        let chosen = &paths[ray_index];

        let disk_position = chosen.start
            + self.indirect_disk_radius * (disk_position_2d.0 * self.x_axis + disk_position_2d.1 * self.y_axis);
        let scene_radius = self.scene_bounds.sphere_radius;
        let ray = LightRay::new(disk_position, disk_position + 2.0 * scene_radius * self.data.direction);

        let disk_pdf = 1.0 / (PI * self.indirect_disk_radius * self.indirect_disk_radius);
        let light_space_disk_radius = self.indirect_disk_radius / scene_radius;
        let sample_light_position = Vec2(
            (disk_position_2d.0 * light_space_disk_radius + chosen.light_surface_position.0).clamp(-1.0, 1.0 - DELTA),
            (disk_position_2d.1 * light_space_disk_radius + chosen.light_surface_position.1).clamp(-1.0, 1.0 - DELTA),
        );

        let grid_size = self.grid_size as f32;
        let cell_of = |value: f32, center: f32| {
            let cell = (grid_size * (value - center + self.grid_extent) / (2.0 * self.grid_extent)) as i64;
            cell.clamp(0, self.grid_size as i64 - 1) as usize
        };
        let cell_x = cell_of(sample_light_position.0, self.grid_center.0);
        let cell_y = cell_of(sample_light_position.1, self.grid_center.1);
        let cell = &self.path_ray_grid[cell_y * self.grid_size + cell_x];

        let disk_radius_squared = self.indirect_disk_radius * self.indirect_disk_radius;
        let mut pdf = disk_pdf;
        for &path_index in cell {
            if path_index != ray_index && (disk_position - paths[path_index].start).square_magnitude() < disk_radius_squared {
                pdf += disk_pdf;
            }
        }
        pdf /= paths.len() as f32;
        assert!(pdf > 0.0);

        PathDirectionSample { ray, pdf, power: self.data.indirect_color() * self.data.brightness }
    }

    pub fn power(&self) -> f32 {
        let effective_radius = if self.has_importance_volume() {
            self.importance_bounds.sphere_radius
        } else {
            self.scene_bounds.sphere_radius
        };
        let light_power: LinearColor = self.data.direct_intensity(Vec3::ZERO, false)
            * self.data.indirect_lighting_scale
            * (PI * effective_radius * effective_radius);
        light_power.linear_rgb_to_xyz().g
    }

    /// Moves a sample from the origin centered source disk to the far side of the scene from `point`.
    pub fn validate_surface_sample(&self, point: Vec3, sample: &mut LightSurfaceSample) {
        sample.position += point - self.data.direction * (2.0 * self.scene_bounds.sphere_radius);
    }

    pub fn get_direct_lighting_direction(&self, point: Vec3, normal: Vec3) -> Vec3 {
        let first_visible_light_point = point - self.data.direction * (2.0 * self.scene_bounds.sphere_radius)
            + normal * self.light_source_radius;
        first_visible_light_point - point
    }

    pub fn sample_light_surface(&self, rng: &mut RandomStream) -> LightSurfaceSample {
        let disk_position = uniform_unit_disk_position(rng);
        LightSurfaceSample {
            position: self.light_source_radius * (disk_position.0 * self.x_axis + disk_position.1 * self.y_axis),
            normal: self.data.direction,
            disk_position,
            pdf: 1.0 / (PI * self.light_source_radius * self.light_source_radius),
        }
    }
}
