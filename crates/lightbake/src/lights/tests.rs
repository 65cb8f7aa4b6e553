use std::f32::consts::PI;

use approx::{assert_abs_diff_eq, assert_relative_eq};

use super::*;
use crate::color::{LinearColor, SHVectorRGB3};
use crate::geometry::{BoxSphereBounds, Vec3};
use crate::sampling::RandomStream;
use crate::scene::Guid;

fn white_light() -> LightData {
    let mut data = LightData::new(Guid::new(1, 2, 3, 4), LinearColor::WHITE, 1.0);
    data.direction = Vec3(0.0, 0.0, -1.0);
    data
}

fn bounds(origin: Vec3, radius: f32) -> BoxSphereBounds {
    BoxSphereBounds::new(origin, Vec3(radius, radius, radius) / 3f32.sqrt(), radius)
}

fn directional_with_importance() -> DirectionalLight {
    let mut light = DirectionalLight::new(white_light(), 0.01);
    light.initialize(&DirectionalLightSetup {
        scene_bounds: bounds(Vec3::ZERO, 1000.0),
        importance_bounds: bounds(Vec3(100.0, 0.0, 0.0), 200.0),
        emit_photons_outside_importance_volume: true,
        indirect_disk_radius: 50.0,
        grid_size: 16,
        direct_photon_density: 100.0,
        outside_importance_volume_density: 10.0,
    });
    light
}

#[test]
fn directional_sample_split_matches_importance_probability() {
    let light = directional_with_importance();
    let inside_mass = PI * 200.0 * 200.0 * 100.0;
    let outside_mass = PI * (1000.0 * 1000.0 - 200.0 * 200.0) * 10.0;
    let expected = inside_mass / (inside_mass + outside_mass);
    assert_relative_eq!(light.importance_bounds_sample_probability(), expected, max_relative = 1e-4);
    assert_abs_diff_eq!(light.importance_disk_origin().length(), 0.1, epsilon = 1e-5);

    let mut rng = RandomStream::new(7);
    let draws = 20_000;
    let radius = light.light_space_importance_disk_radius();
    let mut inside = 0;
    for _ in 0..draws {
        let sample = light.sample_direction(&mut rng);
        if (sample.light_surface_position - light.importance_disk_origin()).length() < radius {
            inside += 1;
            assert_relative_eq!(sample.pdf, expected / (PI * 200.0 * 200.0), max_relative = 1e-4);
        }
        assert_abs_diff_eq!(sample.ray.direction.2, -2000.0, epsilon = 1e-2);
    }
    let fraction = inside as f32 / draws as f32;
    assert_abs_diff_eq!(fraction, expected, epsilon = 0.02);
}

#[test]
fn directional_inside_only_without_outside_emission() {
    let mut light = DirectionalLight::new(white_light(), 0.0);
    light.initialize(&DirectionalLightSetup {
        scene_bounds: bounds(Vec3::ZERO, 1000.0),
        importance_bounds: bounds(Vec3::ZERO, 100.0),
        emit_photons_outside_importance_volume: false,
        indirect_disk_radius: 50.0,
        grid_size: 4,
        direct_photon_density: 100.0,
        outside_importance_volume_density: 10.0,
    });
    assert_eq!(light.importance_bounds_sample_probability(), 1.0);

    // pi * 100^2 / 1e6 * 100 with nothing for the outside ring
    assert_eq!(light.get_num_direct_photons(100.0), 3);
}

#[test]
fn photon_counts_saturate_instead_of_wrapping() {
    let point = PointLight::new(white_light(), 1.0e6, 2.0);
    assert_eq!(point.get_num_direct_photons(1.0e12), i32::MAX);
    assert_eq!(point.get_num_direct_photons(f32::INFINITY), i32::MAX);
    assert_eq!(point.get_num_direct_photons(0.0), 0);
}

#[test]
fn directional_path_sample_from_single_path_has_disk_pdf() {
    let mut light = directional_with_importance();
    let start = Vec3(0.0, 0.0, 1000.0);
    let paths = [IndirectPathRay::new(start, Vec3(0.0, 0.0, -1.0), Vec3(0.0, 0.0, -1.0), Vec2(0.0, 0.0), 500.0)];
    light.cache_path_rays(&paths);

    let mut rng = RandomStream::new(3);
    for _ in 0..100 {
        let sample = light.sample_direction_from_paths(&paths, &mut rng);
        assert_relative_eq!(sample.pdf, 1.0 / (PI * 50.0 * 50.0), max_relative = 1e-4);
        assert!((sample.ray.start - start).length() <= 50.0 + 1e-3);
    }
}

#[test]
fn directional_path_pdf_counts_overlapping_disks() {
    let mut light = directional_with_importance();
    let direction = Vec3(0.0, 0.0, -1.0);
    // two paths from the same spot: every sample is covered by both disks
    let start = Vec3(0.0, 0.0, 1000.0);
    let paths = [
        IndirectPathRay::new(start, direction, direction, Vec2(0.0, 0.0), 10.0),
        IndirectPathRay::new(start, direction, direction, Vec2(0.0, 0.0), 20.0),
    ];
    light.cache_path_rays(&paths);

    let mut rng = RandomStream::new(11);
    let sample = light.sample_direction_from_paths(&paths, &mut rng);
    let disk_pdf = 1.0 / (PI * 50.0 * 50.0);
    assert_relative_eq!(sample.pdf, 2.0 * disk_pdf / 2.0, max_relative = 1e-4);
}

#[test]
fn directional_lighting_direction_and_behind_surface() {
    let light = Light::Directional(directional_with_importance());
    let up = Vec3(0.0, 0.0, 1.0);
    assert!(!light.behind_surface(Vec3::ZERO, up));
    assert!(light.behind_surface(Vec3::ZERO, -up));
    assert!(light.get_direct_lighting_direction(Vec3::ZERO, up).2 > 0.0);
    assert_eq!(light.get_bounding_sphere().radius, crate::geometry::WORLD_MAX);
}

#[test]
fn point_light_thinning_keeps_the_mean() {
    let mut data = white_light();
    data.position = Vec3::ZERO;
    let light = PointLight::new(data, 1000.0, 2.0);
    let receiver = Vec3(300.0, 0.0, 0.0);

    let distance_squared = 300.0f64 * 300.0;
    let unreal = (1.0f64 - distance_squared / (1000.0 * 1000.0)).powi(2);
    let physical = 1.0 / (distance_squared + 0.0001);
    let expected = unreal / physical;

    let mut rng = RandomStream::new(42);
    let draws = 200_000;
    let mut sum = 0.0f64;
    let mut rejected = 0;
    for _ in 0..draws {
        let value = light.custom_attenuation(receiver, &mut rng);
        if value == 0.0 {
            rejected += 1;
        }
        sum += value as f64;
    }
    assert!(rejected > 0);
    assert_relative_eq!(sum / draws as f64, expected, max_relative = 0.02);
}

#[test]
fn point_light_far_receivers_are_never_thinned() {
    let light = PointLight::new(white_light(), 100.0, 2.0);
    let mut rng = RandomStream::new(5);
    for _ in 0..100 {
        assert!(light.custom_attenuation(Vec3(80.0, 0.0, 0.0), &mut rng) > 0.0);
    }
}

#[test]
fn point_light_inverse_squared_intensity_falls_to_zero_at_radius() {
    let mut data = white_light();
    data.flags |= LightFlags::INVERSE_SQUARED;
    let light = PointLight::new(data, 100.0, 2.0);
    let near = light.get_direct_intensity(Vec3(1.0, 0.0, 0.0), false);
    assert_relative_eq!(near.r, 16.0 / 2.0 * (1.0f32 - 1.0e-8).powi(2), max_relative = 1e-4);
    assert_eq!(light.get_direct_intensity(Vec3(100.0, 0.0, 0.0), false).r, 0.0);
}

#[test]
fn point_light_samples_start_on_the_facing_side() {
    let mut data = white_light();
    data.light_source_radius = 10.0;
    let light = PointLight::new(data, 1000.0, 2.0);
    let calibration = LightingCalibration::default();
    let mut rng = RandomStream::new(9);
    for _ in 0..500 {
        let sample = light.sample_direction(&mut rng, &calibration);
        assert_abs_diff_eq!(sample.ray.start.length(), 10.0, epsilon = 1e-3);
        assert!(Vec3::dot(sample.ray.start, sample.ray.direction) >= 0.0);
        assert_relative_eq!(sample.pdf, 1.0 / (4.0 * PI));
        assert_relative_eq!(sample.power.r, 1.5, max_relative = 1e-5);
    }
}

#[test]
fn point_light_path_pdf_is_cone_pdf_for_one_path() {
    let mut light = PointLight::new(white_light(), 1000.0, 2.0);
    light.initialize(0.2);
    let paths = [IndirectPathRay::new(Vec3::ZERO, Vec3(1.0, 0.0, 0.0), Vec3(1.0, 0.0, 0.0), Vec2::default(), 10.0)];
    let mut rng = RandomStream::new(1);
    let calibration = LightingCalibration { point_light_intensity_scale: 3.0, ..Default::default() };
    let sample = light.sample_direction_from_paths(&paths, &mut rng, &calibration);
    assert_relative_eq!(sample.pdf, crate::sampling::uniform_cone_pdf(0.2f32.cos()), max_relative = 1e-5);
    assert_relative_eq!(sample.power.g, 3.0, max_relative = 1e-5);
}

#[test]
fn capsule_surface_samples_stay_on_the_capsule() {
    let mut data = white_light();
    data.light_source_radius = 2.0;
    data.light_source_length = 10.0;
    data.direction = Vec3(1.0, 0.0, 0.0);
    let light = PointLight::new(data, 1000.0, 2.0);
    let mut rng = RandomStream::new(21);
    for _ in 0..500 {
        let sample = light.sample_light_surface(&mut rng);
        // distance to the segment along x
        let along = sample.position.0.clamp(-5.0, 5.0);
        let distance = (sample.position - Vec3(along, 0.0, 0.0)).length();
        assert_abs_diff_eq!(distance, 2.0, epsilon = 1e-3);
        let total_area = 2.0 * PI * 2.0 * 10.0 + 4.0 * PI * 4.0;
        assert_relative_eq!(sample.pdf, 1.0 / total_area);
    }
}

fn spot() -> SpotLight {
    let mut data = white_light();
    data.position = Vec3::ZERO;
    SpotLight::new(PointLight::new(data, 1000.0, 1.0), 20.0, 40.0)
}

#[test]
fn spot_attenuation_is_full_inside_and_zero_outside() {
    let light = spot();
    assert_relative_eq!(light.spot_attenuation(Vec3(0.0, 0.0, -10.0)), 1.0);
    assert_eq!(light.spot_attenuation(Vec3(10.0, 0.0, -1.0)), 0.0);
    assert_eq!(light.spot_attenuation(Vec3(0.0, 0.0, 10.0)), 0.0);
}

#[test]
fn spot_nan_cone_angles_fall_back_to_the_limits() {
    let nan_inner = SpotLight::new(PointLight::new(white_light(), 100.0, 2.0), f32::NAN, 45.0);
    assert_relative_eq!(nan_inner.cos_inner_cone_angle(), 1.0);
    assert_relative_eq!(nan_inner.cos_outer_cone_angle(), 45.0f32.to_radians().cos());

    let nan_outer = SpotLight::new(PointLight::new(white_light(), 100.0, 2.0), 20.0, f32::NAN);
    assert_relative_eq!(nan_outer.cos_outer_cone_angle(), (20.0f32.to_radians() + 0.001).cos());
}

#[test]
fn spot_samples_stay_in_the_outer_cone() {
    let light = spot();
    let calibration = LightingCalibration::default();
    let mut rng = RandomStream::new(4);
    for _ in 0..500 {
        let sample = light.sample_direction(&mut rng, &calibration);
        let cos = Vec3::dot(Vec3::normalized(sample.ray.direction), Vec3(0.0, 0.0, -1.0));
        assert!(cos >= light.cos_outer_cone_angle() - 1e-5);
    }
}

#[test]
fn spot_bounds_and_photons() {
    let light = spot();
    let in_front = BoxSphereBounds::new(Vec3(0.0, 0.0, -500.0), Vec3(1.0, 1.0, 1.0), 1.0);
    let behind = BoxSphereBounds::new(Vec3(0.0, 0.0, 500.0), Vec3(1.0, 1.0, 1.0), 1.0);
    assert!(light.affects_bounds(&in_front));
    assert!(!light.affects_bounds(&behind));

    let sphere = light.get_bounding_sphere();
    assert_abs_diff_eq!(sphere.center.2, -500.0, epsilon = 1e-3);
    assert!(sphere.radius < 1000.0);

    let fraction = (1.0 - light.cos_outer_cone_angle()) / 2.0;
    let full = light.point.get_num_direct_photons(1.0e6) as f32;
    let cone = light.get_num_direct_photons(1.0e6) as f32;
    assert_relative_eq!(cone, (full * fraction).trunc(), max_relative = 1e-3);
}

fn constant_sky(size: usize, value: f32, filtered: bool) -> SkyLight {
    let mut data = white_light();
    data.brightness = 2.0;
    SkyLight::new(data, filtered, vec![LinearColor::rgb(value, value, value); size * size * 6], SHVectorRGB3::default())
}

#[test]
fn sky_constant_cubemap_is_constant_at_every_mip() {
    let sky = constant_sky(8, 0.5, true);
    assert_eq!(sky.num_mips(), 4);
    for direction in [Vec3(1.0, 0.0, 0.0), Vec3(-0.3, 0.9, 0.1), Vec3(0.1, -0.2, -0.97)] {
        for solid_angle in [1e-4, 0.1, 4.0 * PI] {
            let lighting = sky.get_path_lighting(Vec3::normalized(direction), solid_angle, false);
            assert_relative_eq!(lighting.r, 1.0, max_relative = 1e-5);
            assert_abs_diff_eq!(sky.get_path_variance(Vec3::normalized(direction), solid_angle), 0.0);
        }
    }
}

#[test]
fn sky_variance_picks_up_detail_at_coarse_mips() {
    let mut texels = vec![LinearColor::rgb(0.0, 0.0, 0.0); 2 * 2 * 6];
    texels[0] = LinearColor::rgb(4.0, 4.0, 4.0);
    let sky = SkyLight::new(white_light(), true, texels, SHVectorRGB3::default());
    // +X face, coarsest mip averages one bright texel with three dark ones
    assert!(sky.get_path_variance(Vec3(1.0, 0.0, 0.0), 4.0 * PI) > 0.0);
    assert_eq!(sky.get_path_variance(Vec3(0.0, 1.0, 0.0), 4.0 * PI), 0.0);
}

#[test]
fn sky_without_cubemap_is_black_and_sh_is_used_unfiltered() {
    let empty = constant_sky(0, 1.0, true);
    assert!(empty.get_path_lighting(Vec3(0.0, 0.0, 1.0), 0.1, false).is_black());

    let mut sh = SHVectorRGB3::default();
    sh.r.v[0] = 1.0 / 0.282095;
    sh.g.v[0] = 1.0 / 0.282095;
    sh.b.v[0] = 1.0 / 0.282095;
    let sky = SkyLight::new(white_light(), false, vec![LinearColor::BLACK; 6], sh);
    let lighting = sky.get_path_lighting(Vec3(0.0, 1.0, 0.0), 0.1, false);
    assert_relative_eq!(lighting.g, 1.0, max_relative = 1e-5);
    assert_eq!(sky.get_path_variance(Vec3(0.0, 1.0, 0.0), 0.1), 0.0);
}

#[test]
fn cube_faces_follow_the_dominant_axis() {
    let (face, uv) = sky::cube_face_and_uv(Vec3(1.0, 0.0, 0.0));
    assert_eq!(face, 0);
    assert_abs_diff_eq!(uv.0, 0.5);
    assert_abs_diff_eq!(uv.1, 0.5);
    assert_eq!(sky::cube_face_and_uv(Vec3(0.0, -1.0, 0.0)).0, 3);
    assert_eq!(sky::cube_face_and_uv(Vec3(0.1, 0.2, -0.9)).0, 5);
    // edges snap inside the face
    let (_, uv) = sky::cube_face_and_uv(Vec3::normalized(Vec3(1.0, -1.0, 0.0)));
    assert!(uv.1 < 1.0);
}

#[test]
#[should_panic]
fn sky_direction_sampling_is_unsupported() {
    let light = Light::Sky(constant_sky(1, 1.0, true));
    light.sample_direction(&mut RandomStream::new(0), &LightingCalibration::default());
}

fn square_primitive(x_offset: f32, area: f32) -> MeshLightPrimitive {
    let side = area.sqrt();
    let texel = TexelCorners {
        corners: [
            Vec3(x_offset, 0.0, 0.0),
            Vec3(x_offset + side, 0.0, 0.0),
            Vec3(x_offset, side, 0.0),
            Vec3(x_offset + side, side, 0.0),
        ],
        world_tangent_z: Vec3(0.0, 0.0, 1.0),
    };
    let mut primitive = MeshLightPrimitive::new();
    primitive.add_sub_primitive(&texel, (0, 0), LinearColor::WHITE, 0.0);
    primitive.finalize();
    primitive
}

fn mesh_light(areas: &[f32]) -> MeshAreaLight {
    let primitives = areas
        .iter()
        .enumerate()
        .map(|(i, area)| square_primitive(100.0 * i as f32, *area))
        .collect();
    MeshAreaLight::new(Guid::default(), primitives, 2.0, 0.0, 8)
}

#[test]
fn mesh_area_primitive_selection_is_area_proportional() {
    let light = mesh_light(&[1.0, 2.0, 7.0]);
    let mut rng = RandomStream::new(1234);
    let draws = 20_000;
    let mut counts = [0usize; 3];
    for _ in 0..draws {
        let sample = light.sample_light_surface(&mut rng);
        let index = (sample.position.0 / 100.0).floor() as usize;
        counts[index] += 1;
        assert_relative_eq!(sample.pdf, 1.0 / 10.0, max_relative = 1e-4);
    }
    for (count, expected) in counts.iter().zip([0.1, 0.2, 0.7]) {
        assert_abs_diff_eq!(*count as f32 / draws as f32, expected, epsilon = 0.015);
    }
}

#[test]
fn mesh_light_primitive_merges_texels() {
    let mut primitive = MeshLightPrimitive::new();
    for x in 0..2 {
        let base = x as f32;
        let texel = TexelCorners {
            corners: [
                Vec3(base, 0.0, 0.0),
                Vec3(base + 1.0, 0.0, 0.0),
                Vec3(base, 1.0, 0.0),
                Vec3(base + 1.0, 1.0, 0.0),
            ],
            world_tangent_z: Vec3(0.0, 0.0, 1.0),
        };
        primitive.add_sub_primitive(&texel, (x, 0), LinearColor::rgb(2.0, 2.0, 2.0), 0.5);
    }
    primitive.finalize();

    assert_eq!(primitive.num_sub_primitives, 2);
    assert_relative_eq!(primitive.surface_area, 2.0);
    assert_relative_eq!(primitive.power.r, 4.0);
    assert_relative_eq!(primitive.surface_normal.2, 1.0);
    // left corners keep the first texel, right corners the second
    assert_relative_eq!(primitive.corner(0).0, 0.0);
    assert_relative_eq!(primitive.corner(1).0, 2.0);
    assert_relative_eq!(primitive.corner(3).0, 2.0);
    assert_relative_eq!(primitive.corner(0).2, 0.5);
}

#[test]
fn mesh_area_directions_leave_the_front_face() {
    let light = mesh_light(&[4.0]);
    let calibration = LightingCalibration::default();
    let mut rng = RandomStream::new(77);
    for _ in 0..200 {
        let sample = light.sample_direction(&mut rng, &calibration);
        assert!(sample.ray.direction.2 > 0.0);
        assert_relative_eq!(sample.pdf, 1.0 / (2.0 * PI), max_relative = 1e-5);
        assert_relative_eq!(sample.power.r, 2.5, max_relative = 1e-5);
    }
}

#[test]
fn mesh_area_direction_retries_fall_back_to_the_normal() {
    let light = mesh_light(&[4.0]);
    let calibration = LightingCalibration { mesh_area_light_max_direction_retries: 0, ..Default::default() };
    let sample = light.sample_direction(&mut RandomStream::new(2), &calibration);
    let direction = Vec3::normalized(sample.ray.direction);
    assert_relative_eq!(direction.2, 1.0, max_relative = 1e-5);
}

#[test]
fn mesh_area_influence_radius_and_bounds() {
    let light = mesh_light(&[1.0]);
    let expected = (LinearColor::WHITE.linear_rgb_to_xyz().g / 0.002).sqrt();
    assert_relative_eq!(light.influence_radius(), expected, max_relative = 1e-5);

    let far = BoxSphereBounds::new(Vec3(0.0, 0.0, 1000.0), Vec3(1.0, 1.0, 1.0), 1.0);
    let near = BoxSphereBounds::new(Vec3(0.0, 0.0, 5.0), Vec3(1.0, 1.0, 1.0), 1.0);
    assert!(!light.affects_bounds(&far));
    assert!(light.affects_bounds(&near));
}

#[test]
fn mesh_area_conditioned_pdf_uses_clamped_cone() {
    let mut light = mesh_light(&[4.0]);
    light.initialize(0.1, bounds(Vec3::ZERO, 1000.0));
    let up = Vec3(0.0, 0.0, 1.0);
    let paths = [IndirectPathRay::new(Vec3::ZERO, up, up, Vec2::default(), 10.0)];
    let sample = light.sample_direction_from_paths(&paths, &mut RandomStream::new(8), &LightingCalibration::default());
    let cos_cone = f32::max(0.1f32.cos(), f32::min(crate::geometry::DELTA, 1.0));
    assert_relative_eq!(sample.pdf, crate::sampling::uniform_cone_pdf(cos_cone), max_relative = 1e-5);
    assert!(sample.ray.direction.2 > 0.0);
}

#[test]
#[should_panic]
fn mesh_area_light_needs_primitives() {
    MeshAreaLight::new(Guid::default(), Vec::new(), 2.0, 0.0, 4);
}

#[test]
fn indirect_color_uses_saturation_and_scale() {
    let mut data = LightData::new(Guid::default(), LinearColor::rgb(1.0, 0.0, 0.0), 1.0);
    data.indirect_lighting_saturation = 0.0;
    data.indirect_lighting_scale = 2.0;
    data.update_indirect_color();
    let indirect = data.indirect_color();
    assert_relative_eq!(indirect.r, 2.0, max_relative = 1e-5);
    assert_relative_eq!(indirect.g, 2.0, max_relative = 1e-5);

    let direct = data.direct_intensity(Vec3(0.0, 0.0, -1.0), false);
    assert_relative_eq!(direct.r, 1.0);
    assert_eq!(direct.g, 0.0);
}

#[test]
fn light_profile_interpolates_by_angle() {
    let mut data = white_light();
    data.flags |= LightFlags::USE_LIGHT_PROFILE;
    data.light_profile = vec![255, 0];
    assert_relative_eq!(data.light_profile_multiplier(1.0), 1.0);
    assert_abs_diff_eq!(data.light_profile_multiplier(0.0), 0.5, epsilon = 1e-3);
    assert_abs_diff_eq!(data.light_profile_multiplier(-1.0), 0.0, epsilon = 1e-6);

    data.flags.remove(LightFlags::USE_LIGHT_PROFILE);
    assert_eq!(data.light_profile_multiplier(-1.0), 1.0);
}

#[test]
fn surface_sample_cache_is_keyed_by_light_and_bounce() {
    let mut data = white_light();
    data.light_source_radius = 1.0;
    let light = Light::Point(PointLight::new(data, 100.0, 2.0));
    let mut cache = LightSurfaceSampleCache::new();
    let mut rng = RandomStream::new(6);

    cache.cache_surface_samples(3, &light, 0, 8, 0, &mut rng);
    cache.cache_surface_samples(3, &light, 1, 4, 2, &mut rng);

    assert_eq!(cache.cached_surface_samples(3, 0, false).len(), 8);
    assert!(cache.cached_surface_samples(3, 0, true).is_empty());
    assert_eq!(cache.cached_surface_samples(3, 1, false).len(), 4);
    assert_eq!(cache.cached_surface_samples(3, 1, true).len(), 2);
    assert!(cache.cached_surface_samples(0, 0, false).is_empty());
}

#[test]
fn point_validation_mirrors_samples_towards_the_receiver() {
    let mut data = white_light();
    data.light_source_radius = 1.0;
    let light = PointLight::new(data, 100.0, 2.0);
    let mut sample = LightSurfaceSample::new(Vec3(-1.0, 0.0, 0.0), Vec3(-1.0, 0.0, 0.0), Vec2::default(), 1.0);
    light.validate_surface_sample(Vec3(10.0, 0.0, 0.0), &mut sample);
    assert_relative_eq!(sample.position.0, 1.0);

    // receiver inside twice the source radius pulls the sample in
    let mut close = LightSurfaceSample::new(Vec3(1.0, 0.0, 0.0), Vec3(1.0, 0.0, 0.0), Vec2::default(), 1.0);
    light.validate_surface_sample(Vec3(1.0, 0.0, 0.0), &mut close);
    assert_relative_eq!(close.position.0, 0.5);
}
