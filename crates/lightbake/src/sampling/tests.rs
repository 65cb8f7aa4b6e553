use approx::assert_abs_diff_eq;

use super::*;
use crate::geometry::Vec3;

#[test]
fn coordinate_system_is_orthonormal() {
    for z in [Vec3(0.0, 0.0, 1.0), Vec3(1.0, 0.0, 0.0), Vec3::normalized(Vec3(0.3, -0.8, 0.2))] {
        let (x, y) = generate_coordinate_system(z);
        assert_abs_diff_eq!(x.length(), 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(y.length(), 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(Vec3::dot(x, z), 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(Vec3::dot(y, z), 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(Vec3::dot(x, y), 0.0, epsilon = 1e-5);
    }
}

#[test]
fn cone_samples_stay_inside_cone() {
    let mut rng = RandomStream::new(3);
    let z = Vec3::normalized(Vec3(1.0, 1.0, 0.0));
    let (x, y) = generate_coordinate_system(z);
    let cos_max = 0.9;
    for _ in 0..1000 {
        let d = uniform_sample_cone(&mut rng, cos_max, x, y, z);
        assert_abs_diff_eq!(d.length(), 1.0, epsilon = 1e-4);
        assert!(Vec3::dot(d, z) >= cos_max - 1e-5);
    }
    assert_abs_diff_eq!(uniform_cone_pdf(-1.0), 1.0 / (4.0 * std::f32::consts::PI));
}

#[test]
fn step_cdf_skips_empty_buckets() {
    let cdf = Step1dCdf::new(vec![0.0, 3.0, 0.0, 1.0]);
    assert_abs_diff_eq!(cdf.unnormalized_integral(), 4.0);
    let mut rng = RandomStream::new(11);
    let mut counts = [0usize; 4];
    for _ in 0..4000 {
        let sample = cdf.sample(&mut rng);
        counts[sample.index] += 1;
        let expected = if sample.index == 1 { 0.75 } else { 0.25 };
        assert_abs_diff_eq!(sample.probability, expected);
        assert!(sample.fraction >= sample.index as f32 / 4.0);
        assert!(sample.fraction <= (sample.index + 1) as f32 / 4.0);
    }
    assert_eq!(counts[0], 0);
    assert_eq!(counts[2], 0);
    assert!((counts[1] as f32 / 4000.0 - 0.75).abs() < 0.03);
}

#[test]
fn unit_vectors_cover_both_hemispheres() {
    let mut rng = RandomStream::new(5);
    let mut up = 0;
    for _ in 0..2000 {
        let v = unit_vector(&mut rng);
        assert_abs_diff_eq!(v.length(), 1.0, epsilon = 1e-4);
        if v.2 > 0.0 {
            up += 1;
        }
    }
    assert!((up as f32 / 2000.0 - 0.5).abs() < 0.05);
}
