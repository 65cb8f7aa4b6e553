use std::f32::consts::PI;

use crate::geometry::{Vec2, Vec3, SMALL_NUMBER};

use super::RandomStream;

/// Orthonormal x and y axes completing `z_axis`.
pub fn generate_coordinate_system(z_axis: Vec3) -> (Vec3, Vec3) {
    let x_axis = if z_axis.0.abs() > z_axis.1.abs() {
        let inverse_length = 1.0 / (z_axis.0 * z_axis.0 + z_axis.2 * z_axis.2).sqrt();
        Vec3(-z_axis.2 * inverse_length, 0.0, z_axis.0 * inverse_length)
    } else {
        let inverse_length = 1.0 / (z_axis.1 * z_axis.1 + z_axis.2 * z_axis.2).sqrt();
        Vec3(0.0, z_axis.2 * inverse_length, -z_axis.1 * inverse_length)
    };
    let y_axis = Vec3::cross(z_axis, x_axis);
    (x_axis, y_axis)
}

/// Uniformly distributed point inside the unit sphere.
pub fn unit_sphere_position(rng: &mut RandomStream) -> Vec3 {
    loop {
        let p = Vec3(
            2.0 * rng.fraction() - 1.0,
            2.0 * rng.fraction() - 1.0,
            2.0 * rng.fraction() - 1.0,
        );
        let square_magnitude = p.square_magnitude();
        if square_magnitude <= 1.0 && square_magnitude > SMALL_NUMBER {
            return p;
        }
    }
}

/// Uniformly distributed direction.
pub fn unit_vector(rng: &mut RandomStream) -> Vec3 {
    Vec3::normalized(unit_sphere_position(rng))
}

/// Uniformly distributed point on the unit disk.
pub fn uniform_unit_disk_position(rng: &mut RandomStream) -> Vec2 {
    loop {
        let p = Vec2(2.0 * rng.fraction() - 1.0, 2.0 * rng.fraction() - 1.0);
        if p.square_magnitude() <= 1.0 {
            return p;
        }
    }
}

/// Direction uniformly distributed over the cone around `z_axis` with half angle acos(cos_max_cone_theta).
pub fn uniform_sample_cone(
    rng: &mut RandomStream,
    cos_max_cone_theta: f32,
    x_axis: Vec3,
    y_axis: Vec3,
    z_axis: Vec3,
) -> Vec3 {
    let cos_theta = cos_max_cone_theta + (1.0 - cos_max_cone_theta) * rng.fraction();
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = rng.fraction() * 2.0 * PI;
    phi.cos() * sin_theta * x_axis + phi.sin() * sin_theta * y_axis + cos_theta * z_axis
}

pub fn uniform_cone_pdf(cos_max_cone_theta: f32) -> f32 {
    1.0 / (2.0 * PI * (1.0 - cos_max_cone_theta))
}

/// Piecewise constant distribution over `n` equally wide buckets.
#[derive(Clone, Debug, Default)]
pub struct Step1dCdf {
    pdfs: Vec<f32>,
    cdfs: Vec<f32>,
    unnormalized_integral: f32,
}

impl Step1dCdf {
    pub fn new(pdfs: Vec<f32>) -> Step1dCdf {
        assert!(!pdfs.is_empty(), "step function needs at least one bucket");
        let mut cdfs = Vec::with_capacity(pdfs.len());
        let mut running = 0.0;
        cdfs.push(0.0);
        for pdf in &pdfs[..pdfs.len() - 1] {
            running += pdf;
            cdfs.push(running);
        }
        let unnormalized_integral = running + pdfs[pdfs.len() - 1];
        if unnormalized_integral > 0.0 {
            for cdf in cdfs.iter_mut().skip(1) {
                *cdf /= unnormalized_integral;
            }
        }
        Step1dCdf { pdfs, cdfs, unnormalized_integral }
    }

    pub fn len(&self) -> usize {
        self.pdfs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pdfs.is_empty()
    }

    pub fn unnormalized_integral(&self) -> f32 {
        self.unnormalized_integral
    }

    /// Picks a bucket with probability proportional to its weight.
    pub fn sample(&self, rng: &mut RandomStream) -> Step1dSample {
        let value = rng.fraction();
        let count = self.pdfs.len();
        if self.unnormalized_integral <= 0.0 {
            let index = ((value * count as f32) as usize).min(count - 1);
            return Step1dSample { index, probability: 1.0 / count as f32, fraction: value };
        }

        // last bucket whose start is <= value, which skips empty buckets
        let index = self.cdfs.partition_point(|cdf| *cdf <= value).saturating_sub(1);
        let start = self.cdfs[index];
        let end = self.cdfs.get(index + 1).copied().unwrap_or(1.0);
        let offset = if end > start { (value - start) / (end - start) } else { 0.0 };

        Step1dSample {
            index,
            probability: self.pdfs[index] / self.unnormalized_integral,
            fraction: (index as f32 + offset) / count as f32,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step1dSample {
    pub index: usize,
    /// Discrete probability of having picked `index`.
    pub probability: f32,
    /// Continuous position of the sample in [0, 1].
    pub fraction: f32,
}
