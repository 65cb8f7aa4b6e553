use std::f32::consts::PI;

use tracing::debug;

use crate::color::{LinearColor, SHVector3, SHVectorRGB3};
use crate::geometry::{Vec2, Vec3};

use super::LightData;

/// Distant environment lighting, queried per path instead of point sampled.
///
/// Radiance comes from a prefiltered cubemap mip chain, or from third order SH when filtering is off.
#[derive(Clone, Debug)]
pub struct SkyLight {
    pub data: LightData,
    pub use_filtered_cubemap: bool,
    pub irradiance_environment_map: SHVectorRGB3,
    cubemap_size: usize,
    num_mips: usize,
    prefiltered_radiance: Vec<Vec<LinearColor>>,
    prefiltered_variance: Vec<Vec<f32>>,
}

impl SkyLight {
    /// `radiance` holds six square faces, face major, finest mip only.
    ///
    /// # Panics
    /// When `radiance` is not six square power of two faces.
    pub fn new(
        data: LightData,
        use_filtered_cubemap: bool,
        radiance: Vec<LinearColor>,
        irradiance_environment_map: SHVectorRGB3,
    ) -> SkyLight {
        let cubemap_size = Self::cubemap_size_for(radiance.len())
            .unwrap_or_else(|| panic!("{} texels do not form a power of two cubemap", radiance.len()));
        let num_mips = ceil_log_two(cubemap_size) + 1;

        let mut light = SkyLight {
            data,
            use_filtered_cubemap,
            irradiance_environment_map,
            cubemap_size,
            num_mips,
            prefiltered_radiance: Vec::new(),
            prefiltered_variance: Vec::new(),
        };

        if use_filtered_cubemap && cubemap_size > 0 {
            light.prefilter_radiance(radiance);
            light.compute_prefiltered_variance();
            debug!(cubemap_size, num_mips, "prefiltered sky light cubemap");
        }
        light
    }

    /// Face size for a texel count, when it describes a valid cubemap.
    pub fn cubemap_size_for(texel_count: usize) -> Option<usize> {
        let size = ((texel_count / 6) as f64).sqrt() as usize;
        let valid = size * size * 6 == texel_count && (size == 0 || size.is_power_of_two());
        valid.then_some(size)
    }

    pub fn radiance_cubemap_size(&self) -> usize {
        self.cubemap_size
    }

    pub fn num_mips(&self) -> usize {
        self.num_mips
    }

    fn mip_size(&self, mip_index: usize) -> usize {
        1 << (self.num_mips - mip_index - 1)
    }

    fn prefilter_radiance(&mut self, radiance: Vec<LinearColor>) {
        self.prefiltered_radiance = Vec::with_capacity(self.num_mips);
        self.prefiltered_radiance.push(radiance);

        for mip_index in 1..self.num_mips {
            let mip_size = self.mip_size(mip_index);
            let parent_size = mip_size * 2;
            let parent = &self.prefiltered_radiance[mip_index - 1];
            let mut mip = vec![LinearColor::new(0.0, 0.0, 0.0, 0.0); mip_size * mip_size * 6];

            for face in 0..6 {
                for y in 0..mip_size {
                    for x in 0..mip_size {
                        let mut filtered = LinearColor::new(0.0, 0.0, 0.0, 0.0);
                        for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                            let parent_index =
                                face * parent_size * parent_size + (y * 2 + dy) * parent_size + (x * 2 + dx);
                            filtered += parent[parent_index];
                        }
                        mip[face * mip_size * mip_size + y * mip_size + x] = filtered * 0.25;
                    }
                }
            }
            self.prefiltered_radiance.push(mip);
        }
    }

    /// Luminance variance of the finest mip texels under each coarser texel.
    fn compute_prefiltered_variance(&mut self) {
        let base = &self.prefiltered_radiance[0];
        let size = self.cubemap_size;
        let mut variance = Vec::with_capacity(self.num_mips);

        for mip_index in 0..self.num_mips {
            let mip_size = self.mip_size(mip_index);
            let base_texels_per_texel = size / mip_size;
            let normalize = 1.0 / (base_texels_per_texel * base_texels_per_texel).saturating_sub(1).max(1) as f32;
            let radiance = &self.prefiltered_radiance[mip_index];
            let mut mip = vec![0.0; mip_size * mip_size * 6];

            for face in 0..6 {
                for y in 0..mip_size {
                    for x in 0..mip_size {
                        let texel_index = face * mip_size * mip_size + y * mip_size + x;
                        let mean = radiance[texel_index].luminance();
                        let base_offset =
                            face * size * size + x * base_texels_per_texel + y * base_texels_per_texel * size;

                        let mut sum_of_squares = 0.0;
                        for base_y in 0..base_texels_per_texel {
                            for base_x in 0..base_texels_per_texel {
                                let value = base[base_offset + base_y * size + base_x].luminance();
                                sum_of_squares += (value - mean) * (value - mean);
                            }
                        }
                        mip[texel_index] = sum_of_squares * normalize;
                    }
                }
            }
            variance.push(mip);
        }
        self.prefiltered_variance = variance;
    }

    /// Mip whose texels cover roughly `solid_angle`, fractional.
    pub fn mip_index_for_solid_angle(&self, solid_angle: f32) -> f32 {
        let size = self.cubemap_size as f32;
        let average_texel_solid_angle = 4.0 * PI / (6.0 * size * size) * 2.0;
        let mip = 0.5 * (solid_angle / average_texel_solid_angle).log2();
        mip.clamp(0.0, (self.num_mips - 1) as f32)
    }

    pub fn get_path_lighting(&self, incoming_direction: Vec3, path_solid_angle: f32, for_indirect: bool) -> LinearColor {
        if self.cubemap_size == 0 {
            return LinearColor::BLACK;
        }

        let lighting = if self.use_filtered_cubemap {
            let (face, uv) = cube_face_and_uv(incoming_direction);
            let mip = self.mip_index_for_solid_angle(path_solid_angle);
            sample_mips(mip, |mip_index| {
                bilinear(&self.prefiltered_radiance[mip_index], self.mip_size(mip_index), face, uv, |c| *c)
            })
        } else {
            self.irradiance_environment_map
                .dot(&SHVector3::basis_function(incoming_direction))
        };

        let scale = if for_indirect { self.data.indirect_lighting_scale } else { 1.0 };
        ((lighting * (self.data.brightness * scale)) * self.data.color).clamp_non_negative()
    }

    /// Zero without a filtered cubemap.
    pub fn get_path_variance(&self, incoming_direction: Vec3, path_solid_angle: f32) -> f32 {
        if self.cubemap_size == 0 || !self.use_filtered_cubemap {
            return 0.0;
        }
        let (face, uv) = cube_face_and_uv(incoming_direction);
        let mip = self.mip_index_for_solid_angle(path_solid_angle);
        sample_mips(mip, |mip_index| {
            bilinear(&self.prefiltered_variance[mip_index], self.mip_size(mip_index), face, uv, |v| {
                LinearColor::rgb(*v, 0.0, 0.0)
            })
        })
        .r
    }
}

fn ceil_log_two(value: usize) -> usize {
    if value <= 1 {
        0
    } else {
        (usize::BITS - (value - 1).leading_zeros()) as usize
    }
}

fn sample_mips(mip: f32, sample: impl Fn(usize) -> LinearColor) -> LinearColor {
    let low = sample(mip.floor() as usize);
    let high = sample(mip.ceil() as usize);
    LinearColor::lerp(low, high, mip.fract())
}

/// Bilinear tap within one face, clamped to that face's edges.
fn bilinear<T>(texels: &[T], mip_size: usize, face: usize, uv: Vec2, to_color: impl Fn(&T) -> LinearColor) -> LinearColor {
    let max_coordinate = (mip_size - 1) as f32;
    let x = (uv.0 * mip_size as f32 - 0.5).clamp(0.0, max_coordinate);
    let y = (uv.1 * mip_size as f32 - 0.5).clamp(0.0, max_coordinate);
    let (x0, y0) = (x.floor() as usize, y.floor() as usize);
    let (x1, y1) = ((x0 + 1).min(mip_size - 1), (y0 + 1).min(mip_size - 1));
    let (fx, fy) = (x - x0 as f32, y - y0 as f32);

    let face_offset = face * mip_size * mip_size;
    let texel = |tx: usize, ty: usize| to_color(&texels[face_offset + ty * mip_size + tx]);
    let top = LinearColor::lerp(texel(x0, y0), texel(x1, y0), fx);
    let bottom = LinearColor::lerp(texel(x0, y1), texel(x1, y1), fx);
    LinearColor::lerp(top, bottom, fy)
}

/// Cube face (+X, -X, +Y, -Y, +Z, -Z) and face UV in [0, 1) for a direction.
pub(crate) fn cube_face_and_uv(direction: Vec3) -> (usize, Vec2) {
    let abs = direction.abs();
    let mut largest = 0;
    if abs.1 > abs.0 {
        largest = 1;
    }
    if abs.2 > abs.1 && abs.2 > abs.0 {
        largest = 2;
    }

    let face = largest * 2 + usize::from(direction[largest] < 0.0);
    let Vec3(x, y, z) = direction;
    let uv = match face {
        0 => Vec2(-z, -y),
        1 => Vec2(z, -y),
        2 => Vec2(x, z),
        3 => Vec2(x, -z),
        4 => Vec2(x, -y),
        _ => Vec2(-x, -y),
    };
    let uv = uv / abs[largest] * 0.5 + Vec2(0.5, 0.5);
    // exactly on an edge snaps to the last addressable texel
    (face, Vec2(uv.0.min(0.999), uv.1.min(0.999)))
}
