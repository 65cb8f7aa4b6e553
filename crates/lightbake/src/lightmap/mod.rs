//! Per texel lighting in the form the light map encoder stores, and its 8 bit quantization.

#[cfg(test)]
mod tests;

use crate::color::{sh2_basis_function, LinearColor};
use crate::geometry::Vec3;

/// Luminance offset of the log encoding of the L0 band; keeps black finite.
pub const LOG_BLACK_POINT: f32 = 0.01858136;

pub const NUM_STORED_COEFFICIENTS: usize = 2;

/// Lighting gathered for one texel, before conversion to the stored form.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GatheredLightMapSample {
    /// Second order SH of the incident lighting, one set per RGB channel.
    pub sh: [[f32; 4]; 3],
    pub sky_occlusion: Vec3,
    pub ao_material_mask: f32,
    pub is_mapped: bool,
}

impl GatheredLightMapSample {
    /// Light of `color` arriving from `direction`.
    pub fn directional(color: LinearColor, direction: Vec3) -> GatheredLightMapSample {
        let basis = sh2_basis_function(direction);
        GatheredLightMapSample {
            sh: [basis.map(|b| b * color.r), basis.map(|b| b * color.g), basis.map(|b| b * color.b)],
            is_mapped: true,
            ..GatheredLightMapSample::default()
        }
    }

    pub fn add_weighted(&mut self, other: &GatheredLightMapSample, weight: f32) {
        for (channel, other_channel) in self.sh.iter_mut().zip(other.sh.iter()) {
            for (value, other_value) in channel.iter_mut().zip(other_channel.iter()) {
                *value += other_value * weight;
            }
        }
        self.sky_occlusion += other.sky_occlusion * weight;
        self.ao_material_mask += other.ao_material_mask * weight;
    }

    fn band_luminance(&self, band: usize) -> f32 {
        LinearColor::rgb(self.sh[0][band], self.sh[1][band], self.sh[2][band]).luminance()
    }

    /// Converts to two coefficients: log encoded L0 colour, then L1 luminance relative to L0.
    pub fn to_light_sample(&self) -> LightSample {
        let luminance = self.band_luminance(0);
        let mut coefficients = [[0.0; 4]; NUM_STORED_COEFFICIENTS];

        if luminance > 0.0 {
            let inverse = 1.0 / luminance;
            coefficients[0] = [
                self.sh[0][0] * inverse,
                self.sh[1][0] * inverse,
                self.sh[2][0] * inverse,
                (luminance + LOG_BLACK_POINT).log2() - LOG_BLACK_POINT.log2(),
            ];
            for band in 1..4 {
                let relative = (self.band_luminance(band) * inverse).clamp(-1.0, 1.0);
                coefficients[1][band - 1] = relative * 0.5 + 0.5;
            }
        } else {
            coefficients[1] = [0.5, 0.5, 0.5, 0.0];
        }

        LightSample {
            coefficients,
            sky_occlusion: self.sky_occlusion,
            ao_material_mask: self.ao_material_mask,
            is_mapped: self.is_mapped,
        }
    }
}

/// The stored form of one texel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LightSample {
    pub coefficients: [[f32; 4]; NUM_STORED_COEFFICIENTS],
    pub sky_occlusion: Vec3,
    pub ao_material_mask: f32,
    pub is_mapped: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LightMapData2D {
    pub size_x: usize,
    pub size_y: usize,
    samples: Vec<LightSample>,
}

impl LightMapData2D {
    pub fn new(size_x: usize, size_y: usize) -> LightMapData2D {
        LightMapData2D { size_x, size_y, samples: vec![LightSample::default(); size_x * size_y] }
    }

    /// # Panics
    /// When `gathered` does not hold `size_x * size_y` samples.
    pub fn from_gathered(size_x: usize, size_y: usize, gathered: &[GatheredLightMapSample]) -> LightMapData2D {
        assert_eq!(gathered.len(), size_x * size_y, "sample count does not match light map size");
        LightMapData2D { size_x, size_y, samples: gathered.iter().map(|sample| sample.to_light_sample()).collect() }
    }

    pub fn get(&self, x: usize, y: usize) -> &LightSample {
        &self.samples[y * self.size_x + x]
    }

    pub fn samples(&self) -> &[LightSample] {
        &self.samples
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QuantizeSettings {
    /// Also store sky occlusion and the AO material mask.
    pub has_sky_shadowing: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QuantizedTexel {
    pub coefficients: [[u8; 4]; NUM_STORED_COEFFICIENTS],
    /// 255 where the texel is mapped, 0 elsewhere.
    pub coverage: u8,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuantizedLightmapData {
    pub size_x: usize,
    pub size_y: usize,
    /// Decoded value = byte / 255 * scale + add.
    pub scale: [[f32; 4]; NUM_STORED_COEFFICIENTS],
    pub add: [[f32; 4]; NUM_STORED_COEFFICIENTS],
    pub texels: Vec<QuantizedTexel>,
    /// Sky occlusion remapped from [-1, 1] in xyz and the AO mask in w.
    pub sky_occlusion: Option<Vec<[u8; 4]>>,
}

fn quantize_unit(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

pub fn quantize(light_map: &LightMapData2D, settings: &QuantizeSettings) -> QuantizedLightmapData {
    let mut min = [[f32::MAX; 4]; NUM_STORED_COEFFICIENTS];
    let mut max = [[f32::MIN; 4]; NUM_STORED_COEFFICIENTS];
    for sample in light_map.samples.iter().filter(|sample| sample.is_mapped) {
        for coefficient in 0..NUM_STORED_COEFFICIENTS {
            for channel in 0..4 {
                let value = sample.coefficients[coefficient][channel];
                min[coefficient][channel] = min[coefficient][channel].min(value);
                max[coefficient][channel] = max[coefficient][channel].max(value);
            }
        }
    }

    let mut scale = [[0.0; 4]; NUM_STORED_COEFFICIENTS];
    let mut add = [[0.0; 4]; NUM_STORED_COEFFICIENTS];
    for coefficient in 0..NUM_STORED_COEFFICIENTS {
        for channel in 0..4 {
            // nothing mapped
            if min[coefficient][channel] > max[coefficient][channel] {
                min[coefficient][channel] = 0.0;
                max[coefficient][channel] = 0.0;
            }
            scale[coefficient][channel] = (max[coefficient][channel] - min[coefficient][channel]).max(1e-6);
            add[coefficient][channel] = min[coefficient][channel];
        }
    }

    let texels = light_map
        .samples
        .iter()
        .map(|sample| {
            if !sample.is_mapped {
                return QuantizedTexel::default();
            }
            let mut texel = QuantizedTexel { coverage: 255, ..QuantizedTexel::default() };
            for coefficient in 0..NUM_STORED_COEFFICIENTS {
                for channel in 0..4 {
                    let value = sample.coefficients[coefficient][channel];
                    texel.coefficients[coefficient][channel] =
                        quantize_unit((value - add[coefficient][channel]) / scale[coefficient][channel]);
                }
            }
            texel
        })
        .collect();

    let sky_occlusion = settings.has_sky_shadowing.then(|| {
        light_map
            .samples
            .iter()
            .map(|sample| {
                let Vec3(x, y, z) = sample.sky_occlusion;
                [
                    quantize_unit(x * 0.5 + 0.5),
                    quantize_unit(y * 0.5 + 0.5),
                    quantize_unit(z * 0.5 + 0.5),
                    quantize_unit(sample.ao_material_mask),
                ]
            })
            .collect()
    });

    QuantizedLightmapData { size_x: light_map.size_x, size_y: light_map.size_y, scale, add, texels, sky_occlusion }
}

impl QuantizedLightmapData {
    /// Stored coefficients of the texel, or `None` where nothing is mapped.
    pub fn dequantize_texel(&self, x: usize, y: usize) -> Option<[[f32; 4]; NUM_STORED_COEFFICIENTS]> {
        let texel = &self.texels[y * self.size_x + x];
        if texel.coverage == 0 {
            return None;
        }
        let mut coefficients = [[0.0; 4]; NUM_STORED_COEFFICIENTS];
        for coefficient in 0..NUM_STORED_COEFFICIENTS {
            for channel in 0..4 {
                let unit = texel.coefficients[coefficient][channel] as f32 / 255.0;
                coefficients[coefficient][channel] = unit * self.scale[coefficient][channel] + self.add[coefficient][channel];
            }
        }
        Some(coefficients)
    }
}
