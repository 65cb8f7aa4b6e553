use approx::assert_abs_diff_eq;

use super::*;

fn sample(color: LinearColor, direction: Vec3) -> GatheredLightMapSample {
    GatheredLightMapSample::directional(color, direction)
}

#[test]
fn l0_is_chroma_and_log_luminance() {
    let stored = sample(LinearColor::rgb(2.0, 1.0, 0.5), Vec3::UP).to_light_sample();
    let l0 = 0.282095;
    let luminance = (2.0 * 0.3 + 0.59 + 0.5 * 0.11) * l0;

    assert_abs_diff_eq!(stored.coefficients[0][0], 2.0 * l0 / luminance, epsilon = 1e-5);
    assert_abs_diff_eq!(stored.coefficients[0][1], l0 / luminance, epsilon = 1e-5);
    assert_abs_diff_eq!(
        stored.coefficients[0][3],
        (luminance + LOG_BLACK_POINT).log2() - LOG_BLACK_POINT.log2(),
        epsilon = 1e-5
    );
    assert!(stored.is_mapped);
}

#[test]
fn l1_is_relative_luminance_in_unit_range() {
    // light from +Z only feeds the second L1 band
    let stored = sample(LinearColor::WHITE, Vec3::UP).to_light_sample();
    assert_abs_diff_eq!(stored.coefficients[1][0], 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(stored.coefficients[1][1], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(stored.coefficients[1][2], 0.5, epsilon = 1e-6);

    let from_below = sample(LinearColor::WHITE, Vec3(0.0, 0.0, -1.0)).to_light_sample();
    assert_abs_diff_eq!(from_below.coefficients[1][1], 0.0, epsilon = 1e-6);
}

#[test]
fn black_texels_store_zero() {
    let stored = GatheredLightMapSample::default().to_light_sample();
    assert_eq!(stored.coefficients[0], [0.0; 4]);
    assert!(!stored.is_mapped);
}

#[test]
fn add_weighted_accumulates_lighting() {
    let mut total = GatheredLightMapSample::default();
    total.add_weighted(&sample(LinearColor::WHITE, Vec3::UP), 0.5);
    total.add_weighted(&sample(LinearColor::WHITE, Vec3::UP), 0.5);
    let single = sample(LinearColor::WHITE, Vec3::UP);
    for channel in 0..3 {
        for band in 0..4 {
            assert_abs_diff_eq!(total.sh[channel][band], single.sh[channel][band], epsilon = 1e-6);
        }
    }
}

fn light_map() -> LightMapData2D {
    let mut unmapped = sample(LinearColor::rgb(100.0, 0.0, 0.0), Vec3::UP);
    unmapped.is_mapped = false;
    let mut shadowed = sample(LinearColor::rgb(0.1, 0.2, 0.3), Vec3(1.0, 0.0, 0.0));
    shadowed.sky_occlusion = Vec3(0.0, 0.0, 1.0);
    shadowed.ao_material_mask = 1.0;
    LightMapData2D::from_gathered(
        2,
        2,
        &[
            sample(LinearColor::rgb(1.0, 1.0, 1.0), Vec3::UP),
            sample(LinearColor::rgb(4.0, 2.0, 1.0), Vec3(0.0, 1.0, 0.0)),
            shadowed,
            unmapped,
        ],
    )
}

#[test]
fn texels_are_row_major() {
    let light_map = light_map();
    assert_eq!(*light_map.get(1, 0), sample(LinearColor::rgb(4.0, 2.0, 1.0), Vec3(0.0, 1.0, 0.0)).to_light_sample());
    assert!(!light_map.get(1, 1).is_mapped);

    let empty = LightMapData2D::new(3, 2);
    assert_eq!(empty.samples().len(), 6);
    assert!(empty.samples().iter().all(|texel| !texel.is_mapped));
}

#[test]
fn quantization_spans_mapped_range_only() {
    let light_map = light_map();
    let quantized = quantize(&light_map, &QuantizeSettings::default());

    assert_eq!(quantized.texels[3], QuantizedTexel::default());
    assert!(quantized.dequantize_texel(1, 1).is_none());
    assert!(quantized.sky_occlusion.is_none());

    for (index, texel) in quantized.texels.iter().take(3).enumerate() {
        assert_eq!(texel.coverage, 255, "texel {index}");
    }

    // every channel's extremes land on 0 and 255
    for coefficient in 0..NUM_STORED_COEFFICIENTS {
        for channel in 0..4 {
            let bytes: Vec<u8> = quantized.texels.iter().take(3).map(|t| t.coefficients[coefficient][channel]).collect();
            let max = light_map.samples()[..3].iter().map(|s| s.coefficients[coefficient][channel]).fold(f32::MIN, f32::max);
            let min = light_map.samples()[..3].iter().map(|s| s.coefficients[coefficient][channel]).fold(f32::MAX, f32::min);
            assert_abs_diff_eq!(quantized.add[coefficient][channel], min);
            if max - min > 1e-3 {
                assert!(bytes.contains(&0) && bytes.contains(&255));
            }
        }
    }
}

#[test]
fn dequantized_texels_are_within_one_step() {
    let light_map = light_map();
    let quantized = quantize(&light_map, &QuantizeSettings::default());

    for (index, sample) in light_map.samples().iter().enumerate().take(3) {
        let decoded = quantized.dequantize_texel(index % 2, index / 2).unwrap();
        for coefficient in 0..NUM_STORED_COEFFICIENTS {
            for channel in 0..4 {
                let step = quantized.scale[coefficient][channel] / 255.0;
                assert_abs_diff_eq!(
                    decoded[coefficient][channel],
                    sample.coefficients[coefficient][channel],
                    epsilon = step * 0.5 + 1e-6
                );
            }
        }
    }
}

#[test]
fn constant_channels_keep_a_minimum_scale() {
    let data = LightMapData2D::from_gathered(1, 1, &[sample(LinearColor::WHITE, Vec3::UP)]);
    let quantized = quantize(&data, &QuantizeSettings::default());
    assert_abs_diff_eq!(quantized.scale[0][0], 1e-6);
    assert_eq!(quantized.texels[0].coefficients[0][0], 0);
}

#[test]
fn sky_occlusion_is_stored_with_sky_shadowing() {
    let quantized = quantize(&light_map(), &QuantizeSettings { has_sky_shadowing: true });
    let sky = quantized.sky_occlusion.unwrap();
    assert_eq!(sky[2], [128, 128, 255, 255]);
    assert_eq!(sky[0], [128, 128, 128, 0]);
}
