use approx::assert_relative_eq;

use super::*;

fn checker() -> Texture {
    Texture::new(
        2,
        2,
        vec![
            LinearColor::rgb(1.0, 0.0, 0.0),
            LinearColor::rgb(0.0, 1.0, 0.0),
            LinearColor::rgb(0.0, 0.0, 1.0),
            LinearColor::rgb(0.5, 0.5, 0.5),
        ],
    )
}

#[test]
fn nearest_sampling_picks_the_covering_texel() {
    let texture = checker();
    assert_eq!(texture.sample(Vec2(0.25, 0.25)).r, 1.0);
    assert_eq!(texture.sample(Vec2(0.75, 0.25)).g, 1.0);
    assert_eq!(texture.sample(Vec2(0.25, 0.75)).b, 1.0);
    assert_eq!(texture.sample(Vec2(0.99, 0.99)).r, 0.5);
}

#[test]
fn repeat_wraps_and_clamp_holds_the_edge() {
    let mut texture = checker();
    assert_eq!(texture.sample(Vec2(1.25, -0.75)).r, 1.0);

    texture.wrap = WrapMode::Clamp;
    assert_eq!(texture.sample(Vec2(-3.0, -3.0)).r, 1.0);
    assert_eq!(texture.sample(Vec2(4.0, 4.0)).r, 0.5);
}

#[test]
fn empty_textures_read_as_white() {
    let texture = Texture::default();
    assert_eq!(texture.sample(Vec2(0.3, 0.3)), LinearColor::WHITE);
}

#[test]
fn opacity_mask_compares_against_the_clip_value() {
    let mut material = Material::new(Guid::new(0, 0, 0, 1), BlendMode::Masked);
    material.opacity_mask = Texture::new(2, 1, vec![LinearColor::rgb(0.1, 0.0, 0.0), LinearColor::rgb(0.9, 0.0, 0.0)]);
    material.opacity_mask_clip_value = 0.5;

    assert!(material.is_masked());
    assert!(!material.is_occluding(Vec2(0.25, 0.5)));
    assert!(material.is_occluding(Vec2(0.75, 0.5)));
}

#[test]
fn transmission_drops_alpha() {
    let mut material = Material::new(Guid::default(), BlendMode::Translucent);
    material.transmission = Texture::constant(LinearColor::new(0.25, 0.5, 0.75, 0.0));
    let transmission = material.evaluate_transmission(Vec2(0.5, 0.5));
    assert_relative_eq!(transmission.g, 0.5);
    assert_eq!(transmission.a, 1.0);
    assert!(material.is_translucent());
}

#[test]
fn blend_modes_decode_from_bytes() {
    assert_eq!(BlendMode::try_from(4u8).ok(), Some(BlendMode::Modulate));
    assert!(BlendMode::try_from(9u8).is_err());
    assert_eq!(u8::from(BlendMode::Translucent), 2);
}
