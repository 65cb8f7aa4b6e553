mod texture;

#[cfg(test)]
mod tests;

pub use texture::{Texture, WrapMode};

use crate::color::LinearColor;
use crate::error::ImportError;
use crate::geometry::Vec2;
use crate::scene::Guid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    #[default]
    Opaque,
    Masked,
    Translucent,
    Additive,
    Modulate,
}

impl TryFrom<u8> for BlendMode {
    type Error = ImportError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BlendMode::Opaque),
            1 => Ok(BlendMode::Masked),
            2 => Ok(BlendMode::Translucent),
            3 => Ok(BlendMode::Additive),
            4 => Ok(BlendMode::Modulate),
            _ => Err(ImportError::InvalidEnum { what: "blend mode", value: value.into() }),
        }
    }
}

impl From<BlendMode> for u8 {
    fn from(value: BlendMode) -> Self {
        value as u8
    }
}

/// The parts of a surface material that matter to shadowing.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub guid: Guid,
    pub blend_mode: BlendMode,
    pub two_sided: bool,
    /// Direct shadow rays treat this translucent material as masked.
    pub cast_shadow_as_masked: bool,
    pub opacity_mask_clip_value: f32,
    pub emissive_boost: f32,
    pub diffuse_boost: f32,
    pub transmission: Texture,
    pub opacity_mask: Texture,
}

impl Material {
    pub fn new(guid: Guid, blend_mode: BlendMode) -> Material {
        Material {
            guid,
            blend_mode,
            two_sided: false,
            cast_shadow_as_masked: false,
            opacity_mask_clip_value: 1.0 / 3.0,
            emissive_boost: 1.0,
            diffuse_boost: 1.0,
            transmission: Texture::default(),
            opacity_mask: Texture::default(),
        }
    }

    pub fn is_masked(&self) -> bool {
        self.blend_mode == BlendMode::Masked
    }

    pub fn is_translucent(&self) -> bool {
        matches!(self.blend_mode, BlendMode::Translucent | BlendMode::Additive | BlendMode::Modulate)
    }

    /// Color a ray keeps after passing through the surface at `uv`.
    pub fn evaluate_transmission(&self, uv: Vec2) -> LinearColor {
        let sample = self.transmission.sample(uv);
        LinearColor::rgb(sample.r, sample.g, sample.b)
    }

    pub fn evaluate_opacity_mask(&self, uv: Vec2) -> f32 {
        self.opacity_mask.sample(uv).r
    }

    /// False where the mask cuts the surface away.
    pub fn is_occluding(&self, uv: Vec2) -> bool {
        self.evaluate_opacity_mask(uv) >= self.opacity_mask_clip_value
    }
}
