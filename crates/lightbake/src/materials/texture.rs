//! Baked material attribute textures. Only nearest sampling is needed for shadow rays.

use crate::color::LinearColor;
use crate::geometry::Vec2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WrapMode {
    #[default]
    Repeat,
    Clamp,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Texture {
    pub size_x: usize,
    pub size_y: usize,
    pub wrap: WrapMode,
    // row major, size_x * size_y
    texels: Vec<LinearColor>,
}

impl Texture {
    /// # Panics
    /// When `texels` does not hold `size_x * size_y` values.
    pub fn new(size_x: usize, size_y: usize, texels: Vec<LinearColor>) -> Texture {
        assert_eq!(texels.len(), size_x * size_y, "texel count does not match texture size");
        Texture { size_x, size_y, wrap: WrapMode::Repeat, texels }
    }

    pub fn constant(value: LinearColor) -> Texture {
        Texture::new(1, 1, vec![value])
    }

    pub fn is_empty(&self) -> bool {
        self.texels.is_empty()
    }

    pub fn texels(&self) -> &[LinearColor] {
        &self.texels
    }

    fn texel_coordinate(&self, coordinate: f32, size: usize) -> usize {
        let wrapped = match self.wrap {
            WrapMode::Repeat => coordinate - coordinate.floor(),
            WrapMode::Clamp => coordinate.clamp(0.0, 1.0),
        };
        ((wrapped * size as f32) as usize).min(size - 1)
    }

    /// Nearest texel at `uv`. An empty texture reads as white.
    pub fn sample(&self, uv: Vec2) -> LinearColor {
        if self.is_empty() {
            return LinearColor::WHITE;
        }
        let x = self.texel_coordinate(uv.0, self.size_x);
        let y = self.texel_coordinate(uv.1, self.size_y);
        self.texels[y * self.size_x + x]
    }
}
