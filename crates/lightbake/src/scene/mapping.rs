use super::{Guid, MeshId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MappingKind {
    Bsp,
    StaticMeshTexture,
    FluidSurface,
    Landscape,
}

/// Texel grid that receives the lighting of one mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct Mapping {
    pub guid: Guid,
    pub kind: MappingKind,
    pub mesh: MeshId,
    pub size_x: usize,
    pub size_y: usize,
    /// Size actually lit; smaller than `size_*` once padding is reserved.
    pub cached_size_x: usize,
    pub cached_size_y: usize,
    pub padded: bool,
    pub lightmap_uv_index: i32,
    pub bilinear_filter: bool,
}

impl Mapping {
    /// Reserves a one texel border on each side when the mapping is large enough.
    ///
    /// Landscape mappings are never padded.
    pub fn apply_padding(&mut self) {
        self.cached_size_x = self.size_x;
        self.cached_size_y = self.size_y;
        self.padded = false;

        if self.kind != MappingKind::Landscape && self.size_x > 2 && self.size_y > 2 {
            self.cached_size_x = self.size_x - 2;
            self.cached_size_y = self.size_y - 2;
            self.padded = true;
        }
    }

    pub fn texel_count(&self) -> usize {
        self.cached_size_x * self.cached_size_y
    }
}
