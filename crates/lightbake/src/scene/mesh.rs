use bitflags::bitflags;
use tracing::warn;

use crate::geometry::{Matrix4x4, Transform, Vec2, Vec3, AABB};

use super::Guid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeshKind {
    StaticMesh,
    FluidSurface,
    Landscape,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MeshLightingFlags: u32 {
        const CAST_SHADOW = 1 << 0;
        /// Only shadows itself.
        const SELF_SHADOW_ONLY = 1 << 1;
        /// Never shadows itself.
        const SELF_SHADOW_DISABLE = 1 << 2;
    }
}

/// LOD and HLOD placement of a mesh instance.
///
/// HLOD nodes are numbered depth first, so a node's range covers the nodes below it and a
/// leaf's range is empty (start == end).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MeshLodInfo {
    pub lod_index: u16,
    /// 0 when the mesh is not part of an HLOD tree.
    pub hlod_tree_index: u16,
    pub hlod_range_start: u16,
    pub hlod_range_end: u16,
}

impl MeshLodInfo {
    /// Unpacks the exported words: LOD in the low half of `lod_indices`, tree in the high half;
    /// range start in the low half of `hlod_range`, end in the high half.
    pub fn from_packed(lod_indices: u32, hlod_range: u32) -> MeshLodInfo {
        MeshLodInfo {
            lod_index: (lod_indices & 0xFFFF) as u16,
            hlod_tree_index: (lod_indices >> 16) as u16,
            hlod_range_start: (hlod_range & 0xFFFF) as u16,
            hlod_range_end: (hlod_range >> 16) as u16,
        }
    }

    pub fn is_hlod_leaf(&self) -> bool {
        self.hlod_range_start == self.hlod_range_end
    }
}

/// A material section of a mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshElement {
    /// Index into [`super::Scene::materials`].
    pub material: usize,
    pub casts_shadow: bool,
    pub indirectly_shadowed_only: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub lightmap_uv: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshTriangle {
    pub indices: [u32; 3],
    pub element: usize,
}

/// A placed mesh, with its vertices already in world space.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshInstance {
    pub guid: Guid,
    pub kind: MeshKind,
    /// Source mesh index within the exporting level.
    pub mesh_index: i32,
    pub lod: MeshLodInfo,
    pub lighting_flags: MeshLightingFlags,
    pub local_to_world: Matrix4x4,
    pub elements: Vec<MeshElement>,
    pub vertices: Vec<MeshVertex>,
    pub triangles: Vec<MeshTriangle>,
}

impl MeshInstance {
    /// Moves local space vertices to world space through `local_to_world`.
    ///
    /// A singular matrix leaves normals transformed as plain vectors.
    pub fn transform_to_world(&mut self) {
        let matrix = self.local_to_world;
        match Transform::from_matrix(matrix) {
            Some(transform) => {
                for vertex in self.vertices.iter_mut() {
                    vertex.position = transform.apply_point(vertex.position);
                    vertex.normal = transform.apply_normal(vertex.normal);
                }
            }
            None => {
                warn!(guid = %self.guid, "singular local to world matrix");
                for vertex in self.vertices.iter_mut() {
                    vertex.position = matrix.apply_point(vertex.position);
                    vertex.normal = Vec3::safe_normalized(matrix.apply_vector(vertex.normal));
                }
            }
        }
    }

    pub fn casts_shadow(&self) -> bool {
        self.lighting_flags.contains(MeshLightingFlags::CAST_SHADOW)
    }

    pub fn bounds(&self) -> AABB {
        self.vertices.iter().fold(AABB::empty(), |bounds, vertex| bounds.add_point(vertex.position))
    }
}
