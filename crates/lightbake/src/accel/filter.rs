//! Decides, triangle by triangle, whether a candidate hit found by the traversal counts.
//!
//! The rules run in a fixed order and stop at the first rejection. Translucent triangles are
//! always rejected, after recording their transmission.

use crate::geometry::Vec3;
use crate::scene::MeshLightingFlags;

use super::geometry::{barycentric_weights, GeometryStore, TriangleFlags};
use super::ray::{LaneHit, RayContext, TraceFlags};
use super::transmission::TransmissionAccumulator;

/// Query parameters the filter needs alongside each candidate.
#[derive(Clone, Copy, Debug)]
pub struct FilterQuery {
    pub context: RayContext,
    pub find_closest: bool,
    pub calculate_transmission: bool,
    pub direct_shadowing: bool,
}

pub fn accept_hit(
    store: &GeometryStore,
    query: &FilterQuery,
    direction: Vec3,
    hit: &LaneHit,
    transmission: &mut TransmissionAccumulator,
) -> bool {
    let geometry = store.geometry(hit.geometry);
    let flags = geometry.descriptors[hit.primitive as usize].flags;
    let trace_flags = query.context.trace_flags;

    if !flags.contains(TriangleFlags::CAST_SHADOW) {
        return false;
    }

    if trace_flags.contains(TraceFlags::STATIC_AND_OPAQUE_ONLY) && !flags.contains(TriangleFlags::STATIC_AND_OPAQUE) {
        return false;
    }

    if !flags.contains(TriangleFlags::TWO_SIDED) && !trace_flags.contains(TraceFlags::TWO_SIDED_COLLISION) {
        let front_facing = Vec3::dot(direction, hit.geometric_normal) < 0.0;
        if front_facing == trace_flags.contains(TraceFlags::FLIP_SIDEDNESS) {
            return false;
        }
    }

    let hit_mesh = &geometry.info;
    let ray_mesh = store.mesh_info(query.context.mapping_mesh);

    // LOD
    match ray_mesh {
        Some(ray_mesh) if ray_mesh.mesh_index == hit_mesh.mesh_index => {
            if hit_mesh.lod.lod_index != ray_mesh.lod.lod_index {
                return false;
            }
        }
        _ => {
            if hit_mesh.lod.lod_index != 0 {
                return false;
            }
        }
    }

    // HLOD
    let hit_tree = hit_mesh.lod.hlod_tree_index;
    if hit_tree > 0 {
        let ray_lod = ray_mesh.map(|mesh| mesh.lod).unwrap_or_default();
        if hit_tree != ray_lod.hlod_tree_index {
            if !hit_mesh.lod.is_hlod_leaf() {
                return false;
            }
        } else {
            let same_node = ray_mesh.is_some_and(|mesh| mesh.mesh_id == hit_mesh.mesh_id);
            let start = hit_mesh.lod.hlod_range_start;
            let outside_ray_subtree =
                hit_mesh.lod.is_hlod_leaf() && (start < ray_lod.hlod_range_start || start > ray_lod.hlod_range_end);
            if !same_node && !outside_ray_subtree {
                return false;
            }
        }
    }

    let weights = barycentric_weights(hit.u, hit.v);

    if flags.contains(TriangleFlags::TRANSLUCENT)
        && !(query.direct_shadowing && flags.contains(TriangleFlags::CAST_SHADOW_AS_MASKED))
    {
        if query.calculate_transmission {
            let uv = geometry.interpolate_uv(hit.primitive, weights);
            transmission.push(geometry.material(hit.primitive).evaluate_transmission(uv), hit.t);
        }
        return false;
    }

    // self shadowing
    let hits_shadow_mesh = query.context.shadow_mesh == Some(hit_mesh.mesh_id);
    if hit_mesh.lighting_flags.contains(MeshLightingFlags::SELF_SHADOW_DISABLE) && hits_shadow_mesh {
        return false;
    }
    if trace_flags.contains(TraceFlags::INDIRECT_SHADOWING_ONLY) && !flags.contains(TriangleFlags::INDIRECTLY_SHADOWED_ONLY)
    {
        return false;
    }
    if hit_mesh.lighting_flags.contains(MeshLightingFlags::SELF_SHADOW_ONLY) && !hits_shadow_mesh {
        return false;
    }

    if (query.find_closest && flags.contains(TriangleFlags::MASKED))
        || (query.direct_shadowing && flags.contains(TriangleFlags::CAST_SHADOW_AS_MASKED))
    {
        let uv = geometry.interpolate_uv(hit.primitive, weights);
        if !geometry.material(hit.primitive).is_occluding(uv) {
            return false;
        }
    }

    true
}
